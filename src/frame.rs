// 该文件是 Shoushi （手势） 项目的一部分。
// src/frame.rs - 手部关键点帧定义
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, Wareless Group

use std::ops::Sub;

use serde::{Deserialize, Serialize};

/// 每只手的关键点数量
pub const LANDMARK_COUNT: usize = 21;

/// 像素坐标点
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
  pub x: f64,
  pub y: f64,
}

impl Point {
  pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

  pub fn new(x: f64, y: f64) -> Self {
    Self { x, y }
  }

  pub fn norm(&self) -> f64 {
    self.x.hypot(self.y)
  }

  pub fn distance(&self, other: &Point) -> f64 {
    (*self - *other).norm()
  }

  pub fn dot(&self, other: &Point) -> f64 {
    self.x * other.x + self.y * other.y
  }
}

impl Sub for Point {
  type Output = Point;

  fn sub(self, rhs: Point) -> Point {
    Point::new(self.x - rhs.x, self.y - rhs.y)
  }
}

/// 单只手在单帧中的 21 个像素坐标关键点
///
/// 长度不为 21 的帧视为无效帧，所有派生特征均为零值。
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LandmarkFrame {
  points: Box<[Point]>,
}

impl From<Vec<Point>> for LandmarkFrame {
  fn from(points: Vec<Point>) -> Self {
    Self {
      points: points.into_boxed_slice(),
    }
  }
}

impl LandmarkFrame {
  /// 由归一化坐标 (0..1) 换算为像素坐标
  pub fn from_normalized(points: &[[f64; 2]], width: u32, height: u32) -> Self {
    let (w, h) = (width as f64, height as f64);
    points
      .iter()
      .map(|[x, y]| Point::new(x * w, y * h))
      .collect::<Vec<_>>()
      .into()
  }

  pub fn is_valid(&self) -> bool {
    self.points.len() == LANDMARK_COUNT
  }

  /// 获取关键点，帧无效或索引越界时返回 None
  pub fn get(&self, index: usize) -> Option<Point> {
    if self.is_valid() {
      self.points.get(index).copied()
    } else {
      None
    }
  }

  pub fn points(&self) -> &[Point] {
    &self.points
  }
}

/// 一帧画面中检测到的全部手部，以及画面尺寸
#[derive(Debug, Clone, Default)]
pub struct HandsFrame {
  pub width: u32,
  pub height: u32,
  pub timestamp_ms: Option<u64>,
  pub hands: Vec<LandmarkFrame>,
}

impl HandsFrame {
  pub fn new(width: u32, height: u32, hands: Vec<LandmarkFrame>) -> Self {
    Self {
      width,
      height,
      timestamp_ms: None,
      hands,
    }
  }

  pub fn with_timestamp(mut self, timestamp_ms: Option<u64>) -> Self {
    self.timestamp_ms = timestamp_ms;
    self
  }

  /// 第一只有效的手
  pub fn primary_hand(&self) -> Option<&LandmarkFrame> {
    self.hands.iter().find(|hand| hand.is_valid())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn normalized_points_are_scaled_to_pixels() {
    let points = vec![[0.5, 0.25]; LANDMARK_COUNT];
    let frame = LandmarkFrame::from_normalized(&points, 640, 480);
    assert!(frame.is_valid());
    assert_eq!(frame.get(0), Some(Point::new(320.0, 120.0)));
  }

  #[test]
  fn short_frame_exposes_no_points() {
    let frame = LandmarkFrame::from(vec![Point::new(1.0, 1.0); 20]);
    assert!(!frame.is_valid());
    assert_eq!(frame.get(0), None);
  }

  #[test]
  fn primary_hand_skips_invalid_frames() {
    let invalid = LandmarkFrame::from(vec![Point::ORIGIN; 3]);
    let valid = LandmarkFrame::from(vec![Point::new(2.0, 3.0); LANDMARK_COUNT]);
    let frame = HandsFrame::new(640, 480, vec![invalid, valid.clone()]);
    assert_eq!(frame.primary_hand(), Some(&valid));
  }
}

// 该文件是 Shoushi （手势） 项目的一部分。
// src/landmark.rs - 关键点预处理
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

use crate::frame::{HandsFrame, LandmarkFrame, Point};

pub const WRIST: usize = 0;
pub const THUMB_IP: usize = 3;
pub const THUMB_TIP: usize = 4;
pub const INDEX_MCP: usize = 5;
pub const INDEX_PIP: usize = 6;
pub const INDEX_TIP: usize = 8;
/// 中指根部，作为掌心使用
pub const PALM_CENTER: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_TIP: usize = 12;
pub const RING_PIP: usize = 14;
pub const RING_TIP: usize = 16;
pub const PINKY_MCP: usize = 17;
pub const PINKY_PIP: usize = 18;
pub const PINKY_TIP: usize = 20;

/// 捏合判定阈值（按画面宽高归一化后的距离）
pub const PINCH_NORM_THRESHOLD: f64 = 0.05;

// (指尖, 第二关节)
const FINGER_TIP_PIP: [(usize, usize); 4] = [
  (INDEX_TIP, INDEX_PIP),
  (MIDDLE_TIP, MIDDLE_PIP),
  (RING_TIP, RING_PIP),
  (PINKY_TIP, PINKY_PIP),
];

/// 统计伸出的手指数量 (0..=5)
///
/// 拇指按 x 方向判断（画面已水平翻转），其余四指按指尖是否高于第二关节判断。
pub fn count_extended_fingers(frame: &LandmarkFrame) -> u8 {
  let (Some(thumb_tip), Some(thumb_ip)) = (frame.get(THUMB_TIP), frame.get(THUMB_IP)) else {
    return 0;
  };

  let mut count = u8::from(thumb_tip.x < thumb_ip.x);
  for (tip, pip) in FINGER_TIP_PIP {
    if let (Some(tip), Some(pip)) = (frame.get(tip), frame.get(pip)) {
      count += u8::from(tip.y < pip.y);
    }
  }
  count
}

/// 使用默认阈值判断拇指与食指是否捏合
pub fn is_pinching(frame: &LandmarkFrame, width: f64, height: f64) -> bool {
  is_pinching_within(frame, width, height, PINCH_NORM_THRESHOLD)
}

/// 拇指尖与食指尖分别按画面宽高归一化后的距离小于阈值即为捏合
pub fn is_pinching_within(frame: &LandmarkFrame, width: f64, height: f64, threshold: f64) -> bool {
  if width <= 0.0 || height <= 0.0 {
    return false;
  }
  let (Some(thumb), Some(index)) = (frame.get(THUMB_TIP), frame.get(INDEX_TIP)) else {
    return false;
  };

  let dx = (thumb.x - index.x) / width;
  let dy = (thumb.y - index.y) / height;
  dx.hypot(dy) < threshold
}

/// 单只手的逐帧派生特征
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HandObservation {
  pub extended_finger_count: u8,
  pub is_pinching: bool,
  pub palm_center: Point,
  pub index_tip: Point,
}

impl HandObservation {
  pub fn observe(frame: &LandmarkFrame, width: f64, height: f64, pinch_threshold: f64) -> Self {
    if !frame.is_valid() {
      return Self::default();
    }

    Self {
      extended_finger_count: count_extended_fingers(frame),
      is_pinching: is_pinching_within(frame, width, height, pinch_threshold),
      palm_center: frame.get(PALM_CENTER).unwrap_or_default(),
      index_tip: frame.get(INDEX_TIP).unwrap_or_default(),
    }
  }

  pub fn is_open(&self) -> bool {
    self.extended_finger_count >= 4
  }

  pub fn is_closed(&self) -> bool {
    self.extended_finger_count <= 1
  }
}

/// 状态机的单帧输入：有效手部的特征与画面尺寸
#[derive(Debug, Clone, Default)]
pub struct ObservedFrame {
  pub width: f64,
  pub height: f64,
  pub hands: Vec<HandObservation>,
}

impl ObservedFrame {
  /// 无效的手部帧被视为未检测到
  pub fn from_frame(frame: &HandsFrame, pinch_threshold: f64) -> Self {
    let (width, height) = (frame.width as f64, frame.height as f64);
    let hands = frame
      .hands
      .iter()
      .filter(|hand| hand.is_valid())
      .map(|hand| HandObservation::observe(hand, width, height, pinch_threshold))
      .collect();

    Self {
      width,
      height,
      hands,
    }
  }
}

/// 构造指定手指伸展状态的合成手部，供测试使用
#[cfg(test)]
pub(crate) fn synthetic_hand(center: Point, extended: [bool; 5]) -> LandmarkFrame {
  use crate::frame::LANDMARK_COUNT;

  let mut points = vec![center; LANDMARK_COUNT];
  points[THUMB_TIP] = Point::new(center.x + if extended[0] { -20.0 } else { 20.0 }, center.y);
  for (i, (tip, _)) in FINGER_TIP_PIP.iter().enumerate() {
    let dy = if extended[i + 1] { -30.0 } else { 30.0 };
    points[*tip] = Point::new(center.x, center.y + dy);
  }
  points.into()
}

// 该文件是 Shoushi （手势） 项目的一部分。
// src/metrics.rs - 康复运动指标
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

use serde::{Deserialize, Serialize};

use crate::frame::{LandmarkFrame, Point};
use crate::landmark::{INDEX_MCP, PALM_CENTER, PINKY_MCP, PINKY_TIP, THUMB_TIP, WRIST};

/// 计算平滑度所需的最少轨迹点数
pub const SMOOTHNESS_MIN_POINTS: usize = 5;
const SMOOTHNESS_SCALE: f64 = 10.0;

/// 腕关节角度使用的三个关键点 (食指根部, 手腕, 小指根部)
pub const WRIST_ANGLE_JOINTS: (usize, usize, usize) = (INDEX_MCP, WRIST, PINKY_MCP);

/// 活动度：拇指尖到小指尖的距离除以手掌长度（手腕到掌心）
///
/// 以手掌长度归一化，使结果与手到摄像头的距离无关。
pub fn range_of_motion(frame: &LandmarkFrame) -> f64 {
  let (Some(wrist), Some(palm), Some(thumb), Some(pinky)) = (
    frame.get(WRIST),
    frame.get(PALM_CENTER),
    frame.get(THUMB_TIP),
    frame.get(PINKY_TIP),
  ) else {
    return 0.0;
  };

  let palm_len = wrist.distance(&palm);
  if palm_len == 0.0 {
    return 0.0;
  }
  thumb.distance(&pinky) / palm_len
}

/// 以 `b` 为顶点、射线 b→a 与 b→c 之间的夹角（度）
pub fn joint_angle(frame: &LandmarkFrame, a: usize, b: usize, c: usize) -> f64 {
  let (Some(a), Some(b), Some(c)) = (frame.get(a), frame.get(b), frame.get(c)) else {
    return 0.0;
  };
  angle_between(a, b, c)
}

pub fn wrist_angle(frame: &LandmarkFrame) -> f64 {
  let (a, b, c) = WRIST_ANGLE_JOINTS;
  joint_angle(frame, a, b, c)
}

fn angle_between(a: Point, vertex: Point, c: Point) -> f64 {
  let v1 = a - vertex;
  let v2 = c - vertex;
  let (n1, n2) = (v1.norm(), v2.norm());
  if n1 == 0.0 || n2 == 0.0 {
    return 0.0;
  }
  // 浮点误差可能使余弦略超出 [-1, 1]
  let cosine = (v1.dot(&v2) / (n1 * n2)).clamp(-1.0, 1.0);
  cosine.acos().to_degrees()
}

fn finite_difference(points: &[Point]) -> Vec<Point> {
  points.windows(2).map(|w| w[1] - w[0]).collect()
}

/// 运动平滑度：轨迹三阶差分（离散加加速度）模长的均值除以 10，越小越平滑
pub fn smoothness(trajectory: &[Point]) -> f64 {
  if trajectory.len() < SMOOTHNESS_MIN_POINTS {
    return 0.0;
  }

  let velocity = finite_difference(trajectory);
  let acceleration = finite_difference(&velocity);
  let jerk = finite_difference(&acceleration);

  let mean = jerk.iter().map(Point::norm).sum::<f64>() / jerk.len() as f64;
  mean / SMOOTHNESS_SCALE
}

fn max_or_zero(values: &[f64]) -> f64 {
  values.iter().copied().reduce(f64::max).unwrap_or(0.0)
}

/// 会话结束时一次性计算的汇总指标
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SessionMetrics {
  pub max_rom: f64,
  pub max_angle: f64,
  pub smoothness_score: f64,
}

impl SessionMetrics {
  pub fn compute(roms: &[f64], angles: &[f64], trajectory: &[Point]) -> Self {
    Self {
      max_rom: max_or_zero(roms),
      max_angle: max_or_zero(angles),
      smoothness_score: smoothness(trajectory),
    }
  }
}

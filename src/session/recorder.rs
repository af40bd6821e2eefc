// 该文件是 Shoushi （手势） 项目的一部分。
// src/session/recorder.rs - 会话数据采集
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

use std::time::Instant;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::exercise::{Exercise, safe_file_name};
use crate::frame::{HandsFrame, Point};
use crate::landmark::PALM_CENTER;
use crate::metrics::{SessionMetrics, range_of_motion, wrist_angle};

/// 导出文件中的一行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameRecord {
  pub time_offset_seconds: f64,
  pub rom: f64,
  pub angle: f64,
  /// 练习所选指标在目标区间内的进度 (0..=1)
  pub progress: f64,
  pub hand_center_x: f64,
  pub hand_center_y: f64,
  pub frame_width: u32,
  pub frame_height: u32,
}

/// 结束后的会话数据
#[derive(Debug, Clone)]
pub struct SessionRecord {
  pub patient_id: String,
  pub exercise: String,
  pub started_at: DateTime<Local>,
  pub duration_seconds: f64,
  pub frames: Vec<FrameRecord>,
  pub metrics: SessionMetrics,
  exercise_file_name: String,
}

impl SessionRecord {
  pub fn exercise_file_name(&self) -> &str {
    &self.exercise_file_name
  }

  pub fn patient_file_name(&self) -> String {
    safe_file_name(&self.patient_id)
  }
}

/// 逐帧采集活动度、角度与手掌中心轨迹
#[derive(Debug)]
pub struct SessionRecorder {
  patient_id: String,
  exercise: Exercise,
  started_at: DateTime<Local>,
  started: Instant,
  frames: Vec<FrameRecord>,
  roms: Vec<f64>,
  angles: Vec<f64>,
  trajectory: Vec<Point>,
}

impl SessionRecorder {
  pub fn new(patient_id: impl Into<String>, exercise: &Exercise, started: Instant) -> Self {
    let recorder = Self {
      patient_id: patient_id.into(),
      exercise: exercise.clone(),
      started_at: Local::now(),
      started,
      frames: Vec::new(),
      roms: Vec::new(),
      angles: Vec::new(),
      trajectory: Vec::new(),
    };
    info!(
      "开始记录会话: 患者 {}, 练习 {}",
      recorder.patient_id, recorder.exercise.title
    );
    recorder
  }

  /// 记录第一只有效的手，没有有效手部时不记录并返回 false
  pub fn record(&mut self, frame: &HandsFrame, now: Instant) -> bool {
    let Some(hand) = frame.primary_hand() else {
      return false;
    };
    let Some(center) = hand.get(PALM_CENTER) else {
      return false;
    };

    let rom = range_of_motion(hand);
    let angle = wrist_angle(hand);
    let progress = self.exercise.progress(rom, angle);
    debug!("活动度 {:.3}, 角度 {:.1}, 进度 {:.2}", rom, angle, progress);

    self.roms.push(rom);
    self.angles.push(angle);
    self.trajectory.push(center);
    self.frames.push(FrameRecord {
      time_offset_seconds: now.saturating_duration_since(self.started).as_secs_f64(),
      rom,
      angle,
      progress,
      hand_center_x: center.x,
      hand_center_y: center.y,
      frame_width: frame.width,
      frame_height: frame.height,
    });
    true
  }

  pub fn frame_count(&self) -> usize {
    self.frames.len()
  }

  /// 结束会话并计算汇总指标，采集到的日志随之移交
  pub fn finish(self, now: Instant) -> SessionRecord {
    let metrics = SessionMetrics::compute(&self.roms, &self.angles, &self.trajectory);
    let duration_seconds = now.saturating_duration_since(self.started).as_secs_f64();
    info!(
      "会话结束: {} 帧, 时长 {:.1}s, 最大活动度 {:.3}, 最大角度 {:.1}, 平滑度 {:.3}",
      self.frames.len(),
      duration_seconds,
      metrics.max_rom,
      metrics.max_angle,
      metrics.smoothness_score
    );

    SessionRecord {
      patient_id: self.patient_id,
      exercise_file_name: self.exercise.safe_name(),
      exercise: self.exercise.title,
      started_at: self.started_at,
      duration_seconds,
      frames: self.frames,
      metrics,
    }
  }
}

// 该文件是 Shoushi （手势） 项目的一部分。
// src/session.rs - 康复训练会话
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

use std::convert::Infallible;
use std::path::PathBuf;

use serde::Serialize;

use crate::exercise::Exercise;
use crate::frame::HandsFrame;
use crate::gesture::{
  Clock, FrameOutcome, GestureConfig, GestureMachine, InteractionMode, Interpreter, SystemClock,
};
use crate::landmark::ObservedFrame;
use crate::metrics::SessionMetrics;

mod controller;
mod recorder;

pub use self::controller::{SessionController, SessionError, SessionHandle};
pub use self::recorder::{FrameRecord, SessionRecord, SessionRecorder};

/// 手势控制与指标采集共用同一帧序列
pub struct Session<C = SystemClock> {
  machine: GestureMachine<C>,
  recorder: SessionRecorder,
  clock: C,
}

impl Session<SystemClock> {
  pub fn new(patient_id: &str, exercise: &Exercise, config: GestureConfig) -> Self {
    Self::with_clock(patient_id, exercise, config, SystemClock)
  }
}

impl<C: Clock + Clone> Session<C> {
  pub fn with_clock(patient_id: &str, exercise: &Exercise, config: GestureConfig, clock: C) -> Self {
    let recorder = SessionRecorder::new(patient_id, exercise, clock.now());
    Self {
      machine: GestureMachine::with_clock(config, clock.clone()),
      recorder,
      clock,
    }
  }

  pub fn mode(&self) -> InteractionMode {
    self.machine.mode()
  }

  pub fn machine(&self) -> &GestureMachine<C> {
    &self.machine
  }

  pub fn recorded_frames(&self) -> usize {
    self.recorder.frame_count()
  }

  pub fn per_frame(&mut self, frame: &HandsFrame) -> FrameOutcome {
    let observed = ObservedFrame::from_frame(frame, self.machine.config().pinch_threshold);
    let outcome = self.machine.update(&observed);
    self.recorder.record(frame, self.clock.now());
    outcome
  }

  pub fn finish(self) -> SessionRecord {
    self.recorder.finish(self.clock.now())
  }
}

impl<C: Clock + Clone> Interpreter for Session<C> {
  type Input = HandsFrame;
  type Output = FrameOutcome;
  type Error = Infallible;

  fn interpret(&mut self, input: &Self::Input) -> Result<Self::Output, Self::Error> {
    Ok(self.per_frame(input))
  }
}

/// 会话结束时返回给调用方、并随数据文件一同导出的摘要
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
  pub patient_id: String,
  pub exercise: String,
  pub started_at: String,
  pub duration_seconds: f64,
  pub frame_count: usize,
  #[serde(flatten)]
  pub metrics: SessionMetrics,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub data_file: Option<PathBuf>,
}

impl SessionSummary {
  pub fn with_data_file(mut self, path: PathBuf) -> Self {
    self.data_file = Some(path);
    self
  }
}

impl From<&SessionRecord> for SessionSummary {
  fn from(record: &SessionRecord) -> Self {
    Self {
      patient_id: record.patient_id.clone(),
      exercise: record.exercise.clone(),
      started_at: record.started_at.to_rfc3339(),
      duration_seconds: record.duration_seconds,
      frame_count: record.frames.len(),
      metrics: record.metrics,
      data_file: None,
    }
  }
}

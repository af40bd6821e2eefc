// 该文件是 Shoushi （手势） 项目的一部分。
// src/session/controller.rs - 会话启停控制
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

use std::sync::mpsc::{self, Sender};
use std::thread::{self, JoinHandle};

use thiserror::Error;
use tracing::{error, info, warn};
use url::Url;

use super::{Session, SessionSummary};
use crate::{
  FromUrl,
  exercise::{CatalogError, Exercise, ExerciseCatalog},
  frame::HandsFrame,
  gesture::{Clock, FrameOutcome, GestureConfig, SystemClock},
  input::{InputError, InputWrapper},
  output::{OutputError, OutputWrapper, Render, SessionExport},
  task::{ContinuousTask, Task},
};

#[derive(Error, Debug)]
pub enum SessionError {
  #[error("会话 {0} 正在运行")]
  AlreadyRunning(u64),
  #[error("当前没有运行中的会话")]
  NotRunning,
  #[error("会话 {0} 不是当前运行的会话")]
  UnknownSession(u64),
  #[error("练习目录错误: {0}")]
  CatalogError(#[from] CatalogError),
  #[error("输入错误: {0}")]
  InputError(#[from] InputError),
  #[error("输出错误: {0}")]
  OutputError(#[from] OutputError),
  #[error("无法启动会话线程: {0}")]
  SpawnError(#[from] std::io::Error),
  #[error("会话线程异常退出")]
  WorkerPanicked,
  #[error("任务错误: {0}")]
  TaskError(#[from] anyhow::Error),
}

/// 由 `start` 返回，`stop` 时用于确认会话身份
#[derive(Debug, Clone, PartialEq)]
pub struct SessionHandle {
  pub id: u64,
  pub patient_id: String,
  pub exercise: Exercise,
}

struct Worker<C> {
  id: u64,
  stop: Sender<()>,
  thread: JoinHandle<anyhow::Result<Session<C>>>,
}

/// 管理唯一的会话工作线程
pub struct SessionController<C = SystemClock> {
  catalog: ExerciseCatalog,
  config: GestureConfig,
  clock: C,
  exporter: Option<Box<dyn SessionExport + Send>>,
  frame_number: Option<usize>,
  next_id: u64,
  worker: Option<Worker<C>>,
}

impl SessionController<SystemClock> {
  pub fn new(catalog: ExerciseCatalog, config: GestureConfig) -> Self {
    Self::with_clock(catalog, config, SystemClock)
  }
}

impl<C> SessionController<C>
where
  C: Clock + Clone + Send + 'static,
{
  pub fn with_clock(catalog: ExerciseCatalog, config: GestureConfig, clock: C) -> Self {
    Self {
      catalog,
      config,
      clock,
      exporter: None,
      frame_number: None,
      next_id: 1,
      worker: None,
    }
  }

  /// 会话结束后导出数据文件
  pub fn with_exporter(mut self, exporter: impl SessionExport + Send + 'static) -> Self {
    self.exporter = Some(Box::new(exporter));
    self
  }

  pub fn with_frame_number(mut self, frame_number: Option<usize>) -> Self {
    self.frame_number = frame_number;
    self
  }

  pub fn catalog(&self) -> &ExerciseCatalog {
    &self.catalog
  }

  pub fn is_running(&self) -> bool {
    self.worker.is_some()
  }

  /// 工作线程已退出（输入结束或达到帧数限制），或当前没有会话
  pub fn is_finished(&self) -> bool {
    self
      .worker
      .as_ref()
      .is_none_or(|worker| worker.thread.is_finished())
  }

  fn prepare(&self, exercise_id: u32) -> Result<Exercise, SessionError> {
    if let Some(worker) = &self.worker {
      warn!("会话 {} 正在运行，拒绝启动新会话", worker.id);
      return Err(SessionError::AlreadyRunning(worker.id));
    }
    Ok(self.catalog.find(exercise_id)?.clone())
  }

  /// 从 URL 打开输入与输出后启动会话，打开失败时不会启动工作线程
  pub fn start_from_url(
    &mut self,
    patient_id: &str,
    exercise_id: u32,
    input: &Url,
    output: &Url,
  ) -> Result<SessionHandle, SessionError> {
    let exercise = self.prepare(exercise_id)?;
    let input = InputWrapper::from_url(input)?;
    let output = OutputWrapper::from_url(output)?;
    self.spawn(patient_id, exercise, input, output)
  }

  pub fn start<I, O>(
    &mut self,
    patient_id: &str,
    exercise_id: u32,
    input: I,
    output: O,
  ) -> Result<SessionHandle, SessionError>
  where
    I: Iterator<Item = HandsFrame> + Send + 'static,
    O: Render<HandsFrame, FrameOutcome> + Send + 'static,
    O::Error: std::error::Error + Send + Sync + 'static,
  {
    let exercise = self.prepare(exercise_id)?;
    self.spawn(patient_id, exercise, input, output)
  }

  fn spawn<I, O>(
    &mut self,
    patient_id: &str,
    exercise: Exercise,
    input: I,
    output: O,
  ) -> Result<SessionHandle, SessionError>
  where
    I: Iterator<Item = HandsFrame> + Send + 'static,
    O: Render<HandsFrame, FrameOutcome> + Send + 'static,
    O::Error: std::error::Error + Send + Sync + 'static,
  {
    let id = self.next_id;
    let session = Session::with_clock(
      patient_id,
      &exercise,
      self.config.clone(),
      self.clock.clone(),
    );
    let (stop, stop_rx) = mpsc::channel();
    let task = ContinuousTask::default()
      .with_frame_number(self.frame_number)
      .with_stop_signal(stop_rx);

    let thread = thread::Builder::new()
      .name(format!("shoushi-session-{}", id))
      .spawn(move || task.run_task(input, session, output))?;

    info!(
      "会话 {} 已启动: 患者 {}, 练习 {} ({})",
      id, patient_id, exercise.id, exercise.title
    );
    self.next_id += 1;
    self.worker = Some(Worker { id, stop, thread });

    Ok(SessionHandle {
      id,
      patient_id: patient_id.to_string(),
      exercise,
    })
  }

  /// 通知工作线程停止并等待其退出，然后计算指标并导出
  ///
  /// 导出失败只记录警告，不影响返回的摘要。
  pub fn stop(&mut self, handle: &SessionHandle) -> Result<SessionSummary, SessionError> {
    let worker = match self.worker.take() {
      None => return Err(SessionError::NotRunning),
      Some(worker) if worker.id != handle.id => {
        let id = worker.id;
        self.worker = Some(worker);
        warn!("停止请求的会话 {} 与当前会话 {} 不符", handle.id, id);
        return Err(SessionError::UnknownSession(handle.id));
      }
      Some(worker) => worker,
    };

    // 线程可能已自行结束，此时通道已断开
    let _ = worker.stop.send(());
    let session = worker
      .thread
      .join()
      .map_err(|_| SessionError::WorkerPanicked)??;

    let record = session.finish();
    let summary = SessionSummary::from(&record);
    let summary = match &self.exporter {
      None => summary,
      Some(exporter) => match exporter.export_session(&record) {
        Ok(path) => {
          info!("会话数据已导出到 {:?}", path);
          summary.with_data_file(path)
        }
        Err(e) => {
          warn!("会话数据导出失败: {}", e);
          summary
        }
      },
    };

    info!("会话 {} 已停止", handle.id);
    Ok(summary)
  }
}

impl<C> Drop for SessionController<C> {
  fn drop(&mut self) {
    if let Some(worker) = self.worker.take() {
      warn!("控制器释放时会话 {} 仍在运行，停止但不导出", worker.id);
      let _ = worker.stop.send(());
      if worker.thread.join().is_err() {
        error!("会话线程异常退出");
      }
    }
  }
}

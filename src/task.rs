// 该文件是 Shoushi （手势） 项目的一部分。
// src/task.rs - 逐帧处理任务
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

use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::Instant;

use tracing::{debug, error, info, warn};

use crate::{gesture::Interpreter, output::Render};

pub trait Task<I, M, O>: Sized {
  type Output;
  type Error;
  fn run_task(self, input: I, model: M, output: O) -> Result<Self::Output, Self::Error>;
}

/// 按帧顺序持续处理输入，直到输入结束、达到帧数限制或收到停止信号
#[derive(Default, Debug)]
pub struct ContinuousTask {
  frame_number: Option<usize>,
  stop: Option<Receiver<()>>,
}

impl ContinuousTask {
  pub fn with_frame_number(mut self, frame_number: Option<usize>) -> Self {
    self.frame_number = frame_number;
    self
  }

  pub fn with_stop_signal(mut self, stop: Receiver<()>) -> Self {
    self.stop = Some(stop);
    self
  }

  fn should_stop(&self) -> bool {
    match &self.stop {
      None => false,
      Some(rx) => match rx.try_recv() {
        Ok(()) => true,
        Err(TryRecvError::Empty) => false,
        // 控制端已不存在
        Err(TryRecvError::Disconnected) => true,
      },
    }
  }
}

impl<
  F,
  D,
  ME: std::error::Error + Sync + Send + 'static,
  RE: std::error::Error + Sync + Send + 'static,
  I: Iterator<Item = F>,
  M: Interpreter<Input = F, Output = D, Error = ME>,
  O: Render<F, D, Error = RE>,
> Task<I, M, O> for ContinuousTask
{
  type Output = M;
  type Error = anyhow::Error;

  fn run_task(self, input: I, mut model: M, output: O) -> Result<Self::Output, Self::Error> {
    info!("开始任务...");
    let mut frame_index = 0usize;
    let mut now = Instant::now();
    for frame in input {
      if self.should_stop() {
        warn!("收到停止信号，退出任务循环");
        break;
      }

      frame_index += 1;
      debug!("处理第 {} 帧", frame_index);
      let result = model.interpret(&frame)?;
      let elapsed_a = now.elapsed();
      if let Err(e) = output.render_result(&frame, &result) {
        error!("输出失败: {}，退出任务循环", e);
        break;
      }
      let elapsed_b = now.elapsed();
      now = Instant::now();
      debug!("处理完成，耗时: {:.2?} / {:.2?}", elapsed_a, elapsed_b);

      if self.frame_number.is_some_and(|n| frame_index >= n) {
        info!("达到指定帧数 {}, 退出任务循环", frame_index);
        break;
      }
    }

    info!("任务完成，共处理 {} 帧", frame_index);
    Ok(model)
  }
}

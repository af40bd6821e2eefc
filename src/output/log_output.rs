// 该文件是 Shoushi （手势） 项目的一部分。
// src/output/log_output.rs - 以日志代替系统输入注入
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

use std::time::Duration;

use tracing::{debug, info};
use url::Url;

use super::{OutputError, Render};
use crate::{
  FromUrl, FromUrlWithScheme,
  frame::HandsFrame,
  gesture::{Command, FrameOutcome},
};

pub struct LogOutput {
  pause: bool,
}

impl FromUrlWithScheme for LogOutput {
  const SCHEME: &'static str = "log";
}

impl FromUrl for LogOutput {
  type Error = OutputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(OutputError::SchemeMismatch);
    }

    let pause = !url.query_pairs().any(|(k, _)| k == "nopause");
    Ok(LogOutput { pause })
  }
}

impl Render<HandsFrame, FrameOutcome> for LogOutput {
  type Error = OutputError;

  fn render_result(&self, _frame: &HandsFrame, result: &FrameOutcome) -> Result<(), Self::Error> {
    if result.commands.is_empty() {
      debug!("[{}] {}", result.mode, result.action);
      return Ok(());
    }

    info!("[{}] {}", result.mode, result.action);
    for command in &result.commands {
      match command {
        Command::Pause { millis } if self.pause => {
          std::thread::sleep(Duration::from_millis(*millis));
        }
        command => info!("  -> {}", command),
      }
    }
    Ok(())
  }
}

// 该文件是 Shoushi （手势） 项目的一部分。
// src/output.rs - 输出定义
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

use std::path::PathBuf;

use thiserror::Error;
use tracing::error;
use url::Url;

use crate::FromUrl;
#[cfg(any(feature = "log_output", feature = "command_file_output"))]
use crate::FromUrlWithScheme;
use crate::frame::HandsFrame;
use crate::gesture::FrameOutcome;
use crate::session::SessionRecord;

pub trait Render<Frame, Output>: Sized {
  type Error;
  fn render_result(&self, frame: &Frame, result: &Output) -> Result<(), Self::Error>;
}

/// 会话结束后将采集的数据写出，返回数据文件路径
pub trait SessionExport {
  fn export_session(&self, record: &SessionRecord) -> Result<PathBuf, OutputError>;
}

#[cfg(feature = "log_output")]
mod log_output;
#[cfg(feature = "log_output")]
pub use self::log_output::LogOutput;

#[cfg(feature = "command_file_output")]
mod command_file;
#[cfg(feature = "command_file_output")]
pub use self::command_file::CommandFileOutput;

#[cfg(feature = "directory_record")]
mod directory_record;
#[cfg(feature = "directory_record")]
pub use self::directory_record::{DirectoryRecordOutput, DirectoryRecordOutputError};

#[derive(Error, Debug)]
pub enum OutputError {
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("序列化错误: {0}")]
  SerializeError(#[from] serde_json::Error),
  #[error("输出锁已损坏")]
  LockPoisoned,
  #[cfg(feature = "directory_record")]
  #[error("目录记录输出错误: {0}")]
  DirectoryRecordOutputError(#[from] DirectoryRecordOutputError),
  #[error("URI 方案不匹配")]
  SchemeMismatch,
}

pub enum OutputWrapper {
  #[cfg(feature = "log_output")]
  LogOutput(LogOutput),
  #[cfg(feature = "command_file_output")]
  CommandFileOutput(CommandFileOutput),
}

impl FromUrl for OutputWrapper {
  type Error = OutputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    match url.scheme() {
      #[cfg(feature = "log_output")]
      LogOutput::SCHEME => {
        let output = LogOutput::from_url(url)?;
        Ok(OutputWrapper::LogOutput(output))
      }
      #[cfg(feature = "command_file_output")]
      CommandFileOutput::SCHEME => {
        let output = CommandFileOutput::from_url(url)?;
        Ok(OutputWrapper::CommandFileOutput(output))
      }
      scheme => {
        error!("不支持的输出方案: {}", scheme);
        Err(OutputError::SchemeMismatch)
      }
    }
  }
}

impl Render<HandsFrame, FrameOutcome> for OutputWrapper {
  type Error = OutputError;

  fn render_result(&self, frame: &HandsFrame, result: &FrameOutcome) -> Result<(), Self::Error> {
    match self {
      #[cfg(feature = "log_output")]
      OutputWrapper::LogOutput(output) => output.render_result(frame, result),
      #[cfg(feature = "command_file_output")]
      OutputWrapper::CommandFileOutput(output) => output.render_result(frame, result),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn unknown_scheme_is_rejected() {
    let url = Url::parse("rtsp://localhost:8554/live").unwrap();
    assert!(matches!(
      OutputWrapper::from_url(&url),
      Err(OutputError::SchemeMismatch)
    ));
  }

  #[cfg(feature = "log_output")]
  #[test]
  fn log_scheme_dispatches() {
    let url = Url::parse("log:?nopause").unwrap();
    assert!(matches!(
      OutputWrapper::from_url(&url),
      Ok(OutputWrapper::LogOutput(_))
    ));
  }
}

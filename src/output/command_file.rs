// 该文件是 Shoushi （手势） 项目的一部分。
// src/output/command_file.rs - 指令文件输出
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

use std::fs::File;
use std::io::{BufWriter, Write};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tracing::info;
use url::Url;

use super::{OutputError, Render};
use crate::{FromUrl, FromUrlWithScheme, frame::HandsFrame, gesture::FrameOutcome};

#[derive(Serialize)]
struct CommandLine<'a> {
  frame: u64,
  #[serde(skip_serializing_if = "Option::is_none")]
  timestamp_ms: Option<u64>,
  #[serde(flatten)]
  outcome: &'a FrameOutcome,
}

/// 每行一个 JSON 对象，供外部的输入注入进程消费
///
/// 默认只写出带指令的帧，`?all` 时写出全部帧。
pub struct CommandFileOutput {
  writer: Mutex<BufWriter<File>>,
  frame_counter: AtomicU64,
  all: bool,
}

impl FromUrlWithScheme for CommandFileOutput {
  const SCHEME: &'static str = "jsonl";
}

impl FromUrl for CommandFileOutput {
  type Error = OutputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(OutputError::SchemeMismatch);
    }

    let path = url.path();
    let file = File::create(path)?;
    info!("写出指令文件: {}", path);
    let all = url.query_pairs().any(|(k, _)| k == "all");

    Ok(CommandFileOutput {
      writer: Mutex::new(BufWriter::new(file)),
      frame_counter: AtomicU64::new(0),
      all,
    })
  }
}

impl Render<HandsFrame, FrameOutcome> for CommandFileOutput {
  type Error = OutputError;

  fn render_result(&self, frame: &HandsFrame, result: &FrameOutcome) -> Result<(), Self::Error> {
    let index = self.frame_counter.fetch_add(1, Ordering::Relaxed) + 1;
    if !self.all && result.commands.is_empty() {
      return Ok(());
    }

    let line = serde_json::to_string(&CommandLine {
      frame: index,
      timestamp_ms: frame.timestamp_ms,
      outcome: result,
    })?;

    let mut writer = self.writer.lock().map_err(|_| OutputError::LockPoisoned)?;
    writeln!(writer, "{}", line)?;
    // 注入进程逐行读取，不能等缓冲区写满
    writer.flush()?;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::gesture::{Action, Command, InteractionMode, Key};

  fn temp_url(name: &str, query: &str) -> (std::path::PathBuf, Url) {
    let path = std::env::temp_dir().join(format!("shoushi-{}-{}.jsonl", name, std::process::id()));
    let url = Url::parse(&format!("jsonl://{}{}", path.display(), query)).unwrap();
    (path, url)
  }

  #[test]
  fn writes_only_frames_with_commands() {
    let (path, url) = temp_url("commands", "");
    let output = CommandFileOutput::from_url(&url).unwrap();

    let frame = HandsFrame::default().with_timestamp(Some(40));
    output
      .render_result(&frame, &FrameOutcome::default())
      .unwrap();
    output
      .render_result(
        &frame,
        &FrameOutcome {
          mode: InteractionMode::Workspace,
          action: Action::WorkspaceRight,
          commands: vec![Command::KeyPress { key: Key::Right }],
        },
      )
      .unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<_> = content.lines().collect();
    assert_eq!(lines.len(), 1);
    let value: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(value["frame"], 2);
    assert_eq!(value["timestamp_ms"], 40);
    assert_eq!(value["mode"], "workspace");
    assert_eq!(value["commands"][0]["kind"], "key_press");
    assert_eq!(value["commands"][0]["key"], "right");

    std::fs::remove_file(path).unwrap();
  }

  #[test]
  fn all_query_keeps_empty_frames() {
    let (path, url) = temp_url("all", "?all");
    let output = CommandFileOutput::from_url(&url).unwrap();
    for _ in 0..3 {
      output
        .render_result(&HandsFrame::default(), &FrameOutcome::default())
        .unwrap();
    }
    let content = std::fs::read_to_string(&path).unwrap();
    assert_eq!(content.lines().count(), 3);
    std::fs::remove_file(path).unwrap();
  }
}

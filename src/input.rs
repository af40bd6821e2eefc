// 该文件是 Shoushi （手势） 项目的一部分。
// src/input.rs - 手部关键点输入
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

use std::io::{BufRead, Lines};

use serde::Deserialize;
use thiserror::Error;
use tracing::{error, warn};

use crate::{
  FromUrl,
  frame::{HandsFrame, LandmarkFrame},
};

#[cfg(feature = "jsonl_input")]
mod jsonl_input;
#[cfg(feature = "jsonl_input")]
pub use self::jsonl_input::JsonLinesInput;

#[cfg(feature = "stdin_input")]
mod stdin_input;
#[cfg(feature = "stdin_input")]
pub use self::stdin_input::StdinInput;

#[derive(Error, Debug)]
pub enum InputError {
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("URI 方案不匹配")]
  SchemeMismatch,
}

/// 姿态估计器输出的一行数据，坐标已归一化到 [0, 1]
#[derive(Debug, Deserialize)]
struct FrameLine {
  width: u32,
  height: u32,
  #[serde(default)]
  timestamp_ms: Option<u64>,
  #[serde(default)]
  hands: Vec<Vec<Vec<f64>>>,
}

impl FrameLine {
  fn into_frame(self) -> HandsFrame {
    let (width, height) = (self.width, self.height);
    let hands = self
      .hands
      .into_iter()
      .map(|hand| {
        // 任一点坐标不完整则整只手视为无效
        let points: Option<Vec<[f64; 2]>> = hand
          .iter()
          .map(|point| match point.as_slice() {
            [x, y, ..] => Some([*x, *y]),
            _ => None,
          })
          .collect();
        LandmarkFrame::from_normalized(&points.unwrap_or_default(), width, height)
      })
      .collect();

    HandsFrame::new(width, height, hands).with_timestamp(self.timestamp_ms)
  }
}

/// 按行读取 JSON 格式的关键点帧，无效行记录后跳过
pub struct LandmarkReader<R> {
  lines: Lines<R>,
  line_number: usize,
}

impl<R: BufRead> LandmarkReader<R> {
  pub fn new(reader: R) -> Self {
    Self {
      lines: reader.lines(),
      line_number: 0,
    }
  }
}

impl<R: BufRead> Iterator for LandmarkReader<R> {
  type Item = HandsFrame;

  fn next(&mut self) -> Option<Self::Item> {
    loop {
      let line = match self.lines.next()? {
        Ok(line) => line,
        Err(e) => {
          error!("读取关键点输入失败: {}", e);
          return None;
        }
      };
      self.line_number += 1;

      let text = line.trim();
      if text.is_empty() {
        continue;
      }
      match serde_json::from_str::<FrameLine>(text) {
        Ok(frame) => return Some(frame.into_frame()),
        Err(e) => warn!("第 {} 行关键点数据无效，已跳过: {}", self.line_number, e),
      }
    }
  }
}

pub enum InputWrapper {
  #[cfg(feature = "jsonl_input")]
  JsonLinesInput(JsonLinesInput),
  #[cfg(feature = "stdin_input")]
  StdinInput(StdinInput),
}

impl FromUrl for InputWrapper {
  type Error = InputError;

  fn from_url(url: &url::Url) -> Result<Self, Self::Error> {
    #[cfg(feature = "jsonl_input")]
    {
      use crate::FromUrlWithScheme;

      if url.scheme() == JsonLinesInput::SCHEME {
        let input = JsonLinesInput::from_url(url)?;
        return Ok(InputWrapper::JsonLinesInput(input));
      }
    }
    #[cfg(feature = "stdin_input")]
    {
      use crate::FromUrlWithScheme;

      if url.scheme() == StdinInput::SCHEME {
        let input = StdinInput::from_url(url)?;
        return Ok(InputWrapper::StdinInput(input));
      }
    }
    error!("不支持的输入方案: {}", url.scheme());
    Err(InputError::SchemeMismatch)
  }
}

impl Iterator for InputWrapper {
  type Item = HandsFrame;

  fn next(&mut self) -> Option<Self::Item> {
    match self {
      #[cfg(feature = "jsonl_input")]
      InputWrapper::JsonLinesInput(input) => input.next(),
      #[cfg(feature = "stdin_input")]
      InputWrapper::StdinInput(input) => input.next(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::io::Cursor;

  fn hand_json(x: f64, y: f64) -> String {
    let points = vec![format!("[{}, {}, 0.0]", x, y); 21];
    format!("[{}]", points.join(","))
  }

  #[test]
  fn reads_frames_and_skips_bad_lines() {
    let data = format!(
      "{{\"width\": 640, \"height\": 480, \"timestamp_ms\": 33, \"hands\": [{}]}}\n\
       \n\
       not json\n\
       {{\"width\": 640, \"height\": 480}}\n",
      hand_json(0.5, 0.25)
    );
    let frames: Vec<_> = LandmarkReader::new(Cursor::new(data)).collect();
    assert_eq!(frames.len(), 2);

    let first = &frames[0];
    assert_eq!(first.timestamp_ms, Some(33));
    assert_eq!(first.hands.len(), 1);
    let wrist = first.hands[0].get(0).unwrap();
    assert_eq!((wrist.x, wrist.y), (320.0, 120.0));

    assert!(frames[1].hands.is_empty());
  }

  #[test]
  fn incomplete_points_make_hand_invalid() {
    let data = "{\"width\": 10, \"height\": 10, \"hands\": [[[0.1]]]}\n";
    let frames: Vec<_> = LandmarkReader::new(Cursor::new(data)).collect();
    assert_eq!(frames.len(), 1);
    assert!(!frames[0].hands[0].is_valid());
  }

  #[test]
  fn unknown_scheme_is_rejected() {
    let url = url::Url::parse("rtsp://camera/stream").unwrap();
    assert!(matches!(
      InputWrapper::from_url(&url),
      Err(InputError::SchemeMismatch)
    ));
  }

  #[cfg(feature = "jsonl_input")]
  #[test]
  fn missing_file_fails_before_reading() {
    let url = url::Url::parse("jsonl:///nonexistent/shoushi/landmarks.jsonl").unwrap();
    assert!(matches!(
      InputWrapper::from_url(&url),
      Err(InputError::IoError(_))
    ));
  }
}

// 该文件是 Shoushi （手势） 项目的一部分。
// src/input/jsonl_input.rs - 关键点记录文件输入
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
use std::io::BufReader;

use tracing::{error, info};
use url::Url;

use super::{InputError, LandmarkReader};
use crate::{FromUrl, FromUrlWithScheme, frame::HandsFrame};

pub struct JsonLinesInput {
  reader: LandmarkReader<BufReader<File>>,
}

impl FromUrlWithScheme for JsonLinesInput {
  const SCHEME: &'static str = "jsonl";
}

impl FromUrl for JsonLinesInput {
  type Error = InputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      error!(
        "URI 方案不匹配: 期望 '{}', 实际 '{}'",
        Self::SCHEME,
        url.scheme()
      );
      return Err(InputError::SchemeMismatch);
    }

    let path = url.path();
    let file = File::open(path)?;
    info!("打开关键点记录文件: {}", path);

    Ok(JsonLinesInput {
      reader: LandmarkReader::new(BufReader::new(file)),
    })
  }
}

impl Iterator for JsonLinesInput {
  type Item = HandsFrame;

  fn next(&mut self) -> Option<Self::Item> {
    self.reader.next()
  }
}

// 该文件是 Shoushi （手势） 项目的一部分。
// src/input/stdin_input.rs - 标准输入关键点流
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

use std::io::{BufReader, Stdin};

use tracing::info;
use url::Url;

use super::{InputError, LandmarkReader};
use crate::{FromUrl, FromUrlWithScheme, frame::HandsFrame};

/// 从管道读取外部姿态估计器的实时输出
pub struct StdinInput {
  reader: LandmarkReader<BufReader<Stdin>>,
}

impl FromUrlWithScheme for StdinInput {
  const SCHEME: &'static str = "stdin";
}

impl FromUrl for StdinInput {
  type Error = InputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(InputError::SchemeMismatch);
    }

    info!("从标准输入读取关键点");
    Ok(StdinInput {
      reader: LandmarkReader::new(BufReader::new(std::io::stdin())),
    })
  }
}

impl Iterator for StdinInput {
  type Item = HandsFrame;

  fn next(&mut self) -> Option<Self::Item> {
    self.reader.next()
  }
}

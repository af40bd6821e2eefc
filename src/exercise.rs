// 该文件是 Shoushi （手势） 项目的一部分。
// src/exercise.rs - 康复练习目录
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

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum CatalogError {
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("练习目录解析错误: {0}")]
  ParseError(#[from] serde_json::Error),
  #[error("找不到练习: {0}")]
  NotFound(u32),
}

/// 练习进度所依据的指标
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
  #[default]
  #[serde(alias = "ROM (Distância)")]
  Rom,
  Angle,
}

fn default_rom_min() -> f64 {
  100.0
}

fn default_rom_max() -> f64 {
  300.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
  pub id: u32,
  #[serde(alias = "titulo")]
  pub title: String,
  #[serde(default = "default_rom_min")]
  pub rom_min: f64,
  #[serde(default = "default_rom_max")]
  pub rom_max: f64,
  #[serde(default, alias = "metrica")]
  pub metric: MetricKind,
}

/// 将空格与路径分隔符替换为下划线，得到可用作文件名的字符串
pub fn safe_file_name(name: &str) -> String {
  name.replace([' ', '/'], "_")
}

impl Exercise {
  /// 使用默认活动度区间、按活动度计算进度的练习
  pub fn new(id: u32, title: impl Into<String>) -> Self {
    Self {
      id,
      title: title.into(),
      rom_min: default_rom_min(),
      rom_max: default_rom_max(),
      metric: MetricKind::default(),
    }
  }

  /// 用于文件名的练习名称
  pub fn safe_name(&self) -> String {
    safe_file_name(&self.title)
  }

  /// 当前指标在 [rom_min, rom_max] 区间内的进度 (0..=1)
  pub fn progress(&self, rom: f64, angle: f64) -> f64 {
    let value = match self.metric {
      MetricKind::Rom => rom,
      MetricKind::Angle => angle,
    };
    let range = self.rom_max - self.rom_min;
    if range <= 0.0 {
      return 0.0;
    }
    ((value - self.rom_min) / range).clamp(0.0, 1.0)
  }
}

#[derive(Debug, Clone, Default)]
pub struct ExerciseCatalog {
  exercises: Vec<Exercise>,
}

impl From<Vec<Exercise>> for ExerciseCatalog {
  fn from(exercises: Vec<Exercise>) -> Self {
    Self { exercises }
  }
}

impl ExerciseCatalog {
  pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    let catalog = Self::from_json(&content)?;
    info!("已加载练习目录 {:?}, 共 {} 项", path, catalog.exercises.len());
    Ok(catalog)
  }

  pub fn from_json(content: &str) -> Result<Self, CatalogError> {
    let exercises: Vec<Exercise> = serde_json::from_str(content)?;
    Ok(Self { exercises })
  }

  pub fn find(&self, id: u32) -> Result<&Exercise, CatalogError> {
    self
      .exercises
      .iter()
      .find(|exercise| exercise.id == id)
      .ok_or(CatalogError::NotFound(id))
  }

  pub fn exercises(&self) -> &[Exercise] {
    &self.exercises
  }
}

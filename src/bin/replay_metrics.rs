// 该文件是 Shoushi （手势） 项目的一部分。
// src/bin/replay_metrics.rs - 回放关键点记录并计算训练指标
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

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use serde::Serialize;
use tracing::{info, warn};
use url::Url;

use shoushi::{
  FromUrl,
  exercise::{Exercise, ExerciseCatalog},
  gesture::GestureConfig,
  input::InputWrapper,
  output::{DirectoryRecordOutput, SessionExport},
  session::{Session, SessionSummary},
};

/// 回放参数，不会产生任何系统输入
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 关键点记录，例如 jsonl:///path/to/landmarks.jsonl
  #[arg(long, value_name = "SOURCE")]
  pub input: Url,
  #[arg(long, default_value = "replay")]
  pub patient: String,
  #[arg(long, default_value = "replay")]
  pub exercise: String,
  /// 练习目录，与 --exercise-id 一起使用时按目录中的目标区间计算进度
  #[arg(long, value_name = "CATALOG")]
  pub catalog: Option<PathBuf>,
  #[arg(long, value_name = "ID", requires = "catalog")]
  pub exercise_id: Option<u32>,
  /// 同时导出会话数据，例如 folder:///tmp/shoushi
  #[arg(long, value_name = "DIRECTORY")]
  pub record: Option<Url>,

  #[arg(long, value_name = "FRAME_NUMBER")]
  pub frame_number: Option<usize>,
}

#[derive(Serialize)]
struct Report {
  #[serde(flatten)]
  summary: SessionSummary,
  frames: usize,
  modes: BTreeMap<&'static str, usize>,
}

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = Args::parse();
  info!("输入来源: {}", args.input);

  let input = InputWrapper::from_url(&args.input)?;
  let exercise = match (&args.catalog, args.exercise_id) {
    (Some(catalog), Some(id)) => ExerciseCatalog::load(catalog)?.find(id)?.clone(),
    _ => Exercise::new(0, args.exercise.clone()),
  };
  let mut session = Session::new(&args.patient, &exercise, GestureConfig::default());

  let mut frames = 0usize;
  let mut modes = BTreeMap::new();
  for frame in input.take(args.frame_number.unwrap_or(usize::MAX)) {
    let outcome = session.per_frame(&frame);
    *modes.entry(outcome.mode.as_str()).or_insert(0) += 1;
    frames += 1;
  }

  let record = session.finish();
  let mut summary = SessionSummary::from(&record);
  if let Some(url) = &args.record {
    match DirectoryRecordOutput::from_url(url)?.export_session(&record) {
      Ok(path) => summary = summary.with_data_file(path),
      Err(e) => warn!("会话数据导出失败: {}", e),
    }
  }

  let report = Report {
    summary,
    frames,
    modes,
  };
  println!("{}", serde_json::to_string_pretty(&report)?);

  Ok(())
}

// 该文件是 Shoushi （手势） 项目的一部分。
// src/output/directory_record.rs - 会话数据目录记录
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
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU16, Ordering};

use chrono::Datelike;
use thiserror::Error;
use tracing::info;

use crate::{
  FromUrl, FromUrlWithScheme,
  output::{OutputError, SessionExport},
  session::{SessionRecord, SessionSummary},
};

#[derive(Error, Debug)]
pub enum DirectoryRecordOutputError {
  #[error("URI 方案不匹配")]
  SchemeMismatch,
  #[error("会话没有采集到任何帧")]
  NoFrames,
  #[error("CSV 错误: {0}")]
  CsvError(#[from] csv::Error),
  #[error("JSON 错误: {0}")]
  JsonError(#[from] serde_json::Error),
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
}

/// 按 `<根目录>/<患者>/<年>/<月>/<日>/` 归档每次会话的逐帧数据与摘要
pub struct DirectoryRecordOutput {
  directory: PathBuf,
  file_counter: AtomicU16,
}

impl FromUrlWithScheme for DirectoryRecordOutput {
  const SCHEME: &'static str = "folder";
}

impl FromUrl for DirectoryRecordOutput {
  type Error = DirectoryRecordOutputError;

  fn from_url(uri: &url::Url) -> Result<Self, Self::Error> {
    if uri.scheme() != Self::SCHEME {
      return Err(DirectoryRecordOutputError::SchemeMismatch);
    }

    Ok(DirectoryRecordOutput::new(uri.path()))
  }
}

impl DirectoryRecordOutput {
  pub fn new(directory: impl Into<PathBuf>) -> Self {
    Self {
      directory: directory.into(),
      file_counter: AtomicU16::new(0),
    }
  }

  fn session_directory(&self, record: &SessionRecord) -> Result<PathBuf, DirectoryRecordOutputError> {
    let started = record.started_at;
    let directory = self
      .directory
      .join(record.patient_file_name())
      .join(started.year().to_string())
      .join(format!("{:02}", started.month()))
      .join(format!("{:02}", started.day()));
    if !directory.exists() {
      std::fs::create_dir_all(&directory)?;
    }
    Ok(directory)
  }

  /// 同一秒内的多次会话追加序号避免覆盖
  fn data_stem(&self, directory: &Path, record: &SessionRecord) -> String {
    let stem = format!(
      "{}-{}",
      record.exercise_file_name(),
      record.started_at.format("%H-%M-%S")
    );
    if !directory.join(format!("{}.csv", stem)).exists() {
      return stem;
    }
    let id = self.file_counter.fetch_add(1, Ordering::Relaxed) + 1;
    format!("{}-{:04X}", stem, id)
  }

  pub fn write_session(&self, record: &SessionRecord) -> Result<PathBuf, DirectoryRecordOutputError> {
    if record.frames.is_empty() {
      return Err(DirectoryRecordOutputError::NoFrames);
    }

    let directory = self.session_directory(record)?;
    let stem = self.data_stem(&directory, record);
    let data_path = directory.join(format!("{}.csv", stem));
    let summary_path = directory.join(format!("{}-summary.json", stem));

    let mut file = BufWriter::new(File::create(&data_path)?);
    writeln!(
      file,
      "# smoothness: {:.6}",
      record.metrics.smoothness_score
    )?;
    let mut writer = csv::Writer::from_writer(file);
    for frame in &record.frames {
      writer.serialize(frame)?;
    }
    writer.flush()?;

    let summary = SessionSummary::from(record).with_data_file(data_path.clone());
    let summary_file = BufWriter::new(File::create(&summary_path)?);
    serde_json::to_writer_pretty(summary_file, &summary)?;

    info!(
      "已保存会话数据 {:?} ({} 帧)",
      data_path,
      record.frames.len()
    );
    Ok(data_path)
  }
}

impl SessionExport for DirectoryRecordOutput {
  fn export_session(&self, record: &SessionRecord) -> Result<PathBuf, OutputError> {
    self.write_session(record).map_err(OutputError::from)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::exercise::Exercise;
  use crate::frame::{HandsFrame, Point};
  use crate::landmark::synthetic_hand;
  use crate::session::SessionRecorder;
  use std::time::{Duration, Instant};

  fn temp_root(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("shoushi-record-{}-{}", name, std::process::id()))
  }

  fn record_with_frames(count: usize) -> SessionRecord {
    let start = Instant::now();
    // 合成手部的活动度为 0，正好落在目标区间中点
    let exercise = Exercise {
      rom_min: -1.0,
      rom_max: 1.0,
      ..Exercise::new(1, "Wrist flexion")
    };
    let mut recorder = SessionRecorder::new("patient 1", &exercise, start);
    for i in 0..count {
      let hand = synthetic_hand(Point::new(100.0 + i as f64, 200.0), [true; 5]);
      recorder.record(
        &HandsFrame::new(640, 480, vec![hand]),
        start + Duration::from_millis(33 * i as u64),
      );
    }
    recorder.finish(start + Duration::from_secs(1))
  }

  #[test]
  fn writes_csv_and_summary() {
    let root = temp_root("csv");
    let output = DirectoryRecordOutput::from_url(
      &url::Url::parse(&format!("folder://{}", root.display())).unwrap(),
    )
    .unwrap();

    let record = record_with_frames(3);
    let path = output.write_session(&record).unwrap();
    assert!(path.starts_with(root.join("patient_1")));
    assert!(
      path
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with("Wrist_flexion-") && name.ends_with(".csv"))
    );

    let content = std::fs::read_to_string(&path).unwrap();
    let mut lines = content.lines();
    assert_eq!(lines.next(), Some("# smoothness: 0.000000"));
    assert_eq!(
      lines.next(),
      Some("time_offset_seconds,rom,angle,progress,hand_center_x,hand_center_y,frame_width,frame_height")
    );
    let rows: Vec<&str> = lines.collect();
    assert_eq!(rows.len(), 3);
    for row in rows {
      let progress: f64 = row.split(',').nth(3).unwrap().parse().unwrap();
      assert!((progress - 0.5).abs() < 1e-9);
    }

    let summary_path = path.with_file_name(format!(
      "{}-summary.json",
      path.file_stem().and_then(|stem| stem.to_str()).unwrap()
    ));
    let summary: serde_json::Value =
      serde_json::from_str(&std::fs::read_to_string(summary_path).unwrap()).unwrap();
    assert_eq!(summary["frame_count"], 3);
    assert_eq!(summary["patient_id"], "patient 1");

    // 同一秒内再次导出不会覆盖
    let second = output.write_session(&record).unwrap();
    assert_ne!(second, path);

    std::fs::remove_dir_all(root).unwrap();
  }

  #[test]
  fn empty_session_is_not_written() {
    let root = temp_root("empty");
    let output = DirectoryRecordOutput::new(&root);
    assert!(matches!(
      output.write_session(&record_with_frames(0)),
      Err(DirectoryRecordOutputError::NoFrames)
    ));
    assert!(!root.exists());
  }
}

// 该文件是 Shoushi （手势） 项目的一部分。
// src/bin/gesture_session.rs - 手势控制与康复训练会话
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
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};
use url::Url;

use shoushi::{
  FromUrl,
  exercise::ExerciseCatalog,
  gesture::GestureConfig,
  output::DirectoryRecordOutput,
  session::SessionController,
};

/// Shoushi 会话参数配置
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 练习目录 JSON 文件
  #[arg(long, value_name = "FILE")]
  pub catalog: PathBuf,
  /// 患者编号
  #[arg(long, value_name = "ID")]
  pub patient: String,
  /// 练习编号
  #[arg(long, value_name = "ID")]
  pub exercise: u32,
  /// 关键点来源，例如 stdin: 或 jsonl:///path/to/landmarks.jsonl
  #[arg(long, value_name = "SOURCE", default_value = "stdin:")]
  pub input: Url,
  /// 指令输出，例如 log: 或 jsonl:///path/to/commands.jsonl
  #[arg(long, value_name = "OUTPUT", default_value = "log:")]
  pub output: Url,
  /// 会话数据保存目录，例如 folder:///var/lib/shoushi
  #[arg(long, value_name = "DIRECTORY")]
  pub record: Option<Url>,

  #[arg(long, default_value = "1920")]
  pub screen_width: u32,
  #[arg(long, default_value = "1080")]
  pub screen_height: u32,

  #[arg(long, value_name = "FRAME_NUMBER")]
  pub frame_number: Option<usize>,
}

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = Args::parse();

  info!("练习目录: {:?}", args.catalog);
  info!("输入来源: {}", args.input);
  info!("指令输出: {}", args.output);

  let catalog = ExerciseCatalog::load(&args.catalog)?;
  let config =
    GestureConfig::default().with_screen(args.screen_width as f64, args.screen_height as f64);
  let mut controller = SessionController::new(catalog, config).with_frame_number(args.frame_number);
  if let Some(record) = &args.record {
    info!("会话数据目录: {}", record);
    controller = controller.with_exporter(DirectoryRecordOutput::from_url(record)?);
  }

  let (tx, rx) = mpsc::channel();
  ctrlc::set_handler(move || {
    info!("收到中断信号，准备停止会话...");
    let _ = tx.send(());
    thread::spawn(|| {
      thread::sleep(Duration::from_secs(30));
      warn!("强制退出程序");
      std::process::exit(1);
    });
  })?;

  let handle = controller.start_from_url(&args.patient, args.exercise, &args.input, &args.output)?;

  loop {
    match rx.recv_timeout(Duration::from_millis(200)) {
      Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
      Err(RecvTimeoutError::Timeout) => {
        if controller.is_finished() {
          info!("输入已结束");
          break;
        }
      }
    }
  }

  let summary = controller.stop(&handle)?;
  println!("{}", serde_json::to_string_pretty(&summary)?);

  Ok(())
}

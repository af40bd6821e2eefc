// 该文件是 Shoushi （手势） 项目的一部分。
// src/gesture/clock.rs - 冷却计时所用的时钟
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

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// 冷却计时使用墙上时钟而非帧数，帧率并不恒定
pub trait Clock {
  fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> Instant {
    Instant::now()
  }
}

/// 手动推进的时钟，克隆体共享同一时间
#[derive(Debug, Clone)]
pub struct ManualClock {
  origin: Instant,
  offset_us: Arc<AtomicU64>,
}

impl Default for ManualClock {
  fn default() -> Self {
    Self::new()
  }
}

impl ManualClock {
  pub fn new() -> Self {
    Self {
      origin: Instant::now(),
      offset_us: Arc::new(AtomicU64::new(0)),
    }
  }

  pub fn advance(&self, by: Duration) {
    self
      .offset_us
      .fetch_add(by.as_micros() as u64, Ordering::SeqCst);
  }

  pub fn elapsed(&self) -> Duration {
    Duration::from_micros(self.offset_us.load(Ordering::SeqCst))
  }
}

impl Clock for ManualClock {
  fn now(&self) -> Instant {
    self.origin + self.elapsed()
  }
}

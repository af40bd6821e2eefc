// 该文件是 Shoushi （手势） 项目的一部分。
// src/gesture.rs - 手势模式与指令定义
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

use std::fmt;
use std::time::Duration;

use serde::Serialize;

use crate::landmark::PINCH_NORM_THRESHOLD;

/// 逐帧解释输入的组件
pub trait Interpreter {
  type Input;
  type Output;
  type Error;

  fn interpret(&mut self, input: &Self::Input) -> Result<Self::Output, Self::Error>;
}

mod clock;
mod machine;
pub use self::clock::{Clock, ManualClock, SystemClock};
pub use self::machine::{GestureMachine, NavigationState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionMode {
  #[default]
  Idle,
  Mouse,
  Scroll,
  Zoom,
  Workspace,
  WorkspaceSelect,
}

impl InteractionMode {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Idle => "idle",
      Self::Mouse => "mouse",
      Self::Scroll => "scroll",
      Self::Zoom => "zoom",
      Self::Workspace => "workspace",
      Self::WorkspaceSelect => "workspace_select",
    }
  }

  pub fn is_workspace(&self) -> bool {
    matches!(self, Self::Workspace | Self::WorkspaceSelect)
  }
}

impl fmt::Display for InteractionMode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// 每帧产生的动作标签
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
  #[default]
  None,
  ExitWorkspace,
  Moving,
  Dragging,
  Scroll(i32),
  ZoomIn,
  ZoomOut,
  WorkspaceOpened,
  WorkspaceReference,
  WorkspaceNavigating,
  WorkspaceRight,
  WorkspaceLeft,
  WorkspaceSelected,
}

impl fmt::Display for Action {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::None => f.write_str("none"),
      Self::ExitWorkspace => f.write_str("exit workspace"),
      Self::Moving => f.write_str("moving"),
      Self::Dragging => f.write_str("dragging"),
      Self::Scroll(amount) => write!(f, "scroll {}", amount),
      Self::ZoomIn => f.write_str("zoom in"),
      Self::ZoomOut => f.write_str("zoom out"),
      Self::WorkspaceOpened => f.write_str("workspace: opened"),
      Self::WorkspaceReference => f.write_str("workspace: move hand"),
      Self::WorkspaceNavigating => f.write_str("workspace: navigating"),
      Self::WorkspaceRight => f.write_str("workspace: right"),
      Self::WorkspaceLeft => f.write_str("workspace: left"),
      Self::WorkspaceSelected => f.write_str("workspace: selected"),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
  Escape,
  Enter,
  Left,
  Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Modifier {
  Control,
}

/// 交给系统输入注入端执行的指令
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Command {
  PointerMove {
    x: i32,
    y: i32,
  },
  ButtonDown,
  ButtonUp,
  Scroll {
    amount: i32,
    modifier: Option<Modifier>,
  },
  KeyPress {
    key: Key,
  },
  OpenTaskSwitcher,
  /// 等待系统动画完成或去抖
  Pause {
    millis: u64,
  },
}

impl Command {
  pub fn pause(duration: Duration) -> Self {
    Command::Pause {
      millis: duration.as_millis() as u64,
    }
  }
}

impl fmt::Display for Command {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::PointerMove { x, y } => write!(f, "pointer-move ({}, {})", x, y),
      Self::ButtonDown => f.write_str("button-down"),
      Self::ButtonUp => f.write_str("button-up"),
      Self::Scroll {
        amount,
        modifier: Some(Modifier::Control),
      } => write!(f, "ctrl+scroll {}", amount),
      Self::Scroll {
        amount,
        modifier: None,
      } => write!(f, "scroll {}", amount),
      Self::KeyPress { key } => write!(f, "key {:?}", key),
      Self::OpenTaskSwitcher => f.write_str("open-task-switcher"),
      Self::Pause { millis } => write!(f, "pause {}ms", millis),
    }
  }
}

/// 单帧的解释结果
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct FrameOutcome {
  pub mode: InteractionMode,
  pub action: Action,
  pub commands: Vec<Command>,
}

/// 手势识别参数
#[derive(Debug, Clone)]
pub struct GestureConfig {
  pub pinch_threshold: f64,
  pub scroll_sensitivity: f64,
  /// 每个滚动单位对应的系统滚动量
  pub scroll_multiplier: i32,
  /// 触发缩放所需的双手距离变化（像素）
  pub zoom_sensitivity: f64,
  pub zoom_step: i32,
  pub zoom_cooldown: Duration,
  pub map_margin: f64,
  /// 指针指数平滑系数，作用于上一帧位置
  pub smoothing: f64,
  pub workspace_nav_sensitivity: f64,
  pub workspace_nav_cooldown: Duration,
  pub workspace_settle: Duration,
  pub select_debounce: Duration,
  pub screen_width: f64,
  pub screen_height: f64,
}

impl Default for GestureConfig {
  fn default() -> Self {
    Self {
      pinch_threshold: PINCH_NORM_THRESHOLD,
      scroll_sensitivity: 4.0,
      scroll_multiplier: 15,
      zoom_sensitivity: 15.0,
      zoom_step: 20,
      zoom_cooldown: Duration::from_millis(60),
      map_margin: 100.0,
      smoothing: 0.82,
      workspace_nav_sensitivity: 50.0,
      workspace_nav_cooldown: Duration::from_millis(400),
      workspace_settle: Duration::from_millis(200),
      select_debounce: Duration::from_millis(500),
      screen_width: 1920.0,
      screen_height: 1080.0,
    }
  }
}

impl GestureConfig {
  pub fn with_screen(mut self, width: f64, height: f64) -> Self {
    self.screen_width = width;
    self.screen_height = height;
    self
  }

  pub fn screen_center(&self) -> (f64, f64) {
    (self.screen_width / 2.0, self.screen_height / 2.0)
  }
}

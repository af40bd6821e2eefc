// 该文件是 Shoushi （手势） 项目的一部分。
// src/gesture/machine.rs - 手势状态机
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

use std::convert::Infallible;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use super::{
  Action, Clock, Command, FrameOutcome, GestureConfig, InteractionMode, Interpreter, Key, Modifier,
  SystemClock,
};
use crate::frame::Point;
use crate::landmark::{HandObservation, ObservedFrame};

/// 跨帧导航状态，仅由状态机修改
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationState {
  pub previous_pointer: Point,
  pub previous_zoom_distance: Option<f64>,
  pub previous_scroll_y: Option<f64>,
  pub pinch_pressed: bool,
  pub workspace_active: bool,
  pub previous_workspace_x: Option<f64>,
  pub last_zoom_time: Option<Instant>,
  pub last_workspace_nav_time: Option<Instant>,
}

impl NavigationState {
  pub fn new(pointer: Point) -> Self {
    Self {
      previous_pointer: pointer,
      previous_zoom_distance: None,
      previous_scroll_y: None,
      pinch_pressed: false,
      workspace_active: false,
      previous_workspace_x: None,
      last_zoom_time: None,
      last_workspace_nav_time: None,
    }
  }

  fn clear_workspace(&mut self) {
    self.workspace_active = false;
    self.previous_workspace_x = None;
  }
}

fn cooled_down(now: Instant, last: Option<Instant>, cooldown: Duration) -> bool {
  last.is_none_or(|last| now.saturating_duration_since(last) >= cooldown)
}

/// 将 [lo, hi] 线性映射到 [0, out]，超出范围时截断
fn interp(value: f64, lo: f64, hi: f64, out: f64) -> f64 {
  if hi <= lo {
    return if value < lo { 0.0 } else { out };
  }
  ((value - lo) / (hi - lo)).clamp(0.0, 1.0) * out
}

/// 手势状态机
///
/// 每帧调用一次 [`GestureMachine::update`]，且必须按帧顺序调用。
pub struct GestureMachine<C = SystemClock> {
  config: GestureConfig,
  clock: C,
  state: NavigationState,
  mode: InteractionMode,
}

impl GestureMachine<SystemClock> {
  pub fn new(config: GestureConfig) -> Self {
    Self::with_clock(config, SystemClock)
  }
}

impl<C: Clock> GestureMachine<C> {
  pub fn with_clock(config: GestureConfig, clock: C) -> Self {
    let (x, y) = config.screen_center();
    Self {
      state: NavigationState::new(Point::new(x, y)),
      config,
      clock,
      mode: InteractionMode::Idle,
    }
  }

  pub fn with_state(mut self, state: NavigationState) -> Self {
    self.state = state;
    self
  }

  pub fn state(&self) -> &NavigationState {
    &self.state
  }

  pub fn mode(&self) -> InteractionMode {
    self.mode
  }

  pub fn config(&self) -> &GestureConfig {
    &self.config
  }

  pub fn detect_mode(&self, hands: &[HandObservation]) -> InteractionMode {
    match hands {
      [] => InteractionMode::Idle,
      [hand] => match hand.extended_finger_count {
        2 => InteractionMode::Scroll,
        1 => InteractionMode::Mouse,
        _ => InteractionMode::Idle,
      },
      [first, second, ..] => {
        if self.state.workspace_active && first.is_closed() && second.is_closed() {
          InteractionMode::WorkspaceSelect
        } else if (first.is_open() && second.is_closed()) || (second.is_open() && first.is_closed())
        {
          InteractionMode::Workspace
        } else if first.is_open() && second.is_open() {
          InteractionMode::Zoom
        } else {
          InteractionMode::Idle
        }
      }
    }
  }

  pub fn update(&mut self, frame: &ObservedFrame) -> FrameOutcome {
    let hands = frame.hands.as_slice();
    if hands.len() > 2 {
      debug!("检测到 {} 只手，仅使用前两只", hands.len());
    }

    let mode = self.detect_mode(hands);
    if mode != self.mode {
      info!("模式切换: {} -> {}", self.mode, mode);
      self.mode = mode;
    }

    let mut outcome = FrameOutcome {
      mode,
      ..Default::default()
    };

    if !mode.is_workspace() && self.state.workspace_active {
      info!("退出工作区视图");
      outcome.commands.push(Command::KeyPress { key: Key::Escape });
      outcome.action = Action::ExitWorkspace;
      self.state.clear_workspace();
    }

    match (mode, hands) {
      (InteractionMode::Mouse, [hand]) => self.on_mouse(hand, frame.width, frame.height, &mut outcome),
      (InteractionMode::Scroll, [hand]) => self.on_scroll(hand, &mut outcome),
      (InteractionMode::Zoom, [first, second, ..]) => self.on_zoom(first, second, &mut outcome),
      (InteractionMode::Workspace, [first, second, ..]) => {
        self.on_workspace(first, second, &mut outcome)
      }
      (InteractionMode::WorkspaceSelect, _) => self.on_workspace_select(&mut outcome),
      _ => self.on_idle(&mut outcome),
    }

    debug!(
      "模式: {}, 动作: {}, 指令数: {}",
      outcome.mode,
      outcome.action,
      outcome.commands.len()
    );
    outcome
  }

  fn on_mouse(&mut self, hand: &HandObservation, width: f64, height: f64, out: &mut FrameOutcome) {
    let margin = self.config.map_margin;
    let target_x = interp(hand.index_tip.x, margin, width - margin, self.config.screen_width);
    let target_y = interp(hand.index_tip.y, margin, height - margin, self.config.screen_height);

    let s = self.config.smoothing;
    let prev = self.state.previous_pointer;
    let pointer = Point::new(
      prev.x * s + target_x * (1.0 - s),
      prev.y * s + target_y * (1.0 - s),
    );
    self.state.previous_pointer = pointer;
    out.commands.push(Command::PointerMove {
      x: pointer.x as i32,
      y: pointer.y as i32,
    });
    out.action = Action::Moving;

    if hand.is_pinching {
      if !self.state.pinch_pressed {
        debug!("捏合开始，按下鼠标");
        out.commands.push(Command::ButtonDown);
        self.state.pinch_pressed = true;
        out.action = Action::Dragging;
      }
    } else if self.state.pinch_pressed {
      debug!("捏合结束，释放鼠标");
      out.commands.push(Command::ButtonUp);
      self.state.pinch_pressed = false;
    }
  }

  fn on_scroll(&mut self, hand: &HandObservation, out: &mut FrameOutcome) {
    let y = hand.index_tip.y;
    let Some(prev) = self.state.previous_scroll_y else {
      self.state.previous_scroll_y = Some(y);
      return;
    };

    // 截断取整（越界时饱和）；只有触发滚动时才更新基准
    let amount = ((prev - y) / self.config.scroll_sensitivity) as i32;
    if amount != 0 {
      out.commands.push(Command::Scroll {
        amount: amount.saturating_mul(self.config.scroll_multiplier),
        modifier: None,
      });
      out.action = Action::Scroll(amount);
      self.state.previous_scroll_y = Some(y);
    }
  }

  fn on_zoom(&mut self, first: &HandObservation, second: &HandObservation, out: &mut FrameOutcome) {
    let distance = first.palm_center.distance(&second.palm_center);
    let Some(prev) = self.state.previous_zoom_distance else {
      self.state.previous_zoom_distance = Some(distance);
      return;
    };

    let now = self.clock.now();
    let diff = distance - prev;
    let sensitivity = self.config.zoom_sensitivity;
    if diff.abs() > sensitivity
      && cooled_down(now, self.state.last_zoom_time, self.config.zoom_cooldown)
    {
      let value = ((diff.abs() / sensitivity).floor() as i32).saturating_mul(self.config.zoom_step);
      let (amount, action) = if diff > 0.0 {
        (value, Action::ZoomIn)
      } else {
        (-value, Action::ZoomOut)
      };
      out.commands.push(Command::Scroll {
        amount,
        modifier: Some(Modifier::Control),
      });
      out.action = action;
      self.state.last_zoom_time = Some(now);
      self.state.previous_zoom_distance = Some(distance);
    }
  }

  fn on_workspace(&mut self, first: &HandObservation, second: &HandObservation, out: &mut FrameOutcome) {
    if !self.state.workspace_active {
      info!("打开任务视图");
      out.commands.push(Command::OpenTaskSwitcher);
      out.commands.push(Command::pause(self.config.workspace_settle));
      out.action = Action::WorkspaceOpened;
      self.state.workspace_active = true;
      return;
    }

    let Some(open_hand) = [first, second].into_iter().find(|hand| hand.is_open()) else {
      return;
    };
    let x = open_hand.palm_center.x;

    let Some(reference) = self.state.previous_workspace_x else {
      self.state.previous_workspace_x = Some(x);
      out.action = Action::WorkspaceReference;
      return;
    };

    out.action = Action::WorkspaceNavigating;
    let now = self.clock.now();
    if !cooled_down(
      now,
      self.state.last_workspace_nav_time,
      self.config.workspace_nav_cooldown,
    ) {
      return;
    }

    // 触发后重置参考点，一次挥动只产生一次导航
    let dx = x - reference;
    let sensitivity = self.config.workspace_nav_sensitivity;
    let (key, action) = if dx > sensitivity {
      (Key::Right, Action::WorkspaceRight)
    } else if dx < -sensitivity {
      (Key::Left, Action::WorkspaceLeft)
    } else {
      return;
    };

    debug!("工作区导航: {:?}, dx = {:.1}", key, dx);
    out.commands.push(Command::KeyPress { key });
    out.action = action;
    self.state.previous_workspace_x = Some(x);
    self.state.last_workspace_nav_time = Some(now);
  }

  fn on_workspace_select(&mut self, out: &mut FrameOutcome) {
    if !self.state.workspace_active {
      return;
    }
    info!("确认工作区选择");
    out.commands.push(Command::KeyPress { key: Key::Enter });
    out.commands.push(Command::pause(self.config.select_debounce));
    out.action = Action::WorkspaceSelected;
    self.state.clear_workspace();
  }

  fn on_idle(&mut self, out: &mut FrameOutcome) {
    if self.state.pinch_pressed {
      out.commands.push(Command::ButtonUp);
      self.state.pinch_pressed = false;
    }
    // 重新进入滚动/缩放时从第一帧重新校准
    self.state.previous_scroll_y = None;
    self.state.previous_zoom_distance = None;
  }
}

impl<C: Clock> Interpreter for GestureMachine<C> {
  type Input = ObservedFrame;
  type Output = FrameOutcome;
  type Error = Infallible;

  fn interpret(&mut self, input: &Self::Input) -> Result<Self::Output, Self::Error> {
    Ok(self.update(input))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::frame::{HandsFrame, LANDMARK_COUNT, LandmarkFrame};
  use crate::gesture::ManualClock;
  use crate::landmark::{INDEX_TIP, PINCH_NORM_THRESHOLD, THUMB_TIP, synthetic_hand};

  const POINTING: [bool; 5] = [false, true, false, false, false];
  const TWO_FINGERS: [bool; 5] = [false, true, true, false, false];
  const OPEN: [bool; 5] = [true; 5];
  const FIST: [bool; 5] = [false; 5];

  fn observed(hands: Vec<LandmarkFrame>) -> ObservedFrame {
    ObservedFrame::from_frame(&HandsFrame::new(640, 480, hands), PINCH_NORM_THRESHOLD)
  }

  fn hand(x: f64, y: f64, fingers: [bool; 5]) -> LandmarkFrame {
    synthetic_hand(Point::new(x, y), fingers)
  }

  fn pinching_hand(x: f64, y: f64) -> LandmarkFrame {
    let mut points = synthetic_hand(Point::new(x, y), POINTING).points().to_vec();
    points[THUMB_TIP] = points[INDEX_TIP];
    // 拇指尖与食指尖重合后仍需保持拇指收起
    points[3] = Point::new(points[THUMB_TIP].x - 1.0, points[THUMB_TIP].y);
    assert_eq!(points.len(), LANDMARK_COUNT);
    points.into()
  }

  fn machine() -> (GestureMachine<ManualClock>, ManualClock) {
    let clock = ManualClock::new();
    let machine = GestureMachine::with_clock(GestureConfig::default(), clock.clone());
    (machine, clock)
  }

  fn count_commands(outcomes: &[FrameOutcome], command: Command) -> usize {
    outcomes
      .iter()
      .flat_map(|outcome| outcome.commands.iter())
      .filter(|c| **c == command)
      .count()
  }

  #[test]
  fn detects_modes_by_finger_count() {
    let (mut m, _) = machine();
    assert_eq!(m.update(&observed(vec![])).mode, InteractionMode::Idle);
    assert_eq!(m.update(&observed(vec![hand(300.0, 200.0, POINTING)])).mode, InteractionMode::Mouse);
    assert_eq!(m.update(&observed(vec![hand(300.0, 200.0, TWO_FINGERS)])).mode, InteractionMode::Scroll);
    assert_eq!(m.update(&observed(vec![hand(300.0, 200.0, OPEN)])).mode, InteractionMode::Idle);
    assert_eq!(
      m.update(&observed(vec![hand(200.0, 200.0, OPEN), hand(400.0, 200.0, OPEN)])).mode,
      InteractionMode::Zoom
    );
    assert_eq!(
      m.update(&observed(vec![hand(200.0, 200.0, TWO_FINGERS), hand(400.0, 200.0, OPEN)])).mode,
      InteractionMode::Idle
    );
    // 工作区未激活时双拳不是选择手势
    assert_eq!(
      m.update(&observed(vec![hand(200.0, 200.0, FIST), hand(400.0, 200.0, FIST)])).mode,
      InteractionMode::Idle
    );
    assert_eq!(
      m.update(&observed(vec![hand(200.0, 200.0, FIST), hand(400.0, 200.0, OPEN)])).mode,
      InteractionMode::Workspace
    );
    assert_eq!(
      m.update(&observed(vec![hand(200.0, 200.0, FIST), hand(400.0, 200.0, FIST)])).mode,
      InteractionMode::WorkspaceSelect
    );
  }

  #[test]
  fn invalid_hands_route_to_idle() {
    let (mut m, _) = machine();
    let broken = LandmarkFrame::from(vec![Point::ORIGIN; 7]);
    let outcome = m.update(&observed(vec![broken.clone(), broken]));
    assert_eq!(outcome.mode, InteractionMode::Idle);
    assert!(outcome.commands.is_empty());
  }

  #[test]
  fn pointer_converges_without_overshoot() {
    let (m, _) = machine();
    let mut m = m.with_state(NavigationState::new(Point::ORIGIN));
    let frame = observed(vec![hand(320.0, 270.0, POINTING)]);
    // 食指尖位于 (320, 240)，映射到屏幕中心
    let target = Point::new(960.0, 540.0);

    let mut last_gap = m.state().previous_pointer.distance(&target);
    for _ in 0..60 {
      let outcome = m.update(&frame);
      assert_eq!(outcome.action, Action::Moving);
      let pointer = m.state().previous_pointer;
      assert!(pointer.x <= target.x && pointer.y <= target.y);
      let gap = pointer.distance(&target);
      assert!(gap < last_gap);
      last_gap = gap;
    }
    assert!(last_gap < 1.0);
  }

  #[test]
  fn pointer_follows_exponential_average() {
    let (m, _) = machine();
    let mut m = m.with_state(NavigationState::new(Point::new(1000.0, 500.0)));
    // 食指尖在映射区域左上角之外，目标截断为 (0, 0)
    let outcome = m.update(&observed(vec![hand(50.0, 60.0, POINTING)]));
    let pointer = m.state().previous_pointer;
    assert!((pointer.x - 820.0).abs() < 1e-9);
    assert!((pointer.y - 410.0).abs() < 1e-9);
    assert_eq!(
      outcome.commands,
      vec![Command::PointerMove {
        x: pointer.x as i32,
        y: pointer.y as i32
      }]
    );
  }

  #[test]
  fn pinch_starts_and_ends_drag() {
    let (mut m, _) = machine();
    let first = m.update(&observed(vec![pinching_hand(320.0, 270.0)]));
    assert_eq!(first.action, Action::Dragging);
    assert!(first.commands.contains(&Command::ButtonDown));

    let held = m.update(&observed(vec![pinching_hand(322.0, 270.0)]));
    assert!(!held.commands.contains(&Command::ButtonDown));
    assert!(m.state().pinch_pressed);

    let released = m.update(&observed(vec![hand(322.0, 270.0, POINTING)]));
    assert!(released.commands.contains(&Command::ButtonUp));
    assert!(!m.state().pinch_pressed);
  }

  #[test]
  fn idle_releases_active_drag() {
    let (mut m, _) = machine();
    m.update(&observed(vec![pinching_hand(320.0, 270.0)]));
    let outcome = m.update(&observed(vec![]));
    assert_eq!(outcome.commands, vec![Command::ButtonUp]);
    assert!(!m.state().pinch_pressed);
  }

  #[test]
  fn scroll_updates_baseline_only_when_firing() {
    let (mut m, _) = machine();
    // 第一帧只记录基准
    let first = m.update(&observed(vec![hand(300.0, 230.0, TWO_FINGERS)]));
    assert!(first.commands.is_empty());
    assert_eq!(m.state().previous_scroll_y, Some(200.0));

    // 3 像素不足一个滚动单位
    let small = m.update(&observed(vec![hand(300.0, 227.0, TWO_FINGERS)]));
    assert!(small.commands.is_empty());
    assert_eq!(m.state().previous_scroll_y, Some(200.0));

    // 累计 6 像素后触发，基准跳到当前位置
    let fired = m.update(&observed(vec![hand(300.0, 224.0, TWO_FINGERS)]));
    assert_eq!(fired.action, Action::Scroll(1));
    assert_eq!(
      fired.commands,
      vec![Command::Scroll {
        amount: 15,
        modifier: None
      }]
    );
    assert_eq!(m.state().previous_scroll_y, Some(194.0));

    let down = m.update(&observed(vec![hand(300.0, 244.0, TWO_FINGERS)]));
    assert_eq!(down.action, Action::Scroll(-5));
  }

  #[test]
  fn scroll_recalibrates_after_idle() {
    let (mut m, _) = machine();
    m.update(&observed(vec![hand(300.0, 230.0, TWO_FINGERS)]));
    m.update(&observed(vec![hand(300.0, 210.0, TWO_FINGERS)]));
    assert_eq!(m.state().previous_scroll_y, Some(180.0));

    m.update(&observed(vec![]));
    assert_eq!(m.state().previous_scroll_y, None);

    // 重新进入时远离旧基准，第一帧不应产生滚动
    let reentry = m.update(&observed(vec![hand(300.0, 430.0, TWO_FINGERS)]));
    assert!(reentry.commands.is_empty());
    assert_eq!(m.state().previous_scroll_y, Some(400.0));

    let next = m.update(&observed(vec![hand(300.0, 422.0, TWO_FINGERS)]));
    assert_eq!(next.action, Action::Scroll(2));
  }

  #[test]
  fn zoom_respects_threshold_and_cooldown() {
    let (mut m, clock) = machine();
    let pair = |gap: f64| observed(vec![hand(320.0 - gap / 2.0, 240.0, OPEN), hand(320.0 + gap / 2.0, 240.0, OPEN)]);

    assert!(m.update(&pair(100.0)).commands.is_empty());
    assert_eq!(m.state().previous_zoom_distance, Some(100.0));

    // 变化不超过 15 像素
    assert!(m.update(&pair(110.0)).commands.is_empty());

    let zoom_in = m.update(&pair(140.0));
    assert_eq!(zoom_in.action, Action::ZoomIn);
    assert_eq!(
      zoom_in.commands,
      vec![Command::Scroll {
        amount: 40,
        modifier: Some(Modifier::Control)
      }]
    );

    // 冷却期内不触发
    clock.advance(Duration::from_millis(30));
    assert!(m.update(&pair(100.0)).commands.is_empty());

    clock.advance(Duration::from_millis(30));
    let zoom_out = m.update(&pair(100.0));
    assert_eq!(zoom_out.action, Action::ZoomOut);
    assert_eq!(
      zoom_out.commands,
      vec![Command::Scroll {
        amount: -40,
        modifier: Some(Modifier::Control)
      }]
    );
  }

  #[test]
  fn zoom_recalibrates_after_idle() {
    let (mut m, _) = machine();
    let pair = |gap: f64| observed(vec![hand(320.0 - gap / 2.0, 240.0, OPEN), hand(320.0 + gap / 2.0, 240.0, OPEN)]);
    m.update(&pair(100.0));
    m.update(&observed(vec![]));
    assert_eq!(m.state().previous_zoom_distance, None);
    assert!(m.update(&pair(300.0)).commands.is_empty());
    assert_eq!(m.state().previous_zoom_distance, Some(300.0));
  }

  #[test]
  fn huge_scroll_delta_saturates() {
    let (mut m, _) = machine();
    m.update(&observed(vec![hand(300.0, 1e12, TWO_FINGERS)]));
    let outcome = m.update(&observed(vec![hand(300.0, 0.0, TWO_FINGERS)]));
    assert_eq!(outcome.action, Action::Scroll(i32::MAX));
    assert_eq!(
      outcome.commands,
      vec![Command::Scroll {
        amount: i32::MAX,
        modifier: None
      }]
    );
  }

  #[test]
  fn huge_zoom_delta_saturates() {
    let (mut m, _) = machine();
    let pair = |gap: f64| observed(vec![hand(320.0 - gap / 2.0, 240.0, OPEN), hand(320.0 + gap / 2.0, 240.0, OPEN)]);
    m.update(&pair(10.0));
    let outcome = m.update(&pair(1e12));
    assert_eq!(outcome.action, Action::ZoomIn);
    assert_eq!(
      outcome.commands,
      vec![Command::Scroll {
        amount: i32::MAX,
        modifier: Some(Modifier::Control)
      }]
    );
  }

  fn workspace(open_x: f64) -> ObservedFrame {
    observed(vec![hand(open_x, 240.0, OPEN), hand(500.0, 240.0, FIST)])
  }

  #[test]
  fn workspace_opens_once_then_tracks_reference() {
    let (mut m, _) = machine();
    let entry = m.update(&workspace(200.0));
    assert_eq!(entry.action, Action::WorkspaceOpened);
    assert_eq!(
      entry.commands,
      vec![Command::OpenTaskSwitcher, Command::Pause { millis: 200 }]
    );
    assert!(m.state().workspace_active);

    let reference = m.update(&workspace(210.0));
    assert_eq!(reference.action, Action::WorkspaceReference);
    assert!(reference.commands.is_empty());
    assert_eq!(m.state().previous_workspace_x, Some(210.0));

    let small = m.update(&workspace(240.0));
    assert_eq!(small.action, Action::WorkspaceNavigating);
    assert!(small.commands.is_empty());

    let right = m.update(&workspace(270.0));
    assert_eq!(right.action, Action::WorkspaceRight);
    assert_eq!(right.commands, vec![Command::KeyPress { key: Key::Right }]);
    assert_eq!(m.state().previous_workspace_x, Some(270.0));
  }

  #[test]
  fn workspace_navigation_cooldown_suppresses_second_swipe() {
    let (mut m, clock) = machine();
    m.update(&workspace(200.0));
    m.update(&workspace(200.0));

    let mut outcomes = vec![m.update(&workspace(260.0))];
    clock.advance(Duration::from_millis(100));
    outcomes.push(m.update(&workspace(320.0)));
    clock.advance(Duration::from_millis(100));
    outcomes.push(m.update(&workspace(380.0)));
    assert_eq!(count_commands(&outcomes, Command::KeyPress { key: Key::Right }), 1);

    // 冷却结束后相对最近一次触发的位置计算
    clock.advance(Duration::from_millis(200));
    let left = m.update(&workspace(200.0));
    assert_eq!(left.commands, vec![Command::KeyPress { key: Key::Left }]);
  }

  #[test]
  fn workspace_select_confirms_and_clears() {
    let (mut m, _) = machine();
    m.update(&workspace(200.0));
    let select = m.update(&observed(vec![hand(200.0, 240.0, FIST), hand(500.0, 240.0, FIST)]));
    assert_eq!(select.mode, InteractionMode::WorkspaceSelect);
    assert_eq!(
      select.commands,
      vec![Command::KeyPress { key: Key::Enter }, Command::Pause { millis: 500 }]
    );
    assert!(!m.state().workspace_active);

    // 选择后已不在工作区，离开时不再发送 Escape
    let after = m.update(&observed(vec![]));
    assert!(after.commands.is_empty());
  }

  #[test]
  fn leaving_workspace_sends_escape() {
    let (mut m, _) = machine();
    m.update(&workspace(200.0));
    m.update(&workspace(220.0));
    let exit = m.update(&observed(vec![]));
    assert_eq!(exit.mode, InteractionMode::Idle);
    assert_eq!(exit.action, Action::ExitWorkspace);
    assert_eq!(exit.commands, vec![Command::KeyPress { key: Key::Escape }]);
    assert!(!m.state().workspace_active);
    assert_eq!(m.state().previous_workspace_x, None);

    // 再次进入会重新打开任务视图
    let reentry = m.update(&workspace(200.0));
    assert!(reentry.commands.contains(&Command::OpenTaskSwitcher));
  }

  #[test]
  fn interpreter_matches_update() {
    let (mut m, _) = machine();
    let outcome = m.interpret(&workspace(200.0));
    assert!(matches!(outcome, Ok(FrameOutcome { mode: InteractionMode::Workspace, .. })));
  }
}

//! 倒计时状态与每秒推进逻辑

use chrono::{DateTime, Duration, Utc};

use crate::progress::CircularProgress;

/// 计时器状态
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerState {
    Idle,
    Running,
    Finished,
}

/// 进度值的线性过渡动画
#[derive(Clone, Debug, PartialEq)]
pub struct ValueAnimation {
    from: f64,
    to: f64,
    started_at: DateTime<Utc>,
    duration: Duration,
}

impl ValueAnimation {
    pub fn new(from: f64, to: f64, started_at: DateTime<Utc>, duration: Duration) -> Self {
        Self {
            from,
            to,
            started_at,
            duration,
        }
    }

    /// 线性插值，超出时长后停在终值
    pub fn value_at(&self, now: DateTime<Utc>) -> f64 {
        let total = self.duration.num_milliseconds();
        if total <= 0 {
            return self.to;
        }
        let t = ((now - self.started_at).num_milliseconds() as f64 / total as f64).clamp(0.0, 1.0);
        self.from + (self.to - self.from) * t
    }

    pub fn is_finished(&self, now: DateTime<Utc>) -> bool {
        now - self.started_at >= self.duration
    }
}

/// 周期触发器，每次只会有一个
#[derive(Clone, Debug)]
struct Ticker {
    next_tick_at: DateTime<Utc>,
    period: Duration,
}

/// 倒计时核心状态
pub struct Countdown {
    state: TimerState,
    elapsed_secs: i64,
    max_duration_secs: i64,
    /// 每秒之间是否做平滑过渡
    smooth: bool,
    ticker: Option<Ticker>,
    animation: Option<ValueAnimation>,
    /// 本帧刚结束（用于停止提示音等），取走后清空
    finished: bool,
}

impl Default for Countdown {
    fn default() -> Self {
        Self {
            state: TimerState::Idle,
            elapsed_secs: 0,
            max_duration_secs: 60,
            smooth: true,
            ticker: None,
            animation: None,
            finished: false,
        }
    }
}

impl Countdown {
    pub fn new(max_duration_secs: i64, smooth: bool) -> Self {
        Self {
            max_duration_secs: max_duration_secs.max(0),
            smooth,
            ..Default::default()
        }
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn elapsed_secs(&self) -> i64 {
        self.elapsed_secs
    }

    pub fn max_duration_secs(&self) -> i64 {
        self.max_duration_secs
    }

    fn period() -> Duration {
        Duration::seconds(1)
    }

    /// 更换时长（分钟）；计时中忽略
    pub fn set_duration_minutes(&mut self, minutes: u32) {
        if self.state == TimerState::Running {
            return;
        }
        self.max_duration_secs = i64::from(minutes) * 60;
    }

    /// 计时中禁用开始按钮与时长选择
    pub fn controls_enabled(&self) -> bool {
        self.state != TimerState::Running
    }

    pub fn is_ticking(&self) -> bool {
        self.ticker.is_some()
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// 开始计时：重置计数与进度条，立即刷新一次（tick 0）。已在计时中返回 false
    pub fn start(&mut self, now: DateTime<Utc>, bar: &mut CircularProgress) -> bool {
        if self.state == TimerState::Running {
            return false;
        }
        self.elapsed_secs = 0;
        self.animation = None;
        self.finished = false;
        bar.set_range(0.0, self.max_duration_secs as f64);
        bar.set_value(0.0);
        self.state = TimerState::Running;
        self.ticker = Some(Ticker {
            next_tick_at: now + Self::period(),
            period: Self::period(),
        });
        tracing::info!("计时开始，时长 {} 秒", self.max_duration_secs);
        self.check_finished(bar);
        true
    }

    /// 由 UI 每帧调用，按经过的周期逐次推进
    pub fn tick(&mut self, now: DateTime<Utc>, bar: &mut CircularProgress) {
        while self.state == TimerState::Running {
            let Some(ticker) = self.ticker.as_mut() else { return };
            if now < ticker.next_tick_at {
                return;
            }
            let due = ticker.next_tick_at;
            ticker.next_tick_at = due + ticker.period;
            self.advance(due, bar);
        }
    }

    fn advance(&mut self, due: DateTime<Utc>, bar: &mut CircularProgress) {
        self.elapsed_secs += 1;
        if self.smooth {
            self.animation = Some(ValueAnimation::new(
                (self.elapsed_secs - 1) as f64,
                self.elapsed_secs as f64,
                due,
                Self::period(),
            ));
        } else {
            bar.set_value(self.elapsed_secs as f64);
        }
        self.check_finished(bar);
    }

    /// 推进过渡动画
    pub fn animate(&mut self, now: DateTime<Utc>, bar: &mut CircularProgress) {
        let Some(animation) = &self.animation else { return };
        bar.set_value(animation.value_at(now));
        if animation.is_finished(now) {
            self.animation = None;
        }
    }

    fn check_finished(&mut self, bar: &mut CircularProgress) {
        if self.elapsed_secs >= self.max_duration_secs {
            self.finish(bar);
        }
    }

    fn finish(&mut self, bar: &mut CircularProgress) {
        self.ticker = None;
        self.animation = None;
        // 动画会滞后，直接置为终值
        bar.set_value(self.max_duration_secs as f64);
        self.state = TimerState::Finished;
        self.finished = true;
        tracing::info!("计时结束，共 {} 秒", self.elapsed_secs);
    }

    /// 取走“刚结束”标记（用于停止提示音），取走后清空
    pub fn take_finished(&mut self) -> bool {
        std::mem::take(&mut self.finished)
    }

    /// 剩余时间格式化为 "MM:SS"
    pub fn remaining_display(&self) -> String {
        let s = (self.max_duration_secs - self.elapsed_secs).max(0);
        format!("{:02}:{:02}", s / 60, s % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(base: DateTime<Utc>, millis: i64) -> DateTime<Utc> {
        base + Duration::milliseconds(millis)
    }

    #[test]
    fn test_start_resets_and_configures_bar() {
        let now = Utc::now();
        let mut bar = CircularProgress::new();
        bar.set_value(40.0);
        let mut timer = Countdown::new(120, true);
        timer.elapsed_secs = 7;

        assert!(timer.start(now, &mut bar));
        assert_eq!(timer.state, TimerState::Running);
        assert_eq!(timer.elapsed_secs, 0);
        assert_eq!(bar.min_value(), 0.0);
        assert_eq!(bar.max_value(), 120.0);
        assert_eq!(bar.value(), 0.0);
        assert!(!timer.controls_enabled());
        assert!(timer.is_ticking());
    }

    #[test]
    fn test_start_while_running_is_refused() {
        let now = Utc::now();
        let mut bar = CircularProgress::new();
        let mut timer = Countdown::new(60, false);
        assert!(timer.start(now, &mut bar));
        timer.tick(at(now, 3_000), &mut bar);
        assert!(!timer.start(at(now, 3_500), &mut bar));
        assert_eq!(timer.elapsed_secs, 3);
    }

    #[test]
    fn test_no_tick_before_period() {
        let now = Utc::now();
        let mut bar = CircularProgress::new();
        let mut timer = Countdown::new(60, false);
        timer.start(now, &mut bar);
        timer.tick(at(now, 999), &mut bar);
        assert_eq!(timer.elapsed_secs, 0);
        timer.tick(at(now, 1_000), &mut bar);
        assert_eq!(timer.elapsed_secs, 1);
        assert_eq!(bar.value(), 1.0);
    }

    #[test]
    fn test_smooth_animation_interpolates() {
        let now = Utc::now();
        let mut bar = CircularProgress::new();
        let mut timer = Countdown::new(60, true);
        timer.start(now, &mut bar);
        timer.tick(at(now, 1_000), &mut bar);
        assert!(timer.is_animating());
        assert_eq!(bar.value(), 0.0);

        timer.animate(at(now, 1_500), &mut bar);
        assert!((bar.value() - 0.5).abs() < 1e-9);

        timer.animate(at(now, 2_000), &mut bar);
        assert_eq!(bar.value(), 1.0);
        assert!(!timer.is_animating());
    }

    #[test]
    fn test_one_minute_run_finishes() {
        let now = Utc::now();
        let mut bar = CircularProgress::new();
        let mut timer = Countdown::new(60, true);
        timer.start(now, &mut bar);

        for i in 1..=59 {
            timer.tick(at(now, i * 1_000), &mut bar);
            timer.animate(at(now, i * 1_000 + 400), &mut bar);
        }
        assert_eq!(timer.state, TimerState::Running);
        assert!(!timer.take_finished());

        timer.tick(at(now, 60_000), &mut bar);
        assert_eq!(timer.state, TimerState::Finished);
        assert_eq!(timer.elapsed_secs, 60);
        assert_eq!(bar.value(), 60.0);
        assert!(timer.controls_enabled());
        assert!(!timer.is_ticking());
        assert!(!timer.is_animating());
        assert!(timer.take_finished());
        assert!(!timer.take_finished());

        // 结束后不会再有回调改变状态
        timer.tick(at(now, 65_000), &mut bar);
        timer.animate(at(now, 65_000), &mut bar);
        assert_eq!(timer.elapsed_secs, 60);
        assert_eq!(bar.value(), 60.0);
    }

    #[test]
    fn test_late_frame_catches_up() {
        let now = Utc::now();
        let mut bar = CircularProgress::new();
        let mut timer = Countdown::new(60, false);
        timer.start(now, &mut bar);
        timer.tick(at(now, 4_200), &mut bar);
        assert_eq!(timer.elapsed_secs, 4);
        assert_eq!(bar.value(), 4.0);
    }

    #[test]
    fn test_restart_after_finish() {
        let now = Utc::now();
        let mut bar = CircularProgress::new();
        let mut timer = Countdown::new(2, false);
        timer.start(now, &mut bar);
        timer.tick(at(now, 2_000), &mut bar);
        assert_eq!(timer.state, TimerState::Finished);

        timer.set_duration_minutes(1);
        assert!(timer.start(at(now, 3_000), &mut bar));
        assert_eq!(timer.state, TimerState::Running);
        assert_eq!(timer.elapsed_secs, 0);
        assert_eq!(bar.max_value(), 60.0);
        assert_eq!(bar.value(), 0.0);
    }

    #[test]
    fn test_duration_locked_while_running() {
        let now = Utc::now();
        let mut bar = CircularProgress::new();
        let mut timer = Countdown::new(60, false);
        timer.start(now, &mut bar);
        timer.set_duration_minutes(5);
        assert_eq!(timer.max_duration_secs, 60);
    }

    #[test]
    fn test_zero_duration_finishes_immediately() {
        let mut bar = CircularProgress::new();
        let mut timer = Countdown::new(0, true);
        timer.start(Utc::now(), &mut bar);
        assert_eq!(timer.state, TimerState::Finished);
        assert!(timer.take_finished());
    }

    #[test]
    fn test_accessors_follow_state_machine() {
        let now = Utc::now();
        let mut bar = CircularProgress::new();
        let mut timer = Countdown::new(1, false);
        assert_eq!(timer.state(), TimerState::Idle);
        assert_eq!(timer.max_duration_secs(), 1);
        timer.start(now, &mut bar);
        assert_eq!(timer.state(), TimerState::Running);
        assert_eq!(timer.elapsed_secs(), 0);
        timer.tick(at(now, 1_000), &mut bar);
        assert_eq!(timer.state(), TimerState::Finished);
        assert_eq!(timer.elapsed_secs(), 1);
    }

    #[test]
    fn test_remaining_display() {
        let mut timer = Countdown::new(125, false);
        assert_eq!(timer.remaining_display(), "02:05");
        timer.elapsed_secs = 125;
        assert_eq!(timer.remaining_display(), "00:00");
    }
}

//! Countdown timer driving the feedback prompt

pub const DEFAULT_SECONDS: u32 = 1800;
pub const MIN_SECONDS: u32 = 60;
pub const MAX_SECONDS: u32 = 7200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    Idle,
    Running,
    Paused,
    Finished,
}

/// What a toggle or tick did, so the caller can record a start or
/// announce the end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    Started,
    Paused,
    Tick(u32),
    Finished,
    Ignored,
}

#[derive(Debug, Clone)]
pub struct Countdown {
    initial: u32,
    remaining: u32,
    state: TimerState,
}

impl Default for Countdown {
    fn default() -> Self {
        Self::new(DEFAULT_SECONDS)
    }
}

impl Countdown {
    pub fn new(initial_seconds: u32) -> Self {
        let initial = initial_seconds.clamp(MIN_SECONDS, MAX_SECONDS);
        Self {
            initial,
            remaining: initial,
            state: TimerState::Idle,
        }
    }

    pub fn from_minutes(minutes: i64) -> Self {
        let seconds = minutes.saturating_mul(60).clamp(MIN_SECONDS as i64, MAX_SECONDS as i64);
        Self::new(seconds as u32)
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    /// Start/pause button. Every transition into `Running` is a new start.
    pub fn toggle(&mut self) -> TimerEvent {
        match self.state {
            TimerState::Running => {
                self.state = TimerState::Paused;
                TimerEvent::Paused
            }
            TimerState::Finished => TimerEvent::Ignored,
            TimerState::Idle | TimerState::Paused => {
                self.state = TimerState::Running;
                TimerEvent::Started
            }
        }
    }

    /// Advance one second
    pub fn tick(&mut self) -> TimerEvent {
        if self.state != TimerState::Running {
            return TimerEvent::Ignored;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.state = TimerState::Finished;
            TimerEvent::Finished
        } else {
            TimerEvent::Tick(self.remaining)
        }
    }

    /// Add or remove whole minutes from the remaining time
    pub fn adjust(&mut self, minutes: i32) {
        let adjusted = self.remaining as i64 + minutes as i64 * 60;
        self.remaining = adjusted.clamp(MIN_SECONDS as i64, MAX_SECONDS as i64) as u32;
        if self.state == TimerState::Finished {
            self.state = TimerState::Paused;
        }
    }

    pub fn reset(&mut self) {
        self.remaining = self.initial;
        self.state = TimerState::Idle;
    }

    /// Feedback buttons are live once a started countdown is paused or done
    pub fn feedback_enabled(&self) -> bool {
        matches!(self.state, TimerState::Paused | TimerState::Finished)
    }

    pub fn display(&self) -> String {
        format_clock(self.remaining)
    }
}

/// `MM:SS`
pub fn format_clock(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

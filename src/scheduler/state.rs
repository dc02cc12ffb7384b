//! Polling scheduler state machine.
//!
//! Pure transition logic with no timers or I/O. The driver feeds it the three
//! events it reacts to (operator toggle, pass completed, timer fired) and
//! carries out the returned [`Action`].
//!
//! Invariant: at most one pass in flight and at most one timer armed. A start
//! requested while a pass is still in flight is queued and taken up when that
//! pass completes.

use log::{debug, info};
use std::time::Duration;

/// Externally visible polling mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchedulerState {
    #[default]
    Idle,
    /// Single pass in flight, nothing scheduled after it
    RunningOnce,
    /// Passes repeat, each one starting an interval after the previous finished
    RunningPeriodic,
}

/// Snapshot of the machine published to observers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SchedulerStatus {
    pub state: SchedulerState,
    pub pass_in_flight: bool,
    pub timer_armed: bool,
    /// A toggle arrived while a pass was in flight; a new start follows it
    pub start_queued: bool,
}

/// Work the driver has to perform after a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    StartPass,
    ArmTimer(Duration),
    CancelTimer,
    Nothing,
}

#[derive(Debug, Clone, Default)]
pub struct StateMachine {
    status: SchedulerStatus,
    interval: Duration,
}

impl StateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> SchedulerStatus {
        self.status
    }

    pub fn state(&self) -> SchedulerState {
        self.status.state
    }

    /// Operator start/stop. `interval_secs` is the interval configured right now.
    pub fn toggle(&mut self, interval_secs: i64) -> Action {
        match self.status.state {
            SchedulerState::Idle if self.status.pass_in_flight => self.queue_start(),
            SchedulerState::Idle => self.start(interval_secs),
            SchedulerState::RunningOnce => self.queue_start(),
            SchedulerState::RunningPeriodic => {
                info!("Stopping periodic polling");
                self.status.state = SchedulerState::Idle;
                self.disarm()
            }
        }
    }

    /// The in-flight pass finished and its snapshot was rendered.
    /// `interval_secs` applies to a queued start.
    pub fn pass_completed(&mut self, interval_secs: i64) -> Action {
        self.status.pass_in_flight = false;
        if self.status.state == SchedulerState::RunningOnce {
            self.status.state = SchedulerState::Idle;
        }
        match self.status.state {
            SchedulerState::Idle if self.status.start_queued => {
                self.status.start_queued = false;
                self.start(interval_secs)
            }
            SchedulerState::RunningPeriodic => {
                debug!("Next pass in {:?}", self.interval);
                self.status.timer_armed = true;
                Action::ArmTimer(self.interval)
            }
            _ => Action::Nothing,
        }
    }

    /// The armed timer expired.
    pub fn timer_fired(&mut self) -> Action {
        if self.status.state == SchedulerState::RunningPeriodic && self.status.timer_armed {
            self.status.timer_armed = false;
            self.status.pass_in_flight = true;
            Action::StartPass
        } else {
            Action::Nothing
        }
    }

    /// Stop scheduling and drop a queued start. An in-flight pass is left to finish.
    pub fn shutdown(&mut self) -> Action {
        self.status.state = SchedulerState::Idle;
        self.status.start_queued = false;
        self.disarm()
    }

    fn start(&mut self, interval_secs: i64) -> Action {
        if interval_secs <= 0 {
            info!("Starting single polling pass");
            self.status.state = SchedulerState::RunningOnce;
        } else {
            info!("Starting periodic polling every {}s", interval_secs);
            self.interval = Duration::from_secs(interval_secs.unsigned_abs());
            self.status.state = SchedulerState::RunningPeriodic;
        }
        self.status.pass_in_flight = true;
        Action::StartPass
    }

    fn queue_start(&mut self) -> Action {
        if self.status.start_queued {
            debug!("Start already queued");
        } else {
            info!("Pass in flight; next start queued");
            self.status.start_queued = true;
        }
        Action::Nothing
    }

    fn disarm(&mut self) -> Action {
        if self.status.timer_armed {
            debug!("Cancelling scheduled pass");
            self.status.timer_armed = false;
            Action::CancelTimer
        } else {
            Action::Nothing
        }
    }
}

//! Async driver around [`StateMachine`].
//!
//! The driver owns the only in-flight pass future and the only armed timer.
//! Cancelling the timer means dropping its sleep future; a pass future is never
//! dropped before it completes, so a pass that was running when polling was
//! switched off still gets rendered.

use super::state::{Action, SchedulerStatus, StateMachine};
use super::{Command, PollPass};
use crate::classify::Snapshot;
use crate::render::RenderSink;
use crate::settings::SettingsSource;
use futures::future::{BoxFuture, FutureExt, OptionFuture};
use log::{info, warn};
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::time::Sleep;

pub struct SchedulerDriver<S, R> {
    pass: Arc<dyn PollPass>,
    settings: S,
    sink: R,
    machine: StateMachine,
    commands: mpsc::UnboundedReceiver<Command>,
    status: watch::Sender<SchedulerStatus>,
    in_flight: Option<BoxFuture<'static, Snapshot>>,
    timer: Option<Pin<Box<Sleep>>>,
}

impl<S: SettingsSource, R: RenderSink> SchedulerDriver<S, R> {
    pub(super) fn new(
        pass: Arc<dyn PollPass>,
        settings: S,
        sink: R,
        commands: mpsc::UnboundedReceiver<Command>,
        status: watch::Sender<SchedulerStatus>,
    ) -> Self {
        Self {
            pass,
            settings,
            sink,
            machine: StateMachine::new(),
            commands,
            status,
            in_flight: None,
            timer: None,
        }
    }

    /// Process commands until shut down, then wait for an in-flight pass to
    /// render. Returns the sink.
    pub async fn run(mut self) -> R {
        let mut shutting_down = false;

        loop {
            if shutting_down && self.in_flight.is_none() {
                break;
            }

            tokio::select! {
                biased;

                command = self.commands.recv(), if !shutting_down => {
                    let action = match command {
                        Some(Command::Toggle) => {
                            let interval = self.settings.interval_secs();
                            self.machine.toggle(interval)
                        }
                        Some(Command::Shutdown) | None => {
                            info!("Scheduler shutting down");
                            shutting_down = true;
                            self.machine.shutdown()
                        }
                    };
                    self.apply(action);
                }

                Some(snapshot) = OptionFuture::from(self.in_flight.as_mut()), if self.in_flight.is_some() => {
                    self.in_flight = None;
                    if let Err(e) = self.sink.render(&snapshot) {
                        warn!("Failed to render snapshot: {}", e);
                    }
                    let interval = self.settings.interval_secs();
                    let action = self.machine.pass_completed(interval);
                    self.apply(action);
                }

                Some(()) = OptionFuture::from(self.timer.as_mut()), if self.timer.is_some() => {
                    self.timer = None;
                    let action = self.machine.timer_fired();
                    self.apply(action);
                }
            }
        }

        self.sink
    }

    fn apply(&mut self, action: Action) {
        match action {
            Action::StartPass => {
                let context = self.settings.poll_context();
                let pass = Arc::clone(&self.pass);
                self.in_flight = Some(async move { pass.run_pass(context).await }.boxed());
            }
            Action::ArmTimer(interval) => {
                self.timer = Some(Box::pin(tokio::time::sleep(interval)));
            }
            Action::CancelTimer => {
                self.timer = None;
            }
            Action::Nothing => {}
        }
        self.status.send_replace(self.machine.status());
    }
}

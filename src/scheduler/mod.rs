//! Polling scheduler: one-off or repeating passes behind a start/stop toggle.
//!
//! [`scheduler`] returns a [`SchedulerHandle`] for sending toggles and a
//! [`SchedulerDriver`] that has to be awaited for anything to happen.

pub mod driver;
pub mod state;

pub use driver::SchedulerDriver;
pub use state::{Action, SchedulerState, SchedulerStatus, StateMachine};

use crate::aggregate::SnapshotAggregator;
use crate::classify::Snapshot;
use crate::render::RenderSink;
use crate::settings::{PollContext, SettingsSource};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

/// One complete polling pass
#[async_trait]
pub trait PollPass: Send + Sync {
    async fn run_pass(&self, context: PollContext) -> Snapshot;
}

#[async_trait]
impl PollPass for SnapshotAggregator {
    async fn run_pass(&self, context: PollContext) -> Snapshot {
        self.build_snapshot(&context).await
    }
}

/// Operator input to the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Toggle,
    /// Stop scheduling, finish the pass in flight, then exit
    Shutdown,
}

/// Cloneable control side of a running scheduler
#[derive(Debug, Clone)]
pub struct SchedulerHandle {
    commands: mpsc::UnboundedSender<Command>,
    status: watch::Receiver<SchedulerStatus>,
}

impl SchedulerHandle {
    /// Returns false once the driver has exited.
    pub fn toggle(&self) -> bool {
        self.commands.send(Command::Toggle).is_ok()
    }

    pub fn shutdown(&self) -> bool {
        self.commands.send(Command::Shutdown).is_ok()
    }

    pub fn status(&self) -> SchedulerStatus {
        *self.status.borrow()
    }
}

/// Create a scheduler running `pass`, reading live inputs from `settings`
/// and rendering into `sink`.
pub fn scheduler<S, R>(
    pass: Arc<dyn PollPass>,
    settings: S,
    sink: R,
) -> (SchedulerHandle, SchedulerDriver<S, R>)
where
    S: SettingsSource,
    R: RenderSink,
{
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (status_tx, status_rx) = watch::channel(SchedulerStatus::default());
    let driver = SchedulerDriver::new(pass, settings, sink, command_rx, status_tx);
    let handle = SchedulerHandle { commands: command_tx, status: status_rx };
    (handle, driver)
}

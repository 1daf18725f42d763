//! Async status service.
//!
//! Runs a [`SessionController`] on one dedicated tokio task. Every input
//! (session callbacks, restart presses, alert acceptance) arrives over a
//! channel, and every timer fires from the same task by sleeping until the
//! controller's next deadline. Nothing else touches the controller, so the
//! one-timer-per-category and single-auto-hide invariants hold without locks.
//!
//! The task does not hold the presentation layer; it only sends [`Event`]s.
//! When the receiving side is gone, events are dropped. When every
//! [`StatusHandle`] is dropped (or [`StatusHandle::shutdown`] is called) the
//! task ends, taking all pending timers with it.

use std::time::Instant;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::error::{CoreError, RuntimeError, SessionError};
use crate::events::Event;
use crate::session::{ReferenceImageCatalog, SessionController, SessionEvent, TrackingSession};

const COMMAND_BUFFER: usize = 64;

#[derive(Debug)]
enum Command {
    Session(SessionEvent),
    RequestRestart,
    AcceptAlert,
    Shutdown,
}

/// Cloneable input side of a running [`StatusService`].
#[derive(Debug, Clone)]
pub struct StatusHandle {
    tx: mpsc::Sender<Command>,
}

impl StatusHandle {
    pub async fn session_event(&self, event: SessionEvent) -> Result<(), RuntimeError> {
        self.send(Command::Session(event)).await
    }

    pub async fn request_restart(&self) -> Result<(), RuntimeError> {
        self.send(Command::RequestRestart).await
    }

    pub async fn accept_alert(&self) -> Result<(), RuntimeError> {
        self.send(Command::AcceptAlert).await
    }

    /// Ask the service to pause the session and stop.
    pub async fn shutdown(&self) -> Result<(), RuntimeError> {
        self.send(Command::Shutdown).await
    }

    async fn send(&self, command: Command) -> Result<(), RuntimeError> {
        self.tx.send(command).await?;
        Ok(())
    }
}

pub struct StatusService {
    handle: StatusHandle,
    events: mpsc::UnboundedReceiver<Event>,
    task: JoinHandle<Result<(), SessionError>>,
}

impl StatusService {
    /// Start the experience and spawn the owner task on the current runtime.
    ///
    /// # Errors
    ///
    /// Startup failures (such as a missing detection image group) are
    /// returned here and no task is spawned.
    pub fn spawn<S, C>(mut controller: SessionController<S, C>) -> Result<Self, SessionError>
    where
        S: TrackingSession + Send + 'static,
        C: ReferenceImageCatalog + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
        let (events_tx, events) = mpsc::unbounded_channel();

        let started = controller.start(now())?;
        emit(&events_tx, started);

        let task = tokio::spawn(run(controller, rx, events_tx));
        Ok(Self {
            handle: StatusHandle { tx },
            events,
            task,
        })
    }

    pub fn handle(&self) -> StatusHandle {
        self.handle.clone()
    }

    /// Next event for the presentation layer, `None` once the task is done.
    pub async fn recv(&mut self) -> Option<Event> {
        self.events.recv().await
    }

    /// Event already queued, without waiting.
    pub fn try_recv(&mut self) -> Option<Event> {
        self.events.try_recv().ok()
    }

    /// Stop the task and wait for it.
    pub async fn shutdown(self) -> Result<(), CoreError> {
        // Already stopped is fine; the join below reports how it ended.
        let _ = self.handle.shutdown().await;
        self.task.await.map_err(RuntimeError::from)??;
        Ok(())
    }
}

async fn run<S, C>(
    mut controller: SessionController<S, C>,
    mut commands: mpsc::Receiver<Command>,
    events: mpsc::UnboundedSender<Event>,
) -> Result<(), SessionError>
where
    S: TrackingSession,
    C: ReferenceImageCatalog,
{
    loop {
        let deadline = controller.next_deadline();

        let command = tokio::select! {
            command = commands.recv() => command,
            _ = sleep_until(deadline) => {
                emit(&events, controller.advance(now()));
                continue;
            }
        };

        // Timers already due go first, in case the command raced them.
        emit(&events, controller.advance(now()));

        let now = now();
        let result = match command {
            Some(Command::Session(event)) => controller.handle_event(event, now),
            Some(Command::RequestRestart) => controller.request_restart(now),
            Some(Command::AcceptAlert) => controller.accept_alert(now),
            Some(Command::Shutdown) | None => break,
        };

        match result {
            Ok(batch) => emit(&events, batch),
            Err(err) => {
                error!(%err, "status service stopping");
                controller.pause();
                return Err(err);
            }
        }
    }

    debug!("status service stopped");
    controller.pause();
    Ok(())
}

fn emit(events: &mpsc::UnboundedSender<Event>, batch: Vec<Event>) {
    for event in batch {
        if events.send(event).is_err() {
            debug!("presentation layer gone, dropping events");
            return;
        }
    }
}

/// Monotonic now, following tokio's clock so paused-time tests work.
fn now() -> Instant {
    tokio::time::Instant::now().into_std()
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await,
        None => std::future::pending().await,
    }
}

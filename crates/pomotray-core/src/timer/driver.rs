//! Async host for a [`Pomodoro`] engine.
//!
//! The driver task owns the engine outright. Requests arrive over a channel
//! and are applied one at a time; between requests the task sleeps until the
//! engine's wake-up deadline. Dropping every [`EngineHandle`] ends the task
//! and drops the engine along with its pending wake-up.
//!
//! Hook commands run on the driver task and block it until they exit. Their
//! failures are logged and never reach [`EngineHandle`] callers; the
//! transition that triggered them still takes effect.

use std::time::Instant;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::engine::Pomodoro;
use crate::error::{CoreError, Result};
use crate::events::Snapshot;

/// A request applied to the engine by the driver task.
#[derive(Debug)]
pub enum Request {
    Start,
    StartTask(usize),
    Next,
    Stop,
    Finish,
    Snapshot(oneshot::Sender<Snapshot>),
    Shutdown,
}

/// Cloneable sender side of a running driver.
#[derive(Debug, Clone)]
pub struct EngineHandle {
    tx: mpsc::UnboundedSender<Request>,
}

impl EngineHandle {
    pub fn send(&self, request: Request) -> Result<()> {
        self.tx.send(request).map_err(|_| CoreError::DriverClosed)
    }

    pub fn start(&self) -> Result<()> {
        self.send(Request::Start)
    }

    pub fn start_task(&self, index: usize) -> Result<()> {
        self.send(Request::StartTask(index))
    }

    pub fn next(&self) -> Result<()> {
        self.send(Request::Next)
    }

    pub fn stop(&self) -> Result<()> {
        self.send(Request::Stop)
    }

    pub fn finish(&self) -> Result<()> {
        self.send(Request::Finish)
    }

    pub fn shutdown(&self) -> Result<()> {
        self.send(Request::Shutdown)
    }

    /// Current engine state, after every request sent before this one.
    pub async fn snapshot(&self) -> Result<Snapshot> {
        let (reply, rx) = oneshot::channel();
        self.send(Request::Snapshot(reply))?;
        rx.await.map_err(|_| CoreError::DriverClosed)
    }
}

/// Move `engine` onto a new tokio task.
///
/// Must be called from within a tokio runtime.
pub fn spawn(engine: Pomodoro) -> (EngineHandle, JoinHandle<()>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let task = tokio::spawn(run(engine, rx));
    (EngineHandle { tx }, task)
}

async fn run(mut engine: Pomodoro, mut rx: mpsc::UnboundedReceiver<Request>) {
    loop {
        poll(&mut engine);

        tokio::select! {
            request = rx.recv() => match request {
                Some(Request::Shutdown) | None => break,
                Some(request) => handle(&mut engine, request),
            },
            () = sleep_until(engine.next_wakeup()) => {}
        }
    }
    debug!("[{}] Driver stopped", engine);
}

fn handle(engine: &mut Pomodoro, request: Request) {
    let result = match request {
        Request::Start => engine.start(),
        Request::StartTask(index) if index < engine.tasks().len() => engine.start_task(index),
        Request::StartTask(index) => {
            warn!(
                "Ignoring request for task {} of {}",
                index + 1,
                engine.tasks().len()
            );
            Ok(())
        }
        Request::Next => engine.next(),
        Request::Stop => engine.stop(),
        Request::Finish => engine.finish(),
        Request::Snapshot(reply) => {
            let _ = reply.send(engine.snapshot());
            Ok(())
        }
        Request::Shutdown => Ok(()),
    };
    if let Err(e) = result {
        warn!("[{}] {}", engine, e);
    }
}

fn poll(engine: &mut Pomodoro) {
    if let Err(e) = engine.poll() {
        warn!("[{}] Wake-up failed: {}", engine, e);
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline.into()).await,
        None => std::future::pending().await,
    }
}

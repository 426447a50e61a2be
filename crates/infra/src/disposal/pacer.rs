//! Blocking waits between calls, interruptible by a cancel signal.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

/// How a wait ended.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Pace {
    Elapsed,
    Cancelled,
}

/// Owner of all blocking in the disposal loop.
pub trait Pacer {
    /// Block for `delay`, returning early with `Cancelled` on a cancel signal.
    fn wait(&mut self, delay: Duration) -> Pace;

    /// Non-blocking check, made before each call is issued.
    fn is_cancelled(&mut self) -> bool;
}

/// Create a connected cancel handle / pacer pair.
pub fn cancellation() -> (CancelHandle, ShutdownPacer) {
    let (tx, rx) = mpsc::channel();
    (
        CancelHandle { tx },
        ShutdownPacer {
            rx,
            cancelled: false,
        },
    )
}

/// Sends the cancel signal (e.g. from a Ctrl-C handler).
#[derive(Debug, Clone)]
pub struct CancelHandle {
    tx: Sender<()>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        let _ = self.tx.send(());
    }
}

/// Real-time pacer backed by a shutdown channel.
#[derive(Debug)]
pub struct ShutdownPacer {
    rx: Receiver<()>,
    cancelled: bool,
}

impl Pacer for ShutdownPacer {
    fn wait(&mut self, delay: Duration) -> Pace {
        if self.is_cancelled() {
            return Pace::Cancelled;
        }
        if delay.is_zero() {
            return Pace::Elapsed;
        }

        let deadline = Instant::now() + delay;
        match self.rx.recv_timeout(delay) {
            Ok(()) => {
                self.cancelled = true;
                Pace::Cancelled
            }
            Err(RecvTimeoutError::Timeout) => Pace::Elapsed,
            Err(RecvTimeoutError::Disconnected) => {
                // Every handle is gone: nothing can cancel any more, just sleep.
                thread::sleep(deadline.saturating_duration_since(Instant::now()));
                Pace::Elapsed
            }
        }
    }

    fn is_cancelled(&mut self) -> bool {
        if !self.cancelled {
            match self.rx.try_recv() {
                Ok(()) => self.cancelled = true,
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => {}
            }
        }
        self.cancelled
    }
}

/// Non-blocking pacer that records requested waits (tests, dry runs).
#[derive(Debug, Default, Clone)]
pub struct ManualPacer {
    waits: Vec<Duration>,
    cancel_on_wait: Option<usize>,
    cancelled: bool,
}

impl ManualPacer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal cancellation during the `n`-th wait (1-indexed).
    pub fn cancel_on_wait(mut self, n: usize) -> Self {
        self.cancel_on_wait = Some(n);
        self
    }

    pub fn cancelled(mut self) -> Self {
        self.cancelled = true;
        self
    }

    pub fn waits(&self) -> &[Duration] {
        &self.waits
    }

    pub fn total_waited(&self) -> Duration {
        self.waits.iter().sum()
    }
}

impl Pacer for ManualPacer {
    fn wait(&mut self, delay: Duration) -> Pace {
        if self.cancelled {
            return Pace::Cancelled;
        }
        self.waits.push(delay);
        if self.cancel_on_wait == Some(self.waits.len()) {
            self.cancelled = true;
            return Pace::Cancelled;
        }
        Pace::Elapsed
    }

    fn is_cancelled(&mut self) -> bool {
        self.cancelled
    }
}

//! Fixed-rate poll timers, one thread per poll family.
//!
//! Each poller fires once immediately, then on every interval boundary.
//! Ticks that fall due while the previous poll is still running are logged
//! and dropped rather than queued.

use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

use crate::config::schema::PollingConfig;

use super::controller::{PollFamily, PollOutcome, SyncController};
use super::gate::PollTrigger;

pub struct Scheduler {
    pollers: Vec<Poller>,
}

struct Poller {
    stop: Sender<()>,
    handle: Option<JoinHandle<()>>,
}

impl Scheduler {
    /// Spawn the status and streams pollers.
    pub fn start(controller: Arc<SyncController>, polling: &PollingConfig) -> Result<Self> {
        let pollers = vec![
            Poller::spawn(
                controller.clone(),
                PollFamily::Status,
                polling.status_interval(),
            )?,
            Poller::spawn(controller, PollFamily::Streams, polling.streams_interval())?,
        ];
        Ok(Self { pollers })
    }

    /// Signal every poller and wait for the threads to exit. A poll that is
    /// mid-request finishes its request first.
    pub fn stop(mut self) {
        for poller in &self.pollers {
            let _ = poller.stop.send(());
        }
        for poller in &mut self.pollers {
            if let Some(handle) = poller.handle.take() {
                let _ = handle.join();
            }
        }
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        for poller in &self.pollers {
            let _ = poller.stop.send(());
        }
    }
}

impl Poller {
    fn spawn(controller: Arc<SyncController>, family: PollFamily, interval: Duration) -> Result<Self> {
        let (stop, stop_rx) = mpsc::channel();
        let name = match family {
            PollFamily::Status => "poll-status",
            PollFamily::Streams => "poll-streams",
        };

        let handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                let mut next = Instant::now();
                loop {
                    if controller.poll(family, PollTrigger::Scheduled) == PollOutcome::TornDown {
                        break;
                    }

                    next += interval;
                    let now = Instant::now();
                    while next <= now {
                        controller.record_missed_tick(family);
                        next += interval;
                    }

                    match stop_rx.recv_timeout(next - now) {
                        Err(RecvTimeoutError::Timeout) => continue,
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
            })
            .with_context(|| format!("failed to spawn {name} thread"))?;

        Ok(Self {
            stop,
            handle: Some(handle),
        })
    }
}

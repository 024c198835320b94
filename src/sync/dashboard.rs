use std::sync::Arc;
use std::thread;

use anyhow::{Context, Result};

use crate::api::Backend;
use crate::config::DashConfig;
use crate::logging::EventLog;

use super::controller::{ControllerOptions, SyncController};
use super::scheduler::Scheduler;
use super::sinks::Sinks;

/// A running dashboard: one controller plus its poll timers.
///
/// Startup order: the session flag is rendered, the session check is sent in
/// the background, and both pollers fire their first poll immediately.
pub struct Dashboard {
    controller: Arc<SyncController>,
    scheduler: Option<Scheduler>,
}

impl Dashboard {
    pub fn start(
        backend: Arc<dyn Backend>,
        sinks: Sinks,
        log: EventLog,
        config: &DashConfig,
    ) -> Result<Self> {
        let controller = Arc::new(SyncController::new(backend, sinks, log).with_options(
            ControllerOptions {
                gate_on_check: config.session.gate_on_check,
            },
        ));

        controller.announce_session();

        if config.session.check_on_startup {
            let checker = controller.clone();
            thread::Builder::new()
                .name("session-check".to_string())
                .spawn(move || {
                    checker.check_session();
                })
                .context("failed to spawn session-check thread")?;
        }

        let scheduler = Scheduler::start(controller.clone(), &config.polling)?;

        Ok(Self {
            controller,
            scheduler: Some(scheduler),
        })
    }

    pub fn controller(&self) -> &Arc<SyncController> {
        &self.controller
    }

    /// Tear down: late responses are dropped and the pollers exit.
    pub fn stop(mut self) {
        self.controller.shutdown();
        if let Some(scheduler) = self.scheduler.take() {
            scheduler.stop();
        }
    }
}

impl Drop for Dashboard {
    fn drop(&mut self) {
        self.controller.shutdown();
    }
}

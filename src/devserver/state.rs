//! In-memory bot state behind the devserver.

use std::collections::HashSet;
use std::collections::hash_map::RandomState;
use std::hash::{BuildHasher, Hasher};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use crate::api::{ControlAction, StreamMap, StreamRecord};

/// Devserver knobs.
#[derive(Debug, Clone)]
pub struct DevOptions {
    pub password: String,
    /// How long the bot sits in `starting` / `restarting` / `shutting-down`
    /// before settling. Zero settles immediately.
    pub transition: Duration,
    /// Print one access-log line per request.
    pub log_requests: bool,
}

impl Default for DevOptions {
    fn default() -> Self {
        Self {
            password: "letmein".to_string(),
            transition: Duration::from_secs(3),
            log_requests: true,
        }
    }
}

#[derive(Debug)]
struct Pending {
    target: &'static str,
    ready_at: Instant,
}

#[derive(Debug)]
pub struct DevState {
    options: DevOptions,
    status: String,
    pending: Option<Pending>,
    sessions: HashSet<String>,
    streams: StreamMap,
    hasher: RandomState,
    issued: u64,
}

impl DevState {
    pub fn new(options: DevOptions) -> Self {
        Self {
            options,
            status: "online".to_string(),
            pending: None,
            sessions: HashSet::new(),
            streams: seed_streams(),
            hasher: RandomState::new(),
            issued: 0,
        }
    }

    pub fn options(&self) -> &DevOptions {
        &self.options
    }

    /// Current status tag, settling a finished transition first.
    pub fn status(&mut self) -> &str {
        if let Some(pending) = &self.pending
            && Instant::now() >= pending.ready_at
        {
            self.status = pending.target.to_string();
            self.pending = None;
        }
        &self.status
    }

    pub fn streams(&self) -> &StreamMap {
        &self.streams
    }

    pub fn replace_streams(&mut self, streams: StreamMap) {
        self.streams = streams;
    }

    /// Check the password and open a session. Returns the session token.
    pub fn login(&mut self, password: &str) -> Result<String, &'static str> {
        if password != self.options.password {
            return Err("Invalid password");
        }
        let token = self.next_token();
        self.sessions.insert(token.clone());
        Ok(token)
    }

    pub fn is_authenticated(&self, token: Option<&str>) -> bool {
        token.is_some_and(|t| self.sessions.contains(t))
    }

    /// Apply a control action. `Err` carries the text for the `error` field.
    pub fn control(&mut self, action: ControlAction) -> Result<String, String> {
        let current = self.status().to_string();
        if self.pending.is_some() {
            return Err("bot busy".to_string());
        }

        let (transitional, target, message) = match action {
            ControlAction::Start if current == "online" => {
                return Err("Bot is already running".to_string());
            }
            ControlAction::Shutdown if current == "offline" => {
                return Err("Bot is not running".to_string());
            }
            ControlAction::Start => ("starting", "online", "Bot is starting"),
            ControlAction::Restart => ("restarting", "online", "Bot is restarting"),
            ControlAction::Shutdown => ("shutting-down", "offline", "Bot is shutting down"),
        };

        if self.options.transition.is_zero() {
            self.status = target.to_string();
        } else {
            self.status = transitional.to_string();
            self.pending = Some(Pending {
                target,
                ready_at: Instant::now() + self.options.transition,
            });
        }

        Ok(message.to_string())
    }

    fn next_token(&mut self) -> String {
        self.issued += 1;
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        let mut hasher = self.hasher.build_hasher();
        hasher.write_u64(self.issued);
        hasher.write_u128(nanos);
        format!("{:016x}{:04x}", hasher.finish(), self.issued)
    }
}

fn seed_streams() -> StreamMap {
    let mut streams = StreamMap::new();
    streams.insert(
        "1001".to_string(),
        StreamRecord {
            streamer_name: "pixelpaladin".to_string(),
            title: Some("Blind run, no guides".to_string()),
            thumbnail_url: Some("https://static-cdn.example/previews/pixelpaladin.jpg".to_string()),
            peak_viewers: Some(412),
            start_time: Some("2024-11-02 18:04:11".to_string()),
            end_time: Some("2024-11-02 21:37:50".to_string()),
            duration: Some("3:33:39".to_string()),
        },
    );
    streams.insert(
        "1002".to_string(),
        StreamRecord {
            streamer_name: "glitchgarden".to_string(),
            title: Some("Any% practice".to_string()),
            thumbnail_url: None,
            peak_viewers: Some(87),
            start_time: Some("2024-11-03 09:15:00".to_string()),
            end_time: None,
            duration: None,
        },
    );
    streams.insert(
        "1003".to_string(),
        StreamRecord {
            streamer_name: "quietquasar".to_string(),
            ..StreamRecord::default()
        },
    );
    streams
}

/// Sync controller tests.
///
/// Drives `SyncController` against a scripted in-memory backend. Replies can
/// be held back on a channel so tests decide the order in which overlapping
/// requests complete. HTTP round trips against the devserver live in
/// `devserver_tests.rs`.
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use sinon_dash::api::{ApiError, AuthCheck, Backend, ControlAction, StatusReply, StreamMap, StreamRecord};
use sinon_dash::config::DashConfig;
use sinon_dash::logging::report::read_events;
use sinon_dash::logging::{EventFamily, EventKind, EventLog};
use sinon_dash::render::{BotStatus, StatusIndicator, StreamCard};
use sinon_dash::sync::{
    AuthOutcome, ControlOutcome, ControllerOptions, Dashboard, Notice, Notifier, PollOutcome,
    PollTrigger, SessionSink, SessionState, Sinks, StatusSink, StreamsSink, SubmitControl,
    SyncController,
};

const WAIT: Duration = Duration::from_secs(5);

// ---------------------------------------------------------------------------
// Scripted backend
// ---------------------------------------------------------------------------

type Reply<T> = Result<T, ApiError>;

enum Script<T> {
    Ready(Reply<T>),
    /// Blocks until the test sends the reply.
    Held(Receiver<Reply<T>>),
    Panic,
}

struct ScriptedBackend {
    check_auth: Mutex<VecDeque<Script<AuthCheck>>>,
    authenticate: Mutex<VecDeque<Script<String>>>,
    control: Mutex<VecDeque<Script<String>>>,
    status: Mutex<VecDeque<Script<StatusReply>>>,
    streams: Mutex<VecDeque<Script<StreamMap>>>,
    entered: Mutex<Sender<&'static str>>,
}

impl ScriptedBackend {
    /// The receiver yields the endpoint name each time a call starts.
    fn new() -> (Self, Receiver<&'static str>) {
        let (tx, rx) = mpsc::channel();
        let backend = Self {
            check_auth: Mutex::new(VecDeque::new()),
            authenticate: Mutex::new(VecDeque::new()),
            control: Mutex::new(VecDeque::new()),
            status: Mutex::new(VecDeque::new()),
            streams: Mutex::new(VecDeque::new()),
            entered: Mutex::new(tx),
        };
        (backend, rx)
    }

    fn answer<T>(&self, endpoint: &'static str, queue: &Mutex<VecDeque<Script<T>>>) -> Reply<T> {
        let script = queue.lock().unwrap().pop_front();
        let _ = self.entered.lock().unwrap().send(endpoint);
        match script {
            Some(Script::Ready(reply)) => reply,
            Some(Script::Held(rx)) => rx
                .recv()
                .unwrap_or_else(|_| Err(ApiError::Transport("script dropped".into()))),
            Some(Script::Panic) => panic!("scripted panic in {endpoint}"),
            None => Err(ApiError::Transport(format!("no scripted reply for {endpoint}"))),
        }
    }
}

fn push<T>(queue: &Mutex<VecDeque<Script<T>>>, script: Script<T>) {
    queue.lock().unwrap().push_back(script);
}

/// Queue a held reply and return the sender that releases it.
fn hold<T>(queue: &Mutex<VecDeque<Script<T>>>) -> Sender<Reply<T>> {
    let (tx, rx) = mpsc::channel();
    push(queue, Script::Held(rx));
    tx
}

impl Backend for ScriptedBackend {
    fn check_auth(&self) -> Result<AuthCheck, ApiError> {
        self.answer("check-auth", &self.check_auth)
    }

    fn authenticate(&self, _password: &str) -> Result<String, ApiError> {
        self.answer("auth", &self.authenticate)
    }

    fn control(&self, _action: ControlAction) -> Result<String, ApiError> {
        self.answer("control", &self.control)
    }

    fn status(&self) -> Result<StatusReply, ApiError> {
        self.answer("status", &self.status)
    }

    fn detailed_streams(&self) -> Result<StreamMap, ApiError> {
        self.answer("streams", &self.streams)
    }
}

// ---------------------------------------------------------------------------
// Recording UI
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Recorded {
    indicator: StatusIndicator,
    statuses: Vec<String>,
    lists: Vec<Vec<StreamCard>>,
    sessions: Vec<SessionState>,
    submit: Vec<bool>,
    notices: Vec<Notice>,
}

#[derive(Default)]
struct RecordingUi {
    seen: Mutex<Recorded>,
}

impl RecordingUi {
    fn with<R>(&self, f: impl FnOnce(&Recorded) -> R) -> R {
        f(&self.seen.lock().unwrap())
    }
}

impl StatusSink for RecordingUi {
    fn show_status(&self, status: &BotStatus) {
        let mut seen = self.seen.lock().unwrap();
        seen.indicator.apply(status);
        seen.statuses.push(status.as_str().to_string());
    }
}

impl StreamsSink for RecordingUi {
    fn show_streams(&self, cards: &[StreamCard]) {
        self.seen.lock().unwrap().lists.push(cards.to_vec());
    }
}

impl SessionSink for RecordingUi {
    fn show_session(&self, state: SessionState) {
        self.seen.lock().unwrap().sessions.push(state);
    }
}

impl SubmitControl for RecordingUi {
    fn set_submit_enabled(&self, enabled: bool) {
        self.seen.lock().unwrap().submit.push(enabled);
    }
}

impl Notifier for RecordingUi {
    fn notify(&self, notice: Notice) {
        self.seen.lock().unwrap().notices.push(notice);
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

struct Harness {
    backend: Arc<ScriptedBackend>,
    entered: Receiver<&'static str>,
    ui: Arc<RecordingUi>,
    controller: Arc<SyncController>,
}

fn harness_with(options: ControllerOptions, log: EventLog) -> Harness {
    let (backend, entered) = ScriptedBackend::new();
    let backend = Arc::new(backend);
    let ui = Arc::new(RecordingUi::default());
    let controller = Arc::new(
        SyncController::new(backend.clone(), Sinks::shared(ui.clone()), log).with_options(options),
    );
    Harness {
        backend,
        entered,
        ui,
        controller,
    }
}

fn harness() -> Harness {
    harness_with(ControllerOptions::default(), EventLog::disabled())
}

impl Harness {
    /// Run `f` on a new thread and wait until it reaches the backend.
    fn spawn_call<R: Send + 'static>(
        &self,
        f: impl FnOnce(&SyncController) -> R + Send + 'static,
    ) -> JoinHandle<R> {
        let controller = self.controller.clone();
        let handle = thread::spawn(move || f(&controller));
        self.entered.recv_timeout(WAIT).expect("call never reached the backend");
        handle
    }
}

fn status(tag: &str) -> Reply<StatusReply> {
    Ok(StatusReply {
        status: tag.to_string(),
    })
}

fn streams(entries: &[(&str, &str)]) -> StreamMap {
    entries
        .iter()
        .map(|(id, streamer)| {
            (
                id.to_string(),
                StreamRecord {
                    streamer_name: streamer.to_string(),
                    title: Some(format!("{streamer} live")),
                    thumbnail_url: Some(format!("{streamer}.png")),
                    peak_viewers: Some(10),
                    start_time: Some("2024-01-01 10:00".to_string()),
                    end_time: Some("2024-01-01 12:00".to_string()),
                    duration: Some("2:00:00".to_string()),
                },
            )
        })
        .collect()
}

fn scratch_file(name: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("sinon-dash-sync-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    let _ = std::fs::remove_file(&path);
    path
}

// ---------------------------------------------------------------------------
// Status polling
// ---------------------------------------------------------------------------

#[test]
fn interleaved_status_responses_keep_the_newest() {
    let h = harness();
    let first = hold(&h.backend.status);
    let second = hold(&h.backend.status);

    let older = h.spawn_call(|c| c.poll_status(PollTrigger::Manual));
    let newer = h.spawn_call(|c| c.poll_status(PollTrigger::Manual));

    second.send(status("online")).unwrap();
    assert_eq!(newer.join().unwrap(), PollOutcome::Applied);

    first.send(status("offline")).unwrap();
    assert_eq!(older.join().unwrap(), PollOutcome::Stale);

    assert_eq!(h.controller.status(), Some(BotStatus::new("online")));
    h.ui.with(|seen| {
        assert_eq!(seen.statuses, vec!["online"]);
        assert_eq!(seen.indicator.text(), "Online");
    });
}

#[test]
fn status_indicator_carries_exactly_one_class() {
    let h = harness();
    for tag in ["starting", "online", "shutting down", "offline"] {
        push(&h.backend.status, Script::Ready(status(tag)));
        assert_eq!(
            h.controller.poll_status(PollTrigger::Scheduled),
            PollOutcome::Applied
        );
        h.ui.with(|seen| {
            let expected = BotStatus::new(tag).style_class();
            assert_eq!(seen.indicator.status_classes(), vec![expected.as_str()]);
        });
    }
    h.ui.with(|seen| assert_eq!(seen.indicator.text(), "Offline"));
}

#[test]
fn scheduled_tick_skips_while_previous_poll_is_in_flight() {
    let h = harness();
    let slow = hold(&h.backend.status);
    let pending = h.spawn_call(|c| c.poll_status(PollTrigger::Scheduled));

    assert_eq!(
        h.controller.poll_status(PollTrigger::Scheduled),
        PollOutcome::Skipped
    );

    // A manual refresh goes through regardless and wins.
    push(&h.backend.status, Script::Ready(status("online")));
    assert_eq!(
        h.controller.poll_status(PollTrigger::Manual),
        PollOutcome::Applied
    );

    slow.send(status("offline")).unwrap();
    assert_eq!(pending.join().unwrap(), PollOutcome::Stale);
    assert_eq!(h.controller.status(), Some(BotStatus::new("online")));
}

#[test]
fn status_failure_keeps_previous_display() {
    let h = harness();
    push(&h.backend.status, Script::Ready(status("online")));
    push(
        &h.backend.status,
        Script::Ready(Err(ApiError::Http { status: 502 })),
    );

    assert_eq!(h.controller.poll_status(PollTrigger::Scheduled), PollOutcome::Applied);
    assert_eq!(
        h.controller.poll_status(PollTrigger::Scheduled),
        PollOutcome::Failed(ApiError::Http { status: 502 })
    );

    assert_eq!(h.controller.status(), Some(BotStatus::new("online")));
    h.ui.with(|seen| {
        assert_eq!(seen.statuses.len(), 1);
        assert!(seen.notices.is_empty(), "poll failures are not user-visible");
    });
}

// ---------------------------------------------------------------------------
// Stream polling
// ---------------------------------------------------------------------------

#[test]
fn streams_failure_never_mutates_the_list() {
    let h = harness();
    let first = streams(&[("1", "alpha"), ("2", "beta")]);
    push(&h.backend.streams, Script::Ready(Ok(first.clone())));
    push(
        &h.backend.streams,
        Script::Ready(Err(ApiError::Transport("connection reset".into()))),
    );
    push(
        &h.backend.streams,
        Script::Ready(Err(ApiError::Decode("expected map".into()))),
    );

    assert_eq!(h.controller.poll_streams(PollTrigger::Scheduled), PollOutcome::Applied);
    assert!(matches!(
        h.controller.poll_streams(PollTrigger::Scheduled),
        PollOutcome::Failed(ApiError::Transport(_))
    ));
    assert!(matches!(
        h.controller.poll_streams(PollTrigger::Scheduled),
        PollOutcome::Failed(ApiError::Decode(_))
    ));

    assert_eq!(h.controller.streams(), Some(first));
    h.ui.with(|seen| {
        assert_eq!(seen.lists.len(), 1);
        assert_eq!(seen.lists[0].len(), 2);
    });
}

#[test]
fn overlapping_stream_polls_show_the_second_response() {
    let h = harness();
    let first = hold(&h.backend.streams);
    let second = hold(&h.backend.streams);

    let older = h.spawn_call(|c| c.poll_streams(PollTrigger::Manual));
    let newer = h.spawn_call(|c| c.poll_streams(PollTrigger::Manual));

    let expected = streams(&[("7", "gamma")]);
    second.send(Ok(expected.clone())).unwrap();
    assert_eq!(newer.join().unwrap(), PollOutcome::Applied);

    first
        .send(Ok(streams(&[("1", "alpha"), ("2", "beta")])))
        .unwrap();
    assert_eq!(older.join().unwrap(), PollOutcome::Stale);

    assert_eq!(h.controller.streams(), Some(expected));
    let cards = h.controller.cards();
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].streamer, "gamma");
    h.ui.with(|seen| assert_eq!(seen.lists.len(), 1));
}

#[test]
fn missing_stream_fields_render_placeholders() {
    let h = harness();
    let mut map = StreamMap::new();
    map.insert(
        "42".to_string(),
        StreamRecord {
            streamer_name: "delta".to_string(),
            title: Some("Speedrun".to_string()),
            thumbnail_url: Some("delta.png".to_string()),
            peak_viewers: None,
            start_time: Some("2024-05-05 20:00".to_string()),
            end_time: None,
            duration: None,
        },
    );
    push(&h.backend.streams, Script::Ready(Ok(map)));

    assert_eq!(h.controller.poll_streams(PollTrigger::Manual), PollOutcome::Applied);

    h.ui.with(|seen| {
        let card = &seen.lists[0][0];
        assert_eq!(card.peak_viewers, "N/A");
        assert_eq!(card.end_time, "Ongoing");
        assert_eq!(card.duration, "N/A");
        assert_eq!(card.title, "Speedrun");
        assert_eq!(card.streamer, "delta");
        assert_eq!(card.thumbnail, "delta.png");
        assert_eq!(card.start_time, "2024-05-05 20:00");
    });
}

#[test]
fn malformed_record_does_not_fail_the_streams_poll() {
    let h = harness();
    let map: StreamMap = serde_json::from_str(
        r#"{
            "1": {"streamer_name": "alpha", "peak_viewers": 40, "end_time": "2024-01-01 12:00"},
            "2": {"streamer_name": null, "title": null, "peak_viewers": "1200", "duration": 90}
        }"#,
    )
    .unwrap();
    push(&h.backend.streams, Script::Ready(Ok(map)));

    assert_eq!(h.controller.poll_streams(PollTrigger::Scheduled), PollOutcome::Applied);

    let cards = h.controller.cards();
    assert_eq!(cards.len(), 2);
    assert_eq!(cards[0].streamer, "alpha");
    assert_eq!(cards[1].streamer, "Unknown");
    assert_eq!(cards[1].title, "Untitled Stream");
    assert_eq!(cards[1].peak_viewers, "1200");
    assert_eq!(cards[1].duration, "90");
}

#[test]
fn stale_and_applied_polls_are_logged() {
    let path = scratch_file("stale.jsonl");
    let h = harness_with(ControllerOptions::default(), EventLog::at(&path));
    let first = hold(&h.backend.status);
    let second = hold(&h.backend.status);

    let older = h.spawn_call(|c| c.poll_status(PollTrigger::Manual));
    let newer = h.spawn_call(|c| c.poll_status(PollTrigger::Manual));
    second.send(status("online")).unwrap();
    newer.join().unwrap();
    first.send(status("offline")).unwrap();
    older.join().unwrap();

    let events = read_events(&path);
    let kinds: Vec<(EventKind, Option<u64>)> = events
        .iter()
        .filter(|e| e.family == EventFamily::Status)
        .map(|e| (e.kind, e.seq))
        .collect();
    assert_eq!(
        kinds,
        vec![(EventKind::Applied, Some(2)), (EventKind::Stale, Some(1))]
    );
}

#[cfg(unix)]
#[test]
fn event_append_does_not_hold_the_state_lock() {
    use std::io::Read;

    // Opening a FIFO for writing blocks until a reader shows up, which
    // stands in for a stalled disk.
    let fifo = scratch_file("blocked.jsonl");
    let made = std::process::Command::new("mkfifo").arg(&fifo).status();
    if !made.is_ok_and(|s| s.success()) {
        return;
    }

    let h = harness_with(ControllerOptions::default(), EventLog::at(&fifo));
    push(&h.backend.status, Script::Ready(status("online")));
    let poll = h.spawn_call(|c| c.poll_status(PollTrigger::Scheduled));

    // The status reaches the sink before the append starts.
    for _ in 0..500 {
        if h.ui.with(|seen| !seen.statuses.is_empty()) {
            break;
        }
        thread::sleep(Duration::from_millis(10));
    }

    let (tx, rx) = mpsc::channel();
    let controller = h.controller.clone();
    thread::spawn(move || {
        let _ = tx.send(controller.status());
    });
    assert_eq!(
        rx.recv_timeout(WAIT).expect("state lock held during log append"),
        Some(BotStatus::new("online"))
    );

    let mut line = String::new();
    std::fs::File::open(&fifo)
        .unwrap()
        .read_to_string(&mut line)
        .unwrap();
    assert_eq!(poll.join().unwrap(), PollOutcome::Applied);
    assert!(line.contains("\"applied\""));
}

// ---------------------------------------------------------------------------
// Authentication
// ---------------------------------------------------------------------------

#[test]
fn correct_password_authenticates_and_swaps_visibility() {
    let h = harness();
    push(&h.backend.authenticate, Script::Ready(Ok("ok".to_string())));

    assert_eq!(
        h.controller.authenticate("correct-pw"),
        AuthOutcome::Authenticated("ok".to_string())
    );

    let session = h.controller.session();
    assert_eq!(session, SessionState::Authenticated);
    assert!(session.visibility().controls);
    assert!(!session.visibility().login_form);
    h.ui.with(|seen| {
        assert_eq!(seen.sessions, vec![SessionState::Authenticated]);
        assert_eq!(seen.notices, vec![Notice::Info("ok".to_string())]);
        assert_eq!(seen.submit, vec![false, true]);
    });
}

#[test]
fn rejected_password_is_shown_and_submit_reenabled() {
    let h = harness();
    push(
        &h.backend.authenticate,
        Script::Ready(Err(ApiError::Rejected("Invalid password".to_string()))),
    );

    assert_eq!(
        h.controller.authenticate("wrong"),
        AuthOutcome::Rejected("Invalid password".to_string())
    );
    assert_eq!(h.controller.session(), SessionState::Unauthenticated);
    h.ui.with(|seen| {
        assert_eq!(seen.notices, vec![Notice::Error("Invalid password".to_string())]);
        assert_eq!(seen.submit, vec![false, true]);
        assert!(seen.sessions.is_empty());
    });
}

#[test]
fn transport_failure_during_auth_reenables_submit() {
    let h = harness();
    push(
        &h.backend.authenticate,
        Script::Ready(Err(ApiError::Transport("connection refused".to_string()))),
    );

    assert!(matches!(
        h.controller.authenticate("pw"),
        AuthOutcome::Failed(ApiError::Transport(_))
    ));
    h.ui.with(|seen| {
        assert_eq!(seen.submit, vec![false, true]);
        assert_eq!(seen.notices.len(), 1);
        assert!(seen.notices[0].is_error());
        assert!(seen.notices[0].text().starts_with("Authentication failed"));
    });
}

#[test]
fn panic_during_auth_still_reenables_submit() {
    let h = harness();
    push(&h.backend.authenticate, Script::Panic);

    let result = panic::catch_unwind(AssertUnwindSafe(|| h.controller.authenticate("pw")));
    assert!(result.is_err());
    h.ui.with(|seen| assert_eq!(seen.submit, vec![false, true]));

    // The in-flight flag was cleared too.
    push(&h.backend.authenticate, Script::Ready(Ok("ok".to_string())));
    assert_eq!(
        h.controller.authenticate("pw"),
        AuthOutcome::Authenticated("ok".to_string())
    );
}

#[test]
fn second_submit_while_in_flight_is_refused() {
    let h = harness();
    let release = hold(&h.backend.authenticate);
    let first = h.spawn_call(|c| c.authenticate("pw"));

    assert_eq!(h.controller.authenticate("pw"), AuthOutcome::AlreadySubmitting);

    release.send(Ok("ok".to_string())).unwrap();
    assert_eq!(
        first.join().unwrap(),
        AuthOutcome::Authenticated("ok".to_string())
    );
    h.ui.with(|seen| assert_eq!(seen.submit, vec![false, true]));
}

#[test]
fn empty_password_is_refused_locally() {
    let h = harness();
    assert_eq!(h.controller.authenticate(""), AuthOutcome::EmptyPassword);
    assert!(h.entered.try_recv().is_err(), "no request should be made");
    h.ui.with(|seen| {
        assert_eq!(
            seen.notices,
            vec![Notice::Error("Password is required.".to_string())]
        );
        assert!(seen.submit.is_empty());
    });
}

// ---------------------------------------------------------------------------
// Control
// ---------------------------------------------------------------------------

#[test]
fn busy_bot_rejection_is_surfaced_and_session_unchanged() {
    let h = harness();
    push(&h.backend.authenticate, Script::Ready(Ok("ok".to_string())));
    push(
        &h.backend.control,
        Script::Ready(Err(ApiError::Rejected("bot busy".to_string()))),
    );
    h.controller.authenticate("correct-pw");

    assert_eq!(
        h.controller.dispatch_control(ControlAction::Restart),
        ControlOutcome::Rejected("bot busy".to_string())
    );
    assert_eq!(h.controller.session(), SessionState::Authenticated);
    h.ui.with(|seen| {
        assert_eq!(seen.notices.last(), Some(&Notice::Error("bot busy".to_string())));
        assert_eq!(seen.sessions, vec![SessionState::Authenticated]);
    });
}

#[test]
fn accepted_control_reports_server_message() {
    let h = harness();
    push(
        &h.backend.control,
        Script::Ready(Ok("Bot is shutting down".to_string())),
    );

    assert_eq!(
        h.controller.dispatch_control(ControlAction::Shutdown),
        ControlOutcome::Accepted("Bot is shutting down".to_string())
    );
    h.ui.with(|seen| {
        assert_eq!(
            seen.notices,
            vec![Notice::Info("Bot is shutting down".to_string())]
        );
    });
}

#[test]
fn control_transport_failure_names_the_action() {
    let h = harness();
    push(
        &h.backend.control,
        Script::Ready(Err(ApiError::Http { status: 500 })),
    );

    assert!(matches!(
        h.controller.dispatch_control(ControlAction::Start),
        ControlOutcome::Failed(ApiError::Http { status: 500 })
    ));
    h.ui.with(|seen| {
        assert!(seen.notices[0].text().contains("'start'"));
    });
}

// ---------------------------------------------------------------------------
// Session check
// ---------------------------------------------------------------------------

#[test]
fn confirmed_session_hides_login_when_gating() {
    let h = harness();
    push(
        &h.backend.check_auth,
        Script::Ready(Ok(AuthCheck {
            authenticated: true,
        })),
    );

    assert_eq!(h.controller.check_session(), SessionState::Authenticated);
    h.ui.with(|seen| assert_eq!(seen.sessions, vec![SessionState::Authenticated]));
}

#[test]
fn confirmed_session_is_only_recorded_without_gating() {
    let h = harness_with(
        ControllerOptions {
            gate_on_check: false,
        },
        EventLog::disabled(),
    );
    push(
        &h.backend.check_auth,
        Script::Ready(Ok(AuthCheck {
            authenticated: true,
        })),
    );

    assert_eq!(h.controller.check_session(), SessionState::Authenticated);
    h.ui.with(|seen| assert!(seen.sessions.is_empty()));
}

#[test]
fn failed_session_check_leaves_state_alone() {
    let h = harness();
    push(
        &h.backend.check_auth,
        Script::Ready(Err(ApiError::Transport("timed out".to_string()))),
    );

    assert_eq!(h.controller.check_session(), SessionState::Unauthenticated);
    h.ui.with(|seen| {
        assert!(seen.sessions.is_empty());
        assert!(seen.notices.is_empty());
    });
}

// ---------------------------------------------------------------------------
// Teardown and scheduling
// ---------------------------------------------------------------------------

#[test]
fn responses_after_shutdown_are_dropped() {
    let h = harness();
    let late = hold(&h.backend.status);
    let pending = h.spawn_call(|c| c.poll_status(PollTrigger::Scheduled));

    h.controller.shutdown();
    late.send(status("online")).unwrap();

    assert_eq!(pending.join().unwrap(), PollOutcome::TornDown);
    assert_eq!(
        h.controller.poll_streams(PollTrigger::Manual),
        PollOutcome::TornDown
    );
    assert_eq!(h.controller.status(), None);
    h.ui.with(|seen| assert!(seen.statuses.is_empty()));
}

#[test]
fn dashboard_checks_session_and_fires_both_pollers() {
    let (backend, entered) = ScriptedBackend::new();
    let backend = Arc::new(backend);
    let ui = Arc::new(RecordingUi::default());
    push(&backend.status, Script::Ready(status("online")));
    push(&backend.streams, Script::Ready(Ok(streams(&[("1", "alpha")]))));
    push(
        &backend.check_auth,
        Script::Ready(Ok(AuthCheck {
            authenticated: false,
        })),
    );

    let dashboard = Dashboard::start(
        backend,
        Sinks::shared(ui.clone()),
        EventLog::disabled(),
        &DashConfig::default(),
    )
    .unwrap();

    let mut calls: Vec<&str> = (0..3)
        .map(|_| entered.recv_timeout(WAIT).expect("startup call"))
        .collect();
    calls.sort_unstable();
    assert_eq!(calls, vec!["check-auth", "status", "streams"]);

    let controller = dashboard.controller().clone();
    dashboard.stop();
    assert!(controller.is_torn_down());

    ui.with(|seen| {
        // Startup renders the initial (unauthenticated) session first.
        assert_eq!(seen.sessions.first(), Some(&SessionState::Unauthenticated));
    });
}

//! Local stand-in for the bot's web backend.
//!
//! Serves the five `/api/*` endpoints the dashboard talks to from an
//! in-memory [`DevState`], over a sync `tiny_http` server. Sessions are a
//! `session=<token>` cookie issued by `/api/auth`.
//!
//! Launched via `sinon-dash devserver` (default: `http://127.0.0.1:5000`).

mod state;

use std::io::Cursor;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use anyhow::{Context, Result, anyhow};
use serde_json::{Value, json};
use tiny_http::{Header, Method, Request, Response, Server, StatusCode};

use crate::api::ControlAction;

pub use state::{DevOptions, DevState};

const SESSION_COOKIE: &str = "session";

// ---------------------------------------------------------------------------
// Server
// ---------------------------------------------------------------------------

pub struct DevServer {
    server: Arc<Server>,
    state: Arc<Mutex<DevState>>,
}

impl DevServer {
    /// Bind without serving yet. Port `0` picks a free port.
    pub fn bind(addr: &str, options: DevOptions) -> Result<Self> {
        let server = Server::http(addr)
            .map_err(|e| anyhow!("failed to start HTTP server on {addr}: {e}"))?;
        Ok(Self {
            server: Arc::new(server),
            state: Arc::new(Mutex::new(DevState::new(options))),
        })
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.server.server_addr().to_ip()
    }

    pub fn url(&self) -> Result<String> {
        let addr = self
            .local_addr()
            .context("devserver is not listening on a TCP address")?;
        Ok(format!("http://{addr}"))
    }

    pub fn state(&self) -> Arc<Mutex<DevState>> {
        self.state.clone()
    }

    /// Serve requests on the current thread until the server is unblocked.
    pub fn run(&self) {
        serve_loop(&self.server, &self.state);
    }

    /// Serve on a background thread.
    pub fn spawn(self) -> Result<DevServerHandle> {
        let url = self.url()?;
        let server = self.server.clone();
        let state = self.state.clone();
        let join = thread::Builder::new()
            .name("devserver".to_string())
            .spawn(move || serve_loop(&server, &state))
            .context("failed to spawn devserver thread")?;
        Ok(DevServerHandle {
            server: self.server,
            state: self.state,
            url,
            join: Some(join),
        })
    }
}

/// A devserver running on its own thread. Dropping it stops the server.
pub struct DevServerHandle {
    server: Arc<Server>,
    state: Arc<Mutex<DevState>>,
    url: String,
    join: Option<JoinHandle<()>>,
}

impl DevServerHandle {
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn state(&self) -> Arc<Mutex<DevState>> {
        self.state.clone()
    }

    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        self.server.unblock();
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

impl Drop for DevServerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

fn serve_loop(server: &Server, state: &Mutex<DevState>) {
    for mut request in server.incoming_requests() {
        let method = request.method().clone();
        let url = request.url().to_string();

        let body = if matches!(method, Method::Post) {
            let mut buf = String::new();
            let _ = request.as_reader().read_to_string(&mut buf);
            buf
        } else {
            String::new()
        };
        let token = session_token(&request);

        let (reply, log_requests) = {
            let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
            let reply = dispatch(&mut state, &method, &url, &body, token.as_deref());
            (reply, state.options().log_requests)
        };

        if log_requests {
            println!(
                "{} {} {} {}",
                method,
                url,
                reply.status,
                chrono::Local::now().format("%H:%M:%S")
            );
        }

        let _ = request.respond(reply.into_response());
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// A handler's answer before it becomes a `tiny_http` response.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status: u16,
    pub body: Value,
    pub session: Option<String>,
}

impl Reply {
    fn ok(body: Value) -> Self {
        Self {
            status: 200,
            body,
            session: None,
        }
    }

    fn error(status: u16, text: &str) -> Self {
        Self {
            status,
            body: json!({ "error": text }),
            session: None,
        }
    }

    fn into_response(self) -> Response<Cursor<Vec<u8>>> {
        let mut resp = Response::from_data(self.body.to_string().into_bytes())
            .with_status_code(StatusCode(self.status));
        if let Some(h) = header("Content-Type", "application/json; charset=utf-8") {
            resp.add_header(h);
        }
        if let Some(token) = self.session
            && let Some(h) = header(
                "Set-Cookie",
                &format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly"),
            )
        {
            resp.add_header(h);
        }
        resp
    }
}

/// Route one request against the state.
pub fn dispatch(
    state: &mut DevState,
    method: &Method,
    url: &str,
    body: &str,
    token: Option<&str>,
) -> Reply {
    let path = url.split('?').next().unwrap_or(url);

    match (method, path) {
        (&Method::Get, "/api/check-auth") => {
            Reply::ok(json!({ "authenticated": state.is_authenticated(token) }))
        }
        (&Method::Post, "/api/auth") => {
            let password = form_field(body, "password").unwrap_or_default();
            match state.login(&password) {
                Ok(token) => Reply {
                    session: Some(token),
                    ..Reply::ok(json!({ "message": "Authentication successful" }))
                },
                Err(reason) => Reply::error(401, reason),
            }
        }
        (&Method::Post, "/api/control") => {
            if !state.is_authenticated(token) {
                return Reply::error(401, "Unauthorized");
            }
            let Some(action) = form_field(body, "action") else {
                return Reply::error(400, "Missing action");
            };
            let Ok(action) = action.parse::<ControlAction>() else {
                return Reply::error(400, &format!("Unknown action: {action}"));
            };
            match state.control(action) {
                Ok(message) => Reply::ok(json!({ "message": message })),
                Err(reason) => Reply::error(409, &reason),
            }
        }
        (&Method::Get, "/api/status") => Reply::ok(json!({ "status": state.status() })),
        (&Method::Get, "/api/detailed_streams") => match serde_json::to_value(state.streams()) {
            Ok(body) => Reply::ok(body),
            Err(e) => Reply::error(500, &e.to_string()),
        },
        _ => Reply::error(404, "not found"),
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

fn header(field: &str, value: &str) -> Option<Header> {
    Header::from_bytes(field.as_bytes(), value.as_bytes()).ok()
}

fn session_token(request: &Request) -> Option<String> {
    request
        .headers()
        .iter()
        .filter(|h| h.field.equiv("Cookie"))
        .find_map(|h| cookie_value(h.value.as_str(), SESSION_COOKIE))
}

/// Pull one cookie out of a `Cookie:` header value.
fn cookie_value(header: &str, name: &str) -> Option<String> {
    header.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name && !value.is_empty()).then(|| value.to_string())
    })
}

/// Decode one field of an `application/x-www-form-urlencoded` body.
fn form_field(body: &str, name: &str) -> Option<String> {
    body.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        if decode_component(key)? != name {
            return None;
        }
        decode_component(value)
    })
}

fn decode_component(raw: &str) -> Option<String> {
    urlencoding::decode(&raw.replace('+', " "))
        .ok()
        .map(|s| s.into_owned())
}

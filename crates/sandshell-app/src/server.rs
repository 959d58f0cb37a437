//! HTTP front end: one `Terminal` per session id.
//!
//! `POST /run` executes a command line, `GET /health` answers `ok`.
//! Terminals are synchronous, so each request runs on the blocking pool
//! while holding its session's lock. Sessions idle past the timeout are
//! dropped by a background task, and the table never holds more than
//! `max_sessions` terminals: the least recently used one is evicted first.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError};
use std::time::{Duration, Instant};

use anyhow::Result;
use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use sandshell_fs::Sandbox;
use sandshell_platform::{HostPlatform, ProcessService};
use sandshell_terminal::{CommandRegistry, Limits, Terminal};
use sandshell_types::config::{ServerConfig, ShellConfig};

const DEFAULT_SESSION: &str = "default";

/// How often idle sessions are swept.
const CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

type SharedTerminal = Arc<std::sync::Mutex<Terminal>>;

struct SessionEntry {
    terminal: SharedTerminal,
    last_accessed: Instant,
}

pub struct AppState {
    sandbox: Sandbox,
    registry: Arc<CommandRegistry>,
    platform: Arc<dyn ProcessService>,
    limits: Limits,
    max_sessions: usize,
    idle_timeout: Duration,
    sessions: Mutex<HashMap<String, SessionEntry>>,
}

impl AppState {
    pub fn new(
        sandbox: Sandbox,
        platform: Arc<dyn ProcessService>,
        limits: Limits,
        server: &ServerConfig,
    ) -> Self {
        Self {
            sandbox,
            registry: Arc::new(CommandRegistry::with_builtins()),
            platform,
            limits,
            max_sessions: server.max_sessions.max(1),
            idle_timeout: Duration::from_secs(server.session_idle_secs),
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// The terminal for `id`, created on first use.
    async fn terminal(&self, id: &str) -> SharedTerminal {
        let mut sessions = self.sessions.lock().await;

        if let Some(entry) = sessions.get_mut(id) {
            entry.last_accessed = Instant::now();
            return Arc::clone(&entry.terminal);
        }

        if sessions.len() >= self.max_sessions
            && let Some(oldest_id) = sessions
                .iter()
                .min_by_key(|(_, e)| e.last_accessed)
                .map(|(id, _)| id.clone())
        {
            sessions.remove(&oldest_id);
            log::info!("Removed oldest session {oldest_id} to make room");
        }

        log::info!("New session: {id}");
        let terminal = Arc::new(std::sync::Mutex::new(Terminal::with_parts(
            self.sandbox.clone(),
            Arc::clone(&self.registry),
            Arc::clone(&self.platform),
            self.limits,
        )));
        sessions.insert(
            id.to_string(),
            SessionEntry {
                terminal: Arc::clone(&terminal),
                last_accessed: Instant::now(),
            },
        );
        terminal
    }

    /// Drop sessions idle longer than the timeout. Returns how many went.
    async fn cleanup_expired_sessions(&self) -> usize {
        let mut sessions = self.sessions.lock().await;
        let before_count = sessions.len();
        sessions.retain(|id, entry| {
            let expired = entry.last_accessed.elapsed() > self.idle_timeout;
            if expired {
                log::debug!("Expiring session: {id}");
            }
            !expired
        });

        let removed = before_count - sessions.len();
        if removed > 0 {
            log::info!("Cleaned up {removed} expired sessions");
        }
        removed
    }

    #[cfg(test)]
    async fn session_count(&self) -> usize {
        self.sessions.lock().await.len()
    }
}

#[derive(Debug, Deserialize)]
pub struct RunRequest {
    #[serde(default)]
    pub command: String,
    pub session: Option<String>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RunResponse {
    pub output: String,
    pub current_sandbox_path: String,
}

struct AppError(StatusCode, String);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/run", post(run_command))
        .route("/health", get(health_check))
        .with_state(state)
}

pub async fn run(config: ShellConfig) -> Result<()> {
    let sandbox = Sandbox::create(&config.sandbox.root)?;
    let state = Arc::new(AppState::new(
        sandbox,
        Arc::new(HostPlatform::new()),
        Limits::from(&config),
        &config.server,
    ));

    let cleanup_state = Arc::clone(&state);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(CLEANUP_INTERVAL);
        loop {
            interval.tick().await;
            cleanup_state.cleanup_expired_sessions().await;
        }
    });

    log::info!("Starting HTTP server on http://{}", config.server.bind);
    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn health_check() -> &'static str {
    "ok"
}

async fn run_command(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RunRequest>,
) -> std::result::Result<Json<RunResponse>, AppError> {
    let session = request.session.as_deref().unwrap_or(DEFAULT_SESSION);
    log::debug!("[{session}] {}", request.command);
    let terminal = state.terminal(session).await;

    let command = request.command;
    let joined = tokio::task::spawn_blocking(move || {
        let mut term = terminal.lock().unwrap_or_else(PoisonError::into_inner);
        let output = term.execute(&command);
        RunResponse {
            output,
            current_sandbox_path: term.cwd_display(),
        }
    })
    .await;

    match joined {
        Ok(response) => Ok(Json(response)),
        Err(e) => {
            log::error!("Command task failed: {e}");
            Err(AppError(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Error: {e}"),
            ))
        },
    }
}

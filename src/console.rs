//! Client-side mirror of the remote project store.
//!
//! `ProjectConsole` owns the only writable handle to [`ConsoleState`]. Each
//! operation clears `last_error`, issues one backend call, and applies the
//! result in its completion handler. Failures never propagate: they become a
//! display string in `last_error`.

use crate::api::{ApiError, Project, ProjectApi};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::watch;

pub const CREATE_OK: &str = "Project created successfully";
pub const RUN_OK: &str = "Project ran successfully";
pub const DELETE_OK: &str = "Project deleted successfully";

pub const CREATE_FAILED: &str = "An error occurred while starting the project";
pub const LIST_FAILED: &str = "An error occurred while listing projects";
pub const RUN_FAILED: &str = "An error occurred while running the project";
pub const DELETE_FAILED: &str = "An error occurred while deleting the project";
pub const CONFIG_FAILED: &str = "An error occurred while fetching the configuration";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsoleState {
    pub project_name_draft: String,
    /// Server response order.
    pub projects: Vec<Project>,
    pub last_output: String,
    /// Empty when no error is showing.
    pub last_error: String,
    pub config: Value,
}

impl ConsoleState {
    pub fn new() -> Self {
        Self {
            project_name_draft: String::new(),
            projects: Vec::new(),
            last_output: String::new(),
            last_error: String::new(),
            config: Value::Object(serde_json::Map::new()),
        }
    }

    pub fn has_error(&self) -> bool {
        !self.last_error.is_empty()
    }
}

impl Default for ConsoleState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone)]
pub struct ProjectConsole {
    api: Arc<dyn ProjectApi>,
    state_tx: Arc<watch::Sender<ConsoleState>>,
}

impl ProjectConsole {
    pub fn new(api: Arc<dyn ProjectApi>) -> (Self, watch::Receiver<ConsoleState>) {
        let (state_tx, state_rx) = watch::channel(ConsoleState::new());
        let console = Self {
            api,
            state_tx: Arc::new(state_tx),
        };
        (console, state_rx)
    }

    pub fn subscribe(&self) -> watch::Receiver<ConsoleState> {
        self.state_tx.subscribe()
    }

    pub fn snapshot(&self) -> ConsoleState {
        self.state_tx.borrow().clone()
    }

    /// Initial load: one list and one config fetch, concurrently.
    pub async fn initialize(&self) {
        tokio::join!(self.list_projects(), self.fetch_config());
    }

    /// Create a project named `name`, normally the draft as it stood when the
    /// user submitted it. On success the draft is cleared and the list reloaded.
    pub async fn create_project(&self, name: &str) {
        self.clear_error();
        match self.api.start_project(name).await {
            Ok(resp) => {
                let output = resp.message().unwrap_or(CREATE_OK).to_string();
                tracing::info!(name, "project created");
                self.state_tx.send_modify(|s| {
                    s.last_output = output;
                    s.project_name_draft.clear();
                });
                self.list_projects().await;
            }
            Err(e) => self.fail("start_project", &e, CREATE_FAILED),
        }
    }

    pub async fn list_projects(&self) {
        self.clear_error();
        match self.api.list_projects().await {
            Ok(projects) => {
                tracing::debug!(count = projects.len(), "projects listed");
                self.state_tx.send_modify(|s| s.projects = projects);
            }
            Err(e) => self.fail("list_projects", &e, LIST_FAILED),
        }
    }

    pub async fn run_project(&self, id: &str) {
        self.clear_error();
        match self.api.run_project(id).await {
            Ok(resp) => {
                let output = resp.message().unwrap_or(RUN_OK).to_string();
                tracing::info!(id, "project ran");
                self.state_tx.send_modify(|s| s.last_output = output);
            }
            Err(e) => self.fail("run_project", &e, RUN_FAILED),
        }
    }

    pub async fn delete_project(&self, id: &str) {
        self.clear_error();
        match self.api.delete_project(id).await {
            Ok(()) => {
                tracing::info!(id, "project deleted");
                self.state_tx
                    .send_modify(|s| s.last_output = DELETE_OK.to_string());
                self.list_projects().await;
            }
            Err(e) => self.fail("delete_project", &e, DELETE_FAILED),
        }
    }

    pub async fn fetch_config(&self) {
        self.clear_error();
        match self.api.show_config().await {
            Ok(config) => self.state_tx.send_modify(|s| s.config = config),
            Err(e) => self.fail("show_config", &e, CONFIG_FAILED),
        }
    }

    pub fn set_draft(&self, draft: impl Into<String>) {
        let draft = draft.into();
        self.state_tx.send_modify(|s| s.project_name_draft = draft);
    }

    pub fn push_draft_char(&self, c: char) {
        self.state_tx.send_modify(|s| s.project_name_draft.push(c));
    }

    pub fn pop_draft_char(&self) {
        self.state_tx.send_modify(|s| {
            s.project_name_draft.pop();
        });
    }

    fn clear_error(&self) {
        self.state_tx.send_if_modified(|s| {
            if s.last_error.is_empty() {
                return false;
            }
            s.last_error.clear();
            true
        });
    }

    fn fail(&self, op: &str, err: &ApiError, fallback: &str) {
        tracing::warn!(op, error = %err, "backend call failed");
        let message = err.display_message(fallback);
        self.state_tx.send_modify(|s| s.last_error = message);
    }
}

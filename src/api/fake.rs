//! In-memory `ProjectApi` for tests.

use super::error::{ApiError, Result as ApiResult};
use super::types::{OutputResponse, Project};
use super::ProjectApi;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// In-memory backend. An entry in `failures` makes that endpoint
/// answer 400 with the given body until removed.
#[derive(Default)]
pub struct FakeApi {
    pub projects: Mutex<Vec<Project>>,
    pub next_id: Mutex<u32>,
    pub calls: Mutex<Vec<String>>,
    pub failures: Mutex<HashMap<&'static str, Option<Value>>>,
    pub start_output: Mutex<Option<String>>,
    pub run_output: Mutex<Option<String>>,
    pub config: Mutex<Value>,
    pub list_delay: Option<Duration>,
}

impl FakeApi {
    pub fn with_projects(names: &[&str]) -> Self {
        let api = FakeApi::default();
        for name in names {
            api.insert(name);
        }
        api
    }

    pub fn insert(&self, name: &str) -> String {
        let mut next = self.next_id.lock().unwrap();
        *next += 1;
        let id = format!("id-{}", *next);
        self.projects.lock().unwrap().push(Project {
            id: id.clone(),
            name: name.to_string(),
        });
        id
    }

    pub fn fail(&self, endpoint: &'static str, body: Option<Value>) {
        self.failures.lock().unwrap().insert(endpoint, body);
    }

    pub fn heal(&self, endpoint: &'static str) {
        self.failures.lock().unwrap().remove(endpoint);
    }

    fn record(&self, call: String) -> ApiResult<()> {
        let endpoint = call.split(':').next().unwrap_or_default().to_string();
        self.calls.lock().unwrap().push(call);
        match self.failures.lock().unwrap().get(endpoint.as_str()) {
            Some(body) => Err(ApiError::Status {
                status: StatusCode::BAD_REQUEST,
                body: body.clone(),
            }),
            None => Ok(()),
        }
    }

    pub fn count(&self, endpoint: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.split(':').next() == Some(endpoint))
            .count()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProjectApi for FakeApi {
    async fn start_project(&self, name: &str) -> ApiResult<OutputResponse> {
        self.record(format!("start:{}", name))?;
        self.insert(name);
        Ok(OutputResponse {
            output: self.start_output.lock().unwrap().clone(),
        })
    }

    async fn list_projects(&self) -> ApiResult<Vec<Project>> {
        if let Some(delay) = self.list_delay {
            tokio::time::sleep(delay).await;
        }
        self.record("list".to_string())?;
        Ok(self.projects.lock().unwrap().clone())
    }

    async fn run_project(&self, id: &str) -> ApiResult<OutputResponse> {
        self.record(format!("run:{}", id))?;
        Ok(OutputResponse {
            output: self.run_output.lock().unwrap().clone(),
        })
    }

    async fn delete_project(&self, id: &str) -> ApiResult<()> {
        self.record(format!("delete:{}", id))?;
        self.projects.lock().unwrap().retain(|p| p.id != id);
        Ok(())
    }

    async fn show_config(&self) -> ApiResult<Value> {
        self.record("config".to_string())?;
        Ok(self.config.lock().unwrap().clone())
    }
}

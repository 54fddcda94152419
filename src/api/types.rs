use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct StartProjectRequest {
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunProjectRequest {
    pub id: String,
}

/// Body of `start_project` / `run_project`. `output` may be missing.
#[derive(Debug, Clone, Default)]
pub struct OutputResponse {
    pub output: Option<String>,
}

impl OutputResponse {
    /// Pull `output` out of a success body of any shape. A body that is not
    /// an object carries no output.
    pub fn from_body(body: &Value) -> Self {
        Self {
            output: message_field(body, "output"),
        }
    }

    /// The server's message, treating `""` the same as absent.
    pub fn message(&self) -> Option<&str> {
        self.output.as_deref().filter(|s| !s.is_empty())
    }
}

/// Text of `body[field]` when the server set it to something truthy.
///
/// Strings are taken as-is; numbers, `true`, arrays and objects are rendered
/// as JSON text. `null`, `false`, `0` and `""` count as not provided.
pub fn message_field(body: &Value, field: &str) -> Option<String> {
    match body.get(field)? {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        other => Some(other.to_string()),
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectsResponse {
    pub projects: Vec<Project>,
}

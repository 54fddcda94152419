pub mod error;
#[cfg(test)]
pub mod fake;
pub mod rest;
pub mod types;

pub use error::ApiError;
pub use rest::ProjectRest;
pub use types::Project;

use async_trait::async_trait;
use error::Result;
use types::OutputResponse;

/// The five backend endpoints the console consumes.
#[async_trait]
pub trait ProjectApi: Send + Sync {
    /// POST /api/start_project
    async fn start_project(&self, name: &str) -> Result<OutputResponse>;
    /// GET /api/list_projects
    async fn list_projects(&self) -> Result<Vec<Project>>;
    /// POST /api/run_project
    async fn run_project(&self, id: &str) -> Result<OutputResponse>;
    /// DELETE /api/delete_project/{id}. The response body is ignored.
    async fn delete_project(&self, id: &str) -> Result<()>;
    /// GET /api/show_config
    async fn show_config(&self) -> Result<serde_json::Value>;
}

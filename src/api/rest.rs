use super::error::{ApiError, Result};
use super::types::*;
use super::ProjectApi;
use crate::config::BackendConfig;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, Response, Url};
use serde_json::Value;
use std::time::Duration;

/// HTTP client for the project backend.
pub struct ProjectRest {
    client: Client,
    base_url: Url,
}

impl ProjectRest {
    /// Build a client for `config`. `token`, when set, is sent as a bearer
    /// token on every request.
    pub fn new(config: &BackendConfig, token: Option<&str>) -> anyhow::Result<Self> {
        let base_url = parse_base_url(&config.base_url)?;

        let mut headers = HeaderMap::new();
        if let Some(token) = token.filter(|t| !t.is_empty()) {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| anyhow::anyhow!("invalid bearer token: {}", e))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let mut builder = Client::builder()
            .pool_max_idle_per_host(4)
            .cookie_store(config.with_credentials)
            .default_headers(headers);
        if let Some(ms) = config.request_timeout_ms {
            builder = builder.timeout(Duration::from_millis(ms));
        }
        let client = builder
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build HTTP client: {}", e))?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    /// Append path segments to the base URL; each segment is percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

fn parse_base_url(raw: &str) -> anyhow::Result<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|e| anyhow::anyhow!("invalid backend base URL {:?}: {}", raw, e))?;
    if url.cannot_be_a_base() {
        anyhow::bail!("backend base URL {:?} cannot carry a path", raw);
    }
    Ok(url)
}

/// Turn a non-2xx response into `ApiError::Status`, keeping the JSON body when it parses.
async fn check_status(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.json::<Value>().await.ok();
    Err(ApiError::Status { status, body })
}

/// Read a success body without insisting on its shape. JSON is parsed, any
/// other text is kept as a JSON string, and an empty body becomes `null`.
async fn read_body(resp: Response) -> Result<Value> {
    let bytes = check_status(resp).await?.bytes().await?;
    Ok(body_value(&bytes))
}

fn body_value(bytes: &[u8]) -> Value {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Value::Null;
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

#[async_trait]
impl ProjectApi for ProjectRest {
    async fn start_project(&self, name: &str) -> Result<OutputResponse> {
        let url = self.endpoint(&["api", "start_project"]);
        tracing::debug!(%url, name, "POST start_project");
        let body = StartProjectRequest {
            name: name.to_string(),
        };
        let resp = self.client.post(url).json(&body).send().await?;
        Ok(OutputResponse::from_body(&read_body(resp).await?))
    }

    async fn list_projects(&self) -> Result<Vec<Project>> {
        let url = self.endpoint(&["api", "list_projects"]);
        tracing::debug!(%url, "GET list_projects");
        let resp = self.client.get(url).send().await?;
        let parsed: ProjectsResponse = serde_json::from_value(read_body(resp).await?)?;
        Ok(parsed.projects)
    }

    async fn run_project(&self, id: &str) -> Result<OutputResponse> {
        let url = self.endpoint(&["api", "run_project"]);
        tracing::debug!(%url, id, "POST run_project");
        let body = RunProjectRequest { id: id.to_string() };
        let resp = self.client.post(url).json(&body).send().await?;
        Ok(OutputResponse::from_body(&read_body(resp).await?))
    }

    async fn delete_project(&self, id: &str) -> Result<()> {
        let url = self.endpoint(&["api", "delete_project", id]);
        tracing::debug!(%url, "DELETE delete_project");
        let resp = self.client.delete(url).send().await?;
        check_status(resp).await?;
        Ok(())
    }

    async fn show_config(&self) -> Result<Value> {
        let url = self.endpoint(&["api", "show_config"]);
        tracing::debug!(%url, "GET show_config");
        let resp = self.client.get(url).send().await?;
        read_body(resp).await
    }
}

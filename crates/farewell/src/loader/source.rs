use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use futures::FutureExt;
use futures::future::BoxFuture;

use super::RawRecord;
use crate::config::{Config, SourceConfig};

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("request failed: {0}")]
    Http(#[from] ureq::Error),

    #[error("remote source responded with HTTP {0}")]
    Status(u16),

    #[error("could not decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("expected a list of records, got {0}")]
    NotAList(&'static str),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Unavailable(String),
}

/// Read-only provider of the raw message rows.
pub trait MessageSource: Send + Sync {
    /// Short human-readable label, used in logs.
    fn describe(&self) -> String;

    fn fetch(&self) -> BoxFuture<'static, Result<Vec<RawRecord>, SourceError>>;
}

/// PostgREST table behind a Supabase project.
///
/// Built once at startup; the agent keeps its connection pool between calls.
pub struct SupabaseSource {
    agent: ureq::Agent,
    endpoint: String,
    anon_key: String,
}

impl SupabaseSource {
    pub fn new(url: &str, anon_key: &str, table: &str, timeout: Duration) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build();
        Self {
            agent: ureq::Agent::new_with_config(config),
            endpoint: rest_endpoint(url, table),
            anon_key: anon_key.to_string(),
        }
    }

    pub fn from_config(config: &SourceConfig) -> anyhow::Result<Self> {
        let url = config.resolve_url().ok_or_else(|| {
            anyhow::anyhow!(
                "No message source configured.\n\
                 \n\
                 Add to ~/.config/farewell/config.yaml:\n\
                 \n\
                 source:\n\
                 \x20 url: https://<project>.supabase.co\n\
                 \x20 anon_key: \"your-key\"   # or set {}\n\
                 \n\
                 or pass --messages <FILE> to use a local list.",
                crate::config::ANON_KEY_ENV
            )
        })?;
        let anon_key = config
            .resolve_anon_key()
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "No anon key found. Set source.anon_key in config.yaml or the {} environment variable.",
                    crate::config::ANON_KEY_ENV
                )
            })?;
        Ok(Self::new(
            &url,
            &anon_key,
            config.table(),
            Duration::from_secs(config.timeout_secs()),
        ))
    }

    fn request(&self) -> Result<Vec<RawRecord>, SourceError> {
        let response = self
            .agent
            .get(&self.endpoint)
            .header("apikey", &self.anon_key)
            .header("Authorization", &format!("Bearer {}", self.anon_key))
            .header("Accept", "application/json")
            .call();

        let mut response = match response {
            Ok(r) => r,
            Err(ureq::Error::StatusCode(code)) => return Err(SourceError::Status(code)),
            Err(e) => return Err(e.into()),
        };

        let body = response.body_mut().read_to_string()?;
        let rows: serde_json::Value = serde_json::from_str(&body)?;
        records_from_value(rows)
    }
}

impl MessageSource for SupabaseSource {
    fn describe(&self) -> String {
        self.endpoint.clone()
    }

    fn fetch(&self) -> BoxFuture<'static, Result<Vec<RawRecord>, SourceError>> {
        let source = SupabaseSource {
            agent: self.agent.clone(),
            endpoint: self.endpoint.clone(),
            anon_key: self.anon_key.clone(),
        };
        async move {
            tokio::task::spawn_blocking(move || source.request())
                .await
                .map_err(|e| SourceError::Unavailable(format!("fetch task failed: {e}")))?
        }
        .boxed()
    }
}

/// Fixed in-memory list, e.g. read from a local file.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    label: String,
    records: Vec<RawRecord>,
}

impl StaticSource {
    pub fn new(label: impl Into<String>, records: Vec<RawRecord>) -> Self {
        Self {
            label: label.into(),
            records,
        }
    }

    /// Load a YAML (or JSON) list of `{ value, author }` rows.
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let rows: serde_json::Value = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        let records = records_from_value(rows)
            .with_context(|| format!("Unexpected message file layout in {}", path.display()))?;
        Ok(Self::new(path.display().to_string(), records))
    }

    pub fn into_records(self) -> Vec<RawRecord> {
        self.records
    }
}

impl MessageSource for StaticSource {
    fn describe(&self) -> String {
        self.label.clone()
    }

    fn fetch(&self) -> BoxFuture<'static, Result<Vec<RawRecord>, SourceError>> {
        futures::future::ready(Ok(self.records.clone())).boxed()
    }
}

/// Pick the source for this run: a local file when given, the configured remote otherwise.
pub fn resolve(messages: Option<&Path>, config: &Config) -> anyhow::Result<Arc<dyn MessageSource>> {
    match messages {
        Some(path) => Ok(Arc::new(StaticSource::from_path(path)?)),
        None => Ok(Arc::new(SupabaseSource::from_config(&config.source())?)),
    }
}

fn rest_endpoint(url: &str, table: &str) -> String {
    format!("{}/rest/v1/{}?select=*", url.trim_end_matches('/'), table)
}

fn records_from_value(rows: serde_json::Value) -> Result<Vec<RawRecord>, SourceError> {
    match rows {
        serde_json::Value::Array(rows) => Ok(rows.iter().map(RawRecord::from_row).collect()),
        serde_json::Value::Null => Ok(Vec::new()),
        serde_json::Value::Object(_) => Err(SourceError::NotAList("an object")),
        serde_json::Value::String(_) => Err(SourceError::NotAList("a string")),
        serde_json::Value::Number(_) => Err(SourceError::NotAList("a number")),
        serde_json::Value::Bool(_) => Err(SourceError::NotAList("a boolean")),
    }
}

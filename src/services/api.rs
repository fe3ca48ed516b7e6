use crate::model::{ConfigTypeOption, TemplateInfo};
use anyhow::Context;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use thiserror::Error;

/// Failures at the backend boundary. `Fetch` covers transport errors,
/// non-2xx responses and undecodable bodies; `Backend` carries the message
/// of an explicit `success: false` envelope. The workflow treats both the
/// same way (retryable, never fatal), so the distinction only shows up in
/// the message shown to the user.
#[derive(Debug, Error, Clone)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Fetch(String),
    #[error("{0}")]
    Backend(String),
}

#[derive(Debug, Deserialize)]
struct ConfigTypesEnvelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    config_types: Vec<ConfigTypeOption>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TemplateInfoEnvelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    template_info: Option<TemplateInfo>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateEnvelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    commands: Vec<String>,
    #[serde(default)]
    error: Option<String>,
}

fn backend_error(error: Option<String>, fallback: &str) -> ApiError {
    ApiError::Backend(error.unwrap_or_else(|| fallback.to_string()))
}

pub(crate) fn decode_config_types(body: &str) -> Result<Vec<ConfigTypeOption>, ApiError> {
    let env: ConfigTypesEnvelope =
        serde_json::from_str(body).map_err(|e| ApiError::Fetch(format!("decoding response: {e}")))?;
    if !env.success {
        return Err(backend_error(env.error, "failed to fetch config types"));
    }
    Ok(env.config_types)
}

pub(crate) fn decode_template_info(body: &str) -> Result<TemplateInfo, ApiError> {
    let env: TemplateInfoEnvelope =
        serde_json::from_str(body).map_err(|e| ApiError::Fetch(format!("decoding response: {e}")))?;
    if !env.success {
        return Err(backend_error(env.error, "failed to fetch template info"));
    }
    env.template_info
        .ok_or_else(|| ApiError::Fetch("response missing template_info".to_string()))
}

pub(crate) fn decode_generate(body: &str) -> Result<Vec<String>, ApiError> {
    let env: GenerateEnvelope =
        serde_json::from_str(body).map_err(|e| ApiError::Fetch(format!("decoding response: {e}")))?;
    if !env.success {
        return Err(backend_error(env.error, "failed to generate configuration"));
    }
    Ok(env.commands)
}

/// Blocking client for the template backend. All calls are idempotent GETs
/// except `generate`, which only renders commands server-side and mutates
/// nothing. The request timeout bounds hung fetches so a failed selector
/// never sits in an indefinite loading state.
pub struct ApiClient {
    base_url: String,
    http: reqwest::blocking::Client,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .context("building HTTP client")?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    fn get_text(&self, path: &str) -> Result<String, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self
            .http
            .get(&url)
            .send()
            .map_err(|e| ApiError::Fetch(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(ApiError::Fetch(format!("{url}: HTTP {}", resp.status())));
        }
        resp.text().map_err(|e| ApiError::Fetch(e.to_string()))
    }

    pub fn config_types(&self, vendor: &str) -> Result<Vec<ConfigTypeOption>, ApiError> {
        let body = self.get_text(&format!("/api/config_types/{vendor}"))?;
        decode_config_types(&body)
    }

    pub fn template_info(
        &self,
        vendor: &str,
        config_type: &str,
    ) -> Result<TemplateInfo, ApiError> {
        let body = self.get_text(&format!("/api/template_info/{vendor}/{config_type}"))?;
        decode_template_info(&body)
    }

    pub fn generate(
        &self,
        vendor: &str,
        config_type: &str,
        parameters: &JsonValue,
    ) -> Result<Vec<String>, ApiError> {
        let url = format!("{}/api/generate", self.base_url);
        let payload = serde_json::json!({
            "vendor": vendor,
            "config_type": config_type,
            "parameters": parameters,
        });
        let resp = self
            .http
            .post(&url)
            .json(&payload)
            .send()
            .map_err(|e| ApiError::Fetch(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(ApiError::Fetch(format!("{url}: HTTP {}", resp.status())));
        }
        let body = resp.text().map_err(|e| ApiError::Fetch(e.to_string()))?;
        decode_generate(&body)
    }
}

// Async wrappers used by the workflow to fetch off-thread and report back.
// Each message echoes the generation captured at request time so stale
// completions can be discarded on arrival.
pub fn spawn_fetch_config_types(
    client: Arc<ApiClient>,
    vendor: String,
    generation: u64,
    tx: Sender<crate::ui::LoadMsg>,
) {
    thread::spawn(move || {
        let outcome = client
            .config_types(&vendor)
            .map(crate::ui::LoadOutcome::ConfigTypes);
        let _ = tx.send(crate::ui::LoadMsg {
            generation,
            kind: crate::ui::LoadKind::ConfigTypes,
            outcome,
        });
    });
}

pub fn spawn_fetch_template_info(
    client: Arc<ApiClient>,
    vendor: String,
    config_type: String,
    generation: u64,
    tx: Sender<crate::ui::LoadMsg>,
) {
    thread::spawn(move || {
        let outcome = client
            .template_info(&vendor, &config_type)
            .map(crate::ui::LoadOutcome::Template);
        let _ = tx.send(crate::ui::LoadMsg {
            generation,
            kind: crate::ui::LoadKind::Template,
            outcome,
        });
    });
}

pub fn spawn_generate(
    client: Arc<ApiClient>,
    vendor: String,
    config_type: String,
    parameters: JsonValue,
    generation: u64,
    tx: Sender<crate::ui::LoadMsg>,
) {
    thread::spawn(move || {
        let outcome = client
            .generate(&vendor, &config_type, &parameters)
            .map(crate::ui::LoadOutcome::Generated);
        let _ = tx.send(crate::ui::LoadMsg {
            generation,
            kind: crate::ui::LoadKind::Generate,
            outcome,
        });
    });
}

#[cfg(test)]
mod api_tests;

// Forwarding of detected requests to a manual-testing workbench
// Uses reqwest to hand the captured request over for parameter fuzzing

use crate::error::{Error, Result};
use crate::models::{CapturedRequest, HttpService};
use base64::{engine::general_purpose, Engine as _};
use reqwest::blocking::Client;
use serde::Serialize;
use std::time::Duration;

pub const FORWARD_CAPTION: &str = "Email Change Request";

/// Sends a request, with the names of the parameters worth fuzzing, to another tool
pub trait Forwarder {
    fn forward(&self, message: &CapturedRequest, target_params: &[String]) -> Result<()>;
}

/// Wire format accepted by the workbench endpoint
#[derive(Debug, Serialize)]
pub struct ForwardEnvelope<'a> {
    pub caption: &'a str,
    pub host: &'a str,
    pub port: u16,
    pub https: bool,
    pub method: String,
    pub url: &'a str,
    pub headers: &'a [(String, String)],
    pub body_base64: String,
    pub target_params: &'a [String],
}

impl<'a> ForwardEnvelope<'a> {
    pub fn new(
        service: &'a HttpService,
        message: &'a CapturedRequest,
        target_params: &'a [String],
    ) -> Self {
        Self {
            caption: FORWARD_CAPTION,
            host: &service.host,
            port: service.port,
            https: service.https,
            method: message.request.method.to_string(),
            url: &message.request.url,
            headers: &message.headers,
            body_base64: general_purpose::STANDARD.encode(&message.request.body),
            target_params,
        }
    }
}

pub struct WorkbenchForwarder {
    pub client: Client,
    pub endpoint: String,
}

impl WorkbenchForwarder {
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(10)
            .build()
            .map_err(|e| Error::Forward(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

impl Forwarder for WorkbenchForwarder {
    fn forward(&self, message: &CapturedRequest, target_params: &[String]) -> Result<()> {
        let service = message.service.as_ref().ok_or_else(|| {
            Error::Forward(format!("no target service for {}", message.request.url))
        })?;
        let envelope = ForwardEnvelope::new(service, message, target_params);

        let resp = self
            .client
            .post(&self.endpoint)
            .json(&envelope)
            .send()
            .map_err(|e| Error::Forward(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Forward(format!(
                "workbench at {} answered {}",
                self.endpoint, status
            )));
        }
        log::debug!("forwarded {} to {}", message.request.url, self.endpoint);
        Ok(())
    }
}

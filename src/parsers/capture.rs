// Capture-file parser for mailswap
// Reads requests exported by a host adapter as a JSON array or JSON lines

use crate::error::{Error, Result};
use crate::models::{CaptureParser, CapturedRequest, HttpService, Method, Parameter, ParsedRequest, Tool};
use crate::parsers::params::{cookie_parameters, extract_parameters};
use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// One request as written by a host adapter
#[derive(Debug, Deserialize)]
pub struct CaptureRecord {
    pub method: String,
    pub url: String,
    #[serde(default)]
    pub tool: Option<Tool>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub service: Option<HttpService>,
    #[serde(default)]
    pub headers: Vec<(String, String)>,
    /// Already-decoded parameters; derived from URL, body and cookies when absent
    #[serde(default)]
    pub parameters: Option<Vec<Parameter>>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub body_base64: Option<String>,
}

impl CaptureRecord {
    pub fn into_captured(self) -> Result<CapturedRequest> {
        let body = match (self.body_base64, self.body) {
            (Some(encoded), _) => general_purpose::STANDARD
                .decode(encoded.trim())
                .map_err(|e| Error::InvalidCapture(format!("bad body_base64 for {}: {}", self.url, e)))?,
            (None, Some(text)) => text.into_bytes(),
            (None, None) => Vec::new(),
        };

        let header = |name: &str| {
            self.headers
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.as_str())
        };

        let parameters = match self.parameters {
            Some(params) => params,
            None => {
                let mut params = extract_parameters(&self.url, header("content-type"), &body);
                if let Some(cookies) = header("cookie") {
                    params.extend(cookie_parameters(cookies));
                }
                params
            }
        };

        let service = self.service.or_else(|| HttpService::from_url(&self.url));
        Ok(CapturedRequest {
            tool: self.tool.unwrap_or(Tool::Proxy),
            timestamp: self.timestamp,
            service,
            headers: self.headers,
            request: ParsedRequest::new(Method::from(self.method.as_str()), self.url, parameters, body),
        })
    }
}

pub struct CaptureFileParser;

impl CaptureFileParser {
    /// Parse capture text: a JSON array of records, or one record per line
    pub fn parse_str(&self, data: &str) -> Result<Vec<CapturedRequest>> {
        let records: Vec<CaptureRecord> = if data.trim_start().starts_with('[') {
            serde_json::from_str(data)?
        } else {
            data.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(serde_json::from_str)
                .collect::<std::result::Result<_, _>>()?
        };

        records.into_iter().map(CaptureRecord::into_captured).collect()
    }
}

impl CaptureParser for CaptureFileParser {
    fn parse(&self, file_path: &str) -> Result<Vec<CapturedRequest>> {
        let data = std::fs::read_to_string(file_path)?;
        self.parse_str(&data)
    }
}

// HTTP Archive (HAR 1.2) parser for mailswap
// Uses serde_json to walk log.entries[].request of a browser or proxy export

use crate::error::{Error, Result};
use crate::models::{CaptureParser, CapturedRequest, HttpService, Method, Parameter, ParameterLocation, ParsedRequest, Tool};
use crate::parsers::params::{body_parameters, cookie_parameters, query_parameters};
use chrono::{DateTime, Utc};
use serde_json::Value;

pub struct HarParser;

impl HarParser {
    pub fn parse_str(&self, data: &str) -> Result<Vec<CapturedRequest>> {
        let json: Value = serde_json::from_str(data)?;
        let entries = json
            .get("log")
            .and_then(|l| l.get("entries"))
            .and_then(|e| e.as_array())
            .ok_or_else(|| Error::InvalidCapture("HAR file has no log.entries".to_string()))?;

        let mut captures = Vec::new();
        for entry in entries {
            if let Some(capture) = parse_entry(entry) {
                captures.push(capture);
            }
        }
        Ok(captures)
    }
}

impl CaptureParser for HarParser {
    fn parse(&self, file_path: &str) -> Result<Vec<CapturedRequest>> {
        let data = std::fs::read_to_string(file_path)?;
        self.parse_str(&data)
    }
}

fn parse_entry(entry: &Value) -> Option<CapturedRequest> {
    let request = entry.get("request")?;
    let method = request.get("method").and_then(|m| m.as_str())?;
    let url = request.get("url").and_then(|u| u.as_str())?;

    let headers: Vec<(String, String)> = request
        .get("headers")
        .and_then(|h| h.as_array())
        .map(|arr| arr.iter().filter_map(name_value).collect())
        .unwrap_or_default();

    let timestamp = entry
        .get("startedDateTime")
        .and_then(|t| t.as_str())
        .and_then(|t| DateTime::parse_from_rfc3339(t).ok())
        .map(|t| t.with_timezone(&Utc));

    let mut parameters = match request.get("queryString").and_then(|q| q.as_array()) {
        Some(pairs) => pairs
            .iter()
            .filter_map(name_value)
            .map(|(n, v)| Parameter::new(n, v, ParameterLocation::Url))
            .collect(),
        None => query_parameters(url),
    };

    let mut body = Vec::new();
    if let Some(post) = request.get("postData") {
        let mime = post.get("mimeType").and_then(|m| m.as_str());
        if let Some(text) = post.get("text").and_then(|t| t.as_str()) {
            body = text.as_bytes().to_vec();
        }
        match post.get("params").and_then(|p| p.as_array()) {
            Some(pairs) if !pairs.is_empty() => parameters.extend(
                pairs
                    .iter()
                    .filter_map(name_value)
                    .map(|(n, v)| Parameter::new(n, v, ParameterLocation::Body)),
            ),
            _ => parameters.extend(body_parameters(mime, &body)),
        }
    }

    if let Some(cookies) = request.get("cookies").and_then(|c| c.as_array()) {
        parameters.extend(
            cookies
                .iter()
                .filter_map(name_value)
                .map(|(n, v)| Parameter::new(n, v, ParameterLocation::Cookie)),
        );
    } else if let Some((_, cookie)) = headers.iter().find(|(k, _)| k.eq_ignore_ascii_case("cookie")) {
        parameters.extend(cookie_parameters(cookie));
    }

    Some(CapturedRequest {
        tool: Tool::Proxy,
        timestamp,
        service: HttpService::from_url(url),
        headers,
        request: ParsedRequest::new(Method::from(method), url, parameters, body),
    })
}

/// `{"name": .., "value": ..}` pair; a missing value reads as empty
fn name_value(v: &Value) -> Option<(String, String)> {
    let name = v.get("name").and_then(|n| n.as_str())?;
    let value = v.get("value").and_then(|n| n.as_str()).unwrap_or("");
    Some((name.to_string(), value.to_string()))
}

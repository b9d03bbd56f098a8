// Core data models and traits for mailswap

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// HTTP methods as reported by the host's HTTP engine
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Method {
    GET,
    POST,
    PUT,
    DELETE,
    PATCH,
    OPTIONS,
    HEAD,
    /// Any other verb (PROPFIND, TRACE, ...), kept verbatim
    Other(String),
}

impl Method {
    /// Methods that can carry an email change: POST, PUT and PATCH.
    pub fn is_state_changing(&self) -> bool {
        matches!(self, Method::POST | Method::PUT | Method::PATCH)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::GET => write!(f, "GET"),
            Method::POST => write!(f, "POST"),
            Method::PUT => write!(f, "PUT"),
            Method::DELETE => write!(f, "DELETE"),
            Method::PATCH => write!(f, "PATCH"),
            Method::OPTIONS => write!(f, "OPTIONS"),
            Method::HEAD => write!(f, "HEAD"),
            Method::Other(verb) => write!(f, "{}", verb),
        }
    }
}

impl From<&str> for Method {
    fn from(verb: &str) -> Self {
        match verb {
            "GET" => Method::GET,
            "POST" => Method::POST,
            "PUT" => Method::PUT,
            "DELETE" => Method::DELETE,
            "PATCH" => Method::PATCH,
            "OPTIONS" => Method::OPTIONS,
            "HEAD" => Method::HEAD,
            other => Method::Other(other.to_string()),
        }
    }
}

impl From<String> for Method {
    fn from(verb: String) -> Self {
        Method::from(verb.as_str())
    }
}

impl From<Method> for String {
    fn from(method: Method) -> Self {
        method.to_string()
    }
}

/// Where a parameter was found in the request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    /// Query string
    Url,
    /// Form-encoded body
    Body,
    /// Key of a JSON body
    Json,
    Cookie,
}

/// A decoded request parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(default)]
    pub value: String,
    #[serde(default = "default_location")]
    pub location: ParameterLocation,
}

fn default_location() -> ParameterLocation {
    ParameterLocation::Body
}

impl Parameter {
    pub fn new(name: impl Into<String>, value: impl Into<String>, location: ParameterLocation) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            location,
        }
    }
}

/// An already-parsed HTTP request, as supplied by the HTTP engine.
///
/// The classifier only ever reads it; parameters keep the order in which
/// they appear in the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRequest {
    pub method: Method,
    pub url: String,
    pub parameters: Vec<Parameter>,
    pub body: Vec<u8>,
}

impl ParsedRequest {
    pub fn new(method: Method, url: impl Into<String>, parameters: Vec<Parameter>, body: Vec<u8>) -> Self {
        Self {
            method,
            url: url.into(),
            parameters,
            body,
        }
    }
}

/// Target service of a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpService {
    pub host: String,
    pub port: u16,
    pub https: bool,
}

impl HttpService {
    /// Derive the service from an absolute URL. Relative URLs yield `None`.
    pub fn from_url(raw: &str) -> Option<Self> {
        let parsed = url::Url::parse(raw).ok()?;
        let https = match parsed.scheme() {
            "https" => true,
            "http" => false,
            _ => return None,
        };
        let host = parsed.host_str()?.to_string();
        let port = parsed.port_or_known_default()?;
        Some(Self { host, port, https })
    }

    pub fn protocol(&self) -> &'static str {
        if self.https { "https" } else { "http" }
    }
}

/// Host tool that delivered a message. Names are read case-insensitively
/// and written in lowercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Tool {
    Suite,
    Target,
    Proxy,
    Spider,
    Scanner,
    Intruder,
    Repeater,
    Sequencer,
    Decoder,
    Comparer,
    Extender,
    Unknown,
}

impl Tool {
    /// Map the host's tool bit flag to a tool.
    pub fn from_flag(flag: u32) -> Self {
        match flag {
            0x0001 => Tool::Suite,
            0x0002 => Tool::Target,
            0x0004 => Tool::Proxy,
            0x0008 => Tool::Spider,
            0x0010 => Tool::Scanner,
            0x0020 => Tool::Intruder,
            0x0040 => Tool::Repeater,
            0x0080 => Tool::Sequencer,
            0x0100 => Tool::Decoder,
            0x0200 => Tool::Comparer,
            0x0400 => Tool::Extender,
            _ => Tool::Unknown,
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tool::Suite => "Suite",
            Tool::Target => "Target",
            Tool::Proxy => "Proxy",
            Tool::Spider => "Spider",
            Tool::Scanner => "Scanner",
            Tool::Intruder => "Intruder",
            Tool::Repeater => "Repeater",
            Tool::Sequencer => "Sequencer",
            Tool::Decoder => "Decoder",
            Tool::Comparer => "Comparer",
            Tool::Extender => "Extender",
            Tool::Unknown => "Unknown",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for Tool {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "suite" => Ok(Tool::Suite),
            "target" => Ok(Tool::Target),
            "proxy" => Ok(Tool::Proxy),
            "spider" => Ok(Tool::Spider),
            "scanner" => Ok(Tool::Scanner),
            "intruder" => Ok(Tool::Intruder),
            "repeater" => Ok(Tool::Repeater),
            "sequencer" => Ok(Tool::Sequencer),
            "decoder" => Ok(Tool::Decoder),
            "comparer" => Ok(Tool::Comparer),
            "extender" => Ok(Tool::Extender),
            "unknown" => Ok(Tool::Unknown),
            other => Err(format!("unknown tool: {}", other)),
        }
    }
}

impl TryFrom<String> for Tool {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Tool> for String {
    fn from(tool: Tool) -> Self {
        tool.to_string().to_ascii_lowercase()
    }
}

/// One intercepted request handed over by the host adapter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedRequest {
    pub tool: Tool,
    pub timestamp: Option<DateTime<Utc>>,
    pub service: Option<HttpService>,
    pub headers: Vec<(String, String)>,
    pub request: ParsedRequest,
}

impl CapturedRequest {
    /// Wrap a parsed request as if it came through the proxy, with no headers.
    pub fn from_request(request: ParsedRequest) -> Self {
        Self {
            tool: Tool::Proxy,
            timestamp: None,
            service: HttpService::from_url(&request.url),
            headers: Vec::new(),
            request,
        }
    }

    /// First header with the given name, compared case-insensitively
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Trait for loading captured traffic (capture files, HAR archives, ...)
pub trait CaptureParser {
    /// Parse a capture file and return its requests in recorded order
    fn parse(&self, file_path: &str) -> crate::error::Result<Vec<CapturedRequest>>;
}

use std::{
    fmt::{self, Display},
    ops::{Deref, DerefMut},
    time::Duration,
};

use bytes::Bytes;
use url::{Host, Url};

pub const UNKNOWN_HOSTNAME: &str = "unknown";

/// Description of a single HTTP call.
///
/// Built by the caller and handed to an [`HttpClient`](crate::http_client::http_client::HttpClient).
/// Nothing is validated here: a bad method token or an unparseable URL only
/// surfaces when the request is executed.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: String,
    pub host: String,
    pub path: String,
    pub headers: RequestHeaders,
    pub body: Bytes,
    pub follow_location: bool,
    /// Zero means no overall limit.
    pub timeout: Duration,
}

impl Request {
    pub fn new(method: impl Display, host: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.to_string(),
            host: host.into(),
            path: path.into(),
            headers: RequestHeaders::default(),
            body: Bytes::new(),
            follow_location: true,
            timeout: Duration::ZERO,
        }
    }

    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.headers.push(header.into());
        self
    }

    pub fn with_headers<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.headers.extend(headers.into_iter().map(Into::into));
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_follow_location(mut self, follow_location: bool) -> Self {
        self.follow_location = follow_location;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Hostname component of `host`, or `"unknown"` when it cannot be parsed.
    pub fn hostname(&self) -> String {
        self.try_hostname().unwrap_or_else(|| UNKNOWN_HOSTNAME.to_string())
    }

    pub fn try_hostname(&self) -> Option<String> {
        let url = Url::parse(&self.host).ok()?;
        match url.host()? {
            Host::Domain(domain) => Some(domain.to_string()),
            Host::Ipv4(addr) => Some(addr.to_string()),
            Host::Ipv6(addr) => Some(addr.to_string()),
        }
    }

    /// `host` followed by `path`, with no normalization of any kind.
    pub fn url(&self) -> String {
        format!("{}{}", self.host, self.path)
    }

    pub fn has_header(&self, name: &str) -> bool {
        self.headers.contains_name(name)
    }
}

/// Raw `"Name: Value"` header lines, kept in caller order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestHeaders(pub Vec<String>);

impl RequestHeaders {
    /// Whether some well-formed entry carries `name`, compared trimmed and
    /// case-insensitively.
    pub fn contains_name(&self, name: &str) -> bool {
        let wanted = canonical_name(name);
        self.parsed().any(|(candidate, _)| canonical_name(candidate) == wanted)
    }

    /// Well-formed entries split on the first colon, both sides trimmed.
    /// Entries without a colon are skipped.
    pub fn parsed(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().filter_map(|line| {
            line.split_once(':')
                .map(|(name, value)| (name.trim(), value.trim()))
        })
    }
}

fn canonical_name(name: &str) -> String {
    name.trim().to_ascii_lowercase()
}

impl Deref for RequestHeaders {
    type Target = Vec<String>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for RequestHeaders {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<const N: usize> From<[&str; N]> for RequestHeaders {
    fn from(arr: [&str; N]) -> Self {
        RequestHeaders(arr.into_iter().map(String::from).collect())
    }
}

impl From<Vec<String>> for RequestHeaders {
    fn from(lines: Vec<String>) -> Self {
        RequestHeaders(lines)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RequestMethod {
    Get,
    Head,
    Post,
    Put,
    Delete,
    Patch,
    Options,
    Connect,
    Trace,
}

impl Display for RequestMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RequestMethod::Get => "GET",
            RequestMethod::Head => "HEAD",
            RequestMethod::Post => "POST",
            RequestMethod::Put => "PUT",
            RequestMethod::Delete => "DELETE",
            RequestMethod::Patch => "PATCH",
            RequestMethod::Options => "OPTIONS",
            RequestMethod::Connect => "CONNECT",
            RequestMethod::Trace => "TRACE",
        };
        write!(f, "{}", s)
    }
}

use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str =
    concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Transport settings shared by every call made through a client.
///
/// Per-request settings (timeout, redirect policy) live on the
/// [`Request`](crate::http_client::request::Request) and are applied to a
/// transport built for that call only, so this value is never mutated once a
/// client owns it.
///
/// `accept_invalid_certs` defaults to `true`: HTTPS peers are not verified
/// and any certificate is accepted, including self-signed, expired and
/// hostname-mismatched ones.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub connect_timeout: Duration,
    pub tcp_keepalive: Duration,
    pub user_agent: String,
    pub accept_invalid_certs: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            tcp_keepalive: Duration::from_secs(30),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept_invalid_certs: true,
        }
    }
}

impl ClientConfig {
    pub fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }

    pub fn with_tcp_keepalive(mut self, tcp_keepalive: Duration) -> Self {
        self.tcp_keepalive = tcp_keepalive;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_accept_invalid_certs(mut self, accept_invalid_certs: bool) -> Self {
        self.accept_invalid_certs = accept_invalid_certs;
        self
    }
}

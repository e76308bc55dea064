use async_trait::async_trait;
use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, header};
use reqwest::redirect::Policy;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use crate::http_client::{
    client_config::ClientConfig,
    error::{Error, HttpClientErrorChecker},
    http_client::HttpClient,
    request::Request,
    response::Response,
};

/// [`HttpClient`] backed by `reqwest`.
///
/// A fresh transport is built from the shared [`ClientConfig`] for every
/// call, carrying that call's timeout and redirect policy, so concurrent
/// calls never observe each other's settings. Idle pooling is disabled and
/// every request asks the peer to close the connection.
///
/// With the default config, TLS certificates are NOT verified.
#[derive(Clone, Default)]
pub struct ReqwestHttpClient {
    config: ClientConfig,
}

impl ReqwestHttpClient {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn build_client(&self, request: &Request) -> Result<reqwest::Client, Error> {
        let redirect_policy = if request.follow_location {
            Policy::default()
        } else {
            Policy::none()
        };

        let mut builder = reqwest::Client::builder()
            .connect_timeout(self.config.connect_timeout)
            .tcp_keepalive(self.config.tcp_keepalive)
            .danger_accept_invalid_certs(self.config.accept_invalid_certs)
            .pool_max_idle_per_host(0)
            .redirect(redirect_policy);

        if !request.timeout.is_zero() {
            builder = builder.timeout(request.timeout);
        }

        builder.build().map_err(Error::from)
    }

    fn inject_default_headers(&self, request: &mut Request) {
        if !request.has_header(header::HOST.as_str()) {
            let host = format!("Host: {}", request.hostname());
            request.headers.push(host);
        }

        if !request.has_header(header::USER_AGENT.as_str()) {
            let user_agent = format!("User-Agent: {}", self.config.user_agent);
            request.headers.push(user_agent);
        }
    }

    async fn round_trip(&self, mut request: Request) -> Response {
        let client = match self.build_client(&request) {
            Ok(client) => client,
            Err(err) => return fail(request, err),
        };

        let mut outbound = match build_outbound(&client, &request) {
            Ok(outbound) => outbound,
            Err(err) => return fail(request, err),
        };

        // The transport derives Host from the URL authority when none is set,
        // which stays correct across redirects to other hosts.
        let host_is_derived = !request.has_header(header::HOST.as_str());
        self.inject_default_headers(&mut request);

        let outbound_headers = outbound.headers_mut();
        outbound_headers.insert(header::CONNECTION, HeaderValue::from_static("close"));
        apply_headers(
            outbound_headers,
            request
                .headers
                .parsed()
                .filter(|(name, _)| !(host_is_derived && name.eq_ignore_ascii_case("host"))),
        );

        info!("Executing {} {}", outbound.method(), outbound.url());

        let reply = match client.execute(outbound).await {
            Ok(reply) => reply,
            Err(err) => return fail(request, Error::from(err)),
        };

        let status_code = reply.status();
        let headers = flatten_headers(reply.headers());

        let body = match reply.bytes().await {
            Ok(body) => body,
            Err(err) => return fail(request, Error::from(err)),
        };

        info!("Received {} ({} bytes)", status_code, body.len());

        Response {
            request,
            status: status_line(status_code),
            status_code: status_code.as_u16(),
            headers,
            body,
            err: None,
        }
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn execute(&self, request: Request) -> Response {
        let span = info_span!(
            "http_request",
            id = %Uuid::new_v4(),
            method = %request.method,
            url = %request.url(),
        );

        self.round_trip(request).instrument(span).await
    }
}

fn fail(request: Request, err: Error) -> Response {
    warn!("Request failed: {err}");
    Response::failed(request, err)
}

fn build_outbound(client: &reqwest::Client, request: &Request) -> Result<reqwest::Request, Error> {
    let method = if request.method.is_empty() {
        Method::GET
    } else {
        Method::from_bytes(request.method.as_bytes())
            .map_err(|e| Error::InvalidRequest(format!("{e}: {:?}", request.method)))?
    };

    let url = reqwest::Url::parse(&request.url())
        .map_err(|e| Error::InvalidRequest(format!("{e}: {:?}", request.url())))?;

    let mut builder = client.request(method, url);
    if !request.body.is_empty() {
        builder = builder.body(request.body.clone());
    }

    builder.build().map_err(Error::from)
}

/// Sets each pair on `target` in order, replacing earlier values of the same
/// name. Pairs that are not a legal header name or value are skipped.
fn apply_headers<'a>(target: &mut HeaderMap, headers: impl Iterator<Item = (&'a str, &'a str)>) {
    for (name, value) in headers {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_bytes(value.as_bytes()),
        ) {
            (Ok(name), Ok(value)) => {
                target.insert(name, value);
            }
            _ => debug!("Skipping unusable header {:?}: {:?}", name, value),
        }
    }
}

fn flatten_headers(headers: &HeaderMap) -> Vec<String> {
    headers
        .iter()
        .map(|(name, value)| {
            format!("{}: {}", name.as_str(), String::from_utf8_lossy(value.as_bytes()))
        })
        .collect()
}

fn status_line(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {}", status.as_u16(), reason),
        None => status.as_u16().to_string(),
    }
}

impl HttpClientErrorChecker for reqwest::Error {
    fn is_timeout(&self) -> bool {
        reqwest::Error::is_timeout(self)
    }

    fn is_builder(&self) -> bool {
        reqwest::Error::is_builder(self)
    }

    fn is_body(&self) -> bool {
        reqwest::Error::is_body(self) || reqwest::Error::is_decode(self)
    }

    fn is_connect(&self) -> bool {
        reqwest::Error::is_connect(self)
    }

    fn is_request(&self) -> bool {
        reqwest::Error::is_request(self)
    }

    fn is_redirect(&self) -> bool {
        reqwest::Error::is_redirect(self)
    }

    fn error_string(&self) -> String {
        self.to_string()
    }
}

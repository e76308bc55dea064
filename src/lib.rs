//! Single-call HTTP execution.
//!
//! Describe a call with a [`Request`], hand it to [`execute`] (or any
//! [`HttpClient`]) and inspect the returned [`Response`]. Failures never
//! escape as `Err` or panics: check [`Response::err`] before trusting the
//! other fields.
//!
//! HTTPS certificates are not verified by the default client. Use
//! [`ClientConfig::with_accept_invalid_certs`] with a
//! [`ReqwestHttpClient`] to opt back in.

pub mod http_client;

pub use http_client::{
    client_config::ClientConfig,
    error::Error,
    http_client::HttpClient,
    request::{Request, RequestHeaders, RequestMethod},
    reqwest_http_client::ReqwestHttpClient,
    response::Response,
};

/// Executes `request` with a default [`ReqwestHttpClient`].
pub async fn execute(request: Request) -> Response {
    ReqwestHttpClient::default().execute(request).await
}

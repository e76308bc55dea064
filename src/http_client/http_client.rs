use async_trait::async_trait;

use crate::http_client::{request::Request, response::Response};

/// Executes one request and captures whatever came back.
///
/// Implementations never fail the call itself: every error ends up in
/// [`Response::err`].
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, request: Request) -> Response;
}

pub mod client_config;
pub mod error;
pub mod http_client;
pub mod request;
pub mod reqwest_http_client;
pub mod response;

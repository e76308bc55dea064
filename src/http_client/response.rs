use bytes::Bytes;

use crate::http_client::{error::Error, request::Request};

/// Everything observed for one executed [`Request`].
///
/// Check `err` first: when it is set the remaining fields are zero-valued and
/// carry no meaning.
#[derive(Debug)]
pub struct Response {
    pub request: Request,
    pub status: String,
    pub status_code: u16,
    pub headers: Vec<String>,
    pub body: Bytes,
    pub err: Option<Error>,
}

impl Response {
    pub fn failed(request: Request, err: Error) -> Self {
        Self {
            request,
            status: String::new(),
            status_code: 0,
            headers: Vec::new(),
            body: Bytes::new(),
            err: Some(err),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.err.is_none()
    }

    /// First value of the named header, matched case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        let wanted = name.trim();
        self.headers.iter().find_map(|line| {
            let (candidate, value) = line.split_once(':')?;
            candidate
                .trim()
                .eq_ignore_ascii_case(wanted)
                .then(|| value.trim())
        })
    }

    pub fn into_result(mut self) -> Result<Response, Error> {
        match self.err.take() {
            Some(err) => Err(err),
            None => Ok(self),
        }
    }
}

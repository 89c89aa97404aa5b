use std::fmt::{Display, Formatter, Result as FmtResult};

use bytes::Bytes;
use serde::Deserialize;

/// Error body of a failed request, reduced to its `message` field when the
/// service answered with its usual JSON error object.
#[derive(Debug)]
pub struct ServiceResponse(String);

impl ServiceResponse {
    pub fn new(bytes: Bytes) -> Self {
        let text = String::from_utf8_lossy(&bytes);

        match serde_json::from_str::<ErrorBody>(&text) {
            Ok(body) => Self(body.message),
            Err(_) => Self(text.into_owned()),
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

impl Display for ServiceResponse {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        if self.0.is_empty() {
            Ok(())
        } else {
            write!(f, "; service responded: {}", self.0)
        }
    }
}

use http::header::CONTENT_TYPE;
use http::HeaderMap;
use http::HeaderValue;
use http::StatusCode;
use serde_json::Value;

use crate::error::ApiError;

/// Response payload produced by the chain.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    None,
    Json(Value),
    Binary {
        data: Vec<u8>,
        content_type: String,
        filename: Option<String>,
    },
}

impl ResponseBody {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::None => true,
            Self::Json(value) => value.is_null(),
            Self::Binary { data, .. } => data.is_empty(),
        }
    }
}

/// Response under construction while a request traverses the chain.
///
/// The status starts unset; the first stage that decides the outcome sets it,
/// and every later stage treats a set status as the signal to skip its normal
/// work. This is how an auth rejection in a `pre` stage prevents the route
/// handler from running without unwinding the chain.
#[derive(Debug)]
pub struct PipelineResponse {
    status: Option<StatusCode>,
    pub headers: HeaderMap,
    pub body: ResponseBody,
}

impl PipelineResponse {
    pub fn new() -> Self {
        Self {
            status: None,
            headers: HeaderMap::new(),
            body: ResponseBody::None,
        }
    }

    /// Status decided so far, if any stage has decided one.
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = Some(status);
    }

    /// Classify an error into status and structured body.
    pub fn set_error(&mut self, error: &ApiError, include_details: bool) {
        self.status = Some(error.status());
        self.body = ResponseBody::Json(error.to_body(include_details));
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    }
}

impl Default for PipelineResponse {
    fn default() -> Self {
        Self::new()
    }
}

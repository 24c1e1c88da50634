/// Classified failure of a single catalog request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// The request address could not be built from the inputs.
    #[error("invalid request address")]
    InvalidAddress,
    /// Transport failed before a usable response arrived.
    #[error("no response data: {0}")]
    NoResponseData(String),
    /// Upstream answered with a non-success HTTP status.
    #[error("upstream returned HTTP {0}")]
    UpstreamStatus(u16),
    /// Body arrived but did not have the expected shape.
    #[error("failed to decode {endpoint} response: {detail}")]
    Decode { endpoint: String, detail: String },
    /// Well-formed body whose `error` field is not `"0"`.
    #[error("{endpoint} rejected by upstream: {code}")]
    Rejected { endpoint: String, code: String },
    #[error("request failed: {0}")]
    Unclassified(String),
}

impl FetchError {
    pub(crate) fn from_transport(err: reqwest::Error, endpoint: &str) -> Self {
        if err.is_builder() {
            FetchError::InvalidAddress
        } else if let Some(status) = err.status() {
            FetchError::UpstreamStatus(status.as_u16())
        } else if err.is_decode() {
            FetchError::Decode {
                endpoint: endpoint.to_string(),
                detail: err.to_string(),
            }
        } else if err.is_connect() || err.is_timeout() || err.is_request() || err.is_body() {
            FetchError::NoResponseData(err.to_string())
        } else {
            FetchError::Unclassified(err.to_string())
        }
    }

    /// Short message for a transient user-facing notification.
    pub fn user_message(&self) -> &'static str {
        match self {
            FetchError::InvalidAddress => "The request address is malformed.",
            FetchError::UpstreamStatus(404) => "Nothing was found (404).",
            FetchError::Decode { .. } => "Received data could not be read.",
            FetchError::Rejected { .. } => "The catalog has no such entry.",
            FetchError::NoResponseData(_)
            | FetchError::UpstreamStatus(_)
            | FetchError::Unclassified(_) => "An error occurred while loading data.",
        }
    }
}

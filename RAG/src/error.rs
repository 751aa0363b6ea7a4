use thiserror::Error;

/// Failures produced at the boundary of an external collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UpstreamError {
    #[error("configuration missing: {0}")]
    ConfigurationMissing(String),

    #[error("upstream transport failure: {0}")]
    UpstreamTransportFailure(String),

    #[error("upstream response malformed: {0}")]
    UpstreamResponseMalformed(String),
}

impl UpstreamError {
    /// Machine-readable kind reported in the `error` field of a response.
    pub fn kind(&self) -> &'static str {
        match self {
            UpstreamError::ConfigurationMissing(_) => "configuration_missing",
            UpstreamError::UpstreamTransportFailure(_) => "upstream_transport_failure",
            UpstreamError::UpstreamResponseMalformed(_) => "upstream_response_malformed",
        }
    }
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        // The search key travels in the query string.
        let err = err.without_url();
        if err.is_decode() {
            UpstreamError::UpstreamResponseMalformed(err.to_string())
        } else {
            UpstreamError::UpstreamTransportFailure(err.to_string())
        }
    }
}

pub type UpstreamResult<T> = std::result::Result<T, UpstreamError>;

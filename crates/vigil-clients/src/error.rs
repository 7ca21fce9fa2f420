use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{service} returned {status}: {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("Failed to parse {service} response: {source}")]
    Parse {
        service: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("{0} returned no completion text")]
    EmptyCompletion(&'static str),
}

impl ClientError {
    /// Transient failures worth another attempt: connect errors, timeouts,
    /// 429 and 5xx responses. Auth and request-shape errors are final.
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Http(e) => {
                if e.is_timeout() || e.is_connect() {
                    return true;
                }
                e.status()
                    .map(|s| s.is_server_error() || s.as_u16() == 429)
                    .unwrap_or(false)
            }
            ClientError::Status { status, .. } => *status == 429 || (500..600).contains(status),
            ClientError::Parse { .. } | ClientError::EmptyCompletion(_) => false,
        }
    }

    /// Short name of the collaborator that produced this error, when known.
    pub fn service(&self) -> Option<&'static str> {
        match self {
            ClientError::Status { service, .. } | ClientError::Parse { service, .. } => {
                Some(service)
            }
            ClientError::EmptyCompletion(service) => Some(service),
            ClientError::Http(_) => None,
        }
    }
}

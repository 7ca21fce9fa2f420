use thiserror::Error;
use vigil_clients::ClientError;

#[derive(Debug, Error)]
pub enum VigilError {
    #[error("{collaborator} unavailable")]
    CollaboratorUnavailable {
        collaborator: &'static str,
        #[source]
        source: ClientError,
    },

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("missing input artifact: {0}")]
    MissingInputArtifact(String),

    #[error("missing credential: set {0}")]
    MissingCredential(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("invalid store key '{0}': must be a relative path without '..'")]
    InvalidKey(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl VigilError {
    pub fn news(source: ClientError) -> Self {
        VigilError::CollaboratorUnavailable {
            collaborator: "news service",
            source,
        }
    }

    pub fn model(source: ClientError) -> Self {
        VigilError::CollaboratorUnavailable {
            collaborator: "language model",
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, VigilError>;

use std::time::Duration;

/// Problems with a behavior definition. These surface while definitions are
/// being built or loaded, before any simulated user starts.
#[derive(Debug, thiserror::Error)]
pub enum DefinitionError {
    #[error("behavior definition `{0}` declares no tasks")]
    NoTasks(String),

    #[error("invalid wait bounds [{min}, {max}]: both must be finite, non-negative and min <= max")]
    InvalidWaitBounds { min: f64, max: f64 },

    #[error("`{0}` has a weight of zero")]
    ZeroWeight(String),

    #[error("task `{0}` declares no requests")]
    NoRequests(String),

    #[error("task names must not be empty")]
    EmptyTaskName,

    #[error("invalid host `{host}`: {reason}")]
    InvalidHost { host: String, reason: String },

    #[error("unsupported http method `{0}`")]
    InvalidMethod(String),

    #[error("failed to parse behavior definition")]
    Parse(#[from] serde_json::Error),

    #[error("failed to read behavior definition")]
    Io(#[from] std::io::Error),
}

/// A single request that did not produce a response.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("invalid request uri `{uri}`")]
    InvalidUri {
        uri: String,
        #[source]
        source: hyper::http::uri::InvalidUri,
    },

    #[error("failed to build request")]
    Build(#[from] hyper::http::Error),

    #[error("failed to send request")]
    Connect(#[from] hyper_util::client::legacy::Error),

    #[error("failed to read response body: {0}")]
    Body(String),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),
}

/// Why a task body gave up.
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error(transparent)]
    Request(#[from] RequestError),

    #[error("{0}")]
    Failed(String),
}

impl TaskError {
    pub fn failed(msg: impl Into<String>) -> Self {
        Self::Failed(msg.into())
    }
}

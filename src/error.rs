use thiserror::Error;

/// Errors raised while decoding subscriptions or generating client configs.
///
/// Per-node incompatibilities with a target format are deliberately *not*
/// represented here: serializers log a warning and skip the node, so that a
/// single unsupported node never aborts a generation run.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid or missing configuration (filter, credential, binary path).
    /// Always fatal for the whole generation run.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// Malformed subscription payload. Fatal for that subscription's decode
    /// call, but independent subscriptions in the same run are unaffected.
    #[error("failed to parse subscription '{name}': {message}")]
    SourceParse { name: String, message: String },

    /// Network failure while fetching a subscription. Retry policy belongs
    /// to the caller.
    #[error("failed to fetch '{url}': {message}")]
    Fetch { url: String, message: String },

    /// Filesystem failure while writing a generated side-config.
    #[error("io error on '{path}': {message}")]
    Io { path: String, message: String },
}

impl Error {
    pub fn source_parse(source: &str, message: impl Into<String>) -> Self {
        Error::SourceParse {
            name: source.to_string(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

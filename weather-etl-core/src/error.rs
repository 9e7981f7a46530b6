use thiserror::Error;

/// Failure taxonomy shared by every pipeline stage.
#[derive(Debug, Error)]
pub enum EtlError {
    /// A required secret or setting is missing or unusable.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The request never produced an HTTP response.
    #[error("Transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// The weather provider answered with a non-success status.
    #[error("Weather provider returned status {status}: {}", truncate_body(.body))]
    RemoteService { status: u16, body: String },

    /// Raw input could not be turned into records.
    #[error("{}", transform_message(.index, .reason))]
    Transform { index: Option<usize>, reason: String },

    /// Local file output failed.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The remote store refused or never received the batch.
    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl EtlError {
    pub(crate) fn transform(reason: impl Into<String>) -> Self {
        Self::Transform { index: None, reason: reason.into() }
    }

    pub(crate) fn transform_at(index: usize, reason: impl Into<String>) -> Self {
        Self::Transform { index: Some(index), reason: reason.into() }
    }
}

fn transform_message(index: &Option<usize>, reason: &str) -> String {
    match index {
        Some(i) => format!("Transform error at entry {i}: {reason}"),
        None => format!("Transform error: {reason}"),
    }
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}

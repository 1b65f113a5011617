//! Server Error Types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("{0}")]
    Config(String),

    #[error("Polar API error ({status})")]
    Upstream { status: u16, body: String },

    #[error("Polar request failed: {0}")]
    Http(#[from] reqwest::Error),
}

impl ServerError {
    /// Extra diagnostic detail for the error body
    pub fn details(&self) -> Option<String> {
        match self {
            Self::Upstream { body, .. } if !body.is_empty() => Some(body.clone()),
            Self::Http(e) => Some(format!("{e:?}")),
            _ => None,
        }
    }
}

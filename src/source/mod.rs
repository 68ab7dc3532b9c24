//! Inbound data collaborators.
//!
//! A [`DataSource`] supplies one [`SourceData`] per fetch. The scheduler only
//! depends on the trait, so tests swap in a [`FixedSource`] while the binary
//! uses the [`MockSource`] generator or, with the `live` feature, an
//! [`HttpSource`].

pub mod mock;
pub mod types;

#[cfg(feature = "live")]
pub mod http;

pub use mock::{FixedSource, MockSource};
pub use types::{Agent, Project, SourceData};

#[cfg(feature = "live")]
pub use http::HttpSource;

use std::future::Future;
use std::time::Duration;

/// A pull-based supplier of agent and project records.
pub trait DataSource: Send + Sync + 'static {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Fetch the current records.
    fn fetch(&self) -> impl Future<Output = Result<SourceData, SourceError>> + Send;
}

/// Failures of the inbound data collaborator.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceError {
    /// The source could not be reached or refused the request
    Unavailable(String),
    /// The source did not answer within the fetch timeout
    Timeout(Duration),
    /// The payload could not be decoded
    Decode(String),
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceError::Unavailable(msg) => write!(f, "Source unavailable: {msg}"),
            SourceError::Timeout(after) => {
                write!(f, "Source timed out after {}ms", after.as_millis())
            }
            SourceError::Decode(msg) => write!(f, "Source payload invalid: {msg}"),
        }
    }
}

impl std::error::Error for SourceError {}

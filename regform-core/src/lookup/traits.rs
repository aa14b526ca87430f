//! Region lookup capability handed to the form controller.

use async_trait::async_trait;
use thiserror::Error;

use crate::model::region_list::{CountryId, Region};

/// Failure modes of a region lookup. All of them surface to the user the
/// same way: a disabled region selector with an error placeholder.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LookupError {
    /// Connection, DNS, timeout or body read failure.
    #[error("request to {endpoint} failed: {reason}")]
    Transport { endpoint: String, reason: String },

    /// Endpoint answered with a non-success status.
    #[error("{endpoint} answered with status {status}")]
    Status { endpoint: String, status: u16 },

    /// Body was not a list of `{id, name}` objects.
    #[error("unexpected payload from {endpoint}: {reason}")]
    Decode { endpoint: String, reason: String },
}

impl LookupError {
    pub fn endpoint(&self) -> &str {
        match self {
            Self::Transport { endpoint, .. }
            | Self::Status { endpoint, .. }
            | Self::Decode { endpoint, .. } => endpoint,
        }
    }
}

/// Fetches the ordered region list of one country.
#[async_trait]
pub trait RegionLookup: Send + Sync {
    async fn regions(&self, country: &CountryId) -> Result<Vec<Region>, LookupError>;
}

use crate::TrackId;
use async_trait::async_trait;
use std::fmt::Formatter;
use tracing::{debug, warn};

#[derive(Debug, thiserror::Error)]
pub struct CatalogSourceError(Box<dyn std::error::Error + Send + Sync>);

impl CatalogSourceError {
    pub fn new(error: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self(error.into())
    }
}

impl std::fmt::Display for CatalogSourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[async_trait(?Send)]
pub trait CatalogSource {
    async fn list_tracks(&self) -> Result<Vec<TrackId>, CatalogSourceError>;
}

// Failures degrade to an empty catalog.
pub async fn fetch_catalog(source: &dyn CatalogSource) -> Vec<TrackId> {
    match source.list_tracks().await {
        Ok(tracks) => {
            debug!(tracks = tracks.len(), "Catalog has been loaded");
            tracks
        }
        Err(error) => {
            warn!(%error, "Unable to load catalog, continuing with an empty one");
            vec![]
        }
    }
}

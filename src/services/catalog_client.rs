use async_trait::async_trait;
use card_player::{CatalogSource, CatalogSourceError, TrackId};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub(crate) enum CatalogClientError {
    #[error(transparent)]
    ReqwestError(#[from] reqwest::Error),
}

#[derive(Deserialize)]
struct MusicListing {
    files: Option<Vec<String>>,
}

pub(crate) struct CatalogClient {
    client: Client,
    endpoint: String,
}

impl CatalogClient {
    pub(crate) fn create(endpoint: &str) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
        }
    }

    pub(crate) async fn fetch_listing(&self) -> Result<Vec<String>, CatalogClientError> {
        debug!(endpoint = %self.endpoint, "Requesting music listing");

        let listing = self
            .client
            .get(&self.endpoint)
            .send()
            .await?
            .error_for_status()?
            .json::<MusicListing>()
            .await?;

        Ok(listing.files.unwrap_or_default())
    }
}

#[async_trait(?Send)]
impl CatalogSource for CatalogClient {
    async fn list_tracks(&self) -> Result<Vec<TrackId>, CatalogSourceError> {
        let files = self.fetch_listing().await.map_err(CatalogSourceError::new)?;

        Ok(files.into_iter().map(TrackId::from).collect())
    }
}

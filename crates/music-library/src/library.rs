use std::path::PathBuf;
use tracing::{debug, error};

const TRACK_EXTENSION: &str = ".mp3";

#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    #[error("Unable to read music directory: {0}")]
    ReadDirectory(#[from] std::io::Error),
}

#[derive(Clone, Debug)]
pub struct MusicLibrary {
    directory: PathBuf,
}

impl MusicLibrary {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    fn is_track(&self, file_name: &str) -> bool {
        file_name.to_lowercase().ends_with(TRACK_EXTENSION)
    }

    // Sorted, directory order is platform dependent.
    pub async fn list_tracks(&self) -> Result<Vec<String>, LibraryError> {
        let mut entries = tokio::fs::read_dir(&self.directory).await?;
        let mut tracks = vec![];

        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_dir() {
                continue;
            }

            let file_name = match entry.file_name().into_string() {
                Ok(file_name) => file_name,
                Err(file_name) => {
                    debug!(?file_name, "Skipping file with non UTF-8 name");
                    continue;
                }
            };

            if self.is_track(&file_name) {
                tracks.push(file_name);
            }
        }

        tracks.sort();

        Ok(tracks)
    }

    pub async fn list_tracks_or_empty(&self) -> Vec<String> {
        match self.list_tracks().await {
            Ok(tracks) => tracks,
            Err(error) => {
                error!(?error, directory = ?self.directory, "Unable to read music directory");
                vec![]
            }
        }
    }

    pub fn resolve(&self, file_name: &str) -> Option<PathBuf> {
        if file_name.is_empty()
            || file_name.contains('/')
            || file_name.contains('\\')
            || file_name == ".."
            || !self.is_track(file_name)
        {
            return None;
        }

        Some(self.directory.join(file_name))
    }
}

use std::path::{Path, PathBuf};

use reqwest::Client;
use tracing::{info, warn};

use crate::client::download::save_image;
use crate::client::{ClientError, DesignClient, DesignSubmission, ImageFile, ProcessingMode};
use crate::hash::short_hash;

pub const MAX_BATCH_FILES: usize = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BatchStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Error,
}

impl BatchStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone)]
pub struct BatchItem {
    pub id: String,
    pub file: ImageFile,
    pub status: BatchStatus,
    pub result: Option<String>,
    pub error: Option<ClientError>,
}

/// Queue of images designed one after another with the same theme and room.
#[derive(Debug, Default)]
pub struct BatchQueue {
    items: Vec<BatchItem>,
    added: usize,
}

impl BatchQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, file: ImageFile) -> Result<&BatchItem, ClientError> {
        if self.items.len() >= MAX_BATCH_FILES {
            return Err(ClientError::BatchFull(MAX_BATCH_FILES));
        }
        file.validate()?;
        self.added += 1;
        let id = short_hash(&format!("{}:{}:{}", self.added, file.name, file.size), 12);
        self.items.push(BatchItem {
            id,
            file,
            status: BatchStatus::Pending,
            result: None,
            error: None,
        });
        Ok(&self.items[self.items.len() - 1])
    }

    pub fn remove(&mut self, id: &str) -> Option<BatchItem> {
        let index = self.items.iter().position(|item| item.id == id)?;
        Some(self.items.remove(index))
    }

    pub fn items(&self) -> &[BatchItem] {
        &self.items
    }

    pub fn count(&self) -> usize {
        self.items.len()
    }

    /// Design every item that has not completed yet. A failing item is marked
    /// and the loop moves on. `on_update` sees each status change.
    pub async fn process<F>(&mut self, client: &DesignClient, theme: &str, room: &str, mut on_update: F)
    where
        F: FnMut(usize, &BatchItem),
    {
        for index in 0..self.items.len() {
            if self.items[index].status == BatchStatus::Completed {
                continue;
            }
            let item = &mut self.items[index];
            item.status = BatchStatus::Processing;
            item.error = None;
            on_update(index, item);

            let outcome = match item.file.read_data_uri().await {
                Ok(image) => {
                    let submission = DesignSubmission {
                        image: &image,
                        theme,
                        room,
                        settings: None,
                        user_id: None,
                        mode: ProcessingMode::Single,
                    };
                    client.submit(&submission).await
                }
                Err(err) => Err(err),
            };

            let item = &mut self.items[index];
            match outcome {
                Ok(outcome) => {
                    item.status = BatchStatus::Completed;
                    item.result = Some(outcome.output_image);
                }
                Err(err) => {
                    warn!(name = %item.file.name, error = %err, "batch item failed");
                    item.status = BatchStatus::Error;
                    item.error = Some(err);
                }
            }
            on_update(index, item);
        }
        info!(
            completed = self.completed().count(),
            total = self.items.len(),
            "batch finished"
        );
    }

    /// Completed items with their 1-based queue position.
    pub fn completed(&self) -> impl Iterator<Item = (usize, &BatchItem)> {
        self.items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.status == BatchStatus::Completed && item.result.is_some())
            .map(|(index, item)| (index + 1, item))
    }

    /// Save every completed result as `batch_design_{n}.png`.
    pub async fn download_all(&self, http: &Client, dir: &Path) -> Result<Vec<PathBuf>, ClientError> {
        let mut written = Vec::new();
        for (position, item) in self.completed() {
            let Some(result) = &item.result else { continue };
            let path = dir.join(format!("batch_design_{position}.png"));
            save_image(http, result, &path).await?;
            written.push(path);
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

    fn png(name: &str) -> ImageFile {
        ImageFile::from_bytes(name, PNG_MAGIC.to_vec())
    }

    #[test]
    fn queue_is_capped() {
        let mut queue = BatchQueue::new();
        for i in 0..MAX_BATCH_FILES {
            queue.add(png(&format!("room-{i}.png"))).unwrap();
        }
        assert_eq!(
            queue.add(png("extra.png")).unwrap_err(),
            ClientError::BatchFull(MAX_BATCH_FILES)
        );
        assert_eq!(queue.count(), MAX_BATCH_FILES);
    }

    #[test]
    fn invalid_files_are_not_queued_and_ids_are_unique() {
        let mut queue = BatchQueue::new();
        let err = queue
            .add(ImageFile::from_bytes("notes.txt", b"hi".to_vec()))
            .unwrap_err();
        assert_eq!(err, ClientError::InvalidFileType);

        let first = queue.add(png("same.png")).unwrap().id.clone();
        let second = queue.add(png("same.png")).unwrap().id.clone();
        assert_ne!(first, second);

        assert!(queue.remove(&first).is_some());
        assert!(queue.remove(&first).is_none());
        assert_eq!(queue.items()[0].id, second);
    }

    #[test]
    fn completed_positions_are_one_based() {
        let mut queue = BatchQueue::new();
        queue.add(png("a.png")).unwrap();
        queue.add(png("b.png")).unwrap();
        queue.items[1].status = BatchStatus::Completed;
        queue.items[1].result = Some("data:image/png;base64,AA==".to_string());
        let positions: Vec<usize> = queue.completed().map(|(n, _)| n).collect();
        assert_eq!(positions, vec![2]);
    }
}

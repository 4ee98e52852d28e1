use std::path::{Path, PathBuf};

use tokio::fs;

#[derive(Clone, Debug)]
pub struct LocalFileStorage {
    base_dir: PathBuf,
}

impl LocalFileStorage {
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub async fn get(&self, key: &str) -> std::io::Result<Option<Vec<u8>>> {
        let path = self.resolve_path(key);
        match fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    pub async fn put(&self, key: &str, data: &[u8]) -> std::io::Result<()> {
        let path = self.resolve_path(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(path, data).await
    }

    /// Keys of the `.json` files directly under `dir`, newest name first.
    ///
    /// A missing directory is an empty listing.
    pub async fn list_json_keys_desc(&self, dir: &str) -> std::io::Result<Vec<String>> {
        let dir = dir.trim_matches('/');
        let dir_path = self.resolve_path(dir);
        let mut reader = match fs::read_dir(&dir_path).await {
            Ok(reader) => reader,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err),
        };
        let mut names = Vec::new();
        while let Some(entry) = reader.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|name| name.to_str()) {
                names.push(name.to_string());
            }
        }
        names.sort_by(|a, b| b.cmp(a));
        Ok(names
            .into_iter()
            .map(|name| format!("{dir}/{name}"))
            .collect())
    }

    pub fn resolve_path(&self, key: &str) -> PathBuf {
        let normalized = key.trim_start_matches('/');
        self.base_dir.join(Path::new(normalized))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_then_get_round_trips_and_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalFileStorage::new(dir.path().to_path_buf());

        storage.put("/a/b/c.json", b"{}").await.unwrap();
        assert_eq!(storage.get("a/b/c.json").await.unwrap(), Some(b"{}".to_vec()));
        assert_eq!(storage.get("a/b/missing.json").await.unwrap(), None);
    }

    #[tokio::test]
    async fn listing_skips_other_extensions_and_sorts_descending() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalFileStorage::new(dir.path().to_path_buf());
        storage.put("h/001.json", b"1").await.unwrap();
        storage.put("h/003.json", b"3").await.unwrap();
        storage.put("h/002.json", b"2").await.unwrap();
        storage.put("h/notes.txt", b"x").await.unwrap();

        let keys = storage.list_json_keys_desc("h").await.unwrap();
        assert_eq!(keys, vec!["h/003.json", "h/002.json", "h/001.json"]);
        assert!(storage.list_json_keys_desc("nope").await.unwrap().is_empty());
    }
}

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// YamlConnection owns the data directory and reads/writes YAML documents in it
#[derive(Debug, Clone)]
pub struct YamlConnection {
    base_directory: PathBuf,
}

impl YamlConnection {
    /// Create a connection, creating the directory if it doesn't exist
    pub fn new<P: AsRef<Path>>(base_directory: P) -> Result<Self> {
        let base_path = base_directory.as_ref().to_path_buf();

        if !base_path.exists() {
            fs::create_dir_all(&base_path)
                .with_context(|| format!("Failed to create data directory {:?}", base_path))?;
            info!("Created data directory: {:?}", base_path);
        }

        Ok(Self { base_directory: base_path })
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    pub fn path_for(&self, file_name: &str) -> PathBuf {
        self.base_directory.join(file_name)
    }

    /// Read a document; `None` when the file does not exist
    pub fn read<T: DeserializeOwned>(&self, file_name: &str) -> Result<Option<T>> {
        let path = self.path_for(file_name);
        if !path.exists() {
            return Ok(None);
        }

        let yaml_content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {:?}", path))?;
        let value = serde_yaml::from_str(&yaml_content)
            .with_context(|| format!("Failed to parse {:?}", path))?;
        debug!("Loaded {:?}", path);
        Ok(Some(value))
    }

    /// Write a document atomically: temp file first, then rename over the target
    pub fn write<T: Serialize>(&self, file_name: &str, value: &T) -> Result<()> {
        let path = self.path_for(file_name);
        let yaml_content = serde_yaml::to_string(value)?;

        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, yaml_content)
            .with_context(|| format!("Failed to write {:?}", temp_path))?;
        fs::rename(&temp_path, &path)
            .with_context(|| format!("Failed to replace {:?}", path))?;

        debug!("Saved {:?}", path);
        Ok(())
    }

    /// Delete a document; returns whether it existed
    pub fn remove(&self, file_name: &str) -> Result<bool> {
        let path = self.path_for(file_name);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path).with_context(|| format!("Failed to delete {:?}", path))?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_new_creates_missing_directory() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let nested = temp_dir.path().join("a").join("b");

        let connection = YamlConnection::new(&nested).expect("connection");
        assert!(nested.is_dir());
        assert_eq!(connection.base_directory(), nested.as_path());
    }

    #[test]
    fn test_write_read_remove() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let connection = YamlConnection::new(temp_dir.path()).expect("connection");

        assert_eq!(connection.read::<Vec<String>>("items.yaml").unwrap(), None);

        let items = vec!["one".to_string(), "two".to_string()];
        connection.write("items.yaml", &items).unwrap();
        assert_eq!(connection.read::<Vec<String>>("items.yaml").unwrap(), Some(items));
        assert!(!connection.path_for("items.tmp").exists());

        assert!(connection.remove("items.yaml").unwrap());
        assert!(!connection.remove("items.yaml").unwrap());
    }

    #[test]
    fn test_read_reports_corrupt_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let connection = YamlConnection::new(temp_dir.path()).expect("connection");
        fs::write(connection.path_for("items.yaml"), "- [unterminated").unwrap();

        assert!(connection.read::<Vec<String>>("items.yaml").is_err());
    }
}

use std::{fs, path::PathBuf};

/// Config file in the temp directory, removed on drop.
pub struct TempConfig {
    pub path: PathBuf,
}

impl TempConfig {
    pub fn new(contents: &str) -> Self {
        let path = missing_path();
        fs::write(&path, contents).unwrap();
        Self { path }
    }
}

impl Drop for TempConfig {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

/// Unique temp path that does not exist yet.
pub fn missing_path() -> PathBuf {
    std::env::temp_dir().join(format!("hue-cycler-{}.yml", uuid::Uuid::new_v4()))
}

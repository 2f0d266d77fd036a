use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub data_dir: PathBuf,
    pub upload_dir: PathBuf,
    pub index_dir: PathBuf,
    pub log_dir: PathBuf,
}

impl AppPaths {
    pub fn new() -> io::Result<Self> {
        Self::with_data_dir(discover_data_dir())
    }

    /// Lays out the fixed directories under `data_dir` and creates them.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> io::Result<Self> {
        let data_dir = data_dir.into();
        let paths = AppPaths {
            upload_dir: data_dir.join("uploaded_files"),
            index_dir: data_dir.join("vector_index"),
            log_dir: data_dir.join("logs"),
            data_dir,
        };

        for dir in [
            &paths.data_dir,
            &paths.upload_dir,
            &paths.index_dir,
            &paths.log_dir,
        ] {
            fs::create_dir_all(dir)?;
        }

        Ok(paths)
    }

    pub fn index_db_path(&self) -> PathBuf {
        self.index_dir.join("index.db")
    }

    pub fn default_config_path(&self) -> PathBuf {
        self.data_dir.join("config.yml")
    }

    pub fn upload_path(&self, file_name: &str) -> PathBuf {
        self.upload_dir.join(Path::new(file_name))
    }
}

fn discover_data_dir() -> PathBuf {
    if let Ok(dir) = env::var("DOCCHAT_DATA_DIR") {
        if !dir.trim().is_empty() {
            return PathBuf::from(dir);
        }
    }

    env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_fixed_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = AppPaths::with_data_dir(tmp.path()).unwrap();

        assert!(paths.upload_dir.is_dir());
        assert!(paths.index_dir.is_dir());
        assert!(paths.log_dir.is_dir());
        assert_eq!(paths.index_db_path(), tmp.path().join("vector_index/index.db"));
        assert_eq!(
            paths.upload_path("notes.txt"),
            tmp.path().join("uploaded_files/notes.txt")
        );
    }
}

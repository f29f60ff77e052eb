use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::IoError;

/// 关卡文本的读写边界。子系统只通过它接触文件系统。
pub trait LevelStore {
    fn load(&self, path: &Path) -> Result<String, IoError>;
    fn save(&self, path: &Path, text: &str) -> Result<(), IoError>;
    fn exists(&self, path: &Path) -> bool;
}

/// 直接读写本地文件系统，写入前自动创建父目录。
#[derive(Debug, Clone, Copy, Default)]
pub struct FsStore;

impl FsStore {
    pub fn new() -> Self {
        Self
    }
}

impl LevelStore for FsStore {
    fn load(&self, path: &Path) -> Result<String, IoError> {
        fs::read_to_string(path).map_err(|source| IoError::ReadError {
            path: path.to_path_buf(),
            source,
        })
    }

    fn save(&self, path: &Path, text: &str) -> Result<(), IoError> {
        let write_error = |source: io::Error| IoError::WriteError {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_error)?;
        }
        fs::write(path, text).map_err(write_error)
    }

    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}

/// 内存中的文件表，便于在不触碰磁盘的情况下驱动编解码流程。
#[derive(Debug, Default)]
pub struct MemoryStore {
    files: RefCell<HashMap<PathBuf, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(self, path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        self.files.borrow_mut().insert(path.into(), text.into());
        self
    }

    pub fn get(&self, path: impl AsRef<Path>) -> Option<String> {
        self.files.borrow().get(path.as_ref()).cloned()
    }
}

impl LevelStore for MemoryStore {
    fn load(&self, path: &Path) -> Result<String, IoError> {
        self.get(path).ok_or_else(|| IoError::ReadError {
            path: path.to_path_buf(),
            source: io::Error::new(io::ErrorKind::NotFound, "no such file in memory store"),
        })
    }

    fn save(&self, path: &Path, text: &str) -> Result<(), IoError> {
        self.files
            .borrow_mut()
            .insert(path.to_path_buf(), text.to_string());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.borrow().contains_key(path)
    }
}

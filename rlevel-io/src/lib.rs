use std::path::{Path, PathBuf};

use rlevel_core::document::LevelDocument;
use thiserror::Error;

pub mod assets;
pub mod diagnostics;
pub mod dialect;
pub mod export;
pub mod registry;
pub mod store;

pub use diagnostics::{Diagnostic, Diagnostics};
pub use dialect::client::encode_client;
pub use dialect::editor::{decode_editor, encode_editor};
pub use dialect::server::encode_server;
pub use registry::{NO_REFERENCE, ReverseRegistry, TypeRef, TypeRegistry};
pub use store::{FsStore, LevelStore, MemoryStore};

#[derive(Debug, Error)]
pub enum IoError {
    #[error("failed to read file {path:?}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write file {path:?}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode {dialect} level: {source}")]
    Encode {
        dialect: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid document structure: {0}")]
    InvalidDocument(String),
}

pub trait DocumentLoader {
    fn load(&self, path: &Path, diagnostics: &mut Diagnostics) -> Result<LevelDocument, IoError>;
}

pub trait DocumentSaver {
    fn save(
        &self,
        document: &LevelDocument,
        path: &Path,
        diagnostics: &mut Diagnostics,
    ) -> Result<(), IoError>;
}

/// 编辑器方言的读写入口：读取失败向上返回，内容损坏则降级为默认文档。
pub struct EditorFacade<S: LevelStore> {
    store: S,
}

impl EditorFacade<FsStore> {
    pub fn filesystem() -> Self {
        Self::new(FsStore::new())
    }
}

impl<S: LevelStore> EditorFacade<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S: LevelStore> DocumentLoader for EditorFacade<S> {
    fn load(&self, path: &Path, diagnostics: &mut Diagnostics) -> Result<LevelDocument, IoError> {
        let text = self.store.load(path)?;
        Ok(decode_editor(&text, &self.store, diagnostics))
    }
}

impl<S: LevelStore> DocumentSaver for EditorFacade<S> {
    fn save(
        &self,
        document: &LevelDocument,
        path: &Path,
        diagnostics: &mut Diagnostics,
    ) -> Result<(), IoError> {
        let text = encode_editor(document, &self.store, diagnostics)?;
        self.store.save(path, &text)
    }
}

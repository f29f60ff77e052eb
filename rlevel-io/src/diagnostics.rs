use std::path::PathBuf;

use thiserror::Error;
use tracing::warn;

use crate::registry::TypeRef;

/// 可恢复的问题：调用方获得回退结果，同时可以检查发生了什么。
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Diagnostic {
    #[error("type registry {path:?} unavailable: {reason}")]
    RegistryUnavailable { path: PathBuf, reason: String },
    #[error("duplicate reference {reference}: keeping '{kept}' over '{discarded}'")]
    DuplicateReference {
        reference: TypeRef,
        kept: String,
        discarded: String,
    },
    #[error("unknown entity type '{name}', using {fallback} as ref")]
    UnresolvedType { name: String, fallback: TypeRef },
    #[error("unknown reference {reference}, using '{placeholder}' as type")]
    UnresolvedReference {
        reference: TypeRef,
        placeholder: String,
    },
    #[error("invalid reference {raw}, using '{placeholder}' as type")]
    InvalidReference { raw: String, placeholder: String },
    #[error("malformed level document: {reason}")]
    MalformedDocument { reason: String },
    #[error("asset catalog {path:?} unavailable: {reason}")]
    AssetCatalogUnavailable { path: PathBuf, reason: String },
}

/// 收集一次调用过程中的诊断信息，每条都会同步写入日志。
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, diagnostic: Diagnostic) {
        match &diagnostic {
            Diagnostic::RegistryUnavailable { path, reason } => {
                warn!(path = %path.display(), reason = %reason, "无法读取类型注册表，引用解析将降级");
            }
            Diagnostic::DuplicateReference {
                reference,
                kept,
                discarded,
            } => {
                warn!(reference, kept = %kept, discarded = %discarded, "类型引用重复，保留字典序靠后的名称");
            }
            Diagnostic::UnresolvedType { name, fallback } => {
                warn!(name = %name, fallback, "未知实体类型，使用回退引用");
            }
            Diagnostic::UnresolvedReference {
                reference,
                placeholder,
            } => {
                warn!(reference, placeholder = %placeholder, "未知类型引用，使用占位类型名");
            }
            Diagnostic::InvalidReference { raw, placeholder } => {
                warn!(raw = %raw, placeholder = %placeholder, "类型引用不是有效整数，使用占位类型名");
            }
            Diagnostic::MalformedDocument { reason } => {
                warn!(reason = %reason, "关卡文件解析失败，使用默认文档");
            }
            Diagnostic::AssetCatalogUnavailable { path, reason } => {
                warn!(path = %path.display(), reason = %reason, "无法读取资源目录");
            }
        }
        self.entries.push(diagnostic);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}

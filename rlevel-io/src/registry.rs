use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::store::LevelStore;

/// 外部游戏配置分配的类型引用编号，本子系统只查询、不生成。
pub type TypeRef = i32;

/// 表示“没有可用引用”的哨兵值。
pub const NO_REFERENCE: TypeRef = -1;

#[derive(Debug, Deserialize)]
struct RegistrySource {
    #[serde(default)]
    entities: Value,
}

#[derive(Debug, Deserialize)]
struct EntityDecl {
    #[serde(rename = "type", default)]
    type_section: Option<TypeSection>,
}

#[derive(Debug, Deserialize)]
struct TypeSection {
    #[serde(rename = "ref", default)]
    reference: Option<TypeRef>,
}

/// 正向映射：类型名 -> 引用编号。
///
/// 每次调用 [`TypeRegistry::load`] 都会重新读取来源文件，不做任何缓存，
/// 因此编辑期间手动修改的游戏配置会立即生效。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypeRegistry {
    by_name: HashMap<String, TypeRef>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 读取并解析游戏配置中的 `entities.<name>.type.ref`。
    /// 来源缺失或格式错误时返回空映射并记录诊断，从不失败。
    pub fn load(store: &dyn LevelStore, path: &Path, diagnostics: &mut Diagnostics) -> Self {
        let text = match store.load(path) {
            Ok(text) => text,
            Err(err) => {
                diagnostics.report(Diagnostic::RegistryUnavailable {
                    path: path.to_path_buf(),
                    reason: err.to_string(),
                });
                return Self::new();
            }
        };
        match Self::from_source(&text) {
            Ok(registry) => {
                debug!(path = %path.display(), count = registry.len(), "已加载类型注册表");
                registry
            }
            Err(err) => {
                diagnostics.report(Diagnostic::RegistryUnavailable {
                    path: path.to_path_buf(),
                    reason: err.to_string(),
                });
                Self::new()
            }
        }
    }

    /// 从配置文本构建映射。没有 `type.ref` 或值为 -1 的实体不参与映射。
    pub fn from_source(text: &str) -> Result<Self, serde_json::Error> {
        let source: RegistrySource = serde_json::from_str(text)?;
        let mut registry = Self::new();
        let Some(entities) = source.entities.as_object() else {
            return Ok(registry);
        };
        for (name, decl) in entities {
            let reference = match EntityDecl::deserialize(decl) {
                Ok(decl) => decl.type_section.and_then(|section| section.reference),
                Err(err) => {
                    debug!(name = %name, error = %err, "跳过无法识别的实体声明");
                    None
                }
            };
            if let Some(reference) = reference.filter(|r| *r != NO_REFERENCE) {
                registry.insert(name.clone(), reference);
            }
        }
        Ok(registry)
    }

    pub fn insert(&mut self, name: impl Into<String>, reference: TypeRef) {
        self.by_name.insert(name.into(), reference);
    }

    pub fn resolve(&self, name: &str) -> Option<TypeRef> {
        self.by_name.get(name).copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// 按名称升序返回所有条目。
    pub fn sorted_entries(&self) -> Vec<(&str, TypeRef)> {
        let mut ordered: Vec<(&str, TypeRef)> = self
            .by_name
            .iter()
            .map(|(name, reference)| (name.as_str(), *reference))
            .collect();
        ordered.sort_by(|a, b| a.0.cmp(b.0));
        ordered
    }

    /// 构建反向映射。多个名称共享同一引用时，按名称升序依次插入并覆盖，
    /// 最终保留字典序最大的名称；每次覆盖都会记录一条诊断。
    pub fn invert(&self, diagnostics: &mut Diagnostics) -> ReverseRegistry {
        let mut by_ref: BTreeMap<TypeRef, String> = BTreeMap::new();
        for (name, reference) in self.sorted_entries() {
            if let Some(discarded) = by_ref.insert(reference, name.to_string()) {
                diagnostics.report(Diagnostic::DuplicateReference {
                    reference,
                    kept: name.to_string(),
                    discarded,
                });
            }
        }
        ReverseRegistry { by_ref }
    }
}

impl<N: Into<String>> FromIterator<(N, TypeRef)> for TypeRegistry {
    fn from_iter<I: IntoIterator<Item = (N, TypeRef)>>(iter: I) -> Self {
        let mut registry = Self::new();
        for (name, reference) in iter {
            registry.insert(name, reference);
        }
        registry
    }
}

/// 反向映射：引用编号 -> 类型名。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReverseRegistry {
    by_ref: BTreeMap<TypeRef, String>,
}

impl ReverseRegistry {
    pub fn resolve(&self, reference: TypeRef) -> Option<&str> {
        self.by_ref.get(&reference).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (TypeRef, &str)> {
        self.by_ref
            .iter()
            .map(|(reference, name)| (*reference, name.as_str()))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.by_ref.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.by_ref.is_empty()
    }
}

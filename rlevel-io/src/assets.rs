use std::path::{Path, PathBuf};

use rlevel_core::document::{AssetInfo, AssetRegistry};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::store::LevelStore;

#[derive(Debug, Deserialize)]
struct ClientSource {
    #[serde(default)]
    sprites: Map<String, Value>,
    #[serde(default)]
    entities: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct RenderDecl {
    render: Option<RenderSection>,
}

#[derive(Debug, Deserialize)]
struct RenderSection {
    rect: Option<RectSection>,
}

#[derive(Debug, Deserialize)]
struct RectSection {
    w: Option<i32>,
    h: Option<i32>,
}

/// 从客户端配置读取资源目录：`sprites` 提供贴图路径，
/// `entities.<key>.render.rect` 覆盖已登记资源的宽高。
pub fn load_asset_catalog(
    store: &dyn LevelStore,
    path: &Path,
    diagnostics: &mut Diagnostics,
) -> AssetRegistry {
    let parsed = store
        .load(path)
        .map_err(|err| err.to_string())
        .and_then(|text| {
            serde_json::from_str::<ClientSource>(&text).map_err(|err| err.to_string())
        });
    let source = match parsed {
        Ok(source) => source,
        Err(reason) => {
            diagnostics.report(Diagnostic::AssetCatalogUnavailable {
                path: path.to_path_buf(),
                reason,
            });
            return AssetRegistry::new();
        }
    };

    let mut registry = AssetRegistry::new();
    for (key, sprite) in &source.sprites {
        match sprite.as_str() {
            Some(sprite_path) => {
                registry.insert(key.clone(), AssetInfo::new(sprite_path));
            }
            None => debug!(key = %key, "贴图路径不是字符串，已跳过"),
        }
    }

    for (key, decl) in &source.entities {
        let Some(info) = registry.get_mut(key) else {
            continue;
        };
        let rect = RenderDecl::deserialize(decl)
            .ok()
            .and_then(|decl| decl.render)
            .and_then(|render| render.rect);
        if let Some(rect) = rect {
            if let Some(width) = rect.w {
                info.width = width;
            }
            if let Some(height) = rect.h {
                info.height = height;
            }
        }
    }

    info!(path = %path.display(), count = registry.len(), "已加载资源目录");
    registry
}

/// 依次尝试候选路径，使用第一个存在的客户端配置。
pub fn discover_asset_catalog(
    store: &dyn LevelStore,
    candidates: &[PathBuf],
    diagnostics: &mut Diagnostics,
) -> Option<(PathBuf, AssetRegistry)> {
    let path = candidates.iter().find(|path| store.exists(path))?;
    let registry = load_asset_catalog(store, path, diagnostics);
    Some((path.clone(), registry))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn rect_overrides_only_known_sprites() {
        let store = MemoryStore::new().with_file(
            "client.json",
            r#"{
                "sprites": { "ENEMY": "sprites/enemy.png", "PLAYER": "sprites/player.png", "BAD": 3 },
                "entities": {
                    "ENEMY": { "render": { "rect": { "w": 48, "h": 24 } } },
                    "PLAYER": { "render": { "rect": { "h": 40 } } },
                    "BOSS": { "render": { "rect": { "w": 128, "h": 128 } } }
                }
            }"#,
        );
        let mut diagnostics = Diagnostics::new();
        let registry = load_asset_catalog(&store, Path::new("client.json"), &mut diagnostics);

        assert!(diagnostics.is_empty());
        assert_eq!(registry.len(), 2);
        let enemy = &registry["ENEMY"];
        assert_eq!(enemy.sprite_path, "sprites/enemy.png");
        assert_eq!((enemy.width, enemy.height), (48, 24));
        let player = &registry["PLAYER"];
        assert_eq!((player.width, player.height), (32, 40));
        assert!(!registry.contains_key("BOSS"));
    }

    #[test]
    fn missing_catalog_is_reported() {
        let store = MemoryStore::new();
        let mut diagnostics = Diagnostics::new();
        let registry = load_asset_catalog(&store, Path::new("nope.json"), &mut diagnostics);
        assert!(registry.is_empty());
        assert!(matches!(
            diagnostics.iter().next(),
            Some(Diagnostic::AssetCatalogUnavailable { .. })
        ));
    }

    #[test]
    fn discover_picks_first_existing_candidate() {
        let store = MemoryStore::new()
            .with_file("b/client.json", r#"{ "sprites": { "A": "a.png" } }"#)
            .with_file("c/client.json", r#"{ "sprites": {} }"#);
        let candidates = vec![
            PathBuf::from("a/client.json"),
            PathBuf::from("b/client.json"),
            PathBuf::from("c/client.json"),
        ];
        let mut diagnostics = Diagnostics::new();
        let (path, registry) =
            discover_asset_catalog(&store, &candidates, &mut diagnostics).unwrap();
        assert_eq!(path, PathBuf::from("b/client.json"));
        assert!(registry.contains_key("A"));
    }
}

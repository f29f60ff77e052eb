use std::path::Path;

use rlevel_core::document::LevelDocument;
use serde::Serialize;
use serde_json::Value;

use crate::IoError;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::dialect::to_pretty_json;
use crate::registry::{NO_REFERENCE, TypeRef, TypeRegistry};
use crate::store::LevelStore;

/// 服务端启用的玩法系统，顺序即执行顺序，与地图内容无关。
pub const SERVER_SYSTEMS: [&str; 7] = [
    "ScrollSystem",
    "WaveSystem",
    "AISystem",
    "MovementSystem",
    "HitboxSystem",
    "WeaponSystem",
    "CleanupSystem",
];

#[derive(Debug, Serialize)]
struct ServerLevel<'a> {
    game: String,
    systems: &'a [&'a str],
    spawn_points: Vec<Value>,
    startup: Vec<Value>,
    level_data: Vec<LevelDataEntry>,
}

#[derive(Debug, Serialize)]
struct LevelDataEntry {
    #[serde(rename = "ref")]
    reference: TypeRef,
    position: Position,
}

#[derive(Debug, Serialize)]
struct Position {
    x: f32,
    y: f32,
}

/// 编码为服务端方言。引用按 `server_config` 解析，解析失败写入 -1，
/// 实体本身仍然保留，保证位置信息完整。
pub fn encode_server(
    document: &LevelDocument,
    server_config: &Path,
    store: &dyn LevelStore,
    diagnostics: &mut Diagnostics,
) -> Result<String, IoError> {
    let registry = TypeRegistry::load(store, server_config, diagnostics);

    let level_data = document
        .entities()
        .map(|entity| {
            let reference = registry.resolve(&entity.kind).unwrap_or_else(|| {
                diagnostics.report(Diagnostic::UnresolvedType {
                    name: entity.kind.clone(),
                    fallback: NO_REFERENCE,
                });
                NO_REFERENCE
            });
            LevelDataEntry {
                reference,
                position: Position {
                    x: entity.position.x(),
                    y: entity.position.y(),
                },
            }
        })
        .collect();

    let level = ServerLevel {
        game: server_config.to_string_lossy().into_owned(),
        systems: &SERVER_SYSTEMS,
        spawn_points: Vec::new(),
        startup: Vec::new(),
        level_data,
    };
    to_pretty_json("server", &level)
}

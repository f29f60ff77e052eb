use std::collections::BTreeMap;
use std::path::Path;

use rlevel_core::document::LevelDocument;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::IoError;
use crate::dialect::to_pretty_json;

/// 客户端渲染管线系统，顺序即执行顺序。
pub const CLIENT_SYSTEMS: [&str; 14] = [
    "GameInteractionSystem",
    "ScrollSystem",
    "MovementSystem",
    "HitboxSystem",
    "ClearScreenSystem",
    "DrawingStartSystem",
    "BackgroundRenderingSystem",
    "CameraStartSystem",
    "HitboxRenderingSystem",
    "RectRenderingSystem",
    "SpriteRenderingSystem",
    "TextRenderingSystem",
    "CameraEndSystem",
    "DrawingEndSystem",
];

#[derive(Debug, Serialize)]
struct ClientLevel<'a> {
    game: String,
    systems: &'a [&'a str],
    sprites: BTreeMap<String, String>,
    startup: Vec<Value>,
}

/// 编码为客户端方言。只包含引导元数据：实体与坐标由服务端在运行时下发。
pub fn encode_client(document: &LevelDocument, client_config: &Path) -> Result<String, IoError> {
    debug!(
        map_id = document.id,
        omitted = document.entity_count(),
        "客户端关卡不写出实体"
    );
    let level = ClientLevel {
        game: client_config.to_string_lossy().into_owned(),
        systems: &CLIENT_SYSTEMS,
        sprites: BTreeMap::new(),
        startup: Vec::new(),
    };
    to_pretty_json("client", &level)
}

use std::path::Path;

use rlevel_core::document::{
    DEFAULT_HEIGHT, DEFAULT_MAP_ID, DEFAULT_SCROLL_SPEED, DEFAULT_WIDTH, EntityId, LevelDocument,
    MIN_BACKGROUND_REPEAT, PlacedEntity,
};
use rlevel_core::geometry::Point2;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::IoError;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::dialect::{lenient, to_pretty_json};
use crate::registry::{NO_REFERENCE, ReverseRegistry, TypeRef, TypeRegistry};
use crate::store::LevelStore;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MapMeta {
    id: i32,
    scroll_speed: f32,
    width: i32,
    height: i32,
    background_name: String,
    background_repeat_count: i32,
}

impl MapMeta {
    fn from_document(document: &LevelDocument) -> Self {
        Self {
            id: document.id,
            scroll_speed: document.scroll_speed,
            width: document.width,
            height: document.height,
            background_name: document.background_name.clone(),
            background_repeat_count: document.background_repeat_count,
        }
    }
}

#[derive(Debug, Serialize)]
struct EditorLevelOut<'a> {
    game: &'a str,
    map: MapMeta,
    waves: Vec<WaveOut<'a>>,
}

#[derive(Debug, Serialize)]
struct WaveOut<'a> {
    x: f32,
    y: f32,
    name: &'a str,
    #[serde(rename = "ref")]
    reference: TypeRef,
}

// 读取侧每个字段独立容错：缺失或类型不符只让该字段回退默认值。

#[derive(Debug, Deserialize)]
struct EditorLevelIn {
    #[serde(default, deserialize_with = "lenient::string_field")]
    game: Option<String>,
    #[serde(default, deserialize_with = "lenient::object_field")]
    map: Option<MapMetaIn>,
    #[serde(default, deserialize_with = "lenient::i32_field")]
    width: Option<i32>,
    #[serde(default, deserialize_with = "lenient::i32_field")]
    height: Option<i32>,
    #[serde(default, deserialize_with = "lenient::records_field")]
    waves: Option<Vec<WaveIn>>,
    #[serde(default, deserialize_with = "lenient::records_field")]
    entities: Option<Vec<LegacyEntityIn>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MapMetaIn {
    #[serde(default, deserialize_with = "lenient::i32_field")]
    id: Option<i32>,
    #[serde(default, deserialize_with = "lenient::f32_field")]
    scroll_speed: Option<f32>,
    #[serde(default, deserialize_with = "lenient::i32_field")]
    width: Option<i32>,
    #[serde(default, deserialize_with = "lenient::i32_field")]
    height: Option<i32>,
    #[serde(default, deserialize_with = "lenient::string_field")]
    background_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::i32_field")]
    background_repeat_count: Option<i32>,
}

impl MapMetaIn {
    fn apply_to(self, document: &mut LevelDocument) {
        document.id = self.id.unwrap_or(DEFAULT_MAP_ID);
        document.scroll_speed = self.scroll_speed.unwrap_or(DEFAULT_SCROLL_SPEED);
        document.width = self.width.unwrap_or(DEFAULT_WIDTH);
        document.height = self.height.unwrap_or(DEFAULT_HEIGHT);
        document.background_name = self.background_name.unwrap_or_default();
        document.background_repeat_count =
            self.background_repeat_count.unwrap_or(MIN_BACKGROUND_REPEAT);
    }
}

#[derive(Debug, Deserialize)]
struct WaveIn {
    #[serde(default, deserialize_with = "lenient::f32_field")]
    x: Option<f32>,
    #[serde(default, deserialize_with = "lenient::f32_field")]
    y: Option<f32>,
    #[serde(default, deserialize_with = "lenient::string_field")]
    name: Option<String>,
    // 仅在缺少 name 时才解释为整数引用。
    #[serde(rename = "ref", default, deserialize_with = "lenient::raw_field")]
    reference: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct LegacyEntityIn {
    #[serde(default, deserialize_with = "lenient::i32_field")]
    id: Option<i32>,
    #[serde(rename = "type", default, deserialize_with = "lenient::string_field")]
    kind: Option<String>,
    #[serde(default, deserialize_with = "lenient::f32_field")]
    x: Option<f32>,
    #[serde(default, deserialize_with = "lenient::f32_field")]
    y: Option<f32>,
}

/// 引用无法解析时使用的占位类型名，保留原始编号便于排查。
pub fn placeholder_type(reference: TypeRef) -> String {
    format!("UNKNOWN_{reference}")
}

/// 编码为编辑器方言。`name` 始终写出并作为解码时的权威类型，
/// `ref` 仅供参考：类型无法解析时回退为实体本地编号。
pub fn encode_editor(
    document: &LevelDocument,
    store: &dyn LevelStore,
    diagnostics: &mut Diagnostics,
) -> Result<String, IoError> {
    let game = document.effective_game_config();
    let registry = TypeRegistry::load(store, Path::new(game), diagnostics);

    let waves = document
        .entities()
        .map(|entity| {
            let reference = registry.resolve(&entity.kind).unwrap_or_else(|| {
                let fallback = entity.id.get();
                diagnostics.report(Diagnostic::UnresolvedType {
                    name: entity.kind.clone(),
                    fallback,
                });
                fallback
            });
            WaveOut {
                x: entity.position.x(),
                y: entity.position.y(),
                name: &entity.kind,
                reference,
            }
        })
        .collect();

    let level = EditorLevelOut {
        game,
        map: MapMeta::from_document(document),
        waves,
    };
    to_pretty_json("editor", &level)
}

/// 解码编辑器方言，兼容 `waves` 与旧版 `entities` 两种形态。
/// 顶层不是合法 JSON 对象时返回默认文档并记录诊断，从不向外传播错误；
/// 单个字段类型不符只回退该字段。
pub fn decode_editor(
    text: &str,
    store: &dyn LevelStore,
    diagnostics: &mut Diagnostics,
) -> LevelDocument {
    let level: EditorLevelIn = match serde_json::from_str(text) {
        Ok(level) => level,
        Err(err) => {
            diagnostics.report(Diagnostic::MalformedDocument {
                reason: err.to_string(),
            });
            return LevelDocument::default();
        }
    };

    let mut document = LevelDocument::default();
    if let Some(game) = level.game {
        document.game_config_path = game;
    }

    match level.map {
        Some(meta) => meta.apply_to(&mut document),
        None => {
            if let Some(width) = level.width {
                document.width = width;
            }
            if let Some(height) = level.height {
                document.height = height;
            }
        }
    }

    if let Some(waves) = level.waves {
        decode_waves(waves, &mut document, store, diagnostics);
    } else if let Some(entities) = level.entities {
        for entity in entities {
            document.push_entity(PlacedEntity::new(
                EntityId::new(entity.id.unwrap_or_default()),
                entity.kind.unwrap_or_default(),
                Point2::new(entity.x.unwrap_or_default(), entity.y.unwrap_or_default()),
            ));
        }
    }

    debug!(
        map_id = document.id,
        entities = document.entity_count(),
        "已解码编辑器关卡"
    );
    document
}

fn decode_waves(
    waves: Vec<WaveIn>,
    document: &mut LevelDocument,
    store: &dyn LevelStore,
    diagnostics: &mut Diagnostics,
) {
    // 只有缺少 name 的记录才需要反向映射，按需加载一次。
    let mut reverse: Option<ReverseRegistry> = None;
    let game = document.effective_game_config().to_string();

    for (index, wave) in waves.into_iter().enumerate() {
        let kind = match wave.name {
            Some(name) => name,
            None => match reference_of(wave.reference.as_ref()) {
                Ok(reference) => {
                    let reverse = reverse.get_or_insert_with(|| {
                        TypeRegistry::load(store, Path::new(&game), diagnostics).invert(diagnostics)
                    });
                    match reverse.resolve(reference) {
                        Some(name) => name.to_string(),
                        None => {
                            let placeholder = placeholder_type(reference);
                            diagnostics.report(Diagnostic::UnresolvedReference {
                                reference,
                                placeholder: placeholder.clone(),
                            });
                            placeholder
                        }
                    }
                }
                Err(raw) => {
                    let placeholder = format!("UNKNOWN_{raw}");
                    diagnostics.report(Diagnostic::InvalidReference {
                        raw,
                        placeholder: placeholder.clone(),
                    });
                    placeholder
                }
            },
        };
        let id = i32::try_from(index).unwrap_or(i32::MAX);
        document.push_entity(PlacedEntity::new(
            EntityId::new(id),
            kind,
            Point2::new(wave.x.unwrap_or_default(), wave.y.unwrap_or_default()),
        ));
    }
}

/// 缺失或为 null 的引用视为 `NO_REFERENCE`；其余无法转换为整数的值原样返回。
fn reference_of(raw: Option<&Value>) -> Result<TypeRef, String> {
    match raw {
        None | Some(Value::Null) => Ok(NO_REFERENCE),
        Some(Value::String(text)) => Err(text.clone()),
        Some(value) => lenient::value_to_i32(value).ok_or_else(|| value.to_string()),
    }
}

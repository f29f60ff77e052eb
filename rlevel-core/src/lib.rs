pub mod geometry {
    use glam::Vec2;

    /// 关卡画布上的二维坐标，内部以 `glam::Vec2` 表示，与运行时的单精度坐标一致。
    #[derive(Debug, Clone, Copy, PartialEq, Default)]
    pub struct Point2(pub Vec2);

    impl Point2 {
        #[inline]
        pub fn new(x: f32, y: f32) -> Self {
            Self(Vec2::new(x, y))
        }

        #[inline]
        pub fn from_vec(vec: Vec2) -> Self {
            Self(vec)
        }

        #[inline]
        pub fn x(self) -> f32 {
            self.0.x
        }

        #[inline]
        pub fn y(self) -> f32 {
            self.0.y
        }

        #[inline]
        pub fn as_vec2(self) -> Vec2 {
            self.0
        }
    }

    /// 轴对齐边界框，用于估算已放置实体的分布范围。
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct Bounds2D {
        min: Point2,
        max: Point2,
    }

    impl Bounds2D {
        #[inline]
        pub fn empty() -> Self {
            Self {
                min: Point2::new(f32::INFINITY, f32::INFINITY),
                max: Point2::new(f32::NEG_INFINITY, f32::NEG_INFINITY),
            }
        }

        #[inline]
        pub fn is_empty(&self) -> bool {
            self.min.x() > self.max.x() || self.min.y() > self.max.y()
        }

        #[inline]
        pub fn min(&self) -> Point2 {
            self.min
        }

        #[inline]
        pub fn max(&self) -> Point2 {
            self.max
        }

        pub fn include_point(&mut self, point: Point2) {
            if self.is_empty() {
                self.min = point;
                self.max = point;
                return;
            }
            self.min = Point2::from_vec(self.min.as_vec2().min(point.as_vec2()));
            self.max = Point2::from_vec(self.max.as_vec2().max(point.as_vec2()));
        }
    }
}

pub mod document {
    use std::collections::BTreeMap;
    use std::fmt;

    use thiserror::Error;

    use crate::geometry::{Bounds2D, Point2};

    pub const DEFAULT_GAME_CONFIG: &str = "./assets/configs/rtype.json";
    pub const DEFAULT_MAP_ID: i32 = 1;
    pub const DEFAULT_SCROLL_SPEED: f32 = 2.0;
    pub const DEFAULT_WIDTH: i32 = 800;
    pub const DEFAULT_HEIGHT: i32 = 600;
    pub const DEFAULT_ASSET_SIZE: i32 = 32;
    pub const MIN_BACKGROUND_REPEAT: i32 = 1;
    pub const MAX_BACKGROUND_REPEAT: i32 = 10;

    #[derive(Debug, Error, PartialEq, Eq)]
    pub enum DocumentError {
        #[error("entity with id {0} not found")]
        EntityNotFound(i32),
    }

    /// 实体在单个编辑会话内的本地编号，不参与运行时引用解析。
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct EntityId(i32);

    impl EntityId {
        #[inline]
        pub fn new(raw: i32) -> Self {
            Self(raw)
        }

        /// 提供原始数值，便于序列化或日志输出。
        #[inline]
        pub fn get(self) -> i32 {
            self.0
        }
    }

    impl fmt::Display for EntityId {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}", self.0)
        }
    }

    /// 画布上放置的一个实体。`kind` 为权威类型名，引用编号在序列化时才解析。
    #[derive(Debug, Clone, PartialEq)]
    pub struct PlacedEntity {
        pub id: EntityId,
        pub kind: String,
        pub position: Point2,
    }

    impl PlacedEntity {
        pub fn new(id: EntityId, kind: impl Into<String>, position: Point2) -> Self {
            Self {
                id,
                kind: kind.into(),
                position,
            }
        }
    }

    /// 资源描述信息，仅用于编辑器展示与命中测试。
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct AssetInfo {
        pub sprite_path: String,
        pub width: i32,
        pub height: i32,
    }

    impl AssetInfo {
        pub fn new(sprite_path: impl Into<String>) -> Self {
            Self {
                sprite_path: sprite_path.into(),
                width: DEFAULT_ASSET_SIZE,
                height: DEFAULT_ASSET_SIZE,
            }
        }

        #[inline]
        pub fn hit_size(&self) -> i32 {
            self.width.max(self.height)
        }
    }

    impl Default for AssetInfo {
        fn default() -> Self {
            Self::new(String::new())
        }
    }

    pub type AssetRegistry = BTreeMap<String, AssetInfo>;

    /// 关卡文档：编辑会话与各序列化方言之间共享的内存模型。
    #[derive(Debug, Clone, PartialEq)]
    pub struct LevelDocument {
        pub id: i32,
        pub scroll_speed: f32,
        pub width: i32,
        pub height: i32,
        pub background_name: String,
        pub background_repeat_count: i32,
        pub game_config_path: String,
        pub assets: AssetRegistry,
        entities: Vec<PlacedEntity>,
    }

    impl Default for LevelDocument {
        fn default() -> Self {
            Self {
                id: DEFAULT_MAP_ID,
                scroll_speed: DEFAULT_SCROLL_SPEED,
                width: DEFAULT_WIDTH,
                height: DEFAULT_HEIGHT,
                background_name: String::new(),
                background_repeat_count: MIN_BACKGROUND_REPEAT,
                game_config_path: DEFAULT_GAME_CONFIG.to_string(),
                assets: AssetRegistry::new(),
                entities: Vec::new(),
            }
        }
    }

    impl LevelDocument {
        pub fn new() -> Self {
            Self::default()
        }

        /// 按绘制顺序遍历实体，越靠后越处于上层。
        pub fn entities(&self) -> impl Iterator<Item = &PlacedEntity> {
            self.entities.iter()
        }

        #[inline]
        pub fn entity_count(&self) -> usize {
            self.entities.len()
        }

        pub fn entity(&self, id: EntityId) -> Option<&PlacedEntity> {
            self.entities.iter().find(|entity| entity.id == id)
        }

        /// 原样追加实体，不检查编号唯一性。供解码器还原文件内容使用。
        pub fn push_entity(&mut self, entity: PlacedEntity) {
            self.entities.push(entity);
        }

        /// 下一个可用编号：现有最大编号加一，空文档从 0 开始。
        pub fn next_id(&self) -> EntityId {
            let next = self
                .entities
                .iter()
                .map(|entity| entity.id.get().saturating_add(1))
                .max()
                .unwrap_or(0)
                .max(0);
            EntityId::new(next)
        }

        /// 在画布上放置新实体并返回其编号。
        pub fn place(&mut self, kind: impl Into<String>, position: Point2) -> EntityId {
            let id = self.next_id();
            self.entities.push(PlacedEntity::new(id, kind, position));
            id
        }

        pub fn move_entity(&mut self, id: EntityId, position: Point2) -> Result<(), DocumentError> {
            let entity = self
                .entities
                .iter_mut()
                .find(|entity| entity.id == id)
                .ok_or(DocumentError::EntityNotFound(id.get()))?;
            entity.position = position;
            Ok(())
        }

        pub fn remove_entity(&mut self, id: EntityId) -> Result<PlacedEntity, DocumentError> {
            let index = self
                .entities
                .iter()
                .position(|entity| entity.id == id)
                .ok_or(DocumentError::EntityNotFound(id.get()))?;
            Ok(self.entities.remove(index))
        }

        /// 命中测试：自顶向下查找包含该点的实体。
        /// 命中框为以实体为中心的正方形，边长取资源宽高的较大者，缺省 32。
        pub fn entity_at(&self, point: Point2) -> Option<EntityId> {
            self.entities.iter().rev().find_map(|entity| {
                let size = self
                    .assets
                    .get(&entity.kind)
                    .map(AssetInfo::hit_size)
                    .unwrap_or(DEFAULT_ASSET_SIZE);
                let left = entity.position.x() - (size / 2) as f32;
                let top = entity.position.y() - (size / 2) as f32;
                let size = size as f32;
                let inside = point.x() >= left
                    && point.x() < left + size
                    && point.y() >= top
                    && point.y() < top + size;
                inside.then_some(entity.id)
            })
        }

        /// 所有实体坐标的包围盒，空文档返回 `None`。
        pub fn bounds(&self) -> Option<Bounds2D> {
            let mut bounds = Bounds2D::empty();
            for entity in &self.entities {
                bounds.include_point(entity.position);
            }
            (!bounds.is_empty()).then_some(bounds)
        }

        /// 解析引用时使用的游戏配置路径，空串回退到默认值。
        pub fn effective_game_config(&self) -> &str {
            if self.game_config_path.is_empty() {
                DEFAULT_GAME_CONFIG
            } else {
                &self.game_config_path
            }
        }

        pub fn set_background(&mut self, name: impl Into<String>) {
            self.background_name = name.into();
        }

        /// 背景重复次数限制在 1..=10。
        pub fn set_background_repeat_count(&mut self, count: i32) {
            self.background_repeat_count = count.clamp(MIN_BACKGROUND_REPEAT, MAX_BACKGROUND_REPEAT);
        }

        /// 根据 `background_<n>.<ext>` 形式的背景文件名推导地图编号。
        /// 背景为空时保持原编号；无法解析时回退到 1。
        pub fn derive_id_from_background(&mut self) -> i32 {
            if self.background_name.is_empty() {
                return self.id;
            }
            self.id = background_number(&self.background_name).unwrap_or(DEFAULT_MAP_ID);
            self.id
        }
    }

    fn background_number(name: &str) -> Option<i32> {
        let underscore = name.find('_')?;
        let dot = name.find('.')?;
        if underscore >= dot {
            return None;
        }
        leading_integer(&name[underscore + 1..dot])
    }

    fn leading_integer(text: &str) -> Option<i32> {
        let text = text.trim_start();
        let (negative, digits) = match text.as_bytes().first() {
            Some(b'-') => (true, &text[1..]),
            Some(b'+') => (false, &text[1..]),
            _ => (false, text),
        };
        let end = digits
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(digits.len());
        if end == 0 {
            return None;
        }
        let magnitude: i64 = digits[..end].parse().ok()?;
        let value = if negative { -magnitude } else { magnitude };
        i32::try_from(value).ok()
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn defaults_match_editor_canvas() {
            let doc = LevelDocument::new();
            assert_eq!(doc.id, 1);
            assert_eq!(doc.scroll_speed, 2.0);
            assert_eq!((doc.width, doc.height), (800, 600));
            assert!(doc.background_name.is_empty());
            assert_eq!(doc.background_repeat_count, 1);
            assert_eq!(doc.game_config_path, "./assets/configs/rtype.json");
            assert_eq!(doc.entity_count(), 0);
        }

        #[test]
        fn place_assigns_ids_after_highest_existing() {
            let mut doc = LevelDocument::new();
            doc.push_entity(PlacedEntity::new(EntityId::new(7), "WALL", Point2::new(0.0, 0.0)));
            let first = doc.place("ENEMY", Point2::new(10.0, 20.0));
            let second = doc.place("ENEMY", Point2::new(30.0, 20.0));
            assert_eq!(first.get(), 8);
            assert_eq!(second.get(), 9);

            let empty = LevelDocument::new();
            assert_eq!(empty.next_id().get(), 0);
        }

        #[test]
        fn move_and_remove_report_missing_entities() {
            let mut doc = LevelDocument::new();
            let id = doc.place("ENEMY", Point2::new(1.0, 2.0));
            doc.move_entity(id, Point2::new(5.0, 6.0)).unwrap();
            assert_eq!(doc.entity(id).unwrap().position, Point2::new(5.0, 6.0));

            let removed = doc.remove_entity(id).unwrap();
            assert_eq!(removed.kind, "ENEMY");
            assert_eq!(
                doc.remove_entity(id),
                Err(DocumentError::EntityNotFound(id.get()))
            );
            assert_eq!(
                doc.move_entity(EntityId::new(42), Point2::new(0.0, 0.0)),
                Err(DocumentError::EntityNotFound(42))
            );
        }

        #[test]
        fn entity_at_prefers_topmost_and_uses_asset_size() {
            let mut doc = LevelDocument::new();
            let bottom = doc.place("BIG", Point2::new(100.0, 100.0));
            let top = doc.place("SMALL", Point2::new(110.0, 100.0));
            doc.assets.insert(
                "BIG".to_string(),
                AssetInfo {
                    sprite_path: "big.png".to_string(),
                    width: 64,
                    height: 16,
                },
            );

            assert_eq!(doc.entity_at(Point2::new(110.0, 100.0)), Some(top));
            // SMALL 默认 32：覆盖 [94, 126)，BIG 为 64：覆盖 [68, 132)。
            assert_eq!(doc.entity_at(Point2::new(70.0, 100.0)), Some(bottom));
            assert_eq!(doc.entity_at(Point2::new(132.0, 100.0)), None);
            assert_eq!(doc.entity_at(Point2::new(126.0, 84.0)), Some(bottom));
        }

        #[test]
        fn background_number_drives_map_id() {
            let mut doc = LevelDocument::new();
            doc.set_background("background_3.png");
            assert_eq!(doc.derive_id_from_background(), 3);

            doc.set_background("background_12abc.png");
            assert_eq!(doc.derive_id_from_background(), 12);

            doc.set_background("background_x.png");
            assert_eq!(doc.derive_id_from_background(), 1);

            doc.id = 5;
            doc.set_background("");
            assert_eq!(doc.derive_id_from_background(), 5);

            doc.set_background("bg.v2_7");
            assert_eq!(doc.derive_id_from_background(), 1);
        }

        #[test]
        fn repeat_count_is_clamped() {
            let mut doc = LevelDocument::new();
            doc.set_background_repeat_count(0);
            assert_eq!(doc.background_repeat_count, 1);
            doc.set_background_repeat_count(25);
            assert_eq!(doc.background_repeat_count, 10);
            doc.set_background_repeat_count(4);
            assert_eq!(doc.background_repeat_count, 4);
        }

        #[test]
        fn empty_game_config_falls_back_to_default() {
            let mut doc = LevelDocument::new();
            doc.game_config_path.clear();
            assert_eq!(doc.effective_game_config(), DEFAULT_GAME_CONFIG);
            doc.game_config_path = "custom.json".to_string();
            assert_eq!(doc.effective_game_config(), "custom.json");
        }

        #[test]
        fn bounds_cover_all_positions() {
            let mut doc = LevelDocument::new();
            assert!(doc.bounds().is_none());
            doc.place("A", Point2::new(10.0, 40.0));
            doc.place("B", Point2::new(-5.0, 20.0));
            let bounds = doc.bounds().unwrap();
            assert_eq!(bounds.min(), Point2::new(-5.0, 20.0));
            assert_eq!(bounds.max(), Point2::new(10.0, 40.0));
        }

        #[test]
        fn default_asset_is_square_sprite_slot() {
            let asset = AssetInfo::default();
            assert_eq!((asset.width, asset.height), (32, 32));
            assert_eq!(asset.hit_size(), 32);
            assert_eq!(Point2::default(), Point2::new(0.0, 0.0));
        }
    }
}

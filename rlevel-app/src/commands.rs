use std::path::Path;

use anyhow::{Context, Result, bail};
use rlevel_config::AppConfig;
use rlevel_core::document::{EntityId, LevelDocument};
use rlevel_core::geometry::Point2;
use rlevel_io::assets::discover_asset_catalog;
use rlevel_io::export::{ExportSettings, export_runtime_levels};
use rlevel_io::{
    Diagnostics, DocumentLoader, DocumentSaver, EditorFacade, FsStore, LevelStore, TypeRegistry,
};
use tracing::{info, warn};

use crate::Command;

pub fn run(command: Command, config: &AppConfig) -> Result<()> {
    let facade = EditorFacade::filesystem();
    let mut diagnostics = Diagnostics::new();

    match command {
        Command::New {
            path,
            width,
            height,
            background,
            repeat,
            game,
            force,
        } => {
            if facade.store().exists(&path) && !force {
                bail!("{} 已存在，使用 --force 覆盖", path.display());
            }
            let mut document = LevelDocument::new();
            document.width = width;
            document.height = height;
            document.set_background_repeat_count(repeat);
            if let Some(game) = game {
                document.game_config_path = game;
            }
            if let Some(background) = background {
                document.set_background(background);
                document.derive_id_from_background();
            }
            facade
                .save(&document, &path, &mut diagnostics)
                .with_context(|| format!("写入关卡 {} 失败", path.display()))?;
            println!("已创建关卡 {} (id={})", path.display(), document.id);
        }
        Command::Place { map, kind, x, y } => {
            let id = edit(&facade, &map, &mut diagnostics, |document| {
                Ok(document.place(kind.as_str(), Point2::new(x, y)))
            })?;
            println!("已放置 {kind} #{id} @ ({x:.2}, {y:.2})");
        }
        Command::Move { map, id, x, y } => {
            edit(&facade, &map, &mut diagnostics, |document| {
                document.move_entity(EntityId::new(id), Point2::new(x, y))?;
                Ok(())
            })?;
            println!("已移动 #{id} 到 ({x:.2}, {y:.2})");
        }
        Command::Remove { map, id } => {
            let removed = edit(&facade, &map, &mut diagnostics, |document| {
                Ok(document.remove_entity(EntityId::new(id))?)
            })?;
            println!("已删除 {} #{id}", removed.kind);
        }
        Command::Inspect { map } => {
            let document = load(&facade, &map, &mut diagnostics)?;
            print_overview(&map, &document, facade.store(), &mut diagnostics);
        }
        Command::Refs { registry } => {
            let path = registry.unwrap_or_else(|| config.export.server_game_config.clone());
            print_registry(&path, facade.store(), &mut diagnostics);
        }
        Command::Export { map, out_dir } => {
            let document = load(&facade, &map, &mut diagnostics)?;
            let settings = ExportSettings {
                server_game_config: config.export.server_game_config.clone(),
                client_game_config: config.export.client_game_config.clone(),
                output_dir: out_dir.unwrap_or_else(|| config.export.output_dir.clone()),
            };
            let report = export_runtime_levels(&document, &settings, facade.store(), &mut diagnostics);
            for (path, outcome) in [
                (&report.server_path, &report.server),
                (&report.client_path, &report.client),
            ] {
                match outcome {
                    Ok(()) => println!("已导出 {}", path.display()),
                    Err(err) => println!("导出 {} 失败: {err}", path.display()),
                }
            }
            if !report.is_complete() {
                bail!("运行时关卡导出不完整");
            }
        }
        Command::Assets => {
            let candidates = &config.assets.client_config_candidates;
            match discover_asset_catalog(facade.store(), candidates, &mut diagnostics) {
                Some((path, registry)) => {
                    println!("资源目录：{}", path.display());
                    for (key, asset) in &registry {
                        println!(
                            "  - {key}: {} ({}x{})",
                            asset.sprite_path, asset.width, asset.height
                        );
                    }
                }
                None => {
                    warn!(candidates = candidates.len(), "未找到客户端配置，使用默认资源");
                    println!("未找到客户端配置。");
                }
            }
        }
    }

    if !diagnostics.is_empty() {
        info!(count = diagnostics.len(), "命令完成，存在可恢复的问题");
    }
    Ok(())
}

fn load(
    facade: &EditorFacade<FsStore>,
    map: &Path,
    diagnostics: &mut Diagnostics,
) -> Result<LevelDocument> {
    facade
        .load(map, diagnostics)
        .with_context(|| format!("读取关卡 {} 失败", map.display()))
}

/// 解码、修改并写回同一文件。
fn edit<T>(
    facade: &EditorFacade<FsStore>,
    map: &Path,
    diagnostics: &mut Diagnostics,
    change: impl FnOnce(&mut LevelDocument) -> Result<T>,
) -> Result<T> {
    let mut document = load(facade, map, diagnostics)?;
    let outcome = change(&mut document)?;
    facade
        .save(&document, map, diagnostics)
        .with_context(|| format!("写入关卡 {} 失败", map.display()))?;
    Ok(outcome)
}

fn print_overview(
    map: &Path,
    document: &LevelDocument,
    store: &dyn LevelStore,
    diagnostics: &mut Diagnostics,
) {
    let registry = TypeRegistry::load(
        store,
        Path::new(document.effective_game_config()),
        diagnostics,
    );

    println!("关卡：{}", map.display());
    println!("  游戏配置 = {}", document.effective_game_config());
    println!(
        "  id={}, 尺寸={}x{}, 滚动速度={:.2}",
        document.id, document.width, document.height, document.scroll_speed
    );
    if document.background_name.is_empty() {
        println!("  背景：无");
    } else {
        println!(
            "  背景：{} x{}",
            document.background_name, document.background_repeat_count
        );
    }
    if let Some(bounds) = document.bounds() {
        println!(
            "  实体范围：({:.2}, {:.2}) - ({:.2}, {:.2})",
            bounds.min().x(),
            bounds.min().y(),
            bounds.max().x(),
            bounds.max().y()
        );
    }

    println!("实体（{}）：", document.entity_count());
    for entity in document.entities() {
        let reference = registry
            .resolve(&entity.kind)
            .map(|r| r.to_string())
            .unwrap_or_else(|| "?".to_string());
        println!(
            "  - #{} {} ref={} @ ({:.2}, {:.2})",
            entity.id,
            entity.kind,
            reference,
            entity.position.x(),
            entity.position.y()
        );
    }

    if !diagnostics.is_empty() {
        println!("诊断（{}）：", diagnostics.len());
        for diagnostic in diagnostics.iter() {
            println!("  - {diagnostic}");
        }
    }
}

fn print_registry(path: &Path, store: &dyn LevelStore, diagnostics: &mut Diagnostics) {
    let registry = TypeRegistry::load(store, path, diagnostics);
    println!("类型注册表：{}（{} 项）", path.display(), registry.len());
    for (name, reference) in registry.sorted_entries() {
        println!("  {name} -> {reference}");
    }

    let reverse = registry.invert(diagnostics);
    println!("反向映射（{} 项）：", reverse.len());
    for (reference, name) in reverse.iter() {
        println!("  {reference} -> {name}");
    }

    if !diagnostics.is_empty() {
        println!("诊断（{}）：", diagnostics.len());
        for diagnostic in diagnostics.iter() {
            println!("  - {diagnostic}");
        }
    }
}

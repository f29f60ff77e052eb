use std::path::{Path, PathBuf};

use rlevel_core::document::LevelDocument;
use tracing::{error, info};

use crate::IoError;
use crate::diagnostics::Diagnostics;
use crate::dialect::{client::encode_client, server::encode_server};
use crate::store::LevelStore;

/// 运行时关卡导出参数。
#[derive(Debug, Clone)]
pub struct ExportSettings {
    pub server_game_config: PathBuf,
    pub client_game_config: PathBuf,
    pub output_dir: PathBuf,
}

/// 两个运行时文件各自的写入结果，互不影响。
#[derive(Debug)]
pub struct ExportReport {
    pub server_path: PathBuf,
    pub server: Result<(), IoError>,
    pub client_path: PathBuf,
    pub client: Result<(), IoError>,
}

impl ExportReport {
    pub fn is_complete(&self) -> bool {
        self.server.is_ok() && self.client.is_ok()
    }
}

pub fn server_level_path(output_dir: &Path, map_id: i32) -> PathBuf {
    output_dir.join(format!("level_{map_id}-server.json"))
}

pub fn client_level_path(output_dir: &Path, map_id: i32) -> PathBuf {
    output_dir.join(format!("level_{map_id}-client.json"))
}

/// 写出 `level_<id>-server.json` 与 `level_<id>-client.json`。
pub fn export_runtime_levels(
    document: &LevelDocument,
    settings: &ExportSettings,
    store: &dyn LevelStore,
    diagnostics: &mut Diagnostics,
) -> ExportReport {
    let server_path = server_level_path(&settings.output_dir, document.id);
    let client_path = client_level_path(&settings.output_dir, document.id);

    let server = encode_server(document, &settings.server_game_config, store, diagnostics)
        .and_then(|text| store.save(&server_path, &text));
    log_outcome("server", &server_path, &server);

    let client = encode_client(document, &settings.client_game_config)
        .and_then(|text| store.save(&client_path, &text));
    log_outcome("client", &client_path, &client);

    ExportReport {
        server_path,
        server,
        client_path,
        client,
    }
}

fn log_outcome(dialect: &str, path: &Path, outcome: &Result<(), IoError>) {
    match outcome {
        Ok(()) => info!(dialect, path = %path.display(), "已导出运行时关卡"),
        Err(err) => error!(dialect, path = %path.display(), error = %err, "导出运行时关卡失败"),
    }
}

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

pub const CONFIG_ENV: &str = "RLEVEL_CONFIG";

/// 应用配置的根结构。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub assets: AssetsConfig,
}

impl AppConfig {
    /// 从显式路径加载配置。
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// 自动发现配置文件：优先读取环境变量 `RLEVEL_CONFIG`，否则寻找 `./config/default.toml`。
    /// 若文件缺失，则返回默认配置。
    pub fn discover() -> Result<Self, ConfigError> {
        if let Some(path) = env::var_os(CONFIG_ENV) {
            return Self::from_file(PathBuf::from(path));
        }

        let default_path = env::current_dir()
            .map(|dir| dir.join("config").join("default.toml"))
            .map_err(|source| ConfigError::Context {
                message: "获取当前工作目录失败".to_string(),
                source,
            })?;

        if default_path.exists() {
            Self::from_file(default_path)
        } else {
            Ok(Self::default())
        }
    }
}

/// 日志配置，支持设置默认等级。
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_string()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
        }
    }
}

/// 运行时关卡导出设置：服务端与客户端各自的游戏配置及输出目录。
#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "ExportConfig::default_server_game_config")]
    pub server_game_config: PathBuf,
    #[serde(default = "ExportConfig::default_client_game_config")]
    pub client_game_config: PathBuf,
    #[serde(default = "ExportConfig::default_output_dir")]
    pub output_dir: PathBuf,
}

impl ExportConfig {
    fn default_server_game_config() -> PathBuf {
        PathBuf::from("config/game/rtype.json")
    }

    fn default_client_game_config() -> PathBuf {
        PathBuf::from("config/game/client-rtype.json")
    }

    fn default_output_dir() -> PathBuf {
        PathBuf::from("maps")
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            server_game_config: Self::default_server_game_config(),
            client_game_config: Self::default_client_game_config(),
            output_dir: Self::default_output_dir(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssetsConfig {
    #[serde(default = "AssetsConfig::default_candidates")]
    pub client_config_candidates: Vec<PathBuf>,
}

impl AssetsConfig {
    fn default_candidates() -> Vec<PathBuf> {
        [
            "../assets/configs/client.json",
            "assets/configs/client.json",
            "./assets/configs/client.json",
            "../../assets/configs/client.json",
        ]
        .into_iter()
        .map(PathBuf::from)
        .collect()
    }
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            client_config_candidates: Self::default_candidates(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("读取配置文件 {path:?} 失败: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("解析配置文件 {path:?} 失败: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("{message}")]
    Context {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rlevel_config::{AppConfig, ConfigError};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "rlevel", version, about = "关卡文件编辑与运行时关卡导出")]
struct Cli {
    /// 配置文件路径，缺省时自动发现。
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// 写出一个默认的编辑器关卡。
    New {
        path: PathBuf,
        #[arg(long, default_value_t = 800)]
        width: i32,
        #[arg(long, default_value_t = 600)]
        height: i32,
        #[arg(long)]
        background: Option<String>,
        #[arg(long, default_value_t = 1)]
        repeat: i32,
        #[arg(long)]
        game: Option<String>,
        #[arg(long)]
        force: bool,
    },
    /// 在关卡中放置实体。
    Place {
        map: PathBuf,
        kind: String,
        #[arg(allow_negative_numbers = true)]
        x: f32,
        #[arg(allow_negative_numbers = true)]
        y: f32,
    },
    /// 移动实体（编号以解码后的顺序为准）。
    Move {
        map: PathBuf,
        id: i32,
        #[arg(allow_negative_numbers = true)]
        x: f32,
        #[arg(allow_negative_numbers = true)]
        y: f32,
    },
    /// 删除实体。
    Remove { map: PathBuf, id: i32 },
    /// 打印关卡概览。
    Inspect { map: PathBuf },
    /// 打印类型注册表及其反向映射。
    Refs { registry: Option<PathBuf> },
    /// 导出服务端与客户端运行时关卡。
    Export {
        map: PathBuf,
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// 打印资源目录。
    Assets,
}

fn main() {
    let cli = Cli::parse();
    let config = load_configuration(cli.config.clone());
    init_logging(&config);
    info!("启动 rlevel");

    if let Err(err) = commands::run(cli.command, &config) {
        error!(error = %err, "命令执行失败");
        eprintln!("错误：{err:#}");
        std::process::exit(1);
    }
}

fn load_configuration(override_path: Option<PathBuf>) -> AppConfig {
    match override_path {
        Some(path) => AppConfig::from_file(&path).unwrap_or_else(|err| {
            warn!(path = %path.display(), error = %err, "加载指定配置失败，使用默认配置");
            AppConfig::default()
        }),
        None => match AppConfig::discover() {
            Ok(cfg) => cfg,
            Err(err) => {
                match &err {
                    ConfigError::Io { path, .. } | ConfigError::Parse { path, .. } => {
                        warn!(path = %path.display(), error = %err, "加载默认配置失败，使用内建默认值");
                    }
                    ConfigError::Context { .. } => {
                        warn!(error = %err, "加载默认配置失败，使用内建默认值");
                    }
                }
                AppConfig::default()
            }
        },
    }
}

fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_new(config.logging.level.clone()).unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt().with_env_filter(filter).with_writer(std::io::stderr);
    if subscriber.try_init().is_err() {
        // 已初始化，忽略
    }
}

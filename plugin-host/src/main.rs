//! oci8 插件本地宿主
//!
//! 模拟仪表盘宿主对插件模块的使用，包括：
//! - 读取导出表
//! - 按角色实例化编辑器并回读绑定对象
//! - 展开查询中的 SQL 宏
//! - 规整驱动返回的结果行

mod commands;

use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand};
use common::config::{AppConfig, LogFormat};
use common::errors::AppResult;
use common::response::ApiResponse;
use common::utils::IdGenerator;
use serde_json::Value;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const SERVICE_NAME: &str = "plugin-host";

/// Local host for the oci8 data-source plugin
#[derive(Parser, Debug)]
#[command(name = "plugin-host")]
#[command(about = "Loads the oci8 plugin module and drives its editors", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(long, short = 'd')]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the module's export bindings
    Exports,
    /// Instantiate an export around a bound object stored as JSON
    Init {
        /// Export name (e.g. "ConfigCtrl")
        export: String,
        /// JSON file holding the bound object
        file: PathBuf,
        /// Write the bound state back to the file
        #[arg(long)]
        write: bool,
    },
    /// Expand SQL macros in a query target stored as JSON
    Interpolate {
        /// JSON file holding the query target
        file: PathBuf,
        /// Range start (epoch milliseconds or RFC3339)
        #[arg(long)]
        from: String,
        /// Range end (epoch milliseconds or RFC3339)
        #[arg(long)]
        to: String,
        /// JSON file holding the data source settings
        #[arg(long)]
        datasource: Option<PathBuf>,
    },
    /// Normalize raw driver rows (`{"columns": [...], "rows": [[...]]}`)
    Transform {
        /// JSON file holding the columns and rows
        file: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 加载配置
    let config = AppConfig::load_with_service(SERVICE_NAME)?;

    // 初始化日志追踪（输出到 stderr，stdout 只留结果）
    init_tracing(&config, cli.debug);

    let invocation_id = IdGenerator::invocation_id();
    let started = Instant::now();
    info!(service = SERVICE_NAME, plugin = %config.plugin_id, invocation_id = %invocation_id, "启动宿主");

    match run(&config, cli.command) {
        Ok(data) => {
            let response = ApiResponse::ok(data)
                .with_service(&config.service_name)
                .with_invocation_id(invocation_id)
                .with_duration(started.elapsed().as_millis() as u64);
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(())
        }
        Err(e) => {
            error!(code = e.code(), error = %e, "命令执行失败");
            let mut response = ApiResponse::from(&e);
            response.meta.service = Some(config.service_name.clone());
            response.meta.invocation_id = Some(invocation_id);
            response.meta.duration_ms = Some(started.elapsed().as_millis() as u64);
            println!("{}", serde_json::to_string_pretty(&response)?);
            std::process::exit(1);
        }
    }
}

fn run(config: &AppConfig, command: Command) -> AppResult<Value> {
    let module = oracle_plugin::module()?;

    match command {
        Command::Exports => Ok(serde_json::to_value(commands::exports(module))?),
        Command::Init { export, file, write } => {
            let output = commands::init(module, config, &export, &file, write)?;
            Ok(serde_json::to_value(output)?)
        }
        Command::Interpolate {
            file,
            from,
            to,
            datasource,
        } => {
            let output = commands::interpolate(&file, &from, &to, datasource.as_deref())?;
            Ok(serde_json::to_value(output)?)
        }
        Command::Transform { file } => Ok(serde_json::to_value(commands::transform(&file)?)?),
    }
}

fn init_tracing(config: &AppConfig, debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_level.into());

    let (plain, json) = match config.log_format {
        LogFormat::Plain => (
            Some(tracing_subscriber::fmt::layer().with_writer(std::io::stderr)),
            None,
        ),
        LogFormat::Json => (
            None,
            Some(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            ),
        ),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(plain)
        .with(json)
        .init();
}

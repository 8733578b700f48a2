//! Logging Infrastructure
//!
//! Structured logging setup with support for both development and production environments.
//! `RUST_LOG` 优先于配置中的日志级别。

use std::path::Path;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the logger
pub fn init_logger() {
    init_logger_with_file(None, None, None);
}

/// Initialize the logger with optional file output
///
/// - `log_level`: 默认 `info`
/// - `json`: 输出 JSON 格式 (生产环境)
/// - `log_dir`: 存在时额外按天滚动写入 `floor-server.YYYY-MM-DD`
pub fn init_logger_with_file(log_level: Option<&str>, json: Option<bool>, log_dir: Option<&str>) {
    let level = log_level.unwrap_or("info");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let json = json.unwrap_or(false);

    let file_layer = log_dir
        .map(Path::new)
        .filter(|p| p.exists())
        .map(|p| {
            let file_appender = tracing_appender::rolling::daily(p, "floor-server");
            fmt::layer()
                .with_ansi(false)
                .with_target(true)
                .with_writer(file_appender)
        });

    let registry = tracing_subscriber::registry().with(filter).with(file_layer);

    let result = if json {
        registry
            .with(fmt::layer().json().with_target(true))
            .try_init()
    } else {
        registry
            .with(
                fmt::layer()
                    .with_file(false)
                    .with_line_number(false)
                    .with_thread_ids(false)
                    .with_target(false),
            )
            .try_init()
    };

    if let Err(e) = result {
        // 测试中可能多次初始化
        eprintln!("Logger already initialized: {}", e);
    }
}

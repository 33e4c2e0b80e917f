//! 错误日志：把 `ERROR` 级别事件逐行追加到固定名称的日志文件。

use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing_appender::non_blocking::{self, WorkerGuard};
use tracing_appender::rolling;
use tracing_subscriber::Layer;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// 错误日志文件名。
pub const ERROR_LOG_FILE_NAME: &str = "download_errors.log";

static INITIALIZED: AtomicBool = AtomicBool::new(false);

#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("日志已初始化")]
    AlreadyInitialized,
    #[error("日志订阅器初始化失败: {0}")]
    SubscriberInit(#[from] tracing_subscriber::util::TryInitError),
    #[error("日志目录不可用: {0}")]
    Io(#[from] io::Error),
}

#[derive(Clone, Copy, Debug, Default)]
pub struct LogOptions {
    /// 是否同时输出到终端
    pub console: bool,
    /// 终端输出 DEBUG 级别（否则 INFO）
    pub debug: bool,
}

/// 在 `dir` 下安装错误日志，只写文件不写终端。
pub fn init_error_log(dir: impl AsRef<Path>) -> Result<WorkerGuard, LogError> {
    init_error_log_with(dir, LogOptions::default())
}

/// 安装全局 tracing 订阅器：`<dir>/download_errors.log` 只记录 ERROR，无颜色，一行一条；
/// 按选项附加终端输出层。
///
/// 返回的 [`WorkerGuard`] 需要保持存活，销毁时把缓冲中的日志写完。重复调用返回
/// [`LogError::AlreadyInitialized`]。
pub fn init_error_log_with(
    dir: impl AsRef<Path>,
    options: LogOptions,
) -> Result<WorkerGuard, LogError> {
    if INITIALIZED.swap(true, Ordering::SeqCst) {
        return Err(LogError::AlreadyInitialized);
    }

    let result = install(dir.as_ref(), options);
    if result.is_err() {
        INITIALIZED.store(false, Ordering::SeqCst);
    }
    result
}

fn install(dir: &Path, options: LogOptions) -> Result<WorkerGuard, LogError> {
    std::fs::create_dir_all(dir)?;

    let file_appender = rolling::never(dir, ERROR_LOG_FILE_NAME);
    let (file_writer, guard) = non_blocking::NonBlockingBuilder::default()
        .lossy(false)
        .finish(file_appender);

    let file_layer = fmt::layer()
        .with_target(false)
        .with_ansi(false)
        .with_writer(file_writer)
        .with_filter(LevelFilter::ERROR);

    let console_level = if options.debug {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let console_writer: BoxMakeWriter = if options.console {
        BoxMakeWriter::new(io::stdout)
    } else {
        BoxMakeWriter::new(io::sink)
    };
    let console_layer = fmt::layer()
        .with_target(false)
        .with_writer(console_writer)
        .with_filter(if options.console {
            console_level
        } else {
            LevelFilter::OFF
        });

    tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .try_init()?;

    Ok(guard)
}

//! Logging Module
//!
//! `tracing-subscriber`によるログ出力の初期化。
//! 環境変数`RUST_LOG`が設定されている場合は、そのディレクティブを優先します。

use tracing::level_filters::LevelFilter;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::error::XlsxToDbError;

/// 詳細度に応じたログレベルでサブスクライバーを初期化する
///
/// # 引数
///
/// * `verbose` - 詳細度（0=INFO, 1=DEBUG, 2以上=TRACE）
/// * `quiet` - `true`の場合はERRORのみ出力（`RUST_LOG`より優先）
///
/// # 戻り値
///
/// * `Ok(())` - 初期化に成功した場合
/// * `Err(XlsxToDbError::Config)` - `RUST_LOG`が不正な場合、またはサブスクライバーが既に設定済みの場合
pub fn init_logging(verbose: u8, quiet: bool) -> Result<(), XlsxToDbError> {
    let filter = filter_for(verbose, quiet, std::env::var(EnvFilter::DEFAULT_ENV).ok())?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| XlsxToDbError::Config(format!("Failed to initialize logging: {}", e)))
}

fn filter_for(
    verbose: u8,
    quiet: bool,
    env_directives: Option<String>,
) -> Result<EnvFilter, XlsxToDbError> {
    match env_directives.filter(|d| !quiet && !d.trim().is_empty()) {
        Some(directives) => EnvFilter::try_new(&directives).map_err(|e| {
            XlsxToDbError::Config(format!(
                "Invalid {} directives '{}': {}",
                EnvFilter::DEFAULT_ENV,
                directives,
                e
            ))
        }),
        None => Ok(EnvFilter::default()
            .add_directive(LevelFilter::from_level(level_for(verbose, quiet)).into())),
    }
}

fn level_for(verbose: u8, quiet: bool) -> Level {
    match (quiet, verbose) {
        (true, _) => Level::ERROR,
        (false, 0) => Level::INFO,
        (false, 1) => Level::DEBUG,
        (false, _) => Level::TRACE,
    }
}

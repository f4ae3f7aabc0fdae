// ============================================
// src/logging.rs
// tracing の初期化
// ============================================

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::error::Result;

const LOG_FILE: &str = "kanaquiz.log";

/// ログの出力先
#[derive(Debug, Clone)]
pub enum LogTarget {
    /// 標準エラー (TUI を使わないコマンド用)
    Stderr,
    /// ファイルに追記 (TUI が端末を占有している間)
    File(PathBuf),
}

impl LogTarget {
    pub fn default_file() -> Self {
        LogTarget::File(crate::config::data_dir().join(LOG_FILE))
    }
}

/// サブスクライバを登録する。`RUST_LOG` があればそちらを優先
///
/// 二重に呼ばれた場合は何もしない。
pub fn init(level: &str, target: LogTarget) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);

    let installed = match target {
        LogTarget::Stderr => builder.with_writer(std::io::stderr).try_init(),
        LogTarget::File(path) => {
            let file = OpenOptions::new().create(true).append(true).open(&path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
    };
    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
    Ok(())
}

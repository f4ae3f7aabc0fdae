// ============================================
// src/config.rs
// 設定ファイルの構造と読み込み
// ============================================

use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::checker::Mode;
use crate::error::{Error, Result};

const CONFIG_FILE: &str = "config.json";

/// ユーザー設定。ファイルがなければ既定値
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 外部の問題データ (未指定なら埋め込みデータ)
    pub dataset: Option<PathBuf>,
    /// 使う問題セットの番号
    pub set_index: usize,
    /// かなドリルを逆モードで始める
    pub reverse: bool,
    /// かなドリルの出題順をシャッフルする
    pub shuffle: bool,
    /// `RUST_LOG` がないときのログレベル
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dataset: None,
            set_index: 0,
            reverse: false,
            shuffle: false,
            log_level: "warn".to_string(),
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("jp", "kanaquiz", "KANA_QUIZ")
}

/// ログなどを置くデータディレクトリ (なければ作る)
pub fn data_dir() -> PathBuf {
    if let Some(proj_dirs) = project_dirs() {
        let data_dir = proj_dirs.data_dir();
        if fs::create_dir_all(data_dir).is_ok() {
            return data_dir.to_path_buf();
        }
    }
    // 取得できなかったらカレントディレクトリに
    PathBuf::from(".")
}

impl Config {
    pub fn default_path() -> PathBuf {
        match project_dirs() {
            Some(proj_dirs) => proj_dirs.config_dir().join(CONFIG_FILE),
            None => PathBuf::from(CONFIG_FILE),
        }
    }

    pub fn start_mode(&self) -> Mode {
        if self.reverse { Mode::Reverse } else { Mode::Forward }
    }

    /// MARK:ファイルから読み込む (存在しなければ既定値)
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    /// 読めない設定ファイルは既定値で続ける
    ///
    /// 失敗はログ初期化の前に起きるので、ここでは警告せず呼び出し側に返す。
    pub fn load(path: Option<&Path>) -> (Self, Option<IgnoredConfig>) {
        let path = path.map(Path::to_path_buf).unwrap_or_else(Self::default_path);
        match Self::load_from(&path) {
            Ok(config) => (config, None),
            Err(error) => (Self::default(), Some(IgnoredConfig { path, error })),
        }
    }
}

/// 読み込めずに無視した設定ファイル
#[derive(Debug)]
pub struct IgnoredConfig {
    pub path: PathBuf,
    pub error: Error,
}

impl IgnoredConfig {
    /// サブスクライバ登録後に呼ぶ
    pub fn warn(&self) {
        tracing::warn!(
            path = %self.path.display(),
            error = %self.error,
            "ignoring unreadable config"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("kanaquiz-{}-{}", std::process::id(), name));
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn missing_file_gives_defaults() {
        let path = std::env::temp_dir().join("kanaquiz-does-not-exist.json");
        assert_eq!(Config::load_from(&path).unwrap(), Config::default());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let path = temp_file("partial.json", r#"{"reverse": true, "set_index": 1}"#);
        let config = Config::load_from(&path).unwrap();
        assert!(config.reverse);
        assert_eq!(config.set_index, 1);
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.start_mode(), Mode::Reverse);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn broken_file_falls_back_to_defaults() {
        let path = temp_file("broken.json", "{ not json");
        assert!(Config::load_from(&path).is_err());

        let (config, ignored) = Config::load(Some(path.as_path()));
        assert_eq!(config, Config::default());
        let ignored = ignored.expect("broken file should be reported");
        assert_eq!(ignored.path, path);
        assert!(matches!(ignored.error, Error::Json(_)));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn readable_file_reports_nothing() {
        let path = std::env::temp_dir().join("kanaquiz-does-not-exist.json");
        let (_, ignored) = Config::load(Some(path.as_path()));
        assert!(ignored.is_none());
    }

    /// ログの書き出し先をメモリに差し替える
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn ignored_config_emits_a_warning() {
        let path = temp_file("warned.json", "[1, 2");
        let (_, ignored) = Config::load(Some(path.as_path()));
        let ignored = ignored.expect("broken file should be reported");

        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, || ignored.warn());

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("WARN"), "unexpected log output: {output}");
        assert!(output.contains("ignoring unreadable config"));
        assert!(output.contains("warned.json"));
        let _ = fs::remove_file(path);
    }
}

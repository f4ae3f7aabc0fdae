// ============================================
// src/error.rs
// アプリ全体のエラー型
// ============================================

use std::fmt;
use std::io;

/// kanaquiz のエラー
///
/// 採点ロジック自体は失敗しない (見つからない問題は「不正解」扱い)。
/// ここにあるのはファイル読み込みや CLI 入力など外側の失敗だけ。
#[derive(Debug)]
pub enum Error {
    /// ファイルや端末の入出力エラー
    Io(io::Error),
    /// データセット / 設定ファイルの JSON が読めない
    Json(serde_json::Error),
    /// 対話プロンプト (dialoguer) の失敗
    Prompt(String),
    /// 指定されたインデックスの問題セットが存在しない
    SetNotFound { index: usize, available: usize },
    /// `--answer ID=TEXT` の形式が不正
    InvalidAnswer(String),
    /// ページにないセクションが指定された
    SectionNotOnPage { section: String, page: String },
}

pub type Result<T> = std::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "I/O error: {}", err),
            Error::Json(err) => write!(f, "JSON error: {}", err),
            Error::Prompt(msg) => write!(f, "prompt error: {}", msg),
            Error::SetNotFound { index, available } => write!(
                f,
                "question set {} not found ({} available)",
                index, available
            ),
            Error::InvalidAnswer(raw) => {
                write!(f, "invalid answer '{}', expected ID=TEXT", raw)
            }
            Error::SectionNotOnPage { section, page } => {
                write!(f, "page '{}' has no {} section", page, section)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err)
    }
}

impl From<dialoguer::Error> for Error {
    fn from(err: dialoguer::Error) -> Self {
        Error::Prompt(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_not_found_message_names_index() {
        let err = Error::SetNotFound {
            index: 3,
            available: 2,
        };
        assert_eq!(err.to_string(), "question set 3 not found (2 available)");
    }

    #[test]
    fn io_errors_keep_their_source() {
        let err: Error = io::Error::new(io::ErrorKind::NotFound, "missing").into();
        assert!(std::error::Error::source(&err).is_some());
    }
}

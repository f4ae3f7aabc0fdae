/*
 * src/dataset.rs
 * お題データ (問題セット) を管理するモジュール
 */

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// ビルド時に埋め込む問題データ
const BUNDLED_QUESTION_SETS: &str = include_str!("../data/question_sets.json");

/// 漢字の読み問題
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: u32,
    /// 表示用 (漢字)
    #[serde(rename = "kanji")]
    pub prompt: String,
    /// 正解の読み (ひらがな)
    #[serde(rename = "answer")]
    pub expected_answer: String,
}

/// かなドリルの1文字
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptCharacter {
    pub id: u32,
    pub character: String,
    /// ローマ字
    pub pronunciation: String,
}

/// 読解問題の選択肢
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingOption {
    pub id: String,
    #[serde(rename = "text")]
    pub body: String,
    pub is_correct: bool,
}

/// 読解の本文と、それに付く1問
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadingPassage {
    pub heading: String,
    pub body: String,
    pub question: String,
    pub options: Vec<ReadingOption>,
}

impl ReadingPassage {
    /// 正解フラグの立っている選択肢 (1つだけのはず)
    pub fn correct_option(&self) -> Option<&ReadingOption> {
        self.options.iter().find(|o| o.is_correct)
    }
}

/// 問題セット
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionSet {
    pub id: u32,
    pub title: String,
    #[serde(rename = "kanjiQuestions", default)]
    pub kanji_questions: Vec<Question>,
    #[serde(default)]
    pub reading: Option<ReadingPassage>,
    #[serde(rename = "HiraganaScript", default)]
    pub hiragana: Vec<ScriptCharacter>,
    #[serde(rename = "KatakanaScript", default)]
    pub katakana: Vec<ScriptCharacter>,
}

impl QuestionSet {
    pub fn kanji_question(&self, id: u32) -> Option<&Question> {
        self.kanji_questions.iter().find(|q| q.id == id)
    }

    pub fn hiragana_character(&self, id: u32) -> Option<&ScriptCharacter> {
        self.hiragana.iter().find(|c| c.id == id)
    }

    pub fn katakana_character(&self, id: u32) -> Option<&ScriptCharacter> {
        self.katakana.iter().find(|c| c.id == id)
    }
}

/// 問題データ全体。読み込んだ後は変更しない
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    pub sets: Vec<QuestionSet>,
}

impl Dataset {
    /// MARK:埋め込みデータを読み込む
    pub fn bundled() -> Result<Self> {
        Self::from_json(BUNDLED_QUESTION_SETS)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// MARK:外部の JSON ファイルから読み込む
    pub fn load(path: &Path) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let dataset: Dataset = serde_json::from_reader(reader)?;
        tracing::info!(path = %path.display(), sets = dataset.sets.len(), "loaded dataset");
        Ok(dataset)
    }

    /// `path` があればそれを、なければ埋め込みデータを使う
    pub fn load_or_bundled(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Self::bundled(),
        }
    }

    /// `index` 番目の問題セット。ページは基本的に 0 番目を使う
    pub fn set(&self, index: usize) -> Result<&QuestionSet> {
        self.sets.get(index).ok_or(Error::SetNotFound {
            index,
            available: self.sets.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_dataset_parses() {
        let dataset = Dataset::bundled().expect("bundled data");
        assert!(!dataset.sets.is_empty());

        let first = dataset.set(0).expect("first set");
        assert_eq!(first.kanji_question(1).unwrap().prompt, "来月");
        assert_eq!(first.kanji_question(1).unwrap().expected_answer, "らいげつ");
        assert_eq!(first.hiragana_character(1).unwrap().character, "あ");
        assert_eq!(first.katakana_character(1).unwrap().pronunciation, "a");
    }

    #[test]
    fn bundled_readings_have_one_correct_option() {
        let dataset = Dataset::bundled().unwrap();
        for set in &dataset.sets {
            let reading = set.reading.as_ref().expect("reading passage");
            let correct = reading.options.iter().filter(|o| o.is_correct).count();
            assert_eq!(correct, 1, "set {} should have one correct option", set.id);
        }
    }

    #[test]
    fn missing_sections_default_to_empty() {
        let dataset = Dataset::from_json(r#"{"sets":[{"id":9,"title":"only kanji"}]}"#).unwrap();
        let set = dataset.set(0).unwrap();
        assert!(set.kanji_questions.is_empty());
        assert!(set.reading.is_none());
        assert!(set.hiragana.is_empty());
        assert!(set.katakana_character(1).is_none());
    }

    #[test]
    fn out_of_range_set_is_an_error() {
        let dataset = Dataset::bundled().unwrap();
        let err = dataset.set(99).unwrap_err();
        assert!(matches!(err, Error::SetNotFound { index: 99, .. }));
    }

    #[test]
    fn malformed_json_is_reported() {
        assert!(matches!(Dataset::from_json("{"), Err(Error::Json(_))));
    }
}

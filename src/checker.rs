// ============================================
// src/checker.rs
// 正誤判定ロジック (純粋関数のみ)
// ============================================

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::dataset::{QuestionSet, ScriptCharacter};

/// 入力欄の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Kanji,
    Hiragana,
    Katakana,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Section::Kanji => "kanji",
            Section::Hiragana => "hiragana",
            Section::Katakana => "katakana",
        };
        f.write_str(name)
    }
}

impl FromStr for Section {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "kanji" => Ok(Section::Kanji),
            "hiragana" | "h" => Ok(Section::Hiragana),
            "katakana" | "k" => Ok(Section::Katakana),
            other => Err(format!("unknown section '{}'", other)),
        }
    }
}

/// 出題方向 (かなドリルのみ意味を持つ)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// 文字 → ローマ字
    #[default]
    Forward,
    /// ローマ字 → 文字
    Reverse,
}

impl Mode {
    pub fn toggled(self) -> Self {
        match self {
            Mode::Forward => Mode::Reverse,
            Mode::Reverse => Mode::Forward,
        }
    }
}

/// 採点対象の1問
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Item {
    /// 自由入力の問題 (漢字の読み / かなドリル)
    Typed { section: Section, id: u32 },
    /// 読解問題 (選択肢)
    Reading,
}

impl Item {
    pub fn kanji(id: u32) -> Self {
        Item::Typed {
            section: Section::Kanji,
            id,
        }
    }

    pub fn hiragana(id: u32) -> Self {
        Item::Typed {
            section: Section::Hiragana,
            id,
        }
    }

    pub fn katakana(id: u32) -> Self {
        Item::Typed {
            section: Section::Katakana,
            id,
        }
    }
}

/// ユーザーの入力内容
///
/// キーはセクションと問題 ID の組。ひらがなとカタカナで ID が重なっても衝突しない。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerState {
    typed: BTreeMap<(Section, u32), String>,
    selected_option: Option<String>,
}

impl AnswerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn typed(&self, section: Section, id: u32) -> Option<&str> {
        self.typed.get(&(section, id)).map(String::as_str)
    }

    pub fn selected_option(&self) -> Option<&str> {
        self.selected_option.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.typed.is_empty() && self.selected_option.is_none()
    }

    pub(crate) fn set_typed(&mut self, section: Section, id: u32, text: String) {
        self.typed.insert((section, id), text);
    }

    pub(crate) fn set_selected_option(&mut self, option_id: String) {
        self.selected_option = Some(option_id);
    }
}

fn script<'a>(set: &'a QuestionSet, section: Section, id: u32) -> Option<&'a ScriptCharacter> {
    match section {
        Section::Hiragana => set.hiragana_character(id),
        Section::Katakana => set.katakana_character(id),
        Section::Kanji => None,
    }
}

/// 送信済みかどうかに関係なく、入力が正解と一致するか
fn answer_matches(item: Item, answers: &AnswerState, set: &QuestionSet, mode: Mode) -> bool {
    match item {
        Item::Typed {
            section: Section::Kanji,
            id,
        } => match (set.kanji_question(id), answers.typed(Section::Kanji, id)) {
            (Some(question), Some(answer)) => answer == question.expected_answer,
            _ => false,
        },
        Item::Typed { section, id } => {
            let (Some(character), Some(answer)) = (script(set, section, id), answers.typed(section, id))
            else {
                return false;
            };
            match mode {
                Mode::Forward => {
                    answer.trim().to_lowercase() == character.pronunciation.to_lowercase()
                }
                Mode::Reverse => answer == character.character,
            }
        }
        Item::Reading => {
            let correct = set.reading.as_ref().and_then(|r| r.correct_option());
            match (answers.selected_option(), correct) {
                (Some(selected), Some(correct)) => selected == correct.id,
                _ => false,
            }
        }
    }
}

/// 1問の正誤判定
///
/// 送信前は常に `false`。存在しない問題も `false` (エラーにはしない)。
pub fn is_correct(
    item: Item,
    answers: &AnswerState,
    submitted: bool,
    set: &QuestionSet,
    mode: Mode,
) -> bool {
    submitted && answer_matches(item, answers, set, mode)
}

/// ページ全体が全問正解か
pub fn all_correct(
    items: &[Item],
    answers: &AnswerState,
    submitted: bool,
    set: &QuestionSet,
    mode: Mode,
) -> bool {
    submitted
        && items
            .iter()
            .all(|&item| is_correct(item, answers, submitted, set, mode))
}

/// 不正解のときに表示する正解
pub fn expected_answer<'a>(item: Item, set: &'a QuestionSet, mode: Mode) -> Option<&'a str> {
    match item {
        Item::Typed {
            section: Section::Kanji,
            id,
        } => set.kanji_question(id).map(|q| q.expected_answer.as_str()),
        Item::Typed { section, id } => script(set, section, id).map(|c| match mode {
            Mode::Forward => c.pronunciation.as_str(),
            Mode::Reverse => c.character.as_str(),
        }),
        Item::Reading => set
            .reading
            .as_ref()
            .and_then(|r| r.correct_option())
            .map(|o| o.id.as_str()),
    }
}

/// 画面に出すお題。逆モードではローマ字を見せる
pub fn prompt<'a>(item: Item, set: &'a QuestionSet, mode: Mode) -> Option<&'a str> {
    match item {
        Item::Typed {
            section: Section::Kanji,
            id,
        } => set.kanji_question(id).map(|q| q.prompt.as_str()),
        Item::Typed { section, id } => script(set, section, id).map(|c| match mode {
            Mode::Forward => c.character.as_str(),
            Mode::Reverse => c.pronunciation.as_str(),
        }),
        Item::Reading => set.reading.as_ref().map(|r| r.question.as_str()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{Question, ReadingOption, ReadingPassage};

    fn sample_set() -> QuestionSet {
        QuestionSet {
            id: 1,
            title: "sample".into(),
            kanji_questions: vec![Question {
                id: 1,
                prompt: "来月".into(),
                expected_answer: "らいげつ".into(),
            }],
            reading: Some(ReadingPassage {
                heading: "h".into(),
                body: "b".into(),
                question: "q".into(),
                options: ["a", "b", "c", "d"]
                    .iter()
                    .map(|id| ReadingOption {
                        id: id.to_string(),
                        body: format!("option {}", id),
                        is_correct: *id == "a",
                    })
                    .collect(),
            }),
            hiragana: vec![ScriptCharacter {
                id: 1,
                character: "あ".into(),
                pronunciation: "a".into(),
            }],
            katakana: vec![ScriptCharacter {
                id: 1,
                character: "シ".into(),
                pronunciation: "shi".into(),
            }],
        }
    }

    fn typed(section: Section, id: u32, text: &str) -> AnswerState {
        let mut answers = AnswerState::new();
        answers.set_typed(section, id, text.to_string());
        answers
    }

    #[test]
    fn nothing_is_correct_before_submission() {
        let set = sample_set();
        let answers = typed(Section::Kanji, 1, "らいげつ");
        assert!(!is_correct(Item::kanji(1), &answers, false, &set, Mode::Forward));
        assert!(is_correct(Item::kanji(1), &answers, true, &set, Mode::Forward));
    }

    #[test]
    fn forward_mode_ignores_case_and_surrounding_whitespace() {
        let set = sample_set();
        for input in ["shi", "SHI", "Shi", " shi "] {
            let answers = typed(Section::Katakana, 1, input);
            assert!(
                is_correct(Item::katakana(1), &answers, true, &set, Mode::Forward),
                "{input:?} should match"
            );
        }
        let answers = typed(Section::Katakana, 1, "si");
        assert!(!is_correct(Item::katakana(1), &answers, true, &set, Mode::Forward));
    }

    #[test]
    fn reverse_mode_requires_exact_character() {
        let set = sample_set();
        let answers = typed(Section::Hiragana, 1, "あ");
        assert!(is_correct(Item::hiragana(1), &answers, true, &set, Mode::Reverse));

        let answers = typed(Section::Hiragana, 1, "ああ");
        assert!(!is_correct(Item::hiragana(1), &answers, true, &set, Mode::Reverse));

        let answers = typed(Section::Hiragana, 1, "a");
        assert!(!is_correct(Item::hiragana(1), &answers, true, &set, Mode::Reverse));
    }

    #[test]
    fn kanji_comparison_is_exact_in_any_mode() {
        let set = sample_set();
        let answers = typed(Section::Kanji, 1, " らいげつ");
        assert!(!is_correct(Item::kanji(1), &answers, true, &set, Mode::Forward));
        let answers = typed(Section::Kanji, 1, "らいげつ");
        assert!(is_correct(Item::kanji(1), &answers, true, &set, Mode::Reverse));
    }

    #[test]
    fn missing_question_or_answer_is_incorrect() {
        let set = sample_set();
        let answers = typed(Section::Kanji, 42, "らいげつ");
        assert!(!is_correct(Item::kanji(42), &answers, true, &set, Mode::Forward));
        assert!(!is_correct(Item::kanji(1), &AnswerState::new(), true, &set, Mode::Forward));
        assert!(expected_answer(Item::kanji(42), &set, Mode::Forward).is_none());
    }

    #[test]
    fn reading_compares_selected_option() {
        let set = sample_set();
        let mut answers = AnswerState::new();
        assert!(!is_correct(Item::Reading, &answers, true, &set, Mode::Forward));

        answers.set_selected_option("b".into());
        assert!(!is_correct(Item::Reading, &answers, true, &set, Mode::Forward));

        answers.set_selected_option("a".into());
        assert!(is_correct(Item::Reading, &answers, true, &set, Mode::Forward));
        assert_eq!(expected_answer(Item::Reading, &set, Mode::Forward), Some("a"));
    }

    #[test]
    fn prompt_and_expected_answer_swap_in_reverse_mode() {
        let set = sample_set();
        assert_eq!(prompt(Item::hiragana(1), &set, Mode::Forward), Some("あ"));
        assert_eq!(prompt(Item::hiragana(1), &set, Mode::Reverse), Some("a"));
        assert_eq!(expected_answer(Item::hiragana(1), &set, Mode::Forward), Some("a"));
        assert_eq!(expected_answer(Item::hiragana(1), &set, Mode::Reverse), Some("あ"));
        assert_eq!(prompt(Item::kanji(1), &set, Mode::Reverse), Some("来月"));
    }

    #[test]
    fn section_names_display_and_parse() {
        for section in [Section::Kanji, Section::Hiragana, Section::Katakana] {
            assert_eq!(section.to_string().parse::<Section>(), Ok(section));
        }
        assert_eq!(Section::Katakana.to_string(), "katakana");
        assert_eq!("K".parse::<Section>(), Ok(Section::Katakana));
        assert!("romaji".parse::<Section>().is_err());
    }

    #[test]
    fn aggregate_is_and_of_every_item() {
        let set = sample_set();
        let items = [Item::kanji(1), Item::Reading];
        let mut answers = typed(Section::Kanji, 1, "らいげつ");
        answers.set_selected_option("a".into());

        assert!(!all_correct(&items, &answers, false, &set, Mode::Forward));
        assert!(all_correct(&items, &answers, true, &set, Mode::Forward));

        answers.set_selected_option("c".into());
        assert!(!all_correct(&items, &answers, true, &set, Mode::Forward));
    }
}

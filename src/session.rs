// ============================================
// src/session.rs
// ページごとの入力状態と状態遷移
// ============================================

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::checker::{self, AnswerState, Item, Mode, Section};
use crate::dataset::QuestionSet;

/// クイズページの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Page {
    /// 漢字の読み + 読解
    Kanji,
    Hiragana,
    Katakana,
    /// ひらがなとカタカナを並べたページ (逆モードなし)
    Kana,
}

impl Page {
    pub const ALL: [Page; 4] = [Page::Kanji, Page::Hiragana, Page::Katakana, Page::Kana];

    pub fn sections(self) -> &'static [Section] {
        match self {
            Page::Kanji => &[Section::Kanji],
            Page::Hiragana => &[Section::Hiragana],
            Page::Katakana => &[Section::Katakana],
            Page::Kana => &[Section::Hiragana, Section::Katakana],
        }
    }

    pub fn has_reading(self) -> bool {
        matches!(self, Page::Kanji)
    }

    pub fn supports_reverse(self) -> bool {
        matches!(self, Page::Hiragana | Page::Katakana)
    }

    pub fn title(self) -> &'static str {
        match self {
            Page::Kanji => "Japanese LeetCode",
            Page::Hiragana => "Hiragana Quiz",
            Page::Katakana => "Katakana Quiz",
            Page::Kana => "Hiragana & Katakana",
        }
    }

    /// このページで採点する問題の一覧 (データの順)
    pub fn items(self, set: &QuestionSet) -> Vec<Item> {
        let mut items = Vec::new();
        for &section in self.sections() {
            match section {
                Section::Kanji => items.extend(set.kanji_questions.iter().map(|q| Item::kanji(q.id))),
                Section::Hiragana => items.extend(set.hiragana.iter().map(|c| Item::hiragana(c.id))),
                Section::Katakana => items.extend(set.katakana.iter().map(|c| Item::katakana(c.id))),
            }
        }
        if self.has_reading() && set.reading.is_some() {
            items.push(Item::Reading);
        }
        items
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Page::Kanji => "kanji",
            Page::Hiragana => "hiragana",
            Page::Katakana => "katakana",
            Page::Kana => "kana",
        };
        f.write_str(name)
    }
}

impl FromStr for Page {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "kanji" => Ok(Page::Kanji),
            "hiragana" => Ok(Page::Hiragana),
            "katakana" => Ok(Page::Katakana),
            "kana" | "hira-kata" => Ok(Page::Kana),
            other => Err(format!("unknown page '{}'", other)),
        }
    }
}

/// ユーザー操作
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    EditAnswer { section: Section, id: u32, text: String },
    SelectOption(String),
    Submit,
    ToggleMode,
}

/// 1ページ分の入力状態
///
/// `Editing` (submitted = false) と `Submitted` (submitted = true) の2状態。
/// 遷移は [`QuizState::apply`] だけで行い、元の状態は変更しない。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuizState {
    pub answers: AnswerState,
    pub submitted: bool,
    pub mode: Mode,
}

impl QuizState {
    pub fn new(mode: Mode) -> Self {
        Self {
            answers: AnswerState::new(),
            submitted: false,
            mode,
        }
    }

    /// MARK:状態遷移 (State, Event) -> State
    ///
    /// `can_reverse` が false のページでも ToggleMode は入力をクリアする。
    /// 出題方向だけは変えない。
    pub fn apply(&self, event: Event, can_reverse: bool) -> Self {
        let mut next = self.clone();
        match event {
            Event::EditAnswer { section, id, text } => {
                next.answers.set_typed(section, id, text);
                next.submitted = false;
            }
            Event::SelectOption(option_id) => {
                next.answers.set_selected_option(option_id);
                next.submitted = false;
            }
            Event::Submit => next.submitted = true,
            Event::ToggleMode => {
                if can_reverse {
                    next.mode = self.mode.toggled();
                }
                next.answers = AnswerState::new();
                next.submitted = false;
            }
        }
        next
    }
}

/// 1問ごとの判定結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub item: Item,
    pub prompt: String,
    pub answer: Option<String>,
    pub correct: bool,
    pub expected: String,
}

/// 問題セットとページを結びつけたクイズ
///
/// 各ページはこの型に `Page` を渡すだけで作れる。
#[derive(Debug, Clone)]
pub struct Quiz<'a> {
    set: &'a QuestionSet,
    page: Page,
    items: Vec<Item>,
    state: QuizState,
}

impl<'a> Quiz<'a> {
    pub fn new(set: &'a QuestionSet, page: Page) -> Self {
        Self::with_mode(set, page, Mode::Forward)
    }

    /// 逆モードに対応していないページでは `mode` を無視する
    pub fn with_mode(set: &'a QuestionSet, page: Page, mode: Mode) -> Self {
        let mode = if page.supports_reverse() {
            mode
        } else {
            Mode::Forward
        };
        Self {
            set,
            page,
            items: page.items(set),
            state: QuizState::new(mode),
        }
    }

    pub fn set(&self) -> &'a QuestionSet {
        self.set
    }

    pub fn page(&self) -> Page {
        self.page
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// 表示順だけを並べ替える (採点には影響しない)
    pub fn items_mut(&mut self) -> &mut [Item] {
        &mut self.items
    }

    pub fn state(&self) -> &QuizState {
        &self.state
    }

    pub fn mode(&self) -> Mode {
        self.state.mode
    }

    pub fn submitted(&self) -> bool {
        self.state.submitted
    }

    pub fn dispatch(&mut self, event: Event) {
        tracing::debug!(page = %self.page, ?event, "quiz event");
        self.state = self.state.apply(event, self.page.supports_reverse());
    }

    pub fn edit_answer(&mut self, section: Section, id: u32, text: impl Into<String>) {
        self.dispatch(Event::EditAnswer {
            section,
            id,
            text: text.into(),
        });
    }

    pub fn select_option(&mut self, option_id: impl Into<String>) {
        self.dispatch(Event::SelectOption(option_id.into()));
    }

    pub fn submit(&mut self) {
        self.dispatch(Event::Submit);
        let (correct, total) = self.score();
        tracing::info!(page = %self.page, set = self.set.id, correct, total, "answers submitted");
    }

    pub fn toggle_mode(&mut self) {
        self.dispatch(Event::ToggleMode);
    }

    /// 入力中のテキスト (未入力なら空文字)
    pub fn answer(&self, item: Item) -> &str {
        match item {
            Item::Typed { section, id } => self.state.answers.typed(section, id).unwrap_or(""),
            Item::Reading => self.state.answers.selected_option().unwrap_or(""),
        }
    }

    pub fn is_correct(&self, item: Item) -> bool {
        checker::is_correct(
            item,
            &self.state.answers,
            self.state.submitted,
            self.set,
            self.state.mode,
        )
    }

    pub fn all_correct(&self) -> bool {
        checker::all_correct(
            &self.items,
            &self.state.answers,
            self.state.submitted,
            self.set,
            self.state.mode,
        )
    }

    pub fn prompt(&self, item: Item) -> &'a str {
        checker::prompt(item, self.set, self.state.mode).unwrap_or("")
    }

    pub fn expected_answer(&self, item: Item) -> &'a str {
        checker::expected_answer(item, self.set, self.state.mode).unwrap_or("")
    }

    /// (正解数, 問題数)
    pub fn score(&self) -> (usize, usize) {
        let correct = self.items.iter().filter(|&&item| self.is_correct(item)).count();
        (correct, self.items.len())
    }

    pub fn verdicts(&self) -> Vec<Verdict> {
        self.items
            .iter()
            .map(|&item| {
                let answer = self.answer(item);
                Verdict {
                    item,
                    prompt: self.prompt(item).to_string(),
                    answer: (!answer.is_empty()).then(|| answer.to_string()),
                    correct: self.is_correct(item),
                    expected: self.expected_answer(item).to_string(),
                }
            })
            .collect()
    }

    /// 送信ボタンのラベル
    pub fn submit_label(&self) -> &'static str {
        match (self.state.submitted, self.page) {
            (false, _) => "Submit Answers",
            (true, Page::Kanji) => "Resubmit Answers",
            (true, _) => "Try Again",
        }
    }
}

// ============================================
// src/tui.rs
// クイズページの描画と入力処理 (ratatui)
// ============================================

use std::io::{Result, stdout};
use std::time::Duration;

use crossterm::{
    ExecutableCommand,
    cursor::{Hide, Show},
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};

use ratatui::{
    prelude::*,
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
};

use kanaquiz::{Item, Mode, Page, Quiz};

// --------------------------------------------------
// 状態
// --------------------------------------------------

/// 画面全体の状態
struct AppState<'a> {
    quiz: Quiz<'a>,
    /// フォーカス中の問題 (quiz.items() のインデックス)
    focus: usize,
}

impl<'a> AppState<'a> {
    fn new(quiz: Quiz<'a>) -> Self {
        Self { quiz, focus: 0 }
    }

    fn focused_item(&self) -> Option<Item> {
        self.quiz.items().get(self.focus).copied()
    }

    fn move_focus(&mut self, forward: bool) {
        let len = self.quiz.items().len();
        if len == 0 {
            return;
        }
        self.focus = if forward {
            (self.focus + 1) % len
        } else {
            (self.focus + len - 1) % len
        };
    }

    /// 文字入力。読解問題なら選択肢 ID として扱う
    fn handle_char_input(&mut self, c: char) {
        match self.focused_item() {
            Some(Item::Typed { section, id }) => {
                let mut text = self.quiz.answer(Item::Typed { section, id }).to_string();
                text.push(c);
                self.quiz.edit_answer(section, id, text);
            }
            Some(Item::Reading) => {
                let key = c.to_string();
                let exists = self
                    .quiz
                    .set()
                    .reading
                    .as_ref()
                    .is_some_and(|r| r.options.iter().any(|o| o.id == key));
                if exists {
                    self.quiz.select_option(key);
                }
            }
            None => {}
        }
    }

    fn handle_backspace(&mut self) {
        if let Some(Item::Typed { section, id }) = self.focused_item() {
            let mut text = self.quiz.answer(Item::Typed { section, id }).to_string();
            if text.pop().is_some() {
                self.quiz.edit_answer(section, id, text);
            }
        }
    }

    /// 読解問題の選択肢を左右で切り替える
    fn cycle_option(&mut self, forward: bool) {
        if self.focused_item() != Some(Item::Reading) {
            return;
        }
        let Some(reading) = self.quiz.set().reading.as_ref() else {
            return;
        };
        let len = reading.options.len();
        if len == 0 {
            return;
        }
        let current = reading
            .options
            .iter()
            .position(|o| o.id == self.quiz.answer(Item::Reading));
        let next = match current {
            Some(i) if forward => (i + 1) % len,
            Some(i) => (i + len - 1) % len,
            None => 0,
        };
        self.quiz.select_option(reading.options[next].id.clone());
    }

    fn toggle_mode(&mut self) {
        if self.quiz.page().supports_reverse() {
            self.quiz.toggle_mode();
        }
    }

    /// 1問分のフィードバック文 (送信前は None)
    fn feedback(&self, item: Item) -> Option<(String, Color)> {
        if !self.quiz.submitted() {
            return None;
        }
        if item == Item::Reading && self.quiz.answer(item).is_empty() {
            return None;
        }
        if self.quiz.is_correct(item) {
            return Some(("Correct!".to_string(), Color::Green));
        }
        let expected = self.quiz.expected_answer(item);
        let text = match self.quiz.page() {
            Page::Kanji => format!("Incorrect. The correct answer is: {}", expected),
            _ => format!("Correct answer: {}", expected),
        };
        Some((text, Color::Red))
    }
}

// --------------------------------------------------
// 端末のセットアップと実行ループ
// --------------------------------------------------

/// クイズページを開く。Esc で終了
pub fn run(quiz: Quiz<'_>) -> Result<()> {
    let mut terminal = setup_terminal()?;
    let result = run_app(&mut terminal, quiz);
    restore_terminal(&mut terminal)?;
    result
}

fn setup_terminal() -> Result<Terminal<impl Backend>> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    stdout().execute(Hide)?;
    let backend = CrosstermBackend::new(stdout());
    Terminal::new(backend)
}

fn restore_terminal(_terminal: &mut Terminal<impl Backend>) -> Result<()> {
    stdout().execute(Show)?;
    stdout().execute(LeaveAlternateScreen)?;
    disable_raw_mode()?;
    Ok(())
}

fn run_app(terminal: &mut Terminal<impl Backend>, quiz: Quiz<'_>) -> Result<()> {
    let mut app_state = AppState::new(quiz);
    tracing::info!(page = %app_state.quiz.page(), items = app_state.quiz.items().len(), "page opened");

    loop {
        terminal.draw(|f| ui(f, &app_state))?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Esc => break,
                        KeyCode::Enter => app_state.quiz.submit(),
                        KeyCode::F(2) => app_state.toggle_mode(),
                        KeyCode::Down | KeyCode::Tab => app_state.move_focus(true),
                        KeyCode::Up | KeyCode::BackTab => app_state.move_focus(false),
                        KeyCode::Right => app_state.cycle_option(true),
                        KeyCode::Left => app_state.cycle_option(false),
                        KeyCode::Backspace => app_state.handle_backspace(),
                        KeyCode::Char(c) => app_state.handle_char_input(c),
                        _ => {}
                    }
                }
            }
        }
    }

    let (correct, total) = app_state.quiz.score();
    tracing::info!(correct, total, "page closed");
    Ok(())
}

// --------------------------------------------------
// UI描画
// --------------------------------------------------

fn ui(f: &mut Frame, app_state: &AppState) {
    let quiz = &app_state.quiz;
    let size = f.area();
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("{} - {}", quiz.page().title(), quiz.set().title));
    let inner_area = block.inner(size);
    f.render_widget(block, size);

    let reading_height = if quiz.page().has_reading() && quiz.set().reading.is_some() {
        9
    } else {
        0
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),              // [0] スコア
            Constraint::Length(1),              // [1] モード
            Constraint::Min(3),                 // [2] 問題一覧
            Constraint::Length(reading_height), // [3] 読解
            Constraint::Length(2),              // [4] 送信ボタン + 結果
            Constraint::Length(1),              // [5] 操作説明
        ])
        .split(inner_area);

    // 0. スコアゲージ
    let (correct, total) = quiz.score();
    let ratio = if total > 0 {
        (correct as f64 / total as f64).min(1.0)
    } else {
        0.0
    };
    let label = if quiz.submitted() {
        format!("{} / {} correct", correct, total)
    } else {
        format!("{} questions", total)
    };
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::NONE))
        .gauge_style(Style::default().fg(Color::Magenta).bg(Color::Black))
        .ratio(ratio)
        .label(label);
    f.render_widget(gauge, chunks[0]);

    // 1. モード表示
    if quiz.page().supports_reverse() {
        let mode_text = match quiz.mode() {
            Mode::Forward => "Character → Romaji  (F2: switch to Romaji → Character)",
            Mode::Reverse => "Romaji → Character  (F2: switch to Character → Romaji)",
        };
        f.render_widget(
            Paragraph::new(mode_text)
                .style(Style::default().fg(Color::Yellow))
                .centered(),
            chunks[1],
        );
    }

    // 2. 問題一覧
    render_items(f, app_state, chunks[2]);

    // 3. 読解の本文と選択肢
    if reading_height > 0 {
        render_reading(f, app_state, chunks[3]);
    }

    // 4. 送信ボタンと全問正解メッセージ
    let mut footer = vec![Line::from(format!("[Enter] {}", quiz.submit_label())).bold()];
    if quiz.all_correct() {
        footer.push(
            Line::from("All your answers are correct! Great job!")
                .style(Style::default().fg(Color::Green).bold()),
        );
    }
    f.render_widget(Paragraph::new(footer).centered(), chunks[4]);

    // 5. 操作説明
    f.render_widget(
        Paragraph::new("↑/↓ move   ←/→ choose option   Backspace delete   Esc quit")
            .style(Style::default().fg(Color::DarkGray))
            .centered(),
        chunks[5],
    );
}

fn render_items(f: &mut Frame, app_state: &AppState, area: Rect) {
    let quiz = &app_state.quiz;
    let mut lines = Vec::new();

    for (i, &item) in quiz.items().iter().enumerate() {
        let focused = i == app_state.focus;
        let label = match item {
            Item::Typed { id, .. } => format!("Q{}: {}", id, quiz.prompt(item)),
            Item::Reading => "Reading".to_string(),
        };
        let answer = quiz.answer(item);

        // 入力欄の色 (送信後は正誤で緑/赤)
        let answer_style = if quiz.submitted() {
            if quiz.is_correct(item) {
                Style::default().fg(Color::Green)
            } else {
                Style::default().fg(Color::Red)
            }
        } else if focused {
            Style::default().fg(Color::Black).bg(Color::White)
        } else {
            Style::default().fg(Color::Gray)
        };

        let mut spans = vec![
            Span::styled(if focused { "> " } else { "  " }, Style::default().fg(Color::White)),
            Span::styled(format!("{:<16}", label), Style::default().fg(Color::White).bold()),
            Span::styled(format!(" [{}] ", answer), answer_style),
        ];
        if let Some((text, color)) = app_state.feedback(item) {
            spans.push(Span::styled(text, Style::default().fg(color)));
        }
        lines.push(Line::from(spans));
    }

    // フォーカス行が見える位置までスクロール
    let visible = area.height.max(1) as usize;
    let offset = app_state.focus.saturating_sub(visible - 1) as u16;
    f.render_widget(Paragraph::new(lines).scroll((offset, 0)), area);
}

fn render_reading(f: &mut Frame, app_state: &AppState, area: Rect) {
    let quiz = &app_state.quiz;
    let Some(reading) = quiz.set().reading.as_ref() else {
        return;
    };
    let selected = quiz.answer(Item::Reading);

    let mut lines = vec![
        Line::from(reading.heading.as_str()).bold(),
        Line::from(reading.body.as_str()),
        Line::from(reading.question.as_str()).style(Style::default().fg(Color::Yellow)),
    ];
    for option in &reading.options {
        let is_selected = option.id == selected;
        let style = if quiz.submitted() && is_selected {
            if option.is_correct {
                Style::default().fg(Color::Green)
            } else {
                Style::default().fg(Color::Red)
            }
        } else if is_selected {
            Style::default().fg(Color::Black).bg(Color::White)
        } else {
            Style::default().fg(Color::Gray)
        };
        lines.push(Line::from(Span::styled(
            format!("{}. {}", option.id, option.body),
            style,
        )));
    }

    f.render_widget(
        Paragraph::new(lines)
            .block(Block::default().borders(Borders::TOP))
            .wrap(Wrap { trim: true }),
        area,
    );
}

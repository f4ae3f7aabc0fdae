// ============================================
// src/cli.rs
// コマンドライン引数とサブコマンド
// ============================================

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use console::style;
use dialoguer::{Select, theme::ColorfulTheme};
use rand::seq::SliceRandom;
use serde_json::json;

use kanaquiz::logging::{self, LogTarget};
use kanaquiz::{Config, Dataset, Error, Item, Mode, Page, Quiz, Result, Section};

use crate::tui;

#[derive(Parser, Debug)]
#[command(name = "kanaquiz", about = "Hiragana, Katakana and Kanji reading quizzes", version)]
pub struct Cli {
    /// Question data file (JSON). Defaults to the bundled sets.
    #[arg(long, global = true)]
    dataset: Option<PathBuf>,

    /// Index of the question set to use.
    #[arg(long, global = true)]
    set: Option<usize>,

    /// Config file to read instead of the default location.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Open a quiz page in the terminal.
    Play {
        /// kanji, hiragana, katakana or kana.
        page: Page,
        /// Start in Romaji → Character mode.
        #[arg(long)]
        reverse: bool,
        /// Shuffle the order of kana drill items.
        #[arg(long)]
        shuffle: bool,
    },
    /// Choose a question set and page interactively.
    Pick,
    /// List the available question sets.
    Sets {
        /// Emit JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
    /// Submit answers without the UI and print the verdicts.
    Check {
        /// kanji, hiragana, katakana or kana.
        page: Page,
        /// Answer as ID=TEXT, or SECTION:ID=TEXT to override --section.
        #[arg(short, long = "answer")]
        answers: Vec<String>,
        /// Section that plain ID=TEXT answers belong to (kanji, hiragana, katakana).
        #[arg(long)]
        section: Option<Section>,
        /// Selected reading option id.
        #[arg(long)]
        option: Option<String>,
        /// Check in Romaji → Character mode.
        #[arg(long)]
        reverse: bool,
        /// Emit JSON instead of coloured text.
        #[arg(long)]
        json: bool,
    },
}

pub fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    let (mut config, ignored_config) = Config::load(cli.config.as_deref());
    if cli.dataset.is_some() {
        config.dataset = cli.dataset.clone();
    }
    if let Some(set) = cli.set {
        config.set_index = set;
    }

    let target = match cli.command {
        Command::Play { .. } | Command::Pick => LogTarget::default_file(),
        _ => LogTarget::Stderr,
    };
    logging::init(&config.log_level, target)?;
    if let Some(ignored) = &ignored_config {
        ignored.warn();
    }

    let dataset = Dataset::load_or_bundled(config.dataset.as_deref())?;

    match cli.command {
        Command::Play {
            page,
            reverse,
            shuffle,
        } => {
            config.reverse |= reverse;
            config.shuffle |= shuffle;
            handle_play(&dataset, &config, page)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Pick => {
            handle_pick(&dataset, &mut config)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Sets { json } => {
            handle_sets(&dataset, json)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Check {
            page,
            answers,
            section,
            option,
            reverse,
            json,
        } => {
            let request = CheckRequest {
                page,
                section,
                answers,
                option,
                reverse,
            };
            let all_correct = handle_check(&dataset, &config, request, json)?;
            Ok(if all_correct {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
    }
}

fn handle_play(dataset: &Dataset, config: &Config, page: Page) -> Result<()> {
    let set = dataset.set(config.set_index)?;
    let mut quiz = Quiz::with_mode(set, page, config.start_mode());
    if config.shuffle && page != Page::Kanji {
        quiz.items_mut().shuffle(&mut rand::rng());
    }
    tui::run(quiz)?;
    Ok(())
}

fn handle_pick(dataset: &Dataset, config: &mut Config) -> Result<()> {
    let theme = ColorfulTheme::default();
    let titles: Vec<String> = dataset.sets.iter().map(|s| s.title.clone()).collect();
    if titles.is_empty() {
        return Err(Error::SetNotFound {
            index: 0,
            available: 0,
        });
    }
    config.set_index = Select::with_theme(&theme)
        .with_prompt("Question set")
        .items(titles.as_slice())
        .default(config.set_index.min(titles.len() - 1))
        .interact()?;

    let pages: Vec<String> = Page::ALL.iter().map(|p| p.title().to_string()).collect();
    let choice = Select::with_theme(&theme)
        .with_prompt("Page")
        .items(pages.as_slice())
        .default(0)
        .interact()?;

    handle_play(dataset, config, Page::ALL[choice])
}

fn handle_sets(dataset: &Dataset, as_json: bool) -> Result<()> {
    if as_json {
        let payload: Vec<_> = dataset
            .sets
            .iter()
            .enumerate()
            .map(|(index, set)| {
                json!({
                    "index": index,
                    "id": set.id,
                    "title": set.title,
                    "kanji": set.kanji_questions.len(),
                    "reading": set.reading.is_some(),
                    "hiragana": set.hiragana.len(),
                    "katakana": set.katakana.len(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    println!(
        "{:<6} {:<4} {:<40} {:>6} {:>8} {:>9} {:>9}",
        "INDEX", "ID", "TITLE", "KANJI", "READING", "HIRAGANA", "KATAKANA"
    );
    for (index, set) in dataset.sets.iter().enumerate() {
        println!(
            "{:<6} {:<4} {:<40} {:>6} {:>8} {:>9} {:>9}",
            index,
            set.id,
            set.title,
            set.kanji_questions.len(),
            if set.reading.is_some() { "yes" } else { "no" },
            set.hiragana.len(),
            set.katakana.len(),
        );
    }
    Ok(())
}

/// `ID=TEXT` / `SECTION:ID=TEXT` を分解する
fn parse_answer(raw: &str, default_section: Section) -> Result<(Section, u32, String)> {
    let invalid = || Error::InvalidAnswer(raw.to_string());
    let (key, text) = raw.split_once('=').ok_or_else(invalid)?;
    let (section, id) = match key.split_once(':') {
        Some((section, id)) => {
            let section = section.parse::<Section>().map_err(|_| invalid())?;
            (section, id)
        }
        None => (default_section, key),
    };
    let id = id.trim().parse::<u32>().map_err(|_| invalid())?;
    Ok((section, id, text.to_string()))
}

/// ページに含まれるセクションか確認する。未指定ならページの最初のセクション
fn resolve_section(page: Page, section: Option<Section>) -> Result<Section> {
    let sections = page.sections();
    match section {
        None => Ok(sections[0]),
        Some(section) if sections.contains(&section) => Ok(section),
        Some(section) => Err(Error::SectionNotOnPage {
            section: section.to_string(),
            page: page.to_string(),
        }),
    }
}

/// `check` で送信する内容
#[derive(Debug)]
struct CheckRequest {
    page: Page,
    section: Option<Section>,
    answers: Vec<String>,
    option: Option<String>,
    reverse: bool,
}

fn handle_check(
    dataset: &Dataset,
    config: &Config,
    request: CheckRequest,
    as_json: bool,
) -> Result<bool> {
    let CheckRequest {
        page,
        section,
        answers,
        option,
        reverse,
    } = request;
    let set = dataset.set(config.set_index)?;
    let mode = if reverse || config.reverse {
        Mode::Reverse
    } else {
        Mode::Forward
    };
    let mut quiz = Quiz::with_mode(set, page, mode);

    let default_section = resolve_section(page, section)?;
    for raw in &answers {
        let (section, id, text) = parse_answer(raw, default_section)?;
        let section = resolve_section(page, Some(section))?;
        quiz.edit_answer(section, id, text);
    }
    if let Some(option) = option {
        quiz.select_option(option);
    }
    quiz.submit();

    let verdicts = quiz.verdicts();
    let (correct, total) = quiz.score();
    let all_correct = quiz.all_correct();

    if as_json {
        let payload = json!({
            "page": page,
            "set": set.id,
            "mode": quiz.mode(),
            "correct": correct,
            "total": total,
            "all_correct": all_correct,
            "verdicts": verdicts,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        for verdict in &verdicts {
            let label = match verdict.item {
                Item::Typed { section, id } => format!("{} Q{}", section, id),
                Item::Reading => "Reading".to_string(),
            };
            let answer = verdict.answer.as_deref().unwrap_or("-");
            let result = if verdict.correct {
                style("Correct!".to_string()).green()
            } else {
                style(format!("Incorrect. The correct answer is: {}", verdict.expected)).red()
            };
            println!("{:<14} {:<10} {:<10} {}", label, verdict.prompt, answer, result);
        }
        println!("{} / {} correct", correct, total);
        if all_correct {
            println!("{}", style("All your answers are correct! Great job!").green().bold());
        }
    }

    Ok(all_correct)
}

// ============================================
// src/main.rs (メインファイル)
// ============================================

use std::process::ExitCode;

mod cli;
mod tui;

fn main() -> ExitCode {
    match cli::run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

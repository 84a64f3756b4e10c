use std::io::{BufRead, Write};

use wallet_sync_core::display::format_amount;
use wallet_sync_core::{Decision, Notice, TransferSummary, UserPrompt};

/// Confirmation on stdin, notices on stdout/stderr.
pub(crate) struct TerminalPrompt {
    assume_yes: bool,
}

impl TerminalPrompt {
    pub(crate) fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

fn parse_answer(line: &str) -> Decision {
    match line.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Decision::Confirm,
        _ => Decision::Cancel,
    }
}

impl UserPrompt for TerminalPrompt {
    fn confirm(&self, summary: &TransferSummary) -> Decision {
        println!("From: {}", summary.from);
        println!("Fee:  {}", format_amount(summary.fee));
        if !summary.memo.is_empty() {
            println!("Memo: {}", summary.memo);
        }
        if self.assume_yes {
            println!("{summary} yes");
            return Decision::Confirm;
        }

        print!("{summary} [y/N] ");
        if std::io::stdout().flush().is_err() {
            return Decision::Cancel;
        }
        let mut line = String::new();
        match std::io::stdin().lock().read_line(&mut line) {
            Ok(_) => parse_answer(&line),
            Err(_) => Decision::Cancel,
        }
    }

    fn notify(&self, notice: &Notice) {
        match notice {
            Notice::Submitted { .. } => println!("{notice}"),
            Notice::Failed(_) => eprintln!("Error: {notice}"),
        }
    }
}

use std::io::{self, BufRead, Write};

use chanpack_host::{PromptItem, SelectionOutcome, SelectionPrompt};

pub struct ConsolePrompt {
    process_label: &'static str,
    printed: bool,
}

impl ConsolePrompt {
    pub fn new(process_label: &'static str) -> Self {
        Self {
            process_label,
            printed: false,
        }
    }

    fn render(&mut self, items: &[PromptItem]) {
        println!();
        println!("{} package pick-up:", self.process_label);
        for (index, item) in items.iter().enumerate() {
            println!("  [{index}] {} - {}", item.name, item.detail);
        }
        println!("Enter a number to toggle, 'q' to cancel, or press enter to continue.");
        self.printed = true;
    }
}

impl SelectionPrompt for ConsolePrompt {
    fn prompt(&mut self, items: &[PromptItem]) -> SelectionOutcome {
        if !self.printed {
            self.render(items);
        }

        print!("> ");
        let _ = io::stdout().flush();

        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line).is_err() {
            return SelectionOutcome::Cancelled;
        }

        match parse_selection(&line, items.len()) {
            Some(outcome) => {
                if matches!(outcome, SelectionOutcome::Toggled(_)) {
                    self.printed = false;
                }
                outcome
            }
            None => SelectionOutcome::Continue,
        }
    }
}

pub(crate) fn parse_selection(line: &str, item_count: usize) -> Option<SelectionOutcome> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("c") {
        return Some(SelectionOutcome::Continue);
    }
    if trimmed.eq_ignore_ascii_case("q") {
        return Some(SelectionOutcome::Cancelled);
    }
    match trimmed.parse::<usize>() {
        Ok(index) if index < item_count => Some(SelectionOutcome::Toggled(index)),
        _ => None,
    }
}

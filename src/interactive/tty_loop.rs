use anyhow::Result;
use rustyline::error::ReadlineError;

use crate::handler::CommandHandler;
use crate::interactive::{handle_line, is_exit_command};

pub async fn run(handler: &CommandHandler<'_>) -> Result<bool> {
    let mut editor = rustyline::DefaultEditor::new()?;
    let mut all_valid = true;
    loop {
        match editor.readline("> ") {
            Ok(line) => {
                let input = line.trim();
                if input.is_empty() {
                    continue;
                }
                let _ = editor.add_history_entry(input);
                if is_exit_command(input) {
                    println!("Good Bye!");
                    break;
                }
                all_valid &= handle_line(handler, input).await;
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                println!("Good Bye!");
                break;
            }
            Err(err) => return Err(err.into()),
        }
    }
    Ok(all_valid)
}

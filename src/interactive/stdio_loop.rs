use anyhow::Result;
use std::io::{self, BufRead};

use crate::handler::CommandHandler;
use crate::interactive::{handle_line, is_exit_command};

pub async fn run(handler: &CommandHandler<'_>) -> Result<bool> {
    let stdin = io::stdin();
    let mut lock = stdin.lock();
    let mut line = String::new();
    let mut all_valid = true;
    loop {
        line.clear();
        if lock.read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim();
        if input.is_empty() || input.starts_with('#') {
            continue;
        }
        if is_exit_command(input) {
            break;
        }
        all_valid &= handle_line(handler, input).await;
    }
    Ok(all_valid)
}

mod stdio_loop;
mod tty_loop;

use anyhow::Result;
use std::future::Future;
use std::io::{self, IsTerminal};
use std::pin::Pin;

use crate::handler::CommandHandler;

trait InteractiveBackend {
    fn run<'a>(
        &'a self,
        handler: &'a CommandHandler<'a>,
    ) -> Pin<Box<dyn Future<Output = Result<bool>> + 'a>>;
}

struct TtyBackend;
struct StdioBackend;

impl InteractiveBackend for TtyBackend {
    fn run<'a>(
        &'a self,
        handler: &'a CommandHandler<'a>,
    ) -> Pin<Box<dyn Future<Output = Result<bool>> + 'a>> {
        Box::pin(tty_loop::run(handler))
    }
}

impl InteractiveBackend for StdioBackend {
    fn run<'a>(
        &'a self,
        handler: &'a CommandHandler<'a>,
    ) -> Pin<Box<dyn Future<Output = Result<bool>> + 'a>> {
        Box::pin(stdio_loop::run(handler))
    }
}

/// Reads one command per line until exit. Returns whether every command was
/// valid.
pub async fn run_interactive(handler: &CommandHandler<'_>) -> Result<bool> {
    let backend: &dyn InteractiveBackend =
        if io::stdin().is_terminal() && io::stdout().is_terminal() {
            println!("Interactive mode. Enter one command per line, exit to finish.");
            &TtyBackend
        } else {
            &StdioBackend
        };
    backend.run(handler).await
}

pub fn is_exit_command(input: &str) -> bool {
    matches!(input, "exit" | "quit" | "/exit" | "/quit")
}

async fn handle_line(handler: &CommandHandler<'_>, input: &str) -> bool {
    match handler.handle(input).await {
        Ok(valid) => valid,
        Err(err) => {
            eprintln!("error: {err:#}");
            false
        }
    }
}

use anyhow::Result;

use crate::cli::Cli;
use crate::handler::CommandHandler;
use crate::{config, interactive, output, paths, session};

/// Returns whether everything handled ended up valid.
pub async fn run(cli: Cli) -> Result<bool> {
    paths::ensure_dirs()?;

    if let Some(uuid) = cli.show_session.as_deref() {
        let record = session::load_session(uuid)?;
        output::print_session(&record)?;
        return Ok(true);
    }

    let config = config::load(&paths::config_path(), cli.config_layer())?;
    let handler = CommandHandler::new(&cli, config);

    if let Some(command) = cli.command.as_deref() {
        return handler.handle(command).await;
    }

    interactive::run_interactive(&handler).await
}

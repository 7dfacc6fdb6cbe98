use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;
use std::time::Duration;

use crate::validation::{ValidationEvent, ValidationObserver};

fn create_spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ "));
    }
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Shows a spinner on stderr while a dry run is in flight.
#[derive(Default)]
pub struct SpinnerObserver {
    current: Mutex<Option<ProgressBar>>,
}

impl ValidationObserver for SpinnerObserver {
    fn on_event(&self, event: &ValidationEvent<'_>) {
        let Ok(mut current) = self.current.lock() else {
            return;
        };
        match event {
            ValidationEvent::Started { .. } => {
                if let Some(previous) = current.take() {
                    previous.finish_and_clear();
                }
                *current = Some(create_spinner("Dry-running command...".to_string()));
            }
            ValidationEvent::Succeeded { .. } | ValidationEvent::Failed { .. } => {
                if let Some(spinner) = current.take() {
                    spinner.finish_and_clear();
                }
            }
        }
    }
}

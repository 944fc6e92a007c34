//! Progress display for import polling

use indicatif::{ProgressBar, ProgressStyle};

/// Spinner shown while an import works toward a terminal provisioning state.
pub struct ImportProgress {
    spinner: ProgressBar,
}

impl ImportProgress {
    /// Create a spinner for the given module import.
    pub fn new(module: &str) -> Self {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            spinner.set_style(style);
        }
        spinner.set_message(format!("Importing {}...", module));
        Self { spinner }
    }

    /// Update the spinner with the latest observed provisioning state.
    pub fn observe(&self, module: &str, state: &str) {
        self.spinner.set_message(format!("Importing {}: {}", module, state));
        self.spinner.tick();
    }

    /// Clear the spinner once the import settled.
    pub fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

//! Spinner/progress rendering of pipeline events

use crate::pipeline::{PipelineEvent, PipelineObserver, Stage};
use std::sync::Mutex;

/// Renders pipeline progress with cliclack spinners and progress bars
#[derive(Default)]
pub struct TuiObserver {
    active: Mutex<Option<cliclack::ProgressBar>>,
}

impl TuiObserver {
    pub fn new() -> Self {
        Self::default()
    }

    fn start_spinner(&self, message: &str) {
        let spinner = cliclack::spinner();
        spinner.start(message);
        self.replace(Some(spinner));
    }

    fn start_progress(&self, total: usize, message: &str) {
        let bar = cliclack::progress_bar(total as u64);
        bar.start(message);
        self.replace(Some(bar));
    }

    fn finish(&self, message: &str) {
        if let Some(bar) = self.take() {
            bar.stop(message);
        }
    }

    fn inc(&self) {
        if let Ok(guard) = self.active.lock() {
            if let Some(bar) = guard.as_ref() {
                bar.inc(1);
            }
        }
    }

    fn replace(&self, next: Option<cliclack::ProgressBar>) {
        // An unfinished indicator is closed silently
        if let Some(previous) = self.take() {
            previous.stop("");
        }
        if let Ok(mut guard) = self.active.lock() {
            *guard = next;
        }
    }

    fn take(&self) -> Option<cliclack::ProgressBar> {
        self.active.lock().ok().and_then(|mut guard| guard.take())
    }
}

impl PipelineObserver for TuiObserver {
    fn on_event(&self, event: &PipelineEvent) {
        match event {
            PipelineEvent::StageStarted(Stage::DirectoryCreation) => {
                self.start_spinner("Creating project directory...")
            }
            PipelineEvent::StageStarted(Stage::Scaffolding) => {
                self.start_spinner("Creating basic files...")
            }
            PipelineEvent::StageStarted(Stage::EnvironmentSetup) => {
                self.start_spinner("Creating virtual environment...")
            }
            PipelineEvent::StageStarted(Stage::PackageInstallation) => {}
            PipelineEvent::StageStarted(Stage::Reconciliation) => {
                self.start_spinner("Writing installed packages to project files...")
            }
            PipelineEvent::StageStarted(_) => {}
            PipelineEvent::DirectoryCreated(path) => {
                self.finish(&format!("Created {}", path.display()))
            }
            PipelineEvent::FilesMaterialized(count) => {
                self.finish(&format!("Created {} files", count))
            }
            PipelineEvent::EnvironmentReady(path) => {
                self.finish(&format!("Virtual environment ready at {}", path.display()))
            }
            PipelineEvent::InstallStarted { total } => {
                self.start_progress(*total, "Installing packages...")
            }
            PipelineEvent::PackageProcessed { done, total, .. } => {
                self.inc();
                if done == total {
                    self.finish(&format!("Processed {} package(s)", total));
                }
            }
            PipelineEvent::Reconciled {
                files,
                versions_known,
            } => {
                let suffix = if *versions_known { "" } else { " (versions unknown)" };
                self.finish(&format!("Updated {} file(s){}", files, suffix));
            }
        }
    }
}

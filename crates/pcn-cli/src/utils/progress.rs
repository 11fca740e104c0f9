use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use pcnminer::engine::progress::{Progress, ProgressCallback};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::warn;

const SPINNER_TICK_MS: u64 = 80;

struct BarState {
    bar: ProgressBar,
    /// Name of the running phase (one protein of the batch).
    phase: String,
    finished_phases: usize,
}

impl BarState {
    fn apply(&mut self, event: Progress) {
        match event {
            Progress::PhaseStart { name } => {
                self.bar.reset();
                self.bar.set_length(0);
                self.bar.set_style(spinner_style());
                self.bar
                    .enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
                self.bar.set_message(name.clone());
                self.phase = name;
            }
            Progress::TaskStart { total_steps } => {
                self.bar.disable_steady_tick();
                self.bar.reset();
                self.bar.set_length(total_steps);
                self.bar.set_style(bar_style());
                self.bar.set_message(self.phase.clone());
            }
            Progress::TaskIncrement => self.bar.inc(1),
            Progress::TaskFinish => {
                if let Some(length) = self.bar.length() {
                    self.bar.set_position(length);
                }
            }
            Progress::PhaseFinish => {
                self.finished_phases += 1;
                self.bar.disable_steady_tick();
                self.bar
                    .finish_with_message(format!("✓ {}", self.phase));
            }
            Progress::Message(text) => self.bar.println(format!("  {}", text)),
        }
    }
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template("{msg:<24} [{bar:40.cyan/blue}] {pos}/{len} algorithms")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-")
}

/// Renders the engine's per-protein phases as a spinner, and the algorithm sweep of each
/// protein as a bar.
#[derive(Clone)]
pub struct CliProgressHandler {
    state: Arc<Mutex<BarState>>,
}

impl CliProgressHandler {
    pub fn new() -> Self {
        Self::with_target(ProgressDrawTarget::stderr())
    }

    /// A handler that draws nothing, for `--quiet` runs.
    pub fn hidden() -> Self {
        Self::with_target(ProgressDrawTarget::hidden())
    }

    fn with_target(target: ProgressDrawTarget) -> Self {
        let bar = ProgressBar::with_draw_target(Some(0), target).with_style(spinner_style());
        Self {
            state: Arc::new(Mutex::new(BarState {
                bar,
                phase: String::new(),
                finished_phases: 0,
            })),
        }
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let state = Arc::clone(&self.state);
        Box::new(move |event: Progress| match state.lock() {
            Ok(mut guard) => guard.apply(event),
            Err(_) => warn!("Progress state mutex was poisoned. Cannot update progress."),
        })
    }

    /// How many proteins have been reported as finished.
    pub fn finished_phases(&self) -> usize {
        self.state
            .lock()
            .map(|state| state.finished_phases)
            .unwrap_or_default()
    }
}

impl Default for CliProgressHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn bar(handler: &CliProgressHandler) -> ProgressBar {
        handler.state.lock().unwrap().bar.clone()
    }

    #[test]
    fn task_bar_is_labelled_with_the_protein() {
        let handler = CliProgressHandler::hidden();
        let callback = handler.get_callback();

        callback(Progress::PhaseStart {
            name: "Analyzing 1abc".to_string(),
        });
        assert_eq!(bar(&handler).message(), "Analyzing 1abc");

        callback(Progress::TaskStart { total_steps: 7 });
        callback(Progress::TaskIncrement);
        callback(Progress::TaskIncrement);
        let pb = bar(&handler);
        assert_eq!(pb.length(), Some(7));
        assert_eq!(pb.position(), 2);
        assert_eq!(pb.message(), "Analyzing 1abc");

        callback(Progress::TaskFinish);
        assert_eq!(bar(&handler).position(), 7);

        callback(Progress::PhaseFinish);
        let pb = bar(&handler);
        assert!(pb.is_finished());
        assert_eq!(pb.message(), "✓ Analyzing 1abc");
        assert_eq!(handler.finished_phases(), 1);
    }

    #[test]
    fn a_new_phase_restarts_the_bar() {
        let handler = CliProgressHandler::hidden();
        let callback = handler.get_callback();
        for protein in ["1abc", "2xyz"] {
            callback(Progress::PhaseStart {
                name: protein.to_string(),
            });
            callback(Progress::TaskStart { total_steps: 3 });
            callback(Progress::TaskIncrement);
            callback(Progress::PhaseFinish);
        }
        assert_eq!(handler.finished_phases(), 2);
        assert_eq!(bar(&handler).message(), "✓ 2xyz");
    }

    #[test]
    fn callback_is_usable_from_a_worker_thread() {
        let handler = CliProgressHandler::hidden();
        let callback = handler.get_callback();

        thread::spawn(move || {
            callback(Progress::PhaseStart {
                name: "worker".to_string(),
            });
            callback(Progress::Message("skipped infomap".to_string()));
            callback(Progress::PhaseFinish);
        })
        .join()
        .unwrap();

        assert_eq!(handler.finished_phases(), 1);
    }
}

use indicatif::{ProgressBar, ProgressState, ProgressStyle};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use templar::engine::progress::{Progress, ProgressCallback};
use tracing::warn;

const SPINNER_TICK_MS: u64 = 80;

/// Drives one indicatif bar from selection events raised on any worker thread.
///
/// Candidate counts accumulate across units, so the bar tracks the whole run rather
/// than a single domain.
#[derive(Clone)]
pub struct CliProgressHandler {
    pb: Arc<Mutex<ProgressBar>>,
}

impl CliProgressHandler {
    pub fn new() -> Self {
        let pb = ProgressBar::new(0)
            .with_style(Self::bar_style())
            .with_message("Initializing...");
        pb.set_draw_target(indicatif::ProgressDrawTarget::stderr());

        Self {
            pb: Arc::new(Mutex::new(pb)),
        }
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let pb_clone = self.pb.clone();

        Box::new(move |progress: Progress| {
            let Ok(pb_guard) = pb_clone.lock() else {
                warn!("Progress bar mutex was poisoned. Cannot update progress.");
                return;
            };

            match progress {
                Progress::PhaseStart(phase) => {
                    pb_guard.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
                    pb_guard.set_message(phase.to_string());
                }
                Progress::PhaseFinish(_) => {}
                Progress::CandidatesFound { total } => {
                    pb_guard.inc_length(total);
                }
                Progress::CandidateEvaluated => {
                    pb_guard.inc(1);
                }
                Progress::CandidateSkipped { structure, reason } => {
                    pb_guard.println(format!("  skipped {structure}: {reason}"));
                }
            }
        })
    }

    /// Stops the spinner and leaves the final counts on screen.
    pub fn finish(&self, message: &str) {
        match self.pb.lock() {
            Ok(pb) => {
                pb.disable_steady_tick();
                pb.finish_with_message(message.to_string());
            }
            Err(_) => warn!("Progress bar mutex was poisoned. Cannot finish progress."),
        }
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::with_template(
            "{spinner:.green} {msg:<12} [{bar:40.cyan/blue}] {pos}/{len} ({elapsed})",
        )
        .expect("Failed to create bar style template")
        .with_key(
            "elapsed",
            |state: &ProgressState, w: &mut dyn std::fmt::Write| {
                let _ = write!(w, "{:.1}s", state.elapsed().as_secs_f64());
            },
        )
        .progress_chars("##-")
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
    use templar::engine::progress::Phase;
    use std::thread;

    #[test]
    fn handler_initializes_in_a_clean_state() {
        let handler = CliProgressHandler::new();
        let pb = handler.pb.lock().unwrap();
        assert_eq!(pb.length(), Some(0));
        assert_eq!(pb.position(), 0);
        assert!(!pb.is_finished());
    }

    #[test]
    fn callback_updates_progress_bar_state() {
        let handler = CliProgressHandler::new();
        let callback = handler.get_callback();

        callback(Progress::PhaseStart(Phase::Survey));
        assert_eq!(handler.pb.lock().unwrap().message(), "Survey");

        callback(Progress::CandidatesFound { total: 3 });
        callback(Progress::CandidatesFound { total: 2 });
        assert_eq!(handler.pb.lock().unwrap().length(), Some(5));

        callback(Progress::CandidateEvaluated);
        callback(Progress::CandidateEvaluated);
        assert_eq!(handler.pb.lock().unwrap().position(), 2);

        callback(Progress::CandidateSkipped {
            structure: "1ABCA".to_string(),
            reason: "chain is not in the catalog".to_string(),
        });
        assert_eq!(handler.pb.lock().unwrap().position(), 2);

        callback(Progress::PhaseFinish(Phase::Survey));
        handler.finish("Done");
        let pb = handler.pb.lock().unwrap();
        assert!(pb.is_finished());
        assert_eq!(pb.message(), "Done");
    }

    #[test]
    fn callback_is_thread_safe() {
        let handler = CliProgressHandler::new();
        let callback = Arc::new(handler.get_callback());

        let workers: Vec<_> = (0..4)
            .map(|_| {
                let callback = Arc::clone(&callback);
                thread::spawn(move || {
                    callback(Progress::CandidatesFound { total: 1 });
                    callback(Progress::CandidateEvaluated);
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        let pb = handler.pb.lock().unwrap();
        assert_eq!(pb.length(), Some(4));
        assert_eq!(pb.position(), 4);
    }
}

use std::fmt;

/// The two passes a selection makes over its candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Survey,
    Refinement,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Survey => f.write_str("Survey"),
            Phase::Refinement => f.write_str("Refinement"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    PhaseStart(Phase),
    PhaseFinish(Phase),

    CandidatesFound { total: u64 },
    CandidateEvaluated,
    /// A candidate failed for a reason local to its structure and was dropped.
    CandidateSkipped { structure: String, reason: String },
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

/// Forwards selection events to an optional observer.
#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }

    /// Runs `work` between a start and a finish event for `phase`.
    ///
    /// The finish event is reported whether or not `work` succeeds.
    pub fn phase<T>(&self, phase: Phase, work: impl FnOnce() -> T) -> T {
        self.report(Progress::PhaseStart(phase));
        let result = work();
        self.report(Progress::PhaseFinish(phase));
        result
    }
}

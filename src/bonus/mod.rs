pub mod batch;
pub mod eligibility;
pub mod pipeline;
pub mod review;
pub mod types;

pub use batch::{BatchProcessor, BatchSummary, ClassifiedEmployee};
pub use eligibility::{classify, EligibilityChecker};
pub use pipeline::{run_period, PeriodInputs, PeriodRun};
pub use review::{apply_decisions, load_decisions, load_decisions_file, ManualDecision, ReviewOutcome};
pub use types::{BonusStatus, ClassificationResult, Outcome};

//! Reward engine for praxia.
//!
//! Everything that turns raw activity into points, streaks and badges lives
//! here, split along the latency boundary the request path cares about:
//!
//! - [`queue`]: bounded in-process job queue between HTTP handlers and the
//!   reward worker. Full queue drops the job (activity rows are already
//!   persisted, so a dropped job only delays badge evaluation).
//! - [`aggregator`]: synchronous fast path. Records activity, credits points
//!   atomically and returns the updated total so handlers can respond
//!   without waiting on badge evaluation.
//! - [`worker`]: background consumer that runs the deferred steps per job
//!   (streak transition, milestone bonuses, badge awards, leaderboard
//!   refresh). Steps are isolated so one failure never blocks the rest.
//! - [`monthly`]: month-close batch awarding accuracy, attendance and
//!   leaderboard badges. Idempotent per (user, badge, month).

pub mod aggregator;
pub mod error;
pub mod monthly;
pub mod queue;
pub mod worker;

pub use aggregator::{
    AdjustmentOutcome, GraceSkipOutcome, PaperSubmitOutcome, PracticeOutcome, RewardAggregator,
    STALE_ATTEMPT_AFTER_SECS,
};
pub use error::RewardError;
pub use monthly::{run_monthly_evaluation, MonthlyReport};
pub use queue::{ActivityKind, RewardJob, RewardQueue, DEFAULT_QUEUE_CAPACITY};
pub use worker::RewardWorker;

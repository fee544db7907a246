//! Bounded in-process queue between HTTP handlers and the reward worker.
//!
//! Handlers finish the synchronous fast path (activity row + point credit),
//! then enqueue one job describing what happened. The worker drains the
//! queue and runs the deferred steps. The channel is bounded and lossy on
//! purpose: the activity row is already durable when the job is built, so a
//! drop under backpressure only postpones badge evaluation until the user's
//! next activity or the month-close batch.

use praxia_core::types::{Day, DbId};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

/// Default queue depth. At one job per completed activity this absorbs
/// bursts far beyond normal classroom load.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Which kind of activity produced the job. Streak evaluation is scoped by
/// course, and the course decides which activity kind counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityKind {
    /// A mental-math practice session was recorded.
    Practice,
    /// A paper attempt was submitted and graded.
    Paper,
}

impl ActivityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKind::Practice => "practice",
            ActivityKind::Paper => "paper",
        }
    }
}

/// One unit of deferred reward work.
#[derive(Debug, Clone)]
pub struct RewardJob {
    pub user_id: DbId,
    pub kind: ActivityKind,
    /// Id of the practice session or paper attempt that triggered the job.
    pub source_id: DbId,
    /// Calendar day the activity landed on, captured at enqueue time so the
    /// evaluation is stable across a midnight boundary.
    pub day: Day,
}

/// Cloneable sending half handed to every HTTP handler.
#[derive(Clone)]
pub struct RewardQueue {
    sender: mpsc::Sender<RewardJob>,
}

impl RewardQueue {
    /// Create a queue; the receiver goes to the single [`RewardWorker`].
    ///
    /// [`RewardWorker`]: crate::worker::RewardWorker
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<RewardJob>) {
        let (sender, receiver) = mpsc::channel(capacity);
        (Self { sender }, receiver)
    }

    /// Enqueue a job without blocking the request path. A full or closed
    /// queue drops the job with a warning instead of failing the request.
    pub fn enqueue(&self, job: RewardJob) {
        match self.sender.try_send(job) {
            Ok(()) => {}
            Err(TrySendError::Full(job)) => {
                tracing::warn!(
                    user_id = job.user_id,
                    kind = job.kind.as_str(),
                    source_id = job.source_id,
                    "reward queue full; dropping job"
                );
            }
            Err(TrySendError::Closed(job)) => {
                tracing::warn!(
                    user_id = job.user_id,
                    kind = job.kind.as_str(),
                    source_id = job.source_id,
                    "reward queue closed; dropping job"
                );
            }
        }
    }
}

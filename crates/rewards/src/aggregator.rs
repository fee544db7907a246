//! Synchronous fast path of the reward engine.
//!
//! Every point-affecting operation lands here: activity submissions, the
//! daily login bonus, grace skip redemption, and admin adjustments. Each one
//! runs a single transaction pairing the ledger entry with the matching
//! update of `users.total_points`, so the ledger and the cached total can
//! never diverge by construction. Streaks and badges are NOT touched here;
//! handlers enqueue a [`RewardJob`] after the commit and the worker picks
//! those up.

use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use sqlx::PgPool;

use praxia_core::error::CoreError;
use praxia_core::grace;
use praxia_core::points::{self, DAILY_LOGIN_BONUS, GRACE_SKIP_COST};
use praxia_core::types::{DbId, Timestamp};
use praxia_db::models::paper_attempt::{
    PaperAttempt, PaperAttemptResponse, PaperGrade, StartPaperAttempt, SubmitPaperAttempt,
    STATUS_IN_PROGRESS,
};
use praxia_db::models::points_log::{source, CreatePointsEntry};
use praxia_db::models::practice_session::{CreatePracticeSession, PracticeSession};
use praxia_db::repositories::{
    LeaderboardRepo, PaperAttemptRepo, PointsLogRepo, PracticeSessionRepo, RewardRepo, UserRepo,
};

use crate::error::RewardError;
use crate::queue::{ActivityKind, RewardJob, RewardQueue};

/// Window after completion in which a repeated paper submit is treated as a
/// client retry and answered with the existing result instead of a 409.
pub const DUPLICATE_SUBMIT_WINDOW_SECS: i64 = 2;

/// Attempts left in progress this long are force-completed with zero score.
pub const STALE_ATTEMPT_AFTER_SECS: i64 = 3600;

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Fast-path result of a practice session submission.
#[derive(Debug, Clone, Serialize)]
pub struct PracticeOutcome {
    pub session: PracticeSession,
    pub points_earned: i64,
    pub updated_total: i64,
}

/// Fast-path result of a paper attempt submission.
#[derive(Debug, Clone, Serialize)]
pub struct PaperSubmitOutcome {
    pub attempt: PaperAttemptResponse,
    pub points_earned: i64,
    pub updated_total: i64,
    /// True when this response replays an already-graded attempt because the
    /// duplicate submit arrived inside the retry window.
    pub duplicate: bool,
}

/// Result of a grace skip redemption.
#[derive(Debug, Clone, Serialize)]
pub struct GraceSkipOutcome {
    pub points_spent: i64,
    pub updated_total: i64,
    pub preserved_streak: i32,
}

/// Result of an admin points adjustment.
#[derive(Debug, Clone, Serialize)]
pub struct AdjustmentOutcome {
    pub previous_total: i64,
    pub updated_total: i64,
    pub delta: i64,
}

// ---------------------------------------------------------------------------
// Aggregator
// ---------------------------------------------------------------------------

/// Orchestrates the synchronous reward fast path.
pub struct RewardAggregator;

impl RewardAggregator {
    /// Record a completed practice session: insert the row, credit the
    /// points, bump the lifetime question counter, all in one transaction,
    /// then hand the deferred work to the queue.
    pub async fn submit_practice(
        pool: &PgPool,
        queue: &RewardQueue,
        user_id: DbId,
        input: &CreatePracticeSession,
    ) -> Result<PracticeOutcome, RewardError> {
        // Widen before adding so a hostile payload cannot overflow i32.
        let attempted = i64::from(input.questions_correct) + i64::from(input.questions_wrong);
        points::validate_session_counts(
            i64::from(input.questions_total),
            i64::from(input.questions_correct),
            i64::from(input.questions_wrong),
            attempted,
        )?;
        let points_earned = points::session_points(attempted, i64::from(input.questions_correct));
        let today = Utc::now().date_naive();

        let mut tx = pool.begin().await?;
        let session =
            PracticeSessionRepo::create(&mut *tx, user_id, input, points_earned, today).await?;
        PointsLogRepo::insert(
            &mut *tx,
            &CreatePointsEntry {
                user_id,
                points: points_earned,
                source_type: source::MENTAL_MATH.to_string(),
                source_id: Some(session.id),
                description: format!(
                    "Practice session: {attempted} attempted, {} correct",
                    input.questions_correct
                ),
                extra_data: Some(json!({
                    "questions_total": input.questions_total,
                    "questions_correct": input.questions_correct,
                    "questions_wrong": input.questions_wrong,
                    "time_taken_secs": input.time_taken_secs,
                })),
            },
        )
        .await?;
        let updated_total = UserRepo::add_points(&mut *tx, user_id, points_earned).await?;
        UserRepo::increment_questions_attempted(&mut *tx, user_id, attempted).await?;
        tx.commit().await?;

        queue.enqueue(RewardJob {
            user_id,
            kind: ActivityKind::Practice,
            source_id: session.id,
            day: today,
        });

        Ok(PracticeOutcome {
            session,
            points_earned,
            updated_total,
        })
    }

    /// Start a paper attempt, capturing the answer key for later grading.
    pub async fn start_paper(
        pool: &PgPool,
        user_id: DbId,
        input: &StartPaperAttempt,
    ) -> Result<PaperAttempt, RewardError> {
        if input.total_questions <= 0 {
            return Err(CoreError::Validation(
                "Paper must contain at least one question".to_string(),
            )
            .into());
        }
        let key_len = input.answer_key.as_array().map(Vec::len).unwrap_or(0);
        if key_len != input.total_questions as usize {
            return Err(CoreError::Validation(format!(
                "Answer key must contain exactly {} entries",
                input.total_questions
            ))
            .into());
        }
        Ok(PaperAttemptRepo::start(pool, user_id, input).await?)
    }

    /// Grade and complete a paper attempt, crediting points in the same
    /// transaction. Concurrent submits serialize on the attempt row lock;
    /// the loser of the race (and any client retry inside the duplicate
    /// window) gets the stored result back instead of an error.
    pub async fn submit_paper(
        pool: &PgPool,
        queue: &RewardQueue,
        user_id: DbId,
        attempt_id: DbId,
        input: &SubmitPaperAttempt,
    ) -> Result<PaperSubmitOutcome, RewardError> {
        let mut tx = pool.begin().await?;

        let attempt = PaperAttemptRepo::find_by_id_for_update(&mut *tx, attempt_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Paper attempt",
                id: attempt_id,
            })?;
        if attempt.user_id != user_id {
            return Err(CoreError::Forbidden(
                "Paper attempt belongs to another user".to_string(),
            )
            .into());
        }

        if attempt.status != STATUS_IN_PROGRESS {
            tx.rollback().await?;
            return Self::replay_completed(pool, attempt).await;
        }

        let grade = grade_answers(&attempt.answer_key, &input.answers, attempt.total_questions)?;
        let completed = PaperAttemptRepo::complete(&mut *tx, attempt_id, &grade)
            .await?
            .ok_or_else(|| {
                CoreError::Conflict("Paper attempt was already completed".to_string())
            })?;

        PointsLogRepo::insert(
            &mut *tx,
            &CreatePointsEntry {
                user_id,
                points: grade.points_earned,
                source_type: source::PAPER_ATTEMPT.to_string(),
                source_id: Some(attempt_id),
                description: format!(
                    "Paper attempt '{}': {:.0}% score",
                    completed.title, grade.score_percent
                ),
                extra_data: Some(json!({
                    "questions_attempted": grade.questions_attempted,
                    "questions_correct": grade.questions_correct,
                    "score_percent": grade.score_percent,
                })),
            },
        )
        .await?;
        let updated_total = UserRepo::add_points(&mut *tx, user_id, grade.points_earned).await?;
        UserRepo::increment_questions_attempted(
            &mut *tx,
            user_id,
            grade.questions_attempted as i64,
        )
        .await?;
        tx.commit().await?;

        queue.enqueue(RewardJob {
            user_id,
            kind: ActivityKind::Paper,
            source_id: attempt_id,
            day: completed.session_date,
        });

        Ok(PaperSubmitOutcome {
            points_earned: completed.points_earned,
            attempt: completed.into(),
            updated_total,
            duplicate: false,
        })
    }

    /// Answer a submit that raced with (or retried after) completion.
    /// Inside the duplicate window the stored result is replayed; later
    /// duplicates are a conflict.
    async fn replay_completed(
        pool: &PgPool,
        attempt: PaperAttempt,
    ) -> Result<PaperSubmitOutcome, RewardError> {
        let completed_at: Timestamp = attempt.completed_at.ok_or_else(|| {
            CoreError::Internal("Completed attempt has no completion time".to_string())
        })?;
        let age = Utc::now() - completed_at;
        if age.num_seconds() > DUPLICATE_SUBMIT_WINDOW_SECS {
            return Err(
                CoreError::Conflict("Paper attempt was already submitted".to_string()).into(),
            );
        }

        let total = UserRepo::find_by_id(pool, attempt.user_id)
            .await?
            .map(|u| u.total_points)
            .unwrap_or(0);
        Ok(PaperSubmitOutcome {
            points_earned: attempt.points_earned,
            attempt: attempt.into(),
            updated_total: total,
            duplicate: true,
        })
    }

    /// Award the daily login bonus if today's has not been claimed yet.
    /// Returns the new total when the bonus was awarded, `None` on a repeat
    /// login the same day.
    pub async fn claim_daily_login_bonus(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<i64>, RewardError> {
        let today = Utc::now().date_naive();

        let mut tx = pool.begin().await?;
        if !UserRepo::claim_daily_login_bonus(&mut *tx, user_id, today).await? {
            tx.rollback().await?;
            return Ok(None);
        }
        PointsLogRepo::insert(
            &mut *tx,
            &CreatePointsEntry {
                user_id,
                points: DAILY_LOGIN_BONUS,
                source_type: source::DAILY_LOGIN.to_string(),
                source_id: None,
                description: "Daily login bonus".to_string(),
                extra_data: None,
            },
        )
        .await?;
        let total = UserRepo::add_points(&mut *tx, user_id, DAILY_LOGIN_BONUS).await?;
        tx.commit().await?;

        Ok(Some(total))
    }

    /// Redeem a grace skip: spend the points and roll the weekly window
    /// forward. The streak counters are deliberately untouched; redemption
    /// exists to make the missed day's reset never happen.
    pub async fn redeem_grace_skip(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<GraceSkipOutcome, RewardError> {
        let today = Utc::now().date_naive();

        let mut tx = pool.begin().await?;
        let user = UserRepo::find_by_id_for_update(&mut *tx, user_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "User",
                id: user_id,
            })?;

        grace::check_eligibility(user.total_points, &user.grace_skip_state(), today).map_err(
            |denial| match denial {
                grace::GraceSkipDenial::InsufficientPoints { .. } => {
                    CoreError::Validation(denial.to_string())
                }
                grace::GraceSkipDenial::AlreadyUsedThisWeek { .. } => {
                    CoreError::Conflict(denial.to_string())
                }
            },
        )?;

        let next_state = grace::redeem(&user.grace_skip_state(), today);
        PointsLogRepo::insert(
            &mut *tx,
            &CreatePointsEntry {
                user_id,
                points: -GRACE_SKIP_COST,
                source_type: source::GRACE_SKIP.to_string(),
                source_id: None,
                description: "Grace skip: streak preserved".to_string(),
                extra_data: None,
            },
        )
        .await?;
        let updated_total = UserRepo::add_points(&mut *tx, user_id, -GRACE_SKIP_COST).await?;
        UserRepo::record_grace_skip(&mut *tx, user_id, &next_state).await?;
        tx.commit().await?;

        Ok(GraceSkipOutcome {
            points_spent: GRACE_SKIP_COST,
            updated_total,
            preserved_streak: user.current_streak,
        })
    }

    /// Set a user's total to an exact value (admin path). The delta still
    /// goes through the ledger so reconciliation holds, and the leaderboard
    /// is refreshed immediately.
    pub async fn adjust_points(
        pool: &PgPool,
        user_id: DbId,
        new_total: i64,
        reason: &str,
    ) -> Result<AdjustmentOutcome, RewardError> {
        if new_total < 0 {
            return Err(
                CoreError::Validation("Total points must not be negative".to_string()).into(),
            );
        }

        let mut tx = pool.begin().await?;
        let user = UserRepo::find_by_id_for_update(&mut *tx, user_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "User",
                id: user_id,
            })?;

        let delta = new_total - user.total_points;
        PointsLogRepo::insert(
            &mut *tx,
            &CreatePointsEntry {
                user_id,
                points: delta,
                source_type: source::ADMIN_ADJUSTMENT.to_string(),
                source_id: None,
                description: format!("Admin adjustment: {reason}"),
                extra_data: Some(json!({
                    "previous_total": user.total_points,
                    "new_total": new_total,
                })),
            },
        )
        .await?;
        UserRepo::set_total_points(&mut *tx, user_id, new_total).await?;
        tx.commit().await?;

        let week_start = grace::week_start_of(Utc::now().date_naive());
        if let Err(e) = LeaderboardRepo::refresh(pool, week_start).await {
            tracing::warn!(error = %e, "leaderboard refresh after adjustment failed");
        }

        Ok(AdjustmentOutcome {
            previous_total: user.total_points,
            updated_total: new_total,
            delta,
        })
    }

    /// Wipe a user's gamification state: aggregates, activity, ledger, and
    /// badges, in one transaction. Returns false when the user does not
    /// exist.
    pub async fn reset_progress(pool: &PgPool, user_id: DbId) -> Result<bool, RewardError> {
        let mut tx = pool.begin().await?;
        if !UserRepo::reset_progress(&mut *tx, user_id).await? {
            tx.rollback().await?;
            return Ok(false);
        }
        PracticeSessionRepo::delete_by_user(&mut *tx, user_id).await?;
        PaperAttemptRepo::delete_by_user(&mut *tx, user_id).await?;
        PointsLogRepo::delete_by_user(&mut *tx, user_id).await?;
        RewardRepo::delete_by_user(&mut *tx, user_id).await?;
        LeaderboardRepo::delete_by_user(&mut *tx, user_id).await?;
        tx.commit().await?;
        Ok(true)
    }
}

// ---------------------------------------------------------------------------
// Grading
// ---------------------------------------------------------------------------

/// Grade submitted answers against the stored key. `null` entries are
/// unanswered; answered entries compare as trimmed strings. Attempted =
/// answered, right or wrong.
fn grade_answers(
    answer_key: &serde_json::Value,
    answers: &serde_json::Value,
    total_questions: i32,
) -> Result<PaperGrade, CoreError> {
    let key = answer_key
        .as_array()
        .ok_or_else(|| CoreError::Internal("Answer key is not an array".to_string()))?;
    let submitted = answers
        .as_array()
        .ok_or_else(|| CoreError::Validation("Answers must be an array".to_string()))?;
    if submitted.len() != key.len() {
        return Err(CoreError::Validation(format!(
            "Expected {} answers, got {}",
            key.len(),
            submitted.len()
        )));
    }

    let mut attempted = 0i32;
    let mut correct = 0i32;
    for (expected, given) in key.iter().zip(submitted) {
        if given.is_null() {
            continue;
        }
        attempted += 1;
        let matches = match (expected.as_str(), given.as_str()) {
            (Some(e), Some(g)) => e.trim() == g.trim(),
            _ => expected == given,
        };
        if matches {
            correct += 1;
        }
    }

    let score_percent = if total_questions > 0 {
        f64::from(correct) * 100.0 / f64::from(total_questions)
    } else {
        0.0
    };

    Ok(PaperGrade {
        answers: answers.clone(),
        questions_attempted: attempted,
        questions_correct: correct,
        score_percent,
        points_earned: points::session_points(attempted as i64, correct as i64),
    })
}

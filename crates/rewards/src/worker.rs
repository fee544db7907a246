//! Background consumer of the reward queue.
//!
//! A single worker drains the queue, which is what serializes all streak
//! writes: requests never update streak columns, so two sessions landing at
//! once cannot race each other past a milestone. Per job the worker runs
//! the streak transition, milestone and full-month bonuses, badge awards
//! and the leaderboard refresh, with each step isolated so one failure is
//! logged and the rest still run.

use chrono::{Datelike, Days};
use sqlx::PgPool;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use praxia_core::badges::{
    earned_badges, BadgeMetrics, BadgeSpec, MonthlyPerformance, RuleScope,
    MONTHLY_STREAK_CHAMPION,
};
use praxia_core::grace::week_start_of;
use praxia_core::streak::{
    apply_activity, milestone_bonus, DayActivity, StreakChange, FULL_MONTH_BONUS,
    FULL_MONTH_MIN_STREAK, QUALIFYING_ATTEMPTED_MIN,
};
use praxia_core::types::{month_bounds, month_key, previous_month, DbId};
use praxia_db::models::points_log::{source, CreatePointsEntry};
use praxia_db::models::profile::{COURSE_ABACUS, COURSE_VEDIC_MATHS};
use praxia_db::models::user::User;
use praxia_db::repositories::{
    LeaderboardRepo, PaperAttemptRepo, PointsLogRepo, PracticeSessionRepo, ProfileRepo,
    RewardRepo, UserRepo,
};

use crate::error::RewardError;
use crate::queue::{ActivityKind, RewardJob};

/// Single consumer of the reward queue.
pub struct RewardWorker {
    pool: PgPool,
    receiver: mpsc::Receiver<RewardJob>,
}

impl RewardWorker {
    pub fn new(pool: PgPool, receiver: mpsc::Receiver<RewardJob>) -> Self {
        Self { pool, receiver }
    }

    /// Drain jobs until cancellation or until every sender is gone.
    pub async fn run(mut self, cancel: CancellationToken) {
        tracing::info!("reward worker started");
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("reward worker shutting down");
                    break;
                }
                job = self.receiver.recv() => match job {
                    Some(job) => self.process(job).await,
                    None => {
                        tracing::info!("reward queue closed; worker exiting");
                        break;
                    }
                },
            }
        }
    }

    /// Run the deferred steps for one job. Steps are independent: a streak
    /// failure must not stop badge evaluation, and neither must block the
    /// leaderboard refresh.
    async fn process(&self, job: RewardJob) {
        tracing::debug!(
            user_id = job.user_id,
            kind = job.kind.as_str(),
            source_id = job.source_id,
            "processing reward job"
        );

        let user = match UserRepo::find_by_id(&self.pool, job.user_id).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                tracing::warn!(user_id = job.user_id, "reward job for unknown user; skipping");
                return;
            }
            Err(e) => {
                tracing::error!(user_id = job.user_id, error = %e, "reward job user lookup failed");
                return;
            }
        };

        if let Err(e) = self.update_streak(&user, &job).await {
            tracing::error!(user_id = job.user_id, error = %e, "streak update failed");
        }
        if let Err(e) = self.award_badges(&job).await {
            tracing::error!(user_id = job.user_id, error = %e, "badge evaluation failed");
        }
        if let Err(e) = LeaderboardRepo::refresh(&self.pool, week_start_of(job.day)).await {
            tracing::error!(error = %e, "leaderboard refresh failed");
        }
    }

    /// Apply the job's activity to the user's streak, persist it, and pay
    /// out any milestone or full-month bonus the transition unlocked.
    ///
    /// Streaks are course-scoped: Abacus students build theirs from
    /// practice sessions, Vedic Maths students from paper attempts. A job
    /// whose activity kind does not drive the user's course, or a user
    /// without a student profile, leaves the streak untouched.
    async fn update_streak(&self, user: &User, job: &RewardJob) -> Result<(), RewardError> {
        let profile = ProfileRepo::find_by_user(&self.pool, job.user_id).await?;
        let drives_streak = match &profile {
            Some(p) => match job.kind {
                ActivityKind::Practice => p.course == COURSE_ABACUS,
                ActivityKind::Paper => p.course == COURSE_VEDIC_MATHS,
            },
            None => false,
        };
        if !drives_streak {
            tracing::debug!(
                user_id = job.user_id,
                kind = job.kind.as_str(),
                "activity does not drive this user's streak; skipping"
            );
            return Ok(());
        }

        let yesterday = job.day.checked_sub_days(Days::new(1));
        let (attempted_today, attempted_yesterday) = match job.kind {
            ActivityKind::Practice => (
                PracticeSessionRepo::attempted_on_day(&self.pool, job.user_id, job.day).await?,
                match yesterday {
                    Some(d) => {
                        PracticeSessionRepo::attempted_on_day(&self.pool, job.user_id, d).await?
                    }
                    None => 0,
                },
            ),
            ActivityKind::Paper => (
                PaperAttemptRepo::attempted_on_day(&self.pool, job.user_id, job.day).await?,
                match yesterday {
                    Some(d) => {
                        PaperAttemptRepo::attempted_on_day(&self.pool, job.user_id, d).await?
                    }
                    None => 0,
                },
            ),
        };

        let outcome = apply_activity(
            &user.streak_state(),
            &DayActivity {
                today: job.day,
                attempted_today,
                attempted_yesterday,
            },
        );
        UserRepo::update_streak(&self.pool, job.user_id, &outcome.state).await?;

        if outcome.forced_reset {
            tracing::warn!(
                user_id = job.user_id,
                attempted_today,
                "positive streak on a non-qualifying day; forced back to 0"
            );
        }

        if outcome.change == StreakChange::Incremented {
            if let Some(bonus) = milestone_bonus(outcome.state.current) {
                self.pay_bonus(
                    job.user_id,
                    bonus,
                    source::STREAK_BONUS,
                    &format!("{}-day streak milestone bonus", outcome.state.current),
                )
                .await?;
                tracing::info!(
                    user_id = job.user_id,
                    streak = outcome.state.current,
                    bonus,
                    "streak milestone bonus awarded"
                );
            }
        }

        if outcome.state.current >= FULL_MONTH_MIN_STREAK {
            self.check_full_month(job, outcome.state.current).await?;
        }

        Ok(())
    }

    /// Award the full-month bonus when a long streak has covered every day
    /// of the current month so far with qualifying activity. The badge
    /// insert (unique per user and month) gates the one-time payout.
    async fn check_full_month(&self, job: &RewardJob, streak: i32) -> Result<(), RewardError> {
        let (month_start, _) = month_bounds(job.day.year(), job.day.month());
        let day_after = match job.day.checked_add_days(Days::new(1)) {
            Some(d) => d,
            None => return Ok(()),
        };
        let days_elapsed = i64::from(job.day.day());

        let qualifying = match job.kind {
            ActivityKind::Practice => {
                PracticeSessionRepo::qualifying_days_between(
                    &self.pool,
                    job.user_id,
                    month_start,
                    day_after,
                    QUALIFYING_ATTEMPTED_MIN,
                )
                .await?
            }
            ActivityKind::Paper => {
                PaperAttemptRepo::qualifying_days_between(
                    &self.pool,
                    job.user_id,
                    month_start,
                    day_after,
                    QUALIFYING_ATTEMPTED_MIN,
                )
                .await?
            }
        };
        if qualifying < days_elapsed {
            return Ok(());
        }

        let month = month_key(job.day.year(), job.day.month());
        let mut tx = self.pool.begin().await?;
        let newly_awarded = RewardRepo::try_award(
            &mut *tx,
            job.user_id,
            &MONTHLY_STREAK_CHAMPION,
            Some(&month),
        )
        .await?;
        if newly_awarded {
            PointsLogRepo::insert(
                &mut *tx,
                &CreatePointsEntry {
                    user_id: job.user_id,
                    points: FULL_MONTH_BONUS,
                    source_type: source::STREAK_BONUS.to_string(),
                    source_id: None,
                    description: format!("Full-month streak bonus for {month}"),
                    extra_data: None,
                },
            )
            .await?;
            UserRepo::add_points(&mut *tx, job.user_id, FULL_MONTH_BONUS).await?;
        }
        tx.commit().await?;

        if newly_awarded {
            tracing::info!(
                user_id = job.user_id,
                streak,
                %month,
                "full-month streak bonus awarded"
            );
        }
        Ok(())
    }

    /// Walk the badge rule table against the user's fresh aggregates:
    /// lifetime question volume, SUPER ladder milestones, and this month's
    /// accuracy figures. Awards are idempotent, so re-evaluating on every
    /// job is safe.
    async fn award_badges(&self, job: &RewardJob) -> Result<(), RewardError> {
        // Reload: the streak step may have paid bonuses since the job's
        // snapshot was taken.
        let Some(user) = UserRepo::find_by_id(&self.pool, job.user_id).await? else {
            return Ok(());
        };

        let perf = self
            .monthly_performance(job.user_id, job.day.year(), job.day.month())
            .await?;
        let metrics = BadgeMetrics {
            lifetime_questions: user.total_questions_attempted,
            total_points: user.total_points,
            month: Some(perf),
        };

        for rule in earned_badges(RuleScope::Lifetime, &metrics) {
            self.try_award_logged(job.user_id, &rule.badge, None).await?;
        }
        for rule in earned_badges(RuleScope::Super, &metrics) {
            self.try_award_logged(job.user_id, &rule.badge, None).await?;
        }
        let month = month_key(job.day.year(), job.day.month());
        for rule in earned_badges(RuleScope::Month, &metrics) {
            self.try_award_logged(job.user_id, &rule.badge, Some(&month))
                .await?;
        }

        Ok(())
    }

    /// Accuracy figures for one user's month, with the previous month as
    /// the comeback baseline. Computed from practice sessions; paper
    /// attempts grade against a fixed key and are excluded from accuracy
    /// comparisons.
    async fn monthly_performance(
        &self,
        user_id: DbId,
        year: i32,
        month: u32,
    ) -> Result<MonthlyPerformance, RewardError> {
        let (start, end) = month_bounds(year, month);
        let totals = PracticeSessionRepo::totals_between(&self.pool, user_id, start, end).await?;

        let (prev_year, prev_month) = previous_month(year, month);
        let (prev_start, prev_end) = month_bounds(prev_year, prev_month);
        let prev_totals =
            PracticeSessionRepo::totals_between(&self.pool, user_id, prev_start, prev_end).await?;

        Ok(MonthlyPerformance {
            questions_attempted: totals.attempted,
            accuracy_pct: totals.accuracy_pct().unwrap_or(0.0),
            previous_accuracy_pct: prev_totals.accuracy_pct(),
        })
    }

    async fn try_award_logged(
        &self,
        user_id: DbId,
        badge: &BadgeSpec,
        month: Option<&str>,
    ) -> Result<(), RewardError> {
        if RewardRepo::try_award(&self.pool, user_id, badge, month).await? {
            tracing::info!(user_id, badge = badge.badge_type, month, "badge awarded");
        }
        Ok(())
    }

    /// One flat bonus: ledger entry plus total update in one transaction.
    async fn pay_bonus(
        &self,
        user_id: DbId,
        points: i64,
        source_type: &str,
        description: &str,
    ) -> Result<(), RewardError> {
        let mut tx = self.pool.begin().await?;
        PointsLogRepo::insert(
            &mut *tx,
            &CreatePointsEntry {
                user_id,
                points,
                source_type: source_type.to_string(),
                source_id: None,
                description: description.to_string(),
                extra_data: None,
            },
        )
        .await?;
        UserRepo::add_points(&mut *tx, user_id, points).await?;
        tx.commit().await?;
        Ok(())
    }
}

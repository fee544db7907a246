//! Month-close badge evaluation.
//!
//! Run by an admin once a month has ended. Awards the badge families that
//! only settle when the month is complete: accuracy badges over the full
//! month's sessions, attendance badges per branch, and the weekly
//! leaderboard podium badges stamped with the month. Every award goes
//! through the same idempotent insert as the worker's, so re-running the
//! batch never double-awards.

use serde::Serialize;
use sqlx::PgPool;

use praxia_core::badges::{
    earned_badges, BadgeMetrics, MonthlyPerformance, RuleScope, ATTENDANCE_CHAMPION,
    GOLD_TSHIRT_STAR, LEADERBOARD_BADGES,
};
use praxia_core::types::{month_bounds, month_key, previous_month};
use praxia_db::repositories::{
    AttendanceRepo, PracticeSessionRepo, ProfileRepo, RewardRepo, UserRepo,
};

/// What one batch run awarded, returned to the admin caller.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MonthlyReport {
    pub month: String,
    pub users_evaluated: u64,
    pub accuracy_badges: u64,
    pub attendance_badges: u64,
    pub tshirt_badges: u64,
    pub leaderboard_badges: u64,
}

/// Evaluate all month-close badge families for `(year, month)`.
pub async fn run_monthly_evaluation(
    pool: &PgPool,
    year: i32,
    month: u32,
) -> Result<MonthlyReport, sqlx::Error> {
    let key = month_key(year, month);
    let mut report = MonthlyReport {
        month: key.clone(),
        ..Default::default()
    };

    award_accuracy_badges(pool, year, month, &key, &mut report).await?;
    award_attendance_badges(pool, year, month, &key, &mut report).await?;
    award_leaderboard_badges(pool, &key, &mut report).await?;

    tracing::info!(
        month = %report.month,
        users = report.users_evaluated,
        accuracy = report.accuracy_badges,
        attendance = report.attendance_badges,
        tshirt = report.tshirt_badges,
        leaderboard = report.leaderboard_badges,
        "monthly badge evaluation complete"
    );
    Ok(report)
}

/// Accuracy family: every user with a session in the month is re-checked
/// against the complete month, catching sessions that landed after the
/// worker's last incremental pass.
async fn award_accuracy_badges(
    pool: &PgPool,
    year: i32,
    month: u32,
    key: &str,
    report: &mut MonthlyReport,
) -> Result<(), sqlx::Error> {
    let (start, end) = month_bounds(year, month);
    let (prev_year, prev_month) = previous_month(year, month);
    let (prev_start, prev_end) = month_bounds(prev_year, prev_month);

    let users = PracticeSessionRepo::users_active_between(pool, start, end).await?;
    for user_id in users {
        report.users_evaluated += 1;

        let totals = PracticeSessionRepo::totals_between(pool, user_id, start, end).await?;
        let prev_totals =
            PracticeSessionRepo::totals_between(pool, user_id, prev_start, prev_end).await?;
        let perf = MonthlyPerformance {
            questions_attempted: totals.attempted,
            accuracy_pct: totals.accuracy_pct().unwrap_or(0.0),
            previous_accuracy_pct: prev_totals.accuracy_pct(),
        };

        for rule in earned_badges(RuleScope::Month, &BadgeMetrics::month_only(perf)) {
            if RewardRepo::try_award(pool, user_id, &rule.badge, Some(key)).await? {
                report.accuracy_badges += 1;
            }
        }
    }
    Ok(())
}

/// Attendance family, per branch: perfect presence across every class
/// session the branch held earns Attendance Champion; doing it in the
/// t-shirt every time earns Gold T-Shirt Star on top.
async fn award_attendance_badges(
    pool: &PgPool,
    year: i32,
    month: u32,
    key: &str,
    report: &mut MonthlyReport,
) -> Result<(), sqlx::Error> {
    let (start, end) = month_bounds(year, month);

    for branch in AttendanceRepo::branches_with_sessions_between(pool, start, end).await? {
        let held = AttendanceRepo::count_sessions_between(pool, &branch, start, end).await?;
        if held == 0 {
            continue;
        }
        for profile in ProfileRepo::list_by_branch(pool, &branch).await? {
            let figures =
                AttendanceRepo::month_attendance(pool, profile.user_id, &branch, start, end)
                    .await?;
            if figures.present < held {
                continue;
            }
            if RewardRepo::try_award(pool, profile.user_id, &ATTENDANCE_CHAMPION, Some(key))
                .await?
            {
                report.attendance_badges += 1;
            }
            if figures.t_shirt_worn >= held
                && RewardRepo::try_award(pool, profile.user_id, &GOLD_TSHIRT_STAR, Some(key))
                    .await?
            {
                report.tshirt_badges += 1;
            }
        }
    }
    Ok(())
}

/// Leaderboard family: the top three by lifetime points get the podium
/// badges for the month.
async fn award_leaderboard_badges(
    pool: &PgPool,
    key: &str,
    report: &mut MonthlyReport,
) -> Result<(), sqlx::Error> {
    let top = UserRepo::top_by_points(pool, LEADERBOARD_BADGES.len() as i64).await?;
    for (user, badge) in top.iter().zip(LEADERBOARD_BADGES.iter()) {
        if RewardRepo::try_award(pool, user.id, badge, Some(key)).await? {
            report.leaderboard_badges += 1;
        }
    }
    Ok(())
}

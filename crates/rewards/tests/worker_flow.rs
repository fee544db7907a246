//! Integration tests for the deferred reward steps: streak transitions,
//! bonuses, badge awards, and the month-close batch.

use chrono::NaiveDate;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

use praxia_core::streak::StreakState;
use praxia_db::models::profile::{CreateStudentProfile, COURSE_ABACUS, COURSE_VEDIC_MATHS};
use praxia_db::models::points_log::source;
use praxia_db::models::practice_session::CreatePracticeSession;
use praxia_db::models::user::CreateUser;
use praxia_db::repositories::{
    LeaderboardRepo, PointsLogRepo, PracticeSessionRepo, ProfileRepo, RewardRepo, UserRepo,
};
use praxia_rewards::{
    run_monthly_evaluation, ActivityKind, RewardJob, RewardQueue, RewardWorker,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

async fn make_student(pool: &PgPool, name: &str, course: &str) -> i64 {
    let user = UserRepo::create(
        pool,
        &CreateUser {
            username: name.to_string(),
            email: format!("{name}@example.com"),
            password_hash: "argon2-hash".to_string(),
            role: "student".to_string(),
        },
    )
    .await
    .unwrap();
    ProfileRepo::create(
        pool,
        &CreateStudentProfile {
            user_id: user.id,
            branch: "North Branch".to_string(),
            course: course.to_string(),
        },
    )
    .await
    .unwrap();
    user.id
}

/// Insert a practice session directly with an explicit date, the way
/// historic activity looks to the worker.
async fn record_session(pool: &PgPool, user_id: i64, date: NaiveDate, correct: i32, wrong: i32) {
    let input = CreatePracticeSession {
        questions_total: correct + wrong + 2,
        questions_correct: correct,
        questions_wrong: wrong,
        time_taken_secs: 240,
        operation: None,
        difficulty: None,
    };
    let points = i64::from(correct + wrong) + i64::from(correct) * 5;
    PracticeSessionRepo::create(pool, user_id, &input, points, date)
        .await
        .unwrap();
}

/// Feed the jobs to a worker and wait for it to drain them.
async fn run_worker(pool: &PgPool, jobs: Vec<RewardJob>) {
    let (queue, receiver) = RewardQueue::new(32);
    for job in jobs {
        queue.enqueue(job);
    }
    drop(queue);
    RewardWorker::new(pool.clone(), receiver)
        .run(CancellationToken::new())
        .await;
}

fn practice_job(user_id: i64, date: NaiveDate) -> RewardJob {
    RewardJob {
        user_id,
        kind: ActivityKind::Practice,
        source_id: 0,
        day: date,
    }
}

// ---------------------------------------------------------------------------
// Test: Streak starts and increments across consecutive qualifying days
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn test_streak_builds_across_consecutive_days(pool: PgPool) {
    let user_id = make_student(&pool, "streaker", COURSE_ABACUS).await;

    record_session(&pool, user_id, day(2026, 5, 4), 15, 5).await;
    run_worker(&pool, vec![practice_job(user_id, day(2026, 5, 4))]).await;

    let user = UserRepo::find_by_id(&pool, user_id).await.unwrap().unwrap();
    assert_eq!(user.current_streak, 1);

    record_session(&pool, user_id, day(2026, 5, 5), 18, 2).await;
    run_worker(&pool, vec![practice_job(user_id, day(2026, 5, 5))]).await;

    let user = UserRepo::find_by_id(&pool, user_id).await.unwrap().unwrap();
    assert_eq!(user.current_streak, 2);
    assert_eq!(user.longest_streak, 2);
    assert_eq!(user.last_practice_date, Some(day(2026, 5, 5)));
}

// ---------------------------------------------------------------------------
// Test: A day under the threshold does not start a streak
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn test_light_day_does_not_qualify(pool: PgPool) {
    let user_id = make_student(&pool, "light", COURSE_ABACUS).await;

    record_session(&pool, user_id, day(2026, 5, 4), 8, 2).await;
    run_worker(&pool, vec![practice_job(user_id, day(2026, 5, 4))]).await;

    let user = UserRepo::find_by_id(&pool, user_id).await.unwrap().unwrap();
    assert_eq!(user.current_streak, 0);
    // The check still stamps the practice date.
    assert_eq!(user.last_practice_date, Some(day(2026, 5, 4)));
}

// ---------------------------------------------------------------------------
// Test: Milestone bonus lands when the streak reaches 7
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn test_seven_day_milestone_pays_bonus(pool: PgPool) {
    let user_id = make_student(&pool, "milestone", COURSE_ABACUS).await;

    // Six qualifying days already on the books.
    UserRepo::update_streak(
        &pool,
        user_id,
        &StreakState {
            current: 6,
            longest: 6,
            last_practice_date: Some(day(2026, 5, 9)),
        },
    )
    .await
    .unwrap();
    record_session(&pool, user_id, day(2026, 5, 9), 16, 4).await;
    record_session(&pool, user_id, day(2026, 5, 10), 14, 6).await;

    run_worker(&pool, vec![practice_job(user_id, day(2026, 5, 10))]).await;

    let user = UserRepo::find_by_id(&pool, user_id).await.unwrap().unwrap();
    assert_eq!(user.current_streak, 7);
    assert_eq!(user.total_points, 50);

    let entries = PointsLogRepo::list_by_user(&pool, user_id, 10, 0)
        .await
        .unwrap();
    assert!(entries
        .iter()
        .any(|e| e.source_type == source::STREAK_BONUS && e.points == 50));
}

// ---------------------------------------------------------------------------
// Test: Full-month streak pays the 500 bonus exactly once
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn test_full_month_streak_bonus_pays_once(pool: PgPool) {
    let user_id = make_student(&pool, "marathon", COURSE_ABACUS).await;

    // Qualifying activity on every day of May so far.
    for d in 1..=28 {
        record_session(&pool, user_id, day(2026, 5, d), 15, 5).await;
    }
    UserRepo::update_streak(
        &pool,
        user_id,
        &StreakState {
            current: 27,
            longest: 27,
            last_practice_date: Some(day(2026, 5, 27)),
        },
    )
    .await
    .unwrap();

    run_worker(&pool, vec![practice_job(user_id, day(2026, 5, 28))]).await;

    let user = UserRepo::find_by_id(&pool, user_id).await.unwrap().unwrap();
    assert_eq!(user.current_streak, 28);
    assert_eq!(user.total_points, 500);

    let held = RewardRepo::list_by_user(&pool, user_id).await.unwrap();
    assert!(held
        .iter()
        .any(|r| r.badge_type == "monthly_streak" && r.month_earned.as_deref() == Some("2026-05")));

    // The payout lands in the ledger as a streak bonus.
    let entries = PointsLogRepo::list_by_user(&pool, user_id, 10, 0)
        .await
        .unwrap();
    assert!(entries
        .iter()
        .any(|e| e.source_type == source::STREAK_BONUS && e.points == 500));

    // The badge row gates the payout; a replay of the same day pays nothing.
    let badge_count = held.len();
    run_worker(&pool, vec![practice_job(user_id, day(2026, 5, 28))]).await;

    let user = UserRepo::find_by_id(&pool, user_id).await.unwrap().unwrap();
    assert_eq!(user.total_points, 500);
    assert_eq!(
        RewardRepo::count_by_user(&pool, user_id).await.unwrap(),
        badge_count as i64
    );
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_missed_day_blocks_full_month_bonus(pool: PgPool) {
    let user_id = make_student(&pool, "almost", COURSE_ABACUS).await;

    // Day 10 has no activity; the calendar month is not covered.
    for d in 1..=28 {
        if d == 10 {
            continue;
        }
        record_session(&pool, user_id, day(2026, 5, d), 15, 5).await;
    }
    UserRepo::update_streak(
        &pool,
        user_id,
        &StreakState {
            current: 27,
            longest: 27,
            last_practice_date: Some(day(2026, 5, 27)),
        },
    )
    .await
    .unwrap();

    run_worker(&pool, vec![practice_job(user_id, day(2026, 5, 28))]).await;

    let user = UserRepo::find_by_id(&pool, user_id).await.unwrap().unwrap();
    assert_eq!(user.current_streak, 28);
    assert_eq!(user.total_points, 0);
    assert!(RewardRepo::list_by_user(&pool, user_id)
        .await
        .unwrap()
        .iter()
        .all(|r| r.badge_type != "monthly_streak"));
}

// ---------------------------------------------------------------------------
// Test: Gap day without grace resets the streak
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn test_gap_resets_streak_to_one(pool: PgPool) {
    let user_id = make_student(&pool, "gapped", COURSE_ABACUS).await;

    UserRepo::update_streak(
        &pool,
        user_id,
        &StreakState {
            current: 10,
            longest: 12,
            last_practice_date: Some(day(2026, 5, 4)),
        },
    )
    .await
    .unwrap();
    // Next activity two days later; today qualifies, so restart at 1.
    record_session(&pool, user_id, day(2026, 5, 6), 20, 0).await;

    run_worker(&pool, vec![practice_job(user_id, day(2026, 5, 6))]).await;

    let user = UserRepo::find_by_id(&pool, user_id).await.unwrap().unwrap();
    assert_eq!(user.current_streak, 1);
    assert_eq!(user.longest_streak, 12);
}

// ---------------------------------------------------------------------------
// Test: Course scoping
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn test_paper_jobs_do_not_drive_abacus_streaks(pool: PgPool) {
    let user_id = make_student(&pool, "abacus", COURSE_ABACUS).await;

    run_worker(
        &pool,
        vec![RewardJob {
            user_id,
            kind: ActivityKind::Paper,
            source_id: 0,
            day: day(2026, 5, 4),
        }],
    )
    .await;

    let user = UserRepo::find_by_id(&pool, user_id).await.unwrap().unwrap();
    assert_eq!(user.current_streak, 0);
    assert_eq!(user.last_practice_date, None);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_no_profile_means_no_streak(pool: PgPool) {
    let user = UserRepo::create(
        &pool,
        &CreateUser {
            username: "profileless".to_string(),
            email: "profileless@example.com".to_string(),
            password_hash: "argon2-hash".to_string(),
            role: "student".to_string(),
        },
    )
    .await
    .unwrap();

    record_session(&pool, user.id, day(2026, 5, 4), 20, 0).await;
    run_worker(&pool, vec![practice_job(user.id, day(2026, 5, 4))]).await;

    let reloaded = UserRepo::find_by_id(&pool, user.id).await.unwrap().unwrap();
    assert_eq!(reloaded.current_streak, 0);
    assert_eq!(reloaded.last_practice_date, None);
}

// ---------------------------------------------------------------------------
// Test: Threshold badges from the aggregates
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn test_super_and_volume_badges_awarded(pool: PgPool) {
    let user_id = make_student(&pool, "decorated", COURSE_VEDIC_MATHS).await;

    UserRepo::add_points(&pool, user_id, 3_200).await.unwrap();
    UserRepo::increment_questions_attempted(&pool, user_id, 600)
        .await
        .unwrap();

    run_worker(&pool, vec![practice_job(user_id, day(2026, 5, 4))]).await;

    let held = RewardRepo::list_by_user(&pool, user_id).await.unwrap();
    let types: Vec<&str> = held.iter().map(|r| r.badge_type.as_str()).collect();
    assert!(types.contains(&"chocolate_1500"));
    assert!(types.contains(&"super_s"));
    assert!(types.contains(&"bronze_mind"));
    assert!(!types.contains(&"silver_mind"));

    // Re-running the same job awards nothing new.
    run_worker(&pool, vec![practice_job(user_id, day(2026, 5, 4))]).await;
    assert_eq!(
        RewardRepo::count_by_user(&pool, user_id).await.unwrap(),
        held.len() as i64
    );
}

// ---------------------------------------------------------------------------
// Test: Worker refreshes the weekly leaderboard
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn test_worker_refreshes_leaderboard(pool: PgPool) {
    let first = make_student(&pool, "first", COURSE_ABACUS).await;
    let second = make_student(&pool, "second", COURSE_ABACUS).await;
    UserRepo::add_points(&pool, first, 900).await.unwrap();
    UserRepo::add_points(&pool, second, 400).await.unwrap();

    run_worker(&pool, vec![practice_job(first, day(2026, 5, 4))]).await;

    let board = LeaderboardRepo::top(&pool, 10).await.unwrap();
    assert_eq!(board.len(), 2);
    assert_eq!(board[0].rank, Some(1));
    assert_eq!(board[0].total_points, 900);
}

// ---------------------------------------------------------------------------
// Test: Month-close batch awards accuracy and podium badges
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn test_monthly_evaluation_awards_badges(pool: PgPool) {
    let ace = make_student(&pool, "ace", COURSE_ABACUS).await;
    let runner_up = make_student(&pool, "runnerup", COURSE_ABACUS).await;
    UserRepo::add_points(&pool, ace, 5_000).await.unwrap();
    UserRepo::add_points(&pool, runner_up, 2_000).await.unwrap();

    // 28 attempted at ~93% accuracy in April.
    record_session(&pool, ace, day(2026, 4, 10), 13, 1).await;
    record_session(&pool, ace, day(2026, 4, 20), 13, 1).await;
    // Runner-up stays below the accuracy bar.
    record_session(&pool, runner_up, day(2026, 4, 12), 6, 6).await;

    let report = run_monthly_evaluation(&pool, 2026, 4).await.unwrap();
    assert_eq!(report.month, "2026-04");
    assert_eq!(report.accuracy_badges, 1);
    assert_eq!(report.leaderboard_badges, 2);

    let held = RewardRepo::list_by_user(&pool, ace).await.unwrap();
    assert!(held
        .iter()
        .any(|r| r.badge_type == "accuracy_ace" && r.month_earned.as_deref() == Some("2026-04")));
    assert!(held
        .iter()
        .any(|r| r.badge_type == "leaderboard_gold" && r.month_earned.as_deref() == Some("2026-04")));

    // Re-running awards nothing further.
    let rerun = run_monthly_evaluation(&pool, 2026, 4).await.unwrap();
    assert_eq!(rerun.accuracy_badges, 0);
    assert_eq!(rerun.leaderboard_badges, 0);
}

//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` (or any `PgExecutor` for transactional writes)
//! as the first argument.

pub mod attendance_repo;
pub mod leaderboard_repo;
pub mod paper_attempt_repo;
pub mod points_log_repo;
pub mod practice_session_repo;
pub mod profile_repo;
pub mod reward_repo;
pub mod session_repo;
pub mod user_repo;

pub use attendance_repo::AttendanceRepo;
pub use leaderboard_repo::LeaderboardRepo;
pub use paper_attempt_repo::PaperAttemptRepo;
pub use points_log_repo::PointsLogRepo;
pub use practice_session_repo::PracticeSessionRepo;
pub use profile_repo::ProfileRepo;
pub use reward_repo::RewardRepo;
pub use session_repo::SessionRepo;
pub use user_repo::UserRepo;

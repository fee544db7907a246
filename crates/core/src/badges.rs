//! Badge catalog, award rule table, and the evaluator that consumes it.
//!
//! Threshold-style badge families (lifetime volume, the SUPER ladder, and
//! the monthly accuracy set) are one declarative table: each row names the
//! scope it is evaluated under, the metric it reads, the threshold the
//! metric must reach, and the badge it awards. One generic evaluator walks
//! the table; adding a badge means adding a row, not a function.
//!
//! The monthly batch families (attendance, t-shirt, leaderboard podium) are
//! relational rather than threshold checks and keep their own specs, applied
//! by the month-close pass.
//!
//! Everything here is side-effect free. The reward worker evaluates these
//! rules against recomputed metrics and inserts any badge rows that do not
//! exist yet; uniqueness lives in the database, so replaying an evaluation
//! never duplicates an award.

/// Stored values for `rewards.badge_category`.
pub mod category {
    pub const LIFETIME: &str = "lifetime";
    pub const SUPER: &str = "super";
    pub const MONTHLY: &str = "monthly";
    pub const STREAK: &str = "streak";
    pub const ATTENDANCE: &str = "attendance";
    pub const LEADERBOARD: &str = "leaderboard";
}

/// A badge's stable identifier, display name, and category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct BadgeSpec {
    pub badge_type: &'static str,
    pub name: &'static str,
    pub category: &'static str,
}

// ---------------------------------------------------------------------------
// Rule table
// ---------------------------------------------------------------------------

/// When a rule is evaluated and how its award row is keyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleScope {
    /// Checked after every attempt against lifetime aggregates; at most one
    /// award ever.
    Lifetime,
    /// Checked after every attempt against the running point total; at most
    /// one award ever. A single large award can cross several rungs.
    Super,
    /// Checked per completed session and again by the month-close batch; at
    /// most one award per (user, month).
    Month,
}

/// The observable a rule reads. Every rule fires when its metric reads at
/// least the rule's threshold; a metric that is not measurable (no month
/// figures, no baseline) fires nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    /// Lifetime attempted-question count.
    LifetimeQuestions,
    /// Running point total.
    TotalPoints,
    /// The month's accuracy percentage, measurable only once the month has
    /// at least `min_questions` attempted.
    MonthAccuracy { min_questions: i64 },
    /// The month's accuracy minus the previous month's, in percentage
    /// points. Measurable only with a non-zero baseline month.
    MonthImprovement,
}

/// One row of the award table.
#[derive(Debug, Clone, Copy)]
pub struct BadgeRule {
    pub scope: RuleScope,
    pub metric: Metric,
    pub threshold: i64,
    pub badge: BadgeSpec,
}

macro_rules! rule {
    ($scope:ident, $metric:expr, $threshold:expr, $ty:expr, $name:expr, $cat:ident) => {
        BadgeRule {
            scope: RuleScope::$scope,
            metric: $metric,
            threshold: $threshold,
            badge: BadgeSpec {
                badge_type: $ty,
                name: $name,
                category: category::$cat,
            },
        }
    };
}

pub const ACCURACY_ACE: BadgeSpec = BadgeSpec {
    badge_type: "accuracy_ace",
    name: "Accuracy Ace",
    category: category::MONTHLY,
};

pub const PERFECT_PRECISION: BadgeSpec = BadgeSpec {
    badge_type: "perfect_precision",
    name: "Perfect Precision",
    category: category::MONTHLY,
};

pub const COMEBACK_KID: BadgeSpec = BadgeSpec {
    badge_type: "comeback_kid",
    name: "Comeback Kid",
    category: category::MONTHLY,
};

/// The complete threshold-rule table. Super-scope rows ascend by threshold;
/// [`super_progress`] depends on that order.
pub const BADGE_RULES: &[BadgeRule] = &[
    // Lifetime question volume.
    rule!(Lifetime, Metric::LifetimeQuestions, 500, "bronze_mind", "Bronze Mind", LIFETIME),
    rule!(Lifetime, Metric::LifetimeQuestions, 2_000, "silver_mind", "Silver Mind", LIFETIME),
    rule!(Lifetime, Metric::LifetimeQuestions, 5_000, "gold_mind", "Gold Mind", LIFETIME),
    // SUPER program ladder: chocolates alternate with the S-U-P-E-R letters
    // every 1500 points, capped by the mystery gift and the party invite.
    rule!(Super, Metric::TotalPoints, 1_500, "chocolate_1500", "Chocolate (1500 pts)", SUPER),
    rule!(Super, Metric::TotalPoints, 3_000, "super_s", "SUPER Badge - S", SUPER),
    rule!(Super, Metric::TotalPoints, 4_500, "chocolate_4500", "Chocolate (4500 pts)", SUPER),
    rule!(Super, Metric::TotalPoints, 6_000, "super_u", "SUPER Badge - U", SUPER),
    rule!(Super, Metric::TotalPoints, 7_500, "chocolate_7500", "Chocolate (7500 pts)", SUPER),
    rule!(Super, Metric::TotalPoints, 9_000, "super_p", "SUPER Badge - P", SUPER),
    rule!(Super, Metric::TotalPoints, 10_500, "chocolate_10500", "Chocolate (10500 pts)", SUPER),
    rule!(Super, Metric::TotalPoints, 12_000, "super_e", "SUPER Badge - E", SUPER),
    rule!(Super, Metric::TotalPoints, 13_500, "chocolate_13500", "Chocolate (13500 pts)", SUPER),
    rule!(Super, Metric::TotalPoints, 15_000, "super_r", "SUPER Badge - R", SUPER),
    rule!(Super, Metric::TotalPoints, 16_500, "chocolate_16500", "Chocolate (16500 pts)", SUPER),
    rule!(Super, Metric::TotalPoints, 18_000, "mystery_gift", "Mystery Gift", SUPER),
    rule!(Super, Metric::TotalPoints, 19_500, "chocolate_19500", "Chocolate (19500 pts)", SUPER),
    rule!(Super, Metric::TotalPoints, 21_000, "party", "Party", SUPER),
    // Monthly accuracy family.
    BadgeRule {
        scope: RuleScope::Month,
        metric: Metric::MonthAccuracy { min_questions: 10 },
        threshold: 90,
        badge: ACCURACY_ACE,
    },
    BadgeRule {
        scope: RuleScope::Month,
        metric: Metric::MonthAccuracy { min_questions: 5 },
        threshold: 100,
        badge: PERFECT_PRECISION,
    },
    BadgeRule {
        scope: RuleScope::Month,
        metric: Metric::MonthImprovement,
        threshold: 20,
        badge: COMEBACK_KID,
    },
];

// ---------------------------------------------------------------------------
// Batch-pass specs
// ---------------------------------------------------------------------------

pub const MONTHLY_STREAK_CHAMPION: BadgeSpec = BadgeSpec {
    badge_type: "monthly_streak",
    name: "Monthly Streak Champion",
    category: category::STREAK,
};

pub const ATTENDANCE_CHAMPION: BadgeSpec = BadgeSpec {
    badge_type: "attendance_champion",
    name: "Attendance Champion",
    category: category::ATTENDANCE,
};

pub const GOLD_TSHIRT_STAR: BadgeSpec = BadgeSpec {
    badge_type: "gold_tshirt_star",
    name: "Gold T-Shirt Star",
    category: category::ATTENDANCE,
};

/// Leaderboard badges for the month's top three by total points, in rank
/// order.
pub const LEADERBOARD_BADGES: [BadgeSpec; 3] = [
    BadgeSpec {
        badge_type: "leaderboard_gold",
        name: "Leaderboard Champion",
        category: category::LEADERBOARD,
    },
    BadgeSpec {
        badge_type: "leaderboard_silver",
        name: "Leaderboard Runner-up",
        category: category::LEADERBOARD,
    },
    BadgeSpec {
        badge_type: "leaderboard_bronze",
        name: "Leaderboard Third Place",
        category: category::LEADERBOARD,
    },
];

/// Badge types from retired award rules. Rows with these types are purged
/// by the admin maintenance endpoint and never awarded again.
pub const LEGACY_BADGE_TYPES: &[&str] = &["accuracy_king", "perfect_score", "speed_star"];

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// One user's accuracy figures for a single month.
#[derive(Debug, Clone, Copy)]
pub struct MonthlyPerformance {
    /// Questions attempted across the month's completed sessions.
    pub questions_attempted: i64,
    /// Correct answers as a percentage of attempted, 0 to 100.
    pub accuracy_pct: f64,
    /// Prior month's accuracy, `None` when that month had no activity.
    pub previous_accuracy_pct: Option<f64>,
}

/// Snapshot of the observables the rule table reads.
#[derive(Debug, Clone, Copy)]
pub struct BadgeMetrics {
    pub lifetime_questions: i64,
    pub total_points: i64,
    /// Current-month figures; `None` when no session landed this month.
    pub month: Option<MonthlyPerformance>,
}

impl BadgeMetrics {
    /// A view carrying only month figures, for callers that evaluate just
    /// the `Month` scope (the month-close batch).
    pub fn month_only(perf: MonthlyPerformance) -> Self {
        Self {
            lifetime_questions: 0,
            total_points: 0,
            month: Some(perf),
        }
    }
}

/// Read a metric from the snapshot. `None` means not measurable, which
/// never satisfies a rule.
fn metric_value(metrics: &BadgeMetrics, metric: Metric) -> Option<f64> {
    match metric {
        Metric::LifetimeQuestions => Some(metrics.lifetime_questions as f64),
        Metric::TotalPoints => Some(metrics.total_points as f64),
        Metric::MonthAccuracy { min_questions } => metrics
            .month
            .filter(|m| m.questions_attempted >= min_questions)
            .map(|m| m.accuracy_pct),
        // No comparison without a real baseline: a month with no activity
        // (or a zero-accuracy one) would make any score look like a
        // comeback.
        Metric::MonthImprovement => metrics
            .month
            .and_then(|m| m.previous_accuracy_pct.map(|prev| (m, prev)))
            .filter(|(_, prev)| *prev > 0.0)
            .map(|(m, prev)| m.accuracy_pct - prev),
    }
}

/// Walk the rule table for one scope and return every satisfied rule.
pub fn earned_badges(scope: RuleScope, metrics: &BadgeMetrics) -> Vec<&'static BadgeRule> {
    BADGE_RULES
        .iter()
        .filter(|rule| rule.scope == scope)
        .filter(|rule| {
            metric_value(metrics, rule.metric).is_some_and(|v| v >= rule.threshold as f64)
        })
        .collect()
}

/// Read model for the SUPER program progress endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct SuperProgress {
    pub milestones_reached: usize,
    pub next_milestone: Option<&'static BadgeSpec>,
    /// Points still needed for `next_milestone`; `None` once the ladder is
    /// complete.
    pub points_needed: Option<i64>,
}

/// Where a running total stands on the SUPER ladder.
pub fn super_progress(total_points: i64) -> SuperProgress {
    let mut reached = 0;
    for rule in BADGE_RULES.iter().filter(|r| r.scope == RuleScope::Super) {
        if total_points < rule.threshold {
            return SuperProgress {
                milestones_reached: reached,
                next_milestone: Some(&rule.badge),
                points_needed: Some(rule.threshold - total_points),
            };
        }
        reached += 1;
    }
    SuperProgress {
        milestones_reached: reached,
        next_milestone: None,
        points_needed: None,
    }
}

/// Look a threshold badge up by its stable type.
pub fn find_badge(badge_type: &str) -> Option<&'static BadgeSpec> {
    BADGE_RULES
        .iter()
        .find(|rule| rule.badge.badge_type == badge_type)
        .map(|rule| &rule.badge)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn lifetime(questions: i64) -> BadgeMetrics {
        BadgeMetrics {
            lifetime_questions: questions,
            total_points: 0,
            month: None,
        }
    }

    fn points(total: i64) -> BadgeMetrics {
        BadgeMetrics {
            lifetime_questions: 0,
            total_points: total,
            month: None,
        }
    }

    fn month(questions: i64, accuracy: f64, previous: Option<f64>) -> BadgeMetrics {
        BadgeMetrics::month_only(MonthlyPerformance {
            questions_attempted: questions,
            accuracy_pct: accuracy,
            previous_accuracy_pct: previous,
        })
    }

    fn types(earned: &[&BadgeRule]) -> Vec<&'static str> {
        earned.iter().map(|r| r.badge.badge_type).collect()
    }

    // -- lifetime ladder -------------------------------------------------

    #[test]
    fn lifetime_badges_by_threshold() {
        assert!(earned_badges(RuleScope::Lifetime, &lifetime(499)).is_empty());
        assert_eq!(
            types(&earned_badges(RuleScope::Lifetime, &lifetime(500))),
            vec!["bronze_mind"]
        );
        assert_eq!(earned_badges(RuleScope::Lifetime, &lifetime(2_000)).len(), 2);
        assert_eq!(earned_badges(RuleScope::Lifetime, &lifetime(5_000)).len(), 3);
    }

    // -- SUPER ladder ----------------------------------------------------

    #[test]
    fn super_rules_are_ascending() {
        let rungs: Vec<i64> = BADGE_RULES
            .iter()
            .filter(|r| r.scope == RuleScope::Super)
            .map(|r| r.threshold)
            .collect();
        assert_eq!(rungs.len(), 14);
        for pair in rungs.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn super_milestones_reached_at_totals() {
        assert!(earned_badges(RuleScope::Super, &points(1_499)).is_empty());
        assert_eq!(earned_badges(RuleScope::Super, &points(1_500)).len(), 1);
        assert_eq!(earned_badges(RuleScope::Super, &points(3_000)).len(), 2);
        // One big award can cross several rungs.
        assert_eq!(
            types(&earned_badges(RuleScope::Super, &points(7_000))),
            vec!["chocolate_1500", "super_s", "chocolate_4500", "super_u"]
        );
        assert_eq!(earned_badges(RuleScope::Super, &points(21_000)).len(), 14);
    }

    #[test]
    fn super_progress_tracks_next_rung() {
        let start = super_progress(0);
        assert_eq!(start.milestones_reached, 0);
        assert_eq!(start.points_needed, Some(1_500));

        let mid = super_progress(3_100);
        assert_eq!(mid.milestones_reached, 2);
        assert_eq!(
            mid.next_milestone.map(|b| b.badge_type),
            Some("chocolate_4500")
        );
        assert_eq!(mid.points_needed, Some(1_400));
    }

    #[test]
    fn super_progress_complete_has_no_next() {
        let done = super_progress(25_000);
        assert_eq!(done.milestones_reached, 14);
        assert!(done.next_milestone.is_none());
        assert!(done.points_needed.is_none());
    }

    // -- monthly accuracy rules ------------------------------------------

    #[test]
    fn accuracy_ace_needs_volume_and_precision() {
        let earned = earned_badges(RuleScope::Month, &month(10, 90.0, None));
        assert!(types(&earned).contains(&"accuracy_ace"));
        assert!(earned_badges(RuleScope::Month, &month(9, 95.0, None)).is_empty());
        assert!(earned_badges(RuleScope::Month, &month(20, 89.9, None)).is_empty());
    }

    #[test]
    fn perfect_precision_requires_flawless_month() {
        let earned = earned_badges(RuleScope::Month, &month(5, 100.0, None));
        assert!(types(&earned).contains(&"perfect_precision"));
        // 100% on too few questions does not count.
        let earned = earned_badges(RuleScope::Month, &month(4, 100.0, None));
        assert!(!types(&earned).contains(&"perfect_precision"));
    }

    #[test]
    fn comeback_kid_requires_real_baseline() {
        assert!(earned_badges(RuleScope::Month, &month(8, 85.0, None)).is_empty());
        assert!(earned_badges(RuleScope::Month, &month(8, 85.0, Some(0.0))).is_empty());

        let earned = earned_badges(RuleScope::Month, &month(8, 80.0, Some(55.0)));
        assert!(types(&earned).contains(&"comeback_kid"));

        // Exactly twenty percentage points counts; less does not.
        let earned = earned_badges(RuleScope::Month, &month(8, 75.0, Some(55.0)));
        assert!(types(&earned).contains(&"comeback_kid"));
        let earned = earned_badges(RuleScope::Month, &month(8, 70.0, Some(55.0)));
        assert!(!types(&earned).contains(&"comeback_kid"));
    }

    #[test]
    fn strong_month_can_earn_all_three() {
        let earned = earned_badges(RuleScope::Month, &month(12, 100.0, Some(60.0)));
        assert_eq!(earned.len(), 3);
    }

    #[test]
    fn month_scope_ignores_aggregate_metrics() {
        // High aggregates alone satisfy nothing in the Month scope.
        let metrics = BadgeMetrics {
            lifetime_questions: 10_000,
            total_points: 25_000,
            month: None,
        };
        assert!(earned_badges(RuleScope::Month, &metrics).is_empty());
    }

    // -- catalog ---------------------------------------------------------

    #[test]
    fn catalog_types_are_unique() {
        let mut types: Vec<&str> = BADGE_RULES
            .iter()
            .map(|r| r.badge.badge_type)
            .chain(LEADERBOARD_BADGES.iter().map(|b| b.badge_type))
            .chain([
                MONTHLY_STREAK_CHAMPION.badge_type,
                ATTENDANCE_CHAMPION.badge_type,
                GOLD_TSHIRT_STAR.badge_type,
            ])
            .collect();
        let before = types.len();
        types.sort_unstable();
        types.dedup();
        assert_eq!(types.len(), before);
    }

    #[test]
    fn find_badge_resolves_table_rows() {
        assert_eq!(find_badge("super_s").map(|b| b.name), Some("SUPER Badge - S"));
        assert_eq!(find_badge("bronze_mind").map(|b| b.category), Some(category::LIFETIME));
        assert!(find_badge("no_such_badge").is_none());
    }
}

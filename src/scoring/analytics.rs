// src/scoring/analytics.rs

//! Aggregates over stored attempts.
//!
//! Two averaging formulas coexist on purpose:
//! * the admin views use the unweighted mean of per-attempt percentages
//!   (`mean_percentage`);
//! * the student dashboard uses the weighted ratio `sum(score) / sum(total)`
//!   (`weighted_average`).
//!
//! They differ whenever attempts have different totals.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::{
    models::{
        quiz::Quiz,
        result::{ResultRecord, ResultView},
    },
    scoring::{percentage, round_to},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Excellent,
    Good,
    Poor,
}

/// Lower bounds (inclusive, in percent) of the excellent and good tiers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierPolicy {
    pub excellent: f64,
    pub good: f64,
}

impl TierPolicy {
    /// Used by the admin analysis page.
    pub const ADMIN: TierPolicy = TierPolicy {
        excellent: 80.0,
        good: 50.0,
    };

    /// Used by a student's own results page.
    pub const STUDENT: TierPolicy = TierPolicy {
        excellent: 80.0,
        good: 60.0,
    };

    pub fn classify(&self, pct: f64) -> Tier {
        if pct >= self.excellent {
            Tier::Excellent
        } else if pct >= self.good {
            Tier::Good
        } else {
            Tier::Poor
        }
    }
}

/// Tier counts and mean score of a set of results.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AnalyticsSummary {
    pub total_results: usize,
    pub excellent_count: usize,
    pub good_count: usize,
    pub poor_count: usize,
    /// Mean of per-result percentages divided by 100, in `[0, 1]`.
    pub average_fraction: f64,
}

struct Tally {
    policy: TierPolicy,
    count: usize,
    excellent: usize,
    good: usize,
    poor: usize,
    pct_sum: f64,
}

impl Tally {
    fn new(policy: TierPolicy) -> Self {
        Self {
            policy,
            count: 0,
            excellent: 0,
            good: 0,
            poor: 0,
            pct_sum: 0.0,
        }
    }

    fn push(&mut self, record: &ResultRecord) {
        let pct = percentage(record.score, record.total);
        self.count += 1;
        self.pct_sum += pct;
        match self.policy.classify(pct) {
            Tier::Excellent => self.excellent += 1,
            Tier::Good => self.good += 1,
            Tier::Poor => self.poor += 1,
        }
    }

    fn finish(self) -> AnalyticsSummary {
        let average_fraction = if self.count > 0 {
            self.pct_sum / self.count as f64 / 100.0
        } else {
            0.0
        };

        AnalyticsSummary {
            total_results: self.count,
            excellent_count: self.excellent,
            good_count: self.good,
            poor_count: self.poor,
            average_fraction,
        }
    }
}

/// Buckets results into tiers under `policy` and averages their percentages.
pub fn aggregate<'a, I>(results: I, policy: TierPolicy) -> AnalyticsSummary
where
    I: IntoIterator<Item = &'a ResultRecord>,
{
    let mut tally = Tally::new(policy);
    for record in results {
        tally.push(record);
    }
    tally.finish()
}

/// Unweighted mean of per-result percentages; 0 for no results.
pub fn mean_percentage<'a, I>(results: I) -> f64
where
    I: IntoIterator<Item = &'a ResultRecord>,
{
    let (sum, count) = results
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), r| (sum + percentage(r.score, r.total), count + 1));

    if count > 0 { sum / count as f64 } else { 0.0 }
}

/// Unweighted mean percentage of the results belonging to `quiz_id`.
pub fn per_quiz_average<'a, I>(quiz_id: i64, results: I) -> f64
where
    I: IntoIterator<Item = &'a ResultRecord>,
{
    mean_percentage(results.into_iter().filter(|r| r.quiz_id == quiz_id))
}

/// One bar of the admin "average score per quiz" chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuizAverage {
    pub quiz_id: i64,
    pub title: String,
    /// Percent, rounded to 2 decimals; 0 when the quiz has no results.
    pub average: f64,
}

/// Per-quiz unweighted averages, one entry per quiz in the given order.
pub fn quiz_averages(quizzes: &[Quiz], results: &[ResultRecord]) -> Vec<QuizAverage> {
    let mut sums: HashMap<i64, (f64, usize)> = HashMap::new();
    for r in results {
        let entry = sums.entry(r.quiz_id).or_insert((0.0, 0));
        entry.0 += percentage(r.score, r.total);
        entry.1 += 1;
    }

    quizzes
        .iter()
        .map(|quiz| {
            let average = match sums.get(&quiz.id) {
                Some(&(sum, count)) if count > 0 => sum / count as f64,
                _ => 0.0,
            };
            QuizAverage {
                quiz_id: quiz.id,
                title: quiz.title.clone(),
                average: round_to(average, 2),
            }
        })
        .collect()
}

#[derive(Debug, Default, Clone, Copy)]
struct WeightedSum {
    attempts: usize,
    score: i64,
    total: i64,
}

impl WeightedSum {
    fn push(&mut self, record: &ResultRecord) {
        self.attempts += 1;
        self.score += record.score;
        self.total += record.total;
    }

    fn average(&self) -> f64 {
        if self.total > 0 {
            round_to(self.score as f64 / self.total as f64 * 100.0, 1)
        } else {
            0.0
        }
    }
}

/// `sum(score) / sum(total) * 100`, rounded to 1 decimal; 0 when the
/// totals sum to 0.
pub fn weighted_average<'a, I>(results: I) -> f64
where
    I: IntoIterator<Item = &'a ResultRecord>,
{
    let mut sum = WeightedSum::default();
    for record in results {
        sum.push(record);
    }
    sum.average()
}

/// Weighted average of one student's attempts on one quiz.
pub fn per_student_quiz_average<'a, I>(student_id: i64, quiz_id: i64, results: I) -> f64
where
    I: IntoIterator<Item = &'a ResultRecord>,
{
    weighted_average(
        results
            .into_iter()
            .filter(|r| r.student_id == student_id && r.quiz_id == quiz_id),
    )
}

/// Number of distinct quiz titles among the results. Two quizzes sharing
/// a title count once.
pub fn unique_quiz_count<'a, I>(views: I) -> usize
where
    I: IntoIterator<Item = &'a ResultView>,
{
    views
        .into_iter()
        .map(|v| v.quiz_title.as_str())
        .collect::<HashSet<_>>()
        .len()
}

/// A student's standing on one quiz.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuizProgress {
    pub quiz_id: i64,
    pub title: String,
    pub description: String,
    pub attempts: usize,
    /// Weighted average percent, 1 decimal.
    pub average: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentDashboard {
    pub quizzes: Vec<QuizProgress>,
    pub overall_average: f64,
    pub total_attempts: usize,
}

/// Builds the student dashboard from all quizzes and that student's results.
pub fn student_dashboard(quizzes: &[Quiz], student_results: &[ResultRecord]) -> StudentDashboard {
    let mut per_quiz: HashMap<i64, WeightedSum> = HashMap::new();
    let mut overall = WeightedSum::default();

    for record in student_results {
        per_quiz.entry(record.quiz_id).or_default().push(record);
        overall.push(record);
    }

    let progress: Vec<QuizProgress> = quizzes
        .iter()
        .map(|quiz| {
            let sum = per_quiz.get(&quiz.id).copied().unwrap_or_default();
            QuizProgress {
                quiz_id: quiz.id,
                title: quiz.title.clone(),
                description: quiz.description.clone(),
                attempts: sum.attempts,
                average: sum.average(),
            }
        })
        .collect();

    let total_attempts = progress.iter().map(|p| p.attempts).sum();

    StudentDashboard {
        quizzes: progress,
        overall_average: overall.average(),
        total_attempts,
    }
}

/// Student results page figures: tiers under `TierPolicy::STUDENT` plus
/// the number of distinct quizzes attempted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StudentResultsSummary {
    #[serde(flatten)]
    pub summary: AnalyticsSummary,
    pub unique_quizzes: usize,
}

pub fn student_results_summary(views: &[ResultView]) -> StudentResultsSummary {
    StudentResultsSummary {
        summary: aggregate(views.iter().map(|v| &v.record), TierPolicy::STUDENT),
        unique_quizzes: unique_quiz_count(views),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn record(id: i64, quiz_id: i64, score: i64, total: i64) -> ResultRecord {
        ResultRecord {
            id,
            student_id: 1,
            quiz_id,
            score,
            total,
            taken_at: Utc::now(),
        }
    }

    fn view(id: i64, quiz_id: i64, title: &str) -> ResultView {
        ResultView {
            record: record(id, quiz_id, 1, 2),
            quiz_title: title.to_string(),
            student_username: "student".to_string(),
        }
    }

    #[test]
    fn test_per_quiz_average_ignores_other_quizzes() {
        let results = vec![record(1, 1, 1, 2), record(2, 1, 2, 2), record(3, 2, 0, 4)];

        assert_eq!(per_quiz_average(1, &results), 75.0);
        assert_eq!(per_quiz_average(2, &results), 0.0);
        assert_eq!(per_quiz_average(9, &results), 0.0);
    }

    #[test]
    fn test_unique_quiz_count() {
        assert_eq!(unique_quiz_count(&Vec::<ResultView>::new()), 0);

        let views = vec![view(1, 1, "Algebra"), view(2, 1, "Algebra"), view(3, 2, "Geometry")];
        assert_eq!(unique_quiz_count(&views), 2);
    }

    #[test]
    fn test_student_results_summary_counts_titles() {
        let views = vec![view(1, 1, "Algebra"), view(2, 2, "Algebra"), view(3, 3, "Geometry")];

        let summary = student_results_summary(&views);
        assert_eq!(summary.unique_quizzes, 2);
        assert_eq!(summary.summary.total_results, 3);
        assert_eq!(summary.summary.poor_count, 3);
    }
}

// src/interview/analytics.rs
//! Aggregates over a user's completed interviews.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::HashMap;

use super::types::InterviewRecord;

const TOP_ITEMS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformancePoint {
    pub date: DateTime<Utc>,
    pub score: u8,
    pub interview: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryScore {
    pub category: String,
    pub score: u8,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Count {
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryAnalytics {
    pub total_interviews: usize,
    pub average_score: u8,
    pub latest_score: u8,
    pub score_change: i32,
    pub total_practice_hours: f64,
    pub performance: Vec<PerformancePoint>,
    pub categories: Vec<CategoryScore>,
    pub job_roles: Vec<Count>,
    pub top_strengths: Vec<Count>,
    pub top_weaknesses: Vec<Count>,
}

/// Start of a window covering the last `days` days. `None` when `days` is not
/// positive or reaches past the representable calendar.
pub fn window_start(days: i64, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    if days <= 0 {
        return None;
    }
    now.checked_sub_signed(Duration::try_days(days)?)
}

pub fn compute(records: &[InterviewRecord]) -> HistoryAnalytics {
    let mut ordered: Vec<&InterviewRecord> = records.iter().collect();
    ordered.sort_by_key(|r| r.completed_at);

    let total = ordered.len();
    let average_score = if total == 0 {
        0
    } else {
        let sum: u32 = ordered.iter().map(|r| r.overall_score as u32).sum();
        (sum as f64 / total as f64).round() as u8
    };

    let latest_score = ordered.last().map(|r| r.overall_score).unwrap_or(0);
    let previous_score = if total > 1 {
        ordered[total - 2].overall_score
    } else {
        latest_score
    };

    let total_seconds: u64 = ordered.iter().map(|r| r.time_elapsed).sum();
    let total_practice_hours = (total_seconds as f64 / 3600.0 * 10.0).round() / 10.0;

    let performance = ordered
        .iter()
        .enumerate()
        .map(|(i, r)| PerformancePoint {
            date: r.completed_at,
            score: r.overall_score,
            interview: i + 1,
        })
        .collect();

    HistoryAnalytics {
        total_interviews: total,
        average_score,
        latest_score,
        score_change: latest_score as i32 - previous_score as i32,
        total_practice_hours,
        performance,
        categories: category_scores(&ordered),
        job_roles: ranked(ordered.iter().map(|r| r.job_role.as_str()), usize::MAX),
        top_strengths: ranked(
            ordered
                .iter()
                .flat_map(|r| r.analyses.iter())
                .flat_map(|a| a.strengths.iter().map(String::as_str)),
            TOP_ITEMS,
        ),
        top_weaknesses: ranked(
            ordered
                .iter()
                .flat_map(|r| r.analyses.iter())
                .flat_map(|a| a.weaknesses.iter().map(String::as_str)),
            TOP_ITEMS,
        ),
    }
}

/// Average analysis score per question category. A question without a
/// matching analysis counts as zero.
fn category_scores(records: &[&InterviewRecord]) -> Vec<CategoryScore> {
    let mut scores: HashMap<&str, Vec<u8>> = HashMap::new();
    for record in records {
        for (i, question) in record.questions.iter().enumerate() {
            let score = record.analyses.get(i).map(|a| a.score).unwrap_or(0);
            scores
                .entry(question.category.as_str())
                .or_default()
                .push(score);
        }
    }

    let mut categories: Vec<CategoryScore> = scores
        .into_iter()
        .map(|(category, values)| {
            let sum: u32 = values.iter().map(|s| *s as u32).sum();
            CategoryScore {
                category: category.to_string(),
                score: (sum as f64 / values.len() as f64).round() as u8,
                count: values.len(),
            }
        })
        .collect();
    categories.sort_by(|a, b| a.category.cmp(&b.category));
    categories
}

/// Frequency count, most frequent first, ties by label.
fn ranked<'a>(items: impl Iterator<Item = &'a str>, limit: usize) -> Vec<Count> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for item in items {
        *counts.entry(item).or_default() += 1;
    }
    let mut ranked: Vec<Count> = counts
        .into_iter()
        .map(|(label, count)| Count {
            label: label.to_string(),
            count,
        })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    ranked.truncate(limit);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interview::scorer;
    use crate::interview::types::GeneratedQuestion;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn record(day: u32, role: &str, overall: u8, secs: u64, turns: &[(&str, &str)]) -> InterviewRecord {
        let questions = turns
            .iter()
            .map(|(category, _)| GeneratedQuestion {
                question: "q".into(),
                question_type: Default::default(),
                category: category.to_string(),
                expected_duration: 3,
                difficulty: "Entry Level".into(),
                actual_difficulty: "Mid Level".into(),
                context: String::new(),
                bank_id: None,
            })
            .collect();
        let analyses = turns
            .iter()
            .map(|(_, answer)| scorer::analyze(answer, role, "Entry Level"))
            .collect();
        InterviewRecord {
            id: Uuid::new_v4(),
            user_id: "u1".into(),
            job_role: role.into(),
            difficulty: "Entry Level".into(),
            questions,
            answers: turns.iter().map(|(_, a)| a.to_string()).collect(),
            analyses,
            time_elapsed: secs,
            completed_at: Utc.with_ymd_and_hms(2024, 5, day, 12, 0, 0).unwrap(),
            overall_score: overall,
            interview_summary: None,
        }
    }

    #[test]
    fn test_empty_history() {
        let analytics = compute(&[]);
        assert_eq!(analytics.total_interviews, 0);
        assert_eq!(analytics.average_score, 0);
        assert_eq!(analytics.latest_score, 0);
        assert_eq!(analytics.score_change, 0);
        assert_eq!(analytics.total_practice_hours, 0.0);
        assert!(analytics.categories.is_empty());
    }

    #[test]
    fn test_scores_follow_completion_order() {
        // stored out of order on purpose
        let records = vec![
            record(3, "Software Engineer", 80, 1800, &[("Technical", "yes")]),
            record(1, "Software Engineer", 61, 1500, &[("Technical", "yes")]),
            record(2, "Product Manager", 70, 1200, &[("Behavioral", "yes")]),
        ];
        let analytics = compute(&records);
        assert_eq!(analytics.total_interviews, 3);
        assert_eq!(analytics.average_score, 70);
        assert_eq!(analytics.latest_score, 80);
        assert_eq!(analytics.score_change, 10);
        assert_eq!(analytics.total_practice_hours, 1.3);
        assert_eq!(analytics.performance[0].score, 61);
        assert_eq!(analytics.performance[2].interview, 3);
        assert_eq!(
            analytics.job_roles[0],
            Count {
                label: "Software Engineer".into(),
                count: 2
            }
        );
    }

    #[test]
    fn test_category_scores_and_missing_analysis() {
        let mut r = record(1, "Software Engineer", 50, 60, &[("Technical", "yes"), ("Behavioral", "yes")]);
        r.analyses.truncate(1);
        let analytics = compute(&[r]);
        assert_eq!(
            analytics.categories,
            vec![
                CategoryScore {
                    category: "Behavioral".into(),
                    score: 0,
                    count: 1
                },
                CategoryScore {
                    category: "Technical".into(),
                    score: 30,
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn test_top_weaknesses_capped_at_five() {
        let analytics = compute(&[record(1, "Software Engineer", 30, 60, &[("Technical", "yes"), ("Technical", "no")])]);
        assert_eq!(analytics.top_weaknesses.len(), 5);
        assert!(analytics.top_weaknesses.iter().all(|c| c.count == 2));
        assert_eq!(analytics.top_strengths[0].label, "Attempted to answer the question");
    }

    #[test]
    fn test_window_start() {
        let now = Utc.with_ymd_and_hms(2024, 5, 25, 0, 0, 0).unwrap();
        assert_eq!(
            window_start(7, now),
            Some(Utc.with_ymd_and_hms(2024, 5, 18, 0, 0, 0).unwrap())
        );
        assert_eq!(window_start(0, now), None);
        assert_eq!(window_start(-3, now), None);
        assert_eq!(window_start(200_000_000, now), None);
        assert_eq!(window_start(i64::MAX, now), None);
    }
}

// src/interview/summary.rs
//! Canned interview summary used when the language model cannot produce one.

use super::types::{AnswerAnalysis, InterviewSummary};

/// Overall score reported when no answer was analysed.
pub const DEFAULT_OVERALL_SCORE: u8 = 75;

pub fn average_score(analyses: &[AnswerAnalysis]) -> Option<f64> {
    if analyses.is_empty() {
        return None;
    }
    let total: u32 = analyses.iter().map(|a| a.score as u32).sum();
    Some(total as f64 / analyses.len() as f64)
}

/// Rounded mean of the analysis scores.
pub fn overall_score(analyses: &[AnswerAnalysis]) -> u8 {
    average_score(analyses)
        .map(|avg| avg.round() as u8)
        .unwrap_or(DEFAULT_OVERALL_SCORE)
}

pub fn fallback_summary(job_role: &str, analyses: &[AnswerAnalysis]) -> InterviewSummary {
    let average = average_score(analyses).unwrap_or(0.0);
    let on_track = average >= 80.0;
    let readiness = average.round() as u8;

    InterviewSummary {
        overall_feedback: format!(
            "Your {} interview performance averaged {}%. While you demonstrated some relevant knowledge, there are significant areas that need improvement before you'll be competitive for top-tier positions.",
            job_role, readiness
        ),
        key_strengths: vec![
            "Basic understanding of concepts".to_string(),
            "Willingness to attempt difficult questions".to_string(),
        ],
        critical_improvements: vec![
            "Add specific examples with metrics".to_string(),
            "Demonstrate deeper technical knowledge".to_string(),
            "Practice structured problem-solving".to_string(),
        ],
        readiness_score: readiness,
        next_steps: vec![
            "Spend 2-3 months practicing with real interview questions".to_string(),
            "Build portfolio of concrete examples with measurable outcomes".to_string(),
            "Study advanced concepts specific to your target role".to_string(),
            "Practice mock interviews with experienced professionals".to_string(),
        ],
        reality_check: Some(if on_track {
            "You're on the right track but need more practice".to_string()
        } else {
            "Significant preparation needed before interviewing at competitive companies"
                .to_string()
        }),
        industry_comparison: Some(if on_track {
            "Above average but room for improvement".to_string()
        } else {
            "Below industry standards for competitive roles".to_string()
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interview::scorer;

    fn with_scores(scores: &[u8]) -> Vec<AnswerAnalysis> {
        scores
            .iter()
            .map(|s| {
                let mut a = scorer::analyze("yes", "Software Engineer", "Entry Level");
                a.score = *s;
                a
            })
            .collect()
    }

    #[test]
    fn test_readiness_is_rounded_mean() {
        let analyses = with_scores(&[30, 45, 62, 71, 80]);
        let summary = fallback_summary("Software Engineer", &analyses);
        assert_eq!(summary.readiness_score, 58);
        assert!(summary.overall_feedback.contains("averaged 58%"));
        assert_eq!(
            summary.industry_comparison.as_deref(),
            Some("Below industry standards for competitive roles")
        );
    }

    #[test]
    fn test_strong_average_changes_reality_check() {
        let summary = fallback_summary("Data Scientist", &with_scores(&[85, 90]));
        assert_eq!(summary.readiness_score, 88);
        assert_eq!(
            summary.reality_check.as_deref(),
            Some("You're on the right track but need more practice")
        );
    }

    #[test]
    fn test_feedback_percentage_matches_readiness_on_ties() {
        let summary = fallback_summary("Software Engineer", &with_scores(&[70, 71]));
        assert_eq!(summary.readiness_score, 71);
        assert!(summary.overall_feedback.contains("averaged 71%"));
    }

    #[test]
    fn test_overall_score_defaults_without_analyses() {
        assert_eq!(overall_score(&[]), DEFAULT_OVERALL_SCORE);
        assert_eq!(overall_score(&with_scores(&[70, 71])), 71);
        assert_eq!(fallback_summary("Software Engineer", &[]).readiness_score, 0);
    }
}

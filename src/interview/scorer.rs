// src/interview/scorer.rs
//! Rule-based answer scoring used whenever the language model is unavailable.
//!
//! The score is a pure function of the answer text and the role: surface
//! features add or subtract fixed weights from a base of 50, and the result is
//! clamped to [`MIN_SCORE`, `MAX_SCORE`]. The textual parts of the analysis come
//! from small rule tables keyed on the same features and the score band.

use super::contains_any;
use super::types::{AnalysisSource, AnswerAnalysis, NextDirection};

pub const BASE_SCORE: i32 = 50;
pub const MIN_SCORE: u8 = 30;
pub const MAX_SCORE: u8 = 95;

const VAGUE_PHRASES: [&str; 4] = ["it depends", "i think", "maybe", "probably"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleFamily {
    Engineering,
    Product,
    Data,
    General,
}

impl RoleFamily {
    pub fn of(role: &str) -> Self {
        if role.contains("Engineer") {
            RoleFamily::Engineering
        } else if role.contains("Product") {
            RoleFamily::Product
        } else if role.contains("Data") {
            RoleFamily::Data
        } else {
            RoleFamily::General
        }
    }

    pub fn industry_terms(&self) -> &'static [&'static str] {
        match self {
            RoleFamily::Engineering => &[
                "scalability",
                "architecture",
                "performance",
                "optimization",
                "microservices",
                "api",
            ],
            RoleFamily::Product => &[
                "metrics",
                "kpi",
                "user experience",
                "roadmap",
                "stakeholder",
                "mvp",
            ],
            RoleFamily::Data => &[
                "model",
                "algorithm",
                "statistical",
                "hypothesis",
                "correlation",
                "regression",
            ],
            RoleFamily::General => &[],
        }
    }

    fn suggestions(&self) -> &'static [&'static str] {
        match self {
            RoleFamily::Engineering => &[
                "Practice system design problems and architectural thinking",
                "Prepare examples of complex technical challenges you've solved",
            ],
            RoleFamily::Product => &[
                "Prepare examples of data-driven product decisions",
                "Practice explaining complex trade-offs and prioritization frameworks",
            ],
            RoleFamily::Data => &[
                "Prepare examples of end-to-end data science projects",
                "Practice explaining technical concepts to non-technical audiences",
            ],
            RoleFamily::General => &[],
        }
    }
}

/// Surface features of one answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerFeatures {
    /// Length of the trimmed answer, in characters.
    pub length: usize,
    pub has_examples: bool,
    pub has_specifics: bool,
    pub has_methodology: bool,
    pub shows_depth: bool,
    pub uses_industry_terms: bool,
    pub says_it_depends: bool,
    pub says_i_think: bool,
    pub mentions_example: bool,
    pub is_vague: bool,
}

impl AnswerFeatures {
    pub fn extract(answer: &str, role: &str) -> Self {
        let lower = answer.to_lowercase();
        Self {
            length: answer.trim().chars().count(),
            has_examples: contains_any(&lower, &["example", "experience"]),
            has_specifics: answer.chars().any(|c| c.is_ascii_digit())
                || answer.contains('%')
                || answer.contains('$'),
            has_methodology: contains_any(&lower, &["approach", "process", "method"]),
            shows_depth: answer.split('.').count() > 3,
            uses_industry_terms: contains_any(&lower, RoleFamily::of(role).industry_terms()),
            says_it_depends: lower.contains("it depends"),
            says_i_think: lower.contains("i think"),
            mentions_example: lower.contains("example"),
            is_vague: contains_any(&lower, &VAGUE_PHRASES),
        }
    }
}

/// Contribution of answer length alone.
pub fn length_adjustment(length: usize) -> i32 {
    if length > 300 {
        15
    } else if length > 150 {
        10
    } else if length < 50 {
        -20
    } else {
        0
    }
}

/// Score before clamping.
pub fn raw_score(features: &AnswerFeatures) -> i32 {
    let mut score = BASE_SCORE + length_adjustment(features.length);

    if features.has_examples {
        score += 15;
    }
    if features.has_specifics {
        score += 10;
    }
    if features.has_methodology {
        score += 10;
    }
    if features.shows_depth {
        score += 10;
    }
    if features.uses_industry_terms {
        score += 10;
    }

    if features.says_it_depends && features.length < 100 {
        score -= 10;
    }
    if features.says_i_think && !features.has_examples {
        score -= 5;
    }

    score
}

pub fn heuristic_score(features: &AnswerFeatures) -> u8 {
    raw_score(features).clamp(MIN_SCORE as i32, MAX_SCORE as i32) as u8
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    Strong,
    Adequate,
    Weak,
    Gaps,
    NotReady,
}

impl ScoreBand {
    pub fn of(score: u8) -> Self {
        match score {
            85.. => ScoreBand::Strong,
            75..=84 => ScoreBand::Adequate,
            65..=74 => ScoreBand::Weak,
            50..=64 => ScoreBand::Gaps,
            _ => ScoreBand::NotReady,
        }
    }

    fn feedback_opening(&self) -> &'static str {
        match self {
            ScoreBand::Strong => "Strong response that demonstrates good understanding.",
            ScoreBand::Adequate => "Adequate response that covers the basics.",
            ScoreBand::Weak => "Weak response with significant gaps.",
            ScoreBand::Gaps | ScoreBand::NotReady => {
                "Poor response that doesn't meet expectations."
            }
        }
    }

    pub fn reality_check(&self) -> &'static str {
        match self {
            ScoreBand::Strong => {
                "Strong performance - you're demonstrating the depth expected for this role."
            }
            ScoreBand::Adequate => {
                "Decent answer, but top companies will expect more depth and specific examples."
            }
            ScoreBand::Weak => "Your answer shows basic understanding, but lacks the sophistication needed for competitive roles.",
            ScoreBand::Gaps => "Significant gaps evident. You'll need substantial preparation before interviewing at target companies.",
            ScoreBand::NotReady => "This response suggests you may not be ready for this level of role. Consider focusing on fundamentals first.",
        }
    }
}

/// Features plus the final score, the input every rule sees.
struct Judged<'a> {
    features: &'a AnswerFeatures,
    score: u8,
}

struct Rule {
    applies: fn(&Judged) -> bool,
    text: &'static str,
}

const FEEDBACK_RULES: &[Rule] = &[
    Rule {
        applies: |j| !j.features.has_examples,
        text: "Your answer lacks concrete examples, which makes it difficult to assess your actual experience.",
    },
    Rule {
        applies: |j| !j.features.has_specifics,
        text: "You need to include specific metrics, numbers, or technical details to demonstrate depth.",
    },
    Rule {
        applies: |j| !j.features.shows_depth,
        text: "Your response is too surface-level for this type of question.",
    },
    Rule {
        applies: |j| j.features.length < 100,
        text: "Your answer is too brief - interviewers expect more comprehensive responses.",
    },
];

const STRENGTH_RULES: &[Rule] = &[
    Rule {
        applies: |j| j.features.has_examples,
        text: "Provided concrete examples",
    },
    Rule {
        applies: |j| j.features.has_specifics,
        text: "Included specific details and metrics",
    },
    Rule {
        applies: |j| j.features.has_methodology,
        text: "Described systematic approach",
    },
    Rule {
        applies: |j| j.features.uses_industry_terms,
        text: "Used appropriate technical terminology",
    },
    Rule {
        applies: |j| j.features.length > 200,
        text: "Comprehensive response",
    },
];

const WEAKNESS_RULES: &[Rule] = &[
    Rule {
        applies: |j| !j.features.has_examples,
        text: "No concrete examples provided",
    },
    Rule {
        applies: |j| !j.features.has_specifics,
        text: "Lacks specific metrics or details",
    },
    Rule {
        applies: |j| !j.features.shows_depth,
        text: "Response too surface-level",
    },
    Rule {
        applies: |j| j.features.length < 100,
        text: "Answer too brief for the question complexity",
    },
    Rule {
        applies: |j| j.score < 70,
        text: "Doesn't demonstrate required depth of knowledge",
    },
    Rule {
        applies: |j| j.features.is_vague,
        text: "Too many vague or uncertain statements",
    },
];

const SUGGESTION_RULES: &[Rule] = &[
    Rule {
        applies: |j| j.score < 70,
        text: "Study fundamental concepts more deeply before interviewing",
    },
    Rule {
        applies: |j| !j.features.mentions_example,
        text: "Prepare 3-5 detailed STAR method examples for different scenarios",
    },
    Rule {
        applies: |j| j.features.length < 150,
        text: "Practice giving more comprehensive answers (2-3 minutes speaking time)",
    },
];

const CLOSING_SUGGESTIONS: [&str; 2] = [
    "Research the company and role-specific challenges",
    "Practice with mock interviews to improve confidence and delivery",
];

fn matching(rules: &[Rule], judged: &Judged) -> Vec<String> {
    rules
        .iter()
        .filter(|rule| (rule.applies)(judged))
        .map(|rule| rule.text.to_string())
        .collect()
}

/// What the industry expects at a given role and selected level.
pub fn industry_standard(role: &str, difficulty: &str) -> &'static str {
    match (role, difficulty) {
        ("Software Engineer", "Entry Level") => "Entry-level engineers should demonstrate solid coding fundamentals, basic system design understanding, and ability to learn quickly.",
        ("Software Engineer", "Mid Level") => "Mid-level engineers must show system design skills, leadership potential, and ability to handle complex technical challenges independently.",
        ("Software Engineer", "Senior Level") => "Senior engineers need to demonstrate architectural thinking, mentorship capabilities, and ability to drive technical strategy.",
        ("Product Manager", "Entry Level") => "Entry-level PMs should show analytical thinking, user empathy, and basic understanding of product development lifecycle.",
        ("Product Manager", "Mid Level") => "Mid-level PMs must demonstrate strategic thinking, stakeholder management, and ability to drive product decisions with data.",
        ("Product Manager", "Senior Level") => "Senior PMs need to show vision-setting abilities, cross-functional leadership, and deep market understanding.",
        ("Data Scientist", "Entry Level") => "Entry-level data scientists should demonstrate statistical knowledge, programming skills, and ability to derive insights from data.",
        ("Data Scientist", "Mid Level") => "Mid-level data scientists must show advanced modeling skills, business acumen, and ability to deploy production systems.",
        ("Data Scientist", "Senior Level") => "Senior data scientists need to demonstrate strategic thinking, team leadership, and ability to drive data strategy.",
        _ => "Industry expects strong technical skills, clear communication, and proven ability to deliver results.",
    }
}

pub fn ideal_answer(role: &str) -> String {
    format!(
        "A strong answer would include: (1) A clear framework or approach, (2) Specific examples from your experience with measurable outcomes, (3) Discussion of trade-offs and alternatives considered, (4) Lessons learned and how you'd apply them differently, (5) Connection to business impact or user value. The response should be 2-3 minutes long and demonstrate both technical depth and strategic thinking appropriate for a {} role.",
        role
    )
}

pub fn next_direction(score: u8) -> NextDirection {
    if score >= 80 {
        NextDirection::Harder
    } else if score < 60 {
        NextDirection::Easier
    } else {
        NextDirection::Same
    }
}

/// Full heuristic analysis of one answer.
pub fn analyze(answer: &str, role: &str, difficulty: &str) -> AnswerAnalysis {
    let features = AnswerFeatures::extract(answer, role);
    let score = heuristic_score(&features);
    let judged = Judged {
        features: &features,
        score,
    };
    let band = ScoreBand::of(score);

    let mut feedback = vec![band.feedback_opening().to_string()];
    feedback.extend(matching(FEEDBACK_RULES, &judged));

    let mut strengths = matching(STRENGTH_RULES, &judged);
    if strengths.is_empty() {
        strengths.push("Attempted to answer the question".to_string());
    }

    let mut suggestions = matching(SUGGESTION_RULES, &judged);
    suggestions.extend(
        RoleFamily::of(role)
            .suggestions()
            .iter()
            .chain(CLOSING_SUGGESTIONS.iter())
            .map(|s| s.to_string()),
    );

    let follow_up_needed = score < 75;

    AnswerAnalysis {
        score,
        detailed_feedback: feedback.join(" "),
        strengths,
        weaknesses: matching(WEAKNESS_RULES, &judged),
        improvement_suggestions: suggestions,
        ideal_answer: ideal_answer(role),
        next_question_direction: next_direction(score),
        follow_up_needed,
        follow_up_reason: follow_up_needed
            .then(|| "Need to probe deeper to assess true understanding".to_string()),
        reality_check: Some(band.reality_check().to_string()),
        industry_standard: industry_standard(role, difficulty).to_string(),
        source: AnalysisSource::Heuristic,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROLE: &str = "Software Engineer";

    #[test]
    fn test_short_answers_lose_twenty_points() {
        let filler = "x".repeat(49);
        for answer in ["", "yes", "no idea", filler.as_str()] {
            let features = AnswerFeatures::extract(answer, ROLE);
            assert_eq!(length_adjustment(features.length), -20, "{answer:?}");
        }
        assert_eq!(length_adjustment(50), 0);
        assert_eq!(length_adjustment(150), 0);
        assert_eq!(length_adjustment(151), 10);
        assert_eq!(length_adjustment(300), 10);
        assert_eq!(length_adjustment(301), 15);
    }

    #[test]
    fn test_yes_scores_the_floor() {
        let analysis = analyze("yes", ROLE, "Entry Level");
        assert_eq!(analysis.score, 30);
        assert_eq!(raw_score(&AnswerFeatures::extract("yes", ROLE)), 30);
        assert!(analysis.follow_up_needed);
        assert_eq!(analysis.next_question_direction, NextDirection::Easier);
        assert_eq!(analysis.strengths, vec!["Attempted to answer the question"]);
    }

    #[test]
    fn test_scores_always_clamped() {
        let rich = format!(
            "My approach, from experience: for example we cut API latency by 40%. {}. The process was measured. Architecture mattered. Scalability too.",
            "a".repeat(300)
        );
        let inputs = [
            "",
            "i think it depends",
            "maybe",
            rich.as_str(),
            "I think so. Maybe. Probably. It depends.",
        ];
        for input in inputs {
            let score = analyze(input, ROLE, "Mid Level").score;
            assert!((MIN_SCORE..=MAX_SCORE).contains(&score), "{input:?} -> {score}");
        }
        assert_eq!(analyze(&rich, ROLE, "Mid Level").score, MAX_SCORE);
        assert!(raw_score(&AnswerFeatures::extract(&rich, ROLE)) > MAX_SCORE as i32);
    }

    #[test]
    fn test_hedging_penalties() {
        let hedged = "It depends on the situation, honestly, and on the team we have in place.";
        let f = AnswerFeatures::extract(hedged, ROLE);
        assert!(f.says_it_depends && f.length >= 50 && f.length < 100);
        assert_eq!(raw_score(&f), 40);

        let thinking = "I think I would start by reading the logs carefully and then narrowing things down";
        let f = AnswerFeatures::extract(thinking, ROLE);
        assert_eq!(raw_score(&f), 45);

        let with_example = "I think my experience here helps: I would read the logs and then narrow it down";
        let f = AnswerFeatures::extract(with_example, ROLE);
        assert_eq!(raw_score(&f), 65);
    }

    #[test]
    fn test_industry_terms_depend_on_role() {
        let answer = "We tracked the KPI on our roadmap with every stakeholder in mind";
        assert!(AnswerFeatures::extract(answer, "Product Manager").uses_industry_terms);
        assert!(!AnswerFeatures::extract(answer, "Software Engineer").uses_industry_terms);
        assert!(!AnswerFeatures::extract(answer, "HR Manager").uses_industry_terms);
        assert!(AnswerFeatures::extract("a regression model", "Senior Data Scientist").uses_industry_terms);
    }

    #[test]
    fn test_depth_counts_sentence_pieces() {
        assert!(!AnswerFeatures::extract("One. Two. Three", ROLE).shows_depth);
        assert!(AnswerFeatures::extract("One. Two. Three. Four", ROLE).shows_depth);
    }

    #[test]
    fn test_score_bands() {
        assert_eq!(ScoreBand::of(95), ScoreBand::Strong);
        assert_eq!(ScoreBand::of(85), ScoreBand::Strong);
        assert_eq!(ScoreBand::of(84), ScoreBand::Adequate);
        assert_eq!(ScoreBand::of(75), ScoreBand::Adequate);
        assert_eq!(ScoreBand::of(74), ScoreBand::Weak);
        assert_eq!(ScoreBand::of(65), ScoreBand::Weak);
        assert_eq!(ScoreBand::of(64), ScoreBand::Gaps);
        assert_eq!(ScoreBand::of(50), ScoreBand::Gaps);
        assert_eq!(ScoreBand::of(49), ScoreBand::NotReady);
    }

    #[test]
    fn test_derived_text_for_weak_answer() {
        let analysis = analyze("yes", "Product Manager", "Mid Level");
        assert!(analysis
            .detailed_feedback
            .starts_with("Poor response that doesn't meet expectations."));
        assert!(analysis.detailed_feedback.ends_with("interviewers expect more comprehensive responses."));
        assert_eq!(analysis.weaknesses.len(), 5);
        assert_eq!(
            analysis.improvement_suggestions,
            vec![
                "Study fundamental concepts more deeply before interviewing",
                "Prepare 3-5 detailed STAR method examples for different scenarios",
                "Practice giving more comprehensive answers (2-3 minutes speaking time)",
                "Prepare examples of data-driven product decisions",
                "Practice explaining complex trade-offs and prioritization frameworks",
                "Research the company and role-specific challenges",
                "Practice with mock interviews to improve confidence and delivery",
            ]
        );
        assert_eq!(
            analysis.industry_standard,
            industry_standard("Product Manager", "Mid Level")
        );
        assert_eq!(
            analysis.reality_check.as_deref(),
            Some(ScoreBand::NotReady.reality_check())
        );
    }

    #[test]
    fn test_strong_answer_needs_no_follow_up() {
        let answer = "My approach comes from experience on a payments team. For example, we moved to an event-driven architecture. \
                      Throughput rose 3x and p99 latency fell by 45%. We measured performance weekly. \
                      The process included load tests, canaries and rollback drills. \
                      I would repeat the method, but start the capacity planning earlier next time.";
        let analysis = analyze(answer, ROLE, "Senior Level");
        assert_eq!(analysis.score, 95);
        assert!(!analysis.follow_up_needed);
        assert!(analysis.follow_up_reason.is_none());
        assert_eq!(analysis.next_question_direction, NextDirection::Harder);
        assert_eq!(analysis.strengths.len(), 5);
        assert!(analysis.weaknesses.is_empty());
    }

    #[test]
    fn test_unknown_role_gets_generic_standard() {
        assert!(industry_standard("UX Designer", "Entry Level").starts_with("Industry expects"));
        assert!(industry_standard("Software Engineer", "Principal").starts_with("Industry expects"));
    }
}

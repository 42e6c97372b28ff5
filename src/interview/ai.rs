// src/interview/ai.rs
//! Prompts for the language model and validation of what it sends back.
//!
//! Every function here returns `Result<_, LlmError>`; the session decides what
//! to fall back to. Optional fields get their defaults at this boundary only,
//! the engine never sees a partially filled value.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;
use serde_json::Value;

use super::difficulty::Difficulty;
use super::scorer::RoleFamily;
use super::types::{
    AnalysisSource, AnswerAnalysis, GeneratedQuestion, InterviewContext, InterviewSummary,
    NextDirection, QuestionKind,
};
use crate::core::llm_client::{GenerationOptions, LlmError, TextGenerator};

const INTERVIEWER_COMMENTS: [&str; 7] = [
    "I see. Let me dig deeper into that.",
    "Interesting approach. Tell me more about the implementation.",
    "That's one way to handle it. Let's explore this further.",
    "I'd like to understand your thinking process better.",
    "Good start. Can you be more specific about the details?",
    "Let's dive deeper into the technical aspects.",
    "I want to understand how you'd handle the edge cases.",
];

pub fn interviewer_comment<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    INTERVIEWER_COMMENTS
        .choose(rng)
        .copied()
        .unwrap_or(INTERVIEWER_COMMENTS[0])
}

/// Remove a surrounding markdown code fence, with or without a `json` tag.
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let body = if let Some(rest) = trimmed.strip_prefix("```json") {
        rest
    } else if let Some(rest) = trimmed.strip_prefix("```") {
        rest
    } else {
        return trimmed;
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

fn parse_json(text: &str) -> Result<Value, LlmError> {
    let cleaned = strip_code_fences(text);
    if cleaned.is_empty() {
        return Err(LlmError::EmptyResponse);
    }
    Ok(serde_json::from_str(cleaned)?)
}

fn required_str(value: &Value, field: &'static str) -> Result<String, LlmError> {
    value
        .get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or(LlmError::MissingField(field))
}

fn required_score(value: &Value, field: &'static str) -> Result<u8, LlmError> {
    value
        .get(field)
        .and_then(Value::as_i64)
        .filter(|s| (0..=100).contains(s))
        .map(|s| s as u8)
        .ok_or(LlmError::MissingField(field))
}

fn string_list(value: &Value, field: &str) -> Vec<String> {
    value
        .get(field)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn optional_str(value: &Value, field: &str) -> Option<String> {
    value
        .get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn or_default(items: Vec<String>, default: &str) -> Vec<String> {
    if items.is_empty() {
        vec![default.to_string()]
    } else {
        items
    }
}

// ===== Question =====

pub fn question_prompt(context: &InterviewContext, escalated: Difficulty) -> String {
    let mut prompt = format!(
        "Generate a challenging {} interview question for {}.",
        escalated, context.job_role
    );

    if context.current_question_number <= 1 {
        prompt.push_str(
            " Start with a complex opening question that immediately tests their depth of knowledge.",
        );
    } else {
        let average = context.average_score().unwrap_or(75.0);
        if average > 80.0 {
            prompt.push_str(" Candidate is doing well - make this question significantly harder to really test their limits.");
        } else if average < 60.0 {
            prompt.push_str(" Candidate is struggling - but maintain the challenging level to see if they can rise to the occasion.");
        } else {
            prompt.push_str(
                " Candidate is average - push them with a question that separates good from great.",
            );
        }
    }

    let role = context.job_role.to_lowercase();
    if role.contains("engineer") {
        prompt.push_str(" Focus on complex system design, scalability challenges, or advanced technical concepts that senior engineers face.");
    } else if role.contains("product") {
        prompt.push_str(" Focus on strategic product decisions, complex trade-offs, or scenarios with ambiguous requirements.");
    } else if role.contains("data") {
        prompt.push_str(
            " Focus on advanced statistical concepts, complex data problems, or real-world ML challenges.",
        );
    }

    if let Some(category) = context.question_category.as_deref() {
        prompt.push_str(&format!(" The question should be in the {} category.", category));
    }
    if let Some(company) = context.company_type.as_deref() {
        prompt.push_str(&format!(" Tailor it to a {} company.", company));
    }

    prompt.push_str(
        " Make it a question that would be asked at top-tier companies like Google, Amazon, or Netflix.",
    );
    prompt
}

pub fn question_system_prompt(context: &InterviewContext, escalated: Difficulty) -> String {
    let recent: Vec<&str> = context
        .previous_questions
        .iter()
        .rev()
        .take(3)
        .rev()
        .map(String::as_str)
        .collect();

    format!(
        r#"You are an expert interviewer for {role} positions. Generate realistic interview questions.

IMPORTANT: Respond ONLY with valid JSON in this exact format:
{{
"question": "Your interview question here",
"questionType": "main",
"category": "Technical",
"expectedDuration": 3,
"difficulty": "{requested}",
"actualDifficulty": "{escalated}",
"context": "Brief explanation"
}}

Guidelines:
- {escalated} level questions for {role}
- Make questions realistic and commonly asked
- Avoid repeating previous questions: {recent}"#,
        role = context.job_role,
        requested = context.difficulty,
        escalated = escalated,
        recent = recent.join(", "),
    )
}

pub fn parse_question(
    text: &str,
    requested: &str,
    escalated: Difficulty,
) -> Result<GeneratedQuestion, LlmError> {
    let value = parse_json(text)?;
    let question = required_str(&value, "question")?;
    let category = required_str(&value, "category")?;

    let question_type = value
        .get("questionType")
        .cloned()
        .and_then(|v| serde_json::from_value::<QuestionKind>(v).ok())
        .unwrap_or_default();

    Ok(GeneratedQuestion {
        question,
        question_type,
        category,
        expected_duration: value
            .get("expectedDuration")
            .and_then(Value::as_u64)
            .map(|d| d.clamp(1, 30) as u32)
            .unwrap_or(3),
        difficulty: requested.to_string(),
        actual_difficulty: optional_str(&value, "actualDifficulty")
            .unwrap_or_else(|| escalated.to_string()),
        context: optional_str(&value, "context")
            .unwrap_or_else(|| format!("{} question", escalated)),
        bank_id: None,
    })
}

pub async fn generate_question(
    generator: &dyn TextGenerator,
    context: &InterviewContext,
    escalated: Difficulty,
) -> Result<GeneratedQuestion, LlmError> {
    let system = question_system_prompt(context, escalated);
    let prompt = question_prompt(context, escalated);
    let text = generator
        .generate(&system, &prompt, GenerationOptions::QUESTION)
        .await?;
    parse_question(&text, &context.difficulty, escalated)
}

// ===== Answer analysis =====

const ANALYSIS_SYSTEM_PROMPT: &str = r#"Analyze interview responses and provide constructive feedback.

IMPORTANT: Respond ONLY with valid JSON:
{
"score": 85,
"detailedFeedback": "Detailed feedback paragraph",
"strengths": ["strength1", "strength2"],
"weaknesses": ["weakness1", "weakness2"],
"improvementSuggestions": ["suggestion1", "suggestion2"],
"idealAnswer": "Better answer example",
"nextQuestionDirection": "same",
"followUpNeeded": false,
"realityCheck": "Honest assessment",
"industryStandard": "Industry expectations"
}

Scoring: 90-100 excellent, 80-89 good, 70-79 adequate, 60-69 weak, <60 poor"#;

pub fn analysis_prompt(context: &InterviewContext, question: &str, answer: &str) -> String {
    format!(
        "Analyze this {} interview response:\nQuestion: \"{}\"\nAnswer: \"{}\"\nDifficulty: {}",
        context.job_role, question, answer, context.difficulty
    )
}

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
enum RawDirection {
    Easier,
    Harder,
    Same,
    DifferentTopic,
}

pub fn parse_analysis(text: &str) -> Result<AnswerAnalysis, LlmError> {
    let value = parse_json(text)?;
    let score = required_score(&value, "score")?;

    let next_question_direction = value
        .get("nextQuestionDirection")
        .cloned()
        .and_then(|v| serde_json::from_value::<RawDirection>(v).ok())
        .map(|d| match d {
            RawDirection::Easier => NextDirection::Easier,
            RawDirection::Harder => NextDirection::Harder,
            RawDirection::Same => NextDirection::Same,
            RawDirection::DifferentTopic => NextDirection::DifferentTopic,
        })
        .unwrap_or_default();

    Ok(AnswerAnalysis {
        score,
        detailed_feedback: optional_str(&value, "detailedFeedback")
            .unwrap_or_else(|| "Analysis completed".to_string()),
        strengths: or_default(string_list(&value, "strengths"), "Attempted to answer"),
        weaknesses: or_default(string_list(&value, "weaknesses"), "Could provide more detail"),
        improvement_suggestions: or_default(
            string_list(&value, "improvementSuggestions"),
            "Practice more examples",
        ),
        ideal_answer: optional_str(&value, "idealAnswer").unwrap_or_else(|| {
            "A stronger answer would include specific examples".to_string()
        }),
        next_question_direction,
        follow_up_needed: value
            .get("followUpNeeded")
            .and_then(Value::as_bool)
            .unwrap_or(false),
        follow_up_reason: optional_str(&value, "followUpReason"),
        reality_check: Some(
            optional_str(&value, "realityCheck")
                .unwrap_or_else(|| "Continue practicing to improve".to_string()),
        ),
        industry_standard: optional_str(&value, "industryStandard")
            .unwrap_or_else(|| "Industry expects clear, detailed responses".to_string()),
        source: AnalysisSource::Ai,
    })
}

pub async fn analyze_answer(
    generator: &dyn TextGenerator,
    context: &InterviewContext,
    question: &str,
    answer: &str,
) -> Result<AnswerAnalysis, LlmError> {
    let prompt = analysis_prompt(context, question, answer);
    let text = generator
        .generate(ANALYSIS_SYSTEM_PROMPT, &prompt, GenerationOptions::ANALYSIS)
        .await?;
    parse_analysis(&text)
}

// ===== Summary =====

const SUMMARY_SYSTEM_PROMPT: &str = r#"Provide honest, comprehensive interview performance summary. Be direct about readiness.

IMPORTANT: Respond ONLY with valid JSON:
{
  "overallFeedback": "Honest comprehensive feedback",
  "keyStrengths": ["strength1", "strength2", "strength3"],
  "criticalImprovements": ["critical improvement1", "critical improvement2"],
  "readinessScore": 75,
  "nextSteps": ["specific actionable step1", "specific actionable step2"],
  "realityCheck": "Honest assessment of interview readiness",
  "industryComparison": "How they compare to industry standards"
}

Be honest about gaps and provide realistic timeline for improvement."#;

pub fn summary_prompt(
    job_role: &str,
    question_count: usize,
    analyses: &[AnswerAnalysis],
) -> String {
    let average = if analyses.is_empty() {
        0.0
    } else {
        analyses.iter().map(|a| a.score as f64).sum::<f64>() / analyses.len() as f64
    };
    let strengths: Vec<&str> = analyses
        .iter()
        .flat_map(|a| a.strengths.iter().map(String::as_str))
        .collect();
    let weaknesses: Vec<&str> = analyses
        .iter()
        .flat_map(|a| a.weaknesses.iter().map(String::as_str))
        .collect();
    let checks: Vec<&str> = analyses
        .iter()
        .filter_map(|a| a.reality_check.as_deref())
        .collect();

    let family_hint = match RoleFamily::of(job_role) {
        RoleFamily::Engineering => " Compare against engineering hiring bars.",
        RoleFamily::Product => " Compare against product management hiring bars.",
        RoleFamily::Data => " Compare against data science hiring bars.",
        RoleFamily::General => "",
    };

    format!(
        "Provide strict summary for {} interview:\nAverage Score: {:.1}\nQuestions: {}\nAll Strengths: {}\nAll Weaknesses: {}\nReality Checks: {}\n\nBe honest about readiness and provide realistic improvement timeline.{}",
        job_role,
        average,
        question_count,
        strengths.join(", "),
        weaknesses.join("; "),
        checks.join("; "),
        family_hint
    )
}

pub fn parse_summary(text: &str) -> Result<InterviewSummary, LlmError> {
    let value = parse_json(text)?;
    Ok(InterviewSummary {
        overall_feedback: required_str(&value, "overallFeedback")?,
        readiness_score: required_score(&value, "readinessScore")?,
        key_strengths: string_list(&value, "keyStrengths"),
        critical_improvements: string_list(&value, "criticalImprovements"),
        next_steps: string_list(&value, "nextSteps"),
        reality_check: optional_str(&value, "realityCheck"),
        industry_comparison: optional_str(&value, "industryComparison"),
    })
}

pub async fn summarize(
    generator: &dyn TextGenerator,
    job_role: &str,
    question_count: usize,
    analyses: &[AnswerAnalysis],
) -> Result<InterviewSummary, LlmError> {
    let prompt = summary_prompt(job_role, question_count, analyses);
    let text = generator
        .generate(SUMMARY_SYSTEM_PROMPT, &prompt, GenerationOptions::SUMMARY)
        .await?;
    parse_summary(&text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const ANALYSIS_JSON: &str = r#"{"score": 82, "detailedFeedback": "Solid.", "strengths": ["Clear"], "nextQuestionDirection": "harder", "followUpNeeded": true}"#;

    #[test]
    fn test_fenced_json_parses_like_bare_json() {
        let fenced = format!("```json\n{}\n```", ANALYSIS_JSON);
        let plain_fence = format!("```\n{}\n```", ANALYSIS_JSON);
        let bare = parse_analysis(ANALYSIS_JSON).unwrap();
        assert_eq!(parse_analysis(&fenced).unwrap(), bare);
        assert_eq!(parse_analysis(&plain_fence).unwrap(), bare);
        assert_eq!(bare.score, 82);
        assert_eq!(bare.next_question_direction, NextDirection::Harder);
        assert_eq!(bare.source, AnalysisSource::Ai);
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("  {\"a\":1}  "), "{\"a\":1}");
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```json {\"a\":1}```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```\n[1]\n```\n"), "[1]");
    }

    #[test]
    fn test_analysis_defaults_applied() {
        let analysis = parse_analysis(r#"{"score": 64}"#).unwrap();
        assert_eq!(analysis.strengths, vec!["Attempted to answer"]);
        assert_eq!(analysis.weaknesses, vec!["Could provide more detail"]);
        assert_eq!(analysis.detailed_feedback, "Analysis completed");
        assert_eq!(analysis.next_question_direction, NextDirection::Same);
        assert!(!analysis.follow_up_needed);
    }

    #[test]
    fn test_analysis_score_must_be_in_range() {
        for bad in [
            r#"{"score": 140}"#,
            r#"{"score": -3}"#,
            r#"{"score": "85"}"#,
            r#"{"score": 72.5}"#,
            r#"{"detailedFeedback": "no score"}"#,
        ] {
            assert!(
                matches!(parse_analysis(bad), Err(LlmError::MissingField("score"))),
                "{bad}"
            );
        }
        assert!(matches!(
            parse_analysis("Sure! Here is my analysis."),
            Err(LlmError::MalformedJson(_))
        ));
        assert!(matches!(parse_analysis("```json\n```"), Err(LlmError::EmptyResponse)));
    }

    #[test]
    fn test_question_requires_text_and_category() {
        let q = parse_question(
            r#"{"question": "Design a feed.", "category": "System Design", "questionType": "deep-dive"}"#,
            "Entry Level",
            Difficulty::Mid,
        )
        .unwrap();
        assert_eq!(q.question_type, QuestionKind::DeepDive);
        assert_eq!(q.difficulty, "Entry Level");
        assert_eq!(q.actual_difficulty, "Mid Level");
        assert_eq!(q.expected_duration, 3);

        assert!(matches!(
            parse_question(r#"{"question": "Design a feed."}"#, "Entry Level", Difficulty::Mid),
            Err(LlmError::MissingField("category"))
        ));
        assert!(matches!(
            parse_question(r#"{"question": " ", "category": "x"}"#, "Entry Level", Difficulty::Mid),
            Err(LlmError::MissingField("question"))
        ));
    }

    #[test]
    fn test_summary_validation() {
        let ok = parse_summary(r#"{"overallFeedback": "Good", "readinessScore": 77, "nextSteps": ["Practice"]}"#).unwrap();
        assert_eq!(ok.readiness_score, 77);
        assert_eq!(ok.next_steps, vec!["Practice"]);
        assert!(ok.key_strengths.is_empty());

        assert!(parse_summary(r#"{"readinessScore": 77}"#).is_err());
        assert!(parse_summary(r#"{"overallFeedback": "Good", "readinessScore": 101}"#).is_err());
    }

    #[test]
    fn test_question_prompt_adapts_to_scores() {
        let mut ctx = InterviewContext::new("Product Manager".into(), "Mid Level".into());
        let first = question_prompt(&ctx, Difficulty::Senior);
        assert!(first.starts_with("Generate a challenging Senior Level interview question for Product Manager."));
        assert!(first.contains("complex opening question"));
        assert!(first.contains("strategic product decisions"));

        ctx.record_turn("q1", "a1", 90);
        assert!(question_prompt(&ctx, Difficulty::Senior).contains("Candidate is doing well"));

        ctx.record_turn("q2", "a2", 20);
        assert!(question_prompt(&ctx, Difficulty::Senior).contains("Candidate is struggling"));
    }

    #[test]
    fn test_system_prompt_lists_last_three_questions() {
        let mut ctx = InterviewContext::new("Software Engineer".into(), "Entry Level".into());
        for q in ["q1", "q2", "q3", "q4"] {
            ctx.record_turn(q, "a", 70);
        }
        let system = question_system_prompt(&ctx, Difficulty::Mid);
        assert!(system.contains("Avoid repeating previous questions: q2, q3, q4"));
        assert!(system.contains("\"difficulty\": \"Entry Level\""));
    }

    #[test]
    fn test_interviewer_comment_from_fixed_list() {
        let mut rng = StdRng::seed_from_u64(5);
        let comment = interviewer_comment(&mut rng);
        assert!(INTERVIEWER_COMMENTS.contains(&comment));
    }
}

// src/interview/selector.rs
//! Picks unused bank questions for a session.

use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;
use tracing::{debug, warn};

use super::difficulty::Difficulty;
use super::question_bank::{QuestionBank, QuestionBankEntry, DEFAULT_LEVEL, DEFAULT_ROLE};
use super::types::{GeneratedQuestion, QuestionKind};
use super::contains_any;

/// Category value meaning "draw from every category".
pub const MIXED_CATEGORY: &str = "Mixed";

/// What to draw from. The used-id set belongs to the session and is passed separately.
#[derive(Debug, Clone, Copy)]
pub struct SelectionRequest<'a> {
    pub role: &'a str,
    pub requested: &'a str,
    pub escalated: Difficulty,
    pub category: Option<&'a str>,
}

pub struct QuestionSelector<'b> {
    bank: &'b QuestionBank,
}

impl<'b> QuestionSelector<'b> {
    pub fn new(bank: &'b QuestionBank) -> Self {
        Self { bank }
    }

    /// Candidate pool for a request before the used-set filter.
    pub fn pool(&self, request: &SelectionRequest<'_>) -> Vec<&'b QuestionBankEntry> {
        let role = if self.bank.has_role(request.role) {
            request.role
        } else {
            DEFAULT_ROLE
        };

        let populated = |role: &str, level: Difficulty| {
            self.bank.cell(role, level).filter(|c| !c.is_empty())
        };
        let cell = populated(role, request.escalated)
            .or_else(|| {
                Difficulty::from_label(request.requested).and_then(|d| populated(role, d))
            })
            .or_else(|| populated(role, DEFAULT_LEVEL))
            .or_else(|| populated(DEFAULT_ROLE, DEFAULT_LEVEL))
            .unwrap_or(&[]);

        // the faq table is keyed by the caller's role, not the fallback one
        let faq = self.bank.frequently_asked(request.role);

        match request.category.filter(|c| *c != MIXED_CATEGORY) {
            Some(category) => cell
                .iter()
                .chain(faq.iter())
                .filter(|e| e.category == category)
                .collect(),
            None => cell.iter().chain(faq.iter()).collect(),
        }
    }

    /// Draw one entry, never repeating an id until the pool is exhausted.
    pub fn select<R: Rng + ?Sized>(
        &self,
        request: &SelectionRequest<'_>,
        used: &mut HashSet<String>,
        rng: &mut R,
    ) -> Option<&'b QuestionBankEntry> {
        let mut pool = self.pool(request);
        if pool.is_empty() {
            // unknown category: widen to the whole cell
            debug!(
                "No questions for category {:?}, using every category",
                request.category
            );
            pool = self.pool(&SelectionRequest {
                category: None,
                ..*request
            });
        }

        let unused: Vec<&QuestionBankEntry> = pool
            .iter()
            .copied()
            .filter(|e| !used.contains(&e.id))
            .collect();

        let chosen = if unused.is_empty() {
            warn!(
                "All {} questions used for {} / {}, resetting question pool",
                pool.len(),
                request.role,
                request.escalated
            );
            used.clear();
            pool.choose(rng).copied()
        } else {
            unused.choose(rng).copied()
        };

        if let Some(entry) = chosen {
            used.insert(entry.id.clone());
        }
        chosen
    }
}

/// Display category inferred from the wording of a question.
pub fn category_for_question(question: &str) -> &'static str {
    let lower = question.to_lowercase();

    if contains_any(&lower, &["design", "architect", "system"]) {
        "System Design"
    } else if contains_any(&lower, &["team", "time", "challenge", "tell me about"]) {
        "Behavioral"
    } else if contains_any(&lower, &["technical", "code", "algorithm"]) {
        "Technical"
    } else if contains_any(&lower, &["strategy", "business", "market"]) {
        "Strategic"
    } else if contains_any(&lower, &["data", "model", "analysis"]) {
        "Analytical"
    } else {
        "Problem-Solving"
    }
}

/// Turn a bank entry into the question shown to the candidate.
pub fn to_generated(
    entry: &QuestionBankEntry,
    requested: &str,
    escalated: Difficulty,
) -> GeneratedQuestion {
    let flavour = entry
        .company
        .as_deref()
        .map(|c| format!("{} style", c))
        .unwrap_or_else(|| "Advanced".to_string());

    GeneratedQuestion {
        question: entry.text.clone(),
        question_type: QuestionKind::Main,
        category: category_for_question(&entry.text).to_string(),
        expected_duration: 4,
        difficulty: requested.to_string(),
        actual_difficulty: format!("{} (One level above {})", escalated, requested),
        context: format!("{} {} question - {}", flavour, escalated, entry.variant),
        bank_id: Some(entry.id.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn request<'a>(role: &'a str, requested: &'a str, category: Option<&'a str>) -> SelectionRequest<'a> {
        SelectionRequest {
            role,
            requested,
            escalated: super::super::difficulty::escalate(requested),
            category,
        }
    }

    #[test]
    fn test_never_repeats_until_exhausted() {
        let bank = QuestionBank::builtin().unwrap();
        let selector = QuestionSelector::new(&bank);
        let req = request("Product Manager", "Entry Level", None);
        let pool_size = selector.pool(&req).len();
        assert!(pool_size > 0);

        let mut rng = StdRng::seed_from_u64(7);
        let mut used = HashSet::new();
        let mut served = HashSet::new();
        for _ in 0..pool_size {
            let entry = selector.select(&req, &mut used, &mut rng).unwrap();
            assert!(served.insert(entry.id.clone()), "repeated {}", entry.id);
        }
        assert_eq!(used.len(), pool_size);

        // exhausted: the set resets and holds only the fresh pick
        let entry = selector.select(&req, &mut used, &mut rng).unwrap();
        assert!(served.contains(&entry.id));
        assert_eq!(used.len(), 1);
    }

    #[test]
    fn test_entry_level_serves_mid_level_questions() {
        let bank = QuestionBank::builtin().unwrap();
        let selector = QuestionSelector::new(&bank);
        let req = request("Software Engineer", "Entry Level", Some("System Design"));
        let mut rng = StdRng::seed_from_u64(1);
        let mut used = HashSet::new();
        for _ in 0..4 {
            let entry = selector.select(&req, &mut used, &mut rng).unwrap();
            assert!(
                entry.id.starts_with("se_mid_sys") || entry.id.starts_with("faq_"),
                "unexpected {}",
                entry.id
            );
        }
    }

    #[test]
    fn test_unknown_role_falls_back_to_default_cell() {
        let bank = QuestionBank::builtin().unwrap();
        let selector = QuestionSelector::new(&bank);
        let req = request("HR Manager", "Senior Level", None);
        let pool = selector.pool(&req);
        assert!(pool.iter().all(|e| e.id.starts_with("se_senior")));
    }

    #[test]
    fn test_category_filter_includes_faq() {
        let bank = QuestionBank::builtin().unwrap();
        let selector = QuestionSelector::new(&bank);
        let pool = selector.pool(&request("Software Engineer", "Mid Level", Some("Behavioral")));
        assert!(pool.iter().all(|e| e.category == "Behavioral"));
        assert!(pool.iter().any(|e| e.id == "faq_beh_1"));
        assert!(pool.iter().any(|e| e.id == "se_senior_beh_1"));
    }

    #[test]
    fn test_unknown_category_widens_pool() {
        let bank = QuestionBank::builtin().unwrap();
        let selector = QuestionSelector::new(&bank);
        let req = request("Data Scientist", "Entry Level", Some("Astrology"));
        let mut used = HashSet::new();
        let entry = selector
            .select(&req, &mut used, &mut StdRng::seed_from_u64(3))
            .unwrap();
        assert!(entry.id.starts_with("ds_mid"));
    }

    #[test]
    fn test_empty_cell_falls_through_to_populated_one() {
        let yaml = r#"
roles:
  Software Engineer:
    Entry Level:
      Technical:
        - { id: se_1, question: Explain closures., type: concept }
  Product Manager:
    Mid Level: {}
    Entry Level:
      Strategic:
        - { id: pm_1, question: Walk me through roadmap prioritisation., type: strategy }
"#;
        let bank = QuestionBank::from_yaml(yaml).unwrap();
        assert!(bank.cell("Product Manager", Difficulty::Mid).is_none());

        let selector = QuestionSelector::new(&bank);
        let req = request("Product Manager", "Entry Level", None);
        let mut used = HashSet::new();
        let entry = selector
            .select(&req, &mut used, &mut StdRng::seed_from_u64(5))
            .unwrap();
        assert_eq!(entry.id, "pm_1");
    }

    #[test]
    fn test_category_for_question() {
        assert_eq!(category_for_question("Design a distributed cache system."), "System Design");
        assert_eq!(category_for_question("Tell me about your most challenging project."), "Behavioral");
        assert_eq!(category_for_question("Write code to reverse a list."), "Technical");
        assert_eq!(category_for_question("How would you enter a new market?"), "Strategic");
        assert_eq!(category_for_question("How do you clean data?"), "Analytical");
        assert_eq!(category_for_question("Reverse a linked list."), "Problem-Solving");
    }

    #[test]
    fn test_to_generated_describes_escalation() {
        let bank = QuestionBank::builtin().unwrap();
        let faq = &bank.frequently_asked("Software Engineer")[0];
        let q = to_generated(faq, "Entry Level", Difficulty::Mid);
        assert_eq!(q.actual_difficulty, "Mid Level (One level above Entry Level)");
        assert_eq!(q.context, "Google style Mid Level question - coding");
        assert_eq!(q.bank_id.as_deref(), Some("faq_tech_1"));
        assert_eq!(q.expected_duration, 4);
    }
}

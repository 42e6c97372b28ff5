// src/interview/question_bank.rs
//! Static question table keyed by role, level and category.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

use super::difficulty::Difficulty;

const BUILTIN_BANK: &str = include_str!("question_bank.yaml");

/// Cell every lookup falls back to. Loading refuses a bank where it is empty.
pub const DEFAULT_ROLE: &str = "Software Engineer";
pub const DEFAULT_LEVEL: Difficulty = Difficulty::Entry;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionBankEntry {
    pub id: String,
    pub text: String,
    pub category: String,
    pub variant: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
}

#[derive(Debug, Error)]
pub enum BankError {
    #[error("question bank is not valid YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("duplicate question id in bank: {0}")]
    DuplicateId(String),
    #[error("fallback cell {role} / {level} has no questions")]
    EmptyFallbackCell { role: String, level: Difficulty },
}

#[derive(Deserialize)]
struct RawEntry {
    id: String,
    question: String,
    #[serde(rename = "type")]
    variant: String,
    #[serde(default)]
    company: Option<String>,
}

type RawCategories = BTreeMap<String, Vec<RawEntry>>;

#[derive(Deserialize)]
struct RawBank {
    roles: BTreeMap<String, BTreeMap<Difficulty, RawCategories>>,
    #[serde(default)]
    frequently_asked: BTreeMap<String, RawCategories>,
}

/// Coverage line for one role/level cell.
#[derive(Debug, Clone, Serialize)]
pub struct CellCoverage {
    pub role: String,
    pub level: Difficulty,
    pub categories: Vec<String>,
    pub questions: usize,
}

#[derive(Debug, Clone)]
pub struct QuestionBank {
    cells: HashMap<(String, Difficulty), Vec<QuestionBankEntry>>,
    frequently_asked: HashMap<String, Vec<QuestionBankEntry>>,
}

impl QuestionBank {
    /// Bank compiled into the binary.
    pub fn builtin() -> Result<Self, BankError> {
        Self::from_yaml(BUILTIN_BANK)
    }

    /// Load an operator-supplied bank file with the same layout as the builtin one.
    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read question bank: {}", path.display()))?;
        let bank = Self::from_yaml(&content)
            .with_context(|| format!("Invalid question bank: {}", path.display()))?;
        info!("Loaded question bank from {}", path.display());
        Ok(bank)
    }

    pub fn from_yaml(content: &str) -> Result<Self, BankError> {
        let raw: RawBank = serde_yaml::from_str(content)?;
        let mut seen = HashSet::new();

        let mut cells = HashMap::new();
        for (role, levels) in raw.roles {
            for (level, categories) in levels {
                let entries = flatten(categories, &mut seen)?;
                if entries.is_empty() {
                    debug!("Skipping empty question bank cell {} / {}", role, level);
                    continue;
                }
                cells.insert((role.clone(), level), entries);
            }
        }

        let mut frequently_asked = HashMap::new();
        for (role, categories) in raw.frequently_asked {
            frequently_asked.insert(role, flatten(categories, &mut seen)?);
        }

        let bank = Self {
            cells,
            frequently_asked,
        };

        if bank.cell(DEFAULT_ROLE, DEFAULT_LEVEL).map_or(true, |c| c.is_empty()) {
            return Err(BankError::EmptyFallbackCell {
                role: DEFAULT_ROLE.to_string(),
                level: DEFAULT_LEVEL,
            });
        }

        Ok(bank)
    }

    pub fn cell(&self, role: &str, level: Difficulty) -> Option<&[QuestionBankEntry]> {
        self.cells
            .get(&(role.to_string(), level))
            .map(|entries| entries.as_slice())
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.cells.keys().any(|(r, _)| r == role)
    }

    pub fn frequently_asked(&self, role: &str) -> &[QuestionBankEntry] {
        self.frequently_asked
            .get(role)
            .map(|entries| entries.as_slice())
            .unwrap_or(&[])
    }

    pub fn roles(&self) -> Vec<String> {
        let mut roles: Vec<String> = self.cells.keys().map(|(r, _)| r.clone()).collect();
        roles.sort();
        roles.dedup();
        roles
    }

    pub fn categories(&self) -> Vec<String> {
        let mut categories: Vec<String> = self
            .cells
            .values()
            .chain(self.frequently_asked.values())
            .flatten()
            .map(|e| e.category.clone())
            .collect();
        categories.sort();
        categories.dedup();
        categories
    }

    pub fn coverage(&self) -> Vec<CellCoverage> {
        let mut coverage: Vec<CellCoverage> = self
            .cells
            .iter()
            .map(|((role, level), entries)| {
                let mut categories: Vec<String> =
                    entries.iter().map(|e| e.category.clone()).collect();
                categories.dedup();
                CellCoverage {
                    role: role.clone(),
                    level: *level,
                    categories,
                    questions: entries.len(),
                }
            })
            .collect();
        coverage.sort_by(|a, b| a.role.cmp(&b.role).then(a.level.cmp(&b.level)));
        coverage
    }

    pub fn len(&self) -> usize {
        self.cells.values().map(Vec::len).sum::<usize>()
            + self.frequently_asked.values().map(Vec::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn flatten(
    categories: RawCategories,
    seen: &mut HashSet<String>,
) -> Result<Vec<QuestionBankEntry>, BankError> {
    let mut entries = Vec::new();
    for (category, raw_entries) in categories {
        for raw in raw_entries {
            if !seen.insert(raw.id.clone()) {
                return Err(BankError::DuplicateId(raw.id));
            }
            entries.push(QuestionBankEntry {
                id: raw.id,
                text: raw.question,
                category: category.clone(),
                variant: raw.variant,
                company: raw.company,
            });
        }
    }
    Ok(entries)
}

// src/cli.rs
use crate::core::database::{Database, InterviewRepository, SaveOutcome};
use crate::core::ConfigManager;
use crate::interview::scorer;
use crate::interview::{
    analytics, AnswerAnalysis, GeneratedQuestion, InterviewContext, InterviewSession,
    InterviewStyle, SessionError, TurnOutcome,
};
use crate::web::{start_web_server, Engine};
use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "interview-coach")]
#[command(about = "Adaptive mock interview engine")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API (default)
    Serve,
    /// Run an interview in the terminal
    Practice {
        #[arg(long, default_value = "Software Engineer")]
        role: String,
        #[arg(long, default_value = "Entry Level")]
        difficulty: String,
        #[arg(long, value_enum, default_value_t = StyleArg::Mixed)]
        style: StyleArg,
        #[arg(long)]
        company_type: Option<String>,
        #[arg(long)]
        category: Option<String>,
        /// Store the finished interview under this user id
        #[arg(long, default_value = "local")]
        user: String,
    },
    /// Show stored interviews and analytics for a user
    History {
        #[arg(long, default_value = "local")]
        user: String,
        /// Only interviews from the last N days
        #[arg(long)]
        days: Option<i64>,
    },
    /// Score one answer with the built-in heuristic
    Score {
        answer: String,
        #[arg(long, default_value = "Software Engineer")]
        role: String,
        #[arg(long, default_value = "Entry Level")]
        difficulty: String,
    },
    /// List question bank coverage per role and level
    Bank,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum StyleArg {
    Technical,
    Behavioral,
    Mixed,
}

impl From<StyleArg> for InterviewStyle {
    fn from(style: StyleArg) -> Self {
        match style {
            StyleArg::Technical => InterviewStyle::Technical,
            StyleArg::Behavioral => InterviewStyle::Behavioral,
            StyleArg::Mixed => InterviewStyle::Mixed,
        }
    }
}

pub async fn run(cli: Cli, config: ConfigManager) -> Result<()> {
    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => start_web_server(config).await,
        Command::Practice {
            role,
            difficulty,
            style,
            company_type,
            category,
            user,
        } => {
            let context = InterviewContext::new(role, difficulty)
                .with_company_type(company_type)
                .with_category(category)
                .with_style(style.into());
            practice(config, context, user).await
        }
        Command::History { user, days } => history(config, &user, days).await,
        Command::Score {
            answer,
            role,
            difficulty,
        } => {
            print_analysis(&scorer::analyze(&answer, &role, &difficulty));
            Ok(())
        }
        Command::Bank => {
            let engine = Engine::from_config(&config).await?;
            for cell in engine.bank.coverage() {
                println!(
                    "{:<28} {:<13} {:>3} questions  [{}]",
                    cell.role,
                    cell.level.label(),
                    cell.questions,
                    cell.categories.join(", ")
                );
            }
            Ok(())
        }
    }
}

async fn practice(config: ConfigManager, context: InterviewContext, user: String) -> Result<()> {
    config.ensure_directories().await?;
    let engine = Engine::from_config(&config).await?;
    let database = Database::new(&config.database_path).await?;

    let mut session = InterviewSession::new(
        user,
        context,
        engine.settings,
        engine.bank.clone(),
        engine.generator.clone(),
    );

    println!(
        "Interview for {} at {} ({} questions, submit an empty line to finish an answer)",
        session.context().job_role,
        session.escalated_difficulty(),
        engine.settings.max_turns
    );

    let mut question = session.start().await?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print_question(&question);

        let mut answer = String::new();
        while let Some(line) = lines.next_line().await.context("Failed to read answer")? {
            if line.trim().is_empty() {
                break;
            }
            answer.push_str(&line);
            answer.push('\n');
        }
        if answer.trim().is_empty() {
            println!("Stopping without an answer, nothing is saved.");
            return Ok(());
        }

        match session.submit_answer(&answer).await {
            Ok(TurnOutcome::Continue {
                analysis,
                interviewer_comment,
                next_question,
                ..
            }) => {
                print_analysis(&analysis);
                println!("\n{}", interviewer_comment);
                question = next_question;
            }
            Ok(TurnOutcome::Completed {
                analysis,
                summary,
                record,
            }) => {
                print_analysis(&analysis);
                println!("\n=== Summary ===");
                println!("Overall score: {}", record.overall_score);
                println!("Readiness: {}", summary.readiness_score);
                println!("{}", summary.overall_feedback);
                print_list("Key strengths", &summary.key_strengths);
                print_list("Critical improvements", &summary.critical_improvements);
                print_list("Next steps", &summary.next_steps);

                match InterviewRepository::new(database.pool())
                    .save_completed(&record)
                    .await
                {
                    SaveOutcome::Full => info!("Interview {} saved", record.id),
                    SaveOutcome::Simplified => {
                        warn!("Interview {} saved in simplified form", record.id)
                    }
                    SaveOutcome::Failed => warn!("Interview {} could not be saved", record.id),
                }
                return Ok(());
            }
            Err(SessionError::EmptyAnswer) => continue,
            Err(e) => return Err(e.into()),
        }
    }
}

async fn history(config: ConfigManager, user: &str, days: Option<i64>) -> Result<()> {
    let database = Database::new(&config.database_path).await?;
    let since = match days {
        Some(d) => Some(
            analytics::window_start(d, Utc::now())
                .with_context(|| format!("--days must be a positive number of days, got {}", d))?,
        ),
        None => None,
    };
    let records = InterviewRepository::new(database.pool())
        .history_for_user(user, since)
        .await?;

    if records.is_empty() {
        println!("No interviews stored for {}", user);
        return Ok(());
    }

    for record in &records {
        println!(
            "{}  {:<28} {:<13} score {:>3}",
            record.completed_at.format("%Y-%m-%d %H:%M"),
            record.job_role,
            record.difficulty,
            record.overall_score
        );
    }

    let stats = analytics::compute(&records);
    println!(
        "\n{} interviews, average {}, latest {} ({:+}), {:.1} hours practiced",
        stats.total_interviews,
        stats.average_score,
        stats.latest_score,
        stats.score_change,
        stats.total_practice_hours
    );
    for category in &stats.categories {
        println!(
            "  {:<24} {:>3} over {} answers",
            category.category, category.score, category.count
        );
    }
    Ok(())
}

fn print_question(question: &GeneratedQuestion) {
    println!(
        "\n[{} | {} | ~{} min]",
        question.category, question.actual_difficulty, question.expected_duration
    );
    println!("{}", question.question);
}

fn print_analysis(analysis: &AnswerAnalysis) {
    println!("\nScore: {}/100", analysis.score);
    println!("{}", analysis.detailed_feedback);
    print_list("Strengths", &analysis.strengths);
    print_list("Weaknesses", &analysis.weaknesses);
    print_list("Suggestions", &analysis.improvement_suggestions);
    if let Some(check) = &analysis.reality_check {
        println!("Reality check: {}", check);
    }
}

fn print_list(title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    println!("{}:", title);
    for item in items {
        println!("  - {}", item);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_practice_flags() {
        let cli = Cli::try_parse_from([
            "interview-coach",
            "practice",
            "--role",
            "Data Scientist",
            "--difficulty",
            "Mid Level",
            "--style",
            "technical",
        ])
        .unwrap();

        match cli.command {
            Some(Command::Practice {
                role,
                difficulty,
                style,
                user,
                ..
            }) => {
                assert_eq!(role, "Data Scientist");
                assert_eq!(difficulty, "Mid Level");
                assert_eq!(InterviewStyle::from(style), InterviewStyle::Technical);
                assert_eq!(user, "local");
            }
            _ => panic!("expected practice command"),
        }
    }

    #[test]
    fn test_no_subcommand_means_serve() {
        let cli = Cli::try_parse_from(["interview-coach"]).unwrap();
        assert!(cli.command.is_none());
    }
}

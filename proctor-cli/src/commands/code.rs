use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use proctor_core::{
    AssessmentSession, AttemptReport, CurrentItem, Difficulty, FileProvisioner, Language,
    SessionRequest, TestCaseResult, Verdict,
};

use crate::backend;
use crate::config::ConfigLoader;

#[derive(Args)]
pub struct CodeArgs {
    /// Problem pack to load
    #[arg(long)]
    pub pack: PathBuf,

    /// Source file with the solution
    #[arg(long)]
    pub file: PathBuf,

    /// Language of the source file (python, javascript, cpp, ...)
    #[arg(long)]
    pub lang: Language,

    /// Problem number within the pack (1-based)
    #[arg(long, default_value_t = 1)]
    pub problem: usize,

    /// Difficulty tier to draw problems from
    #[arg(long, default_value = "easy")]
    pub difficulty: Difficulty,

    #[command(subcommand)]
    pub action: CodeAction,
}

#[derive(Subcommand, Clone, Copy)]
pub enum CodeAction {
    /// Run against the visible examples
    Run,
    /// Submit against the hidden tests
    Submit,
}

pub async fn run(args: CodeArgs) -> Result<()> {
    let config = ConfigLoader::load()?;
    let source = tokio::fs::read_to_string(&args.file)
        .await
        .with_context(|| format!("reading {}", args.file.display()))?;

    let model = backend::chat_model(&config.models);
    let session = AssessmentSession::builder(
        Arc::new(FileProvisioner::new(&args.pack)),
        backend::judge(model.clone()),
    )
    .config(config.session.to_session_config())
    .hint_advisor(backend::hint_advisor(model))
    .recorder(backend::recorder(&config))
    .build();

    session
        .start(SessionRequest::Coding {
            source_material: args.pack.display().to_string(),
            difficulty: args.difficulty,
        })
        .await?;
    let index = args
        .problem
        .checked_sub(1)
        .context("problem numbers start at 1")?;
    if let CurrentItem::Problem { problem, total, .. } = session.select_item(index).await? {
        println!("Problem {}/{}: {}\n", args.problem, total, problem.title);
    }

    match args.action {
        CodeAction::Run => {
            let results = session.run_code(args.lang, &source).await?;
            println!("{}", render_results(&results));
            let passed = results.iter().filter(|r| r.passed).count();
            println!("{passed}/{} examples passed", results.len());
            session.reset().await;
        }
        CodeAction::Submit => {
            let report = session.submit_code(args.lang, &source).await?;
            print_report(&report);
            let summary = session.end_session().await?;
            println!(
                "\nSolved {}/{} problems in this pack",
                summary.score, summary.total
            );
        }
    }
    Ok(())
}

fn render_results(results: &[TestCaseResult]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("#").fg(Color::Cyan),
        Cell::new("Input").fg(Color::Cyan),
        Cell::new("Expected").fg(Color::Cyan),
        Cell::new("Actual").fg(Color::Cyan),
        Cell::new("Result").fg(Color::Cyan),
    ]);

    for (i, result) in results.iter().enumerate() {
        let (label, color) = if result.passed {
            ("pass", Color::Green)
        } else {
            ("fail", Color::Red)
        };
        let actual = match &result.error {
            Some(error) if !result.passed => error.clone(),
            _ => result.actual_output.trim().to_string(),
        };
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(result.input.trim()),
            Cell::new(result.expected_output.trim()),
            Cell::new(actual),
            Cell::new(label).fg(color),
        ]);
    }
    table
}

fn print_report(report: &AttemptReport) {
    let outcome = &report.outcome;
    println!("Verdict: {}", outcome.verdict);

    if let Some(case) = &outcome.failed_case {
        println!("Stopped on hidden test {}", case.index + 1);
    }
    if let Verdict::WrongAnswer {
        failed_input,
        expected_output,
    } = &outcome.verdict
    {
        println!("  input:    {}", failed_input.trim());
        println!("  expected: {}", expected_output.trim());
        if let Some(stdout) = &outcome.stdout {
            println!("  actual:   {}", stdout.trim());
        }
    }
    if let Some(diagnostic) = outcome.diagnostic() {
        println!("{}", diagnostic.trim_end());
    }
    if let Some(ms) = outcome.elapsed_ms {
        println!("Time: {ms} ms");
    }
    if let Some(hint) = &report.hint {
        println!("\nHint: {hint}");
    }
}

use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use anyhow::{Result, bail};
use clap::Args;
use proctor_core::{
    AssessmentSession, CurrentItem, FileProvisioner, ProblemProvisioner, QuizQuestion,
    SessionRequest, SessionStatus, SessionSummary,
};
use tokio::sync::mpsc;
use tracing::debug;

use super::format_remaining;
use crate::backend;
use crate::config::ConfigLoader;

#[derive(Args)]
pub struct QuizArgs {
    /// Problem pack to draw questions from
    #[arg(long, conflicts_with = "topic", required_unless_present = "topic")]
    pub pack: Option<PathBuf>,

    /// Generate questions about this material with the configured model
    #[arg(long)]
    pub topic: Option<String>,

    /// Number of questions
    #[arg(long)]
    pub count: Option<usize>,

    /// Time limit in minutes
    #[arg(long)]
    pub minutes: Option<u64>,
}

pub async fn run(args: QuizArgs) -> Result<()> {
    let config = ConfigLoader::load()?;
    let mut session_config = config.session.to_session_config();
    if let Some(minutes) = args.minutes {
        session_config.quiz_duration_secs = minutes.saturating_mul(60);
    }

    let model = backend::chat_model(&config.models);
    let (provisioner, source_material): (Arc<dyn ProblemProvisioner>, String) =
        match (args.pack, args.topic) {
            (Some(pack), _) => {
                let name = pack
                    .file_stem()
                    .map(|stem| stem.to_string_lossy().into_owned())
                    .unwrap_or_default();
                (Arc::new(FileProvisioner::new(pack)), name)
            }
            (None, Some(topic)) => (backend::generator(model.clone()), topic),
            (None, None) => bail!("either --pack or --topic is required"),
        };

    let session = AssessmentSession::builder(provisioner, backend::judge(model))
        .config(session_config)
        .recorder(backend::recorder(&config))
        .build();

    println!("Preparing quiz...");
    let snapshot = session
        .start(SessionRequest::Quiz {
            source_material,
            count: args.count,
        })
        .await?;
    println!(
        "{} questions, {} on the clock. Answer with a letter or number; empty line skips.\n",
        snapshot.total,
        format_remaining(snapshot.time_remaining_secs)
    );

    let summary = ask_questions(&session).await?;
    print_summary(&summary);
    Ok(())
}

/// Prompt until every question is answered, input ends, or time runs out.
async fn ask_questions(session: &AssessmentSession) -> Result<SessionSummary> {
    let mut status = session.subscribe();
    let mut lines = spawn_line_reader(io::BufReader::new(io::stdin()));

    while let Some(CurrentItem::Question {
        index,
        total,
        question,
    }) = session.current_item().await
    {
        println!(
            "[{}] Question {}/{}: {}",
            format_remaining(session.time_remaining().await),
            index + 1,
            total,
            question.question_text
        );
        for (i, option) in question.options.iter().enumerate() {
            println!("  {}) {}", option_letter(i), option);
        }

        let answer = loop {
            let line = tokio::select! {
                line = lines.recv() => line.transpose()?,
                _ = status.wait_for(SessionStatus::is_terminal) => None,
            };
            let Some(line) = line else {
                break None;
            };
            match parse_choice(&line, &question.options) {
                Choice::Skip => break Some(None),
                Choice::Option(option) => break Some(Some(option)),
                Choice::Invalid => println!("Pick one of a-d or 1-4."),
            }
        };

        if session.status().is_terminal() {
            println!("\nTime is up.");
            break;
        }
        let Some(answer) = answer else {
            debug!("Input closed, ending quiz");
            session.end_session().await?;
            break;
        };

        report_answer(&question, answer.as_deref());
        match session.submit_answer(answer).await {
            Ok(snapshot) if snapshot.status.is_terminal() => break,
            Ok(_) => {}
            // The countdown won the race with this answer
            Err(_) if session.status().is_terminal() => {
                println!("\nTime is up.");
                break;
            }
            Err(e) => return Err(e.into()),
        }
    }

    match session.summary().await {
        Some(summary) => Ok(summary),
        None => Ok(session.end_session().await?),
    }
}

/// Forward lines from a blocking reader over a channel.
///
/// The reader runs on a detached thread; a read still pending when the quiz
/// ends is dropped with the process instead of being awaited on shutdown.
fn spawn_line_reader<R>(reader: R) -> mpsc::Receiver<io::Result<String>>
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = mpsc::channel(1);
    thread::spawn(move || {
        for line in reader.lines() {
            if tx.blocking_send(line).is_err() {
                break;
            }
        }
    });
    rx
}

fn report_answer(question: &QuizQuestion, answer: Option<&str>) {
    match answer {
        Some(answer) if question.is_correct(answer) => println!("Correct.\n"),
        _ => {
            println!("Incorrect. The answer is: {}", question.correct_answer);
            if !question.explanation.trim().is_empty() {
                println!("{}", question.explanation);
            }
            println!();
        }
    }
}

fn print_summary(summary: &SessionSummary) {
    println!(
        "Score: {}/{} ({:.0}%) - {}",
        summary.score,
        summary.total,
        summary.percentage(),
        summary.reason.as_str().replace('_', " ")
    );
}

fn option_letter(index: usize) -> char {
    (b'a' + index as u8) as char
}

#[derive(Debug, PartialEq, Eq)]
enum Choice {
    Skip,
    Option(String),
    Invalid,
}

/// Map user input to an option: a letter, a 1-based number, or the option text itself.
fn parse_choice(input: &str, options: &[String]) -> Choice {
    let input = input.trim();
    if input.is_empty() {
        return Choice::Skip;
    }

    let index = if let Ok(n) = input.parse::<usize>() {
        n.checked_sub(1)
    } else if let [c] = input.as_bytes()
        && c.is_ascii_alphabetic()
    {
        Some(usize::from(c.to_ascii_lowercase() - b'a'))
    } else {
        options.iter().position(|o| o.eq_ignore_ascii_case(input))
    };

    match index.and_then(|i| options.get(i)) {
        Some(option) => Choice::Option(option.clone()),
        None => Choice::Invalid,
    }
}

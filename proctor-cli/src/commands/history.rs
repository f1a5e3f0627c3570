use anyhow::Result;
use clap::Args;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use proctor_core::SessionSummary;

use crate::backend;
use crate::config::ConfigLoader;

#[derive(Args)]
pub struct HistoryArgs {
    /// Show only the most recent N sessions
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,

    /// Print raw JSON lines instead of a table
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: HistoryArgs) -> Result<()> {
    let config = ConfigLoader::load()?;
    let recorder = backend::recorder(&config);
    let history = recorder.history().await?;

    let skip = args
        .limit
        .map_or(0, |limit| history.len().saturating_sub(limit));
    let recent = &history[skip..];

    if recent.is_empty() {
        println!("No sessions recorded yet ({}).", recorder.path().display());
        return Ok(());
    }

    if args.json {
        for summary in recent {
            println!("{}", serde_json::to_string(summary)?);
        }
    } else {
        println!("{}", render_table(recent));
    }
    Ok(())
}

fn render_table(history: &[SessionSummary]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Completed").fg(Color::Cyan),
        Cell::new("Mode").fg(Color::Cyan),
        Cell::new("Topic").fg(Color::Cyan),
        Cell::new("Score").fg(Color::Cyan),
        Cell::new("Reason").fg(Color::Cyan),
    ]);

    for summary in history {
        let completed = summary
            .completed_at
            .with_timezone(&chrono::Local)
            .format("%Y-%m-%d %H:%M");
        let score = format!(
            "{}/{} ({:.0}%)",
            summary.score,
            summary.total,
            summary.percentage()
        );
        let score_color = if summary.score == summary.total {
            Color::Green
        } else {
            Color::Reset
        };
        table.add_row(vec![
            Cell::new(completed),
            Cell::new(summary.mode),
            Cell::new(summary.topic.as_deref().unwrap_or("-")),
            Cell::new(score).fg(score_color),
            Cell::new(summary.reason.as_str()),
        ]);
    }
    table
}

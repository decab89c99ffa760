use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;

use super::{open_document, resolve};

#[derive(Debug, Args)]
pub struct StatsArgs {
    /// Serialized article (JSON)
    pub input: String,

    /// Print as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn stats(args: StatsArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let editor = open_document(&resolve(cwd, &args.input), &config.editor)?;
    let stats = editor.statistic()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("{} {}", "📊".bright_blue(), args.input.bright_white().bold());
    let rows = [
        ("characters", stats.characters),
        ("paragraphs", stats.paragraphs),
        ("headers", stats.headers),
        ("lists", stats.lists),
        ("code blocks", stats.code_blocks),
        ("tables", stats.tables),
        ("images", stats.images),
        ("audio", stats.audio),
        ("video", stats.video),
        ("inline images", stats.inline_images),
    ];
    for (label, count) in rows {
        if count > 0 {
            println!("  {:<14} {}", label, count.to_string().green());
        } else {
            println!("  {:<14} {}", label.dimmed(), count.to_string().dimmed());
        }
    }
    if editor.is_empty()? {
        println!("  {}", editor.config().placeholder.dimmed());
    }
    Ok(())
}

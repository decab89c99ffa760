use crate::config::Config;
use crate::html::render_html;
use anyhow::{anyhow, Context, Result};
use clap::Args;
use colored::Colorize;
use std::fs;
use tracing::debug;
use zebra_editor::EditCommand;

use super::{emit, open_document, resolve};

#[derive(Debug, Args)]
pub struct ApplyArgs {
    /// Serialized article (JSON)
    pub input: String,

    /// Edit script: a JSON array of commands
    #[arg(short, long)]
    pub script: String,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub out: Option<String>,

    /// Emit HTML instead of the serialized article
    #[arg(long)]
    pub html: bool,

    /// Continue after a failing command
    #[arg(short, long)]
    pub keep_going: bool,
}

pub fn apply(args: ApplyArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let mut editor = open_document(&resolve(cwd, &args.input), &config.editor)?;

    let script_path = resolve(cwd, &args.script);
    let source = fs::read_to_string(&script_path)
        .with_context(|| format!("Cannot read {}", script_path.display()))?;
    let commands: Vec<EditCommand> = serde_json::from_str(&source)
        .with_context(|| format!("Invalid edit script {}", script_path.display()))?;

    eprintln!(
        "{}",
        format!("✏️  Applying {} commands...", commands.len()).bright_blue().bold()
    );

    let mut error_count = 0;
    for (index, command) in commands.iter().enumerate() {
        match command.apply(&mut editor) {
            Ok(op) => {
                debug!(command = command.name(), affected = op.affected.len(), "Applied");
                eprintln!("  {} {} {}", "✓".green(), index, command.name());
            }
            Err(e) => {
                error_count += 1;
                eprintln!(
                    "  {} {} {} - {}",
                    "✗".red(),
                    index,
                    command.name(),
                    e.to_string().red()
                );
                if !args.keep_going {
                    return Err(anyhow!("command {} ({}) failed", index, command.name()));
                }
            }
        }
    }
    editor.drain_events();

    let output = if args.html {
        render_html(&editor, &config.html)?
    } else {
        editor.to_json_pretty()?
    };
    let target = emit(cwd, args.out.as_deref(), &output)?;

    eprintln!();
    if error_count == 0 {
        eprintln!(
            "{} Applied {} commands ({} undo levels) → {}",
            "✅".green(),
            commands.len(),
            editor.history().undo_levels(),
            target
        );
    } else {
        eprintln!(
            "{} Applied {} commands, {} errors → {}",
            "⚠️".yellow(),
            commands.len() - error_count,
            error_count,
            target
        );
    }
    Ok(())
}

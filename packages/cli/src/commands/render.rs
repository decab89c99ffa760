use crate::config::Config;
use crate::html::render_html;
use anyhow::Result;
use clap::Args;
use colored::Colorize;

use super::{emit, open_document, resolve};

#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Serialized article (JSON)
    pub input: String,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub out: Option<String>,

    /// Emit a complete HTML page
    #[arg(long)]
    pub full: bool,

    /// Disable pretty printing
    #[arg(long)]
    pub compact: bool,
}

pub fn render(args: RenderArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let editor = open_document(&resolve(cwd, &args.input), &config.editor)?;

    let mut options = config.html.clone();
    options.full_document |= args.full;
    if args.compact {
        options.pretty = false;
    }

    let html = render_html(&editor, &options)?;
    let target = emit(cwd, args.out.as_deref(), &html)?;

    if args.out.is_some() {
        println!("  {} {} → {}", "✓".green(), args.input, target);
    }
    Ok(())
}

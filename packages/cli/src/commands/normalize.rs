use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::fs;

use super::{emit, open_document, resolve};

#[derive(Debug, Args)]
pub struct NormalizeArgs {
    /// Serialized article (JSON)
    pub input: String,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub out: Option<String>,

    /// Rewrite the input file in place
    #[arg(short, long)]
    pub write: bool,

    /// Only report whether the input is already normalized
    #[arg(long, conflicts_with_all = ["out", "write"])]
    pub check: bool,
}

/// Load an article and write it back in canonical form: adjacent
/// characters coalesced, table rows padded to the column count
pub fn normalize(args: NormalizeArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let path = resolve(cwd, &args.input);
    let editor = open_document(&path, &config.editor)?;
    let output = editor.to_json_pretty()?;

    if args.check {
        let source = fs::read_to_string(&path)?;
        if source.trim_end() == output {
            println!("  {} {} is normalized", "✓".green(), args.input);
            return Ok(());
        }
        return Err(anyhow::anyhow!("{} is not normalized", args.input));
    }

    let out = if args.write {
        Some(args.input.as_str())
    } else {
        args.out.as_deref()
    };
    let target = emit(cwd, out, &output)?;
    if out.is_some() {
        println!("  {} {} → {}", "✓".green(), args.input, target);
    }
    Ok(())
}

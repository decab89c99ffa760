use crate::config::{Config, DEFAULT_CONFIG_NAME};
use crate::html::HtmlOptions;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::PathBuf;
use zebra_editor::{tags, Editor, EditorConfig, RawNode};

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Document name (seeds component ids)
    #[arg(short, long, default_value = "untitled")]
    pub name: String,

    /// Starter article file
    #[arg(short, long, default_value = "article.json")]
    pub article: String,

    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &str) -> Result<()> {
    let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

    // Check if config already exists
    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!("{}", "📝 Initializing Zebra project...".bright_blue().bold());

    let config = Config {
        editor: EditorConfig {
            document_name: args.name.clone(),
            ..EditorConfig::default()
        },
        html: HtmlOptions::default(),
    };
    fs::write(&config_path, serde_json::to_string_pretty(&config)?)?;
    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);

    // Starter article with a single empty paragraph
    let article_path = PathBuf::from(cwd).join(&args.article);
    if !article_path.exists() {
        let mut editor = Editor::new(config.editor.clone());
        let root = editor.root();
        editor.add_blocks(root, None, &[RawNode::new(tags::PARAGRAPH)])?;
        fs::write(&article_path, editor.to_json_pretty()?)?;
        println!("  {} Created {}", "✓".green(), args.article);
    }

    println!();
    println!("{}", "✅ Project initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Run: zebra apply {} --script edits.json", args.article);
    println!("  2. Run: zebra render {} --full", args.article);

    Ok(())
}

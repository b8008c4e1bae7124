use std::path::PathBuf;

use clap::Parser;

/// Watches a folder tree and surfaces the summary of newly created code artifacts.
///
/// tagwatch reads the `type` and `summary` extended attributes of every file created
/// under the configured folder. Files tagged `code` have their summary shown in the
/// status label and copied to the clipboard for a short while.
#[derive(Parser, Debug)]
#[command(name = "tagwatch", version, about, long_about = None)]
pub struct Cli {
    /// Configuration file to load (defaults to `config.json` next to the executable).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log debug details to stderr.
    #[arg(short, long)]
    pub verbose: bool,
}

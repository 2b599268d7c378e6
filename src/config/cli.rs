use crate::domain::model::RunMode;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "meroshare-ipo")]
#[command(about = "Automate Meroshare IPO application processes")]
pub struct CliArgs {
    #[arg(long, help = "Only check available IPOs without applying")]
    pub check_only: bool,

    #[arg(long, help = "Apply for all available IPOs")]
    pub apply_all: bool,

    #[arg(long, value_name = "NAME", help = "Apply for a specific IPO by name")]
    pub apply: Option<String>,

    #[arg(long, help = "Run browser in headless mode")]
    pub headless: bool,

    /// Path to an optional TOML settings file
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit log lines as JSON
    #[arg(long)]
    pub json_logs: bool,
}

impl CliArgs {
    /// 旗標可同時出現；優先順序為 check-only、apply-all、apply，皆無時只檢查
    pub fn run_mode(&self) -> RunMode {
        if self.check_only {
            RunMode::CheckOnly
        } else if self.apply_all {
            RunMode::ApplyAll
        } else if let Some(name) = &self.apply {
            RunMode::ApplyOne(name.clone())
        } else {
            RunMode::CheckOnly
        }
    }
}

use crate::domain::model::{ColumnRange, Hand};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "gesture-plot")]
#[command(about = "Plot glove gesture recordings as PNG charts")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output root, overrides the configuration file
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log CPU and memory usage per phase")]
    pub monitor: bool,

    #[arg(long, global = true, help = "Emit logs as JSON lines")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Plot a column range of one recording
    Single {
        file: PathBuf,
        #[arg(long, default_value = "left")]
        hand: Hand,
        /// Inclusive 0-based column range, e.g. 0-2
        #[arg(long)]
        range: ColumnRange,
    },

    /// Side-by-side comparison of two recordings
    Compare2 {
        first: PathBuf,
        second: PathBuf,
        #[arg(long, default_value = "left")]
        hand: Hand,
        #[arg(long)]
        range: ColumnRange,
    },

    /// 2x2 comparison of four recordings
    Compare4 {
        #[arg(num_args = 4, required = true)]
        files: Vec<PathBuf>,
        #[arg(long, default_value = "left")]
        hand: Hand,
        #[arg(long)]
        range: ColumnRange,
    },

    /// 2x2 comparisons of four recordings for every standard column range
    Batch {
        #[arg(num_args = 4, required = true)]
        files: Vec<PathBuf>,
        #[arg(long, default_value = "left")]
        hand: Hand,
    },

    /// One chart per finger with both hands of a recording
    Fingers { file: PathBuf },

    /// Export the flattened table as CSV (both hands unless --hand is given)
    Export {
        file: PathBuf,
        #[arg(long)]
        hand: Option<Hand>,
    },
}

impl Command {
    /// 所有輸入檔案，用於執行前檢查副檔名
    pub fn inputs(&self) -> Vec<&PathBuf> {
        match self {
            Command::Single { file, .. } | Command::Fingers { file } | Command::Export { file, .. } => {
                vec![file]
            }
            Command::Compare2 { first, second, .. } => vec![first, second],
            Command::Compare4 { files, .. } | Command::Batch { files, .. } => files.iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_compare4() {
        let config = CliConfig::try_parse_from([
            "gesture-plot",
            "compare4",
            "a.json",
            "b.json",
            "c.json",
            "d.json",
            "--hand",
            "Right",
            "--range",
            "3-5",
            "--verbose",
        ])
        .unwrap();

        assert!(config.verbose);
        match config.command {
            Command::Compare4 { files, hand, range } => {
                assert_eq!(files.len(), 4);
                assert_eq!(hand, Hand::Right);
                assert_eq!(range, ColumnRange::new(3, 5));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_compare4_rejects_three_files() {
        let result = CliConfig::try_parse_from([
            "gesture-plot", "compare4", "a.json", "b.json", "c.json", "--range", "0-2",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_range_is_rejected() {
        let result = CliConfig::try_parse_from(["gesture-plot", "single", "a.json", "--range", "x"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_inputs_lists_every_file() {
        let config = CliConfig::try_parse_from(["gesture-plot", "compare2", "a.json", "b.json", "--range", "0-2"])
            .unwrap();
        assert_eq!(config.command.inputs().len(), 2);
    }
}

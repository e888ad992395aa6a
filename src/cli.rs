//! CLI argument parsing using clap v4
//!
//! Defines the command-line interface for omni-survey.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::export::ExportFormat;
use crate::persona::Intention;

/// OMNI survey toolkit
///
/// Classifies tax-survey respondents into personas, validates and stores
/// survey submissions, and produces review exports and participant reports.
#[derive(Parser, Debug)]
#[command(name = "omni-survey")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(short, long, env = "OMNI_CONFIG", global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Classify a respondent from their profiling answers
    Classify {
        /// Tax familiarity, 1 (none) to 5 (expert)
        #[arg(short, long, value_parser = clap::value_parser!(i32).range(1..=5))]
        familiarity: i32,

        /// Uses AI agents daily
        #[arg(long)]
        ai_daily_use: bool,

        /// Has used AI for tax matters
        #[arg(long)]
        used_ai_for_taxes: bool,

        /// Has consulted a tax advisor or expert
        #[arg(long)]
        consulted_expert: bool,

        /// Intentions in priority order (optimize, validate, urgency)
        #[arg(short, long, value_delimiter = ',')]
        priority: Vec<Intention>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,

        /// Show every candidate persona with its score
        #[arg(long)]
        explain: bool,
    },

    /// Browse the persona catalog
    Personas {
        #[command(subcommand)]
        subcommand: PersonasSubcommand,
    },

    /// List the survey questions and their options
    Questions,

    /// Validate, classify and store a submission (JSON file, or - for stdin)
    Submit {
        /// Submission document
        file: PathBuf,
    },

    /// Inspect stored submissions
    Submissions {
        #[command(subcommand)]
        subcommand: SubmissionsSubcommand,
    },

    /// Export stored submissions
    Export {
        /// Output format (defaults to export.default_format)
        #[arg(short, long, value_enum)]
        format: Option<ExportFormat>,

        /// Only include submissions assigned to this persona (name or id)
        #[arg(short, long)]
        persona: Option<String>,

        /// Output file (defaults to export.output_dir, else stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Render the plain-text report for one participant
    Report {
        /// Participant id, e.g. TD-OMNI-3FA9
        participant_id: String,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Display version and build information
    Version,

    /// Configuration management
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

/// Persona catalog subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum PersonasSubcommand {
    /// List all personas
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one persona
    Show {
        /// Persona id, e.g. laura
        id: String,
    },
}

/// Stored submission subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum SubmissionsSubcommand {
    /// List stored submissions, newest first
    List {
        /// Only include submissions assigned to this persona (name or id)
        #[arg(short, long)]
        persona: Option<String>,
    },
}

/// Configuration subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigSubcommand {
    /// Display the effective configuration
    Show,

    /// Initialize a new configuration file
    Init {
        /// Path where to create the config file
        #[arg(short, long)]
        path: Option<String>,

        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Validate the configuration
    Validate,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_classify_command() {
        let cli = Cli::parse_from([
            "omni-survey",
            "classify",
            "--familiarity",
            "5",
            "--consulted-expert",
            "--priority",
            "optimize,validate",
            "--explain",
        ]);
        match cli.command {
            Commands::Classify {
                familiarity,
                ai_daily_use,
                consulted_expert,
                priority,
                json,
                explain,
                ..
            } => {
                assert_eq!(familiarity, 5);
                assert!(!ai_daily_use);
                assert!(consulted_expert);
                assert_eq!(priority, vec![Intention::Optimize, Intention::Validate]);
                assert!(!json);
                assert!(explain);
            }
            _ => panic!("Expected Classify command"),
        }
    }

    #[test]
    fn test_classify_rejects_out_of_range_familiarity() {
        let result = Cli::try_parse_from(["omni-survey", "classify", "--familiarity", "6"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_classify_rejects_unknown_intention() {
        let result = Cli::try_parse_from([
            "omni-survey",
            "classify",
            "-f",
            "3",
            "--priority",
            "relax",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_personas_show() {
        let cli = Cli::parse_from(["omni-survey", "personas", "show", "elena"]);
        match cli.command {
            Commands::Personas {
                subcommand: PersonasSubcommand::Show { id },
            } => assert_eq!(id, "elena"),
            _ => panic!("Expected Personas Show command"),
        }
    }

    #[test]
    fn test_export_defaults() {
        let cli = Cli::parse_from(["omni-survey", "export"]);
        match cli.command {
            Commands::Export {
                format,
                persona,
                output,
            } => {
                assert!(format.is_none());
                assert!(persona.is_none());
                assert!(output.is_none());
            }
            _ => panic!("Expected Export command"),
        }
    }

    #[test]
    fn test_export_with_options() {
        let cli = Cli::parse_from([
            "omni-survey",
            "export",
            "--format",
            "csv",
            "--persona",
            "Laura",
            "--output",
            "out.csv",
        ]);
        match cli.command {
            Commands::Export {
                format,
                persona,
                output,
            } => {
                assert_eq!(format, Some(ExportFormat::Csv));
                assert_eq!(persona.as_deref(), Some("Laura"));
                assert_eq!(output, Some(PathBuf::from("out.csv")));
            }
            _ => panic!("Expected Export command"),
        }
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::parse_from(["omni-survey", "questions", "-vv", "--config", "x.toml"]);
        assert_eq!(cli.verbose, 2);
        assert!(!cli.quiet);
        assert_eq!(cli.config.as_deref(), Some("x.toml"));
    }

    #[test]
    fn test_config_init() {
        let cli = Cli::parse_from(["omni-survey", "config", "init", "--force"]);
        match cli.command {
            Commands::Config {
                subcommand: ConfigSubcommand::Init { path, force },
            } => {
                assert!(path.is_none());
                assert!(force);
            }
            _ => panic!("Expected Config Init command"),
        }
    }
}

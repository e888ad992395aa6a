//! omni-survey: persona classification and survey intake for the OMNI pre-survey
//!
//! This is the main entry point for the omni-survey binary. It classifies
//! respondents from their profiling answers, validates and stores complete
//! survey submissions, and renders exports and participant reports.

mod cli;
mod config;
mod error;
mod export;
mod logging;
mod persona;
mod report;
mod store;
mod survey;
mod version;

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use clap::Parser;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cli::{Cli, Commands, ConfigSubcommand, PersonasSubcommand, SubmissionsSubcommand};
use crate::config::SurveyConfig;
use crate::error::{Error, Result};
use crate::export::ExportFormat;
use crate::persona::{catalog, Intention, PersonaId, PersonaResult, ProfilingInput, Suggestion};
use crate::store::SubmissionStore;
use crate::survey::{questions, Submission};

/// Attempts at drawing an unused participant id before giving up.
const MAX_ID_ATTEMPTS: usize = 16;

fn main() {
    // Parse CLI arguments first (before logging, so we know verbosity)
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        tracing::error!(error = %e.format_for_log(), "Command failed");
        eprint!("{}", e.format_for_terminal());
        std::process::exit(e.exit_code());
    }
}

fn run(cli: Cli) -> Result<()> {
    // Commands that don't need the configuration or full logging
    match &cli.command {
        Commands::Version => {
            version::print_version();
            return Ok(());
        }
        Commands::Config { subcommand } => {
            logging::init_simple(if cli.quiet {
                tracing::Level::ERROR
            } else {
                tracing::Level::WARN
            })?;
            return handle_config_command(subcommand.clone(), cli.config.as_deref());
        }
        _ => {}
    }

    let config = SurveyConfig::load(cli.config.as_deref())?;

    // The guards must be kept alive for the lifetime of the program
    let _log_guards = logging::init_logging(&config.logging, cli.verbose, cli.quiet)?;

    let build = version::build_info();
    debug!(
        version = %build.full_version(),
        target = %build.target,
        data_dir = %config.storage.data_dir,
        "Starting omni-survey"
    );

    match cli.command {
        Commands::Classify {
            familiarity,
            ai_daily_use,
            used_ai_for_taxes,
            consulted_expert,
            priority,
            json,
            explain,
        } => {
            let input = ProfilingInput {
                tax_familiarity: familiarity,
                ai_daily_use,
                used_ai_for_taxes,
                consulted_expert,
                intention_priority: priority,
            };
            run_classify(&input, json, explain)
        }
        Commands::Personas { subcommand } => handle_personas_command(subcommand),
        Commands::Questions => {
            print_questions();
            Ok(())
        }
        Commands::Submit { file } => run_submit(&config, &file),
        Commands::Submissions { subcommand } => handle_submissions_command(&config, subcommand),
        Commands::Export {
            format,
            persona,
            output,
        } => run_export(&config, format, persona.as_deref(), output),
        Commands::Report {
            participant_id,
            output,
        } => run_report(&config, &participant_id, output),
        // Handled before the configuration is loaded
        Commands::Version | Commands::Config { .. } => Ok(()),
    }
}

// ─────────────────────────────────────────────────────────────────
// Classification
// ─────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct Explanation<'a> {
    result: &'a PersonaResult,
    candidates: &'a [Suggestion],
}

fn run_classify(input: &ProfilingInput, json: bool, explain: bool) -> Result<()> {
    let candidates = persona::rank(input);
    let result = persona::classify(input);

    if json {
        let body = if explain {
            serde_json::to_string_pretty(&Explanation {
                result: &result,
                candidates: &candidates,
            })
        } else {
            serde_json::to_string_pretty(&result)
        };
        let body = body.map_err(|e| Error::Internal(format!("Failed to encode result: {}", e)))?;
        println!("{}", body);
        return Ok(());
    }

    println!("Persona:   {} ({})", result.persona_name, result.persona_id);
    println!("Rationale: {}", result.rationale);

    if explain {
        let primary = input
            .intention_priority
            .first()
            .copied()
            .unwrap_or(Intention::Validate);
        println!();
        println!("Primary intention: {}", primary.label());
        println!("Candidates:");
        for (rank, s) in candidates.iter().enumerate() {
            println!(
                "  {:>2}. {:<8} {:>3}  {}",
                rank + 1,
                s.persona_name,
                s.score,
                s.reason
            );
        }
    }

    Ok(())
}

fn handle_personas_command(subcommand: PersonasSubcommand) -> Result<()> {
    match subcommand {
        PersonasSubcommand::List { json } => {
            if json {
                let body = serde_json::to_string_pretty(catalog::all())
                    .map_err(|e| Error::Internal(format!("Failed to encode catalog: {}", e)))?;
                println!("{}", body);
            } else {
                for p in catalog::all() {
                    println!("{:<8} {:<8} {}", p.id.as_str(), p.name, p.short_desc);
                }
            }
        }
        PersonasSubcommand::Show { id } => {
            let id: PersonaId = id.parse()?;
            let p = catalog::get(id);
            println!("{} ({})", p.name, p.id);
            println!("  Description: {}", p.short_desc);
            println!("  Color:       {}", p.color);
        }
    }
    Ok(())
}

fn print_questions() {
    for q in questions::all() {
        let limit = if q.is_single_choice() {
            "una opción".to_string()
        } else {
            format!("hasta {} opciones", q.max_selections)
        };
        println!("{} [{}] ({})", q.title, q.key, limit);
        for (idx, option) in q.options.iter().enumerate() {
            println!("  {:>2}. {}", idx + 1, option);
        }
        if q.allows_other {
            println!(
                "      + Otro (texto libre, máx. {} caracteres)",
                questions::OTHER_MAX_CHARS
            );
        }
        println!();
    }
    println!(
        "{} [q19_openText] (opcional, máx. {} caracteres)",
        questions::OPEN_TEXT_TITLE,
        questions::OPEN_TEXT_MAX_CHARS
    );
}

// ─────────────────────────────────────────────────────────────────
// Submissions
// ─────────────────────────────────────────────────────────────────

fn open_store(config: &SurveyConfig) -> Result<SubmissionStore> {
    SubmissionStore::open(&config.data_dir())
}

fn read_input(file: &Path) -> Result<String> {
    if file.as_os_str() == "-" {
        let mut content = String::new();
        std::io::stdin().read_to_string(&mut content)?;
        return Ok(content);
    }
    fs::read_to_string(file).map_err(|e| Error::IoRead {
        path: file.to_path_buf(),
        source: e,
    })
}

/// Intake pipeline: parse, assign id, classify, validate, store.
fn run_submit(config: &SurveyConfig, file: &Path) -> Result<()> {
    let mut submission: Submission = serde_json::from_str(&read_input(file)?)?;
    let store = open_store(config)?;

    if submission.participant_id.trim().is_empty() {
        submission.participant_id = fresh_participant_id(&store, &config.survey.participant_prefix)?;
        debug!(participant_id = %submission.participant_id, "Assigned participant id");
    }

    let result = persona::classify(submission.profiling());
    if let Some(claimed) = submission.persona() {
        if claimed.persona_id != result.persona_id {
            warn!(
                participant_id = %submission.participant_id,
                claimed = %claimed.persona_id,
                computed = %result.persona_id,
                "Submitted persona differs from classification, using computed persona"
            );
        }
    }
    submission.assign_persona(result);

    submission.validate()?;
    let stored = store.insert(submission)?;

    println!("{}", stored.participant_id());
    Ok(())
}

fn fresh_participant_id(store: &SubmissionStore, prefix: &str) -> Result<String> {
    for _ in 0..MAX_ID_ATTEMPTS {
        let id = survey::generate_participant_id(prefix);
        if store.get(&id).is_err() {
            return Ok(id);
        }
    }
    Err(Error::Internal(format!(
        "No unused participant id found for prefix '{}'",
        prefix
    )))
}

/// Resolve a `--persona` filter (display name or id) to a catalog display name.
fn resolve_persona_filter(filter: Option<&str>) -> Result<Option<&'static str>> {
    let Some(filter) = filter else {
        return Ok(None);
    };
    catalog::find_by_name(filter)
        .or_else(|| catalog::find(filter))
        .map(|p| Some(p.name))
        .ok_or_else(|| Error::UnknownPersona {
            id: filter.to_string(),
        })
}

fn handle_submissions_command(config: &SurveyConfig, subcommand: SubmissionsSubcommand) -> Result<()> {
    match subcommand {
        SubmissionsSubcommand::List { persona } => {
            let filter = resolve_persona_filter(persona.as_deref())?;
            let records = open_store(config)?.list(filter);
            if records.is_empty() {
                println!("No submissions found.");
                return Ok(());
            }
            for r in &records {
                println!(
                    "{:<16} {:<8} {}  {}",
                    r.participant_id(),
                    r.persona_name(),
                    r.created_at.format("%Y-%m-%d %H:%M"),
                    r.submission.name
                );
            }
        }
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────
// Export / Report
// ─────────────────────────────────────────────────────────────────

fn write_output(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| Error::IoWrite {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }
    fs::write(path, content).map_err(|e| Error::IoWrite {
        path: path.to_path_buf(),
        source: e,
    })
}

fn run_export(
    config: &SurveyConfig,
    format: Option<ExportFormat>,
    persona: Option<&str>,
    output: Option<PathBuf>,
) -> Result<()> {
    let format = format.unwrap_or_else(|| config.export_format());
    let filter = resolve_persona_filter(persona)?;
    let records = open_store(config)?.list(filter);
    let body = export::render(format, &records)?;

    let target = output.or_else(|| config.export_dir().map(|dir| dir.join(format.file_name())));
    match target {
        Some(path) => {
            write_output(&path, &body)?;
            info!(
                path = %path.display(),
                format = %format,
                records = records.len(),
                "Export written"
            );
            println!("Exported {} submissions to {}", records.len(), path.display());
        }
        None => println!("{}", body),
    }
    Ok(())
}

fn run_report(config: &SurveyConfig, participant_id: &str, output: Option<PathBuf>) -> Result<()> {
    let record = open_store(config)?.get(participant_id)?;
    let text = report::render(&record);

    match output {
        Some(path) => {
            write_output(&path, &text)?;
            info!(participant_id, path = %path.display(), "Report written");
        }
        None => println!("{}", text),
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────

fn handle_config_command(subcommand: ConfigSubcommand, config_path: Option<&str>) -> Result<()> {
    match subcommand {
        ConfigSubcommand::Show => {
            let cfg = SurveyConfig::load(config_path)?;
            println!("{}", toml::to_string_pretty(&cfg)?);
        }
        ConfigSubcommand::Init { path, force } => {
            let written = config::init_config(path.as_deref(), force)?;
            println!("Configuration file created: {}", written.display());
        }
        ConfigSubcommand::Validate => {
            SurveyConfig::load(config_path)?;
            println!("Configuration is valid.");
        }
    }

    Ok(())
}

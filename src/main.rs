//! Osiris guards CLI - check form documents against their guards

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use serde_json::json;

use osiris_guards::{FixSuggestion, Form, FormConfig, FormDefinition};

#[derive(Parser)]
#[command(name = "osiris-guards")]
#[command(about = "Check Osiris form guards offline")]
#[command(version)]
struct Cli {
    /// TOML config with naming conventions
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate every field of a form document, as on submit
    Check {
        /// Path to the form document (.json, .yaml)
        file: PathBuf,

        /// Override a field value (repeatable)
        #[arg(short, long = "set", value_name = "NAME=VALUE")]
        set: Vec<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },

    /// Report guard configuration problems
    Lint {
        /// Path to the form document (.json, .yaml)
        file: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let result = load_config(cli.config.as_deref()).and_then(|config| match cli.command {
        Commands::Check { file, set, format } => check_form(&file, &set, format, &config),
        Commands::Lint { file } => lint_form(&file),
    });

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            if let Some(suggestion) = e
                .downcast_ref::<osiris_guards::GuardError>()
                .and_then(|g| g.fix_suggestion())
            {
                eprintln!("  {} {}", "Fix:".yellow(), suggestion);
            }
            ExitCode::from(2)
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<FormConfig> {
    let config = match path {
        Some(path) => FormConfig::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => FormConfig::default(),
    };
    Ok(config.with_env())
}

fn load_definition(file: &Path) -> Result<FormDefinition> {
    FormDefinition::from_path(file)
        .with_context(|| format!("Failed to load form document {}", file.display()))
}

fn check_form(
    file: &Path,
    set: &[String],
    format: Format,
    config: &FormConfig,
) -> Result<bool> {
    let mut definition = load_definition(file)?;
    for assignment in set {
        let Some((name, value)) = assignment.split_once('=') else {
            bail!("Invalid --set '{}': expected NAME=VALUE", assignment);
        };
        definition.set_value(name, value);
    }

    let mut form = definition.to_form(config);
    let valid = form.validate_all();

    match format {
        Format::Text => print_text(&form, file, valid),
        Format::Json => print_json(&form, valid)?,
    }

    Ok(valid)
}

fn print_text(form: &Form, file: &Path, valid: bool) {
    for field in form.errored_fields() {
        let region = form.presenter().region_id(field);
        println!("{} {} ({})", "✗".red(), field.bold(), region.dimmed());
        for violation in form.errors(field) {
            println!("    {}", violation);
        }
    }

    for error in form.config_errors() {
        println!("{} {}", "!".yellow(), error);
    }

    if valid {
        println!("{} Form '{}' is valid", "✓".green(), file.display());
    } else {
        println!(
            "{} Form '{}' has {} errored field(s); submission would be cancelled",
            "✗".red(),
            file.display(),
            form.errored_fields().len()
        );
    }
}

fn print_json(form: &Form, valid: bool) -> Result<()> {
    let fields: serde_json::Map<String, serde_json::Value> = form
        .errored_fields()
        .into_iter()
        .map(|field| {
            let errors: Vec<_> = form
                .errors(field)
                .iter()
                .map(|v| json!({ "kind": v.kind(), "message": v.to_string() }))
                .collect();
            (field.to_string(), json!(errors))
        })
        .collect();

    let config_errors: Vec<String> = form.config_errors().iter().map(|e| e.to_string()).collect();

    let report = json!({
        "valid": valid,
        "errors": fields,
        "config_errors": config_errors,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn lint_form(file: &Path) -> Result<bool> {
    let definition = load_definition(file)?;
    let problems = definition.lint();

    if problems.is_empty() {
        println!(
            "{} {} guard(s) in '{}' look fine",
            "✓".green(),
            definition.guards.len(),
            file.display()
        );
        return Ok(true);
    }

    for problem in &problems {
        println!("{} {}", "✗".red(), problem);
        if let Some(suggestion) = problem.fix_suggestion() {
            println!("  {} {}", "Fix:".yellow(), suggestion);
        }
    }
    Ok(false)
}

//! hoops CLI — read and write nested JSON/YAML documents by key path.
//!
//! # Usage
//!
//! ```text
//! hoops get config.json server.port
//! hoops get config.json server.tls --default false
//! hoops exists config.yaml server.hosts
//! hoops set config.json server.limits.max_body 1048576
//! hoops update config.json server.port 9090 --lenient
//! hoops apply config.json changes.json --dry-run
//! hoops banner
//! ```

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use hoops_core::access::Policy;
use hoops_core::command::{self, Command, Response};
use hoops_core::config::{self, Settings};
use hoops_core::document::Document;
use tracing_subscriber::EnvFilter;


#[derive(Parser, Debug)]
#[command(name = "hoops", version, about = "Read and write nested documents by key path")]
struct Cli {
    #[arg(long, global = true, help = "Settings file (YAML)")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the value at a path as JSON.
    Get {
        file: PathBuf,
        path: String,
        #[arg(long, help = "Value (JSON) to print when the path does not resolve")]
        default: Option<String>,
    },
    /// Print whether a path exists.
    Exists {
        file: PathBuf,
        path: String,
    },
    /// Set a value, creating intermediate mappings.
    Set {
        file: PathBuf,
        path: String,
        value: String,
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },
    /// Overwrite a value that already exists.
    Update {
        file: PathBuf,
        path: String,
        value: String,
        #[arg(long, default_value_t = false, help = "Skip silently when the path is missing")]
        lenient: bool,
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },
    /// Run a JSON script of commands against a document.
    Apply {
        file: PathBuf,
        script: PathBuf,
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },
    /// Print the package banner.
    Banner,
}


fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("hoops: {}", e);
        process::exit(1);
    }
}


fn run(cli: Cli) -> Result<(), String> {
    let settings = match &cli.config {
        Some(path) => config::load(path).map_err(|e| e.to_string())?,
        None => Settings::default(),
    };

    match cli.command {
        Commands::Banner => {
            print!("{}", banner());
            Ok(())
        }
        Commands::Get { file, path, default } => {
            let default = default.as_deref().map(parse_value);
            run_one(&file, Command::Get { path: path.into(), default }, &settings, false)
        }
        Commands::Exists { file, path } => {
            run_one(&file, Command::Exists { path: path.into() }, &settings, false)
        }
        Commands::Set { file, path, value, dry_run } => {
            let cmd = Command::Set { path: path.into(), value: parse_value(&value) };
            run_one(&file, cmd, &settings, dry_run)
        }
        Commands::Update { file, path, value, lenient, dry_run } => {
            let policy = if lenient { Some(Policy::Lenient) } else { None };
            let cmd = Command::Update { path: path.into(), value: parse_value(&value), policy };
            run_one(&file, cmd, &settings, dry_run)
        }
        Commands::Apply { file, script, dry_run } => {
            let content = std::fs::read_to_string(&script)
                .map_err(|e| format!("cannot read {}: {}", script.display(), e))?;
            let commands = command::parse_script(&content)
                .map_err(|e| format!("invalid script {}: {}", script.display(), e))?;
            run_many(&file, &commands, &settings, dry_run)
        }
    }
}


fn run_one(file: &Path, cmd: Command, settings: &Settings, dry_run: bool) -> Result<(), String> {
    run_many(file, std::slice::from_ref(&cmd), settings, dry_run)
}

/// Execute commands, print their output, then persist the document if it
/// changed.
fn run_many(file: &Path, commands: &[Command], settings: &Settings, dry_run: bool) -> Result<(), String> {
    let mut doc = Document::load(file).map_err(|e| e.to_string())?;
    let responses = command::run_script(commands, &mut doc, settings);

    let mut failure = None;
    for resp in responses {
        match resp {
            Response::Ok { output } => {
                if !output.is_empty() {
                    println!("{}", output);
                }
            }
            Response::Error { message } => failure = Some(message),
        }
    }

    if let Some(message) = failure {
        return Err(message);
    }

    if dry_run {
        if commands.iter().any(Command::is_mutation) {
            let rendered = doc.render(settings.pretty).map_err(|e| e.to_string())?;
            print!("{}", rendered);
        }
    } else if doc.is_dirty() {
        tracing::info!(file = %file.display(), paths = ?doc.dirty_paths(), "writing document");
        doc.save(file, settings.pretty).map_err(|e| e.to_string())?;
    }
    Ok(())
}


/// Interpret a command-line value as JSON, falling back to a plain string.
fn parse_value(raw: &str) -> serde_json::Value {
    serde_json::from_str(raw).unwrap_or_else(|_| serde_json::Value::String(raw.to_string()))
}


fn banner() -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{} - {}\n\n",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_DESCRIPTION")
    ));
    out.push_str(&format!("version   {}\n", env!("CARGO_PKG_VERSION")));
    let link = env!("CARGO_PKG_HOMEPAGE");
    if !link.is_empty() {
        out.push_str(&format!("link      {}\n", link));
    }
    out.push_str(&format!("author    {}\n", env!("CARGO_PKG_AUTHORS").replace(':', ", ")));
    out.push_str(&format!("license   {}\n", env!("CARGO_PKG_LICENSE")));
    out
}

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use mintsync::config::Settings;
use mintsync::report::LogProgress;
use mintsync::service::DocService;
use mintsync::watch;

/// Keep Mintlify documentation references consistent across renames and moves.
#[derive(Parser)]
#[command(name = "mintsync", version, about)]
struct Cli {
    /// Documentation project root.
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    /// Emit machine-readable JSON instead of a human summary.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Update every reference to a file that was renamed or moved.
    Rename {
        /// Previous path of the file.
        old: PathBuf,
        /// Current path of the file.
        new: PathBuf,
    },
    /// Update references for every documentation file under a renamed directory.
    MoveDir {
        /// Previous path of the directory.
        old: PathBuf,
        /// Current path of the directory.
        new: PathBuf,
    },
    /// List every link, import and navigation entry pointing at a file.
    Analyze {
        /// File to analyze.
        file: PathBuf,
    },
    /// Validate the navigation config (docs.json or mint.json).
    Validate,
    /// Watch the project and update references as files are renamed or moved.
    Watch,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("mintsync=info")),
        )
        .init();

    let cli = Cli::parse();
    let settings = Settings::new(&cli.root)?;
    let service = DocService::new(settings, &cli.root)?;

    match cli.command {
        Command::Rename { old, new } => {
            let old = absolute(&service, &old);
            let new = absolute(&service, &new);
            let result = service.update_references_for_file(&old, &new, &mut LogProgress);
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("{}", result.summary());
            }
        }
        Command::MoveDir { old, new } => {
            let old = absolute(&service, &old);
            let new = absolute(&service, &new);
            let result = service.handle_folder_rename(&old, &new, &mut LogProgress);
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("{}", result.summary());
            }
        }
        Command::Analyze { file } => {
            let file = absolute(&service, &file);
            let report = service
                .analyze_file(&file)
                .with_context(|| format!("cannot analyze {}", file.display()))?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
        }
        Command::Validate => {
            let report = service.validate_navigation();
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else if report.is_valid {
                println!("Navigation config is valid.");
            } else {
                for error in &report.errors {
                    eprintln!("error: {error}");
                }
                std::process::exit(1);
            }
        }
        Command::Watch => {
            watch::watch(&service).await?;
        }
    }

    Ok(())
}

/// CLI paths may be given relative to the invocation directory.
fn absolute(service: &DocService, path: &PathBuf) -> PathBuf {
    if path.is_absolute() {
        path.clone()
    } else {
        service.resolver().root_dir().join(path)
    }
}

fn print_report(report: &mintsync::service::ReferenceReport) {
    println!("References to {}:", report.file);
    println!("  Links ({}):", report.links.len());
    for link in &report.links {
        println!("    {}: [{}]({})", link.file, link.link_text, link.link_path);
    }
    println!("  Imports ({}):", report.imports.len());
    for import in &report.imports {
        println!("    {}: {}", import.file, import.statement);
    }
    println!("  Navigation entries ({}):", report.navigation.len());
    for nav in &report.navigation {
        println!("    {} ({})", nav.page_path, nav.location);
    }
}

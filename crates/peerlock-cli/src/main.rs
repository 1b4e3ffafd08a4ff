//! # peerlock-cli
//!
//! Resolves peer-dependency conflicts in a JavaScript package manifest:
//! discovers a manifest, resolves the dependency closure, and writes the
//! resolved versions back after confirmation.

use std::collections::HashMap;

use anyhow::Result;
use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Select};
use tracing::info;

mod error;
mod manifest;
mod output;

use error::{CliError, CliResult};
use manifest::Manifest;
use output::errors::ErrorFormatter;
use output::OutputHandler;
use peerlock_core::ResolverConfig;
use peerlock_registry::RegistryClient;

/// Resolves peer-dependency conflicts in a JavaScript package manifest.
#[derive(Parser)]
#[command(name = "peerlock", version, about = "Peer-dependency conflict resolver")]
struct Cli {
    /// Skip interactive confirmation prompts, defaulting to "yes".
    #[arg(long)]
    yes: bool,

    /// Operate on this manifest file directly, skipping discovery.
    #[arg(long, value_name = "FILE")]
    path: Option<Utf8PathBuf>,

    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let output = OutputHandler::new();
    match run(&cli, &output) {
        Ok(()) => Ok(()),
        Err(CliError::Cancelled) => Ok(()),
        Err(err) => {
            eprintln!("{}", ErrorFormatter::new().format(&err));
            std::process::exit(1);
        }
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(format!("peerlock={level},peerlock_resolver={level}"))
        .with_target(false)
        .init();
}

fn run(cli: &Cli, output: &OutputHandler) -> CliResult<()> {
    let cwd = Utf8PathBuf::from_path_buf(
        std::env::current_dir().expect("current directory is accessible"),
    )
    .expect("current directory is valid UTF-8");

    let manifest_path = match &cli.path {
        Some(path) => path.clone(),
        None => select_manifest(&cwd, cli.yes, output)?,
    };

    let mut manifest = Manifest::load(&manifest_path)?;
    let seeds = manifest.dependency_names();
    let restrictions = manifest.restrictions();

    if seeds.is_empty() {
        output.info("no dependency sections found, nothing to resolve");
        return Ok(());
    }

    let working_dir = manifest_path.parent().unwrap_or(Utf8Path::new(".")).to_owned();
    let config = ResolverConfig::load(working_dir.as_std_path())?;
    let mut registry = RegistryClient::new(config.registry_command.clone(), working_dir.as_std_path())?;

    output.step(&format!("resolving {} direct dependencies", seeds.len()));
    let outcome = peerlock_resolver::resolve(&mut registry, &config, &seeds, &restrictions)?;

    report(output, &outcome);

    if !confirm(cli.yes, "write resolved versions back into the manifest?")? {
        output.info("skipped manifest write");
        return Ok(());
    }

    manifest.write_backup()?;
    manifest.apply_versions(&outcome.versions);
    manifest.write()?;
    output.success(&format!("wrote {}", manifest.path));

    write_sibling_files(&working_dir, &outcome)?;

    if confirm(cli.yes, "remove the backup and cache files?")? {
        let _ = std::fs::remove_file(manifest.backup_path());
        let _ = std::fs::remove_file(registry.cache_path());
        output.info("removed temporary files");
    }

    Ok(())
}

fn select_manifest(cwd: &Utf8Path, yes: bool, output: &OutputHandler) -> CliResult<Utf8PathBuf> {
    let candidates = manifest::discover(cwd);
    if candidates.is_empty() {
        return Err(CliError::ManifestNotFound { root: cwd.to_owned() });
    }
    if candidates.len() == 1 || yes {
        return Ok(candidates[0].clone());
    }

    let labels: Vec<String> = candidates.iter().map(|p| p.to_string()).collect();
    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("select a manifest to resolve (Esc to exit)")
        .items(&labels)
        .default(0)
        .interact_opt()
        .map_err(|_| CliError::Cancelled)?;

    match selection {
        Some(idx) => {
            output.info(&format!("using {}", candidates[idx]));
            Ok(candidates[idx].clone())
        }
        None => Err(CliError::Cancelled),
    }
}

fn confirm(yes: bool, prompt: &str) -> CliResult<bool> {
    if yes {
        return Ok(true);
    }
    Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(|_| CliError::Cancelled)
}

fn report(output: &OutputHandler, outcome: &peerlock_resolver::ResolutionOutcome) {
    let mut names: Vec<&String> = outcome.versions.keys().collect();
    names.sort();
    for name in names {
        let version = &outcome.versions[name];
        output.info(&format!("{name}: {version}"));
    }

    if !outcome.added_beyond_seed.is_empty() {
        output.step(&format!(
            "discovered {} transitive peer(s): {}",
            outcome.added_beyond_seed.len(),
            outcome.added_beyond_seed.join(", ")
        ));
    }
    if !outcome.stale.is_empty() {
        output.warn(&format!("stale (skipped in conflict detection): {}", outcome.stale.join(", ")));
    }

    info!(resolved = outcome.versions.len(), "resolution complete");
}

fn write_sibling_files(dir: &Utf8Path, outcome: &peerlock_resolver::ResolutionOutcome) -> CliResult<()> {
    let versions: HashMap<&str, String> =
        outcome.versions.iter().map(|(k, v)| (k.as_str(), v.to_string())).collect();
    peerlock_core::json::write_pretty_4space(dir.join("peerlock-versions.json").as_std_path(), &versions)
        .map_err(|_| CliError::ManifestNotFound { root: dir.to_owned() })?;

    let peers: HashMap<&str, serde_json::Value> = outcome
        .peers
        .iter()
        .map(|(name, summary)| {
            (
                name.as_str(),
                serde_json::json!({
                    "version": summary.version.to_string(),
                    "peerDependencies": summary.peer_dependencies,
                    "requiredBy": summary.required_by,
                    "stale": summary.stale,
                }),
            )
        })
        .collect();
    peerlock_core::json::write_pretty_4space(dir.join("peerlock-peers.json").as_std_path(), &peers)
        .map_err(|_| CliError::ManifestNotFound { root: dir.to_owned() })?;

    Ok(())
}

//! `config` subcommand: edit the persisted defaults

use crate::config::{parse_package_list, ConfigStore, ResolvedConfig};
use crate::request;
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;

/// CLI arguments for the config command
#[derive(Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Print the current configuration and exit
    pub show: bool,

    pub packages: Option<Vec<String>>,

    /// Default project directory; an empty path clears it
    pub path: Option<PathBuf>,

    pub build_manifest: Option<bool>,

    pub project_manifest: Option<bool>,
}

impl ConfigArgs {
    fn has_edits(&self) -> bool {
        self.packages.is_some()
            || self.path.is_some()
            || self.build_manifest.is_some()
            || self.project_manifest.is_some()
    }
}

/// Apply flag-provided edits to `config`
pub fn apply_edits(config: &mut ResolvedConfig, args: &ConfigArgs) {
    if let Some(packages) = &args.packages {
        config.default_packages = packages
            .iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();
    }
    if let Some(path) = &args.path {
        config.default_project_path = (!path.as_os_str().is_empty()).then(|| path.clone());
    }
    if let Some(emit) = args.build_manifest {
        config.emit_build_manifest = emit;
    }
    if let Some(emit) = args.project_manifest {
        config.emit_project_manifest = emit;
    }
}

/// Show or edit the configuration, prompting when no edits were passed as flags
pub fn run_config(args: ConfigArgs, store: &ConfigStore, mut config: ResolvedConfig) -> Result<()> {
    if args.show {
        let yaml = serde_yaml::to_string(&config).context("Failed to render configuration")?;
        println!("{}", format!("# {}", store.config_path().display()).dimmed());
        print!("{}", yaml);
        return Ok(());
    }

    if args.has_edits() {
        apply_edits(&mut config, &args);
    } else {
        cliclack::intro("Configure defaults")?;
        prompt_edits(&mut config)?;
    }

    store.save(&config)?;
    tracing::info!(path = %store.config_path().display(), "configuration updated");

    if args.has_edits() {
        println!(
            "{} {}",
            "Configuration updated at".green(),
            store.config_path().display()
        );
    } else {
        cliclack::outro(format!(
            "Configuration updated at {}",
            store.config_path().display()
        ))?;
    }
    Ok(())
}

fn prompt_edits(config: &mut ResolvedConfig) -> Result<()> {
    let current_packages = config.default_packages.join(", ");
    let mut packages = cliclack::input("Default packages to install (comma delimited)")
        .placeholder("requests, rich")
        .required(false);
    if !current_packages.is_empty() {
        packages = packages.default_input(&current_packages);
    }
    let packages: String = packages.interact()?;
    config.default_packages = parse_package_list(&packages);

    let current_path = config
        .default_project_path
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_default();
    let mut path = cliclack::input("Default project directory (leave empty for none)")
        .required(false)
        .validate(|input: &String| {
            let trimmed = input.trim();
            if trimmed.is_empty() {
                return Ok(());
            }
            match request::validate_path(&PathBuf::from(trimmed)).first() {
                Some(issue) => Err(issue.to_string()),
                None => Ok(()),
            }
        });
    if !current_path.is_empty() {
        path = path.default_input(&current_path);
    }
    let path: String = path.interact()?;
    let path = path.trim();
    config.default_project_path = (!path.is_empty()).then(|| PathBuf::from(path));

    config.emit_build_manifest = cliclack::confirm("Generate setup.py?")
        .initial_value(config.emit_build_manifest)
        .interact()?;
    config.emit_project_manifest = cliclack::confirm("Generate pyproject.toml?")
        .initial_value(config.emit_project_manifest)
        .interact()?;

    Ok(())
}

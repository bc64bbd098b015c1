//! dev-template CLI - Python project scaffolding with an isolated environment

use anyhow::Result;
use clap::{Parser, Subcommand};
use dev_template_core::config::config_dir;
use dev_template_core::tui::{ConfigArgs, CreateArgs};
use dev_template_core::{logging, CancelFlag, ConfigStore, PipelineResult, ProductConfig};
use std::path::PathBuf;

/// dev-template product configuration
#[derive(Clone)]
pub struct DevTemplateConfig;

impl ProductConfig for DevTemplateConfig {
    fn name(&self) -> &'static str {
        "dev-template"
    }

    fn display_name(&self) -> &'static str {
        "dev-template"
    }

    fn config_dir_env(&self) -> &'static str {
        "DEV_TEMPLATE_CONFIG_DIR"
    }

    fn next_steps(&self, result: &PipelineResult) -> Vec<String> {
        let mut steps = Vec::new();
        let current = std::env::current_dir().ok();

        // Step 1: cd to directory if not current
        if current.as_ref() != Some(&result.root_path) {
            steps.push(format!("cd {}", result.root_path.display()));
        }

        // Step 2: Activate the environment
        let env_name = result
            .env_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if cfg!(windows) {
            steps.push(format!("{}\\Scripts\\activate", env_name));
        } else {
            steps.push(format!("source {}/bin/activate", env_name));
        }

        // Step 3: Retry anything that failed
        if !result.failed_packages.is_empty() {
            steps.push(format!(
                "Retry failed packages: pip install {}",
                result.failed_packages.join(" ")
            ));
        }

        steps
    }
}

#[derive(Parser, Debug)]
#[command(name = "dev-template")]
#[command(about = "CLI for scaffolding Python projects with an isolated environment")]
#[command(version)]
pub struct Args {
    /// Log at debug level for this run
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a new project
    Create(CliCreateArgs),
    /// Show or edit the default packages, project path and generated manifests
    Config(CliConfigArgs),
}

#[derive(Parser, Debug)]
pub struct CliCreateArgs {
    /// Project name
    #[arg(short, long)]
    pub name: Option<String>,

    /// Directory to create the project in
    #[arg(short, long)]
    pub path: Option<PathBuf>,

    /// Packages to install (comma-separated); replaces the configured defaults
    #[arg(long, value_delimiter = ',')]
    pub packages: Option<Vec<String>>,

    /// Local directory to use for templates instead of the configured copy
    #[arg(long = "template-dir")]
    pub template_dir: Option<PathBuf>,

    /// Python interpreter used to create the environment
    #[arg(long)]
    pub python: Option<String>,

    /// Auto-confirm all prompts (non-interactive mode)
    #[arg(short, long)]
    pub yes: bool,
}

impl From<CliCreateArgs> for CreateArgs {
    fn from(args: CliCreateArgs) -> Self {
        CreateArgs {
            name: args.name,
            path: args.path,
            packages: args.packages,
            template_dir: args.template_dir,
            python: args.python,
            yes: args.yes,
        }
    }
}

#[derive(Parser, Debug)]
pub struct CliConfigArgs {
    /// Print the current configuration
    #[arg(long)]
    pub show: bool,

    /// Default packages (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub packages: Option<Vec<String>>,

    /// Default project directory (empty to clear)
    #[arg(long)]
    pub path: Option<PathBuf>,

    /// Generate setup.py
    #[arg(long = "build-manifest")]
    pub build_manifest: Option<bool>,

    /// Generate pyproject.toml
    #[arg(long = "project-manifest")]
    pub project_manifest: Option<bool>,
}

impl From<CliConfigArgs> for ConfigArgs {
    fn from(args: CliConfigArgs) -> Self {
        ConfigArgs {
            show: args.show,
            packages: args.packages,
            path: args.path,
            build_manifest: args.build_manifest,
            project_manifest: args.project_manifest,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Ensure terminal cursor is restored on panic
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = console::Term::stderr().show_cursor();
        default_panic(info);
    }));

    // First Ctrl+C stops the pipeline at the next stage, a second one exits
    let cancel = CancelFlag::new();
    let handler_flag = cancel.clone();
    ctrlc::set_handler(move || {
        if handler_flag.is_cancelled() {
            let _ = console::Term::stderr().show_cursor();
            std::process::exit(130);
        }
        handler_flag.cancel();
    })
    .ok();

    let args = Args::parse();
    let product = DevTemplateConfig;

    let store = ConfigStore::new(config_dir(product.config_dir_env())?);
    let config = store.load()?;

    let log_path = logging::init_logging(
        &store.logs_dir(),
        config.max_log_files,
        config.debug || args.verbose,
    )?;
    tracing::info!(product = product.name(), log = %log_path.display(), "starting");

    // Handle subcommands
    let result = match args.command {
        Some(Command::Config(config_args)) => {
            dev_template_core::tui::run_config(config_args.into(), &store, config)
        }
        Some(Command::Create(create_args)) => {
            dev_template_core::run(&product, create_args.into(), &store, config, cancel).await
        }
        None => {
            // No subcommand provided, default to create behavior (interactive mode)
            let create_args = CreateArgs::default();
            dev_template_core::run(&product, create_args, &store, config, cancel).await
        }
    };

    // Ensure cursor is visible on normal exit
    let _ = console::Term::stderr().show_cursor();

    if let Err(e) = &result {
        tracing::error!(error = %e, "run failed");
    }
    result
}

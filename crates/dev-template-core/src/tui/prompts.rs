//! Charm-style CLI prompts using cliclack

use super::observer::TuiObserver;
use crate::config::{parse_package_list, ConfigStore, ResolvedConfig};
use crate::error::Error;
use crate::pipeline::{CancelFlag, Pipeline, PipelineResult};
use crate::product::ProductConfig;
use crate::request::{self, ProjectRequest};
use crate::runtime::{check, VenvProvisioner};
use crate::templates;
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::{Path, PathBuf};

/// CLI arguments for the create command
#[derive(Debug, Clone, Default)]
pub struct CreateArgs {
    /// Project name
    pub name: Option<String>,

    /// Directory the project is created in
    pub path: Option<PathBuf>,

    /// Packages to install (replaces the configured defaults)
    pub packages: Option<Vec<String>>,

    /// Local directory to use for templates instead of the configured copy
    pub template_dir: Option<PathBuf>,

    /// Python interpreter used to create the environment
    pub python: Option<String>,

    /// Auto-confirm all prompts (non-interactive mode)
    pub yes: bool,
}

/// Collect a project request and run the pipeline with interactive prompts
pub async fn run<C: ProductConfig>(
    product: &C,
    args: CreateArgs,
    store: &ConfigStore,
    mut config: ResolvedConfig,
    cancel: CancelFlag,
) -> Result<()> {
    cliclack::intro(format!("{} - setting up new Python project", product.display_name()))?;

    // Step 1: Interpreter
    let python = check_interpreter(args.python.as_deref())?;

    // Step 2: Template source
    let templates = templates::resolve_provider(args.template_dir.clone(), store, &mut config)
        .context("Failed to prepare templates")?;

    // Step 3: Name, path and packages
    let request = collect_request(&args, &config)?;

    let packages: Vec<&str> = request
        .requested_packages()
        .iter()
        .map(String::as_str)
        .collect();
    cliclack::log::remark(format!(
        "Setting up '{}' at {}\nPackages: {}",
        request.project_name(),
        request.target_dir().display(),
        if packages.is_empty() {
            "(none)".to_string()
        } else {
            packages.join(", ")
        }
    ))?;

    if !args.yes {
        let proceed: bool = cliclack::confirm("Create project?")
            .initial_value(true)
            .interact()?;
        if !proceed {
            cliclack::outro_cancel("Setup cancelled.")?;
            return Ok(());
        }
    }

    // Step 4: Run the pipeline
    let provisioner = VenvProvisioner::new(python);
    let observer = TuiObserver::new();
    let pipeline = Pipeline::new(templates.as_ref(), &provisioner)
        .with_observer(&observer)
        .with_cancel_flag(cancel);

    let result = match pipeline.run(&request, &config.generation_options()).await {
        Ok(result) => result,
        Err(e) => {
            cliclack::log::error(format!("{}", e))?;
            if left_partial_files(&e, &request.target_dir()) {
                cliclack::log::info(format!(
                    "Partially created files were left at {} for inspection",
                    request.target_dir().display()
                ))?;
            }
            cliclack::outro_cancel("Project was not created.")?;
            return Err(e.into());
        }
    };

    // Step 5: Report
    report_packages(&result)?;
    print_next_steps(product, &result)?;

    Ok(())
}

/// Whether a failed run left anything on disk worth pointing the user at
fn left_partial_files(err: &Error, target: &Path) -> bool {
    !err.is_validation() && target.exists()
}

fn check_interpreter(explicit: Option<&str>) -> Result<String> {
    let spinner = cliclack::spinner();
    spinner.start("Checking Python...");

    match check::find_python(explicit) {
        Ok(info) => {
            spinner.stop(format!(
                "Python: {} ({})",
                info.command,
                info.version.as_deref().unwrap_or("unknown")
            ));
            Ok(info.command)
        }
        Err(e) => {
            spinner.stop("Python not available");
            cliclack::log::error(format!("{}", e))?;
            anyhow::bail!("Please install Python 3 and try again.");
        }
    }
}

/// Prompt for anything not given on the command line and validate it.
/// In interactive mode an invalid combination is reported and asked again.
fn collect_request(args: &CreateArgs, config: &ResolvedConfig) -> Result<ProjectRequest> {
    let interactive = !args.yes && args.name.is_none() && args.path.is_none();

    loop {
        let name = match &args.name {
            Some(name) => name.clone(),
            None if args.yes => anyhow::bail!("--name is required with --yes"),
            None => prompt_name(&config.reserved_names)?,
        };

        let path = match &args.path {
            Some(path) => path.clone(),
            None if args.yes => default_path(config),
            None => prompt_path(config)?,
        };

        let packages = match &args.packages {
            Some(packages) => packages.clone(),
            None if args.yes => config.default_packages.clone(),
            None => prompt_packages(&config.default_packages)?,
        };

        match ProjectRequest::new(&name, &path, packages, &config.reserved_names) {
            Ok(request) => return Ok(request),
            Err(Error::Validation(errors)) if interactive => {
                for issue in errors.issues() {
                    cliclack::log::error(issue.to_string())?;
                }
                cliclack::log::info("Let's try again.")?;
            }
            Err(e) => return Err(e.into()),
        }
    }
}

fn prompt_name(reserved: &[String]) -> Result<String> {
    let reserved = reserved.to_vec();
    let name: String = cliclack::input("Project name")
        .placeholder("my-project")
        .validate(move |input: &String| {
            match request::validate_name(input.trim(), &reserved).first() {
                Some(issue) => Err(issue.to_string()),
                None => Ok(()),
            }
        })
        .interact()?;
    Ok(name.trim().to_string())
}

fn default_path(config: &ResolvedConfig) -> PathBuf {
    config
        .default_project_path
        .clone()
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

fn prompt_path(config: &ResolvedConfig) -> Result<PathBuf> {
    let default = default_path(config);
    let default_str = default.display().to_string();

    let input: String = cliclack::input("Where should the project be created?")
        .placeholder(&default_str)
        .default_input(&default_str)
        .validate(|input: &String| {
            match request::validate_path(&PathBuf::from(input.trim())).first() {
                Some(issue) => Err(issue.to_string()),
                None => Ok(()),
            }
        })
        .interact()?;

    let path = PathBuf::from(input.trim());
    if path.is_absolute() {
        Ok(path)
    } else {
        let current_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Ok(current_dir.join(path))
    }
}

fn prompt_packages(defaults: &[String]) -> Result<Vec<String>> {
    let default_str = defaults.join(", ");
    let mut input = cliclack::input("Packages to install (comma delimited)").required(false);
    if !default_str.is_empty() {
        input = input.default_input(&default_str);
    }
    let answer: String = input.interact()?;
    Ok(parse_package_list(&answer))
}

fn report_packages(result: &PipelineResult) -> Result<()> {
    if !result.successful_packages.is_empty() {
        cliclack::log::success(format!(
            "Successfully installed packages: {}",
            result.successful_packages.join(", ")
        ))?;
        if !result.version_pins_known {
            cliclack::log::warning(
                "Could not read installed versions; requirements were written without pins",
            )?;
        }
        if result.manifest_marker_missing {
            cliclack::log::warning(
                "pyproject.toml has no `dependencies = [` list; add the packages there by hand",
            )?;
        }
    }

    if !result.failed_packages.is_empty() {
        cliclack::log::warning(format!(
            "Failed to install packages: {}",
            result.failed_packages.join(", ")
        ))?;
    }

    Ok(())
}

fn print_next_steps<C: ProductConfig>(product: &C, result: &PipelineResult) -> Result<()> {
    let steps = product.next_steps(result);

    println!();
    println!("  {}", "Next steps".bold());
    println!();

    for (i, step) in steps.iter().enumerate() {
        println!("  {}.  {}", i + 1, step.cyan());
    }

    cliclack::outro(format!(
        "Project created successfully at {}",
        result.root_path.display()
    ))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Stage;

    #[test]
    fn test_cancel_before_any_write_reports_no_partial_files() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("demo");
        let cancelled = Error::Cancelled {
            stage: Stage::Validating,
        };

        assert!(!left_partial_files(&cancelled, &target));

        std::fs::create_dir(&target).unwrap();
        assert!(left_partial_files(&cancelled, &target));
    }

    #[test]
    fn test_validation_never_reports_partial_files() {
        let dir = tempfile::tempdir().unwrap();
        let err = Error::ProjectExists {
            path: dir.path().to_path_buf(),
        };
        assert!(!left_partial_files(&err, dir.path()));
    }
}

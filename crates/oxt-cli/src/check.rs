//! Check command - verify installed packages against the declared requirements.

use anyhow::{bail, Context, Result};
use clap::Args;
use console::style;
use indexmap::IndexMap;
use std::path::{Path, PathBuf};

use oxt_pm::{
    CheckReport, Environment, Manifest, PackageLookup, PackageStatus, PinnedStatus, Platform,
    RequirementPolicy, RequirementsCheck, SitePackages,
};

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// pyproject.toml or extension JSON config (default: search upward for pyproject.toml)
    #[arg(short = 'm', long)]
    pub manifest: Option<PathBuf>,

    /// site-packages directory to scan for installed packages (can be used multiple times)
    #[arg(short = 's', long = "site-packages", action = clap::ArgAction::Append)]
    pub site_packages: Vec<PathBuf>,

    /// JSON file mapping package names to installed versions
    #[arg(short = 'i', long, conflicts_with = "site_packages")]
    pub installed: Option<PathBuf>,

    /// Python version used for python_versions restrictions (default: ask python3)
    #[arg(long)]
    pub python_version: Option<String>,

    /// Platform used for platform restrictions (linux, macos, win, flatpak, snap)
    #[arg(long)]
    pub platform: Option<String>,

    /// Requirement entered in the extension options for the configured package_name
    #[arg(long)]
    pub package_requirement: Option<String>,

    /// Treat absent packages without a requirement as met
    #[arg(long)]
    pub allow_absent_unconstrained: bool,

    /// Output format: text or json
    #[arg(short = 'f', long, default_value = "text")]
    pub format: String,

    /// Working directory
    #[arg(short = 'd', long, default_value = ".")]
    pub working_dir: PathBuf,
}

pub fn execute(args: CheckArgs) -> Result<i32> {
    if args.format != "text" && args.format != "json" {
        eprintln!(
            "{} Unsupported format '{}'. Use 'text' or 'json'.",
            style("Error:").red().bold(),
            args.format
        );
        return Ok(1);
    }

    let mut manifest = match args.manifest {
        Some(ref path) => Manifest::from_path(path)
            .with_context(|| format!("Failed to load manifest {}", path.display()))?,
        None => {
            let working_dir = args
                .working_dir
                .canonicalize()
                .context("Failed to resolve working directory")?;
            match Manifest::load(&working_dir)? {
                Some(manifest) => manifest,
                None => {
                    eprintln!(
                        "{} No pyproject.toml found in {} or its parents",
                        style("Error:").red().bold(),
                        working_dir.display()
                    );
                    return Ok(1);
                }
            }
        }
    };

    if let Some(ref path) = manifest.path {
        log::info!("Using manifest {}", path.display());
    }

    if let Some(ref text) = args.package_requirement {
        manifest.apply_option_override(text);
    }

    let lookup = load_lookup(&args)?;
    let environment = build_environment(&args)?;
    let policy = RequirementPolicy {
        allow_absent_unconstrained: args.allow_absent_unconstrained,
    };

    let report = RequirementsCheck::new(&manifest.requirements, lookup.as_ref())
        .with_py_packages(&manifest.py_packages, environment)
        .with_policy(policy)
        .report();

    if args.format == "json" {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(if report.met { 0 } else { 1 })
}

fn load_lookup(args: &CheckArgs) -> Result<Box<dyn PackageLookup>> {
    if let Some(ref path) = args.installed {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let installed: IndexMap<String, String> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        return Ok(Box::new(installed));
    }

    if args.site_packages.is_empty() {
        bail!("No installed packages given. Use --site-packages <DIR> or --installed <FILE>");
    }

    let dirs: Vec<&Path> = args.site_packages.iter().map(PathBuf::as_path).collect();
    let site = SitePackages::scan(&dirs).context("Failed to scan site-packages")?;
    Ok(Box::new(site))
}

fn build_environment(args: &CheckArgs) -> Result<Environment> {
    let detected = Environment::detect(args.python_version.clone());

    let name = match args.platform {
        Some(ref name) => name,
        None => return Ok(detected),
    };
    let mut environment = match Platform::from_str(name) {
        Some(platform @ (Platform::Flatpak | Platform::Snap)) => {
            Environment::new(Platform::Linux).with_sandbox(platform)
        }
        Some(Platform::All) | None => bail!(
            "Unknown platform '{}'. Use linux, macos, win, flatpak or snap",
            name
        ),
        Some(platform) => Environment::new(platform),
    };
    environment.python_version = detected.python_version;

    Ok(environment)
}

fn print_report(report: &CheckReport) {
    for pkg in &report.packages {
        let status = match pkg.status {
            PackageStatus::Ok => style(pkg.status.as_str()).green(),
            PackageStatus::Invalid => style(pkg.status.as_str()).yellow(),
            _ => style(pkg.status.as_str()).red(),
        };
        let requirement = if pkg.requirement.is_empty() { "*" } else { pkg.requirement.as_str() };
        println!(
            "{} {} {} ({})",
            style(&pkg.name).white().bold(),
            pkg.installed.as_deref().unwrap_or("-"),
            requirement,
            status
        );
    }

    for pkg in &report.pinned {
        let status = match pkg.status {
            PinnedStatus::Ok => style(pkg.status.as_str()).green(),
            PinnedStatus::Skipped => style(pkg.status.as_str()).dim(),
            _ => style(pkg.status.as_str()).red(),
        };
        println!(
            "{} {} {} ({}) [pinned]",
            style(&pkg.name).white().bold(),
            pkg.installed.as_deref().unwrap_or("-"),
            pkg.requirement,
            status
        );
    }

    if report.met {
        println!("{}", style("Requirements are met").green().bold());
    } else {
        eprintln!(
            "{} Requirements not met: {}",
            style("Error:").red().bold(),
            report.failures().join(", ")
        );
    }
}

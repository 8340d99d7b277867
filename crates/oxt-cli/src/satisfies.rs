//! Satisfies command - test one version against a requirement.

use anyhow::Result;
use clap::Args;
use console::style;

use oxt_semver::{VerRules, VersionParser};

#[derive(Args, Debug)]
pub struct SatisfiesArgs {
    /// Requirement such as ">=1.0.0, <2.0.0"
    #[arg(value_name = "REQUIREMENT")]
    pub requirement: String,

    /// Installed version such as "1.5.2"
    #[arg(value_name = "VERSION")]
    pub version: String,

    /// Only set the exit code
    #[arg(short = 'q', long)]
    pub quiet: bool,
}

pub fn execute(args: SatisfiesArgs) -> Result<i32> {
    let ver_rules = VerRules::new();
    let rules = ver_rules.get_matched_rules(&args.requirement);

    if rules.is_empty() {
        if !args.quiet {
            eprintln!(
                "{} No valid rule in requirement '{}'",
                style("Error:").red().bold(),
                args.requirement
            );
        }
        return Ok(2);
    }

    if !args.quiet && !VersionParser::new().is_valid(&args.version) {
        eprintln!(
            "{} '{}' is not a valid version",
            style("Warning:").yellow().bold(),
            args.version
        );
    }

    let satisfied = ver_rules.get_installed_is_valid_by_rules(&rules, &args.version);
    if !args.quiet {
        let canonical: Vec<String> = rules.iter().map(|rule| rule.get_versions_str()).collect();
        if satisfied {
            println!(
                "{} {} satisfies {}",
                style("yes").green().bold(),
                args.version,
                canonical.join(", ")
            );
        } else {
            println!(
                "{} {} does not satisfy {}",
                style("no").red().bold(),
                args.version,
                canonical.join(", ")
            );
        }
    }

    Ok(if satisfied { 0 } else { 1 })
}

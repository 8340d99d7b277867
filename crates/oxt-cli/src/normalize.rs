//! Normalize command - canonicalize a requirement the way the options dialog stores it.

use anyhow::Result;
use clap::Args;
use console::style;

use oxt_semver::VerRules;

#[derive(Args, Debug)]
pub struct NormalizeArgs {
    /// Requirement text such as "^1.0; !=1.5"
    #[arg(value_name = "REQUIREMENT")]
    pub requirement: String,

    /// Also list clauses that were skipped
    #[arg(long)]
    pub show_rejected: bool,
}

pub fn execute(args: NormalizeArgs) -> Result<i32> {
    let ver_rules = VerRules::new();

    if args.show_rejected {
        for err in ver_rules.parse(&args.requirement).rejected {
            eprintln!("{} {}", style("Skipped:").yellow().bold(), err);
        }
    }

    match ver_rules.normalize_requirement(&args.requirement) {
        Ok(requirement) => {
            println!("{}", requirement);
            Ok(0)
        }
        Err(err) => {
            eprintln!("{} {}", style("Error:").red().bold(), err);
            eprintln!("Must be in format of ==1.0.0 or >=1.0.0, <2.0.0 or ^1.0 etc.");
            Ok(1)
        }
    }
}

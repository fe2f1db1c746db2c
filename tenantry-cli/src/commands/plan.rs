//! Publish plan command
//!
//! Shows where every bundled migration stub would land without copying anything.

use crate::error::CliResult;
use crate::{info, success, warn};
use colored::Colorize;
use tenantry::TenancyBootstrap;

pub fn run(bootstrap: &TenancyBootstrap, json: bool) -> CliResult<()> {
    let plan = bootstrap.plan()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    println!();
    println!("  {}", "Migration publish plan".bright_cyan().bold());
    info(&format!("Stubs:       {}", bootstrap.stubs_dir().display()));
    info(&format!("Destination: {}", bootstrap.migrations_dir().display()));
    println!();

    if plan.is_empty() {
        warn("No migration stubs found");
        return Ok(());
    }

    for entry in plan.entries() {
        let stub = entry
            .source
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let status = if entry.matched {
            "published".dimmed()
        } else {
            "new".green()
        };
        println!("  {:>9}  {} → {}", status, stub, entry.file_name());
    }

    println!();
    let new = plan.synthesized().count();
    if new == 0 {
        success(&format!("All {} stub(s) already published", plan.len()));
    } else {
        success(&format!("{} stub(s), {} new", plan.len(), new));
    }

    Ok(())
}

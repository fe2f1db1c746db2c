//! Publish command
//!
//! Copies the migration stubs and the default configuration into the project.

use crate::error::CliResult;
use crate::{info, success, warn};
use tenantry::TenancyBootstrap;
use tenantry::publish::Publisher;

pub fn run(bootstrap: &TenancyBootstrap, tag: Option<&str>, force: bool) -> CliResult<()> {
    let registry = bootstrap.publishes()?;
    let publisher = Publisher::new(bootstrap.filesystem()).force(force);

    let report = match tag {
        Some(tag) => publisher.publish_tag(&registry, tag)?,
        None => publisher.publish_all(&registry)?,
    };

    println!();
    for path in &report.copied {
        success(&format!("Published {}", path.display()));
    }
    for path in &report.skipped {
        warn(&format!("Skipped {} (already published)", path.display()));
    }

    if report.copied.is_empty() && report.skipped.is_empty() {
        warn("Nothing to publish");
    } else {
        println!();
        info(&format!(
            "{} copied, {} skipped",
            report.copied.len(),
            report.skipped.len()
        ));
        if !report.skipped.is_empty() && !force {
            info("Use --force to overwrite existing files");
        }
    }

    Ok(())
}

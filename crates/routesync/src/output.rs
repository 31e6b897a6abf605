//! Rendering run results for the terminal
//!
//! Results go to stdout; diagnostics go through `tracing` to stderr.

use anyhow::Result;
use routesync_core::{ListReport, ReconcileReport};
use serde_json::json;
use std::io::Write;

/// One line per outcome, then a success line for live runs
pub fn write_reconcile(out: &mut impl Write, report: &ReconcileReport, dry_run: bool) -> Result<()> {
    for outcome in &report.outcomes {
        writeln!(out, "{}", outcome)?;
    }
    if !dry_run {
        writeln!(out, "Routes updated successfully.")?;
    }
    Ok(())
}

/// Listed routes, followed by what each refresh did
pub fn write_list(out: &mut impl Write, report: &ListReport, as_json: bool) -> Result<()> {
    if as_json {
        return write_list_json(out, report);
    }

    for route in &report.routes {
        writeln!(out, "{}", route)?;
    }

    for refresh in &report.refreshed {
        match &refresh.result {
            Ok(reconciled) => {
                for outcome in &reconciled.outcomes {
                    writeln!(out, "{}", outcome)?;
                }
            }
            Err(e) => writeln!(
                out,
                "Failed to refresh route {} ({}): {}",
                refresh.route.id, refresh.route.comment, e
            )?,
        }
    }
    Ok(())
}

fn write_list_json(out: &mut impl Write, report: &ListReport) -> Result<()> {
    let refreshed: Vec<_> = report
        .refreshed
        .iter()
        .map(|refresh| match &refresh.result {
            Ok(reconciled) => json!({
                "id": refresh.route.id,
                "domain": refresh.route.comment,
                "addresses": reconciled.addresses,
                "outcomes": reconciled.outcomes.iter().map(ToString::to_string).collect::<Vec<_>>(),
            }),
            Err(e) => json!({
                "id": refresh.route.id,
                "domain": refresh.route.comment,
                "error": e.to_string(),
            }),
        })
        .collect();

    let document = json!({
        "routes": report.routes,
        "refreshed": refreshed,
    });
    serde_json::to_writer_pretty(&mut *out, &document)?;
    writeln!(out)?;
    Ok(())
}

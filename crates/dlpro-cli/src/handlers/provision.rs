//! Provision command handler.

use dlpro_core::ToolKind;
use indicatif::{ProgressBar, ProgressStyle};

use crate::bootstrap::CliContext;
use crate::error::CliError;

/// Install any missing managed binaries and report where they live.
pub async fn execute(ctx: &CliContext, json: bool) -> Result<(), CliError> {
    let spinner = (!json).then(|| {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}") {
            pb.set_style(style);
        }
        pb.set_message(format!("Provisioning tools in {}", ctx.paths.bin_dir.display()));
        pb.enable_steady_tick(std::time::Duration::from_millis(120));
        pb
    });

    let report = ctx.provisioning().ready().await;

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    if json {
        let rendered = serde_json::to_string_pretty(report.as_ref())
            .map_err(|e| CliError::Io(e.to_string()))?;
        println!("{rendered}");
    } else {
        for tool in ToolKind::ALL {
            match (report.path(tool), report.failure(tool)) {
                (Some(path), _) => println!("✓ {tool}: {}", path.display()),
                (None, Some(err)) => println!("✗ {tool}: {}", err.user_message()),
                (None, None) => println!("? {tool}: not managed on this platform"),
            }
        }
    }

    if report.all_ready() {
        Ok(())
    } else {
        let failed: Vec<&str> = report.failures.keys().map(|tool| tool.as_str()).collect();
        Err(CliError::Provision(failed.join(", ")))
    }
}

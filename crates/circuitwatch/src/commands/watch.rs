//! `watch` handler: discover once, then revalidate on a fixed interval.

use std::time::Duration;

use chrono::Utc;
use tracing::{info, warn};

use circuitwatch_core::SnapshotTopology;

use crate::cli::{GlobalOpts, OutputFormat, WatchArgs};
use crate::error::CliError;
use crate::output;

use super::util;

pub async fn handle(args: &WatchArgs, global: &GlobalOpts) -> Result<(), CliError> {
    if args.interval == 0 {
        return Err(CliError::Validation {
            field: "interval".into(),
            reason: "must be at least 1".into(),
        });
    }

    let mut monitor = util::discover_snapshot(&args.topology)?;
    info!(
        circuits = monitor.store().len(),
        interval_secs = args.interval,
        "watching circuits"
    );

    let interval = Duration::from_secs(args.interval);
    let mut passes = 0u32;
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!(passes, "interrupted");
                return Ok(());
            }
            () = tokio::time::sleep(interval) => {}
        }

        // A bad snapshot keeps the previous one in place for this pass.
        match SnapshotTopology::load(&args.topology) {
            Ok(topology) => monitor.tracer_mut().replace_topology(topology),
            Err(e) => warn!(error = %e, "keeping previous topology snapshot"),
        }

        let report = monitor.run_traces();
        passes += 1;
        let at = Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
        info!(pass = passes, %at, "revalidation pass");
        // Machine-readable formats get the report and nothing else.
        if !global.quiet && global.output_format() == OutputFormat::Table {
            println!("── pass {passes} at {at} ──");
        }
        output::print_output(&util::render_report(&report, global), global.quiet);

        if args.count.is_some_and(|count| passes >= count) {
            return Ok(());
        }
    }
}

//! `check` handler: one discovery pass, one revalidation pass.

use circuitwatch_core::SnapshotTopology;

use crate::cli::{CheckArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

pub fn handle(args: &CheckArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let mut monitor = util::discover_snapshot(&args.topology)?;

    if let Some(ref against) = args.against {
        monitor
            .tracer_mut()
            .replace_topology(SnapshotTopology::load(against)?);
    }

    let report = monitor.run_traces();
    output::print_output(&util::render_report(&report, global), global.quiet);
    util::drift_result(&report)
}

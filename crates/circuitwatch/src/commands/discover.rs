//! `discover` handler.

use crate::cli::{DiscoverArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util::{self, CircuitRow};

pub fn handle(args: &DiscoverArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let monitor = util::discover_snapshot(&args.topology)?;
    let circuits = monitor.store().circuits();

    let out = output::render_list(
        &global.output_format(),
        circuits,
        |c| CircuitRow::from(c),
        |c| c.entry.to_string(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

//! `wxmd themes` command implementation.

use wxmd_renderer::Theme;

use crate::error::CliError;
use crate::output::write_stdout;

/// Print built-in theme names, one per line.
///
/// # Errors
///
/// Returns an error if stdout cannot be written.
pub(crate) fn execute() -> Result<(), CliError> {
    write_stdout(&Theme::builtin_names().join("\n"))?;
    Ok(())
}

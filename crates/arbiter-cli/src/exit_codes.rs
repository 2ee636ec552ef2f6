//! Process exit codes. Part of the CLI contract.

pub const SUCCESS: i32 = 0;
/// The run aborted or was cancelled.
pub const RUN_FAILED: i32 = 1;
/// Bad configuration or setup; nothing was run.
pub const CONFIG_ERROR: i32 = 2;

//! Process exit codes. Scripts depend on these; do not renumber.

pub const SUCCESS: i32 = 0;
pub const RUN_ERRORS: i32 = 1; // Run finished but some units errored
pub const CONFIG_ERROR: i32 = 2; // Bad config, suite, model selection or plan
pub const CANCELLED: i32 = 130; // Stopped by Ctrl-C; cache holds the partial run

// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod app_dirs;
pub mod engine;
pub mod history;
pub mod notifier;
pub mod runtime;
pub mod store;
pub mod util;

/// Cadence of the periodic tick. Elapsed time is always derived from the
/// wall clock, never from tick counts, so a suspended process only delays
/// the break signal by at most one interval after it wakes.
pub const TICK_RATE_MS: u64 = 1000;

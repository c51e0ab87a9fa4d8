// Library surface for headless/integration tests and reuse.
// The terminal shell (CLI, widgets, event loop) lives in main.rs.
pub mod app_dirs;
pub mod config;
pub mod logging;
pub mod placement;
pub mod round;
pub mod runtime;
pub mod stats;
pub mod surface;
pub mod timer;
pub mod util;

use std::fs::{self, OpenOptions};
use std::io;
use std::path::Path;

use env_logger::{Builder, Env, Target};

/// Environment variable holding the log filter, e.g. `BOXCLICK_LOG=debug`
pub const LOG_ENV: &str = "BOXCLICK_LOG";

/// Route `log` output into `path`. The terminal belongs to the TUI, so
/// nothing is ever written to stdout/stderr.
pub fn init(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    Builder::from_env(Env::default().filter_or(LOG_ENV, "info"))
        .target(Target::Pipe(Box::new(file)))
        .format_timestamp_millis()
        .try_init()
        .map_err(|err| io::Error::new(io::ErrorKind::Other, err))
}

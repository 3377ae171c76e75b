use std::{fs::File, path::Path};

use anyhow::Context as _;
use env_logger::{Builder, Env, Target};

const DEFAULT_FILTER: &str = "info";

fn builder() -> Builder {
    Builder::from_env(Env::default().default_filter_or(DEFAULT_FILTER))
}

/// Sends log records to `path`, appending to it.
///
/// Used while the terminal is owned by the game screen.
pub(crate) fn init_to_file(path: &Path) -> anyhow::Result<()> {
    let file = File::options()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file: {}", path.display()))?;
    builder()
        .target(Target::Pipe(Box::new(file)))
        .try_init()
        .context("failed to install logger")?;
    Ok(())
}

pub(crate) fn init_to_stderr() -> anyhow::Result<()> {
    builder()
        .target(Target::Stderr)
        .try_init()
        .context("failed to install logger")?;
    Ok(())
}

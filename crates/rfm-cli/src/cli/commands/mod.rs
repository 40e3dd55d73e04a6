//! CLI command handlers. Each command is in its own file.

mod apply;
mod completions;
mod destroy;
mod digest;
mod refresh;
mod status;

pub use apply::run_apply;
pub use completions::{run_completions, run_man};
pub use destroy::run_destroy;
pub use digest::run_digest;
pub use refresh::run_refresh;
pub use status::run_status;

use anyhow::Result;

/// Run a blocking core call on the blocking pool.
pub(crate) async fn blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> rfm_core::Result<T> + Send + 'static,
    T: Send + 'static,
{
    Ok(tokio::task::spawn_blocking(f).await??)
}

//! Digest command: fingerprint a local file.

use anyhow::Result;
use rfm_core::digest::{self, Algorithm, DigestSpec, Encoding};
use std::path::Path;

/// Compute and print the digest of the given file.
pub fn run_digest(path: &Path, algorithm: Algorithm, encoding: Encoding) -> Result<()> {
    let d = digest::digest_path(path, DigestSpec::new(algorithm, encoding))?;
    println!("{}  {}", d, path.display());
    Ok(())
}

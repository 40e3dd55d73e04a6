//! Content digests with pluggable algorithm and output encoding.
//!
//! Files are read in fixed-size chunks so memory use stays bounded
//! regardless of file size. Algorithm and encoding are independent axes;
//! every combination goes through the same streaming loop.

use crate::error::{MirrorError, Result};
use base64::Engine;
use digest::DynDigest;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

const BUF_SIZE: usize = 64 * 1024;

/// Hash function used to fingerprint content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    Sha256,
    Sha512,
    Md5,
}

impl Algorithm {
    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Sha256 => "sha256",
            Algorithm::Sha512 => "sha512",
            Algorithm::Md5 => "md5",
        }
    }

    fn hasher(self) -> Box<dyn DynDigest> {
        match self {
            Algorithm::Sha256 => Box::new(sha2::Sha256::default()),
            Algorithm::Sha512 => Box::new(sha2::Sha512::default()),
            Algorithm::Md5 => Box::new(md5::Md5::default()),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sha256" | "sha-256" => Ok(Algorithm::Sha256),
            "sha512" | "sha-512" => Ok(Algorithm::Sha512),
            "md5" => Ok(Algorithm::Md5),
            other => Err(format!("unknown digest algorithm: {other}")),
        }
    }
}

/// Text encoding applied to the raw digest bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// Standard alphabet with padding.
    Base64,
    /// Lowercase hex.
    Hex,
}

impl Encoding {
    pub fn name(self) -> &'static str {
        match self {
            Encoding::Base64 => "base64",
            Encoding::Hex => "hex",
        }
    }

    pub fn encode(self, bytes: &[u8]) -> String {
        match self {
            Encoding::Base64 => base64::engine::general_purpose::STANDARD.encode(bytes),
            Encoding::Hex => hex::encode(bytes),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Encoding {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "base64" | "b64" => Ok(Encoding::Base64),
            "hex" => Ok(Encoding::Hex),
            other => Err(format!("unknown digest encoding: {other}")),
        }
    }
}

/// An (algorithm, encoding) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DigestSpec {
    pub algorithm: Algorithm,
    pub encoding: Encoding,
}

impl DigestSpec {
    pub const fn new(algorithm: Algorithm, encoding: Encoding) -> Self {
        Self {
            algorithm,
            encoding,
        }
    }
}

/// Authoritative fingerprint used for identity and drift comparison.
pub const PRIMARY: DigestSpec = DigestSpec::new(Algorithm::Sha256, Encoding::Base64);

/// Convenience fingerprint exposed to consumers; never used for drift.
pub const SECONDARY: DigestSpec = DigestSpec::new(Algorithm::Md5, Encoding::Hex);

/// Digest everything `reader` yields. `path` is only used for error context.
fn digest_stream<R: Read>(mut reader: R, specs: &[DigestSpec], path: &Path) -> Result<Vec<String>> {
    let mut hashers: Vec<Box<dyn DynDigest>> = specs.iter().map(|s| s.algorithm.hasher()).collect();
    let mut buf = vec![0u8; BUF_SIZE];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(MirrorError::io(path, e)),
        };
        for h in hashers.iter_mut() {
            h.update(&buf[..n]);
        }
    }
    Ok(hashers
        .into_iter()
        .zip(specs)
        .map(|(h, spec)| spec.encoding.encode(&h.finalize()))
        .collect())
}

/// Digest an arbitrary byte stream.
pub fn digest_reader<R: Read>(reader: R, spec: DigestSpec) -> Result<String> {
    let mut out = digest_stream(reader, &[spec], Path::new("<stream>"))?;
    Ok(out.remove(0))
}

/// Digest the file at `path`.
pub fn digest_path(path: &Path, spec: DigestSpec) -> Result<String> {
    let mut out = digest_path_many(path, &[spec])?;
    Ok(out.remove(0))
}

/// Compute several digests of one file in a single read pass.
/// Results are returned in the order of `specs`.
pub fn digest_path_many(path: &Path, specs: &[DigestSpec]) -> Result<Vec<String>> {
    let f = File::open(path).map_err(|e| MirrorError::io(path, e))?;
    digest_stream(f, specs, path)
}

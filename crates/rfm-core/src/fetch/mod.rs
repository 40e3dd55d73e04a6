//! HTTP retrieval of the source URL.
//!
//! Uses the curl crate (libcurl easy interface). Every call is blocking and
//! runs in the current thread; call from `spawn_blocking` if used from async
//! code. No retries happen here.

mod parse;

use crate::config::HttpConfig;
use crate::error::{MirrorError, Result};
use crate::storage::StagedFile;
use std::io::Write;
use std::path::Path;
use std::str;
use tempfile::NamedTempFile;

/// Body that was received and written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedBody {
    /// Number of body bytes written.
    pub bytes: u64,
    /// `ETag` of the response, if the server sent one.
    pub validator: Option<String>,
}

/// Result of a conditional GET.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Server answered 304 Not Modified: the validator still matches.
    Unchanged,
    /// Server sent a full body; it was written to the staging file.
    Fetched(FetchedBody),
}

/// Raw response after a transfer completed at the transport level.
struct RawResponse {
    status: u32,
    bytes: u64,
    headers: parse::ResponseHeaders,
}

/// Blocking HTTP client for full and conditional fetches.
#[derive(Debug, Clone, Default)]
pub struct Fetcher {
    http: HttpConfig,
}

impl Fetcher {
    pub fn new(http: HttpConfig) -> Self {
        Self { http }
    }

    /// Unconditional GET of `url`, replacing `destination` with the body.
    ///
    /// The body lands in `destination.part` first and is renamed into place
    /// only after a 2xx response was fully received.
    pub fn fetch_full(&self, url: &str, destination: &Path) -> Result<FetchedBody> {
        let (staged, body) = self.fetch_staged(url, destination)?;
        staged.finalize(destination)?;
        Ok(body)
    }

    /// Like `fetch_full` but hands back the staged file so the caller can
    /// inspect it before deciding whether to finalize. Dropping the stage
    /// discards it.
    pub fn fetch_staged(&self, url: &str, destination: &Path) -> Result<(StagedFile, FetchedBody)> {
        let mut staged = StagedFile::create(destination)?;
        let part_path = staged.temp_path().to_path_buf();
        let resp = self.get(url, None, &mut staged, &part_path)?;
        if !(200..300).contains(&resp.status) {
            return Err(MirrorError::Http {
                url: url.to_string(),
                status: resp.status,
            });
        }
        tracing::debug!(url, bytes = resp.bytes, etag = ?resp.headers.etag, "full fetch complete");
        Ok((
            staged,
            FetchedBody {
                bytes: resp.bytes,
                validator: resp.headers.etag,
            },
        ))
    }

    /// GET `url`, sending `If-None-Match` when `validator` is given.
    ///
    /// A 304 answer yields `FetchOutcome::Unchanged`; a 2xx answer is written
    /// to `staging` and yields `FetchOutcome::Fetched`. Any other status is an
    /// `Http` error. The real destination is never touched.
    pub fn fetch_conditional(
        &self,
        url: &str,
        validator: Option<&str>,
        staging: &mut NamedTempFile,
    ) -> Result<FetchOutcome> {
        let staging_path = staging.path().to_path_buf();
        let resp = self.get(url, validator, staging, &staging_path)?;
        match resp.status {
            304 => {
                tracing::debug!(url, "conditional fetch: not modified");
                Ok(FetchOutcome::Unchanged)
            }
            200..=299 => {
                staging
                    .flush()
                    .map_err(|e| MirrorError::io(&staging_path, e))?;
                tracing::debug!(url, bytes = resp.bytes, "conditional fetch: fresh body");
                Ok(FetchOutcome::Fetched(FetchedBody {
                    bytes: resp.bytes,
                    validator: resp.headers.etag,
                }))
            }
            status => Err(MirrorError::Http {
                url: url.to_string(),
                status,
            }),
        }
    }

    /// Perform one GET, streaming the body into `sink`.
    /// `sink_path` is only used for error context.
    fn get<W: Write>(
        &self,
        url: &str,
        validator: Option<&str>,
        sink: &mut W,
        sink_path: &Path,
    ) -> Result<RawResponse> {
        let mut header_lines: Vec<String> = Vec::new();
        let mut write_err: Option<std::io::Error> = None;
        let mut bytes: u64 = 0;

        let mut easy = curl::easy::Easy::new();
        easy.url(url)?;
        easy.get(true)?;
        easy.follow_location(self.http.follow_redirects)?;
        easy.max_redirections(self.http.max_redirections)?;
        if let Some(t) = self.http.connect_timeout() {
            easy.connect_timeout(t)?;
        }
        if let Some(t) = self.http.timeout() {
            easy.timeout(t)?;
        }
        if let Some(ua) = &self.http.user_agent {
            easy.useragent(ua)?;
        }

        // Build curl list for custom headers (e.g. "Name: value").
        let mut list = curl::easy::List::new();
        for (k, v) in &self.http.headers {
            list.append(&format!("{}: {}", k.trim(), v.trim()))?;
        }
        if let Some(v) = validator.filter(|v| !v.is_empty()) {
            list.append(&format!("If-None-Match: {}", parse::if_none_match_value(v)))?;
        }
        easy.http_headers(list)?;

        let performed = {
            let mut transfer = easy.transfer();
            transfer.header_function(|data| {
                if let Ok(s) = str::from_utf8(data) {
                    header_lines.push(s.trim_end().to_string());
                }
                true
            })?;
            transfer.write_function(|data| match sink.write_all(data) {
                Ok(()) => {
                    bytes += data.len() as u64;
                    Ok(data.len())
                }
                Err(e) => {
                    tracing::warn!("body write failed: {}", e);
                    write_err = Some(e);
                    Ok(0) // abort transfer
                }
            })?;
            transfer.perform()
        };

        if let Some(e) = write_err {
            return Err(MirrorError::io(sink_path, e));
        }
        performed?;

        let status = easy.response_code()?;
        Ok(RawResponse {
            status,
            bytes,
            headers: parse::parse_headers(&header_lines),
        })
    }
}

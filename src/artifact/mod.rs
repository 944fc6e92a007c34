//! Artifact location resolution
//!
//! A module's content reference is often an indirect URL that redirects
//! (sometimes through several hops) before landing on the downloadable
//! archive. The locator follows that chain manually, one hop at a time with
//! redirect-following disabled, until the URL carries the archive suffix.
//!
//! The chain is bounded: a cyclic or misbehaving endpoint would otherwise
//! keep the loop alive forever.

use reqwest::blocking::Client;
use reqwest::redirect::Policy;

use crate::error::{Result, SyncError};
use crate::ui;

/// File suffix of a concrete downloadable module archive.
pub const ARCHIVE_SUFFIX: &str = ".nupkg";

/// Default bound on redirect-chain length.
pub const DEFAULT_MAX_HOPS: usize = 10;

/// A single redirect probe against a URL.
pub trait RedirectProbe {
    /// Issue one request without following redirects. Returns the redirect
    /// target when the server answered with one, `None` when it served
    /// content directly.
    fn redirect_target(&self, url: &str) -> Result<Option<String>>;
}

/// Probe over HTTP with redirect-following disabled.
pub struct HttpProbe {
    client: Client,
}

impl HttpProbe {
    pub fn new() -> Result<Self> {
        let client = Client::builder().redirect(Policy::none()).build()?;
        Ok(Self { client })
    }
}

impl RedirectProbe for HttpProbe {
    fn redirect_target(&self, url: &str) -> Result<Option<String>> {
        let response = self.client.get(url).send()?;

        if !response.status().is_redirection() {
            return Ok(None);
        }

        let target = response
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(ToString::to_string);
        Ok(target)
    }
}

/// Follows content-reference indirection to a concrete archive URL.
pub struct ArtifactLocator<P: RedirectProbe> {
    probe: P,
    max_hops: usize,
}

impl<P: RedirectProbe> ArtifactLocator<P> {
    pub fn new(probe: P, max_hops: usize) -> Self {
        Self { probe, max_hops }
    }

    /// Resolve `start_url` to an archive URL for `module`.
    ///
    /// A URL already carrying the archive suffix is returned as-is without
    /// any network probe. Transport errors mid-chain are tolerated: the last
    /// URL seen is used as a best-effort answer. Only an empty final URL is
    /// fatal, since there would be nothing to submit for import.
    pub fn resolve(&self, module: &str, start_url: &str) -> Result<String> {
        let mut url = start_url.trim().to_string();
        let mut hops = 0;

        while !url.is_empty() && !url.ends_with(ARCHIVE_SUFFIX) {
            if hops >= self.max_hops {
                return Err(SyncError::RedirectLimitExceeded {
                    url,
                    limit: self.max_hops,
                });
            }

            match self.probe.redirect_target(&url) {
                Ok(Some(target)) => {
                    ui::detail(&format!("Redirected to {}", target));
                    url = target;
                }
                Ok(None) => break,
                Err(err) => {
                    // Best effort: keep whatever URL we reached so far.
                    ui::warn(&format!(
                        "Probe of '{}' failed ({}); using last known URL",
                        url, err
                    ));
                    break;
                }
            }
            hops += 1;
        }

        if url.is_empty() {
            return Err(SyncError::ArtifactResolutionFailed {
                module: module.to_string(),
            });
        }
        Ok(url)
    }
}

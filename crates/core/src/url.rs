// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Backend URL validation.

use crate::error::{Error, Result};

/// Minimum accepted URL length.
pub const MIN_URL_LEN: usize = 10;
/// Maximum accepted URL length.
pub const MAX_URL_LEN: usize = 100;

/// Checks that `url` looks like a usable backend base URL.
///
/// Only the scheme and length are checked; reachability is the
/// connectivity monitor's business.
pub fn validate_backend_url(url: &str) -> Result<()> {
    let invalid = |reason: &'static str| Error::InvalidUrl { url: url.to_string(), reason };

    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(invalid("must start with http:// or https://"));
    }
    if url.len() < MIN_URL_LEN {
        return Err(invalid("too short"));
    }
    if url.len() > MAX_URL_LEN {
        return Err(invalid("too long"));
    }
    if url.chars().any(char::is_whitespace) {
        return Err(invalid("contains whitespace"));
    }
    Ok(())
}

#[cfg(test)]
#[path = "url_tests.rs"]
mod tests;

/*
 * config.rs
 * Copyright (C) 2026 Chris Burdess
 *
 * This file is part of Gemlet, a Gemini protocol client.
 *
 * Gemlet is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Gemlet is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Gemlet.  If not, see <http://www.gnu.org/licenses/>.
 */

//! Client settings and the location of persistent files.
//!
//! Files live in `$GEMLET_HOME`, or `~/.gemlet` when the variable is unset:
//! `certs` holds pinned server certificates, `history` the browsing history.

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable overriding the data directory.
pub const HOME_ENV: &str = "GEMLET_HOME";

const CERTIFICATES_FILE: &str = "certs";
const HISTORY_FILE: &str = "history";

pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(15);
pub const DEFAULT_MAX_REDIRECTS: usize = 5;

/// Default data directory: `$GEMLET_HOME`, else `~/.gemlet`.
pub fn default_data_dir() -> Option<PathBuf> {
    if let Some(home) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(home));
    }
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .map(|h| h.join(".gemlet"))
}

/// Paths of the files kept in the data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    pub home: PathBuf,
    pub certificates: PathBuf,
    pub history: PathBuf,
}

impl Paths {
    pub fn new(home: impl AsRef<Path>) -> Self {
        let home = home.as_ref().to_path_buf();
        Self {
            certificates: home.join(CERTIFICATES_FILE),
            history: home.join(HISTORY_FILE),
            home,
        }
    }

    /// Resolve from the environment. `None` when neither `GEMLET_HOME` nor `HOME` is set.
    pub fn from_env() -> Option<Self> {
        default_data_dir().map(Self::new)
    }
}

/// Settings for one `Client`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// A pending read fails with `TimedOut` after this long without data.
    pub read_timeout: Duration,
    pub connect_timeout: Duration,
    /// Distinct redirect targets followed in one navigation before giving up.
    pub max_redirects: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            read_timeout: DEFAULT_READ_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            max_redirects: DEFAULT_MAX_REDIRECTS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_under_home() {
        let p = Paths::new("/tmp/gemlet");
        assert_eq!(p.certificates, PathBuf::from("/tmp/gemlet/certs"));
        assert_eq!(p.history, PathBuf::from("/tmp/gemlet/history"));
    }

    #[test]
    fn default_limits() {
        let c = ClientConfig::default();
        assert_eq!(c.read_timeout, Duration::from_secs(10));
        assert_eq!(c.max_redirects, 5);
    }
}

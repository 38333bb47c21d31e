/*
 * store.rs
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

//! Pinned server certificates: one per host.
//!
//! The file format is one line per host, `<host> <base64 DER>`; blank lines are ignored
//! and any other malformed line fails the whole load. Rewrites go to a temporary file
//! that is renamed over the original.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use rustls::pki_types::CertificateDer;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Unable to load certificates from {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("Unable to write certificates to {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
    #[error("Invalid certificate entry at {}:{line}: {reason}", path.display())]
    Malformed { path: PathBuf, line: usize, reason: String },
    #[error(
        "Unable to restore non-removed entries to {}: {source}\nPlease try restoring the file manually with these contents:\n\n------------------------------\n{contents}\n------------------------------\n",
        path.display()
    )]
    Rewrite { path: PathBuf, contents: String, source: io::Error },
    #[error("Invalid host name for a certificate entry: {0:?}")]
    InvalidHost(String),
}

/// Durable host → certificate mapping.
pub trait CertificateStore: Send + Sync {
    fn load_all(&self) -> Result<BTreeMap<String, CertificateDer<'static>>, StorageError>;

    fn load(&self, host: &str) -> Result<Option<CertificateDer<'static>>, StorageError>;

    /// Pin `certificate` for `host`, replacing any previous entry.
    fn store(&self, host: &str, certificate: &CertificateDer<'_>) -> Result<(), StorageError>;

    /// Returns false when the host had no entry (the store is left untouched).
    fn remove(&self, host: &str) -> Result<bool, StorageError>;

    fn clear(&self) -> Result<(), StorageError>;
}

/// Certificates kept in a text file.
pub struct FileCertificateStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileCertificateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn guard(&self) -> std::sync::MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Entries in file order. A missing file is an empty store.
    fn read_entries(&self) -> Result<Vec<(String, CertificateDer<'static>)>, StorageError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(t) => t,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(StorageError::Read {
                    path: self.path.clone(),
                    source: e,
                })
            }
        };
        let mut entries = Vec::new();
        for (i, line) in text.lines().enumerate() {
            if let Some(entry) = self.parse_line(line, i + 1)? {
                entries.push(entry);
            }
        }
        Ok(entries)
    }

    fn parse_line(
        &self,
        line: &str,
        line_no: usize,
    ) -> Result<Option<(String, CertificateDer<'static>)>, StorageError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let malformed = |reason: String| StorageError::Malformed {
            path: self.path.clone(),
            line: line_no,
            reason,
        };
        let (host, encoded) = line
            .split_once(' ')
            .ok_or_else(|| malformed("expected '<host> <certificate>'".to_string()))?;
        let der = BASE64
            .decode(encoded.trim())
            .map_err(|e| malformed(format!("Unable to decode certificate: {}", e)))?;
        Ok(Some((host.to_string(), CertificateDer::from(der))))
    }

    fn render(entries: &[(String, CertificateDer<'static>)]) -> String {
        let mut out = String::new();
        for (host, der) in entries {
            out.push_str(host);
            out.push(' ');
            out.push_str(&BASE64.encode(der.as_ref()));
            out.push('\n');
        }
        out
    }

    /// Write `contents` to a sibling temporary file, then rename it over the store.
    fn replace_contents(&self, contents: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "certs".to_string());
        let tmp = self.path.with_file_name(format!(".{}.tmp", file_name));
        let result = (|| {
            let mut f = fs::File::create(&tmp)?;
            f.write_all(contents.as_bytes())?;
            f.sync_all()?;
            fs::rename(&tmp, &self.path)
        })();
        if result.is_err() {
            let _ = fs::remove_file(&tmp);
        }
        result
    }
}

fn check_host(host: &str) -> Result<(), StorageError> {
    if host.is_empty() || host.chars().any(|c| c.is_whitespace()) {
        return Err(StorageError::InvalidHost(host.to_string()));
    }
    Ok(())
}

impl CertificateStore for FileCertificateStore {
    fn load_all(&self) -> Result<BTreeMap<String, CertificateDer<'static>>, StorageError> {
        let _guard = self.guard();
        Ok(self.read_entries()?.into_iter().collect())
    }

    fn load(&self, host: &str) -> Result<Option<CertificateDer<'static>>, StorageError> {
        let _guard = self.guard();
        Ok(self
            .read_entries()?
            .into_iter()
            .rev()
            .find(|(h, _)| h == host)
            .map(|(_, c)| c))
    }

    fn store(&self, host: &str, certificate: &CertificateDer<'_>) -> Result<(), StorageError> {
        check_host(host)?;
        let _guard = self.guard();
        let mut entries = self.read_entries()?;
        entries.retain(|(h, _)| h != host);
        entries.push((host.to_string(), CertificateDer::from(certificate.as_ref().to_vec())));
        self.replace_contents(&Self::render(&entries))
            .map_err(|e| StorageError::Write {
                path: self.path.clone(),
                source: e,
            })?;
        tracing::debug!(host, path = %self.path.display(), "pinned certificate");
        Ok(())
    }

    fn remove(&self, host: &str) -> Result<bool, StorageError> {
        let _guard = self.guard();
        let mut entries = self.read_entries()?;
        let before = entries.len();
        entries.retain(|(h, _)| h != host);
        if entries.len() == before {
            return Ok(false);
        }
        let contents = Self::render(&entries);
        self.replace_contents(&contents)
            .map_err(|e| StorageError::Rewrite {
                path: self.path.clone(),
                contents: contents.clone(),
                source: e,
            })?;
        tracing::debug!(host, path = %self.path.display(), "removed pinned certificate");
        Ok(true)
    }

    fn clear(&self) -> Result<(), StorageError> {
        let _guard = self.guard();
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Write {
                path: self.path.clone(),
                source: e,
            }),
        }
    }
}

/// In-memory view over another store. Reads never touch the delegate after
/// construction; writes go to the delegate first and to the cache only on success.
pub struct CachedCertificateStore<S> {
    delegate: S,
    cache: RwLock<BTreeMap<String, CertificateDer<'static>>>,
}

impl<S: CertificateStore> CachedCertificateStore<S> {
    /// Load every entry of `delegate` into memory.
    pub fn new(delegate: S) -> Result<Self, StorageError> {
        let cache = delegate.load_all()?;
        Ok(Self {
            delegate,
            cache: RwLock::new(cache),
        })
    }

    pub fn delegate(&self) -> &S {
        &self.delegate
    }

    /// Hosts with a pinned certificate, sorted.
    pub fn hosts(&self) -> Vec<String> {
        self.read_cache().keys().cloned().collect()
    }

    fn read_cache(&self) -> std::sync::RwLockReadGuard<'_, BTreeMap<String, CertificateDer<'static>>> {
        self.cache.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_cache(&self) -> std::sync::RwLockWriteGuard<'_, BTreeMap<String, CertificateDer<'static>>> {
        self.cache.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl<S: CertificateStore> CertificateStore for CachedCertificateStore<S> {
    fn load_all(&self) -> Result<BTreeMap<String, CertificateDer<'static>>, StorageError> {
        Ok(self.read_cache().clone())
    }

    fn load(&self, host: &str) -> Result<Option<CertificateDer<'static>>, StorageError> {
        Ok(self.read_cache().get(host).cloned())
    }

    fn store(&self, host: &str, certificate: &CertificateDer<'_>) -> Result<(), StorageError> {
        self.delegate.store(host, certificate)?;
        self.write_cache()
            .insert(host.to_string(), CertificateDer::from(certificate.as_ref().to_vec()));
        Ok(())
    }

    fn remove(&self, host: &str) -> Result<bool, StorageError> {
        let removed = self.delegate.remove(host)?;
        self.write_cache().remove(host);
        Ok(removed)
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.delegate.clear()?;
        self.write_cache().clear();
        Ok(())
    }
}

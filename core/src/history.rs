/*
 * history.rs
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

//! Back/forward navigation history.
//!
//! The cursor sits one past the last entry after `add`. Moving back from there skips
//! the current page; moving past either end returns `None` and parks the cursor at
//! the edge so that the next move in the other direction lands on the end entry.

use std::collections::VecDeque;
use std::fs;
use std::io;
use std::path::Path;

use crate::uri::{geminify, GeminiUri};

pub const MAX_ENTRIES: usize = 100;

#[derive(Debug, Clone, Default)]
pub struct BrowsingHistory {
    entries: VecDeque<GeminiUri>,
    index: isize,
}

impl BrowsingHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &GeminiUri> {
        self.entries.iter()
    }

    /// Record a visited page, dropping the oldest entry when full.
    pub fn add(&mut self, uri: GeminiUri) {
        if self.entries.len() == MAX_ENTRIES {
            self.entries.pop_front();
        }
        self.entries.push_back(uri);
        self.index = self.entries.len() as isize;
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.index = 0;
    }

    pub fn back(&mut self) -> Option<&GeminiUri> {
        if self.index == -1 {
            return None;
        }
        if self.index == self.entries.len() as isize {
            self.index -= 1;
        }
        self.index -= 1;
        self.current()
    }

    pub fn forth(&mut self) -> Option<&GeminiUri> {
        if self.index == self.entries.len() as isize {
            return None;
        }
        if self.index < 0 {
            self.index += 1;
        }
        self.index += 1;
        self.current()
    }

    fn current(&self) -> Option<&GeminiUri> {
        usize::try_from(self.index).ok().and_then(|i| self.entries.get(i))
    }

    /// Read one URI per line. A missing file is an empty history; lines that are not
    /// Gemini URIs are skipped.
    pub fn load(path: &Path) -> io::Result<Self> {
        let text = match fs::read_to_string(path) {
            Ok(t) => t,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::new()),
            Err(e) => return Err(e),
        };
        let mut history = Self::new();
        for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
            match geminify(line) {
                Ok(uri) => history.add(uri),
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "skipping history entry"),
            }
        }
        Ok(history)
    }

    pub fn save(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut out = String::new();
        for uri in &self.entries {
            out.push_str(&uri.to_string());
            out.push('\n');
        }
        fs::write(path, out)
    }
}

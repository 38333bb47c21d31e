/*
 * lib.rs
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

//! Gemlet core: a Gemini protocol client.
//!
//! - `protocol::gemini`: response parser, response model, request/redirect loop.
//! - `tls`: trust-on-first-use certificate verification and the pinned-certificate store.
//! - `uri`: URI normalization, Input answers and link resolution.
//! - `gemtext`, `mime`: document and media type parsing.
//! - `history`, `config`, `interaction`: browsing state, settings and the user boundary.

pub mod config;
pub mod error;
pub mod gemtext;
pub mod history;
pub mod interaction;
pub mod mime;
pub mod net;
pub mod protocol;
pub mod tls;
pub mod uri;

pub use error::GeminiError;

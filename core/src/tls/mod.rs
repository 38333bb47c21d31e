/*
 * mod.rs
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

//! Server certificate trust: inspection, pinning and the handshake verifier.

pub mod certificate;
pub mod store;
pub mod tofu;

pub use certificate::{CertificateInfo, Validity};
pub use store::{CachedCertificateStore, CertificateStore, FileCertificateStore, StorageError};
pub use tofu::{TofuTrustManager, TofuVerifier, TrustError};

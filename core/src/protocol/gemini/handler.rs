/*
 * handler.rs
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

//! Gemini response handler trait.
//!
//! Events: before_request (×n, once per request sent) → show_response | failed.

use std::future::Future;
use std::io;

use super::response::Response;
use crate::error::GeminiError;
use crate::uri::GeminiUri;

/// Receives the outcome of `Client::send_request`.
///
/// Input and Redirect responses are handled by the client itself; the handler sees
/// every URI requested along the way and then exactly one of `show_response` or `failed`.
pub trait ResponseHandler {
    /// Called before each request line is sent, including after redirects and Input answers.
    fn before_request(&mut self, _uri: &GeminiUri) {}

    /// Called with the terminal response. A Success body may be read here; the client
    /// closes it afterwards.
    fn show_response(
        &mut self,
        uri: &GeminiUri,
        response: &mut Response,
    ) -> impl Future<Output = io::Result<()>>;

    /// Called when the navigation fails (connection, trust, parse, redirect or input error).
    fn failed(&mut self, error: &GeminiError);
}

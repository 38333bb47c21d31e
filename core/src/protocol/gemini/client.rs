/*
 * client.rs
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

//! Gemini client: one request per connection, following Input prompts and redirects.

use std::sync::Arc;

use tokio::io::AsyncWriteExt;

use super::handler::ResponseHandler;
use super::parser::parse_response;
use super::response::Response;
use crate::config::ClientConfig;
use crate::error::GeminiError;
use crate::interaction::UserInteraction;
use crate::net::{Connector, GeminiConnector};
use crate::tls::TofuTrustManager;
use crate::uri::{append_query, geminify, GeminiUri};

/// Gemini client. Create with `Client::new(trust, ui, config)` and navigate with
/// `send_request` (handler callbacks) or `follow` (returns the terminal response).
pub struct Client<C = GeminiConnector> {
    connector: C,
    ui: Arc<dyn UserInteraction>,
    config: ClientConfig,
}

impl Client<GeminiConnector> {
    /// Client on the network, trusting servers through `trust`.
    pub fn new(trust: Arc<TofuTrustManager>, ui: Arc<dyn UserInteraction>, config: ClientConfig) -> Self {
        let connector =
            GeminiConnector::new(trust).with_timeouts(config.connect_timeout, config.read_timeout);
        Self::with_connector(connector, ui, config)
    }
}

impl<C: Connector> Client<C> {
    pub fn with_connector(connector: C, ui: Arc<dyn UserInteraction>, config: ClientConfig) -> Self {
        Self { connector, ui, config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// One exchange: connect, send the request line, parse the header.
    pub async fn request(&self, uri: &GeminiUri) -> Result<Response, GeminiError> {
        let mut stream = self.connector.connect(uri.host(), uri.port()).await?;
        stream.write_all(uri.request_line().as_bytes()).await?;
        stream.flush().await?;
        let response = parse_response(stream).await?;
        tracing::debug!(%uri, status = %response.status(), meta = response.meta(), "response");
        Ok(response)
    }

    /// Navigate to `input`, answering Input prompts through the user and following
    /// redirects, until a Success or failure response arrives.
    pub async fn follow<H: ResponseHandler>(
        &self,
        input: &str,
        handler: &mut H,
    ) -> Result<(GeminiUri, Response), GeminiError> {
        let mut uri = geminify(input)?;
        let mut visited: Vec<GeminiUri> = Vec::new();
        loop {
            handler.before_request(&uri);
            tracing::info!(%uri, "request");
            match self.request(&uri).await? {
                Response::Input { status, prompt } => {
                    let answer = if status.is_sensitive_input() {
                        self.ui.prompt_sensitive(&prompt)
                    } else {
                        self.ui.prompt(&prompt)
                    };
                    let answer = answer.ok_or(GeminiError::InputCancelled)?;
                    uri = append_query(&uri, &answer);
                }
                Response::Redirect { target, .. } => {
                    let next = geminify(&target)?;
                    if visited.contains(&next) {
                        visited.push(next);
                        return Err(GeminiError::RedirectCycle { visited });
                    }
                    visited.push(next.clone());
                    if visited.len() > self.config.max_redirects {
                        return Err(GeminiError::TooManyRedirects { visited });
                    }
                    tracing::debug!(from = %uri, to = %next, "redirect");
                    uri = next;
                }
                response => return Ok((uri, response)),
            }
        }
    }

    /// Navigate to `input` and report the outcome to `handler`. A Success body is
    /// closed once `show_response` returns.
    pub async fn send_request<H: ResponseHandler>(&self, input: &str, handler: &mut H) {
        match self.follow(input, handler).await {
            Ok((uri, mut response)) => {
                let shown = handler.show_response(&uri, &mut response).await;
                if let Response::Success { body, .. } = response {
                    if let Err(e) = body.close().await {
                        tracing::debug!(%uri, error = %e, "closing connection");
                    }
                }
                if let Err(e) = shown {
                    handler.failed(&GeminiError::from(e));
                }
            }
            Err(e) => {
                tracing::warn!(input, error = %e, "navigation failed");
                handler.failed(&e);
            }
        }
    }
}

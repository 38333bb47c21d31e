/*
 * net.rs
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

//! TLS connections to Gemini servers.
//!
//! `GeminiConnector` dials TCP, handshakes TLS 1.2/1.3 with the TOFU verifier and wraps
//! the stream so that reads fail after the configured idle time. Tests substitute
//! their own `Connector`.

use std::future::Future;
use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use rustls::client::ClientConfig;
use rustls::pki_types::ServerName;
use rustls::version::{TLS12, TLS13};
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::TcpStream;
use tokio::time::{sleep, timeout, Sleep};
use tokio_rustls::client::TlsStream;
use tokio_rustls::TlsConnector;

use crate::config::{DEFAULT_CONNECT_TIMEOUT, DEFAULT_READ_TIMEOUT};
use crate::tls::{TofuTrustManager, TofuVerifier};

/// Opens a byte stream to `host:port`.
pub trait Connector: Send + Sync {
    type Stream: AsyncRead + AsyncWrite + Unpin + Send + 'static;

    fn connect(&self, host: &str, port: u16) -> impl Future<Output = io::Result<Self::Stream>> + Send;
}

/// TLS client config accepting TLS 1.2 and 1.3, verifying servers with TOFU.
pub fn gemini_client_config(manager: Arc<TofuTrustManager>) -> Arc<ClientConfig> {
    let config = ClientConfig::builder_with_protocol_versions(&[&TLS12, &TLS13])
        .dangerous()
        .with_custom_certificate_verifier(Arc::new(TofuVerifier::new(manager)))
        .with_no_client_auth();
    Arc::new(config)
}

/// Real network connector.
#[derive(Clone)]
pub struct GeminiConnector {
    tls: TlsConnector,
    connect_timeout: Duration,
    read_timeout: Duration,
}

impl GeminiConnector {
    pub fn new(manager: Arc<TofuTrustManager>) -> Self {
        Self {
            tls: TlsConnector::from(gemini_client_config(manager)),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }

    pub fn with_timeouts(mut self, connect_timeout: Duration, read_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self.read_timeout = read_timeout;
        self
    }
}

impl Connector for GeminiConnector {
    type Stream = ReadTimeout<TlsStream<TcpStream>>;

    fn connect(&self, host: &str, port: u16) -> impl Future<Output = io::Result<Self::Stream>> + Send {
        let addr = format_addr(host, port);
        let server_name = ServerName::try_from(host.to_string())
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "invalid host name"));
        let tls = self.tls.clone();
        let connect_timeout = self.connect_timeout;
        let read_timeout = self.read_timeout;
        async move {
            let server_name = server_name?;
            tracing::debug!(%addr, "connecting");
            let tcp = timeout(connect_timeout, TcpStream::connect(&addr))
                .await
                .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "TCP connect timed out"))??;
            let stream = tls.connect(server_name, tcp).await?;
            Ok(ReadTimeout::new(stream, read_timeout))
        }
    }
}

fn format_addr(host: &str, port: u16) -> String {
    if host.contains(':') {
        format!("[{}]:{}", host, port)
    } else {
        format!("{}:{}", host, port)
    }
}

/// Stream whose reads fail with `TimedOut` when no data arrives within `timeout`.
/// Writes pass through.
pub struct ReadTimeout<S> {
    inner: S,
    timeout: Duration,
    deadline: Option<Pin<Box<Sleep>>>,
}

impl<S> ReadTimeout<S> {
    pub fn new(inner: S, timeout: Duration) -> Self {
        Self {
            inner,
            timeout,
            deadline: None,
        }
    }

    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: AsyncRead + Unpin> AsyncRead for ReadTimeout<S> {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = &mut *self;
        match Pin::new(&mut this.inner).poll_read(cx, buf) {
            Poll::Ready(result) => {
                this.deadline = None;
                Poll::Ready(result)
            }
            Poll::Pending => {
                let limit = this.timeout;
                let deadline = this.deadline.get_or_insert_with(|| Box::pin(sleep(limit)));
                match deadline.as_mut().poll(cx) {
                    Poll::Ready(()) => {
                        this.deadline = None;
                        Poll::Ready(Err(io::Error::new(io::ErrorKind::TimedOut, "read timed out")))
                    }
                    Poll::Pending => Poll::Pending,
                }
            }
        }
    }
}

impl<S: AsyncWrite + Unpin> AsyncWrite for ReadTimeout<S> {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.inner).poll_write(cx, buf)
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_flush(cx)
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_shutdown(cx)
    }
}

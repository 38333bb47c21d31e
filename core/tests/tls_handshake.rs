/*
 * tls_handshake.rs
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

//! Full handshakes against a local TLS server with a self-signed certificate.

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex};

use rustls::crypto::aws_lc_rs;
use rustls::pki_types::{CertificateDer, PrivateKeyDer, PrivatePkcs8KeyDer};
use rustls::ServerConfig;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio_rustls::TlsAcceptor;

use gemlet_core::config::ClientConfig;
use gemlet_core::interaction::UserInteraction;
use gemlet_core::protocol::gemini::{Client, Response};
use gemlet_core::tls::{CertificateStore, StorageError, TofuTrustManager, TrustError};
use gemlet_core::uri::{geminify, GeminiUri};
use gemlet_core::GeminiError;

#[derive(Default)]
struct MemoryStore {
    entries: Mutex<BTreeMap<String, CertificateDer<'static>>>,
}

impl CertificateStore for MemoryStore {
    fn load_all(&self) -> Result<BTreeMap<String, CertificateDer<'static>>, StorageError> {
        Ok(self.entries.lock().unwrap().clone())
    }

    fn load(&self, host: &str) -> Result<Option<CertificateDer<'static>>, StorageError> {
        Ok(self.entries.lock().unwrap().get(host).cloned())
    }

    fn store(&self, host: &str, certificate: &CertificateDer<'_>) -> Result<(), StorageError> {
        self.entries
            .lock()
            .unwrap()
            .insert(host.to_string(), CertificateDer::from(certificate.to_vec()));
        Ok(())
    }

    fn remove(&self, host: &str) -> Result<bool, StorageError> {
        Ok(self.entries.lock().unwrap().remove(host).is_some())
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.entries.lock().unwrap().clear();
        Ok(())
    }
}

#[derive(Default)]
struct ScriptedUser {
    answers: Mutex<VecDeque<String>>,
    prompts: Mutex<usize>,
}

impl ScriptedUser {
    fn answering(answers: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            answers: Mutex::new(answers.iter().map(|a| a.to_string()).collect()),
            prompts: Mutex::default(),
        })
    }

    fn prompts(&self) -> usize {
        *self.prompts.lock().unwrap()
    }
}

impl UserInteraction for ScriptedUser {
    fn prompt(&self, _message: &str) -> Option<String> {
        *self.prompts.lock().unwrap() += 1;
        self.answers.lock().unwrap().pop_front()
    }

    fn show_message(&self, _message: &str) {}
}

/// Answers every connection with `20 text/gemini` and the request line as the body.
/// Returns the port and the certificate the server presents.
async fn serve() -> (u16, CertificateDer<'static>) {
    let certified = rcgen::generate_simple_self_signed(vec!["localhost".to_string()]).unwrap();
    let cert = certified.cert.der().clone();
    let key = PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(certified.key_pair.serialize_der()));
    let config = ServerConfig::builder_with_provider(Arc::new(aws_lc_rs::default_provider()))
        .with_safe_default_protocol_versions()
        .unwrap()
        .with_no_client_auth()
        .with_single_cert(vec![cert.clone()], key)
        .unwrap();
    let acceptor = TlsAcceptor::from(Arc::new(config));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        while let Ok((tcp, _)) = listener.accept().await {
            let acceptor = acceptor.clone();
            tokio::spawn(async move {
                // Rejected handshakes end here.
                let Ok(stream) = acceptor.accept(tcp).await else {
                    return;
                };
                let mut stream = BufReader::new(stream);
                let mut line = String::new();
                if stream.read_line(&mut line).await.is_err() {
                    return;
                }
                let reply = format!("20 text/gemini\r\n{}", line);
                let mut stream = stream.into_inner();
                let _ = stream.write_all(reply.as_bytes()).await;
                let _ = stream.shutdown().await;
            });
        }
    });
    (port, cert)
}

fn client(store: Arc<MemoryStore>, ui: Arc<ScriptedUser>) -> Client {
    let trust = Arc::new(TofuTrustManager::new(store, ui.clone()));
    Client::new(trust, ui, ClientConfig::default())
}

fn uri(port: u16) -> GeminiUri {
    geminify(&format!("gemini://localhost:{}/page", port)).unwrap()
}

async fn body_of(response: Response) -> String {
    match response {
        Response::Success { mut body, .. } => {
            let mut text = String::new();
            body.read_to_string(&mut text).await.unwrap();
            let _ = body.close().await;
            text
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[tokio::test]
async fn first_connection_asks_then_pin_is_reused() {
    let (port, cert) = serve().await;
    let store = Arc::new(MemoryStore::default());
    let ui = ScriptedUser::answering(&["1"]);
    let client = client(store.clone(), ui.clone());

    let first = client.request(&uri(port)).await.unwrap();
    assert_eq!(ui.prompts(), 1);
    assert_eq!(store.load("localhost").unwrap(), Some(cert));
    assert_eq!(body_of(first).await, uri(port).request_line());

    let second = client.request(&uri(port)).await.unwrap();
    assert_eq!(ui.prompts(), 1);
    assert_eq!(body_of(second).await, uri(port).request_line());
}

#[tokio::test]
async fn declined_certificate_fails_the_request() {
    let (port, _) = serve().await;
    let store = Arc::new(MemoryStore::default());
    let ui = ScriptedUser::answering(&["2"]);

    let err = client(store.clone(), ui.clone())
        .request(&uri(port))
        .await
        .unwrap_err();

    match err {
        GeminiError::Trust(TrustError::Rejected { host }) => assert_eq!(host, "localhost"),
        other => panic!("unexpected {:?}", other),
    }
    assert_eq!(ui.prompts(), 1);
    assert_eq!(store.load("localhost").unwrap(), None);
}

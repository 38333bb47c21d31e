/*
 * tofu.rs
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

//! Trust-on-first-use decisions with generated certificates.

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use rustls::pki_types::CertificateDer;

use gemlet_core::interaction::UserInteraction;
use gemlet_core::tls::{CertificateStore, StorageError, TofuTrustManager, TrustError};

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
    messages: Mutex<Vec<String>>,
}

impl ScriptedUser {
    fn answer(&self, answers: &[&str]) {
        self.answers
            .lock()
            .unwrap()
            .extend(answers.iter().map(|a| a.to_string()));
    }

    fn prompts(&self) -> usize {
        *self.prompts.lock().unwrap()
    }

    fn saw(&self, text: &str) -> bool {
        self.messages.lock().unwrap().iter().any(|m| m.contains(text))
    }
}

impl UserInteraction for ScriptedUser {
    fn prompt(&self, _message: &str) -> Option<String> {
        *self.prompts.lock().unwrap() += 1;
        self.answers.lock().unwrap().pop_front()
    }

    fn show_message(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}

struct Fixture {
    store: Arc<MemoryStore>,
    ui: Arc<ScriptedUser>,
    manager: TofuTrustManager,
}

fn fixture() -> Fixture {
    let store = Arc::new(MemoryStore::default());
    let ui = Arc::new(ScriptedUser::default());
    let manager = TofuTrustManager::new(store.clone(), ui.clone());
    Fixture { store, ui, manager }
}

fn now() -> i64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs() as i64
}

fn self_signed(name: &str) -> CertificateDer<'static> {
    rcgen::generate_simple_self_signed(vec![name.to_string()])
        .unwrap()
        .cert
        .der()
        .clone()
}

fn expired(name: &str) -> CertificateDer<'static> {
    let mut params = rcgen::CertificateParams::new(vec![name.to_string()]).unwrap();
    params.not_before = rcgen::date_time_ymd(1999, 1, 1);
    params.not_after = rcgen::date_time_ymd(2000, 1, 1);
    let key = rcgen::KeyPair::generate().unwrap();
    params.self_signed(&key).unwrap().der().clone()
}

#[test]
fn first_visit_asks_and_pins() {
    let f = fixture();
    let cert = self_signed("localhost");
    f.ui.answer(&["1"]);

    f.manager.check_server("localhost", &[cert.clone()], now()).unwrap();

    assert_eq!(f.ui.prompts(), 1);
    assert!(f.ui.saw("First time accessing this host."));
    assert_eq!(f.store.load("localhost").unwrap(), Some(cert));
}

#[test]
fn pinned_certificate_is_accepted_silently() {
    let f = fixture();
    let cert = self_signed("localhost");
    f.store.store("localhost", &cert).unwrap();

    f.manager.check_server("localhost", &[cert], now()).unwrap();

    assert_eq!(f.ui.prompts(), 0);
    assert!(f.ui.messages.lock().unwrap().is_empty());
}

#[test]
fn changed_key_is_rejected_when_user_declines() {
    let f = fixture();
    let pinned = self_signed("localhost");
    let presented = self_signed("localhost");
    f.store.store("localhost", &pinned).unwrap();
    f.ui.answer(&["2"]);

    let err = f.manager.check_server("localhost", &[presented], now()).unwrap_err();

    assert!(matches!(err, TrustError::Rejected { ref host } if host == "localhost"));
    assert!(f.ui.saw("has been changed"));
    assert_eq!(f.store.load("localhost").unwrap(), Some(pinned));
}

#[test]
fn changed_key_replaces_pin_when_accepted() {
    let f = fixture();
    let presented = self_signed("localhost");
    f.store.store("localhost", &self_signed("localhost")).unwrap();
    f.ui.answer(&["yes"]);

    f.manager.check_server("localhost", &[presented.clone()], now()).unwrap();

    assert_eq!(f.store.load("localhost").unwrap(), Some(presented));
}

#[test]
fn expired_certificate_prompts_even_when_pinned() {
    let f = fixture();
    let cert = expired("localhost");
    f.store.store("localhost", &cert).unwrap();
    f.ui.answer(&["3", "1"]);

    f.manager.check_server("localhost", &[cert], now()).unwrap();

    assert_eq!(f.ui.prompts(), 2);
    assert!(f.ui.saw("EXPIRED"));
    assert!(f.ui.saw("SHA-256"));
    assert!(!f.ui.saw("has been changed"));
}

#[test]
fn host_mismatch_prompts() {
    let f = fixture();
    let cert = self_signed("other.example");
    f.store.store("localhost", &cert).unwrap();
    f.ui.answer(&["no"]);

    let err = f.manager.check_server("localhost", &[cert], now()).unwrap_err();

    assert!(matches!(err, TrustError::Rejected { .. }));
    assert!(f.ui.saw("other.example"));
}

#[test]
fn invalid_answers_reprompt() {
    let f = fixture();
    f.ui.answer(&["maybe", "2"]);

    let err = f
        .manager
        .check_server("localhost", &[self_signed("localhost")], now())
        .unwrap_err();

    assert!(matches!(err, TrustError::Rejected { .. }));
    assert_eq!(f.ui.prompts(), 2);
    assert!(f.ui.saw("Please enter a valid option."));
}

#[test]
fn closed_prompt_rejects() {
    let f = fixture();

    let err = f
        .manager
        .check_server("localhost", &[self_signed("localhost")], now())
        .unwrap_err();

    assert!(matches!(err, TrustError::Rejected { .. }));
    assert_eq!(f.store.load("localhost").unwrap(), None);
}

#[test]
fn empty_chain_is_fatal() {
    let f = fixture();
    let err = f.manager.check_server("localhost", &[], now()).unwrap_err();
    assert!(matches!(err, TrustError::NoCertificate));
    assert_eq!(f.ui.prompts(), 0);
}

//! Scripted fakes for the pipeline's collaborator seams. Each queue holds
//! the responses one stage will see, in order; running past the end of a
//! queue panics, which doubles as a "no further network calls" check.

use crate::captcha::CaptchaSolver;
use crate::extract::ViolationExtractor;
use crate::session::{FetchError, Session, SessionProvider};
use crate::types::Violation;
use async_trait::async_trait;
use failure::Error;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

type Queue<T> = Mutex<VecDeque<Result<T, FetchError>>>;

#[derive(Default)]
pub struct SiteScript {
    captcha_queue: Queue<Vec<u8>>,
    submit_queue: Queue<String>,
    results_queue: Queue<String>,
    forms_seen: Mutex<Vec<HashMap<String, String>>>,
    urls_seen: Mutex<Vec<String>>,
    pub sessions_created: AtomicUsize,
    pub captcha_requests: AtomicUsize,
    pub submit_requests: AtomicUsize,
    pub results_requests: AtomicUsize,
}

impl SiteScript {
    pub fn new() -> Arc<Self> {
        Arc::new(SiteScript::default())
    }

    pub fn push_captcha(&self, response: Result<Vec<u8>, FetchError>) {
        self.captcha_queue.lock().unwrap().push_back(response);
    }

    pub fn push_submit(&self, response: Result<String, FetchError>) {
        self.submit_queue.lock().unwrap().push_back(response);
    }

    pub fn push_results(&self, response: Result<String, FetchError>) {
        self.results_queue.lock().unwrap().push_back(response);
    }

    /// Form fields of the most recent submission.
    pub fn last_form(&self) -> HashMap<String, String> {
        self.forms_seen
            .lock()
            .unwrap()
            .last()
            .expect("no form was submitted")
            .clone()
    }

    /// URL of the most recent results request.
    pub fn last_url(&self) -> String {
        self.urls_seen
            .lock()
            .unwrap()
            .last()
            .expect("no results page was requested")
            .clone()
    }
}

pub fn fake_session(script: &Arc<SiteScript>) -> Box<dyn Session> {
    Box::new(FakeSession {
        script: script.clone(),
    })
}

struct FakeSession {
    script: Arc<SiteScript>,
}

fn pop<T>(queue: &Queue<T>, what: &str) -> Result<T, FetchError> {
    queue
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or_else(|| panic!("unscripted {} request", what))
}

#[async_trait]
impl Session for FakeSession {
    async fn get_bytes(&self, _url: &str) -> Result<Vec<u8>, FetchError> {
        self.script.captcha_requests.fetch_add(1, Ordering::SeqCst);
        pop(&self.script.captcha_queue, "captcha")
    }

    async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        self.script.results_requests.fetch_add(1, Ordering::SeqCst);
        self.script.urls_seen.lock().unwrap().push(url.to_string());
        pop(&self.script.results_queue, "results")
    }

    async fn post_form(&self, _url: &str, form: &[(&str, &str)]) -> Result<String, FetchError> {
        self.script.submit_requests.fetch_add(1, Ordering::SeqCst);
        self.script.forms_seen.lock().unwrap().push(
            form.iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        );
        pop(&self.script.submit_queue, "submit")
    }
}

pub struct ScriptedProvider {
    script: Arc<SiteScript>,
}

impl ScriptedProvider {
    pub fn new(script: Arc<SiteScript>) -> Self {
        ScriptedProvider { script }
    }
}

impl SessionProvider for ScriptedProvider {
    fn new_session(&self) -> Box<dyn Session> {
        self.script.sessions_created.fetch_add(1, Ordering::SeqCst);
        fake_session(&self.script)
    }
}

pub struct FakeSolver {
    texts: Mutex<VecDeque<String>>,
    fail: bool,
}

impl FakeSolver {
    /// Returns the given texts in order, then "ab3x9" forever.
    pub fn returning(texts: Vec<String>) -> Self {
        FakeSolver {
            texts: Mutex::new(texts.into()),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        FakeSolver {
            texts: Mutex::new(VecDeque::new()),
            fail: true,
        }
    }
}

#[async_trait]
impl CaptchaSolver for FakeSolver {
    async fn recognize(&self, _image: &[u8]) -> Result<String, Error> {
        if self.fail {
            return Err(format_err!("recognition engine unavailable"));
        }
        Ok(self
            .texts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| "ab3x9".to_string()))
    }
}

pub struct FakeExtractor {
    violations: Vec<Violation>,
    fail: bool,
}

impl FakeExtractor {
    pub fn returning(violations: Vec<Violation>) -> Self {
        FakeExtractor {
            violations,
            fail: false,
        }
    }

    pub fn failing() -> Self {
        FakeExtractor {
            violations: Vec::new(),
            fail: true,
        }
    }
}

impl ViolationExtractor for FakeExtractor {
    fn extract(&self, _html: &str) -> Result<Vec<Violation>, Error> {
        if self.fail {
            return Err(format_err!("unexpected page layout"));
        }
        Ok(self.violations.clone())
    }
}

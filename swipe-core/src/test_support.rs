//! Deterministic doubles for the page, classifier, randomness and pause seams.
//!
//! The doubles share their state behind `Arc`, so a test can hand a clone to
//! the code under test and inspect the recorded calls afterwards.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::{
    BrowserPage, CapturedImage, Classifier, ClassifierError, ClassifierFactory, Locator, PageError,
    Pause, RandomSource, Region,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Replays scripted values in order and then repeats the last one.
#[derive(Debug, Clone)]
struct Script<T> {
    values: Vec<T>,
    cursor: usize,
}

impl<T: Clone> Script<T> {
    fn new(values: Vec<T>) -> Self {
        Self { values, cursor: 0 }
    }

    fn next(&mut self) -> Option<T> {
        let value = self
            .values
            .get(self.cursor)
            .or_else(|| self.values.last())
            .cloned();
        self.cursor = self.cursor.saturating_add(1);
        value
    }
}

/// One call observed by [`StubPage`].
#[derive(Debug, Clone, PartialEq)]
pub enum PageCall {
    /// `navigate(url)`.
    Navigate(String),
    /// `reload()`.
    Reload,
    /// `capture_region(region)`.
    CaptureRegion(Region),
    /// `visible_text()`.
    VisibleText,
    /// `query_text(locator)`.
    QueryText(Locator),
    /// `query_links(locator)`.
    QueryLinks(Locator),
    /// `press_key(key)`.
    PressKey(String),
    /// `click(locator)`.
    Click(Locator),
    /// `type_text(locator, text)`.
    TypeText(Locator, String),
    /// `wait_for(locator, timeout)`.
    WaitFor(Locator),
}

#[derive(Debug)]
struct PageState {
    visible_text: Script<Result<String, PageError>>,
    texts: HashMap<Locator, Vec<String>>,
    links: HashMap<Locator, Vec<String>>,
    presence: HashMap<Locator, Script<bool>>,
    capture: Result<Vec<u8>, PageError>,
    key_error: Option<PageError>,
    calls: Vec<PageCall>,
}

impl Default for PageState {
    fn default() -> Self {
        Self {
            visible_text: Script::new(Vec::new()),
            texts: HashMap::new(),
            links: HashMap::new(),
            presence: HashMap::new(),
            capture: Ok(vec![0x89, b'P', b'N', b'G']),
            key_error: None,
            calls: Vec::new(),
        }
    }
}

/// Scripted in-memory [`BrowserPage`].
///
/// Every locator is present unless scripted otherwise, visible text defaults
/// to the empty string, and captures return a short fake PNG header.
#[derive(Debug, Clone, Default)]
pub struct StubPage {
    state: Arc<Mutex<PageState>>,
}

impl StubPage {
    /// Script successive `visible_text` results; the last one repeats.
    pub fn set_visible_text<I>(&self, results: I)
    where
        I: IntoIterator<Item = Result<String, PageError>>,
    {
        lock(&self.state).visible_text = Script::new(results.into_iter().collect());
    }

    /// Return `texts` for `query_text(locator)`.
    pub fn set_texts<I, S>(&self, locator: &Locator, texts: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        lock(&self.state)
            .texts
            .insert(locator.clone(), texts.into_iter().map(Into::into).collect());
    }

    /// Return `links` for `query_links(locator)`.
    pub fn set_links<I, S>(&self, locator: &Locator, links: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        lock(&self.state)
            .links
            .insert(locator.clone(), links.into_iter().map(Into::into).collect());
    }

    /// Make `locator` permanently present or absent.
    pub fn set_present(&self, locator: &Locator, present: bool) {
        self.script_presence(locator, [present]);
    }

    /// Script successive presence answers for `locator`; the last one repeats.
    pub fn script_presence<I>(&self, locator: &Locator, answers: I)
    where
        I: IntoIterator<Item = bool>,
    {
        lock(&self.state)
            .presence
            .insert(locator.clone(), Script::new(answers.into_iter().collect()));
    }

    /// Result returned by every capture.
    pub fn set_capture(&self, result: Result<Vec<u8>, PageError>) {
        lock(&self.state).capture = result;
    }

    /// Make every key press fail with `error`.
    pub fn fail_keys(&self, error: PageError) {
        lock(&self.state).key_error = Some(error);
    }

    /// Every call observed so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<PageCall> {
        lock(&self.state).calls.clone()
    }

    /// Keys pressed so far, in order.
    #[must_use]
    pub fn pressed_keys(&self) -> Vec<String> {
        lock(&self.state)
            .calls
            .iter()
            .filter_map(|call| match call {
                PageCall::PressKey(key) => Some(key.clone()),
                _ => None,
            })
            .collect()
    }

    /// Number of calls matching `predicate`.
    #[must_use]
    pub fn count_calls(&self, predicate: impl Fn(&PageCall) -> bool) -> usize {
        lock(&self.state).calls.iter().filter(|&call| predicate(call)).count()
    }

    fn record(&self, call: PageCall) -> MutexGuard<'_, PageState> {
        let mut state = lock(&self.state);
        state.calls.push(call);
        state
    }

    fn present(state: &mut PageState, locator: &Locator) -> bool {
        state
            .presence
            .get_mut(locator)
            .and_then(Script::next)
            .unwrap_or(true)
    }
}

impl BrowserPage for StubPage {
    fn navigate(&self, url: &str) -> Result<(), PageError> {
        drop(self.record(PageCall::Navigate(url.to_owned())));
        Ok(())
    }

    fn reload(&self) -> Result<(), PageError> {
        drop(self.record(PageCall::Reload));
        Ok(())
    }

    fn capture_region(&self, region: Region) -> Result<Vec<u8>, PageError> {
        self.record(PageCall::CaptureRegion(region)).capture.clone()
    }

    fn visible_text(&self) -> Result<String, PageError> {
        self.record(PageCall::VisibleText)
            .visible_text
            .next()
            .unwrap_or_else(|| Ok(String::new()))
    }

    fn query_text(&self, locator: &Locator) -> Result<Vec<String>, PageError> {
        let state = self.record(PageCall::QueryText(locator.clone()));
        Ok(state.texts.get(locator).cloned().unwrap_or_default())
    }

    fn query_links(&self, locator: &Locator) -> Result<Vec<String>, PageError> {
        let state = self.record(PageCall::QueryLinks(locator.clone()));
        Ok(state.links.get(locator).cloned().unwrap_or_default())
    }

    fn press_key(&self, key: &str) -> Result<(), PageError> {
        let state = self.record(PageCall::PressKey(key.to_owned()));
        state.key_error.clone().map_or(Ok(()), Err)
    }

    fn click(&self, locator: &Locator) -> Result<bool, PageError> {
        let mut state = self.record(PageCall::Click(locator.clone()));
        Ok(Self::present(&mut state, locator))
    }

    fn type_text(&self, locator: &Locator, text: &str) -> Result<(), PageError> {
        let mut state = self.record(PageCall::TypeText(locator.clone(), text.to_owned()));
        if Self::present(&mut state, locator) {
            Ok(())
        } else {
            Err(PageError::ElementNotFound {
                locator: locator.to_string(),
            })
        }
    }

    fn wait_for(&self, locator: &Locator, _timeout: Duration) -> Result<bool, PageError> {
        let mut state = self.record(PageCall::WaitFor(locator.clone()));
        Ok(Self::present(&mut state, locator))
    }
}

/// Scripted [`ClassifierFactory`] counting how often it is used.
#[derive(Debug, Clone)]
pub struct StubClassifierFactory {
    responses: Arc<Mutex<Script<Result<String, ClassifierError>>>>,
    created: Arc<AtomicUsize>,
    classified: Arc<AtomicUsize>,
}

impl StubClassifierFactory {
    /// Answer successive `classify` calls with `responses`; the last repeats.
    pub fn new<I>(responses: I) -> Self
    where
        I: IntoIterator<Item = Result<String, ClassifierError>>,
    {
        Self {
            responses: Arc::new(Mutex::new(Script::new(responses.into_iter().collect()))),
            created: Arc::new(AtomicUsize::new(0)),
            classified: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Always answer with `json`.
    pub fn answering(json: impl Into<String>) -> Self {
        Self::new([Ok(json.into())])
    }

    /// Number of classifier instances created.
    #[must_use]
    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    /// Number of `classify` calls across all instances.
    #[must_use]
    pub fn classify_calls(&self) -> usize {
        self.classified.load(Ordering::SeqCst)
    }
}

struct StubClassifier {
    responses: Arc<Mutex<Script<Result<String, ClassifierError>>>>,
    classified: Arc<AtomicUsize>,
}

impl Classifier for StubClassifier {
    fn classify(&self, _prompt: &str, _image: &CapturedImage) -> Result<String, ClassifierError> {
        self.classified.fetch_add(1, Ordering::SeqCst);
        lock(&self.responses)
            .next()
            .unwrap_or(Err(ClassifierError::EmptyResponse))
    }
}

impl ClassifierFactory for StubClassifierFactory {
    fn create(&mut self) -> Result<Box<dyn Classifier + '_>, ClassifierError> {
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(StubClassifier {
            responses: Arc::clone(&self.responses),
            classified: Arc::clone(&self.classified),
        }))
    }
}

/// [`RandomSource`] cycling through fixed draws.
#[derive(Debug, Clone)]
pub struct SequenceSource {
    values: Vec<f64>,
    cursor: usize,
    draws: Arc<AtomicUsize>,
}

impl SequenceSource {
    /// Cycle through `values`; an empty list always yields `0.0`.
    pub fn new<I>(values: I) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        Self {
            values: values.into_iter().collect(),
            cursor: 0,
            draws: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Shared counter of draws taken, readable after the source is moved.
    #[must_use]
    pub fn draw_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.draws)
    }
}

impl RandomSource for SequenceSource {
    fn next_unit(&mut self) -> f64 {
        self.draws.fetch_add(1, Ordering::SeqCst);
        if self.values.is_empty() {
            return 0.0;
        }
        let value = self
            .values
            .get(self.cursor % self.values.len())
            .copied()
            .unwrap_or(0.0);
        self.cursor = self.cursor.wrapping_add(1);
        value
    }
}

/// [`Pause`] that records requested durations instead of sleeping.
#[derive(Debug, Clone, Default)]
pub struct RecordingPause {
    pauses: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingPause {
    /// Durations requested so far.
    #[must_use]
    pub fn recorded(&self) -> Vec<Duration> {
        lock(&self.pauses).clone()
    }
}

impl Pause for RecordingPause {
    fn pause(&self, duration: Duration) {
        lock(&self.pauses).push(duration);
    }
}

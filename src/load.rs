//! Background article loading.
//!
//! A load cycle runs fetch → parse on its own thread and sends the outcome
//! back to the UI thread over an [`mpsc`] channel.  The main loop calls
//! [`LoadController::deliver`] on every tick, which hands the outcome of the
//! current cycle to a [`LoadListener`] exactly once.
//!
//! Starting a new cycle supersedes the running one.  Cancellation is
//! advisory: the old thread keeps running until its request finishes, but
//! its result is dropped.  Every cycle gets a monotonically increasing id and
//! the controller publishes the current id in a shared atomic; a worker
//! checks it before sending, and `deliver` checks it again on receipt.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;

use tracing::{debug, info, warn};

use crate::error::LoadError;
use crate::source::{parse_articles, Article, ArticleSource, Connectivity, ParsedBatch};

/// Outcome of one load cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadResult {
    /// At least one article was parsed.
    Success(Vec<Article>),
    /// Well-formed response with no results, or no data at all.
    Empty,
    Failure(LoadError),
}

/// Where the controller is in the current cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Running(u64),
    Delivered(u64),
    Cancelled(u64),
}

/// Lifecycle callbacks for whatever presents the loaded articles.
pub trait LoadListener {
    /// A cycle began; show a loading indicator.
    fn on_load_started(&mut self);
    /// The current cycle finished.  Called at most once per cycle.
    fn on_load_finished(&mut self, result: LoadResult);
    /// Loaded data was discarded; clear the list.
    fn on_load_reset(&mut self);
}

/// Message sent from a worker thread to the UI thread.
struct LoadMsg {
    cycle: u64,
    result: LoadResult,
}

/// Runs at most one load cycle at a time and delivers its outcome.
pub struct LoadController {
    source: Arc<dyn ArticleSource>,
    connectivity: Box<dyn Connectivity>,
    /// Id of the only cycle whose result may be delivered.
    current: Arc<AtomicU64>,
    state: LoadState,
    tx: Sender<LoadMsg>,
    rx: Receiver<LoadMsg>,
}

impl LoadController {
    pub fn new(source: Arc<dyn ArticleSource>, connectivity: Box<dyn Connectivity>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            source,
            connectivity,
            current: Arc::new(AtomicU64::new(0)),
            state: LoadState::Idle,
            tx,
            rx,
        }
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    /// Cancel whatever is running and start loading `url`.
    ///
    /// If the connectivity check says the network is unusable nothing is
    /// fetched and `Failure(NoConnectivity)` is delivered right away.
    pub fn start(&mut self, url: &str, listener: &mut impl LoadListener) {
        self.cancel();
        let cycle = self.next_cycle();

        if !self.connectivity.is_available() {
            warn!(cycle, "network unavailable, skipping fetch");
            self.state = LoadState::Delivered(cycle);
            listener.on_load_finished(LoadResult::Failure(LoadError::NoConnectivity));
            return;
        }

        info!(cycle, %url, "starting load");
        self.state = LoadState::Running(cycle);
        listener.on_load_started();

        let source = Arc::clone(&self.source);
        let current = Arc::clone(&self.current);
        let tx = self.tx.clone();
        let url = url.to_string();

        thread::spawn(move || {
            let result = run_cycle(source.as_ref(), &url);
            if current.load(Ordering::SeqCst) != cycle {
                debug!(cycle, "load superseded, discarding result");
                return;
            }
            // The controller owns the receiver; a send error means it is gone.
            let _ = tx.send(LoadMsg { cycle, result });
        });
    }

    /// Hand a finished result for the current cycle to `listener`.
    ///
    /// Drains every pending message; results of superseded cycles are
    /// dropped.  Returns `true` when something was delivered.
    pub fn deliver(&mut self, listener: &mut impl LoadListener) -> bool {
        let mut delivered = false;
        while let Ok(msg) = self.rx.try_recv() {
            match self.state {
                LoadState::Running(cycle) if cycle == msg.cycle => {
                    debug!(cycle, "delivering load result");
                    self.state = LoadState::Delivered(cycle);
                    listener.on_load_finished(msg.result);
                    delivered = true;
                }
                _ => debug!(cycle = msg.cycle, "dropping stale load result"),
            }
        }
        delivered
    }

    /// Forget delivered data and abandon any in-flight cycle.
    pub fn reset(&mut self, listener: &mut impl LoadListener) {
        self.cancel();
        self.next_cycle();
        info!("load reset");
        self.state = LoadState::Idle;
        listener.on_load_reset();
    }

    fn cancel(&mut self) {
        if let LoadState::Running(cycle) = self.state {
            info!(cycle, "cancelling running load");
            self.state = LoadState::Cancelled(cycle);
        }
    }

    /// Only the UI thread writes the token, so a plain increment suffices.
    fn next_cycle(&self) -> u64 {
        self.current.fetch_add(1, Ordering::SeqCst) + 1
    }
}

/// Fetch and parse one URL, folding every failure into a [`LoadResult`].
fn run_cycle(source: &dyn ArticleSource, url: &str) -> LoadResult {
    let body = match source.fetch(url) {
        Ok(body) => body,
        Err(e) => {
            warn!(%url, error = %e, "fetch failed");
            return LoadResult::Failure(e.into());
        }
    };

    match parse_articles(&body) {
        ParsedBatch { articles, malformed } if !articles.is_empty() => {
            if let Some(reason) = malformed {
                warn!(kept = articles.len(), %reason, "response only partially parsed");
            }
            LoadResult::Success(articles)
        }
        ParsedBatch {
            malformed: Some(reason),
            ..
        } => LoadResult::Failure(LoadError::MalformedResponse(reason)),
        _ => LoadResult::Empty,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::source::{build_search_url, HttpSource, ReachabilityMonitor, NO_CONTRIBUTORS};
    use std::collections::HashMap;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;
    use std::time::{Duration, Instant};

    const TWO_RESULTS: &str = r#"{"response": {"status": "ok", "results": [
        {
            "webTitle": "Ice sheets melting faster",
            "sectionName": "Environment",
            "webUrl": "https://www.theguardian.com/environment/ice",
            "webPublicationDate": "2017-06-19T08:30:00Z",
            "tags": [{"webTitle": "Damian Carrington"}, {"webTitle": "Fiona Harvey"}]
        },
        {
            "webTitle": "Carbon tax debate",
            "sectionName": "Politics",
            "webUrl": "https://www.theguardian.com/politics/carbon",
            "webPublicationDate": "2017-06-18T23:59:59Z",
            "tags": []
        }
    ]}}"#;

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Started,
        Finished(LoadResult),
        Reset,
    }

    #[derive(Default)]
    struct Recorder {
        events: Vec<Event>,
    }

    impl LoadListener for Recorder {
        fn on_load_started(&mut self) {
            self.events.push(Event::Started);
        }
        fn on_load_finished(&mut self, result: LoadResult) {
            self.events.push(Event::Finished(result));
        }
        fn on_load_reset(&mut self) {
            self.events.push(Event::Reset);
        }
    }

    /// Answers from a fixed table; URLs with a gate block until it opens.
    #[derive(Default)]
    struct ScriptedSource {
        responses: HashMap<String, Result<String, FetchError>>,
        gates: Mutex<HashMap<String, mpsc::Receiver<()>>>,
        calls: AtomicUsize,
    }

    impl ScriptedSource {
        fn respond(mut self, url: &str, response: Result<String, FetchError>) -> Self {
            self.responses.insert(url.to_string(), response);
            self
        }

        fn gated(self, url: &str) -> (Self, mpsc::Sender<()>) {
            let (tx, rx) = mpsc::channel();
            self.gates.lock().unwrap().insert(url.to_string(), rx);
            (self, tx)
        }
    }

    impl ArticleSource for ScriptedSource {
        fn fetch(&self, url: &str) -> Result<String, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let gate = self.gates.lock().unwrap().remove(url);
            if let Some(gate) = gate {
                let _ = gate.recv();
            }
            self.responses
                .get(url)
                .cloned()
                .unwrap_or_else(|| Ok(String::new()))
        }
    }

    fn online() -> Box<dyn Connectivity> {
        Box::new(|| true)
    }

    fn controller(source: ScriptedSource) -> (LoadController, Arc<ScriptedSource>) {
        let source = Arc::new(source);
        let shared: Arc<dyn ArticleSource> = source.clone();
        (LoadController::new(shared, online()), source)
    }

    /// Poll `deliver` like the main loop does until something arrives.
    fn wait_for_delivery(controller: &mut LoadController, listener: &mut Recorder) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if controller.deliver(listener) {
                return true;
            }
            thread::sleep(Duration::from_millis(5));
        }
        false
    }

    fn finished(listener: &Recorder) -> Vec<&LoadResult> {
        listener
            .events
            .iter()
            .filter_map(|e| match e {
                Event::Finished(r) => Some(r),
                _ => None,
            })
            .collect()
    }

    // -- outcomes ------------------------------------------------------------

    #[test]
    fn well_formed_body_delivers_success() {
        let (mut ctl, _) =
            controller(ScriptedSource::default().respond("u", Ok(TWO_RESULTS.into())));
        let mut rec = Recorder::default();

        ctl.start("u", &mut rec);
        assert!(matches!(ctl.state(), LoadState::Running(1)));
        assert!(wait_for_delivery(&mut ctl, &mut rec));

        assert_eq!(rec.events[0], Event::Started);
        match &rec.events[1] {
            Event::Finished(LoadResult::Success(articles)) => assert_eq!(articles.len(), 2),
            other => panic!("unexpected event {other:?}"),
        }
        assert_eq!(ctl.state(), LoadState::Delivered(1));
    }

    #[test]
    fn empty_body_delivers_empty() {
        let (mut ctl, _) = controller(ScriptedSource::default().respond("u", Ok(String::new())));
        let mut rec = Recorder::default();

        ctl.start("u", &mut rec);
        assert!(wait_for_delivery(&mut ctl, &mut rec));
        assert_eq!(finished(&rec), [&LoadResult::Empty]);
    }

    #[test]
    fn zero_results_delivers_empty() {
        let (mut ctl, _) = controller(
            ScriptedSource::default().respond("u", Ok(r#"{"response":{"results":[]}}"#.into())),
        );
        let mut rec = Recorder::default();

        ctl.start("u", &mut rec);
        assert!(wait_for_delivery(&mut ctl, &mut rec));
        assert_eq!(finished(&rec), [&LoadResult::Empty]);
    }

    #[test]
    fn bad_status_delivers_failure() {
        let (mut ctl, _) =
            controller(ScriptedSource::default().respond("u", Err(FetchError::BadStatus(429))));
        let mut rec = Recorder::default();

        ctl.start("u", &mut rec);
        assert!(wait_for_delivery(&mut ctl, &mut rec));
        assert_eq!(
            finished(&rec),
            [&LoadResult::Failure(LoadError::BadStatus(429))]
        );
    }

    #[test]
    fn garbage_body_delivers_malformed_failure() {
        let (mut ctl, _) = controller(ScriptedSource::default().respond("u", Ok("<html>".into())));
        let mut rec = Recorder::default();

        ctl.start("u", &mut rec);
        assert!(wait_for_delivery(&mut ctl, &mut rec));
        assert!(matches!(
            finished(&rec).as_slice(),
            [LoadResult::Failure(LoadError::MalformedResponse(_))]
        ));
    }

    #[test]
    fn partially_parsed_body_delivers_what_parsed() {
        let body = r#"{"response": {"results": [
            {"webTitle": "ok", "sectionName": "s", "webUrl": "https://example.com/ok",
             "webPublicationDate": "2017-06-19T00:00:00Z"},
            {"webTitle": "missing url", "sectionName": "s",
             "webPublicationDate": "2017-06-19T00:00:00Z"}
        ]}}"#;
        let (mut ctl, _) = controller(ScriptedSource::default().respond("u", Ok(body.into())));
        let mut rec = Recorder::default();

        ctl.start("u", &mut rec);
        assert!(wait_for_delivery(&mut ctl, &mut rec));
        assert_eq!(
            finished(&rec),
            [&LoadResult::Success(vec![Article::new(
                "ok",
                NO_CONTRIBUTORS,
                "2017-06-19",
                "s",
                "https://example.com/ok"
            )])]
        );
    }

    #[test]
    fn result_is_delivered_exactly_once() {
        let (mut ctl, _) = controller(ScriptedSource::default().respond("u", Ok(String::new())));
        let mut rec = Recorder::default();

        ctl.start("u", &mut rec);
        assert!(wait_for_delivery(&mut ctl, &mut rec));
        assert!(!ctl.deliver(&mut rec));
        assert_eq!(finished(&rec).len(), 1);
    }

    // -- connectivity gate ---------------------------------------------------

    #[test]
    fn offline_start_fails_without_fetching() {
        let source = Arc::new(ScriptedSource::default().respond("u", Ok(TWO_RESULTS.into())));
        let shared: Arc<dyn ArticleSource> = source.clone();
        let mut ctl = LoadController::new(shared, Box::new(|| false));
        let mut rec = Recorder::default();

        ctl.start("u", &mut rec);

        assert_eq!(
            rec.events,
            [Event::Finished(LoadResult::Failure(LoadError::NoConnectivity))]
        );
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
        assert_eq!(ctl.state(), LoadState::Delivered(1));
        assert!(!ctl.deliver(&mut rec));
    }

    #[test]
    fn start_returns_promptly_when_host_is_unreachable() {
        let source: Arc<dyn ArticleSource> =
            Arc::new(ScriptedSource::default().respond("u", Ok(TWO_RESULTS.into())));
        let monitor = ReachabilityMonitor::spawn("10.255.255.1", 443);
        let mut ctl = LoadController::new(source, Box::new(monitor));
        let mut rec = Recorder::default();

        let started = Instant::now();
        ctl.start("u", &mut rec);

        assert!(
            started.elapsed() < Duration::from_millis(250),
            "start blocked the UI thread for {:?}",
            started.elapsed()
        );
        assert_eq!(rec.events.len(), 1);
    }

    // -- supersession --------------------------------------------------------

    #[test]
    fn restart_discards_superseded_result() {
        let (source, release_slow) = ScriptedSource::default()
            .respond("slow", Ok(TWO_RESULTS.into()))
            .respond("fast", Ok(String::new()))
            .gated("slow");
        let (mut ctl, source) = controller(source);
        let mut rec = Recorder::default();

        ctl.start("slow", &mut rec);
        ctl.start("fast", &mut rec);
        assert!(wait_for_delivery(&mut ctl, &mut rec));
        assert_eq!(ctl.state(), LoadState::Delivered(2));

        // Let the first cycle finish late.
        release_slow.send(()).unwrap();
        thread::sleep(Duration::from_millis(100));
        assert!(!ctl.deliver(&mut rec));

        assert_eq!(
            rec.events,
            [Event::Started, Event::Started, Event::Finished(LoadResult::Empty)]
        );
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn reset_discards_in_flight_result() {
        let (source, release) = ScriptedSource::default()
            .respond("u", Ok(TWO_RESULTS.into()))
            .gated("u");
        let (mut ctl, _) = controller(source);
        let mut rec = Recorder::default();

        ctl.start("u", &mut rec);
        ctl.reset(&mut rec);
        assert_eq!(ctl.state(), LoadState::Idle);

        release.send(()).unwrap();
        thread::sleep(Duration::from_millis(100));
        assert!(!ctl.deliver(&mut rec));
        assert_eq!(rec.events, [Event::Started, Event::Reset]);
    }

    #[test]
    fn start_after_delivery_runs_a_new_cycle() {
        let (mut ctl, _) = controller(ScriptedSource::default().respond("u", Ok(String::new())));
        let mut rec = Recorder::default();

        ctl.start("u", &mut rec);
        assert!(wait_for_delivery(&mut ctl, &mut rec));
        ctl.start("u", &mut rec);
        assert!(wait_for_delivery(&mut ctl, &mut rec));

        assert_eq!(finished(&rec).len(), 2);
        assert_eq!(ctl.state(), LoadState::Delivered(2));
    }

    // -- end to end ----------------------------------------------------------

    #[tokio::test]
    async fn search_for_climate_change_against_mock_api() {
        use wiremock::matchers::{method, path, query_param};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("api-key", "test"))
            .respond_with(ResponseTemplate::new(200).set_body_string(TWO_RESULTS))
            .expect(1)
            .mount(&mock_server)
            .await;

        let base = format!("{}/search?api-key=test&q=", mock_server.uri());
        let url = build_search_url(&base, "climate change");
        assert!(url.ends_with("/search?api-key=test&q=climate+change"));

        let rec = tokio::task::spawn_blocking(move || {
            let source: Arc<dyn ArticleSource> = Arc::new(HttpSource::new().unwrap());
            let mut ctl = LoadController::new(source, online());
            let mut rec = Recorder::default();
            ctl.start(&url, &mut rec);
            assert!(wait_for_delivery(&mut ctl, &mut rec));
            rec
        })
        .await
        .unwrap();

        let outcomes = finished(&rec);
        let articles = match outcomes.as_slice() {
            [LoadResult::Success(articles)] => articles.clone(),
            other => panic!("unexpected outcome {other:?}"),
        };
        assert_eq!(
            articles,
            [
                Article::new(
                    "Ice sheets melting faster",
                    "Damian Carrington, Fiona Harvey",
                    "2017-06-19",
                    "Environment",
                    "https://www.theguardian.com/environment/ice",
                ),
                Article::new(
                    "Carbon tax debate",
                    "Contributors N/A",
                    "2017-06-18",
                    "Politics",
                    "https://www.theguardian.com/politics/carbon",
                ),
            ]
        );
    }
}

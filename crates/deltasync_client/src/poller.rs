//! The polling loop.

use crate::config::{ClientConfig, SinceStyle};
use crate::error::{ClientError, ClientResult};
use crate::http::{HttpClient, HttpResponse};
use crate::replica::{LocalReplica, ReplicaState};
use deltasync_protocol::headers::{
    accepts_json_patch, is_json_media_type, is_json_patch_media_type, quote, unquote, A_IM,
    CONTENT_TYPE, DATE, DELTA_BASE, ETAG, GET_MODIFIED_SINCE, IF_NONE_MATCH, IM, IM_JSON_PATCH,
};
use deltasync_protocol::{
    apply, decode_tag, format_http_date, parse_http_date, Document, Patch, ProtocolFlavor,
    VersionStamp,
};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// What a single poll did to the replica.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// The full document replaced the replica.
    Full,
    /// A patch with `ops` operations was applied.
    Patched {
        /// Number of operations applied.
        ops: usize,
    },
    /// The server reported no change.
    Unchanged,
}

/// Polling statistics.
#[derive(Debug, Clone, Default)]
pub struct PollStats {
    /// Responses received.
    pub polls: u64,
    /// Full documents received.
    pub full_responses: u64,
    /// Patches applied.
    pub patches_applied: u64,
    /// Unchanged responses (304 or empty patch).
    pub unchanged: u64,
    /// Retries performed.
    pub retries: u64,
    /// Total response body bytes.
    pub bytes_received: u64,
    /// Time of the last successful poll.
    pub last_poll_time: Option<Instant>,
    /// Last error message.
    pub last_error: Option<String>,
}

/// Polls a delta server and keeps a [`LocalReplica`] current.
pub struct Poller<C: HttpClient> {
    config: ClientConfig,
    client: C,
    replica: Arc<LocalReplica>,
    stats: RwLock<PollStats>,
    cancelled: AtomicBool,
}

impl<C: HttpClient> Poller<C> {
    /// Creates a poller with an empty replica.
    pub fn new(config: ClientConfig, client: C) -> Self {
        Self::with_replica(config, client, Arc::new(LocalReplica::new()))
    }

    /// Creates a poller updating an existing replica.
    pub fn with_replica(config: ClientConfig, client: C, replica: Arc<LocalReplica>) -> Self {
        Self {
            config,
            client,
            replica,
            stats: RwLock::new(PollStats::default()),
            cancelled: AtomicBool::new(false),
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns the replica.
    pub fn replica(&self) -> &Arc<LocalReplica> {
        &self.replica
    }

    /// Returns the HTTP client.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Gets the current stats.
    pub fn stats(&self) -> PollStats {
        self.stats.read().clone()
    }

    /// Stops [`run`](Self::run) before its next poll.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Resets the cancelled flag.
    pub fn reset_cancel(&self) {
        self.cancelled.store(false, Ordering::SeqCst);
    }

    fn check_cancelled(&self) -> ClientResult<()> {
        if self.cancelled.load(Ordering::SeqCst) {
            Err(ClientError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Builds the baseline-claim headers for the replica's state.
    ///
    /// An empty list asks for the full document.
    pub fn request_headers(&self, state: &ReplicaState) -> Vec<(&'static str, String)> {
        match (self.config.flavor, self.config.since_style) {
            (ProtocolFlavor::Delta, _) => match &state.tag {
                Some(tag) => vec![(A_IM, IM_JSON_PATCH.to_string()), (IF_NONE_MATCH, quote(tag))],
                None => Vec::new(),
            },
            (ProtocolFlavor::ModifiedSince, SinceStyle::Tag) => match &state.tag {
                Some(tag) => vec![(GET_MODIFIED_SINCE, quote(tag))],
                None => Vec::new(),
            },
            (ProtocolFlavor::ModifiedSince, SinceStyle::Date) => match state.modified {
                Some(modified) => vec![(GET_MODIFIED_SINCE, format_http_date(modified))],
                None => Vec::new(),
            },
        }
    }

    /// Performs one request and updates the replica from the response.
    pub fn poll_once(&self) -> ClientResult<PollOutcome> {
        self.check_cancelled()?;

        let state = self.replica.get();
        let headers = self.request_headers(&state);
        debug!(url = %self.config.server_url, ?headers, "polling");

        let response = self
            .client
            .get(&self.config.server_url, &headers)
            .map_err(|e| {
                self.stats.write().last_error = Some(e.clone());
                ClientError::transport_retryable(e)
            })?;

        let result = self.interpret(&state, &response);

        let mut stats = self.stats.write();
        stats.polls += 1;
        stats.bytes_received += response.body.len() as u64;
        match &result {
            Ok(outcome) => {
                match outcome {
                    PollOutcome::Full => stats.full_responses += 1,
                    PollOutcome::Patched { .. } => stats.patches_applied += 1,
                    PollOutcome::Unchanged => stats.unchanged += 1,
                }
                stats.last_poll_time = Some(Instant::now());
                stats.last_error = None;
            }
            Err(e) => stats.last_error = Some(e.to_string()),
        }
        result
    }

    fn interpret(&self, state: &ReplicaState, response: &HttpResponse) -> ClientResult<PollOutcome> {
        match response.status {
            304 => Ok(PollOutcome::Unchanged),
            200 | 226 => {
                let content_type = response.header(CONTENT_TYPE).unwrap_or_default();
                let im_patch = response.status == 226
                    && response.header(IM).is_some_and(|im| accepts_json_patch([im]));

                if im_patch || is_json_patch_media_type(content_type) {
                    self.apply_patch(state, response)
                } else if content_type.is_empty() || is_json_media_type(content_type) {
                    let document: Document = serde_json::from_slice(&response.body)?;
                    self.commit(document, response);
                    Ok(PollOutcome::Full)
                } else {
                    Err(ClientError::UnexpectedContentType(content_type.to_string()))
                }
            }
            status @ 500..=599 => Err(ClientError::ServerStatus(status)),
            status => Err(ClientError::UnexpectedStatus(status)),
        }
    }

    fn apply_patch(&self, state: &ReplicaState, response: &HttpResponse) -> ClientResult<PollOutcome> {
        let patch = Patch::from_json(&response.body)?;
        if let Some(base) = response.header(DELTA_BASE) {
            debug!(base, ops = patch.len(), "patch received");
        }
        if patch.is_empty() {
            self.commit(state.document, response);
            return Ok(PollOutcome::Unchanged);
        }

        match apply(&state.document, &patch) {
            Ok(document) => {
                self.commit(document, response);
                Ok(PollOutcome::Patched { ops: patch.len() })
            }
            Err(e) => {
                warn!(error = %e, "patch rejected, discarding local baseline");
                self.replica.reset();
                Err(e.into())
            }
        }
    }

    fn commit(&self, document: Document, response: &HttpResponse) {
        let tag = response
            .header(ETAG)
            .map(|value| unquote(value).unwrap_or(value).to_string());
        let modified = match self.config.since_style {
            SinceStyle::Date => Some(
                response
                    .header(DATE)
                    .and_then(parse_http_date)
                    .unwrap_or_else(|| VersionStamp::now().truncate_to_secs()),
            ),
            SinceStyle::Tag => tag.as_deref().and_then(decode_tag),
        };
        self.replica.set(document, tag, modified);
    }

    /// Polls once, retrying transient failures per the retry configuration.
    pub fn poll_with_retry(&self) -> ClientResult<PollOutcome> {
        let retry = &self.config.retry;
        let mut attempt = 0;
        loop {
            if attempt > 0 {
                std::thread::sleep(retry.delay_for_attempt(attempt));
                self.stats.write().retries += 1;
            }
            self.check_cancelled()?;

            match self.poll_once() {
                Ok(outcome) => return Ok(outcome),
                Err(e) if e.is_retryable() && attempt + 1 < retry.max_attempts => {
                    warn!(error = %e, attempt, "poll failed, retrying");
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Polls every `poll_interval` until cancelled, a poll fails after its
    /// retries, or `max_polls` polls have completed.
    ///
    /// Returns the final stats. Cancellation is not an error.
    pub fn run(&self, max_polls: Option<u64>) -> ClientResult<PollStats> {
        info!(
            url = %self.config.server_url,
            flavor = %self.config.flavor,
            since_style = %self.config.since_style,
            interval_ms = self.config.poll_interval.as_millis() as u64,
            "polling started"
        );

        let mut completed = 0u64;
        while max_polls.map_or(true, |max| completed < max) {
            if completed > 0 {
                std::thread::sleep(self.config.poll_interval);
            }
            match self.poll_with_retry() {
                Ok(outcome) => {
                    let state = self.replica.get();
                    info!(
                        ?outcome,
                        etag = state.tag.as_deref().unwrap_or(""),
                        document = %serde_json::to_string(&state.document).unwrap_or_default(),
                        "poll complete"
                    );
                }
                Err(ClientError::Cancelled) => break,
                Err(e) => {
                    error!(error = %e, "polling stopped");
                    return Err(e);
                }
            }
            completed += 1;
        }

        info!(polls = completed, "polling finished");
        Ok(self.stats())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RetryConfig;
    use deltasync_protocol::{diff, LeafPath};
    use parking_lot::Mutex;
    use std::collections::VecDeque;

    /// Replays canned responses and records request headers.
    #[derive(Default)]
    struct ScriptedClient {
        responses: Mutex<VecDeque<Result<HttpResponse, String>>>,
        requests: Mutex<Vec<Vec<(String, String)>>>,
    }

    impl ScriptedClient {
        fn push(&self, response: Result<HttpResponse, String>) {
            self.responses.lock().push_back(response);
        }

        fn request(&self, i: usize) -> Vec<(String, String)> {
            self.requests.lock()[i].clone()
        }
    }

    impl HttpClient for ScriptedClient {
        fn get(&self, _url: &str, headers: &[(&str, String)]) -> Result<HttpResponse, String> {
            self.requests
                .lock()
                .push(headers.iter().map(|(n, v)| (n.to_string(), v.clone())).collect());
            self.responses
                .lock()
                .pop_front()
                .unwrap_or_else(|| Err("no response scripted".into()))
        }
    }

    fn doc(leaf: i64) -> Document {
        let mut doc = Document::new();
        doc.set(LeafPath::ALL[5], leaf);
        doc
    }

    fn full(tag: &str, document: &Document) -> HttpResponse {
        HttpResponse::new(200)
            .with_header("ETag", format!("\"{}\"", tag))
            .with_header("Content-Type", "application/json")
            .with_body(serde_json::to_vec(document).unwrap())
    }

    fn im_used(tag: &str, base: &str, patch: &Patch) -> HttpResponse {
        HttpResponse::new(226)
            .with_header("ETag", format!("\"{}\"", tag))
            .with_header("IM", "jsonpatch")
            .with_header("Delta-Base", format!("\"{}\"", base))
            .with_header("Content-Type", "application/json-patch+json")
            .with_body(patch.to_json().unwrap())
    }

    fn poller(config: ClientConfig) -> Poller<ScriptedClient> {
        Poller::new(config.with_retry(RetryConfig::no_retry()), ScriptedClient::default())
    }

    #[test]
    fn first_poll_is_full_then_patch() {
        let poller = poller(ClientConfig::default());
        poller.client().push(Ok(full("100", &doc(1))));
        poller.client().push(Ok(im_used("200", "100", &diff(&doc(1), &doc(2)))));

        assert_eq!(poller.poll_once().unwrap(), PollOutcome::Full);
        assert!(poller.client().request(0).is_empty());
        assert_eq!(poller.replica().tag().as_deref(), Some("100"));

        assert_eq!(poller.poll_once().unwrap(), PollOutcome::Patched { ops: 1 });
        assert_eq!(
            poller.client().request(1),
            vec![
                ("a-im".to_string(), "jsonpatch".to_string()),
                ("if-none-match".to_string(), "\"100\"".to_string()),
            ]
        );
        assert_eq!(poller.replica().document(), doc(2));
        assert_eq!(poller.replica().tag().as_deref(), Some("200"));

        let stats = poller.stats();
        assert_eq!(stats.polls, 2);
        assert_eq!(stats.full_responses, 1);
        assert_eq!(stats.patches_applied, 1);
    }

    #[test]
    fn not_modified_keeps_replica() {
        let poller = poller(ClientConfig::default());
        poller.client().push(Ok(full("100", &doc(1))));
        poller.client().push(Ok(HttpResponse::new(304).with_header("ETag", "\"100\"")));

        poller.poll_once().unwrap();
        assert_eq!(poller.poll_once().unwrap(), PollOutcome::Unchanged);
        assert_eq!(poller.replica().document(), doc(1));
        assert_eq!(poller.stats().unchanged, 1);
    }

    #[test]
    fn since_tag_style_headers() {
        let poller = poller(ClientConfig::default().with_flavor(ProtocolFlavor::ModifiedSince));
        poller.client().push(Ok(full("100", &doc(1))));
        poller.client().push(Ok(HttpResponse::new(200)
            .with_header("ETag", "\"100\"")
            .with_header("Content-Type", "application/json-patch+json")
            .with_body("[]")));

        poller.poll_once().unwrap();
        assert_eq!(poller.poll_once().unwrap(), PollOutcome::Unchanged);
        assert_eq!(
            poller.client().request(1),
            vec![("get-modified-since".to_string(), "\"100\"".to_string())]
        );
    }

    #[test]
    fn since_date_style_uses_response_date() {
        let config = ClientConfig::default()
            .with_flavor(ProtocolFlavor::ModifiedSince)
            .with_since_style(SinceStyle::Date);
        let poller = poller(config);
        poller
            .client()
            .push(Ok(full("100", &doc(1)).with_header("Date", "Sun, 06 Nov 1994 08:49:37 GMT")));
        poller.client().push(Ok(HttpResponse::new(200)
            .with_header("Content-Type", "application/json-patch+json")
            .with_body("[]")));

        poller.poll_once().unwrap();
        assert_eq!(
            poller.replica().get().modified,
            Some(VersionStamp::from_nanos(784_111_777_000_000_000))
        );
        poller.poll_once().unwrap();
        assert_eq!(
            poller.client().request(1),
            vec![(
                "get-modified-since".to_string(),
                "Sun, 06 Nov 1994 08:49:37 GMT".to_string()
            )]
        );
    }

    #[test]
    fn bad_patch_resets_baseline() {
        let poller = poller(ClientConfig::default());
        poller.client().push(Ok(full("100", &doc(1))));
        poller.client().push(Ok(HttpResponse::new(226)
            .with_header("IM", "jsonpatch")
            .with_header("Content-Type", "application/json-patch+json")
            .with_body(r#"[{"op":"replace","path":"/foo-a/bar-x/baz-a","value":1}]"#)));

        poller.poll_once().unwrap();
        let err = poller.poll_once().unwrap_err();
        assert!(matches!(err, ClientError::Patch(_)));
        assert!(!poller.replica().get().has_baseline());
        assert_eq!(poller.replica().document(), doc(1));
        assert!(poller.stats().last_error.is_some());
    }

    #[test]
    fn status_classification() {
        let poller = poller(ClientConfig::default());
        poller.client().push(Ok(HttpResponse::new(503)));
        poller.client().push(Ok(HttpResponse::new(404)));
        poller.client().push(Ok(HttpResponse::new(200)
            .with_header("Content-Type", "text/html")
            .with_body("<html>")));

        assert!(matches!(poller.poll_once(), Err(ClientError::ServerStatus(503))));
        assert!(matches!(poller.poll_once(), Err(ClientError::UnexpectedStatus(404))));
        assert!(matches!(
            poller.poll_once(),
            Err(ClientError::UnexpectedContentType(_))
        ));
    }

    #[test]
    fn retry_recovers_from_transport_error() {
        let config = ClientConfig::default().with_retry(
            RetryConfig::new(3)
                .with_initial_delay(std::time::Duration::from_millis(1))
                .with_jitter(false),
        );
        let poller = Poller::new(config, ScriptedClient::default());
        poller.client().push(Err("connection refused".into()));
        poller.client().push(Ok(full("100", &doc(1))));

        assert_eq!(poller.poll_with_retry().unwrap(), PollOutcome::Full);
        assert_eq!(poller.stats().retries, 1);
    }

    #[test]
    fn retry_gives_up() {
        let config = ClientConfig::default().with_retry(
            RetryConfig::new(2)
                .with_initial_delay(std::time::Duration::from_millis(1))
                .with_jitter(false),
        );
        let poller = Poller::new(config, ScriptedClient::default());

        let err = poller.poll_with_retry().unwrap_err();
        assert!(matches!(err, ClientError::Transport { retryable: true, .. }));
        assert_eq!(poller.stats().retries, 1);
    }

    #[test]
    fn run_stops_after_max_polls() {
        let config = ClientConfig::default().with_poll_interval(std::time::Duration::from_millis(1));
        let poller = poller(config);
        poller.client().push(Ok(full("100", &doc(1))));
        poller.client().push(Ok(HttpResponse::new(304)));
        poller.client().push(Ok(HttpResponse::new(304)));

        let stats = poller.run(Some(3)).unwrap();
        assert_eq!(stats.polls, 3);
        assert_eq!(stats.unchanged, 2);
    }

    #[test]
    fn cancelled_run_returns_stats() {
        let poller = poller(ClientConfig::default());
        poller.cancel();
        let stats = poller.run(None).unwrap();
        assert_eq!(stats.polls, 0);
    }
}

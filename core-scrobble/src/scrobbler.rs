//! # Audioscrobbler
//!
//! Session controller for the Realtime Submissions Protocol, for a single user.
//!
//! ## Overview
//!
//! The scrobbler handshakes lazily: the first [`Audioscrobbler::now_playing`]
//! or [`Audioscrobbler::submit`] that needs a session starts one, and the
//! handshake completion then sends whatever was waiting. Plays are always
//! cached first and only leave the cache once the server acknowledges them.
//!
//! ## Failure handling
//!
//! - **Soft errors** (`BADSESSION`, `BANNED`, `BADAUTH`, `BADTIME`) drop the
//!   session and suspend all network traffic until [`rehandshake`] is called.
//!   They do not count as hard failures. Requests still in flight on the
//!   dropped session are cancelled and their replies never applied.
//! - **Hard failures** (`FAILED`, unknown replies, HTTP and connection errors
//!   on handshake or submission) are counted. The entries stay cached and the
//!   next caller action tries again. Reaching the configured limit (3 by
//!   default) reports `ThreeHardFailures` once and suspends like a soft error.
//! - Now-playing problems other than `BADSESSION` are only logged.
//!
//! [`rehandshake`]: Audioscrobbler::rehandshake

use crate::auth::HandshakeAuth;
use crate::cache::ScrobbleCache;
use crate::error::{Result, ScrobbleError};
use crate::observer::ScrobbleObserver;
use crate::protocol::{self, HandshakeReply, Session, SubmitReply};
use crate::scrobble::Scrobble;
use crate::status::ScrobbleStatus;
use bridge_traits::{Clock, HttpClient, HttpRequest, SystemClock};
use core_runtime::config::{CoreConfig, ScrobblerConfig};
use core_runtime::logging::redact_if_sensitive;
use core_ws::{Dispatcher, Track};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum ScrobbleRequest {
    Handshake,
    NowPlaying,
    Submission,
}

/// Audioscrobbler session controller.
pub struct Audioscrobbler {
    http: Arc<dyn HttpClient>,
    auth: Arc<dyn HandshakeAuth>,
    clock: Arc<dyn Clock>,
    config: ScrobblerConfig,
    cache: Box<dyn ScrobbleCache>,
    observer: Arc<dyn ScrobbleObserver>,
    session: Option<Session>,
    status: Option<ScrobbleStatus>,
    hard_failures: u32,
    /// Set by soft errors and by reaching the hard-failure limit.
    suspended: bool,
    deferred_now_playing: Option<Track>,
    in_flight_batch: usize,
    dispatcher: Dispatcher<ScrobbleRequest, Result<String>>,
}

impl Audioscrobbler {
    pub fn new(
        http: Arc<dyn HttpClient>,
        auth: Arc<dyn HandshakeAuth>,
        config: ScrobblerConfig,
        cache: Box<dyn ScrobbleCache>,
        observer: Arc<dyn ScrobbleObserver>,
    ) -> Self {
        Self {
            http,
            auth,
            clock: Arc::new(SystemClock),
            config,
            cache,
            observer,
            session: None,
            status: None,
            hard_failures: 0,
            suspended: false,
            deferred_now_playing: None,
            in_flight_batch: 0,
            dispatcher: Dispatcher::new(|_| Err(ScrobbleError::Aborted)),
        }
    }

    /// Scrobbler sharing the runtime's HTTP client, clock and settings.
    pub fn from_core_config(
        config: &CoreConfig,
        auth: Arc<dyn HandshakeAuth>,
        cache: Box<dyn ScrobbleCache>,
        observer: Arc<dyn ScrobbleObserver>,
    ) -> Self {
        Self::new(
            Arc::clone(&config.http_client),
            auth,
            config.scrobbler.clone(),
            cache,
            observer,
        )
        .with_clock(Arc::clone(&config.clock))
    }

    /// Time source for handshake timestamps.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Tells the server what the user is listening to now.
    ///
    /// Without a session this starts the handshake and sends the notification
    /// once it succeeds. Only the latest track is kept while waiting.
    #[instrument(skip(self, track), fields(track = %track))]
    pub fn now_playing(&mut self, track: Track) {
        if self.suspended {
            debug!("Scrobbling suspended, dropping now-playing");
            return;
        }

        if self.session.is_some() {
            self.send_now_playing(track);
        } else {
            self.deferred_now_playing = Some(track);
            self.handshake();
        }
    }

    /// Queues a finished play. Nothing is sent until [`submit`](Self::submit).
    pub fn cache(&mut self, scrobble: Scrobble) {
        self.cache_all(vec![scrobble]);
    }

    pub fn cache_all(&mut self, scrobbles: Vec<Scrobble>) {
        if scrobbles.is_empty() {
            return;
        }
        debug!(count = scrobbles.len(), "Caching scrobbles");
        self.cache.append(scrobbles);
    }

    /// Submits everything cached, in batches.
    #[instrument(skip(self), fields(pending = self.cache.pending().len()))]
    pub fn submit(&mut self) {
        if self.suspended {
            debug!("Scrobbling suspended, keeping entries cached");
            return;
        }
        if self.cache.pending().is_empty() {
            return;
        }
        if self.session.is_none() {
            self.handshake();
            return;
        }
        if self.dispatcher.is_pending(ScrobbleRequest::Submission) {
            // The completion sends the next batch.
            return;
        }
        self.send_batch();
    }

    /// Starts a new handshake unless a session is still held.
    ///
    /// This is how a host recovers from soft errors and `ThreeHardFailures`.
    #[instrument(skip(self))]
    pub fn rehandshake(&mut self) {
        if self.session.is_some() {
            debug!("Session still valid, not rehandshaking");
            return;
        }
        if self.hard_failures >= self.config.hard_failure_limit {
            // Each run of hard failures after a recovery reports again.
            self.hard_failures = 0;
        }
        self.suspended = false;
        self.handshake();
    }

    /// Applies the next request completion.
    ///
    /// Returns `false` without waiting when no request is in flight.
    pub async fn next_completion(&mut self) -> bool {
        let Some((request, result)) = self.dispatcher.next().await else {
            return false;
        };

        match request {
            ScrobbleRequest::Handshake => self.on_handshake_return(result),
            ScrobbleRequest::NowPlaying => self.on_now_playing_return(result),
            ScrobbleRequest::Submission => self.on_submission_return(result),
        }
        true
    }

    /// Applies completions until nothing is in flight.
    pub async fn run_until_idle(&mut self) {
        while self.next_completion().await {}
    }

    /// Last status reported, if any.
    pub fn status(&self) -> Option<ScrobbleStatus> {
        self.status
    }

    pub fn hard_failures(&self) -> u32 {
        self.hard_failures
    }

    pub fn is_handshaken(&self) -> bool {
        self.session.is_some()
    }

    /// Whether network traffic is stopped until [`rehandshake`](Self::rehandshake).
    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    /// Number of cached entries not yet acknowledged.
    pub fn pending(&self) -> usize {
        self.cache.pending().len()
    }

    fn handshake(&mut self) {
        if self.dispatcher.is_pending(ScrobbleRequest::Handshake) {
            return;
        }

        let timestamp = self.clock.unix_timestamp();
        let request =
            protocol::handshake_request(&self.config, timestamp, self.auth.params(timestamp));

        info!(user = %self.config.username, "Handshaking");
        self.emit(ScrobbleStatus::Connecting);
        self.issue(ScrobbleRequest::Handshake, request);
    }

    fn send_now_playing(&mut self, track: Track) {
        let Some(session) = &self.session else {
            return;
        };
        if self.dispatcher.is_pending(ScrobbleRequest::NowPlaying) {
            self.deferred_now_playing = Some(track);
            return;
        }

        debug!(track = %track, "Sending now-playing");
        let request = protocol::now_playing_request(session, &track);
        self.issue(ScrobbleRequest::NowPlaying, request);
    }

    fn send_batch(&mut self) {
        let Some(session) = &self.session else {
            return;
        };

        let pending = self.cache.pending();
        let count = pending.len().min(self.config.batch_size);
        let request = protocol::submission_request(session, &pending[..count]);

        debug!(count, remaining = pending.len() - count, "Submitting batch");
        self.in_flight_batch = count;
        self.emit(ScrobbleStatus::Scrobbling);
        self.issue(ScrobbleRequest::Submission, request);
    }

    fn issue(
        &mut self,
        kind: ScrobbleRequest,
        request: bridge_traits::error::Result<HttpRequest>,
    ) {
        let http = Arc::clone(&self.http);
        self.dispatcher.dispatch(kind, async move {
            let response = http.execute(request?).await?;
            if !response.is_success() {
                return Err(ScrobbleError::HttpStatus(response.status));
            }
            Ok(response.text()?)
        });
    }

    fn on_handshake_return(&mut self, result: Result<String>) {
        let body = match result {
            Ok(body) => body,
            Err(e) => {
                warn!(error = %e, "Handshake request failed");
                self.hard_failure();
                return;
            }
        };

        match HandshakeReply::parse(&body) {
            HandshakeReply::Ok(session) => {
                info!(
                    session_id = %redact_if_sensitive("session_id", &session.id),
                    submission_url = %session.submission_url,
                    "Handshake succeeded"
                );
                self.session = Some(session);
                self.hard_failures = 0;
                self.emit(ScrobbleStatus::Handshaken);

                if let Some(track) = self.deferred_now_playing.take() {
                    self.send_now_playing(track);
                }
                self.submit();
            }
            HandshakeReply::Banned => self.soft_error(ScrobbleStatus::BannedClientVersion),
            HandshakeReply::BadAuth => self.soft_error(ScrobbleStatus::InvalidSessionKey),
            HandshakeReply::BadTime => self.soft_error(ScrobbleStatus::BadTime),
            HandshakeReply::Failed(reason) => {
                warn!(reason = %reason, "Handshake failed");
                self.hard_failure();
            }
        }
    }

    fn on_now_playing_return(&mut self, result: Result<String>) {
        match result.map(|body| SubmitReply::parse(&body)) {
            Ok(SubmitReply::Ok) => debug!("Now-playing accepted"),
            Ok(SubmitReply::BadSession) => {
                self.soft_error(ScrobbleStatus::BadSession);
                return;
            }
            Ok(SubmitReply::Failed(reason)) => warn!(reason = %reason, "Now-playing rejected"),
            Err(e) => warn!(error = %e, "Now-playing request failed"),
        }

        if let Some(track) = self.deferred_now_playing.take() {
            self.send_now_playing(track);
        }
    }

    fn on_submission_return(&mut self, result: Result<String>) {
        let count = std::mem::take(&mut self.in_flight_batch);

        match result.map(|body| SubmitReply::parse(&body)) {
            Ok(SubmitReply::Ok) => {
                self.cache.remove(count);
                self.hard_failures = 0;
                info!(count, remaining = self.cache.pending().len(), "Batch scrobbled");

                if self.cache.pending().is_empty() {
                    self.emit(ScrobbleStatus::TracksScrobbled);
                } else {
                    self.send_batch();
                }
            }
            Ok(SubmitReply::BadSession) => self.soft_error(ScrobbleStatus::BadSession),
            Ok(SubmitReply::Failed(reason)) => {
                warn!(reason = %reason, "Submission failed");
                self.hard_failure();
            }
            Err(e) => {
                warn!(error = %e, "Submission request failed");
                self.hard_failure();
            }
        }
    }

    fn soft_error(&mut self, status: ScrobbleStatus) {
        error!(status = %status, "Scrobbling suspended until rehandshake");
        self.suspend();
        self.emit(status);
    }

    /// Drops the session along with everything still in flight on it.
    fn suspend(&mut self) {
        self.session = None;
        self.suspended = true;
        self.deferred_now_playing = None;
        self.dispatcher.cancel_all();
        self.in_flight_batch = 0;
    }

    fn hard_failure(&mut self) {
        self.hard_failures = self.hard_failures.saturating_add(1);
        warn!(
            hard_failures = self.hard_failures,
            limit = self.config.hard_failure_limit,
            pending = self.cache.pending().len(),
            "Hard failure"
        );

        if self.hard_failures == self.config.hard_failure_limit {
            self.suspend();
            error!("Too many hard failures, scrobbling suspended until rehandshake");
            self.emit(ScrobbleStatus::ThreeHardFailures);
        }
    }

    fn emit(&mut self, status: ScrobbleStatus) {
        self.status = Some(status);
        self.observer.on_status_changed(status);
    }
}

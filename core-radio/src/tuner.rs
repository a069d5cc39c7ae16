//! # Radio Tuner
//!
//! Tunes a station and keeps a queue of playable tracks topped up.
//!
//! ## Session lifecycle
//!
//! ```text
//! Idle ──tune_station──> Tuning ──ok──> Tuned <──batch handled── FetchingBatch
//!                           │             └──queue drained/retry──────^
//!                           └──error──> Exhausted <──fatal batch error──┘
//! ```
//!
//! `radio.tune` is attempted once. Playlist fetches absorb transient failures
//! (`TryAgainLater`, empty playlists and unreadable documents) up to the retry
//! ceiling; any other service error ends the session. Once `Exhausted`, tracks
//! already queued can still be taken but nothing more is fetched.
//!
//! ## Driving the tuner
//!
//! Requests run in the background. Their results are applied only inside
//! [`RadioTuner::next_completion`], which the owning task awaits:
//!
//! ```ignore
//! let mut tuner = RadioTuner::new(transport, RadioConfig::default(), observer);
//! tuner.tune_station(RadioStation::global_tag("jazz"))?;
//! while tuner.next_completion().await {
//!     if let Some(track) = tuner.take_next_track() {
//!         play(track);
//!     }
//! }
//! ```

use crate::error::{RadioError, Result};
use crate::observer::RadioObserver;
use crate::station::RadioStation;
use crate::xspf::parse_playlist;
use core_runtime::config::RadioConfig;
use core_runtime::retry::BoundedRetry;
use core_ws::{Dispatcher, Track, WsError, WsReply, WsRequest, WsTransport};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Where a radio session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RadioState {
    Idle,
    Tuning,
    Tuned,
    FetchingBatch,
    /// Terminal: a fatal error was reported.
    Exhausted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum RadioCall {
    Tune,
    Playlist,
}

/// Radio session controller.
pub struct RadioTuner {
    transport: Arc<dyn WsTransport>,
    observer: Arc<dyn RadioObserver>,
    config: RadioConfig,
    station: Option<RadioStation>,
    state: RadioState,
    queue: VecDeque<Track>,
    retry: BoundedRetry,
    dispatcher: Dispatcher<RadioCall, WsReply>,
}

impl RadioTuner {
    pub fn new(
        transport: Arc<dyn WsTransport>,
        config: RadioConfig,
        observer: Arc<dyn RadioObserver>,
    ) -> Self {
        Self {
            transport,
            observer,
            retry: BoundedRetry::new(config.max_retries),
            config,
            station: None,
            state: RadioState::Idle,
            queue: VecDeque::new(),
            // A request that panicked reads as a dead transport.
            dispatcher: Dispatcher::new(|_| WsReply::failed(WsError::TransportFailure)),
        }
    }

    /// Starts the session by sending `radio.tune`.
    ///
    /// Requests run on the tokio runtime the tuner was created in, or on the
    /// caller's when it was created outside one. A tuner serves a single
    /// station; tuning again returns [`RadioError::AlreadyTuned`].
    #[instrument(skip(self, station), fields(station = %station.url()))]
    pub fn tune_station(&mut self, station: RadioStation) -> Result<()> {
        if self.state != RadioState::Idle {
            return Err(RadioError::AlreadyTuned(self.state));
        }

        info!("Tuning radio station");
        let request = WsRequest::post("radio.tune").param("station", station.url());
        self.station = Some(station);
        self.state = RadioState::Tuning;
        self.issue(RadioCall::Tune, request);
        Ok(())
    }

    /// Pops the next queued track, or `None` if no track is ready yet.
    ///
    /// Taking the last queued track starts fetching the next batch. This may
    /// be called from any thread; the fetch runs on the tuner's runtime.
    pub fn take_next_track(&mut self) -> Option<Track> {
        let track = self.queue.pop_front()?;
        if self.queue.is_empty() {
            debug!("Queue drained, prefetching next batch");
            self.fetch_next_batch();
        }
        Some(track)
    }

    /// Applies the next request completion.
    ///
    /// Returns `false` without waiting when no request is in flight.
    pub async fn next_completion(&mut self) -> bool {
        match self.dispatcher.next().await {
            Some((RadioCall::Tune, reply)) => {
                self.on_tune_reply(reply);
                true
            }
            Some((RadioCall::Playlist, reply)) => {
                self.on_playlist_reply(reply);
                true
            }
            None => false,
        }
    }

    /// Applies completions until nothing is in flight.
    pub async fn run_until_idle(&mut self) {
        while self.next_completion().await {}
    }

    pub fn state(&self) -> RadioState {
        self.state
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn station(&self) -> Option<&RadioStation> {
        self.station.as_ref()
    }

    fn issue(&mut self, call: RadioCall, request: WsRequest) -> bool {
        let transport = Arc::clone(&self.transport);
        self.dispatcher
            .dispatch(call, async move { transport.issue(request).await })
    }

    fn fetch_next_batch(&mut self) {
        if self.state == RadioState::Exhausted || self.dispatcher.is_pending(RadioCall::Playlist) {
            return;
        }

        let request = WsRequest::get("radio.getPlaylist")
            .flag("rtp", self.config.rtp)
            .flag("discovery", self.config.discovery);

        if self.issue(RadioCall::Playlist, request) {
            self.state = RadioState::FetchingBatch;
        }
    }

    fn on_tune_reply(&mut self, reply: WsReply) {
        if reply.error().is_error() {
            self.fail(reply.error());
            return;
        }

        self.state = RadioState::Tuned;

        match reply.lfm().and_then(|lfm| lfm.field("station/name")) {
            Ok(title) => {
                info!(title = %title, "Station tuned");
                if let Some(station) = self.station.as_mut() {
                    station.set_title(title.clone());
                }
                self.observer.on_title_resolved(&title);
            }
            Err(_) => debug!("Station tuned without a name"),
        }

        self.fetch_next_batch();
    }

    fn on_playlist_reply(&mut self, reply: WsReply) {
        self.state = RadioState::Tuned;

        match reply.error() {
            WsError::NoError => {}
            // An unreadable body surfaces from the transport as MalformedResponse.
            e if e.is_transient() || e == WsError::MalformedResponse => {
                self.retry_or_fail(WsError::TryAgainLater);
                return;
            }
            other => {
                self.fail(other);
                return;
            }
        }

        let tracks = reply
            .lfm()
            .and_then(|lfm| lfm.child("playlist"))
            .and_then(parse_playlist);

        match tracks {
            Ok(tracks) if tracks.is_empty() => {
                warn!("Service returned an empty playlist");
                self.retry_or_fail(WsError::MalformedResponse);
            }
            Ok(tracks) => {
                self.retry.reset();
                self.queue.extend(tracks);
                debug!(queued = self.queue.len(), "Playlist batch queued");
                self.observer.on_tracks_available(self.queue.len());
            }
            Err(e) => {
                warn!(error = %e, "Unreadable playlist");
                self.retry_or_fail(WsError::TryAgainLater);
            }
        }
    }

    fn retry_or_fail(&mut self, give_up_with: WsError) {
        if self.retry.should_retry() {
            debug!(
                attempt = self.retry.attempts(),
                max = self.retry.max_retries(),
                "Retrying playlist fetch"
            );
            self.fetch_next_batch();
        } else {
            self.fail(give_up_with);
        }
    }

    fn fail(&mut self, error: WsError) {
        error!(code = error.code(), error = %error, "Radio session failed");
        self.state = RadioState::Exhausted;
        self.dispatcher.cancel_all();
        self.observer.on_fatal_error(error);
    }
}

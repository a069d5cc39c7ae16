//! # Request Dispatcher
//!
//! Runs controller requests on the tokio runtime and hands their results back
//! to the controller, one at a time, on the controller's own task.
//!
//! ## Overview
//!
//! A controller owns one `Dispatcher`. It calls [`Dispatcher::dispatch`] with a
//! request kind and the future performing the request, then awaits
//! [`Dispatcher::next`] to receive `(kind, output)` completions. At most one
//! request of each kind is in flight; a second dispatch of a pending kind is
//! refused. Dropping the dispatcher (or calling [`Dispatcher::cancel_all`])
//! cancels every in-flight request and discards its output.
//!
//! Every dispatched request produces exactly one completion. A request future
//! that panics completes with the fallback output given to
//! [`Dispatcher::new`], so owners never wait on a request that died.
//!
//! The runtime current at construction is remembered, so requests can be
//! dispatched later from threads outside it.
//!
//! ```rust
//! use core_ws::Dispatcher;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let mut dispatcher: Dispatcher<&'static str, u32> = Dispatcher::new(|_| 0);
//! assert!(dispatcher.dispatch("answer", async { 42 }));
//! assert!(!dispatcher.dispatch("answer", async { 43 }));
//!
//! assert_eq!(dispatcher.next().await, Some(("answer", 42)));
//! assert_eq!(dispatcher.next().await, None);
//! # }
//! ```

use futures::FutureExt;
use std::collections::HashSet;
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use std::panic::AssertUnwindSafe;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, trace, warn, Instrument};
use uuid::Uuid;

struct Completion<K, T> {
    generation: u64,
    kind: K,
    output: T,
}

/// Per-kind single-flight request runner with cancellation.
pub struct Dispatcher<K, T> {
    sender: mpsc::UnboundedSender<Completion<K, T>>,
    receiver: mpsc::UnboundedReceiver<Completion<K, T>>,
    pending: HashSet<K>,
    cancel: CancellationToken,
    generation: u64,
    runtime: Option<Handle>,
    fallback: fn(K) -> T,
}

impl<K, T> Dispatcher<K, T>
where
    K: Copy + Eq + Hash + Debug + Send + 'static,
    T: Send + 'static,
{
    /// `fallback` builds the completion delivered for a request whose future
    /// panicked.
    pub fn new(fallback: fn(K) -> T) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            sender,
            receiver,
            pending: HashSet::new(),
            cancel: CancellationToken::new(),
            generation: 0,
            runtime: Handle::try_current().ok(),
            fallback,
        }
    }

    /// Spawns `request` unless one of the same kind is still pending.
    ///
    /// Requests run on the runtime that was current when the dispatcher was
    /// created, or on the caller's runtime otherwise. With neither, nothing
    /// is spawned. Returns whether the request was spawned.
    pub fn dispatch<F>(&mut self, kind: K, request: F) -> bool
    where
        F: Future<Output = T> + Send + 'static,
    {
        if self.pending.contains(&kind) {
            debug!(?kind, "Request already in flight, not dispatching another");
            return false;
        }
        let Some(runtime) = self.runtime.clone().or_else(|| Handle::try_current().ok()) else {
            error!(?kind, "No tokio runtime available, request not dispatched");
            return false;
        };
        self.pending.insert(kind);

        let request_id = Uuid::new_v4();
        let sender = self.sender.clone();
        let token = self.cancel.clone();
        let generation = self.generation;
        let fallback = self.fallback;
        let span = tracing::debug_span!("ws_request", ?kind, %request_id);

        runtime.spawn(
            async move {
                tokio::select! {
                    _ = token.cancelled() => {
                        trace!("Request cancelled before completion");
                    }
                    outcome = AssertUnwindSafe(request).catch_unwind() => {
                        let output = outcome.unwrap_or_else(|_| {
                            warn!("Request panicked, completing with fallback");
                            fallback(kind)
                        });
                        // The receiver lives as long as the dispatcher.
                        let _ = sender.send(Completion { generation, kind, output });
                    }
                }
            }
            .instrument(span),
        );

        true
    }

    pub fn is_pending(&self, kind: K) -> bool {
        self.pending.contains(&kind)
    }

    /// Waits for the next completion.
    ///
    /// Returns `None` immediately when nothing is in flight.
    pub async fn next(&mut self) -> Option<(K, T)> {
        while !self.pending.is_empty() {
            let completion = self.receiver.recv().await?;
            if completion.generation != self.generation {
                continue;
            }
            self.pending.remove(&completion.kind);
            return Some((completion.kind, completion.output));
        }
        None
    }

    /// Cancels everything in flight. Outputs of cancelled requests are never
    /// delivered, even if they raced the cancellation.
    pub fn cancel_all(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        debug!(in_flight = self.pending.len(), "Cancelling in-flight requests");
        self.cancel.cancel();
        self.cancel = CancellationToken::new();
        self.generation = self.generation.wrapping_add(1);
        self.pending.clear();
    }
}

impl<K, T> Drop for Dispatcher<K, T> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

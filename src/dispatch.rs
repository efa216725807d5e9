//! Event dispatch by kind.
//!
//! A [`Dispatcher`] maps each [`EventKind`] to at most one handler and
//! invokes it synchronously, one event at a time, in arrival order. The
//! handler receives a mutable context (the bot controller) alongside the
//! event. A kind with no handler is dropped; a handler error is logged
//! and the next event is dispatched as usual.

use std::collections::HashMap;

use futures_util::{Stream, StreamExt};
use tracing::{trace, warn};

use crate::error::HandlerError;
use crate::event::{Event, EventKind};

/// Boxed event handler over context `C`.
pub type Handler<C> = Box<dyn FnMut(&mut C, &Event) -> Result<(), HandlerError>>;

/// Outcome of dispatching one event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dispatched {
    /// A handler ran and succeeded.
    Handled,
    /// No handler is registered for the kind.
    Unhandled,
    /// The handler returned an error (already logged).
    Failed,
}

/// Counters accumulated by [`Dispatcher::run`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DispatchStats {
    /// Events a handler processed successfully.
    pub handled: usize,
    /// Events dropped for lack of a handler.
    pub unhandled: usize,
    /// Events whose handler failed.
    pub failed: usize,
}

impl DispatchStats {
    /// Record one outcome.
    pub fn record(&mut self, outcome: Dispatched) {
        match outcome {
            Dispatched::Handled => self.handled += 1,
            Dispatched::Unhandled => self.unhandled += 1,
            Dispatched::Failed => self.failed += 1,
        }
    }

    /// Total events seen.
    pub fn total(&self) -> usize {
        self.handled + self.unhandled + self.failed
    }
}

/// Kind → handler table.
pub struct Dispatcher<C> {
    handlers: HashMap<EventKind, Handler<C>>,
}

impl<C> Default for Dispatcher<C> {
    fn default() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }
}

impl<C> Dispatcher<C> {
    /// An empty dispatcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `kind`, replacing any previous one.
    ///
    /// Returns `true` if a handler was replaced.
    pub fn register<F>(&mut self, kind: EventKind, handler: F) -> bool
    where
        F: FnMut(&mut C, &Event) -> Result<(), HandlerError> + 'static,
    {
        self.handlers.insert(kind, Box::new(handler)).is_some()
    }

    /// Whether a handler exists for `kind`.
    pub fn handles(&self, kind: EventKind) -> bool {
        self.handlers.contains_key(&kind)
    }

    /// Run the handler for `event.kind`, if any.
    pub fn dispatch(&mut self, ctx: &mut C, event: &Event) -> Dispatched {
        let Some(handler) = self.handlers.get_mut(&event.kind) else {
            trace!(kind = %event.kind, "no handler registered");
            return Dispatched::Unhandled;
        };

        match (*handler)(ctx, event) {
            Ok(()) => Dispatched::Handled,
            Err(e) => {
                warn!(
                    kind = %event.kind,
                    source = %event.source,
                    target = %event.target,
                    error = %e,
                    "event handler failed"
                );
                Dispatched::Failed
            }
        }
    }

    /// Dispatch every event of `events` in order until the stream ends.
    pub async fn run<S>(&mut self, ctx: &mut C, events: S) -> DispatchStats
    where
        S: Stream<Item = Event>,
    {
        let mut stats = DispatchStats::default();
        futures_util::pin_mut!(events);
        while let Some(event) = events.next().await {
            stats.record(self.dispatch(ctx, &event));
        }
        stats
    }
}

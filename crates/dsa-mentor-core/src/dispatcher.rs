//! Debounced question dispatching
//!
//! [`QueryDispatcher`] owns the [`QueryState`] and is driven from a single
//! task. Timers and HTTP requests run as spawned tasks that report back over
//! a channel; the owner feeds those reports to [`QueryDispatcher::apply`], so
//! every state change happens in one place.
//!
//! Two counters keep late reports from doing damage:
//! - each scheduled submit gets a generation, and an expiry for anything but
//!   the currently scheduled generation is dropped;
//! - each request gets a sequence number, and only the completion of the
//!   latest request is applied.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::client::AnswerSource;
use crate::error::AskError;
use crate::state::{QueryState, ERROR_MESSAGE};

pub type DispatchReceiver = mpsc::UnboundedReceiver<DispatchEvent>;

#[derive(Debug)]
pub enum DispatchEvent {
    /// The quiet period after an input change ran out
    QuietPeriodElapsed { generation: u64, text: String },
    /// A request finished
    Completed {
        seq: u64,
        outcome: Result<String, AskError>,
    },
}

struct Scheduled {
    generation: u64,
    handle: JoinHandle<()>,
}

struct InFlight {
    seq: u64,
    handle: JoinHandle<()>,
}

pub struct QueryDispatcher<S> {
    source: S,
    state: QueryState,
    quiet_period: Duration,
    tx: mpsc::UnboundedSender<DispatchEvent>,
    scheduled: Option<Scheduled>,
    in_flight: Option<InFlight>,
    generation: u64,
    seq: u64,
}

impl<S: AnswerSource> QueryDispatcher<S> {
    pub fn new(source: S, quiet_period: Duration) -> (Self, DispatchReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        let dispatcher = Self {
            source,
            state: QueryState::default(),
            quiet_period,
            tx,
            scheduled: None,
            in_flight: None,
            generation: 0,
            seq: 0,
        };
        (dispatcher, rx)
    }

    pub fn state(&self) -> &QueryState {
        &self.state
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet_period
    }

    pub fn has_scheduled_submit(&self) -> bool {
        self.scheduled.is_some()
    }

    pub fn has_request_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Echo `text` into the query and (re)start the quiet period for it.
    ///
    /// Blank text only cancels whatever was scheduled.
    pub fn on_input_changed(&mut self, text: &str) {
        self.state.query = text.to_string();
        self.cancel_scheduled();

        if text.trim().is_empty() {
            return;
        }

        self.generation += 1;
        let generation = self.generation;
        let deadline = Instant::now() + self.quiet_period;
        let tx = self.tx.clone();
        let text = text.to_string();

        let handle = tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            let _ = tx.send(DispatchEvent::QuietPeriodElapsed { generation, text });
        });
        self.scheduled = Some(Scheduled { generation, handle });
    }

    /// Ask `text` right away, dropping any scheduled submit.
    pub fn on_submit_requested(&mut self, text: &str) {
        if text.trim().is_empty() {
            return;
        }

        self.cancel_scheduled();
        self.state.query = text.to_string();
        self.submit(text.to_string());
    }

    /// Reset the query, answer and interaction flag.
    ///
    /// Anything scheduled or in flight is abandoned, so a late answer cannot
    /// land on a cleared screen.
    pub fn on_clear_requested(&mut self) {
        self.cancel_scheduled();
        self.cancel_in_flight();
        self.state.clear();
    }

    pub fn apply(&mut self, event: DispatchEvent) {
        match event {
            DispatchEvent::QuietPeriodElapsed { generation, text } => {
                if !matches!(&self.scheduled, Some(s) if s.generation == generation) {
                    debug!(generation, "ignoring cancelled submit");
                    return;
                }
                self.scheduled = None;
                self.submit(text);
            }
            DispatchEvent::Completed { seq, outcome } => {
                if !matches!(&self.in_flight, Some(f) if f.seq == seq) {
                    debug!(seq, latest = self.seq, "discarding stale response");
                    return;
                }
                self.in_flight = None;
                self.state.loading = false;
                self.state.answer = match outcome {
                    Ok(answer) => {
                        info!(seq, bytes = answer.len(), "answer received");
                        answer
                    }
                    Err(e) => {
                        warn!(seq, timeout = e.is_timeout(), "question failed: {e}");
                        ERROR_MESSAGE.to_string()
                    }
                };
            }
        }
    }

    fn submit(&mut self, text: String) {
        self.cancel_in_flight();

        self.seq += 1;
        let seq = self.seq;
        self.state.loading = true;
        self.state.has_interacted = true;
        info!(seq, question = %text, "dispatching question");

        let source = self.source.clone();
        let tx = self.tx.clone();
        let handle = tokio::spawn(async move {
            let outcome = source.ask(&text).await;
            let _ = tx.send(DispatchEvent::Completed { seq, outcome });
        });
        self.in_flight = Some(InFlight { seq, handle });
    }

    fn cancel_scheduled(&mut self) {
        if let Some(scheduled) = self.scheduled.take() {
            scheduled.handle.abort();
        }
    }

    fn cancel_in_flight(&mut self) {
        if let Some(in_flight) = self.in_flight.take() {
            debug!(seq = in_flight.seq, "superseding request");
            in_flight.handle.abort();
            self.state.loading = false;
        }
    }
}

impl<S> Drop for QueryDispatcher<S> {
    fn drop(&mut self) {
        if let Some(scheduled) = self.scheduled.take() {
            scheduled.handle.abort();
        }
        if let Some(in_flight) = self.in_flight.take() {
            in_flight.handle.abort();
        }
    }
}

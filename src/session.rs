use crate::archive::Archiver;
use crate::camera::FrameSource;
use crate::logging::*;
use crate::vision::{Outcome, QueryBackend};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

pub const STARTED_PLACEHOLDER: &str = "Processing started...";
pub const STOPPED_PLACEHOLDER: &str = "Processing stopped.";
const CAPTURE_FAILED: &str = "Failed to capture image. Stream might not be active.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Processing,
}

/// Receives each text the session wants shown to the user.
pub trait Publisher: Send {
    fn publish(&mut self, text: &str);
}

pub struct ConsolePublisher;

impl Publisher for ConsolePublisher {
    fn publish(&mut self, text: &str) {
        println!("{text}");
    }
}

/// The capture-send loop. Owns the frame source for its lifetime; the device
/// is released when the session is dropped.
///
/// Cycles run sequentially in one task with skip-on-miss tick semantics, so
/// at most one completion request is ever in flight. Stopping drops any
/// in-flight cycle, which keeps a late response from overwriting the display.
pub struct Session<S, Q, P> {
    source: S,
    backend: Q,
    publisher: P,
    instruction: String,
    interval: Duration,
    archiver: Option<Archiver>,
    phase: Phase,
    last_text: Option<String>,
}

impl<S: FrameSource, Q: QueryBackend, P: Publisher> Session<S, Q, P> {
    pub fn new(
        source: S,
        backend: Q,
        publisher: P,
        instruction: String,
        interval: Duration,
        archiver: Option<Archiver>,
    ) -> Session<S, Q, P> {
        Session {
            source,
            backend,
            publisher,
            instruction,
            interval,
            archiver,
            phase: Phase::Idle,
            last_text: None,
        }
    }

    /// Runs until `stop` fires (or its sender is dropped), then returns the
    /// session back in `Idle`. The first cycle runs immediately, the rest at
    /// the configured interval.
    pub async fn run(mut self, mut stop: watch::Receiver<bool>) -> Session<S, Q, P> {
        let log = DEFAULT.new(o!("function" => "Session::run"));
        self.phase = Phase::Processing;
        info!(log, "processing started";
            "phase" => format!("{:?}", self.phase),
            "interval" => format!("{:?}", self.interval),
        );
        self.publish(STARTED_PLACEHOLDER);

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            let stopped = tokio::select! {
                biased;
                _ = stop.changed() => true,
                _ = async {
                    ticker.tick().await;
                    self.cycle().await;
                } => false,
            };
            if stopped {
                break;
            }
        }

        self.phase = Phase::Idle;
        if self.last_text.as_deref() == Some(STARTED_PLACEHOLDER) {
            self.publish(STOPPED_PLACEHOLDER);
        }
        info!(log, "processing stopped"; "phase" => format!("{:?}", self.phase));
        self
    }

    async fn cycle(&mut self) {
        let log = DEFAULT.new(o!("function" => "Session::cycle"));
        let grabbed = self.source.grab().await;
        let frame = match grabbed {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                warn!(log, "frame not ready, skipping cycle");
                self.publish(CAPTURE_FAILED);
                return;
            }
            Err(err) => {
                warn!(log, "capture failed"; "error" => %err);
                self.publish(&format!("Error: {err}"));
                return;
            }
        };
        trace!(log, "frame ready"; "width" => frame.width, "height" => frame.height);

        let result = self.backend.describe(&self.instruction, &frame.data_url).await;
        match result {
            Ok(outcome) => {
                if let (Outcome::Answer(text), Some(archiver)) = (&outcome, &self.archiver) {
                    archiver.record(text);
                }
                self.publish(&outcome.to_string());
            }
            Err(err) => {
                warn!(log, "cycle failed"; "error" => %err);
                self.publish(&format!("Error: {err}"));
            }
        }
    }

    fn publish(&mut self, text: &str) {
        self.last_text = Some(text.to_string());
        self.publisher.publish(text);
    }
}

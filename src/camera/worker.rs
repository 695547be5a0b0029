use super::Frame;
use crate::Result;
use crate::logging::*;
use anyhow::anyhow;
use std::sync::mpsc;
use tokio::sync::mpsc as async_mpsc;

/// Runs a blocking capture callback on its own thread and hands frames back
/// over a channel, so the async side can await a frame without ever blocking
/// the runtime. Dropping the worker closes the request channel; the thread
/// exits after its current capture returns.
pub(crate) struct CaptureWorker {
    requests: mpsc::Sender<()>,
    frames: async_mpsc::Receiver<Result<Option<Frame>>>,
}

impl CaptureWorker {
    /// `init` runs on the capture thread and produces the capture callback
    /// there, so the device never has to cross threads. An `init` failure is
    /// returned from `spawn`.
    pub(crate) fn spawn<F, M>(init: F) -> Result<CaptureWorker>
    where
        F: FnOnce() -> Result<M> + Send + 'static,
        M: FnMut() -> Result<Option<Frame>>,
    {
        let (ready_tx, ready_rx) = mpsc::channel();
        let (request_tx, request_rx) = mpsc::channel();
        let (frame_tx, frame_rx) = async_mpsc::channel(1);
        std::thread::spawn(move || {
            let log = DEFAULT.new(o!("function" => "CaptureWorker"));
            let mut capture = match init() {
                Ok(capture) => {
                    let _ = ready_tx.send(Ok(()));
                    capture
                }
                Err(err) => {
                    let _ = ready_tx.send(Err(err));
                    return;
                }
            };
            while request_rx.recv().is_ok() {
                if frame_tx.blocking_send(capture()).is_err() {
                    break;
                }
            }
            info!(log, "capture thread exiting");
        });

        ready_rx
            .recv()
            .map_err(|_| anyhow!("capture thread died during startup"))??;
        Ok(CaptureWorker {
            requests: request_tx,
            frames: frame_rx,
        })
    }

    pub(crate) async fn grab(&mut self) -> Result<Option<Frame>> {
        // A cancelled cycle may have left its frame unclaimed.
        while self.frames.try_recv().is_ok() {}

        self.requests
            .send(())
            .map_err(|_| anyhow!("capture thread terminated"))?;
        match self.frames.recv().await {
            Some(result) => result,
            None => Err(anyhow!("capture thread terminated")),
        }
    }
}

use crate::Result;
use base64::prelude::*;

mod device;
mod worker;
pub use device::Webcam;

/// One captured frame, already encoded as a JPEG data URL.
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub data_url: String,
}

/// Source of frames for a capture-send cycle. `grab` returns `Ok(None)` while
/// the device is not yet producing usable frames; callers skip that cycle.
/// The returned future must stay cancellable: a device that blocks has to do
/// so off the async thread, so that stopping the session is never delayed by
/// a capture in progress.
#[allow(async_fn_in_trait)]
pub trait FrameSource: Send {
    async fn grab(&mut self) -> Result<Option<Frame>>;
}

pub(crate) fn to_data_url(jpeg: &[u8]) -> String {
    format!("data:image/jpeg;base64,{}", BASE64_STANDARD.encode(jpeg))
}

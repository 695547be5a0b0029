use super::worker::CaptureWorker;
use super::{Frame, FrameSource, to_data_url};
use crate::Result;
use crate::errors::Error;
use crate::logging::*;
use image::codecs::jpeg::JpegEncoder;
use v4l::FourCC;
use v4l::buffer::Type;
use v4l::io::traits::CaptureStream;
use v4l::prelude::*;
use v4l::video::Capture;

const JPEG_QUALITY: u8 = 80;
const BUFFER_COUNT: u32 = 4;

/// The session's camera. V4L2 reads block, so the device lives on a
/// dedicated capture thread; `grab` awaits that thread over a channel and
/// stays cancellable, so stopping the session is never held up by a capture
/// in progress.
pub struct Webcam {
    worker: CaptureWorker,
}

impl Webcam {
    pub fn open(index: usize) -> Result<Webcam> {
        let worker = CaptureWorker::spawn(move || {
            let mut capture = MjpgCapture::open(index)?;
            Ok(move || capture.grab())
        })?;
        Ok(Webcam { worker })
    }
}

impl FrameSource for Webcam {
    async fn grab(&mut self) -> Result<Option<Frame>> {
        self.worker.grab().await
    }
}

/// A V4L2 capture device negotiated to an MJPG stream at its native
/// resolution. Dropping it releases the device.
struct MjpgCapture {
    stream: MmapStream<'static>,
    width: u32,
    height: u32,
}

impl MjpgCapture {
    fn open(index: usize) -> Result<MjpgCapture> {
        let log = DEFAULT.new(o!("function" => "MjpgCapture::open", "index" => index));
        let device = Device::new(index).map_err(|err| Error::CameraOpen {
            index,
            message: err.to_string(),
        })?;

        let mut format = device.format()?;
        format.fourcc = FourCC::new(b"MJPG");
        let format = device.set_format(&format)?;
        if format.fourcc != FourCC::new(b"MJPG") {
            return Err(Error::UnsupportedPixelFormat(format.fourcc.to_string()).into());
        }

        let stream = MmapStream::with_buffers(&device, Type::VideoCapture, BUFFER_COUNT)?;
        info!(log, "camera ready"; "width" => format.width, "height" => format.height);
        Ok(MjpgCapture {
            stream,
            width: format.width,
            height: format.height,
        })
    }

    fn grab(&mut self) -> Result<Option<Frame>> {
        let log = DEFAULT.new(o!("function" => "MjpgCapture::grab"));
        let (buffer, meta) = self.stream.next()?;
        let used = (meta.bytesused as usize).min(buffer.len());
        if used == 0 {
            warn!(log, "empty frame buffer");
            return Ok(None);
        }

        let decoded = match image::load_from_memory(&buffer[..used]) {
            Ok(decoded) => decoded,
            Err(err) => {
                warn!(log, "undecodable frame, skipping"; "error" => %err);
                return Ok(None);
            }
        };
        let rgb = decoded.to_rgb8();
        if rgb.width() == 0 || rgb.height() == 0 {
            warn!(log, "zero-sized frame, skipping");
            return Ok(None);
        }

        let mut jpeg = Vec::new();
        JpegEncoder::new_with_quality(&mut jpeg, JPEG_QUALITY).encode_image(&rgb)?;
        trace!(log, "frame captured";
            "width" => self.width,
            "height" => self.height,
            "bytes" => jpeg.len(),
        );
        Ok(Some(Frame {
            width: self.width,
            height: self.height,
            data_url: to_data_url(&jpeg),
        }))
    }
}

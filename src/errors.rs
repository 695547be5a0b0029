use std::fmt::Display;

#[derive(Debug)]
pub enum Error {
    CameraOpen { index: usize, message: String },
    UnsupportedPixelFormat(String),
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::CameraOpen { index, message } => {
                write!(f, "Cannot open camera {}: {}", index, message)
            }
            Error::UnsupportedPixelFormat(fourcc) => {
                write!(f, "Unsupported pixel format: {}", fourcc)
            }
        }
    }
}

impl std::error::Error for Error {}

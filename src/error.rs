use std::fmt;

/// Boxed error produced by the external device/hub library.
pub type DeviceError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug)]
pub enum Error {
    Device(DeviceError),
    InvalidMode(String),
    InvalidPreset(String),
    UnknownEntry(String),
    Config(serde_json::Error),
    Io(std::io::Error),
    Closed,
}

impl Error {
    /// Wrap a failure raised by the device library so it reaches the caller unchanged.
    pub fn device(e: impl Into<DeviceError>) -> Self {
        Error::Device(e.into())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Device(e) => write!(f, "device error: {e}"),
            Error::InvalidMode(mode) => write!(f, "invalid mode: {mode}"),
            Error::InvalidPreset(preset) => write!(f, "invalid preset: {preset}"),
            Error::UnknownEntry(id) => write!(f, "unknown config entry: {id}"),
            Error::Config(e) => write!(f, "config error: {e}"),
            Error::Io(e) => write!(f, "IO error: {e}"),
            Error::Closed => write!(f, "entity queue closed"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Device(e) => Some(e.as_ref()),
            Error::Config(e) => Some(e),
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Config(e)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

use std::fmt;

/// Sum of every failure mode the core can produce, mirroring the original
/// driver's integer error codes one-to-one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    Unknown,
    InvalidParameter,
    OutOfRange,
    InitFailed,
    NotInitialized,
    NotFound,
    FileNotFound,
    NotOpen,
    NoDevice,
    AlreadyOpen,
    CannotOpen,
    CannotCreate,
    ReadFailed,
    WriteFailed,
    WrongSize,
    NoPermission,
    InvalidFormat,
    Empty,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Unknown => "unknown error",
            ErrorKind::InvalidParameter => "invalid parameter",
            ErrorKind::OutOfRange => "value out of range",
            ErrorKind::InitFailed => "initialization failed",
            ErrorKind::NotInitialized => "not initialized",
            ErrorKind::NotFound => "not found",
            ErrorKind::FileNotFound => "file not found",
            ErrorKind::NotOpen => "device not open",
            ErrorKind::NoDevice => "no device",
            ErrorKind::AlreadyOpen => "already open",
            ErrorKind::CannotOpen => "cannot open",
            ErrorKind::CannotCreate => "cannot create",
            ErrorKind::ReadFailed => "read failed",
            ErrorKind::WriteFailed => "write failed",
            ErrorKind::WrongSize => "wrong size",
            ErrorKind::NoPermission => "no permission",
            ErrorKind::InvalidFormat => "invalid format",
            ErrorKind::Empty => "empty",
        };
        f.write_str(s)
    }
}

/// An [`ErrorKind`] plus a short human-readable context string, the way the
/// original source attaches a log message to an error code at the point it's
/// raised.
#[derive(Debug, Clone)]
pub struct DriverError {
    pub kind: ErrorKind,
    pub context: String,
}

impl DriverError {
    pub fn new(kind: ErrorKind, context: impl Into<String>) -> Self {
        Self {
            kind,
            context: context.into(),
        }
    }
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.context)
    }
}

impl std::error::Error for DriverError {}

impl From<std::io::Error> for DriverError {
    fn from(e: std::io::Error) -> Self {
        let kind = match e.kind() {
            std::io::ErrorKind::NotFound => ErrorKind::FileNotFound,
            std::io::ErrorKind::PermissionDenied => ErrorKind::NoPermission,
            _ => ErrorKind::Unknown,
        };
        DriverError::new(kind, e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DriverError>;

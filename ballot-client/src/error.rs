use std::error;
use std::fmt;

#[derive(Debug)]
pub enum BackendError {
    Transport(reqwest::Error),
    Status(u16),
    Decode(serde_json::Error),
    Encode(serde_json::Error),
    Unavailable(String),
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use BackendError::*;
        match self {
            Transport(e) => {
                write!(f, "request failed: ")?;
                e.fmt(f)
            }
            Status(code) => write!(f, "backend answered with status {}", code),
            Decode(e) => {
                write!(f, "failed to decode the response: ")?;
                e.fmt(f)
            }
            Encode(e) => {
                write!(f, "failed to encode the request: ")?;
                e.fmt(f)
            }
            Unavailable(reason) => write!(f, "backend unavailable: {}", reason),
        }
    }
}

impl error::Error for BackendError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        use BackendError::*;
        match self {
            Transport(e) => Some(e),
            Decode(e) | Encode(e) => Some(e),
            _ => None,
        }
    }
}

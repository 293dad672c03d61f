use std::error;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadError {
    AlreadyRunning,
    NoCandidates,
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use LoadError::*;
        match self {
            AlreadyRunning => write!(f, "a load test is already running"),
            NoCandidates => write!(f, "no candidates to vote for; sync the candidate list first"),
        }
    }
}

impl error::Error for LoadError {}

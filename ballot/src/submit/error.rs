use ballot_common::category::Category;
use std::error;
use std::fmt;

/// Why a submission was turned down. Nothing was enqueued when one of these
/// is returned, except for `QueueClosed`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rejection {
    VotingClosed,
    AlreadyVoted,
    Incomplete(Category),
    QueueClosed,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Rejection::*;
        match self {
            VotingClosed => write!(f, "voting is closed; wait for the host to open it"),
            AlreadyVoted => write!(f, "this device has already voted"),
            Incomplete(category) => write!(f, "no candidate selected for {}", category),
            QueueClosed => write!(f, "the request queue has been terminated"),
        }
    }
}

impl error::Error for Rejection {}

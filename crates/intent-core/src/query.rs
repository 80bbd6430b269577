#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Answer to a host-polled contextual query.
///
/// `Undefined` means "no opinion": the query keeps walking the stack until
/// some action answers, falling back to coarser or buried context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum QueryResponse {
    Undefined,
    Yes,
    No,
}

impl QueryResponse {
    pub fn is_defined(self) -> bool {
        self != QueryResponse::Undefined
    }

    pub fn as_bool(self) -> Option<bool> {
        match self {
            QueryResponse::Undefined => None,
            QueryResponse::Yes => Some(true),
            QueryResponse::No => Some(false),
        }
    }
}

impl From<bool> for QueryResponse {
    fn from(value: bool) -> Self {
        if value {
            QueryResponse::Yes
        } else {
            QueryResponse::No
        }
    }
}

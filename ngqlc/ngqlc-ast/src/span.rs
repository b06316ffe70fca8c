use std::fmt::{self, Debug, Formatter};
use std::ops::Range;

use serde::{Deserialize, Serialize};

/// A byte range within one source buffer.
#[derive(Clone, PartialEq, Eq, Copy, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,

    /// A key representing the source buffer; assigned by whoever feeds the parser.
    pub source_id: u16,
}

impl Span {
    pub fn new(source_id: u16, range: Range<usize>) -> Self {
        Span {
            start: range.start,
            end: range.end,
            source_id,
        }
    }

    pub fn merge_opt(a: Option<Span>, b: Option<Span>) -> Option<Span> {
        match (a, b) {
            (None, None) => None,
            (None, Some(s)) => Some(s),
            (Some(s), None) => Some(s),
            (Some(a), Some(b)) => Some(Span::merge(a, b)),
        }
    }

    pub fn merge(a: Span, b: Span) -> Span {
        debug_assert_eq!(a.source_id, b.source_id);
        Span {
            start: usize::min(a.start, b.start),
            end: usize::max(a.end, b.end),
            source_id: a.source_id,
        }
    }
}

impl From<Span> for Range<usize> {
    fn from(a: Span) -> Self {
        a.start..a.end
    }
}

impl Debug for Span {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{}", self.source_id, self.start, self.end)
    }
}

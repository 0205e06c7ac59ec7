//! View State Primitives
//!
//! Small pieces shared by every page: inline status messages and the load
//! sequencing that keeps a slow, superseded response from overwriting a
//! newer one.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashKind {
    Success,
    Error,
}

/// Inline status message shown above a form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Error,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == FlashKind::Error
    }
}

impl fmt::Display for Flash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let icon = match self.kind {
            FlashKind::Success => "✓",
            FlashKind::Error => "✕",
        };
        write!(f, "{} {}", icon, self.message)
    }
}

/// Identifies one fetch issued by a view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

/// Issues load tickets and remembers the newest.
///
/// Only the response carrying the newest ticket may be applied.
#[derive(Debug, Default)]
pub struct LoadSeq {
    latest: u64,
}

impl LoadSeq {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&mut self) -> LoadTicket {
        self.latest += 1;
        LoadTicket(self.latest)
    }

    pub fn is_current(&self, ticket: LoadTicket) -> bool {
        ticket.0 == self.latest
    }
}

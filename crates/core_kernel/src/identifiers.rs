//! Strongly-typed identifiers for ledger entities
//!
//! Newtype wrappers around integers keep user ids and history sequence
//! numbers from being mixed up with each other or with point amounts.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when an identifier string cannot be parsed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid {kind} identifier: {input}")]
pub struct IdParseError {
    pub kind: &'static str,
    pub input: String,
}

macro_rules! define_id {
    ($name:ident, $inner:ty, $prefix:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name($inner);

        impl $name {
            /// Creates an identifier from its raw value
            pub const fn new(value: $inner) -> Self {
                Self(value)
            }

            /// Returns the raw value
            pub const fn value(&self) -> $inner {
                self.0
            }

            /// Returns the identifier prefix for display
            pub fn prefix() -> &'static str {
                $prefix
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}-{}", $prefix, self.0)
            }
        }

        impl FromStr for $name {
            type Err = IdParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                // Strip prefix if present
                let raw = s.strip_prefix(concat!($prefix, "-")).unwrap_or(s);
                raw.parse::<$inner>().map(Self).map_err(|_| IdParseError {
                    kind: $prefix,
                    input: s.to_string(),
                })
            }
        }

        impl From<$inner> for $name {
            fn from(value: $inner) -> Self {
                Self(value)
            }
        }

        impl From<$name> for $inner {
            fn from(id: $name) -> $inner {
                id.0
            }
        }
    };
}

define_id!(UserId, i64, "USR");
define_id!(SequenceId, u64, "SEQ");

impl SequenceId {
    /// The first sequence number handed out by a history store
    pub const FIRST: SequenceId = SequenceId(1);

    /// Returns the sequence number following this one
    pub fn next(&self) -> SequenceId {
        SequenceId(self.0 + 1)
    }
}

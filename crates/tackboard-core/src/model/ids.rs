//! Identifier newtypes for boards, columns, and tasks.
//!
//! Generated ids carry a short kind prefix (`brd-`, `col-`, `tsk-`) followed by
//! ten hex characters of a blake3 digest. Ids supplied by callers are accepted
//! verbatim as long as they are non-empty.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static ID_COUNTER: AtomicU64 = AtomicU64::new(0);

const DIGEST_HEX_LEN: usize = 10;

fn generate(prefix: &str, seed: &str) -> String {
    let counter = ID_COUNTER.fetch_add(1, Ordering::Relaxed);
    let now_us = chrono::Utc::now().timestamp_micros();
    let mut hasher = blake3::Hasher::new();
    hasher.update(prefix.as_bytes());
    hasher.update(seed.as_bytes());
    hasher.update(&now_us.to_le_bytes());
    hasher.update(&counter.to_le_bytes());
    hasher.update(&std::process::id().to_le_bytes());
    let digest = hasher.finalize().to_hex();
    format!("{prefix}-{}", &digest.as_str()[..DIGEST_HEX_LEN])
}

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Kind prefix used for generated ids.
            pub const PREFIX: &'static str = $prefix;

            /// Generate a fresh id, mixing `seed` into the digest.
            #[must_use]
            pub fn generate(seed: &str) -> Self {
                Self(generate($prefix, seed))
            }

            /// Parse a caller-supplied id. Surrounding whitespace is trimmed.
            ///
            /// # Errors
            ///
            /// Returns an error message if the id is empty.
            pub fn parse(raw: &str) -> Result<Self, String> {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return Err(format!("{} must not be empty", stringify!($name)));
                }
                Ok(Self(trimmed.to_string()))
            }

            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            #[must_use]
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(
    /// Identifier of a [`crate::model::Board`].
    BoardId,
    "brd"
);
define_id!(
    /// Identifier of a [`crate::model::Column`]. Also the key for column locks.
    ColumnId,
    "col"
);
define_id!(
    /// Stable identifier of a [`crate::model::Task`].
    TaskId,
    "tsk"
);

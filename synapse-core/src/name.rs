//! Typed name wrappers for protocols and hook points.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Typed names prevent mixing up protocol names and hook points.
/// These are just strings underneath, with no format requirement beyond
/// the dotted-category convention on protocol names.
macro_rules! typed_name {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl $name {
            /// Create a new typed name from anything that converts to String.
            pub fn new(name: impl Into<String>) -> Self {
                Self(name.into())
            }

            /// Borrow the inner string.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

typed_name!(ProtocolName, "Dotted protocol identifier, e.g. `code.analyze`.");
typed_name!(HookPoint, "Name of an extension slot, e.g. `pre-protocol`.");

impl ProtocolName {
    /// The category prefix: everything before the first `.`, or the whole
    /// name when there is no dot.
    pub fn category(&self) -> &str {
        match self.0.split_once('.') {
            Some((head, _)) => head,
            None => &self.0,
        }
    }
}

impl HookPoint {
    /// Fired by the engine before a protocol runs. A veto here skips the run.
    pub const PRE_PROTOCOL: &'static str = "pre-protocol";
    /// Fired by the engine after a protocol returns.
    pub const POST_PROTOCOL: &'static str = "post-protocol";
    /// Fired by the engine when a protocol run fails.
    pub const ON_ERROR: &'static str = "on-error";

    /// The `pre-protocol` hook point.
    pub fn pre_protocol() -> Self {
        Self::new(Self::PRE_PROTOCOL)
    }

    /// The `post-protocol` hook point.
    pub fn post_protocol() -> Self {
        Self::new(Self::POST_PROTOCOL)
    }

    /// The `on-error` hook point.
    pub fn on_error() -> Self {
        Self::new(Self::ON_ERROR)
    }
}

//! Server identifiers.

use std::fmt;

/// Opaque identifier for one cluster node.
///
/// The server set is fixed for a whole run and ordered; generators index
/// into it by position. Identifiers are compared by name only - nothing
/// about addresses or liveness lives here.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ServerId(String);

impl ServerId {
    /// Create an identifier from a server name.
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(name.as_ref().to_owned())
    }

    /// The server's name.
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ServerId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compares_by_name() {
        assert_eq!(ServerId::new("a"), ServerId::from("a"));
        assert_ne!(ServerId::new("a"), ServerId::new("b"));
        assert!(ServerId::new("a") < ServerId::new("b"));
    }

    #[test]
    fn display_is_the_name() {
        assert_eq!(ServerId::new("gamma").to_string(), "gamma");
    }
}

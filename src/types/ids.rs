//! Newtype wrappers for webhook identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A GitHub webhook delivery ID (the `X-GitHub-Delivery` header).
///
/// Opaque to the bot; carried through for tracing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeliveryId(pub String);

impl DeliveryId {
    pub fn new(s: impl Into<String>) -> Self {
        DeliveryId(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeliveryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for DeliveryId {
    fn from(s: String) -> Self {
        DeliveryId(s)
    }
}

impl From<&str> for DeliveryId {
    fn from(s: &str) -> Self {
        DeliveryId(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn display_is_raw_header_value(
            s in "[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}"
        ) {
            let id = DeliveryId::new(&s);
            prop_assert_eq!(id.to_string(), s.clone());
            prop_assert_eq!(id.as_str(), s.as_str());
        }
    }

    #[test]
    fn serializes_transparently() {
        let id = DeliveryId::from("72d3162e-cc78-11e3-81ab-4c9367dc0958");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"72d3162e-cc78-11e3-81ab-4c9367dc0958\"");
    }
}

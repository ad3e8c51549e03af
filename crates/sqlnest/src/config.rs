//! Hydration configuration.

use crate::identity::IdentityLookup;
use serde::Deserialize;

/// Options for a [`Hydrator`](crate::Hydrator).
///
/// Deserializable so it can be embedded in a caller's own configuration:
///
/// ```
/// use sqlnest::{HydrateConfig, IdentityLookup};
///
/// let config: HydrateConfig = serde_json::from_str(r#"{"identity_lookup": "hashed"}"#).unwrap();
/// assert_eq!(config.identity_lookup, IdentityLookup::Hashed);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HydrateConfig {
    /// How existing entities are found by identity
    pub identity_lookup: IdentityLookup,
}

impl HydrateConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the identity lookup strategy.
    pub fn identity_lookup(mut self, lookup: IdentityLookup) -> Self {
        self.identity_lookup = lookup;
        self
    }

    /// Use a hash index per collection instead of a linear scan.
    pub fn hashed(self) -> Self {
        self.identity_lookup(IdentityLookup::Hashed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_scan() {
        assert_eq!(HydrateConfig::default().identity_lookup, IdentityLookup::Scan);
    }

    #[test]
    fn test_builder() {
        let config = HydrateConfig::new().hashed();
        assert_eq!(config.identity_lookup, IdentityLookup::Hashed);

        let config = config.identity_lookup(IdentityLookup::Scan);
        assert_eq!(config.identity_lookup, IdentityLookup::Scan);
    }

    #[test]
    fn test_deserialize() {
        let config: HydrateConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, HydrateConfig::default());

        let config: HydrateConfig =
            serde_json::from_str(r#"{"identity_lookup": "scan"}"#).unwrap();
        assert_eq!(config.identity_lookup, IdentityLookup::Scan);

        assert!(serde_json::from_str::<HydrateConfig>(r#"{"identity_lookup": "tree"}"#).is_err());
    }
}

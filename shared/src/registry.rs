use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Static lookup of every valid unit identifier (county name) to whatever
/// display metadata the names file carries. Loaded once, read-only after.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitRegistry {
    units: BTreeMap<String, serde_json::Value>,
}

impl UnitRegistry {
    /// Parse a names file: a JSON object keyed by unit identifier.
    pub fn from_json(text: &str) -> Result<Self, String> {
        let units: BTreeMap<String, serde_json::Value> = serde_json::from_str(text)
            .map_err(|e| format!("unit names must be a JSON object: {e}"))?;
        Ok(Self::from_map(units))
    }

    pub fn from_map(units: BTreeMap<String, serde_json::Value>) -> Self {
        let units = units
            .into_iter()
            .filter(|(name, _)| !name.trim().is_empty())
            .collect();
        Self { units }
    }

    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_map(
            ids.into_iter()
                .map(|id| (id.into(), serde_json::Value::Null))
                .collect(),
        )
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.units.keys().map(String::as_str)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.units.contains_key(id)
    }

    pub fn metadata(&self, id: &str) -> Option<&serde_json::Value> {
        self.units.get(id)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::UnitRegistry;

    #[test]
    fn parses_names_object_keys() {
        let registry =
            UnitRegistry::from_json(r#"{"Kent": 1, "Devon": {"code": "DEV"}, "Essex": null}"#)
                .expect("valid names json");

        assert_eq!(registry.len(), 3);
        assert!(registry.contains("Kent"));
        assert_eq!(
            registry.ids().collect::<Vec<_>>(),
            vec!["Devon", "Essex", "Kent"]
        );
        assert_eq!(
            registry.metadata("Devon").and_then(|m| m.get("code")),
            Some(&serde_json::json!("DEV"))
        );
    }

    #[test]
    fn rejects_non_object_names_file() {
        let err = UnitRegistry::from_json(r#"["Kent", "Devon"]"#).unwrap_err();
        assert!(err.contains("JSON object"), "unexpected error: {err}");
    }

    #[test]
    fn blank_identifiers_are_dropped() {
        let registry = UnitRegistry::from_ids(["Kent", "", "  "]);
        assert_eq!(registry.len(), 1);
        assert!(!registry.contains(""));
    }

    #[test]
    fn empty_object_is_an_empty_registry() {
        let registry = UnitRegistry::from_json("{}").expect("empty object parses");
        assert!(registry.is_empty());
    }
}

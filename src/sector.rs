//! Sector classification capability.
//!
//! Sector data is not something the engine can derive from positions alone,
//! so classification is an injected capability. Production wiring plugs in a
//! provider backed by real reference data; the bundled `StaticSectorClassifier`
//! is a lookup table with a fallback bucket.

use std::collections::HashMap;

/// Maps a stock symbol to a sector name.
pub trait SectorClassifier: Send + Sync {
    /// Classify a symbol (e.g. "AAPL" -> "technology")
    fn classify(&self, symbol: &str) -> String;
}

/// Table-driven classifier with a fallback sector for unknown symbols.
#[derive(Debug, Clone)]
pub struct StaticSectorClassifier {
    map: HashMap<String, String>,
    fallback: String,
}

impl Default for StaticSectorClassifier {
    fn default() -> Self {
        Self {
            map: HashMap::new(),
            fallback: "technology".to_string(),
        }
    }
}

impl StaticSectorClassifier {
    /// Create a classifier from an explicit symbol -> sector table
    pub fn with_map(map: HashMap<String, String>, fallback: impl Into<String>) -> Self {
        Self {
            map,
            fallback: fallback.into(),
        }
    }

    /// Register a single symbol -> sector mapping
    pub fn insert(&mut self, symbol: impl Into<String>, sector: impl Into<String>) {
        self.map.insert(symbol.into(), sector.into());
    }
}

impl SectorClassifier for StaticSectorClassifier {
    fn classify(&self, symbol: &str) -> String {
        self.map
            .get(symbol)
            .cloned()
            .unwrap_or_else(|| self.fallback.clone())
    }
}

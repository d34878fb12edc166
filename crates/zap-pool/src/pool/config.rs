use serde::{Deserialize, Serialize};

/// Configuration for a single pool, provided by the game or loaded from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Register the pool in the `PoolRegistry` under `accessor` on initialization.
    pub global: bool,
    /// Registry name. Case and surrounding whitespace are ignored.
    pub accessor: Option<String>,
    /// Number of entities created up front (default: 0).
    pub pool_size: usize,
    /// Initialize when the host starts instead of waiting for an explicit call.
    pub self_initialize: bool,
    /// Hard ceiling on owned entities. `None` lets the pool grow without bound.
    pub max_size: Option<usize>,
    /// Tag of the storage entity created when the pool has none (default: "Pool").
    pub storage_tag: String,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            global: false,
            accessor: None,
            pool_size: 0,
            self_initialize: false,
            max_size: None,
            storage_tag: "Pool".to_string(),
        }
    }
}

impl PoolConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from a JSON string. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    // -- Builder methods --

    pub fn with_size(mut self, pool_size: usize) -> Self {
        self.pool_size = pool_size;
        self
    }

    /// Make the pool global under `accessor`.
    pub fn global(mut self, accessor: impl Into<String>) -> Self {
        self.global = true;
        self.accessor = Some(accessor.into());
        self
    }

    pub fn self_initializing(mut self) -> Self {
        self.self_initialize = true;
        self
    }

    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = Some(max_size);
        self
    }

    pub fn with_storage_tag(mut self, tag: impl Into<String>) -> Self {
        self.storage_tag = tag.into();
        self
    }
}

/// A set of named pool configs declared in one document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PoolManifest {
    /// Pool configs in declaration order.
    #[serde(default)]
    pub pools: Vec<PoolDescriptor>,
}

/// One pool entry in a `PoolManifest`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolDescriptor {
    /// Name of the template the game should build this pool from.
    pub template: String,
    #[serde(flatten)]
    pub config: PoolConfig,
}

impl PoolManifest {
    /// Parse a manifest from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_gives_defaults() {
        let config = PoolConfig::from_json("{}").unwrap();
        assert_eq!(config, PoolConfig::default());
        assert_eq!(config.storage_tag, "Pool");
        assert_eq!(config.max_size, None);
    }

    #[test]
    fn parse_global_config() {
        let json = r#"{ "global": true, "accessor": "Bullets", "pool_size": 16, "max_size": 64 }"#;
        let config = PoolConfig::from_json(json).unwrap();
        assert!(config.global);
        assert_eq!(config.accessor.as_deref(), Some("Bullets"));
        assert_eq!(config.pool_size, 16);
        assert_eq!(config.max_size, Some(64));
        assert!(!config.self_initialize);
    }

    #[test]
    fn builder_matches_json() {
        let built = PoolConfig::new().with_size(4).global("sparks").self_initializing();
        let parsed = PoolConfig::from_json(
            r#"{ "global": true, "accessor": "sparks", "pool_size": 4, "self_initialize": true }"#,
        )
        .unwrap();
        assert_eq!(built, parsed);
    }

    #[test]
    fn parse_manifest() {
        let json = r#"{
            "pools": [
                { "template": "bullet", "global": true, "accessor": "Bullets", "pool_size": 32 },
                { "template": "spark", "pool_size": 8, "self_initialize": true }
            ]
        }"#;
        let manifest = PoolManifest::from_json(json).unwrap();
        assert_eq!(manifest.pools.len(), 2);
        assert_eq!(manifest.pools[0].template, "bullet");
        assert_eq!(manifest.pools[0].config.pool_size, 32);
        assert!(manifest.pools[1].config.self_initialize);
        assert_eq!(manifest.pools[1].config.accessor, None);
    }
}

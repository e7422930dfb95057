use crate::config::{ConfigError, ConfigSource};
use std::collections::HashMap;
use std::env;
use std::path::Path;

/// Flag controlling whether the config-discovery bootstrapper registers the
/// discovery client and instance provider. Default: disabled.
pub const CONFIG_DISCOVERY_ENABLED: &str = "config.discovery.enabled";

/// Flag controlling whether the local service instance auto-registers with
/// the coordination service on startup. Default: enabled.
pub const AUTO_REGISTRATION_ENABLED: &str = "service-registry.auto-registration.enabled";

/// Setting holding the coordination-service connect string (host:port).
pub const COORDINATION_CONNECT_STRING: &str = "coordination.connect-string";

/// A named boolean setting resolved once at startup
///
/// Immutable after resolution: created by [`BootstrapConfig::flag`], read any
/// number of times, never mutated. Carries the provenance of its value so a
/// default-resolved flag is distinguishable from an explicitly set one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureFlag {
    name: String,
    value: bool,
    source: ConfigSource,
}

impl FeatureFlag {
    /// Create a programmatically resolved flag
    pub fn new(name: impl Into<String>, value: bool) -> Self {
        Self {
            name: name.into(),
            value,
            source: ConfigSource::Programmatic,
        }
    }

    /// The flag name as it appears in configuration
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The resolved boolean value
    pub fn is_enabled(&self) -> bool {
        self.value
    }

    /// Which configuration layer the value came from
    pub fn source(&self) -> &ConfigSource {
        &self.source
    }
}

/// Layered configuration for the bootstrap phase
///
/// Lookup precedence: programmatic values, then environment variables, then a
/// loaded configuration file, then the caller-supplied default. The winning
/// layer is reported through [`BootstrapConfig::source`] for debugging.
#[derive(Debug, Clone, Default)]
pub struct BootstrapConfig {
    programmatic: HashMap<String, String>,
    file_values: HashMap<String, String>,
    file_path: Option<String>,
    env_prefix: Option<String>,
}

impl BootstrapConfig {
    /// Create an empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value programmatically (highest precedence layer)
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.programmatic.insert(key.into(), value.into());
        self
    }

    /// Enable environment-variable lookup under the given prefix
    ///
    /// A setting `config.discovery.enabled` with prefix `KINDLING` is read
    /// from `KINDLING_CONFIG_DISCOVERY_ENABLED`.
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    /// Load a YAML file as the lowest explicit layer
    ///
    /// Nested mappings are flattened with dot-joined keys, so
    /// `config: { discovery: { enabled: true } }` becomes
    /// `config.discovery.enabled`.
    pub fn with_yaml_file(mut self, path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let value: serde_yaml::Value = serde_yaml::from_str(&raw)?;
        let mut flat = HashMap::new();
        flatten_yaml(&value, String::new(), &mut flat);
        self.file_values = flat;
        self.file_path = Some(path.display().to_string());
        Ok(self)
    }

    /// Look up a setting across all layers
    pub fn get(&self, key: &str) -> Option<String> {
        if let Some(value) = self.programmatic.get(key) {
            return Some(value.clone());
        }
        if let Some(var) = self.env_var_name(key) {
            if let Ok(value) = env::var(&var) {
                return Some(value);
            }
        }
        self.file_values.get(key).cloned()
    }

    /// Look up a setting that must be present
    pub fn get_required(&self, key: &str, hint: &str) -> Result<String, ConfigError> {
        self.get(key)
            .ok_or_else(|| ConfigError::missing_required(key, hint))
    }

    /// Report which layer a setting resolves from
    pub fn source(&self, key: &str) -> Option<ConfigSource> {
        if self.programmatic.contains_key(key) {
            return Some(ConfigSource::Programmatic);
        }
        if let Some(var) = self.env_var_name(key) {
            if env::var(&var).is_ok() {
                return Some(ConfigSource::EnvVar(var));
            }
        }
        if self.file_values.contains_key(key) {
            return self.file_path.clone().map(ConfigSource::File);
        }
        None
    }

    /// Resolve a feature flag, falling back to `default` when absent
    ///
    /// A present-but-malformed value is an error, not a silent fallback:
    /// misconfiguration must be visible at startup.
    pub fn flag(&self, name: &str, default: bool) -> Result<FeatureFlag, ConfigError> {
        match self.get(name) {
            Some(raw) => {
                let value = parse_bool(&raw).ok_or_else(|| {
                    ConfigError::invalid_value(name, &raw, "true/false, yes/no, on/off or 1/0")
                })?;
                let source = self
                    .source(name)
                    .unwrap_or(ConfigSource::Programmatic);
                Ok(FeatureFlag {
                    name: name.to_string(),
                    value,
                    source,
                })
            }
            None => Ok(FeatureFlag {
                name: name.to_string(),
                value: default,
                source: ConfigSource::Default(default.to_string()),
            }),
        }
    }

    fn env_var_name(&self, key: &str) -> Option<String> {
        let prefix = self.env_prefix.as_ref()?;
        let mangled = key
            .chars()
            .map(|c| match c {
                '.' | '-' => '_',
                c => c.to_ascii_uppercase(),
            })
            .collect::<String>();
        Some(format!("{}_{}", prefix, mangled))
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn flatten_yaml(value: &serde_yaml::Value, prefix: String, out: &mut HashMap<String, String>) {
    match value {
        serde_yaml::Value::Mapping(map) => {
            for (k, v) in map {
                if let Some(key) = k.as_str() {
                    let full = if prefix.is_empty() {
                        key.to_string()
                    } else {
                        format!("{}.{}", prefix, key)
                    };
                    flatten_yaml(v, full, out);
                }
            }
        }
        serde_yaml::Value::Null => {}
        serde_yaml::Value::Bool(b) => {
            out.insert(prefix, b.to_string());
        }
        serde_yaml::Value::Number(n) => {
            out.insert(prefix, n.to_string());
        }
        serde_yaml::Value::String(s) => {
            out.insert(prefix, s.clone());
        }
        // Sequences have no flag semantics; keep the YAML form for debugging
        other => {
            if let Ok(s) = serde_yaml::to_string(other) {
                out.insert(prefix, s.trim_end().to_string());
            }
        }
    }
}

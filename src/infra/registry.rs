//! Installation registry
//!
//! Read-only lookup table of merchant installations, keyed by installation
//! id. Loaded once at process start from a YAML file; the rest of the
//! gateway only ever reads it.

use std::collections::HashMap;
use std::path::Path;

use crate::domain::Installation;
use crate::infra::{GatewayError, Result};

/// The registered installations.
#[derive(Debug)]
pub struct InstallationRegistry {
    by_id: HashMap<String, Installation>,
}

impl InstallationRegistry {
    /// Load the registry from a YAML file holding a sequence of
    /// installations. No reload: get the config right before startup.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            GatewayError::Configuration(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_yaml(&raw)
    }

    /// Parse a registry from YAML text.
    pub fn from_yaml(raw: &str) -> Result<Self> {
        let installations: Vec<Installation> = serde_yaml::from_str(raw)
            .map_err(|e| GatewayError::Configuration(format!("malformed installations: {e}")))?;
        Ok(Self::from_installations(installations))
    }

    /// Build a registry from already-constructed installations. Later
    /// entries win on duplicate ids.
    pub fn from_installations(installations: Vec<Installation>) -> Self {
        let by_id = installations
            .into_iter()
            .map(|i| (i.id.clone(), i))
            .collect();
        Self { by_id }
    }

    /// Look up an installation by the id supplied in a payment request.
    pub fn get(&self, id: &str) -> Option<&Installation> {
        self.by_id.get(id)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
- id: "211616"
  md5_key: KEY1
  callback_url: http://localhost:4567/dump-params
  callback_password: PASSWORD1
- id: "211617"
  md5_key: KEY2
  callback_url: http://localhost:4567/dump-params
  callback_password: PASSWORD2
"#;

    #[test]
    fn loads_installations_from_yaml() {
        let registry = InstallationRegistry::from_yaml(SAMPLE).unwrap();
        assert_eq!(registry.len(), 2);

        let installation = registry.get("211616").unwrap();
        assert_eq!(installation.md5_key, "KEY1");
        assert_eq!(installation.callback_url, "http://localhost:4567/dump-params");

        assert!(registry.get("999999").is_none());
    }

    #[test]
    fn malformed_yaml_is_a_configuration_error() {
        let err = InstallationRegistry::from_yaml("not: [valid").unwrap_err();
        assert!(matches!(err, GatewayError::Configuration(_)));
    }

    #[test]
    fn missing_file_is_a_configuration_error() {
        let err = InstallationRegistry::load(Path::new("/nonexistent/installations.yaml"))
            .unwrap_err();
        assert!(matches!(err, GatewayError::Configuration(_)));
    }
}

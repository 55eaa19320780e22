use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use vela_authz::{Capability, Role, RoleTable};

pub const DEFAULT_BROWSE_CAPABILITY: &str = "products:view";
pub const DEFAULT_MAX_RESULTS: usize = 500;

// Engine configuration sourced from environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Capability an actor needs before any product is listed.
    pub browse_capability: Capability,
    /// Deployment switch for the partner catalog source.
    pub partner_catalog: bool,
    pub max_results: usize,
    pub role_overrides: HashMap<Role, Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
struct EngineConfigOverride {
    browse_capability: Option<String>,
    partner_catalog: Option<bool>,
    max_results: Option<usize>,
    #[serde(default)]
    role_overrides: HashMap<Role, Vec<String>>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            browse_capability: Capability::parse(DEFAULT_BROWSE_CAPABILITY),
            partner_catalog: true,
            max_results: DEFAULT_MAX_RESULTS,
            role_overrides: HashMap::new(),
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Result<Self> {
        let browse_capability = std::env::var("VELA_BROWSE_CAPABILITY")
            .unwrap_or_else(|_| DEFAULT_BROWSE_CAPABILITY.to_string())
            .parse()
            .with_context(|| "parse VELA_BROWSE_CAPABILITY")?;
        let partner_catalog = std::env::var("VELA_PARTNER_CATALOG")
            .unwrap_or_else(|_| "true".to_string())
            .parse()
            .with_context(|| "parse VELA_PARTNER_CATALOG")?;
        let max_results = std::env::var("VELA_MAX_RESULTS")
            .unwrap_or_else(|_| DEFAULT_MAX_RESULTS.to_string())
            .parse()
            .with_context(|| "parse VELA_MAX_RESULTS")?;
        Ok(Self {
            browse_capability,
            partner_catalog,
            max_results,
            role_overrides: HashMap::new(),
        })
    }

    pub fn from_env_or_yaml() -> Result<Self> {
        let mut config = Self::from_env()?;
        if let Ok(path) = std::env::var("VELA_CONFIG") {
            let contents =
                fs::read_to_string(&path).with_context(|| format!("read VELA_CONFIG: {path}"))?;
            config.apply_yaml(&contents)?;
        }
        Ok(config)
    }

    /// Layer a YAML document over the current values. Absent keys keep them;
    /// on error `self` is left unchanged.
    pub fn apply_yaml(&mut self, contents: &str) -> Result<()> {
        let override_cfg: EngineConfigOverride =
            serde_yaml::from_str(contents).with_context(|| "parse engine config yaml")?;
        let mut next = self.clone();
        if let Some(value) = override_cfg.browse_capability {
            next.browse_capability = value.parse().with_context(|| "parse browse_capability")?;
        }
        if let Some(value) = override_cfg.partner_catalog {
            next.partner_catalog = value;
        }
        if let Some(value) = override_cfg.max_results {
            next.max_results = value;
        }
        next.role_overrides.extend(override_cfg.role_overrides);
        // Surface bad capability strings at load time, not on first request.
        next.role_table()?;
        *self = next;
        Ok(())
    }

    pub fn role_table(&self) -> Result<RoleTable> {
        RoleTable::builtin()
            .with_overrides(&self.role_overrides)
            .with_context(|| "build role table")
    }
}

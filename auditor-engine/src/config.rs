//! Engine settings resolved from the shared TOML configuration

use crate::category::AuditProfile;
use crate::recommendations::SynthesizerSettings;
use crate::scoring::WeightMap;
use auditor_common::config::{AuditConfig, TomlConfig};
use auditor_common::{Error, Result};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    /// Issues kept in the report's top-issue list
    pub top_issues: usize,
    pub synthesizer: SynthesizerSettings,
    /// Deadline for the check phases, if any
    pub deadline: Option<Duration>,
    /// Persist finished audits when a store is attached
    pub persist: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::from_config(&TomlConfig::default())
    }
}

impl EngineSettings {
    pub fn from_config(config: &TomlConfig) -> Self {
        let audit = &config.audit;
        Self {
            top_issues: audit.top_issues,
            synthesizer: SynthesizerSettings::from_config(
                audit,
                Duration::from_secs(config.ai.timeout_secs.max(1)),
            ),
            deadline: audit.deadline_secs.map(Duration::from_secs),
            persist: audit.persist,
        }
    }
}

/// Weight map for a profile, honouring a configured override
///
/// Overrides live under `[audit.weights.<profile>]`. An override that names
/// an unknown category or does not sum to 1 is rejected, never renormalised.
pub fn resolve_weight_map(profile: AuditProfile, config: &AuditConfig) -> Result<WeightMap> {
    match config.weights.get(profile.as_str()) {
        Some(names) => {
            let map = WeightMap::from_names(names).map_err(|e| {
                Error::Config(format!("Invalid weight override for '{}': {}", profile, e))
            })?;
            tracing::info!(profile = %profile, categories = map.len(), "Using configured weight map");
            Ok(map)
        }
        None => Ok(WeightMap::for_profile(profile)),
    }
}

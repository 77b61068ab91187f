//! Audit orchestrator
//!
//! Runs one audit end to end:
//! 1. Validate the target (the only fatal step)
//! 2. Phase one: fan out every independent check and join
//! 3. Phase two: run dependent checks against phase-one results and join
//! 4. Score categories and composite, rank issues
//! 5. Synthesize recommendations (AI or fallback)
//! 6. Persist (best effort) and assemble the report

use crate::category::{AuditProfile, Category};
use crate::config::{resolve_weight_map, EngineSettings};
use crate::error::{AuditError, AuditResult};
use crate::events::AuditEvent;
use crate::issues::{aggregate_outcomes, top_n};
use crate::persistence::{AuditRecordInput, AuditStore};
use crate::recommendations::{
    GenerationError, LlmRecommendationClient, ModuleSummary, Recommendation,
    RecommendationGenerator, RecommendationSynthesizer,
};
use crate::report::{category_reports, module_report, AuditReport};
use crate::runner::{run_checks, run_dependent_checks};
use crate::scoring::{category_scores, composite, score_checks, CategoryScore, CompositeScore, WeightMap};
use crate::target::{TargetContext, TargetIdentity};
use crate::types::{
    CheckOperation, DependentCheckOperation, Issue, ModuleOutcome, Phase, PriorResults,
};
use auditor_common::config::TomlConfig;
use chrono::Utc;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Per-call overrides of the engine settings
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuditOptions {
    /// Deadline for the check phases, measured from the start of the call
    pub deadline: Option<Duration>,
    /// Persist this audit; `None` uses the configured default
    pub persist: Option<bool>,
}

pub struct AuditOrchestrator {
    profile: AuditProfile,
    weights: WeightMap,
    settings: EngineSettings,
    checks: Vec<Arc<dyn CheckOperation>>,
    dependent_checks: Vec<Arc<dyn DependentCheckOperation>>,
    generator: Option<Arc<dyn RecommendationGenerator>>,
    store: Option<Arc<dyn AuditStore>>,
    event_tx: Option<mpsc::Sender<AuditEvent>>,
}

impl AuditOrchestrator {
    /// Orchestrator with built-in weights, default settings and no collaborators
    pub fn new(profile: AuditProfile) -> Self {
        Self {
            profile,
            weights: WeightMap::for_profile(profile),
            settings: EngineSettings::default(),
            checks: Vec::new(),
            dependent_checks: Vec::new(),
            generator: None,
            store: None,
            event_tx: None,
        }
    }

    /// Orchestrator configured from TOML
    ///
    /// Applies weight overrides and engine settings, and attaches the
    /// chat-completions collaborator when an API key is available. Without a
    /// key every audit uses fallback recommendations.
    pub fn from_config(profile: AuditProfile, config: &TomlConfig) -> auditor_common::Result<Self> {
        let mut orchestrator = Self::new(profile)
            .with_weights(resolve_weight_map(profile, &config.audit)?)
            .with_settings(EngineSettings::from_config(config));

        match LlmRecommendationClient::from_config(config) {
            Ok(client) => {
                info!(model = %config.ai.model, "AI recommendations enabled");
                orchestrator.generator = Some(Arc::new(client));
            }
            Err(GenerationError::NotConfigured) => {
                info!("No AI API key configured, recommendations use fallback only");
            }
            Err(e) => {
                warn!(error = %e, "AI client unavailable, recommendations use fallback only");
            }
        }

        Ok(orchestrator)
    }

    pub fn with_weights(mut self, weights: WeightMap) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_settings(mut self, settings: EngineSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_check<C: CheckOperation + 'static>(mut self, check: C) -> Self {
        self.checks.push(Arc::new(check));
        self
    }

    pub fn with_dependent_check<C: DependentCheckOperation + 'static>(mut self, check: C) -> Self {
        self.dependent_checks.push(Arc::new(check));
        self
    }

    pub fn with_generator(mut self, generator: Arc<dyn RecommendationGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn with_store(mut self, store: Arc<dyn AuditStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_events(mut self, event_tx: mpsc::Sender<AuditEvent>) -> Self {
        self.event_tx = Some(event_tx);
        self
    }

    pub fn profile(&self) -> AuditProfile {
        self.profile
    }

    pub fn weights(&self) -> &WeightMap {
        &self.weights
    }

    /// Run one audit
    ///
    /// Only an invalid target or a malformed check set (empty, or with a
    /// repeated module name) is an error. Failed checks, AI failures and
    /// persistence failures are all absorbed into the returned report.
    pub async fn run_audit(
        &self,
        identity: &TargetIdentity,
        options: AuditOptions,
    ) -> AuditResult<AuditReport> {
        let started = Instant::now();
        let timestamp = Utc::now();

        let target = identity.resolve()?;
        if self.checks.is_empty() {
            return Err(AuditError::NoChecksRegistered);
        }
        self.ensure_unique_modules()?;

        let deadline = options
            .deadline
            .or(self.settings.deadline)
            .map(|d| tokio::time::Instant::now() + d);

        info!(
            target = %target.name(),
            profile = %self.profile,
            checks = self.checks.len(),
            dependent_checks = self.dependent_checks.len(),
            "Starting audit"
        );
        self.emit_event(AuditEvent::AuditStarted {
            target: target.name().to_string(),
            checks: self.checks.len() + self.dependent_checks.len(),
            timestamp: timestamp.timestamp(),
        });

        let target = Arc::new(target);
        let modules = self.run_phases(Arc::clone(&target), deadline).await;

        // Scoring
        let scores = category_scores(modules.iter().flat_map(|m| m.checks.iter()));
        let score_map: BTreeMap<Category, f64> =
            scores.iter().map(|(category, s)| (*category, s.score)).collect();
        let composite = composite(&score_map, &self.weights);

        // Issues and recommendations
        let ranked = aggregate_outcomes(&modules);
        let module_scores: Vec<Option<f64>> = modules.iter().map(|m| score_checks(&m.checks)).collect();
        let summaries = module_summaries(&modules, &module_scores, &ranked);

        let synthesizer =
            RecommendationSynthesizer::new(self.generator.clone(), self.settings.synthesizer.clone());
        let synthesis = synthesizer.synthesize(&summaries).await;
        self.emit_event(AuditEvent::RecommendationsReady {
            source: synthesis.source,
            count: synthesis.recommendations.len(),
        });

        let persisted_id = if options.persist.unwrap_or(self.settings.persist) {
            let score_list: Vec<CategoryScore> = scores.values().cloned().collect();
            self.persist(&target, &composite, &score_list, &ranked, &synthesis.recommendations)
                .await
        } else {
            None
        };

        let report = AuditReport {
            target: target.identity.clone(),
            profile: self.profile,
            categories: category_reports(&scores, &modules, &ranked, &self.weights),
            modules: modules
                .iter()
                .zip(module_scores.iter())
                .map(|(m, score)| module_report(m, *score))
                .collect(),
            top_issues: top_n(&ranked, self.settings.top_issues),
            total_issues: ranked.len(),
            recommendations: synthesis.recommendations,
            recommendation_source: synthesis.source,
            composite,
            duration_ms: started.elapsed().as_millis() as u64,
            timestamp,
            persisted_id,
        };

        info!(
            target = %report.target.name,
            score = report.composite.score,
            grade = %report.composite.grade,
            issues = report.total_issues,
            recommendations = report.recommendations.len(),
            source = %report.recommendation_source,
            duration_ms = report.duration_ms,
            "Audit completed"
        );
        self.emit_event(AuditEvent::AuditCompleted {
            composite_score: report.composite.score,
            grade: report.composite.grade,
            duration_ms: report.duration_ms,
            persisted_id: report.persisted_id,
        });

        Ok(report)
    }

    /// Module names key phase-two lookups and per-module summaries
    fn ensure_unique_modules(&self) -> AuditResult<()> {
        let mut seen = HashSet::new();
        let names = self
            .checks
            .iter()
            .map(|c| c.name())
            .chain(self.dependent_checks.iter().map(|c| c.name()));
        for name in names {
            if !seen.insert(name) {
                return Err(AuditError::DuplicateModule(name.to_string()));
            }
        }
        Ok(())
    }

    async fn run_phases(
        &self,
        target: Arc<TargetContext>,
        deadline: Option<tokio::time::Instant>,
    ) -> Vec<ModuleOutcome> {
        self.emit_event(AuditEvent::PhaseStarted {
            phase: Phase::Independent,
            checks: self.checks.len(),
        });
        let mut modules = run_checks(&self.checks, Arc::clone(&target), deadline).await;
        self.emit_completions(&modules);

        if self.dependent_checks.is_empty() {
            return modules;
        }

        self.emit_event(AuditEvent::PhaseStarted {
            phase: Phase::Dependent,
            checks: self.dependent_checks.len(),
        });
        let prior = Arc::new(PriorResults::new(modules.clone()));
        let dependent = run_dependent_checks(&self.dependent_checks, target, prior, deadline).await;
        self.emit_completions(&dependent);

        modules.extend(dependent);
        modules
    }

    fn emit_completions(&self, modules: &[ModuleOutcome]) {
        if self.event_tx.is_none() {
            return;
        }
        for module in modules {
            self.emit_event(AuditEvent::CheckCompleted {
                module: module.module.clone(),
                phase: module.phase,
                score: score_checks(&module.checks),
                failed: module.is_failed(),
            });
        }
    }

    async fn persist(
        &self,
        target: &TargetContext,
        composite: &CompositeScore,
        category_scores: &[CategoryScore],
        issues: &[Issue],
        recommendations: &[Recommendation],
    ) -> Option<i64> {
        let store = self.store.as_ref()?;

        let profile_id = match store.upsert_target_profile(&target.identity).await {
            Ok(id) => id,
            Err(e) => {
                error!(target = %target.name(), error = %e, "Failed to store target profile");
                return None;
            }
        };

        let record = AuditRecordInput {
            audit_run_id: Uuid::new_v4(),
            profile: self.profile,
            composite,
            category_scores,
            issues,
            recommendations,
        };

        match store.insert_audit_record(profile_id, record).await {
            Ok(id) => Some(id),
            Err(e) => {
                error!(target = %target.name(), profile_id, error = %e, "Failed to store audit record");
                None
            }
        }
    }

    /// Emit event if a channel is configured
    ///
    /// Never waits on the receiver: events are dropped when the channel is
    /// full or closed.
    fn emit_event(&self, event: AuditEvent) {
        if let Some(tx) = &self.event_tx {
            if let Err(e) = tx.try_send(event) {
                debug!(error = %e, "Audit event dropped");
            }
        }
    }
}

fn module_summaries(
    modules: &[ModuleOutcome],
    scores: &[Option<f64>],
    ranked: &[Issue],
) -> Vec<ModuleSummary> {
    modules
        .iter()
        .zip(scores.iter())
        .map(|(module, score)| ModuleSummary {
            module: module.module.clone(),
            score: *score,
            issues: ranked
                .iter()
                .filter(|issue| issue.module == module.module)
                .cloned()
                .collect(),
        })
        .collect()
}

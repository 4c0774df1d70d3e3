//! Plugin registration and binding resolution.
//!
//! The [`WorkerRegistry`] is the closed registration table: every plugin
//! identifier a rule binding may reference is registered here at startup.
//! [`RulePipelines`] resolves the configured bindings against the registry
//! once, at load time — an unknown identifier, a duplicate ordinal or a
//! binding to a stage the worker does not support aborts startup instead
//! of failing mid-request.
//!
//! The registry is an explicitly constructed object passed by reference to
//! whatever needs it; there is deliberately no process-global instance.

use crate::core::config::RuleConfig;
use crate::error::{DocuvaultError, Result};
use crate::plugins::worker::{DocumentWorker, Stage};
use std::collections::HashMap;
use std::sync::Arc;

/// Validate a plugin name before registration.
///
/// # Rules
///
/// - Name cannot be empty
/// - Name cannot contain whitespace
/// - Name should follow kebab-case convention (lowercase with hyphens)
fn validate_plugin_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(DocuvaultError::validation("plugin name cannot be empty"));
    }
    if name.contains(char::is_whitespace) {
        return Err(DocuvaultError::validation(format!(
            "plugin name '{}' cannot contain whitespace",
            name
        )));
    }
    Ok(())
}

/// Registry of pipeline workers, keyed by plugin name.
pub struct WorkerRegistry {
    workers: HashMap<String, Arc<dyn DocumentWorker>>,
}

impl WorkerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            workers: HashMap::new(),
        }
    }

    /// Create a registry with the built-in reference workers registered:
    /// `filetype-validator`, `content-hash`, `local-storage`, `tagger`.
    pub fn with_builtin_workers() -> Result<Self> {
        use crate::plugins::workers::{ContentHashWorker, FileTypeValidator, StorageWriter, TagWorker};

        let mut registry = Self::new();
        registry.register(Arc::new(FileTypeValidator::new()))?;
        registry.register(Arc::new(ContentHashWorker))?;
        registry.register(Arc::new(StorageWriter))?;
        registry.register(Arc::new(TagWorker))?;
        Ok(registry)
    }

    /// Register a worker.
    ///
    /// Validates the name and calls `initialize()`; the worker is not
    /// registered if initialization fails. Registering a name twice
    /// replaces the previous worker.
    pub fn register(&mut self, worker: Arc<dyn DocumentWorker>) -> Result<()> {
        let name = worker.name().to_string();
        validate_plugin_name(&name)?;
        worker.initialize()?;
        self.workers.insert(name, worker);
        Ok(())
    }

    /// Look up a worker by name.
    ///
    /// Fails with [`DocuvaultError::UnknownPlugin`]; callers resolving
    /// configuration should surface this at load time.
    pub fn get(&self, name: &str) -> Result<Arc<dyn DocumentWorker>> {
        self.workers
            .get(name)
            .cloned()
            .ok_or_else(|| DocuvaultError::UnknownPlugin {
                plugin_name: name.to_string(),
            })
    }

    /// List all registered worker names.
    pub fn list(&self) -> Vec<String> {
        self.workers.keys().cloned().collect()
    }

    /// Remove a worker, calling `shutdown()` on it first.
    pub fn remove(&mut self, name: &str) -> Result<()> {
        if let Some(worker) = self.workers.remove(name) {
            worker.shutdown()?;
        }
        Ok(())
    }

    /// Shutdown all workers and clear the registry.
    pub fn shutdown_all(&mut self) -> Result<()> {
        let names: Vec<_> = self.workers.keys().cloned().collect();
        for name in names {
            self.remove(&name)?;
        }
        Ok(())
    }
}

impl Default for WorkerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// A binding resolved against the registry: the executable worker plus its
/// per-binding configuration.
#[derive(Clone)]
pub struct ResolvedBinding {
    pub ordinal: u32,
    pub worker: Arc<dyn DocumentWorker>,
    pub options: serde_json::Map<String, serde_json::Value>,
}

/// Ordered plugin chains per (rule, stage), resolved once at load time.
pub struct RulePipelines {
    by_rule: HashMap<u32, HashMap<Stage, Vec<ResolvedBinding>>>,
}

impl std::fmt::Debug for RulePipelines {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut dbg = f.debug_struct("RulePipelines");
        for (rule, stages) in &self.by_rule {
            let summary: HashMap<Stage, usize> =
                stages.iter().map(|(stage, chain)| (*stage, chain.len())).collect();
            dbg.field(&format!("rule_{rule}"), &summary);
        }
        dbg.finish()
    }
}

impl RulePipelines {
    /// Resolve configured rule bindings against a registry.
    ///
    /// Load-time integrity checks:
    /// - every referenced plugin identifier must be registered (`UnknownPlugin`)
    /// - ordinals must be unique within a (rule, stage) pair
    /// - the bound stage must appear in the worker's `supported_stages()`
    /// - every active rule needs at least one `store` binding, otherwise its
    ///   store pipeline could never persist anything
    pub fn resolve(rules: &[RuleConfig], registry: &WorkerRegistry) -> Result<Self> {
        let mut by_rule = HashMap::new();

        for rule in rules {
            let mut stages: HashMap<Stage, Vec<ResolvedBinding>> = HashMap::new();

            for binding in &rule.bindings {
                let worker = registry.get(&binding.plugin)?;

                if !worker.supported_stages().contains(&binding.stage) {
                    return Err(DocuvaultError::validation(format!(
                        "plugin '{}' cannot be bound to stage '{}' (rule '{}')",
                        binding.plugin, binding.stage, rule.name
                    )));
                }

                let chain = stages.entry(binding.stage).or_default();
                if chain.iter().any(|b| b.ordinal == binding.ordinal) {
                    return Err(DocuvaultError::validation(format!(
                        "duplicate ordinal {} in stage '{}' of rule '{}'",
                        binding.ordinal, binding.stage, rule.name
                    )));
                }
                chain.push(ResolvedBinding {
                    ordinal: binding.ordinal,
                    worker,
                    options: binding.options.clone(),
                });
            }

            for chain in stages.values_mut() {
                chain.sort_by_key(|b| b.ordinal);
            }

            if rule.active && !stages.contains_key(&Stage::Store) {
                return Err(DocuvaultError::validation(format!(
                    "active rule '{}' has no store-stage binding",
                    rule.name
                )));
            }

            by_rule.insert(rule.id, stages);
        }

        Ok(Self { by_rule })
    }

    /// The ordered chain for a (rule, stage) pair.
    ///
    /// An empty chain is valid: the stage is a no-op for that rule.
    pub fn bindings_for(&self, rule_id: u32, stage: Stage) -> &[ResolvedBinding] {
        self.by_rule
            .get(&rule_id)
            .and_then(|stages| stages.get(&stage))
            .map_or(&[], Vec::as_slice)
    }
}

//! Per-table customization pipeline.
//!
//! Customizers are registered once and deduplicated by [`TableCustomizer::id`].
//! A render runs two passes: [`CustomizerRegistry::customize_config`] evaluates
//! every predicate and records which customizers applied to the table, and
//! [`CustomizerRegistry::customize_render_options`] replays exactly that set
//! against the render options. A customizer that errors or panics is logged
//! and skipped; the others still run.

use std::{
    any::Any,
    collections::{HashMap, HashSet},
    fmt,
    panic::{AssertUnwindSafe, catch_unwind},
    sync::Arc,
};

use anyhow::Result;
use heck::ToKebabCase;
use log::{debug, warn};
use thiserror::Error;

use crate::{assembly::ResolvedTable, config::TableId, options::RenderOptions};

pub trait TableCustomizer: Send + Sync {
    /// Stable identity used for deduplication. Defaults to the kebab-cased type name.
    fn id(&self) -> String {
        type_id_name(std::any::type_name::<Self>())
    }

    fn should_apply(&self, table: &ResolvedTable) -> Result<bool>;

    fn customize_config(&self, table: ResolvedTable) -> Result<ResolvedTable> {
        Ok(table)
    }

    fn customize_render_options(&self, options: RenderOptions) -> Result<RenderOptions> {
        Ok(options)
    }
}

/// `gridspec::customizers::TruncateGuidColumns` → `truncate-guid-columns`.
fn type_id_name(type_name: &str) -> String {
    let base = type_name.split('<').next().unwrap_or(type_name);
    base.rsplit("::").next().unwrap_or(base).to_kebab_case()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Predicate,
    Config,
    RenderOptions,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Predicate => "should_apply",
            Stage::Config => "customize_config",
            Stage::RenderOptions => "customize_render_options",
        })
    }
}

#[derive(Debug, Error)]
pub enum CustomizerFailure {
    #[error("customizer '{id}' failed in {stage}: {cause:#}")]
    Failed {
        id: String,
        stage: Stage,
        cause: anyhow::Error,
    },
    #[error("customizer '{id}' panicked in {stage}: {message}")]
    Panicked {
        id: String,
        stage: Stage,
        message: String,
    },
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string())
}

fn run_guarded<T>(
    id: &str,
    stage: Stage,
    call: impl FnOnce() -> Result<T>,
) -> Result<T, CustomizerFailure> {
    match catch_unwind(AssertUnwindSafe(call)) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(cause)) => Err(CustomizerFailure::Failed {
            id: id.to_string(),
            stage,
            cause,
        }),
        Err(payload) => Err(CustomizerFailure::Panicked {
            id: id.to_string(),
            stage,
            message: panic_message(payload.as_ref()),
        }),
    }
}

struct Registration {
    id: String,
    customizer: Arc<dyn TableCustomizer>,
}

/// Owned by the table assembly; no process-wide state.
#[derive(Default)]
pub struct CustomizerRegistry {
    registrations: Vec<Registration>,
    ids: HashSet<String>,
    active: HashMap<TableId, Vec<usize>>,
}

impl fmt::Debug for CustomizerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomizerRegistry")
            .field("ids", &self.ids().collect::<Vec<_>>())
            .field("active_tables", &self.active.len())
            .finish()
    }
}

impl CustomizerRegistry {
    pub fn new() -> Self {
        CustomizerRegistry::default()
    }

    pub fn register(&mut self, customizer: impl TableCustomizer + 'static) -> bool {
        self.register_shared(Arc::new(customizer))
    }

    /// Returns `false` (and changes nothing) when the id is already registered.
    pub fn register_shared(&mut self, customizer: Arc<dyn TableCustomizer>) -> bool {
        let id = customizer.id();
        if !self.ids.insert(id.clone()) {
            debug!("Customizer '{id}' already registered; ignoring");
            return false;
        }
        debug!("Registered customizer '{id}'");
        self.registrations.push(Registration { id, customizer });
        true
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.registrations.iter().map(|r| r.id.as_str())
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Ids recorded by the last config pass for `table_id`, in registration order.
    pub fn active_customizers(&self, table_id: TableId) -> Vec<&str> {
        self.active
            .get(&table_id)
            .map(|indices| {
                indices
                    .iter()
                    .map(|&i| self.registrations[i].id.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn customize_config(&mut self, table: ResolvedTable) -> ResolvedTable {
        let table_id = table.id();
        self.active.remove(&table_id);

        // Predicates see the table as passed in, not earlier customizers' output.
        let mut running = table.clone();
        let mut active = Vec::new();
        for (index, registration) in self.registrations.iter().enumerate() {
            let Registration { id, customizer } = registration;
            match run_guarded(id, Stage::Predicate, || customizer.should_apply(&table)) {
                Ok(true) => {}
                Ok(false) => {
                    debug!("Customizer '{id}' does not apply to table {table_id}");
                    continue;
                }
                Err(failure) => {
                    warn!("{failure}");
                    continue;
                }
            }
            let candidate = running.clone();
            match run_guarded(id, Stage::Config, || customizer.customize_config(candidate)) {
                Ok(customized) => {
                    debug!("Customizer '{id}' applied to table {table_id}");
                    running = customized;
                    active.push(index);
                }
                Err(failure) => warn!("{failure}"),
            }
        }

        if !active.is_empty() {
            self.active.insert(table_id, active);
        }
        running
    }

    pub fn customize_render_options(
        &self,
        options: RenderOptions,
        table_id: TableId,
    ) -> RenderOptions {
        let Some(indices) = self.active.get(&table_id) else {
            return options;
        };
        let mut running = options;
        for &index in indices {
            let Registration { id, customizer } = &self.registrations[index];
            let candidate = running.clone();
            match run_guarded(id, Stage::RenderOptions, || {
                customizer.customize_render_options(candidate)
            }) {
                Ok(customized) => running = customized,
                Err(failure) => warn!("{failure}"),
            }
        }
        running
    }
}

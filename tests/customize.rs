mod common;

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use anyhow::{Result, bail};
use common::{table_config, table_id, task_schema};
use gridspec::{
    assembly::{ResolvedTable, TableAssembly},
    config::{ColumnConfig, TableId},
    customize::{CustomizerRegistry, TableCustomizer},
    customizers::{FitColumnsLayout, TableTargets},
    options::{Layout, RenderOptions},
};
use serde_json::json;

#[derive(Default, Clone)]
struct Counting {
    predicate_calls: Arc<AtomicUsize>,
    config_calls: Arc<AtomicUsize>,
    options_calls: Arc<AtomicUsize>,
}

impl TableCustomizer for Counting {
    fn should_apply(&self, _: &ResolvedTable) -> Result<bool> {
        self.predicate_calls.fetch_add(1, Ordering::SeqCst);
        Ok(true)
    }

    fn customize_config(&self, table: ResolvedTable) -> Result<ResolvedTable> {
        self.config_calls.fetch_add(1, Ordering::SeqCst);
        Ok(table)
    }

    fn customize_render_options(&self, options: RenderOptions) -> Result<RenderOptions> {
        self.options_calls.fetch_add(1, Ordering::SeqCst);
        Ok(options)
    }
}

/// Applies to tables titled "Tasks" and renames them, so its own predicate
/// would fail if it were re-evaluated after the config pass.
struct RenameTasks;

impl TableCustomizer for RenameTasks {
    fn should_apply(&self, table: &ResolvedTable) -> Result<bool> {
        Ok(table.config.title == "Tasks")
    }

    fn customize_config(&self, mut table: ResolvedTable) -> Result<ResolvedTable> {
        table.config.title = "Renamed".to_string();
        Ok(table)
    }

    fn customize_render_options(&self, mut options: RenderOptions) -> Result<RenderOptions> {
        options.extra.insert("renamed".to_string(), json!(true));
        Ok(options)
    }
}

struct BrokenPredicate;

impl TableCustomizer for BrokenPredicate {
    fn should_apply(&self, _: &ResolvedTable) -> Result<bool> {
        bail!("predicate exploded")
    }
}

struct PanickingConfig;

impl TableCustomizer for PanickingConfig {
    fn should_apply(&self, _: &ResolvedTable) -> Result<bool> {
        Ok(true)
    }

    fn customize_config(&self, mut table: ResolvedTable) -> Result<ResolvedTable> {
        table.columns.clear();
        panic!("config pass panicked");
    }

    fn customize_render_options(&self, mut options: RenderOptions) -> Result<RenderOptions> {
        options.layout = Layout::FitData;
        Ok(options)
    }
}

struct FailingOptions;

impl TableCustomizer for FailingOptions {
    fn id(&self) -> String {
        "failing-options".to_string()
    }

    fn should_apply(&self, _: &ResolvedTable) -> Result<bool> {
        Ok(true)
    }

    fn customize_render_options(&self, mut options: RenderOptions) -> Result<RenderOptions> {
        options.pagination_size = 999;
        bail!("options pass failed")
    }
}

fn tasks_config() -> gridspec::config::TableConfig {
    table_config(vec![ColumnConfig::new("Title"), ColumnConfig::new("DueDate")])
}

#[test]
fn duplicate_registration_is_a_no_op() {
    let counting = Counting::default();
    let mut registry = CustomizerRegistry::new();
    assert!(registry.register(counting.clone()));
    assert!(!registry.register(counting.clone()));
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.ids().collect::<Vec<_>>(), vec!["counting"]);

    let mut assembly = TableAssembly::new(registry);
    assembly.assemble(tasks_config(), &task_schema());
    assert_eq!(counting.config_calls.load(Ordering::SeqCst), 1);
    assert_eq!(counting.options_calls.load(Ordering::SeqCst), 1);
}

#[test]
fn options_pass_replays_the_recorded_set() {
    let mut registry = CustomizerRegistry::new();
    registry.register(RenameTasks);
    let mut assembly = TableAssembly::new(registry);

    let assembled = assembly.assemble(tasks_config(), &task_schema());
    assert_eq!(assembled.table.config.title, "Renamed");
    assert_eq!(assembled.options.extra.get("renamed"), Some(&json!(true)));
    assert_eq!(
        assembly.registry().active_customizers(table_id()),
        vec!["rename-tasks"]
    );
}

#[test]
fn failing_customizers_are_skipped() {
    let counting = Counting::default();
    let mut registry = CustomizerRegistry::new();
    registry.register(BrokenPredicate);
    registry.register(PanickingConfig);
    registry.register(FailingOptions);
    registry.register(counting.clone());
    let mut assembly = TableAssembly::new(registry);

    let assembled = assembly.assemble(tasks_config(), &task_schema());
    assert_eq!(assembled.table.columns.len(), 2);
    assert_eq!(assembled.options.layout, Layout::FitDataFill);
    assert_eq!(assembled.options.pagination_size, 10);
    assert_eq!(
        assembly.registry().active_customizers(table_id()),
        vec!["failing-options", "counting"]
    );
    assert_eq!(counting.options_calls.load(Ordering::SeqCst), 1);
}

#[test]
fn every_config_pass_starts_from_scratch() {
    let counting = Counting::default();
    let mut registry = CustomizerRegistry::new();
    registry.register(RenameTasks);
    registry.register(counting.clone());
    let mut assembly = TableAssembly::new(registry);

    assembly.assemble(tasks_config(), &task_schema());
    assert_eq!(assembly.registry().active_customizers(table_id()).len(), 2);

    let mut other = tasks_config();
    other.title = "Archive".to_string();
    let assembled = assembly.assemble(other, &task_schema());
    assert_eq!(
        assembly.registry().active_customizers(table_id()),
        vec!["counting"]
    );
    assert!(assembled.options.extra.is_empty());
    assert_eq!(counting.predicate_calls.load(Ordering::SeqCst), 2);
}

#[test]
fn activation_is_tracked_per_table() {
    let mut registry = CustomizerRegistry::new();
    registry.register(FitColumnsLayout {
        targets: TableTargets::only([table_id()]),
    });
    let mut assembly = TableAssembly::new(registry);

    let targeted = assembly.assemble(tasks_config(), &task_schema());
    let mut untargeted_config = tasks_config();
    untargeted_config.guid = TableId::default();
    let untargeted = assembly.assemble(untargeted_config, &task_schema());

    assert_eq!(targeted.options.layout, Layout::FitColumns);
    assert_eq!(untargeted.options.layout, Layout::FitDataFill);
    assert_eq!(
        assembly.registry().active_customizers(table_id()),
        vec!["fit-columns-layout"]
    );
    assert!(assembly.registry().active_customizers(TableId::default()).is_empty());
}

#[test]
fn options_pass_without_config_pass_is_identity() {
    let mut registry = CustomizerRegistry::new();
    registry.register(RenameTasks);
    let table = ResolvedTable::resolve(tasks_config(), &task_schema());
    let options = RenderOptions::build(&table);
    let unchanged = registry.customize_render_options(options.clone(), table.id());
    assert_eq!(unchanged, options);
}

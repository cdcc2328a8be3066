//! Sequences one table render: columns, sort, customization and render options.

use log::debug;

use crate::{
    columns::{ResolvedColumn, resolve_columns},
    config::{TableConfig, TableId},
    customize::CustomizerRegistry,
    options::RenderOptions,
    schema::Schema,
    sort::{SortDirective, parse_sort},
};

/// The resolved table configuration the config-pass customizers rewrite.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTable {
    pub config: TableConfig,
    pub columns: Vec<ResolvedColumn>,
    pub sort: Vec<SortDirective>,
}

impl ResolvedTable {
    pub fn resolve(config: TableConfig, schema: &Schema) -> Self {
        let columns = resolve_columns(&config.columns, config.columns_auto_show_remaining, schema);
        let sort = config
            .column_sort
            .as_deref()
            .map(|expression| parse_sort(expression, &columns, schema))
            .unwrap_or_default();
        ResolvedTable {
            config,
            columns,
            sort,
        }
    }

    pub fn id(&self) -> TableId {
        self.config.guid
    }

    pub fn column(&self, field_key: &str) -> Option<&ResolvedColumn> {
        self.columns.iter().find(|c| c.field_key == field_key)
    }

    pub fn column_mut(&mut self, field_key: &str) -> Option<&mut ResolvedColumn> {
        self.columns.iter_mut().find(|c| c.field_key == field_key)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssembledTable {
    pub table: ResolvedTable,
    pub options: RenderOptions,
}

#[derive(Debug, Default)]
pub struct TableAssembly {
    registry: CustomizerRegistry,
}

impl TableAssembly {
    pub fn new(registry: CustomizerRegistry) -> Self {
        TableAssembly { registry }
    }

    pub fn registry(&self) -> &CustomizerRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut CustomizerRegistry {
        &mut self.registry
    }

    pub fn assemble(&mut self, config: TableConfig, schema: &Schema) -> AssembledTable {
        let table_id = config.guid;
        let resolved = ResolvedTable::resolve(config, schema);
        debug!(
            "Table {table_id}: {} column(s), {} sort directive(s) before customization",
            resolved.columns.len(),
            resolved.sort.len()
        );

        let table = self.registry.customize_config(resolved);
        debug!(
            "Table {table_id}: active customizers {:?}",
            self.registry.active_customizers(table_id)
        );

        let options = RenderOptions::build(&table);
        let options = self.registry.customize_render_options(options, table_id);
        AssembledTable { table, options }
    }
}

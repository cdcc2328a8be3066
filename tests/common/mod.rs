#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use gridspec::{
    config::{ColumnConfig, TableConfig, TableId},
    data::{Row, rows_from_value},
    schema::Schema,
};
use serde_json::json;
use tempfile::{TempDir, tempdir};

pub const TABLE_GUID: &str = "5bca1415-291a-427a-a1c5-ebd8c7dc0c4a";

/// A task content type: plain, date, numeric, boolean, rich-text, related
/// (object) and grouped (array of titled items) fields.
pub const TASK_SCHEMA: &str = r#"{
    "$id": "Task",
    "title": "Task",
    "properties": {
        "Id": { "title": "Id", "type": "integer" },
        "Title": { "title": "Title", "type": "string" },
        "DueDate": { "title": "Due Date", "type": "string", "format": "date" },
        "Owner": {
            "title": "Owner",
            "type": "array",
            "items": { "properties": { "Title": { "type": "string" } } }
        },
        "Author": { "title": "Author", "type": "object" },
        "Done": { "title": "Done", "type": "boolean" },
        "Body": { "title": "Body", "type": "string", "inputType": "string-wysiwyg" },
        "EntityGuid": { "title": "Entity Guid", "type": "string" }
    },
    "required": ["Title"]
}"#;

pub fn task_schema() -> Schema {
    Schema::from_json_str(TASK_SCHEMA).expect("task schema parses")
}

pub fn table_id() -> TableId {
    TableId::parse(TABLE_GUID).expect("valid guid")
}

pub fn table_config(columns: Vec<ColumnConfig>) -> TableConfig {
    TableConfig {
        guid: table_id(),
        title: "Tasks".to_string(),
        columns,
        ..TableConfig::default()
    }
}

pub fn task_rows() -> Vec<Row> {
    rows_from_value(json!([
        {
            "Id": 3,
            "Title": "Write report",
            "DueDate": "2024-03-09T00:00:00Z",
            "Done": false,
            "Author": { "Title": "Ada" },
            "Body": "&lt;p&gt;Draft &amp; review&lt;/p&gt;",
            "EntityGuid": "0d6a1cf2-8c1e-4f7e-9d55-5a1b8b0f2d11"
        },
        {
            "Id": 1,
            "Title": "archive mail",
            "DueDate": "2024-01-15T00:00:00Z",
            "Done": true,
            "Author": { "Title": "Bob" },
            "Body": "<b>done</b>",
            "EntityGuid": "9f2e6d3a-1111-4c2b-8a77-000000000001"
        },
        {
            "Id": 2,
            "Title": "Book travel",
            "DueDate": "2024-03-09T00:00:00Z",
            "Done": null,
            "Author": { "Title": "Cy" },
            "Body": "",
            "EntityGuid": "short"
        }
    ]))
    .expect("rows parse")
}

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    /// Creates a fresh scratch directory for the current test case.
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    /// Returns the root path for all files owned by this workspace.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }

    /// Writes the task schema, a table configuration and the sample rows.
    pub fn write_task_inputs(&self, config: &str) -> (PathBuf, PathBuf, PathBuf) {
        let rows = serde_json::to_string(&task_rows()).expect("serialize rows");
        (
            self.write("schema.json", TASK_SCHEMA),
            self.write("table.json", config),
            self.write("rows.json", &rows),
        )
    }
}

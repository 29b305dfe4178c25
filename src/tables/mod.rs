//! Relational table model
//!
//! In-memory append-only tables populated during a scan and handed to the
//! CSV exporter once every file has finished. Surrogate ids are dense,
//! start at 1, and are assigned in table-insertion order. Because files
//! are parsed concurrently, insertion order across files follows completion
//! order, not discovery order; `renumber_stable` trades a post-scan pass
//! for byte-stable output across runs.
//!
//! Tables:
//! - `files`               one row per discovered report file
//! - `parameters`          report parameters and sub-report parameter bindings
//! - `fields`              report fields
//! - `variables`           report variables
//! - `query_strings`       report query strings
//! - `subreports`          embedded sub-report references
//! - `subreport_config`    declared extension point, never populated

pub mod export;

use std::collections::HashMap;
use std::path::PathBuf;

/// One row per discovered report file.
///
/// The absolute path is an I/O handle only; it is not exported.
#[derive(Debug, Clone)]
pub struct FileRow {
    pub id: u64,
    /// Directory of the file, relative to the scan root
    pub dir: String,
    /// Base filename
    pub name: String,
    /// Absolute path used to schedule the read
    pub abs_path: PathBuf,
}

/// A report parameter declaration, or a sub-report parameter binding when
/// `subreport_id` is set.
#[derive(Debug, Clone)]
pub struct ParameterRow {
    pub id: u64,
    pub file_id: u64,
    pub subreport_id: Option<u64>,
    pub name: String,
    /// Declared data type, last segment of the fully qualified name
    pub data_type: String,
    /// Sanitized default-value expression, empty if absent or not String-typed
    pub value: String,
}

/// A report field declaration
#[derive(Debug, Clone)]
pub struct FieldRow {
    pub id: u64,
    pub file_id: u64,
    pub name: String,
    pub data_type: String,
}

/// A report variable declaration
#[derive(Debug, Clone)]
pub struct VariableRow {
    pub id: u64,
    pub file_id: u64,
    pub name: String,
    pub data_type: String,
    /// Sanitized initial-value expression
    pub value: String,
}

/// A report query string
#[derive(Debug, Clone)]
pub struct QueryStringRow {
    pub id: u64,
    pub file_id: u64,
    pub value: String,
}

/// An embedded sub-report reference
#[derive(Debug, Clone)]
pub struct SubreportRow {
    pub id: u64,
    pub file_id: u64,
    /// Ancestor tag names, root-side first, stopping below the document root
    pub location: Vec<String>,
    /// Display name gathered from the nearest ancestor carrying one
    pub name: String,
    /// `key` attribute of the nested report-element child
    pub key: String,
    /// Print-when expression gathered from the nearest ancestor level
    pub print_when: String,
    /// Sanitized sub-report expression identifying the invoked document
    pub expression: String,
    /// True when the parameter map is exactly the implicit report map
    pub param_map: bool,
    /// Custom parameter-map expression; empty when `param_map` is set
    pub param_map_expression: String,
}

impl SubreportRow {
    /// The location stack serialized the way the CSV export presents it
    pub fn xpath(&self) -> String {
        self.location.join("/")
    }
}

/// Declared extension point for resolving which concrete file a sub-report
/// expression evaluates to under a given parameter combination. The
/// resolution algorithm is future work; only the shape is modeled and the
/// core scan never inserts rows.
#[derive(Debug, Clone)]
pub struct SubreportConfigRow {
    pub id: u64,
    pub subreport_id: u64,
    pub is_default: bool,
    pub param_name: String,
    pub value: String,
    pub target_file_id: u64,
}

/// Table selector for the CSV export filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum TableKind {
    Files,
    Parameters,
    Fields,
    Variables,
    QueryStrings,
    Subreports,
    SubreportConfig,
}

impl TableKind {
    /// Table name as used for export filenames
    pub fn name(self) -> &'static str {
        match self {
            TableKind::Files => "files",
            TableKind::Parameters => "parameters",
            TableKind::Fields => "fields",
            TableKind::Variables => "variables",
            TableKind::QueryStrings => "query_strings",
            TableKind::Subreports => "subreports",
            TableKind::SubreportConfig => "subreport_config",
        }
    }
}

/// A named table view ready for serialization: fixed header, stringified
/// rows whose cell order matches the header.
#[derive(Debug)]
pub struct ExportView {
    pub kind: TableKind,
    pub header: &'static [&'static str],
    pub rows: Vec<Vec<String>>,
}

/// Append-only store for every table populated by a scan
#[derive(Debug, Default)]
pub struct Tables {
    pub files: Vec<FileRow>,
    pub parameters: Vec<ParameterRow>,
    pub fields: Vec<FieldRow>,
    pub variables: Vec<VariableRow>,
    pub query_strings: Vec<QueryStringRow>,
    pub subreports: Vec<SubreportRow>,
    pub subreport_config: Vec<SubreportConfigRow>,
}

impl Tables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a discovered file before its read is scheduled.
    /// Returns the file's surrogate id.
    pub fn register_file(&mut self, dir: String, name: String, abs_path: PathBuf) -> u64 {
        let id = self.files.len() as u64 + 1;
        self.files.push(FileRow {
            id,
            dir,
            name,
            abs_path,
        });
        id
    }

    pub fn push_parameter(
        &mut self,
        file_id: u64,
        subreport_id: Option<u64>,
        name: String,
        data_type: String,
        value: String,
    ) -> u64 {
        let id = self.parameters.len() as u64 + 1;
        self.parameters.push(ParameterRow {
            id,
            file_id,
            subreport_id,
            name,
            data_type,
            value,
        });
        id
    }

    pub fn push_field(&mut self, file_id: u64, name: String, data_type: String) -> u64 {
        let id = self.fields.len() as u64 + 1;
        self.fields.push(FieldRow {
            id,
            file_id,
            name,
            data_type,
        });
        id
    }

    pub fn push_variable(
        &mut self,
        file_id: u64,
        name: String,
        data_type: String,
        value: String,
    ) -> u64 {
        let id = self.variables.len() as u64 + 1;
        self.variables.push(VariableRow {
            id,
            file_id,
            name,
            data_type,
            value,
        });
        id
    }

    pub fn push_query_string(&mut self, file_id: u64, value: String) -> u64 {
        let id = self.query_strings.len() as u64 + 1;
        self.query_strings.push(QueryStringRow { id, file_id, value });
        id
    }

    #[allow(clippy::too_many_arguments)]
    pub fn push_subreport(
        &mut self,
        file_id: u64,
        location: Vec<String>,
        name: String,
        key: String,
        print_when: String,
        expression: String,
        param_map: bool,
        param_map_expression: String,
    ) -> u64 {
        let id = self.subreports.len() as u64 + 1;
        self.subreports.push(SubreportRow {
            id,
            file_id,
            location,
            name,
            key,
            print_when,
            expression,
            param_map,
            param_map_expression,
        });
        id
    }

    /// Total number of non-file rows
    pub fn row_count(&self) -> usize {
        self.parameters.len()
            + self.fields.len()
            + self.variables.len()
            + self.query_strings.len()
            + self.subreports.len()
            + self.subreport_config.len()
    }

    /// Verify referential integrity: every child row references a file row
    /// registered in this run, and every sub-report reference resolves.
    pub fn check_integrity(&self) -> std::result::Result<(), String> {
        let max_file = self.files.len() as u64;
        let max_subreport = self.subreports.len() as u64;

        let file_ok = |id: u64| id >= 1 && id <= max_file;
        let sub_ok = |id: u64| id >= 1 && id <= max_subreport;

        for row in &self.parameters {
            if !file_ok(row.file_id) {
                return Err(format!("parameter {} has orphan file_id {}", row.id, row.file_id));
            }
            if let Some(sid) = row.subreport_id {
                if !sub_ok(sid) {
                    return Err(format!("parameter {} has orphan subreport_id {}", row.id, sid));
                }
            }
        }
        for row in &self.fields {
            if !file_ok(row.file_id) {
                return Err(format!("field {} has orphan file_id {}", row.id, row.file_id));
            }
        }
        for row in &self.variables {
            if !file_ok(row.file_id) {
                return Err(format!("variable {} has orphan file_id {}", row.id, row.file_id));
            }
        }
        for row in &self.query_strings {
            if !file_ok(row.file_id) {
                return Err(format!("query string {} has orphan file_id {}", row.id, row.file_id));
            }
        }
        for row in &self.subreports {
            if !file_ok(row.file_id) {
                return Err(format!("subreport {} has orphan file_id {}", row.id, row.file_id));
            }
        }
        for row in &self.subreport_config {
            if !sub_ok(row.subreport_id) {
                return Err(format!(
                    "subreport_config {} has orphan subreport_id {}",
                    row.id, row.subreport_id
                ));
            }
        }
        Ok(())
    }

    /// Re-sort every child table by owning file id (stable, preserving the
    /// deterministic within-file order) and reassign dense surrogate ids.
    ///
    /// File ids are already deterministic because discovery paths are sorted
    /// before registration; this pass makes the child tables byte-stable
    /// across runs as well.
    pub fn renumber_stable(&mut self) {
        self.subreports.sort_by_key(|r| r.file_id);
        let mut subreport_ids: HashMap<u64, u64> = HashMap::with_capacity(self.subreports.len());
        for (index, row) in self.subreports.iter_mut().enumerate() {
            let new_id = index as u64 + 1;
            subreport_ids.insert(row.id, new_id);
            row.id = new_id;
        }

        self.parameters.sort_by_key(|r| r.file_id);
        for (index, row) in self.parameters.iter_mut().enumerate() {
            row.id = index as u64 + 1;
            if let Some(old) = row.subreport_id {
                row.subreport_id = subreport_ids.get(&old).copied();
            }
        }

        self.fields.sort_by_key(|r| r.file_id);
        for (index, row) in self.fields.iter_mut().enumerate() {
            row.id = index as u64 + 1;
        }

        self.variables.sort_by_key(|r| r.file_id);
        for (index, row) in self.variables.iter_mut().enumerate() {
            row.id = index as u64 + 1;
        }

        self.query_strings.sort_by_key(|r| r.file_id);
        for (index, row) in self.query_strings.iter_mut().enumerate() {
            row.id = index as u64 + 1;
        }

        for (index, row) in self.subreport_config.iter_mut().enumerate() {
            row.id = index as u64 + 1;
            if let Some(new_id) = subreport_ids.get(&row.subreport_id) {
                row.subreport_id = *new_id;
            }
        }
    }

    /// Produce the ordered list of named table views for export.
    pub fn export_views(&self) -> Vec<ExportView> {
        vec![
            ExportView {
                kind: TableKind::Files,
                header: &["id", "path", "filename"],
                rows: self
                    .files
                    .iter()
                    .map(|r| vec![r.id.to_string(), r.dir.clone(), r.name.clone()])
                    .collect(),
            },
            ExportView {
                kind: TableKind::Parameters,
                header: &["id", "file_id", "subreport_id", "name", "data_type", "value"],
                rows: self
                    .parameters
                    .iter()
                    .map(|r| {
                        vec![
                            r.id.to_string(),
                            r.file_id.to_string(),
                            r.subreport_id.map(|s| s.to_string()).unwrap_or_default(),
                            r.name.clone(),
                            r.data_type.clone(),
                            r.value.clone(),
                        ]
                    })
                    .collect(),
            },
            ExportView {
                kind: TableKind::Fields,
                header: &["id", "file_id", "name", "data_type"],
                rows: self
                    .fields
                    .iter()
                    .map(|r| {
                        vec![
                            r.id.to_string(),
                            r.file_id.to_string(),
                            r.name.clone(),
                            r.data_type.clone(),
                        ]
                    })
                    .collect(),
            },
            ExportView {
                kind: TableKind::Variables,
                header: &["id", "file_id", "name", "data_type", "value"],
                rows: self
                    .variables
                    .iter()
                    .map(|r| {
                        vec![
                            r.id.to_string(),
                            r.file_id.to_string(),
                            r.name.clone(),
                            r.data_type.clone(),
                            r.value.clone(),
                        ]
                    })
                    .collect(),
            },
            ExportView {
                kind: TableKind::QueryStrings,
                header: &["id", "file_id", "value"],
                rows: self
                    .query_strings
                    .iter()
                    .map(|r| vec![r.id.to_string(), r.file_id.to_string(), r.value.clone()])
                    .collect(),
            },
            ExportView {
                kind: TableKind::Subreports,
                header: &[
                    "id",
                    "file_id",
                    "xpath",
                    "name",
                    "key",
                    "print_when",
                    "expression",
                    "param_map",
                    "param_map_expression",
                ],
                rows: self
                    .subreports
                    .iter()
                    .map(|r| {
                        vec![
                            r.id.to_string(),
                            r.file_id.to_string(),
                            r.xpath(),
                            r.name.clone(),
                            r.key.clone(),
                            r.print_when.clone(),
                            r.expression.clone(),
                            if r.param_map { "Y".to_string() } else { String::new() },
                            r.param_map_expression.clone(),
                        ]
                    })
                    .collect(),
            },
            ExportView {
                kind: TableKind::SubreportConfig,
                header: &["id", "subreport_id", "is_default", "param_name", "value", "target_file_id"],
                rows: self
                    .subreport_config
                    .iter()
                    .map(|r| {
                        vec![
                            r.id.to_string(),
                            r.subreport_id.to_string(),
                            if r.is_default { "Y".to_string() } else { String::new() },
                            r.param_name.clone(),
                            r.value.clone(),
                            r.target_file_id.to_string(),
                        ]
                    })
                    .collect(),
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tables() -> Tables {
        let mut tables = Tables::new();
        let f1 = tables.register_file("a".into(), "one.jrxml".into(), PathBuf::from("/r/a/one.jrxml"));
        let f2 = tables.register_file("b".into(), "two.jrxml".into(), PathBuf::from("/r/b/two.jrxml"));

        // Completion order interleaves files: f2 first, then f1.
        tables.push_parameter(f2, None, "P2".into(), "String".into(), "x".into());
        let s2 = tables.push_subreport(
            f2,
            vec!["detail".into(), "band".into()],
            "".into(),
            "".into(),
            "".into(),
            "sub.jasper".into(),
            true,
            String::new(),
        );
        tables.push_parameter(f2, Some(s2), "BOUND".into(), String::new(), "$F{x}".into());
        tables.push_parameter(f1, None, "P1".into(), "String".into(), "y".into());
        tables
    }

    #[test]
    fn test_ids_dense_and_insertion_ordered() {
        let tables = sample_tables();
        let ids: Vec<u64> = tables.parameters.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(tables.subreports[0].id, 1);
    }

    #[test]
    fn test_integrity_holds() {
        let tables = sample_tables();
        assert!(tables.check_integrity().is_ok());
    }

    #[test]
    fn test_integrity_catches_orphans() {
        let mut tables = sample_tables();
        tables.parameters[0].file_id = 99;
        assert!(tables.check_integrity().is_err());
    }

    #[test]
    fn test_renumber_stable_orders_by_file() {
        let mut tables = sample_tables();
        tables.renumber_stable();

        // Parameters now grouped by owning file, ids dense from 1.
        let owners: Vec<u64> = tables.parameters.iter().map(|r| r.file_id).collect();
        assert_eq!(owners, vec![1, 2, 2]);
        let ids: Vec<u64> = tables.parameters.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);

        // The binding still points at its sub-report after remapping.
        let binding = tables
            .parameters
            .iter()
            .find(|r| r.name == "BOUND")
            .unwrap();
        assert_eq!(binding.subreport_id, Some(tables.subreports[0].id));
        assert!(tables.check_integrity().is_ok());
    }

    #[test]
    fn test_export_views_shape() {
        let tables = sample_tables();
        let views = tables.export_views();
        assert_eq!(views.len(), 7);

        for view in &views {
            for row in &view.rows {
                assert_eq!(row.len(), view.header.len());
            }
        }

        let subreports = views
            .iter()
            .find(|v| v.kind == TableKind::Subreports)
            .unwrap();
        assert_eq!(subreports.rows[0][2], "detail/band");
        assert_eq!(subreports.rows[0][7], "Y");

        // Extension point exports header-only.
        let config = views
            .iter()
            .find(|v| v.kind == TableKind::SubreportConfig)
            .unwrap();
        assert!(config.rows.is_empty());
    }
}

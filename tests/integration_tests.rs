//! Integration tests for jrxml-scanner
//!
//! End-to-end scans over generated fixture trees, exercising discovery,
//! admission-gated reads, extraction, table integrity, and CSV export.

use jrxml_scanner::config::ScanConfig;
use jrxml_scanner::error::ScanError;
use jrxml_scanner::tables::export::export_tables;
use jrxml_scanner::tables::TableKind;
use jrxml_scanner::walker::ScanCoordinator;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

const MAIN_REPORT: &str = r#"<jasperReport name="main">
    <parameter name="START_DATE" class="java.util.Date"/>
    <parameter name="TITLE" class="java.lang.String">
        <defaultValueExpression>"Quarterly" + " Sales"</defaultValueExpression>
    </parameter>
    <queryString><![CDATA[SELECT region, amount FROM sales]]></queryString>
    <field name="region" class="java.lang.String"/>
    <field name="amount" class="java.math.BigDecimal"/>
    <variable name="total" class="java.lang.Double">
        <initialValueExpression>0.0</initialValueExpression>
    </variable>
    <detail>
        <band name="detailBand">
            <subreport>
                <reportElement key="regionDetail"/>
                <subreportParameter name="REGION">
                    <subreportParameterExpression>$F{region}</subreportParameterExpression>
                </subreportParameter>
                <parametersMapExpression>$P{REPORT_PARAMETERS_MAP}</parametersMapExpression>
                <subreportExpression>"region_detail.jasper"</subreportExpression>
            </subreport>
            <printWhenExpression>$F{amount} != null</printWhenExpression>
        </band>
    </detail>
</jasperReport>"#;

const NESTED_REPORT: &str = r#"<jasperReport name="nested">
    <parameter name="YEAR" class="java.lang.Integer"/>
    <summary>
        <group name="outerGroup">
            <band name="innerBand">
                <frame>
                    <subreport>
                        <parametersMapExpression>new java.util.HashMap()</parametersMapExpression>
                        <subreportExpression>"summary.jasper"</subreportExpression>
                    </subreport>
                </frame>
            </band>
        </group>
    </summary>
</jasperReport>"#;

const PLAIN_REPORT: &str = r#"<jasperReport name="plain">
    <field name="id" class="java.lang.Long"/>
</jasperReport>"#;

fn config_for(root: &Path) -> ScanConfig {
    ScanConfig {
        root_dir: root.to_path_buf(),
        extension: "jrxml".to_string(),
        max_in_flight: 4,
        output_dir: root.join("tables"),
        table_selection: None,
        stable_ids: false,
        show_progress: false,
        verbose: false,
    }
}

fn write_fixture_tree(root: &Path) {
    fs::create_dir_all(root.join("billing/q1")).unwrap();
    fs::create_dir_all(root.join("summary")).unwrap();
    fs::write(root.join("billing/main.jrxml"), MAIN_REPORT).unwrap();
    fs::write(root.join("billing/q1/plain.jrxml"), PLAIN_REPORT).unwrap();
    fs::write(root.join("summary/nested.jrxml"), NESTED_REPORT).unwrap();
    fs::write(root.join("summary/notes.txt"), "not a report").unwrap();
}

#[tokio::test]
async fn test_full_scan_populates_tables() {
    let dir = tempdir().unwrap();
    write_fixture_tree(dir.path());

    let outcome = ScanCoordinator::new(config_for(dir.path()))
        .run()
        .await
        .unwrap();
    let tables = outcome.tables;

    // Three matching files; the .txt is ignored. Discovery is sorted, so
    // file ids are deterministic.
    assert_eq!(outcome.report.files_scanned, 3);
    assert_eq!(tables.files.len(), 3);
    let names: Vec<&str> = tables.files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["main.jrxml", "plain.jrxml", "nested.jrxml"]);
    assert_eq!(tables.files[0].dir, "billing");
    assert_eq!(tables.files[1].dir, "billing/q1");

    tables.check_integrity().unwrap();

    let main_id = tables.files[0].id;
    let nested_id = tables.files[2].id;

    // Flat extractors.
    let main_params: Vec<_> = tables
        .parameters
        .iter()
        .filter(|p| p.file_id == main_id && p.subreport_id.is_none())
        .collect();
    assert_eq!(main_params.len(), 2);
    assert_eq!(main_params[1].name, "TITLE");
    assert_eq!(main_params[1].value, "Quarterly Sales");

    assert_eq!(tables.fields.iter().filter(|f| f.file_id == main_id).count(), 2);
    assert_eq!(tables.variables.len(), 1);
    assert_eq!(tables.query_strings.len(), 1);
    assert_eq!(tables.query_strings[0].value, "SELECT region, amount FROM sales");

    // Sub-report engine: main report.
    let main_sub = tables
        .subreports
        .iter()
        .find(|s| s.file_id == main_id)
        .unwrap();
    assert_eq!(main_sub.expression, "region_detail.jasper");
    assert_eq!(main_sub.key, "regionDetail");
    assert_eq!(main_sub.name, "detailBand");
    assert_eq!(main_sub.print_when, "$F{amount} != null");
    assert!(main_sub.param_map);
    assert!(main_sub.param_map_expression.is_empty());
    assert_eq!(main_sub.location, vec!["detail".to_string(), "band".to_string()]);

    let bindings: Vec<_> = tables
        .parameters
        .iter()
        .filter(|p| p.subreport_id == Some(main_sub.id))
        .collect();
    assert_eq!(bindings.len(), 1);
    assert_eq!(bindings[0].name, "REGION");
    assert_eq!(bindings[0].file_id, main_id);

    // Sub-report engine: nested report. The nearest named ancestor wins
    // and the location stack stops below the document root.
    let nested_sub = tables
        .subreports
        .iter()
        .find(|s| s.file_id == nested_id)
        .unwrap();
    assert_eq!(nested_sub.name, "innerBand");
    assert!(!nested_sub.param_map);
    assert_eq!(nested_sub.param_map_expression, "new java.util.HashMap()");
    assert_eq!(
        nested_sub.location,
        vec![
            "summary".to_string(),
            "group".to_string(),
            "band".to_string(),
            "frame".to_string()
        ]
    );

    // The extension point stays empty.
    assert!(tables.subreport_config.is_empty());
}

#[tokio::test]
async fn test_malformed_file_fails_run_without_emission() {
    let dir = tempdir().unwrap();
    write_fixture_tree(dir.path());
    fs::write(dir.path().join("billing/broken.jrxml"), "<jasperReport><unclosed>").unwrap();

    let err = ScanCoordinator::new(config_for(dir.path()))
        .run()
        .await
        .unwrap_err();

    match err {
        ScanError::Files { failures } => {
            assert_eq!(failures.len(), 1);
            assert!(failures[0]
                .error
                .path()
                .ends_with(PathBuf::from("billing/broken.jrxml")));
        }
        other => panic!("expected file failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_root_aborts_walk() {
    let dir = tempdir().unwrap();
    let mut config = config_for(dir.path());
    config.root_dir = dir.path().join("missing");

    let err = ScanCoordinator::new(config).run().await.unwrap_err();
    assert!(matches!(err, ScanError::Walk(_)));
}

#[tokio::test]
async fn test_empty_tree_yields_empty_tables() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("a/b")).unwrap();

    let outcome = ScanCoordinator::new(config_for(dir.path()))
        .run()
        .await
        .unwrap();
    assert_eq!(outcome.report.files_scanned, 0);
    assert_eq!(outcome.tables.row_count(), 0);
}

#[tokio::test]
async fn test_rescan_is_idempotent_with_stable_ids() {
    let dir = tempdir().unwrap();
    write_fixture_tree(dir.path());

    let mut config = config_for(dir.path());
    config.stable_ids = true;

    let first = ScanCoordinator::new(config.clone()).run().await.unwrap();
    let second = ScanCoordinator::new(config).run().await.unwrap();

    let first_views = first.tables.export_views();
    let second_views = second.tables.export_views();
    assert_eq!(first_views.len(), second_views.len());
    for (a, b) in first_views.iter().zip(second_views.iter()) {
        assert_eq!(a.rows, b.rows, "table {} differs between runs", a.kind.name());
    }

    first.tables.check_integrity().unwrap();
}

#[tokio::test]
async fn test_export_writes_selected_csv_files() {
    let dir = tempdir().unwrap();
    write_fixture_tree(dir.path());

    let config = config_for(dir.path());
    let outcome = ScanCoordinator::new(config.clone()).run().await.unwrap();

    let written = export_tables(
        &outcome.tables,
        &config.output_dir,
        Some(&[TableKind::Files, TableKind::Subreports]),
    )
    .unwrap();
    assert_eq!(written.len(), 2);

    let subreports_csv =
        fs::read_to_string(config.output_dir.join("subreports.csv")).unwrap();
    let mut lines = subreports_csv.lines();
    assert_eq!(
        lines.next().unwrap(),
        "id,file_id,xpath,name,key,print_when,expression,param_map,param_map_expression"
    );
    assert!(subreports_csv.contains("detail/band"));
    assert!(subreports_csv.contains("region_detail.jasper"));
}

#[tokio::test]
async fn test_many_files_respect_admission_ceiling() {
    let dir = tempdir().unwrap();
    for i in 0..40 {
        let sub = dir.path().join(format!("part{}", i % 5));
        fs::create_dir_all(&sub).unwrap();
        fs::write(sub.join(format!("r{i}.jrxml")), PLAIN_REPORT).unwrap();
    }

    let mut config = config_for(dir.path());
    config.max_in_flight = 2;

    let outcome = ScanCoordinator::new(config).run().await.unwrap();
    assert_eq!(outcome.report.files_scanned, 40);
    assert_eq!(outcome.tables.fields.len(), 40);
    outcome.tables.check_integrity().unwrap();
}

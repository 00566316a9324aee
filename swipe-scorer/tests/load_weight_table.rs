//! Loading weight tables from JSON files on disk.

use camino::Utf8PathBuf;
use rstest::{fixture, rstest};
use swipe_core::WeightTableError;
use swipe_scorer::{WeightTableLoadError, load_weight_table};
use tempfile::TempDir;

#[fixture]
fn workspace() -> (TempDir, Utf8PathBuf) {
    let dir = TempDir::new().expect("tempdir");
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf8 tempdir");
    (dir, root)
}

fn write(root: &Utf8PathBuf, name: &str, contents: &str) -> Utf8PathBuf {
    let path = root.join(name);
    std::fs::write(path.as_std_path(), contents).expect("write fixture");
    path
}

#[rstest]
fn loads_rows_in_order(workspace: (TempDir, Utf8PathBuf)) {
    let (_guard, root) = workspace;
    let path = write(
        &root,
        "points.json",
        r#"[
            {"category": "interest", "name": "travel", "points": 10},
            {"category": "age", "name": "25", "points": 5}
        ]"#,
    );

    let table = load_weight_table(&path).expect("load table");

    assert_eq!(table.len(), 2);
    assert_eq!(table.entries()[0].name, "travel");
}

#[rstest]
fn missing_file_is_a_read_error(workspace: (TempDir, Utf8PathBuf)) {
    let (_guard, root) = workspace;
    let err = load_weight_table(&root.join("absent.json")).expect_err("missing file");
    assert!(matches!(err, WeightTableLoadError::Read { .. }));
}

#[rstest]
fn malformed_json_is_a_parse_error(workspace: (TempDir, Utf8PathBuf)) {
    let (_guard, root) = workspace;
    let path = write(&root, "points.json", r#"{"category": "age"}"#);
    let err = load_weight_table(&path).expect_err("object instead of array");
    assert!(matches!(err, WeightTableLoadError::Parse { .. }));
}

#[rstest]
fn blank_names_are_invalid(workspace: (TempDir, Utf8PathBuf)) {
    let (_guard, root) = workspace;
    let path = write(
        &root,
        "points.json",
        r#"[{"category": "age", "name": "  ", "points": 1}]"#,
    );
    let err = load_weight_table(&path).expect_err("blank name");
    assert!(matches!(
        err,
        WeightTableLoadError::Invalid {
            source: WeightTableError::BlankName { index: 0 },
            ..
        }
    ));
}

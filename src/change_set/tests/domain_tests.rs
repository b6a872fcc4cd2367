//! Domain-focused tests for file paths and change sets.

use crate::change_set::domain::{ChangeSet, ChangeSetError, FileAction, FileChange, FilePath};
use rstest::rstest;

#[rstest]
#[case("src/app.py", "src/app.py")]
#[case("  /src/app.py  ", "src/app.py")]
#[case("//etc/config.yaml", "etc/config.yaml")]
#[case(".env", ".env")]
fn file_path_normalizes_input(#[case] raw: &str, #[case] expected: &str) {
    let path = FilePath::new(raw).expect("valid path");
    assert_eq!(path.as_str(), expected);
}

#[rstest]
#[case("", ChangeSetError::EmptyPath)]
#[case("   ", ChangeSetError::EmptyPath)]
#[case("/", ChangeSetError::EmptyPath)]
#[case("src/my file.py", ChangeSetError::WhitespaceInPath("src/my file.py".to_owned()))]
#[case("../secrets.txt", ChangeSetError::ParentTraversal("../secrets.txt".to_owned()))]
fn file_path_rejects_invalid_input(#[case] raw: &str, #[case] expected: ChangeSetError) {
    assert_eq!(FilePath::new(raw), Err(expected));
}

#[rstest]
fn file_path_reports_file_name() {
    let path = FilePath::new("app/Http/Controllers/UserController.php").expect("valid path");
    assert_eq!(path.file_name(), "UserController.php");
}

#[rstest]
fn file_path_deserialization_normalizes() {
    let path: FilePath = serde_json::from_str("\"/docs/readme.md\"").expect("valid json");
    assert_eq!(path.as_str(), "docs/readme.md");

    let rejected = serde_json::from_str::<FilePath>("\"  \"");
    assert!(rejected.is_err());
}

#[rstest]
fn file_change_defaults_to_create_and_trims_content() {
    let change = FileChange::new(FilePath::new("a.py").expect("valid path"), "\n\nprint(1)\n  ");

    assert_eq!(change.action(), FileAction::Create);
    assert_eq!(change.content(), "print(1)");
    assert_eq!(change.size(), 8);
}

#[rstest]
#[case("create", FileAction::Create)]
#[case("MODIFY", FileAction::Modify)]
#[case(" delete ", FileAction::Delete)]
fn file_action_parses_known_values(#[case] raw: &str, #[case] expected: FileAction) {
    assert_eq!(FileAction::try_from(raw), Ok(expected));
    assert_eq!(FileAction::try_from(expected.as_str()), Ok(expected));
}

#[rstest]
fn file_action_rejects_unknown_value() {
    assert_eq!(
        FileAction::try_from("rename"),
        Err(ChangeSetError::UnknownAction("rename".to_owned()))
    );
}

#[rstest]
fn change_set_keeps_first_change_per_path() {
    let path = FilePath::new("x.py").expect("valid path");
    let changes: ChangeSet = vec![
        FileChange::new(path.clone(), "first"),
        FileChange::new(FilePath::new("y.py").expect("valid path"), "other"),
        FileChange::new(path.clone(), "second"),
    ]
    .into_iter()
    .collect();

    assert_eq!(changes.len(), 2);
    assert_eq!(
        changes.get(&path).map(FileChange::content),
        Some("first")
    );
    let paths: Vec<&str> = changes.paths().into_iter().map(FilePath::as_str).collect();
    assert_eq!(paths, vec!["x.py", "y.py"]);
}

#[rstest]
fn change_set_serializes_as_plain_list() {
    let mut changes = ChangeSet::new();
    changes.push(FileChange::new(
        FilePath::new("a.py").expect("valid path"),
        "print(1)",
    ));

    let value = serde_json::to_value(&changes).expect("serializable");
    assert_eq!(
        value,
        serde_json::json!([{ "path": "a.py", "content": "print(1)", "action": "create" }])
    );

    let restored: ChangeSet = serde_json::from_value(value).expect("deserializable");
    assert_eq!(restored, changes);
}

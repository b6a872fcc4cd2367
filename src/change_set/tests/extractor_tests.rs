//! Tests for the cascading change-set extractor.

use crate::change_set::{
    domain::{ChangeSet, FileAction, FileChange, FilePath},
    services::ChangeSetExtractor,
};
use rstest::{fixture, rstest};

#[fixture]
fn extractor() -> ChangeSetExtractor {
    ChangeSetExtractor::new()
}

fn paths(changes: &ChangeSet) -> Vec<&str> {
    changes.iter().map(|change| change.path().as_str()).collect()
}

fn content_of<'a>(changes: &'a ChangeSet, path: &str) -> Option<&'a str> {
    let key = FilePath::new(path).expect("valid path");
    changes.get(&key).map(FileChange::content)
}

#[rstest]
fn extracts_fence_whose_info_string_is_a_path(extractor: ChangeSetExtractor) {
    let text = "Here is the change:\n\n```src/app.py\nprint(1)\n```\n\nDone.";

    let changes = extractor.extract(text);

    assert_eq!(paths(&changes), vec!["src/app.py"]);
    assert_eq!(content_of(&changes, "src/app.py"), Some("print(1)"));
    assert!(changes.iter().all(|change| change.action() == FileAction::Create));
}

#[rstest]
fn earlier_rule_wins_for_duplicate_path(extractor: ChangeSetExtractor) {
    let text = "```x.py\nA\n```\n\n### x.py\n```python\nB\n```\n";

    let changes = extractor.extract(text);

    assert_eq!(paths(&changes), vec!["x.py"]);
    assert_eq!(content_of(&changes, "x.py"), Some("A"));
}

#[rstest]
fn accumulates_rules_in_priority_order(extractor: ChangeSetExtractor) {
    let text = concat!(
        "### b.py\n",
        "```python\nprint('b')\n```\n",
        "\n",
        "```a.py\nprint('a')\n```\n",
        "\n",
        "File: c.py\n",
        "```python\nprint('c')\n```\n",
    );

    let changes = extractor.extract(text);

    assert_eq!(paths(&changes), vec!["a.py", "b.py", "c.py"]);
}

#[rstest]
#[case("```json\n{\"debug\": true}\n```")]
#[case("### json\n```\n{}\n```")]
#[case("File: yaml\n```\nkey: value\n```")]
#[case("```python\nprint(1)\n```")]
fn bare_language_tags_are_never_paths(extractor: ChangeSetExtractor, #[case] text: &str) {
    assert!(extractor.extract(text).is_empty());
}

#[rstest]
fn fallback_is_skipped_when_a_primary_rule_matched(extractor: ChangeSetExtractor) {
    let text = "```a.py\nprint(1)\n```\n\n```\n// b.js\nconsole.log(1)\n```\n";

    let changes = extractor.extract(text);

    assert_eq!(paths(&changes), vec!["a.py"]);
}

#[rstest]
#[case("```javascript\n// src/index.js\nconsole.log(1)\n```", "src/index.js", "console.log(1)")]
#[case("```python\n# File: app/main.py\nprint(1)\n```", "app/main.py", "print(1)")]
#[case("```css\n/* styles/site.css */\nbody {}\n```", "styles/site.css", "body {}")]
#[case("```html\n<!-- templates/index.html -->\n<div></div>\n```", "templates/index.html", "<div></div>")]
fn fallback_reads_leading_comment(
    extractor: ChangeSetExtractor,
    #[case] text: &str,
    #[case] expected_path: &str,
    #[case] expected_content: &str,
) {
    let changes = extractor.extract(text);

    assert_eq!(paths(&changes), vec![expected_path]);
    assert_eq!(content_of(&changes, expected_path), Some(expected_content));
}

#[rstest]
#[case("```\n#!/usr/bin/env python\nprint(1)\n```")]
#[case("```c\n#include <stdio.h>\nint main(void) { return 0; }\n```")]
#[case("```\n// increment the counter\ncount += 1;\n```")]
fn fallback_ignores_comments_that_do_not_name_a_file(
    extractor: ChangeSetExtractor,
    #[case] text: &str,
) {
    assert!(extractor.extract(text).is_empty());
}

#[rstest]
fn labelled_path_line_names_following_block(extractor: ChangeSetExtractor) {
    let text = "File: src/main.rs\n```rust\nfn main() {}\n```";

    let changes = extractor.extract(text);

    assert_eq!(paths(&changes), vec!["src/main.rs"]);
    assert_eq!(content_of(&changes, "src/main.rs"), Some("fn main() {}"));
}

#[rstest]
fn bold_heading_with_blank_line_names_following_block(extractor: ChangeSetExtractor) {
    let text = "**`app/models/user.rb`**\n\n```ruby\nclass User; end\n```";

    let changes = extractor.extract(text);

    assert_eq!(paths(&changes), vec!["app/models/user.rb"]);
}

#[rstest]
fn unterminated_fence_runs_to_end_of_text(extractor: ChangeSetExtractor) {
    let changes = extractor.extract("```a.py\nprint(1)\n");

    assert_eq!(content_of(&changes, "a.py"), Some("print(1)"));
}

#[rstest]
#[case("")]
#[case("I could not determine what to change.")]
#[case("Run `cargo test` afterwards.")]
fn text_without_blocks_yields_empty_change_set(extractor: ChangeSetExtractor, #[case] text: &str) {
    assert!(extractor.extract(text).is_empty());
}

#[rstest]
#[case("```/src/a.ts\nexport {};\n```")]
#[case("### /lib/util.dart\n```dart\nvoid main() {}\n```")]
#[case("Path:   //config/app.yaml\n```yaml\nname: app\n```")]
#[case("```\n// /public/index.js\nrun();\n```")]
#[case("```  \nno path here\n```\n### \n```\n```")]
fn extracted_paths_are_non_empty_and_relative(extractor: ChangeSetExtractor, #[case] text: &str) {
    let changes = extractor.extract(text);

    for change in &changes {
        let path = change.path().as_str();
        assert!(!path.is_empty(), "path must not be empty");
        assert!(!path.starts_with('/'), "path '{path}' must be relative");
    }
}

#[rstest]
fn leading_slash_is_stripped(extractor: ChangeSetExtractor) {
    let changes = extractor.extract("```/src/a.ts\nexport {};\n```");

    assert_eq!(paths(&changes), vec!["src/a.ts"]);
}

#[rstest]
fn multi_file_response_preserves_text_order(extractor: ChangeSetExtractor) {
    let text = concat!(
        "I'll add a controller and a route.\n\n",
        "```app/Http/Controllers/AuthController.php\n<?php\nclass AuthController {}\n```\n\n",
        "Then register it:\n\n",
        "```routes/api.php\n<?php\nRoute::post('/login', [AuthController::class, 'login']);\n```\n",
    );

    let changes = extractor.extract(text);

    assert_eq!(
        paths(&changes),
        vec!["app/Http/Controllers/AuthController.php", "routes/api.php"]
    );
}

//! Prompt rendering tests.

use super::fixtures::{FixedClock, local_project, path, remote_project, task_for};
use crate::task::{
    domain::{ProjectFile, Task},
    services::{
        PromptBuilder, QUOTED_FILE_CHARS, QUOTED_LOCAL_FILES, local_excerpts, repository_listing,
    },
};
use crate::vcs::domain::{ContentEntry, ContentKind};
use rstest::{fixture, rstest};

#[fixture]
fn prompts() -> PromptBuilder {
    PromptBuilder::new()
}

fn entry(name: &str, kind: ContentKind) -> ContentEntry {
    ContentEntry {
        name: name.to_owned(),
        path: name.to_owned(),
        kind,
    }
}

#[rstest]
fn task_prompt_describes_project_and_task(prompts: PromptBuilder) {
    let project = remote_project();
    let task = task_for(&project, "Add login");

    let request = prompts.task_request(&project, &task).expect("renders");

    assert_eq!(request.session_id(), format!("task-execution-{}", task.id()));
    let system = request.system_prompt();
    assert!(system.starts_with("You are an expert Python, Flask developer."));
    assert!(system.contains("You are working on the project: storefront"));
    assert!(system.contains("Project description: Online shop"));
    assert!(system.contains("Project summary: Not analyzed yet"));
    assert!(system.contains("```filename.ext"));
    assert_eq!(
        request.user_prompt(),
        "Task: Add login\n\nDescription: Make it work\n\n\
         Please implement this task and provide the complete solution."
    );
}

#[rstest]
fn task_prompt_uses_placeholders_for_missing_text(prompts: PromptBuilder) {
    let mut project = local_project();
    project.record_summary("A scratch area.", &FixedClock);
    let task = Task::new(project.id(), project.owner(), "Tidy up", &FixedClock).expect("valid");

    let request = prompts.task_request(&project, &task).expect("renders");

    assert!(request.system_prompt().contains("Project description: No description"));
    assert!(request.system_prompt().contains("Project summary: A scratch area."));
    assert!(request.user_prompt().contains("Description: No additional details"));
}

#[rstest]
fn analysis_prompt_embeds_file_context(prompts: PromptBuilder) {
    let project = remote_project();

    let request = prompts
        .analysis_request(&project, "Repository files: app.py")
        .expect("renders");

    assert_eq!(request.session_id(), format!("project-analysis-{}", project.id()));
    assert!(request.system_prompt().starts_with("You are an expert software architect."));
    assert!(request.user_prompt().starts_with("Analyze this Python, Flask project:"));
    assert!(request.user_prompt().contains("Project Name: storefront"));
    assert!(request.user_prompt().contains("\n\nRepository files: app.py\n\n"));
    assert!(request.user_prompt().ends_with("Provide a comprehensive analysis."));
}

#[rstest]
fn listing_names_files_only() {
    let entries = [
        entry("README.md", ContentKind::File),
        entry("src", ContentKind::Dir),
        entry("setup.py", ContentKind::File),
    ];

    assert_eq!(repository_listing(&entries), "Repository files: README.md, setup.py");
}

#[rstest]
fn empty_listing_yields_no_context() {
    assert_eq!(repository_listing(&[entry("src", ContentKind::Dir)]), "");
}

#[rstest]
fn excerpts_are_bounded() {
    let long = "x".repeat(QUOTED_FILE_CHARS + 10);
    let files: Vec<ProjectFile> = (0..QUOTED_LOCAL_FILES + 5)
        .map(|index| ProjectFile::new(path(&format!("f{index}.txt")), long.as_str()))
        .collect();

    let excerpts = local_excerpts(&files);

    assert_eq!(excerpts.matches("\n--- ").count(), QUOTED_LOCAL_FILES);
    assert!(excerpts.starts_with(&format!("\n--- f0.txt ---\n{}\n", "x".repeat(QUOTED_FILE_CHARS))));
    assert!(!excerpts.contains(&format!("f{QUOTED_LOCAL_FILES}.txt")));
}

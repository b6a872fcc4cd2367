//! Prompt rendering for task delivery and project analysis.

use minijinja::{Environment, context};
use thiserror::Error;

use crate::task::domain::{Project, ProjectFile, Task};
use crate::task::ports::GenerationRequest;
use crate::vcs::domain::{ContentEntry, ContentKind};

/// Number of root entries named in a repository listing.
pub const LISTED_REPOSITORY_FILES: usize = 50;

/// Number of local files quoted in an analysis prompt.
pub const QUOTED_LOCAL_FILES: usize = 20;

/// Characters quoted from each local file.
pub const QUOTED_FILE_CHARS: usize = 2000;

const TASK_SYSTEM_TEMPLATE: &str = r"You are an expert {{ tech_stack | join(', ') }} developer.
You are working on the project: {{ name }}
Project description: {% if description %}{{ description }}{% else %}No description{% endif %}
Project summary: {% if summary %}{{ summary }}{% else %}Not analyzed yet{% endif %}

Your task is to implement the requested feature or fix. Provide:
1. A clear explanation of the approach
2. The code changes needed (with file paths)
3. Any dependencies or migrations required
4. Testing suggestions

Format code changes as:
```filename.ext
// code here
```";

const TASK_USER_TEMPLATE: &str = r"Task: {{ title }}

Description: {% if description %}{{ description }}{% else %}No additional details{% endif %}

Please implement this task and provide the complete solution.";

const ANALYSIS_SYSTEM_PROMPT: &str = "You are an expert software architect. Analyze the provided \
project and generate a comprehensive summary including:
1. Project overview and purpose
2. Tech stack and frameworks used
3. Architecture patterns
4. Key components and their responsibilities
5. Potential areas for improvement
Be concise but thorough.";

const ANALYSIS_USER_TEMPLATE: &str = r"Analyze this {{ tech_stack | join(', ') }} project:

Project Name: {{ name }}
Description: {% if description %}{{ description }}{% else %}No description{% endif %}

{{ files }}

Provide a comprehensive analysis.";

/// Error returned when a prompt template fails to render.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("failed to render {template} prompt: {reason}")]
pub struct PromptRenderError {
    /// Template identifier.
    pub template: &'static str,
    /// Renderer message.
    pub reason: String,
}

/// Renders generation requests from project and task records.
#[derive(Debug, Default)]
pub struct PromptBuilder {
    environment: Environment<'static>,
}

impl PromptBuilder {
    /// Creates a builder with the built-in templates.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the request asking for an implementation of `task`.
    ///
    /// The session identifier is `task-execution-<task id>`.
    ///
    /// # Errors
    ///
    /// Returns [`PromptRenderError`] when a template fails to render.
    pub fn task_request(
        &self,
        project: &Project,
        task: &Task,
    ) -> Result<GenerationRequest, PromptRenderError> {
        let system = self.render(
            "task_system",
            TASK_SYSTEM_TEMPLATE,
            context! {
                tech_stack => project.tech_stack(),
                name => project.name(),
                description => project.description(),
                summary => project.summary(),
            },
        )?;
        let user = self.render(
            "task_user",
            TASK_USER_TEMPLATE,
            context! {
                title => task.title(),
                description => task.description(),
            },
        )?;
        Ok(GenerationRequest::new(
            format!("task-execution-{}", task.id()),
            system,
            user,
        ))
    }

    /// Builds the request asking for an architectural summary.
    ///
    /// `files` is the gathered file context; see [`repository_listing`] and
    /// [`local_excerpts`]. The session identifier is
    /// `project-analysis-<project id>`.
    ///
    /// # Errors
    ///
    /// Returns [`PromptRenderError`] when the template fails to render.
    pub fn analysis_request(
        &self,
        project: &Project,
        files: &str,
    ) -> Result<GenerationRequest, PromptRenderError> {
        let user = self.render(
            "analysis_user",
            ANALYSIS_USER_TEMPLATE,
            context! {
                tech_stack => project.tech_stack(),
                name => project.name(),
                description => project.description(),
                files => files,
            },
        )?;
        Ok(GenerationRequest::new(
            format!("project-analysis-{}", project.id()),
            ANALYSIS_SYSTEM_PROMPT,
            user,
        ))
    }

    fn render(
        &self,
        template: &'static str,
        source: &str,
        context: minijinja::Value,
    ) -> Result<String, PromptRenderError> {
        self.environment
            .render_str(source, context)
            .map_err(|error| PromptRenderError {
                template,
                reason: error.to_string(),
            })
    }
}

/// Names the first root files of a repository listing.
///
/// Directories and other entry kinds are skipped. An empty listing yields
/// an empty string.
#[must_use]
pub fn repository_listing(entries: &[ContentEntry]) -> String {
    let names: Vec<&str> = entries
        .iter()
        .filter(|entry| entry.kind == ContentKind::File)
        .take(LISTED_REPOSITORY_FILES)
        .map(|entry| entry.name.as_str())
        .collect();
    if names.is_empty() {
        return String::new();
    }
    format!("Repository files: {}", names.join(", "))
}

/// Quotes the beginning of the first local files, each under a
/// `--- path ---` header.
#[must_use]
pub fn local_excerpts(files: &[ProjectFile]) -> String {
    files
        .iter()
        .take(QUOTED_LOCAL_FILES)
        .map(|file| {
            let excerpt: String = file.content().chars().take(QUOTED_FILE_CHARS).collect();
            format!("\n--- {} ---\n{excerpt}\n", file.path())
        })
        .collect()
}

//! Prompt compilation for the narrative generator.
//!
//! The template is fixed: top matter, the six section headers with their
//! one-line instructions, writing rules, and the PR's own text appended
//! verbatim as context. Same inputs always produce the same prompt.

use featuredoc_shared::{InferredMetadata, PullRequestFacts};

/// The six mandated sections, in document order, with their instructions.
pub const SECTIONS: [(&str, &str); 6] = [
    (
        "Previous State",
        "What existed before this change. If no meaningful prior state can be inferred, write exactly \"N/A\".",
    ),
    (
        "Why This Change Was Needed",
        "The problem, risk, or request that motivated the change.",
    ),
    (
        "Decision and Reasoning",
        "The approach that was chosen and why it was preferred.",
    ),
    (
        "What Was Done",
        "The concrete changes made. You MUST include the PR URL in this section.",
    ),
    (
        "Results",
        "The observable outcome. Do not invent metrics; if unknown, stay generic.",
    ),
    (
        "Follow-ups / Next Steps",
        "Remaining work or open questions, or \"None\" if nothing is pending.",
    ),
];

/// Exact instruction text sent to the narrative generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledPrompt(String);

impl CompiledPrompt {
    #[cfg(test)]
    pub(crate) fn raw(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for CompiledPrompt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Render the instruction block for one PR.
pub fn compile_prompt(facts: &PullRequestFacts, meta: &InferredMetadata) -> CompiledPrompt {
    let sections = SECTIONS
        .iter()
        .enumerate()
        .map(|(i, (title, instruction))| format!("{}. {title}: {instruction}", i + 1))
        .collect::<Vec<_>>()
        .join("\n");

    let body = facts
        .body
        .as_deref()
        .filter(|b| !b.trim().is_empty())
        .unwrap_or("(no description)");

    let commits = if facts.commits.is_empty() {
        "(no commits)".to_string()
    } else {
        facts
            .commits
            .iter()
            .map(|c| format!("- {} ({})", c.headline, c.short_sha))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let files = if facts.files.is_empty() {
        "(no files)".to_string()
    } else {
        facts
            .files
            .iter()
            .map(|f| format!("- {} ({})", f.path, f.status))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let labels = if facts.labels.is_empty() {
        "(none)".to_string()
    } else {
        facts.labels.join(", ")
    };

    let text = format!(
        "Generate internal feature documentation in Markdown.

Begin with this top matter exactly as given. It is NOT one of the numbered sections: do not number it and do not add a heading to it.

Filename: {filename}
Author: {author}
Task ID: {task_id}
App Area: {app_area}
Project: {project}

Then write these six sections, in this order, using these EXACT headings as `## ` headings without the numbers:

{sections}

Rules:
- Plain, neutral tone. 250-400 words total.
- Do NOT invent metrics. If something is unknown, be generic.
- Use `## ` for section headings and `- ` for bullet points. No tables, no code blocks.
- The PR URL ({url}) must appear in \"What Was Done\".

Useful context (verbatim from the pull request):

PR Title: {title}
PR Author: {author}
PR URL: {url}
Labels: {labels}
PR Body:
{body}

Commits:
{commits}

Changed files:
{files}

Likely ticket ID (if present): {task_id}",
        filename = meta.filename,
        author = meta.author,
        task_id = meta.task_id,
        app_area = meta.app_area,
        project = meta.project,
        url = facts.url,
        title = facts.title,
    );

    CompiledPrompt(text)
}

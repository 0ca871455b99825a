//! Metadata inference: task identifier, app area, and document title.
//!
//! Everything here is a pure function of the PR facts and the run timestamp.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use tracing::debug;

use featuredoc_shared::{ChangedFile, InferredMetadata, PullRequestFacts, TASK_ID_SENTINEL};

/// App area used when neither labels nor files say anything.
pub const DEFAULT_APP_AREA: &str = "general";

/// Number of title words kept in the slug.
const SLUG_TOKENS: usize = 6;

/// Ticket references such as `PROJ-123`.
static TASK_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([A-Z]{2,}-[0-9]+)\b").expect("task id regex"));

/// Labels of the form `app:<value>` or `area:<value>`.
static AREA_LABEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:app|area):(.+)$").expect("area label regex"));

/// First ticket reference in `text`, or [`TASK_ID_SENTINEL`].
pub fn extract_task_id(text: &str) -> String {
    TASK_ID_RE
        .captures(text)
        .map(|caps| caps[1].to_string())
        .unwrap_or_else(|| TASK_ID_SENTINEL.to_string())
}

/// Classify the part of the codebase a PR touches.
///
/// An `app:`/`area:` label wins outright. Otherwise the most frequent
/// top-level path segment among changed files is used, ties going to the
/// segment seen first.
pub fn infer_app_area(labels: &[String], files: &[ChangedFile]) -> String {
    let from_label = labels.iter().find_map(|label| {
        AREA_LABEL_RE
            .captures(label.trim())
            .map(|caps| caps[1].trim().to_string())
            .filter(|value| !value.is_empty())
    });
    if let Some(area) = from_label {
        return area;
    }

    let mut counts: Vec<(&str, usize)> = Vec::new();
    for file in files {
        let segment = file.path.split('/').next().unwrap_or_default();
        if segment.is_empty() {
            continue;
        }
        match counts.iter_mut().find(|(seen, _)| *seen == segment) {
            Some((_, count)) => *count += 1,
            None => counts.push((segment, 1)),
        }
    }

    let mut best: Option<(&str, usize)> = None;
    for (segment, count) in counts {
        if best.is_none_or(|(_, top)| count > top) {
            best = Some((segment, count));
        }
    }

    best.map(|(segment, _)| segment.to_string())
        .unwrap_or_else(|| DEFAULT_APP_AREA.to_string())
}

/// Lower-case, keep `[a-z0-9 -]`, take the first six words, hyphen-join.
pub fn slugify(title: &str) -> String {
    let cleaned: String = title
        .to_lowercase()
        .chars()
        .filter(|c| matches!(c, 'a'..='z' | '0'..='9' | ' ' | '-'))
        .collect();

    cleaned
        .split_whitespace()
        .take(SLUG_TOKENS)
        .collect::<Vec<_>>()
        .join("-")
}

/// Derive the document metadata for one PR at time `now`.
///
/// The filename is `<prefix>-<YYYY-MM>-<slug>`. No uniqueness check is made
/// against existing pages, so a rerun in the same month yields a duplicate.
pub fn infer_metadata(
    facts: &PullRequestFacts,
    now: DateTime<Utc>,
    title_prefix: &str,
) -> InferredMetadata {
    let mut slug = slugify(&facts.title);
    if slug.is_empty() {
        slug = format!("pr-{}", facts.number);
    }
    let filename = format!("{title_prefix}-{}-{slug}", now.format("%Y-%m"));

    let haystack = format!("{} {}", facts.title, facts.body.as_deref().unwrap_or_default());
    let task_id = extract_task_id(&haystack);
    let app_area = infer_app_area(&facts.labels, &facts.files);

    debug!(%filename, %task_id, %app_area, "metadata inferred");

    InferredMetadata {
        filename,
        slug,
        task_id,
        app_area,
        project: facts.repo.clone(),
        author: facts.author.clone(),
        pr_url: facts.url.clone(),
        created_at: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use featuredoc_shared::FileStatus;

    fn files(paths: &[&str]) -> Vec<ChangedFile> {
        paths
            .iter()
            .map(|p| ChangedFile {
                path: p.to_string(),
                status: FileStatus::Modified,
            })
            .collect()
    }

    fn facts(title: &str, labels: &[&str], paths: &[&str]) -> PullRequestFacts {
        PullRequestFacts {
            owner: "acme".into(),
            repo: "shop".into(),
            number: 42,
            title: title.into(),
            author: "octocat".into(),
            body: None,
            url: "https://github.com/acme/shop/pull/42".into(),
            labels: labels.iter().map(|l| l.to_string()).collect(),
            commits: vec![],
            files: files(paths),
        }
    }

    #[test]
    fn task_id_first_match_or_sentinel() {
        assert_eq!(extract_task_id("Fix PROJ-12 and OPS-3"), "PROJ-12");
        assert_eq!(extract_task_id("no ticket here"), "N/A");
        assert_eq!(extract_task_id(""), "N/A");
        assert_eq!(extract_task_id("P-12 proj-12 PROJ- -12"), "N/A");
        assert_eq!(extract_task_id("(AB-1)"), "AB-1");
        assert_eq!(extract_task_id("XPROJ-123x"), "N/A");
    }

    #[test]
    fn task_id_is_verbatim_substring() {
        let re = Regex::new(r"^[A-Z]{2,}-[0-9]+$").unwrap();
        for text in [
            "Add caching layer PROJ-42",
            "refs: WEB-9001, API-1",
            "ünïcödé ÄB-1 AB-١٢ CD-7",
            "lower ab-1 only",
        ] {
            let id = extract_task_id(text);
            assert!(id == TASK_ID_SENTINEL || (re.is_match(&id) && text.contains(&id)), "{text} -> {id}");
        }
    }

    #[test]
    fn area_label_beats_files() {
        let area = infer_app_area(
            &["bug".to_string(), "area:payments".to_string()],
            &files(&["api/x.ts", "api/y.ts", "web/z.ts"]),
        );
        assert_eq!(area, "payments");
        assert_eq!(infer_app_area(&["app: mobile".to_string()], &[]), "mobile");
        assert_eq!(infer_app_area(&["area:".to_string()], &files(&["web/a"])), "web");
    }

    #[test]
    fn most_common_top_level_segment() {
        assert_eq!(infer_app_area(&[], &files(&["api/x.ts", "api/y.ts", "web/z.ts"])), "api");
        assert_eq!(infer_app_area(&[], &files(&["web/a", "api/b"])), "web");
        assert_eq!(infer_app_area(&[], &files(&["README.md"])), "README.md");
        assert_eq!(infer_app_area(&[], &[]), DEFAULT_APP_AREA);
    }

    #[test]
    fn slug_keeps_six_clean_tokens() {
        assert_eq!(slugify("Add caching layer PROJ-42"), "add-caching-layer-proj-42");
        assert_eq!(
            slugify("Refactor: the (big) auth module, again & again & again"),
            "refactor-the-big-auth-module-again"
        );
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn caching_layer_scenario() {
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap();
        let facts = facts(
            "Add caching layer PROJ-42",
            &[],
            &["cache/store.ts", "cache/evict.ts", "api/handler.ts"],
        );
        let meta = infer_metadata(&facts, now, "feature");

        assert_eq!(meta.slug, "add-caching-layer-proj-42");
        assert_eq!(meta.task_id, "PROJ-42");
        assert_eq!(meta.app_area, "cache");
        assert_eq!(meta.filename, "feature-2026-10-add-caching-layer-proj-42");
        assert_eq!(meta.project, "shop");
        assert_eq!(meta.created_at, now);
    }

    #[test]
    fn task_id_found_in_body_and_empty_slug_fallback() {
        let now = Utc.with_ymd_and_hms(2026, 1, 2, 0, 0, 0).unwrap();
        let mut facts = facts("???", &[], &[]);
        facts.body = Some("Implements OPS-77.".into());
        let meta = infer_metadata(&facts, now, "feature");
        assert_eq!(meta.task_id, "OPS-77");
        assert_eq!(meta.filename, "feature-2026-01-pr-42");
        assert_eq!(meta.app_area, "general");
    }
}

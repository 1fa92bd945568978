//! Link rendering for workloads and commits.
//!
//! Workload links come from an operator-supplied template. The template is
//! literal text with `{{ .Namespace }}`, `{{ .Kind }}` and `{{ .Name }}`
//! actions, compiled once by [`UriTemplate::parse`].

use std::sync::OnceLock;

use regex::Regex;
use tracing::warn;

use crate::domain::ResourceId;
use crate::error::TemplateError;

/// Template used when the operator does not configure one.
pub const DEFAULT_WORKLOAD_URI_TEMPLATE: &str = "http://localhost:8001/api/v1/namespaces/kubernetes-dashboard/services/https:kubernetes-dashboard:/proxy/#/";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field(String),
}

/// A compiled workload URI template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UriTemplate {
    source: String,
    segments: Vec<Segment>,
}

fn action_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\{\{(.*?)\}\}").expect("action pattern is valid"))
}

fn field_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\.([A-Za-z_][A-Za-z0-9_]*)$").expect("field pattern is valid")
    })
}

impl UriTemplate {
    /// Compile a template.
    ///
    /// Field names are not checked here; an unknown field fails when the
    /// template is executed.
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut cursor = 0;

        for captures in action_pattern().captures_iter(source) {
            let Some(whole) = captures.get(0) else {
                continue;
            };
            push_literal(&mut segments, source, cursor, whole.start())?;

            let action = captures.get(1).map_or("", |m| m.as_str()).trim();
            if action.is_empty() {
                return Err(TemplateError::EmptyAction {
                    offset: whole.start(),
                });
            }

            let field = field_pattern()
                .captures(action)
                .and_then(|c| c.get(1))
                .ok_or_else(|| TemplateError::UnsupportedAction {
                    action: action.to_string(),
                    offset: whole.start(),
                })?;
            segments.push(Segment::Field(field.as_str().to_string()));

            cursor = whole.end();
        }
        push_literal(&mut segments, source, cursor, source.len())?;

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    /// Execute the template against a workload.
    pub fn try_render(&self, id: &ResourceId) -> Result<String, TemplateError> {
        let mut out = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field(field) => {
                    let value = id.field(field).ok_or_else(|| TemplateError::UnknownField {
                        field: field.clone(),
                    })?;
                    out.push_str(value);
                }
            }
        }
        Ok(out)
    }

    /// Link for a workload, falling back to the identifier's string form when
    /// the template cannot be executed.
    pub fn render_resource_uri(&self, id: &ResourceId) -> String {
        match self.try_render(id) {
            Ok(uri) => uri,
            Err(err) => {
                warn!(
                    resource = %id,
                    template = %self.source,
                    error = %err,
                    "error on rendering resource ID through template"
                );
                id.to_string()
            }
        }
    }
}

impl Default for UriTemplate {
    fn default() -> Self {
        Self {
            source: DEFAULT_WORKLOAD_URI_TEMPLATE.to_string(),
            segments: vec![Segment::Literal(DEFAULT_WORKLOAD_URI_TEMPLATE.to_string())],
        }
    }
}

fn push_literal(
    segments: &mut Vec<Segment>,
    source: &str,
    start: usize,
    end: usize,
) -> Result<(), TemplateError> {
    let text = &source[start..end];
    if let Some(pos) = text.find("{{") {
        return Err(TemplateError::Unterminated { offset: start + pos });
    }
    if !text.is_empty() {
        segments.push(Segment::Literal(text.to_string()));
    }
    Ok(())
}

/// Link to a commit in the config repository.
pub fn render_commit_uri(vcs_root: &str, revision: &str) -> String {
    format!("{}/commit/{}", vcs_root.trim_end_matches('/'), revision)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn web() -> ResourceId {
        ResourceId::new("default", "deployment", "web")
    }

    #[test]
    fn test_render_all_fields() {
        let template =
            UriTemplate::parse("https://dash/#/{{.Kind}}/{{ .Namespace }}/{{.Name}}?x=1").unwrap();
        assert_eq!(
            template.render_resource_uri(&web()),
            "https://dash/#/deployment/default/web?x=1"
        );
    }

    #[test]
    fn test_literal_only_template() {
        let template = UriTemplate::parse("https://dash/").unwrap();
        assert_eq!(template.render_resource_uri(&web()), "https://dash/");
    }

    #[test]
    fn test_default_template_matches_parsed_default() {
        let parsed = UriTemplate::parse(DEFAULT_WORKLOAD_URI_TEMPLATE).unwrap();
        assert_eq!(parsed, UriTemplate::default());
    }

    #[test]
    fn test_compile_errors() {
        assert_eq!(
            UriTemplate::parse("https://dash/{{.Name").unwrap_err(),
            TemplateError::Unterminated { offset: 13 }
        );
        assert_eq!(
            UriTemplate::parse("a{{  }}b").unwrap_err(),
            TemplateError::EmptyAction { offset: 1 }
        );
        assert!(matches!(
            UriTemplate::parse("{{ range .Items }}").unwrap_err(),
            TemplateError::UnsupportedAction { .. }
        ));
    }

    #[test]
    fn test_unknown_field_falls_back_to_identifier() {
        let template = UriTemplate::parse("https://dash/{{.Cluster}}/{{.Name}}").unwrap();
        assert!(template.try_render(&web()).is_err());
        assert_eq!(template.render_resource_uri(&web()), "default:deployment/web");
    }

    #[test]
    fn test_commit_uri() {
        assert_eq!(
            render_commit_uri("https://github.com/org/config", "abc123"),
            "https://github.com/org/config/commit/abc123"
        );
        assert_eq!(
            render_commit_uri("https://github.com/org/config//", "abc123"),
            "https://github.com/org/config/commit/abc123"
        );
    }
}

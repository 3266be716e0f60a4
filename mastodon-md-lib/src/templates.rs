//! Template loading and rendering.

use std::path::Path;

use minijinja::{Environment, UndefinedBehavior};
use tracing::debug;

use crate::error::{Error, Result, TemplateSourceError};
use crate::model::TemplateData;

/// Markdown template used when no custom template is configured.
pub const DEFAULT_TEMPLATE: &str = include_str!("../templates/default.md");

const DEFAULT_TEMPLATE_NAME: &str = "default";

/// Prefix every line with `> ` so multi-paragraph text stays inside a
/// markdown blockquote.
fn quote(value: &str) -> String {
    value
        .lines()
        .map(|line| {
            if line.is_empty() {
                ">".to_string()
            } else {
                format!("> {line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub struct Renderer {
    env: Environment<'static>,
    name: String,
}

impl Renderer {
    /// Use the template at `path`, or the embedded default when `path` is
    /// empty.
    pub fn new(path: &str) -> Result<Self> {
        if path.is_empty() {
            return Self::from_source(DEFAULT_TEMPLATE_NAME, DEFAULT_TEMPLATE);
        }
        Self::from_file(Path::new(path))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let origin = path.display().to_string();
        let source = std::fs::read_to_string(path).map_err(|e| Error::TemplateLoadFailed {
            origin: origin.clone(),
            source: e.into(),
        })?;
        debug!("Loaded template from {}", origin);
        Self::from_source(&origin, source)
    }

    pub fn from_source(name: &str, source: impl Into<String>) -> Result<Self> {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.set_keep_trailing_newline(true);
        env.add_filter("quote", quote);

        env.add_template_owned(name.to_string(), source.into())
            .map_err(|e| Error::TemplateLoadFailed {
                origin: name.to_string(),
                source: TemplateSourceError::Syntax(e),
            })?;

        Ok(Self {
            env,
            name: name.to_string(),
        })
    }

    /// Render the whole document into memory.
    pub fn render(&self, data: &TemplateData) -> Result<String> {
        let template = self
            .env
            .get_template(&self.name)
            .map_err(Error::TemplateRenderFailed)?;
        template.render(data).map_err(Error::TemplateRenderFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::Visibility;
    use crate::convert::{normalize, normalize_favourite};
    use crate::model::group_by_day;
    use crate::testing::{attachment, post_at, status};

    fn data(posts: Vec<crate::model::Post>) -> TemplateData {
        TemplateData {
            start_date: "2025-11-04".to_string(),
            end_date: "2025-11-11".to_string(),
            posts,
            days: Vec::new(),
        }
    }

    #[test]
    fn test_quote_filter() {
        assert_eq!(quote("one\n\ntwo"), "> one\n>\n> two");
    }

    #[test]
    fn test_custom_template() {
        let renderer = Renderer::from_source(
            "custom",
            "{{ start_date }}..{{ end_date }}{% for p in posts %}|{{ p.content }}{% endfor %}",
        )
        .unwrap();
        let out = renderer
            .render(&data(vec![post_at("1", "2025-11-05T10:00:00Z")]))
            .unwrap();
        assert_eq!(out, "2025-11-04..2025-11-11|post 1");
    }

    #[test]
    fn test_syntax_error_is_load_failure() {
        let err = Renderer::from_source("broken", "{% for p in posts %}").err().unwrap();
        assert!(matches!(err, Error::TemplateLoadFailed { .. }));
    }

    #[test]
    fn test_missing_file_is_load_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.md");
        let err = Renderer::new(path.to_str().unwrap()).err().unwrap();
        assert!(matches!(
            err,
            Error::TemplateLoadFailed {
                source: TemplateSourceError::Io(_),
                ..
            }
        ));
    }

    #[test]
    fn test_template_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mine.md");
        std::fs::write(&path, "{{ posts | length }} posts").unwrap();

        let renderer = Renderer::from_file(&path).unwrap();
        let out = renderer.render(&data(Vec::new())).unwrap();
        assert_eq!(out, "0 posts");
    }

    #[test]
    fn test_undefined_field_is_render_failure() {
        let renderer = Renderer::from_source("strict", "{{ no_such_field.name }}").unwrap();
        let err = renderer.render(&data(Vec::new())).unwrap_err();
        assert!(matches!(err, Error::TemplateRenderFailed(_)));
    }

    #[test]
    fn test_default_template_flat() {
        let mut own = status("1", "2025-11-05T10:00:00Z");
        own.content = "<p>Hello</p><p>World</p>".to_string();
        own.spoiler_text = "spoilers".to_string();
        own.media_attachments = vec![attachment("m1")];
        own.visibility = Visibility::Unlisted;

        let mut target = status("8", "2025-11-01T00:00:00Z");
        target.account = crate::testing::account("2", "bob");
        target.content = "<p>boosted words</p>".to_string();
        let mut boost = status("2", "2025-11-06T10:00:00Z");
        boost.content = String::new();
        boost.reblog = Some(Box::new(target));

        let renderer = Renderer::new("").unwrap();
        let out = renderer
            .render(&data(vec![normalize(&own), normalize(&boost)]))
            .unwrap();

        assert!(out.starts_with("# Mastodon posts from 2025-11-04 to 2025-11-11"));
        assert!(out.contains("### 2025-11-05 10:00"));
        assert!(out.contains("**CW: spoilers**"));
        assert!(out.contains("Hello\n\nWorld"));
        assert!(out.contains("- [image](https://files.example/m1.png): picture m1"));
        assert!(out.contains("### 2025-11-06 10:00 (boost)"));
        assert!(out.contains("> boosted words"));
        assert!(out.contains("@bob"));
    }

    #[test]
    fn test_default_template_days() {
        let own = normalize(&status("1", "2025-11-05T10:00:00Z"));
        let fav = normalize_favourite(&status("3", "2025-11-05T12:00:00Z"));
        let posts = vec![own, fav];

        let mut data = data(posts.clone());
        data.days = group_by_day(&posts);

        let out = Renderer::new("").unwrap().render(&data).unwrap();
        assert!(out.contains("## 2025-11-05"));
        assert!(out.contains("### Favourited"));
        assert!(out.contains("> post 3"));
        assert!(!out.contains("### Boosted"));
    }

    #[test]
    fn test_default_template_empty() {
        let out = Renderer::new("").unwrap().render(&data(Vec::new())).unwrap();
        assert!(out.contains("_No posts in this period._"));
    }
}

//! Render resolver: title, description and combined rendering for a source.
//!
//! Each field is resolved independently by trying, in order:
//!
//! 1. the record's own override (`title()`, `description()`, `render()`),
//! 2. the per-type template `<app_label>/<model>_<field>.html`,
//! 3. the default: the record's display string for title and description,
//!    the bundled `djumblelog/render.html` for the combined render.
//!
//! Only [`TemplateError::NotFound`] moves resolution from step 2 to step 3.
//! Nothing is cached; every call re-resolves against the current templates.

use serde::Serialize;

use crate::source::SourceRecord;
use crate::template::{render_source, Context, TemplateError, TemplateRegistry, Value};

/// Name of the bundled fallback for combined renders.
pub const DEFAULT_RENDER_TEMPLATE: &str = "djumblelog/render.html";

/// Inline template for the plain-string fallback.
const DISPLAY_TEMPLATE: &str = "{{ obj }}";

/// The field being resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Description,
    Render,
}

impl Field {
    /// Suffix used in per-type template names.
    pub fn suffix(self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Description => "description",
            Field::Render => "render",
        }
    }

    fn instance_override(self, record: &dyn SourceRecord) -> Option<String> {
        match self {
            Field::Title => record.title(),
            Field::Description => record.description(),
            Field::Render => record.render(),
        }
    }
}

/// Which strategy produced a resolved value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Instance,
    TypeTemplate,
    Default,
}

/// Output of resolving one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub text: String,
    pub strategy: Strategy,
}

impl Resolved {
    /// Template value for this output. Instance overrides are returned
    /// verbatim and so are escaped when embedded; template output is markup.
    pub fn to_value(&self) -> Value {
        match self.strategy {
            Strategy::Instance => Value::Text(self.text.clone()),
            Strategy::TypeTemplate | Strategy::Default => Value::Safe(self.text.clone()),
        }
    }
}

/// All three fields for one record.
#[derive(Debug, Clone)]
pub struct ResolvedEntry {
    pub title: Resolved,
    pub description: Resolved,
    pub rendered: Resolved,
}

/// Resolves presentation fields against a template registry.
#[derive(Clone, Copy)]
pub struct RenderResolver<'a> {
    templates: &'a TemplateRegistry,
}

impl<'a> RenderResolver<'a> {
    pub fn new(templates: &'a TemplateRegistry) -> Self {
        Self { templates }
    }

    pub fn title(&self, record: &dyn SourceRecord) -> Result<Resolved, TemplateError> {
        self.resolve_text(Field::Title, record)
    }

    pub fn description(&self, record: &dyn SourceRecord) -> Result<Resolved, TemplateError> {
        self.resolve_text(Field::Description, record)
    }

    /// Combined rendering. Title and description are only resolved when a
    /// template needs them.
    pub fn render(&self, record: &dyn SourceRecord) -> Result<Resolved, TemplateError> {
        if let Some(text) = Field::Render.instance_override(record) {
            return Ok(Resolved {
                text,
                strategy: Strategy::Instance,
            });
        }
        let title = self.title(record)?;
        let description = self.description(record)?;
        self.render_with(record, &title, &description)
    }

    /// Resolve all three fields, sharing the title/description work.
    pub fn resolve_all(&self, record: &dyn SourceRecord) -> Result<ResolvedEntry, TemplateError> {
        let title = self.title(record)?;
        let description = self.description(record)?;
        let rendered = match Field::Render.instance_override(record) {
            Some(text) => Resolved {
                text,
                strategy: Strategy::Instance,
            },
            None => self.render_with(record, &title, &description)?,
        };
        Ok(ResolvedEntry {
            title,
            description,
            rendered,
        })
    }

    fn resolve_text(&self, field: Field, record: &dyn SourceRecord) -> Result<Resolved, TemplateError> {
        if let Some(text) = field.instance_override(record) {
            return Ok(Resolved {
                text,
                strategy: Strategy::Instance,
            });
        }

        let ctx = record_context(record);
        let name = record.source_ref().content_type.template_name(field.suffix());
        match self.templates.render(&name, &ctx) {
            Ok(text) => Ok(Resolved {
                text,
                strategy: Strategy::TypeTemplate,
            }),
            Err(TemplateError::NotFound(_)) => Ok(Resolved {
                text: render_source(DISPLAY_TEMPLATE, DISPLAY_TEMPLATE, &ctx)?,
                strategy: Strategy::Default,
            }),
            Err(e) => Err(e),
        }
    }

    fn render_with(
        &self,
        record: &dyn SourceRecord,
        title: &Resolved,
        description: &Resolved,
    ) -> Result<Resolved, TemplateError> {
        let ctx = record_context(record)
            .with("title", title.to_value())
            .with("description", description.to_value());

        let name = record.source_ref().content_type.template_name(Field::Render.suffix());
        match self.templates.render(&name, &ctx) {
            Ok(text) => Ok(Resolved {
                text,
                strategy: Strategy::TypeTemplate,
            }),
            Err(TemplateError::NotFound(_)) => Ok(Resolved {
                text: self.templates.render(DEFAULT_RENDER_TEMPLATE, &ctx)?,
                strategy: Strategy::Default,
            }),
            Err(e) => Err(e),
        }
    }
}

/// Base template context for a record: `obj` and `url`.
pub fn record_context(record: &dyn SourceRecord) -> Context {
    Context::new()
        .with(
            "obj",
            Value::Record {
                display: record.display(),
                fields: record.fields(),
            },
        )
        .with("url", record.absolute_url().unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::{Map, Value as Json};

    use super::*;
    use crate::content_type::ContentType;
    use crate::source::SourceRef;

    #[derive(Default)]
    struct Post {
        source: Option<SourceRef>,
        title: Option<String>,
        description: Option<String>,
        render: Option<String>,
    }

    impl Post {
        fn plain() -> Self {
            Self {
                source: Some(SourceRef::new(ContentType::parse("blog.post").unwrap(), 1)),
                ..Default::default()
            }
        }
    }

    impl SourceRecord for Post {
        fn source_ref(&self) -> &SourceRef {
            self.source.as_ref().expect("test post has a source")
        }

        fn display(&self) -> String {
            "Hello & welcome".to_string()
        }

        fn fields(&self) -> Map<String, Json> {
            let mut fields = Map::new();
            fields.insert("body".into(), Json::from("First post body"));
            fields
        }

        fn title(&self) -> Option<String> {
            self.title.clone()
        }

        fn description(&self) -> Option<String> {
            self.description.clone()
        }

        fn render(&self) -> Option<String> {
            self.render.clone()
        }
    }

    #[test]
    fn instance_override_wins_over_template() {
        let templates = TemplateRegistry::new();
        templates.register("blog/post_title.html", "template title");
        let post = Post {
            title: Some("<custom>".into()),
            ..Post::plain()
        };

        let title = RenderResolver::new(&templates).title(&post).unwrap();
        assert_eq!(title.text, "<custom>");
        assert_eq!(title.strategy, Strategy::Instance);
    }

    #[test]
    fn type_template_used_when_no_override() {
        let templates = TemplateRegistry::new();
        templates.register("blog/post_description.html", "Body: {{ obj.body }}");

        let description = RenderResolver::new(&templates)
            .description(&Post::plain())
            .unwrap();
        assert_eq!(description.text, "Body: First post body");
        assert_eq!(description.strategy, Strategy::TypeTemplate);
    }

    #[test]
    fn falls_back_to_escaped_display() {
        let templates = TemplateRegistry::new();
        let resolver = RenderResolver::new(&templates);

        let title = resolver.title(&Post::plain()).unwrap();
        assert_eq!(title.text, "Hello &amp; welcome");
        assert_eq!(title.strategy, Strategy::Default);

        let description = resolver.description(&Post::plain()).unwrap();
        assert_eq!(description.text, "Hello &amp; welcome");
    }

    #[test]
    fn fields_resolve_independently() {
        let templates = TemplateRegistry::new();
        templates.register("blog/post_description.html", "from template");
        let post = Post {
            title: Some("from method".into()),
            ..Post::plain()
        };

        let all = RenderResolver::new(&templates).resolve_all(&post).unwrap();
        assert_eq!(all.title.strategy, Strategy::Instance);
        assert_eq!(all.description.strategy, Strategy::TypeTemplate);
        assert_eq!(all.rendered.strategy, Strategy::Default);
    }

    #[test]
    fn render_template_receives_resolved_title_and_description() {
        let templates = TemplateRegistry::new();
        templates.register("blog/post_title.html", "<em>T</em>");
        templates.register("blog/post_render.html", "{{ title }} -- {{ description }}");
        let post = Post {
            description: Some("a < b".into()),
            ..Post::plain()
        };

        let rendered = RenderResolver::new(&templates).render(&post).unwrap();
        assert_eq!(rendered.text, "<em>T</em> -- a &lt; b");
        assert_eq!(rendered.strategy, Strategy::TypeTemplate);
    }

    #[test]
    fn render_falls_back_to_bundled_default() {
        let templates = TemplateRegistry::new();
        let rendered = RenderResolver::new(&templates).render(&Post::plain()).unwrap();
        assert_eq!(rendered.strategy, Strategy::Default);
        assert!(rendered.text.contains("djumblelog-entry"));
        assert!(rendered.text.contains("Hello &amp; welcome"));
    }

    #[test]
    fn render_override_is_verbatim() {
        let templates = TemplateRegistry::new();
        templates.register("blog/post_render.html", "template");
        let post = Post {
            render: Some("<article>mine</article>".into()),
            ..Post::plain()
        };

        let rendered = RenderResolver::new(&templates).render(&post).unwrap();
        assert_eq!(rendered.text, "<article>mine</article>");
        assert_eq!(rendered.strategy, Strategy::Instance);
    }

    #[test]
    fn broken_type_template_propagates() {
        let templates = TemplateRegistry::new();
        templates.register("blog/post_title.html", "{{ obj");

        let err = RenderResolver::new(&templates).title(&Post::plain()).unwrap_err();
        assert_matches!(err, TemplateError::Syntax { .. });
    }

    #[test]
    fn resolution_tracks_template_changes_between_reads() {
        let templates = TemplateRegistry::new();
        let resolver = RenderResolver::new(&templates);
        let post = Post::plain();

        assert_eq!(resolver.title(&post).unwrap().strategy, Strategy::Default);
        templates.register("blog/post_title.html", "now templated");
        assert_eq!(resolver.title(&post).unwrap().text, "now templated");
        templates.unregister("blog/post_title.html");
        assert_eq!(resolver.title(&post).unwrap().strategy, Strategy::Default);
    }
}

//! Template registry and renderer.
//!
//! Templates are looked up by name (`blog/post_title.html`) through three
//! layers, first match wins:
//!
//! 1. overrides registered at runtime with [`TemplateRegistry::register`],
//! 2. files under the configured template directories (re-read on every
//!    lookup, so edits show up without a restart),
//! 3. the templates bundled with this crate under `templates/`.
//!
//! A missing template is reported as [`TemplateError::NotFound`], which the
//! render resolver treats as "try the next strategy". Every other variant is
//! a real failure.
//!
//! The syntax is a small subset of the Django/Jinja family:
//!
//! - `{{ name }}`, `{{ obj.field }}` with optional filters
//!   (`{{ title|upper }}`); filters are `safe`, `escape`, `upper`, `lower`.
//! - `{% if name %}...{% else %}...{% endif %}` and `{% if not name %}`;
//!   blocks do not nest.
//! - `{# comment #}`.
//!
//! Output is HTML-escaped unless the value is [`Value::Safe`] or piped
//! through `safe`. Unknown variables render as the empty string.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::{LazyLock, RwLock};

use regex::{Captures, Regex};
use serde_json::{Map, Value as Json};

/// `{% if [not] var %}body{% else %}alt{% endif %}`, non-nested.
static IF_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?s)\{%\s*if\s+(not\s+)?([A-Za-z_][A-Za-z0-9_.]*)\s*%\}(.*?)(?:\{%\s*else\s*%\}(.*?))?\{%\s*endif\s*%\}",
    )
    .expect("valid regex")
});

/// `{{ expression }}` or `{# comment #}`.
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{\{(.*?)\}\}|\{#.*?#\}").expect("valid regex"));

/// Dotted variable path.
static VARIABLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z0-9_]+)*$").expect("valid regex")
});

/// Templates shipped with this crate.
const BUNDLED: &[(&str, &str)] = &[
    (
        "djumblelog/render.html",
        include_str!("../templates/djumblelog/render.html"),
    ),
    (
        "djumblelog/entry.html",
        include_str!("../templates/djumblelog/entry.html"),
    ),
    (
        "djumblelog/object_list.html",
        include_str!("../templates/djumblelog/object_list.html"),
    ),
    (
        "djumblelog/index.html",
        include_str!("../templates/djumblelog/index.html"),
    ),
    (
        "djumblelog/feed_latest_description.html",
        include_str!("../templates/djumblelog/feed_latest_description.html"),
    ),
    (
        "djumblelog/feed_type_description.html",
        include_str!("../templates/djumblelog/feed_type_description.html"),
    ),
];

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("Template does not exist: {0}")]
    NotFound(String),

    #[error("Invalid template name: {0}")]
    InvalidName(String),

    #[error("Template syntax error in {template}: {message}")]
    Syntax { template: String, message: String },

    #[error("Failed to read template {name}: {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

impl TemplateError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, TemplateError::NotFound(_))
    }
}

// ---------------------------------------------------------------------------
// Context values
// ---------------------------------------------------------------------------

/// A value bound into a template context.
#[derive(Debug, Clone)]
pub enum Value {
    /// Plain text, escaped on output.
    Text(String),
    /// Markup that is already safe to emit verbatim.
    Safe(String),
    /// A source record: prints as `display`, exposes `fields` to `obj.x` lookups.
    Record { display: String, fields: Map<String, Json> },
    /// Arbitrary JSON data.
    Json(Json),
}

impl Value {
    fn is_truthy(&self) -> bool {
        match self {
            Value::Text(s) | Value::Safe(s) => !s.is_empty(),
            Value::Record { .. } => true,
            Value::Json(json) => json_truthy(json),
        }
    }

    /// Printable text plus whether it is already safe.
    fn output(&self) -> (String, bool) {
        match self {
            Value::Text(s) => (s.clone(), false),
            Value::Safe(s) => (s.clone(), true),
            Value::Record { display, .. } => (display.clone(), false),
            Value::Json(json) => (json_to_text(json), false),
        }
    }

    fn lookup(&self, key: &str) -> Option<Value> {
        match self {
            Value::Record { fields, .. } => fields.get(key).cloned().map(Value::Json),
            Value::Json(json) => json_lookup(json, key).map(Value::Json),
            Value::Text(_) | Value::Safe(_) => None,
        }
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Json(Json::Bool(b))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Json(Json::from(n))
    }
}

impl From<Json> for Value {
    fn from(json: Json) -> Self {
        Value::Json(json)
    }
}

fn json_truthy(json: &Json) -> bool {
    match json {
        Json::Null => false,
        Json::Bool(b) => *b,
        Json::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Json::String(s) => !s.is_empty(),
        Json::Array(a) => !a.is_empty(),
        Json::Object(o) => !o.is_empty(),
    }
}

fn json_to_text(json: &Json) -> String {
    match json {
        Json::Null => String::new(),
        Json::String(s) => s.clone(),
        Json::Bool(b) => b.to_string(),
        Json::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

fn json_lookup(json: &Json, key: &str) -> Option<Json> {
    match json {
        Json::Object(map) => map.get(key).cloned(),
        Json::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i).cloned()),
        _ => None,
    }
}

/// Variables available to a template render.
#[derive(Debug, Clone, Default)]
pub struct Context {
    vars: HashMap<String, Value>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.vars.insert(name.into(), value.into());
    }

    fn resolve(&self, path: &str) -> Option<Value> {
        let mut segments = path.split('.');
        let mut current = self.vars.get(segments.next()?)?.clone();
        for segment in segments {
            current = current.lookup(segment)?;
        }
        Some(current)
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Layered template lookup (overrides, directories, bundled).
#[derive(Debug, Default)]
pub struct TemplateRegistry {
    overrides: RwLock<HashMap<String, String>>,
    dirs: Vec<PathBuf>,
}

impl TemplateRegistry {
    /// A registry that only knows the bundled templates.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry that also searches `dirs`, in order, before the bundled set.
    pub fn with_dirs(dirs: Vec<PathBuf>) -> Self {
        Self {
            overrides: RwLock::default(),
            dirs,
        }
    }

    /// Register a template that takes priority over files and bundled assets.
    pub fn register(&self, name: impl Into<String>, source: impl Into<String>) {
        let name = name.into();
        tracing::debug!(template = %name, "Registered template override");
        self.overrides
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(name, source.into());
    }

    /// Remove a runtime override. Returns whether one was registered.
    pub fn unregister(&self, name: &str) -> bool {
        self.overrides
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(name)
            .is_some()
    }

    /// Fetch the source text of a template.
    pub fn source(&self, name: &str) -> Result<String, TemplateError> {
        validate_name(name)?;

        if let Some(source) = self
            .overrides
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(name)
        {
            return Ok(source.clone());
        }

        for dir in &self.dirs {
            let path = dir.join(name);
            match std::fs::read_to_string(&path) {
                Ok(source) => return Ok(source),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(source) => {
                    return Err(TemplateError::Io {
                        name: name.to_string(),
                        source,
                    })
                }
            }
        }

        BUNDLED
            .iter()
            .find(|(bundled, _)| *bundled == name)
            .map(|(_, source)| (*source).to_string())
            .ok_or_else(|| TemplateError::NotFound(name.to_string()))
    }

    /// Look up and render a named template.
    pub fn render(&self, name: &str, ctx: &Context) -> Result<String, TemplateError> {
        let source = self.source(name)?;
        render_source(name, &source, ctx)
    }
}

/// Reject names that could escape a template directory.
fn validate_name(name: &str) -> Result<(), TemplateError> {
    let path = Path::new(name);
    let well_formed = !name.is_empty()
        && path
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
    if well_formed {
        Ok(())
    } else {
        Err(TemplateError::InvalidName(name.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Render template source text. `name` is only used in error messages.
pub fn render_source(name: &str, source: &str, ctx: &Context) -> Result<String, TemplateError> {
    let syntax = |message: &str| TemplateError::Syntax {
        template: name.to_string(),
        message: message.to_string(),
    };

    let expanded = IF_BLOCK_RE.replace_all(source, |caps: &Captures| {
        let negate = caps.get(1).is_some();
        let truthy = ctx.resolve(&caps[2]).is_some_and(|v| v.is_truthy());
        if truthy != negate {
            caps[3].to_string()
        } else {
            caps.get(4).map_or_else(String::new, |m| m.as_str().to_string())
        }
    });

    if expanded.contains("{%") {
        return Err(syntax("unbalanced or unsupported block tag"));
    }

    let mut output = String::with_capacity(expanded.len());
    let mut last = 0;

    for caps in TAG_RE.captures_iter(&expanded) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        let literal = &expanded[last..whole.start()];
        if literal.contains("{{") {
            return Err(syntax("unclosed variable tag"));
        }
        output.push_str(literal);
        last = whole.end();

        if let Some(expr) = caps.get(1) {
            output.push_str(&render_expression(expr.as_str(), ctx).map_err(|m| syntax(&m))?);
        }
    }

    let tail = &expanded[last..];
    if tail.contains("{{") || tail.contains("{#") {
        return Err(syntax("unclosed tag"));
    }
    output.push_str(tail);

    Ok(output)
}

/// Evaluate one `var|filter|filter` expression to escaped output.
fn render_expression(expr: &str, ctx: &Context) -> Result<String, String> {
    let mut parts = expr.split('|').map(str::trim);
    let path = parts.next().unwrap_or_default();
    if !VARIABLE_RE.is_match(path) {
        return Err(format!("invalid variable expression '{}'", expr.trim()));
    }

    let (mut text, mut safe) = ctx
        .resolve(path)
        .map(|value| value.output())
        .unwrap_or_default();

    for filter in parts {
        match filter {
            "safe" => safe = true,
            "escape" => safe = false,
            "upper" => text = text.to_uppercase(),
            "lower" => text = text.to_lowercase(),
            other => return Err(format!("unknown filter '{other}'")),
        }
    }

    Ok(if safe { text } else { escape_html(&text) })
}

/// HTML-escape the five significant characters.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            c => escaped.push(c),
        }
    }
    escaped
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

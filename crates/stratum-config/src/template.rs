//! Payload templates.
//!
//! Templates use `{{ .name }}` placeholders that are replaced with resolved
//! parameter values. A rendered template must be valid JSON.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use thiserror::Error;

#[allow(clippy::expect_used)]
static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*\.([A-Za-z_][A-Za-z0-9_-]*)\s*\}\}").expect("placeholder pattern is valid")
});

/// How string values are inserted into the rendered text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Escape {
    /// Insert strings verbatim.
    None,
    /// Insert strings JSON-escaped, without surrounding quotes.
    Json,
}

/// Failure to render a template or format string.
#[derive(Debug, Error)]
pub enum RenderError {
    /// A placeholder names a value that was not provided.
    #[error("template `{template}` uses `{name}`, which is not a parameter of the configuration")]
    MissingValue {
        /// Template id (or `format` for compound parameters).
        template: String,
        /// Placeholder name.
        name: String,
    },

    /// The rendered text is not valid JSON.
    #[error("template `{template}` does not render to valid JSON: {source}")]
    InvalidJson {
        /// Template id.
        template: String,
        /// Parse failure.
        source: serde_json::Error,
    },
}

/// A named payload template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    /// Identifier, usually the template file path.
    pub id: String,
    /// Raw template text.
    pub content: String,
}

impl Template {
    /// Creates a template from its id and text.
    #[must_use]
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
        }
    }

    /// Renders the template and parses the result as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if a placeholder has no value or the rendered text
    /// is not valid JSON.
    pub fn render(&self, values: &BTreeMap<String, Value>) -> Result<Value, RenderError> {
        let text = render_named(&self.id, &self.content, values, Escape::Json)?;
        serde_json::from_str(&text).map_err(|source| RenderError::InvalidJson {
            template: self.id.clone(),
            source,
        })
    }
}

/// Renders a format string, leaving the result as text.
///
/// # Errors
///
/// Returns an error if a placeholder has no value.
pub fn render_text(
    format: &str,
    values: &BTreeMap<String, Value>,
    escape: Escape,
) -> Result<String, RenderError> {
    render_named("format", format, values, escape)
}

fn render_named(
    template: &str,
    text: &str,
    values: &BTreeMap<String, Value>,
    escape: Escape,
) -> Result<String, RenderError> {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for caps in PLACEHOLDER.captures_iter(text) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let value = values
            .get(name.as_str())
            .ok_or_else(|| RenderError::MissingValue {
                template: template.to_string(),
                name: name.as_str().to_string(),
            })?;
        out.push_str(&text[last..whole.start()]);
        out.push_str(&insertable(value, escape));
        last = whole.end();
    }
    out.push_str(&text[last..]);
    Ok(out)
}

fn insertable(value: &Value, escape: Escape) -> String {
    match (value, escape) {
        (Value::String(s), Escape::None) => s.clone(),
        (Value::String(s), Escape::Json) => {
            let quoted = Value::String(s.clone()).to_string();
            quoted[1..quoted.len() - 1].to_string()
        }
        (other, _) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn values(pairs: &[(&str, Value)]) -> BTreeMap<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn render_substitutes_strings_and_numbers() {
        let template = Template::new(
            "d.json",
            r#"{"name": "{{ .name }}", "threshold": {{.threshold}}}"#,
        );
        let rendered = template
            .render(&values(&[("name", json!("My board")), ("threshold", json!(5))]))
            .unwrap();
        assert_eq!(rendered, json!({"name": "My board", "threshold": 5}));
    }

    #[test]
    fn render_escapes_quotes_in_strings() {
        let template = Template::new("d.json", r#"{"name": "{{ .name }}"}"#);
        let rendered = template
            .render(&values(&[("name", json!("say \"hi\""))]))
            .unwrap();
        assert_eq!(rendered, json!({"name": "say \"hi\""}));
    }

    #[test]
    fn render_inserts_lists_as_json() {
        let template = Template::new("d.json", r#"{"tags": {{ .tags }}}"#);
        let rendered = template
            .render(&values(&[("tags", json!(["a", "b"]))]))
            .unwrap();
        assert_eq!(rendered, json!({"tags": ["a", "b"]}));
    }

    #[test]
    fn render_missing_value_fails() {
        let template = Template::new("d.json", r#"{"name": "{{ .name }}"}"#);
        let err = template.render(&BTreeMap::new()).unwrap_err();
        assert!(matches!(err, RenderError::MissingValue { ref name, .. } if name == "name"));
    }

    #[test]
    fn render_invalid_json_fails() {
        let template = Template::new("d.json", r"{ broken {{ .x }}");
        let err = template.render(&values(&[("x", json!(1))])).unwrap_err();
        assert!(matches!(err, RenderError::InvalidJson { .. }));
        assert!(err.to_string().contains("d.json"), "got: {err}");
    }

    #[test]
    fn render_text_keeps_strings_verbatim() {
        let text = render_text(
            "{{ .a }}/{{ .b }}",
            &values(&[("a", json!("x\"y")), ("b", json!(2))]),
            Escape::None,
        )
        .unwrap();
        assert_eq!(text, "x\"y/2");
    }
}

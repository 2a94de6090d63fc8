//! HTML rendering with Go template syntax.
//!
//! Templates are parsed from strings on every call with [`gtmpl`], so `{{.Name}}`,
//! `{{range .Items}}` and `{{template "partial"}}` work as they do in Go. The
//! output is not escaped automatically: pass untrusted values through the
//! `html` function (`{{.Comment | html}}`).
//!
//! ```rust
//! use axum_httpserver::render_html;
//! use std::collections::HashMap;
//!
//! let data = HashMap::from([("Name".to_owned(), "World".to_owned())]);
//! let html = render_html("greeting", "Hello {{.Name}}", data, &[]).unwrap();
//! assert_eq!(html.as_str(), "Hello World");
//! ```

use {
    crate::{Error, Result},
    axum::response::{IntoResponse, Response},
    gtmpl::{Context, Func, Template, Value},
    std::{collections::HashMap, fmt, fs, path::Path},
};

/// Markup produced by a template, ready to be sent as is.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Html(String);

impl Html {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Html {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Html {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<Html> for String {
    fn from(html: Html) -> Self {
        html.0
    }
}

impl IntoResponse for Html {
    fn into_response(self) -> Response {
        axum::response::Html(self.0).into_response()
    }
}

/// Parses `text` as the template `name` and executes it against `data`.
///
/// `funcs` are made available to the template by name, in addition to the
/// builtin functions.
pub fn render_html(
    name: &str,
    text: &str,
    data: impl Into<Value>,
    funcs: &[(&str, Func)],
) -> Result<Html> {
    let mut template = new_template(name, funcs);
    template
        .parse(text)
        .map_err(|err| Error::template(format!("cannot parse template {name:?}: {err}")))?;
    execute(&template, data)
}

/// Renders `main` from a set of named templates.
///
/// `main` is parsed first, then every other entry of `templates` is attached
/// under its own name so `main` can include it with `{{template "name" .}}`.
/// Fails if `main` is not one of the keys.
pub fn render_multi_html(
    main: &str,
    templates: &HashMap<String, String>,
    data: impl Into<Value>,
    funcs: &[(&str, Func)],
) -> Result<Html> {
    let main_text = templates
        .get(main)
        .ok_or_else(|| Error::template(format!("template {main:?} is not defined")))?;

    let mut template = new_template(main, funcs);
    template
        .parse(main_text.as_str())
        .map_err(|err| Error::template(format!("cannot parse template {main:?}: {err}")))?;

    for (name, text) in templates.iter().filter(|(name, _)| name.as_str() != main) {
        template
            .add_template(name.as_str(), text.as_str())
            .map_err(|err| Error::template(format!("cannot parse template {name:?}: {err}")))?;
    }

    execute(&template, data)
}

/// Reads a template file into a string.
pub fn load_template(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    fs::read_to_string(path)
        .map_err(|err| Error::io(format!("cannot read template {}: {err}", path.display())))
}

fn new_template(name: &str, funcs: &[(&str, Func)]) -> Template {
    let mut template = Template::with_name(name);
    for (func_name, func) in funcs {
        template.add_func(func_name, *func);
    }
    template
}

fn execute(template: &Template, data: impl Into<Value>) -> Result<Html> {
    let context = Context::from(data.into());
    template
        .render(&context)
        .map(Html)
        .map_err(|err| Error::template(format!("cannot execute template {:?}: {err}", template.name)))
}

//!
//! Small helpers shared by the configuration and request handling code.
//!
//! - [`generate_request_id`] - Produces a fresh UUIDv7 correlation identifier
//! - [`http_date`] - Formats a timestamp the way the `Date` header expects
//! - [`replace_handlebars_with_env`] - Template substitution for environment variables
//!

use {
    chrono::{DateTime, Utc},
    regex::{Captures, Regex},
    std::{env, sync::LazyLock},
    uuid::{ContextV7, Timestamp, Uuid},
};

/// Regular expression pattern for matching handlebars-style environment variable references.
/// Matches patterns like `{{ VAR_NAME }}` with optional whitespace around the variable name.
/// Variable names must be uppercase letters, digits, or underscores (standard env var naming).
static HANDLEBAR_REGEXP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*([A-Z0-9_]+)\s*\}\}").unwrap());

/// IMF-fixdate, the only format `Date` headers should be sent in.
pub(crate) const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Generates a new correlation identifier.
///
/// Identifiers are UUIDv7 values built with a high-precision timestamp
/// context, so they sort roughly by creation time.
///
/// ```
/// use axum_httpserver::generate_request_id;
///
/// let a = generate_request_id();
/// let b = generate_request_id();
/// assert_ne!(a, b);
/// assert_eq!(a.len(), 36);
/// ```
pub fn generate_request_id() -> String {
    let cx = ContextV7::new().with_additional_precision();
    Uuid::new_v7(Timestamp::now(cx)).to_string()
}

/// Formats `when` as an HTTP date, e.g. `Sun, 06 Nov 1994 08:49:37 GMT`.
pub fn http_date(when: DateTime<Utc>) -> String {
    when.format(HTTP_DATE_FORMAT).to_string()
}

/// Replaces handlebars-style placeholders with environment variable values.
///
/// Searches through the input string for patterns like `{{ VAR_NAME }}` and replaces
/// them with the corresponding environment variable value. Variable names are
/// case-sensitive and must consist of uppercase letters, digits, or underscores,
/// so Go-style template actions such as `{{.Name}}` are never touched.
///
/// Whitespace around the variable name is allowed: `{{VAR}}`, `{{ VAR }}`, and
/// `{{  VAR  }}` are all valid and equivalent.
///
/// If an environment variable is not set, it is replaced with an empty string
/// and a warning is logged.
///
/// ```
/// use axum_httpserver::replace_handlebars_with_env;
///
/// let template = "Path: {{ HOME }}/certs";
/// let result = replace_handlebars_with_env(template);
/// assert!(result.starts_with("Path: "));
///
/// let template = "Value: {{ MISSING_VAR }}";
/// assert_eq!(replace_handlebars_with_env(template), "Value: ");
/// ```
pub fn replace_handlebars_with_env(input: &str) -> String {
    HANDLEBAR_REGEXP
        .replace_all(input, |caps: &Captures| {
            let var_name = &caps[1];
            env::var(var_name).unwrap_or_else(|_| {
                tracing::warn!(
                    variable = %var_name,
                    "Environment variable not found, substituting with empty string"
                );
                String::new()
            })
        })
        .to_string()
}

use {
    crate::{Error, FILEPATH_WILDCARD, Result},
    serde::Deserialize,
};

/// A directory served under a wildcard route when the server is created.
///
/// The route must end with the `/{*filepath}` wildcard: whatever the wildcard
/// captures is looked up relative to `directory`.
///
/// ```toml
/// [[http.directories]]
/// route = "/static/{*filepath}"
/// directory = "./public"
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct StaticDirConfig {
    /// Route pattern, ending with `/{*filepath}`.
    pub route: String,

    /// Path to the directory containing static files to serve.
    pub directory: String,
}

impl StaticDirConfig {
    pub fn new(route: impl Into<String>, directory: impl Into<String>) -> Self {
        Self {
            route: route.into(),
            directory: directory.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.directory.trim().is_empty() {
            return Err(Error::invalid_input(
                "Static directory path is required. Set [[http.directories]] directory = \"./public\" in config.",
            ));
        }

        if !self.route.ends_with(FILEPATH_WILDCARD) {
            return Err(Error::config(format!(
                "Static directory route {:?} must end with {FILEPATH_WILDCARD}",
                self.route
            )));
        }

        Ok(())
    }
}

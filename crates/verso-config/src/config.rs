//! Parser configuration
//!
//! A [`ParserConfig`] is built once (from defaults or a file) and shared
//! between parser instances behind an `Arc`. Nothing in it changes after
//! construction.
//!
//! ```toml
//! red_letter_classes = ["woc", "wj"]
//! footnote_marker = "*"
//! cross_reference_marker = "†"
//! ```

use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// On-disk formats understood by the loader
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// `.toml`
    Toml,
    /// `.yaml` / `.yml`
    Yaml,
    /// `.json`
    Json,
}

impl ConfigFormat {
    /// Pick a format from a file extension
    pub fn from_path(path: &Path) -> ConfigResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "toml" => Ok(Self::Toml),
            "yaml" | "yml" => Ok(Self::Yaml),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Shared parser configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ParserConfig {
    /// Class names (or tag names) that mark words of Jesus
    pub red_letter_classes: Vec<String>,

    /// Substrings that identify a copyright paragraph in passage markup
    pub copyright_markers: Vec<String>,

    /// Lowercase opening phrases of a Psalm superscription
    pub superscription_prefixes: Vec<String>,

    /// Book names treated as the Psalter
    pub psalm_books: Vec<String>,

    /// Marker used for a general footnote with no caller of its own
    pub footnote_marker: String,

    /// Marker used for a cross-reference note with no caller of its own
    pub cross_reference_marker: String,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            red_letter_classes: to_strings(&["woc", "woj", "wj", "red", "red-letter", "jesus"]),
            copyright_markers: to_strings(&["class=\"copyright\"", "&copy;", "©"]),
            superscription_prefixes: to_strings(&[
                "a psalm",
                "a song",
                "a maskil",
                "a miktam",
                "a prayer",
                "a shiggaion",
                "of david",
                "of solomon",
                "of asaph",
                "of the sons of korah",
                "to the choirmaster",
                "to the chief musician",
                "for the director",
                "for the choir director",
            ]),
            psalm_books: to_strings(&["Psalm", "Psalms", "Salmos"]),
            footnote_marker: "*".to_string(),
            cross_reference_marker: "†".to_string(),
        }
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

impl ParserConfig {
    /// Create a configuration with built-in defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a configuration file, choosing the format from its extension
    ///
    /// Missing keys fall back to the defaults.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use verso_config::ParserConfig;
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let config = ParserConfig::load("/etc/verso/parser.toml").await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let format = ConfigFormat::from_path(path)?;
        let content = tokio::fs::read_to_string(path).await?;
        debug!(path = %path.display(), ?format, "loading parser config");
        Self::from_str_with_format(&content, format)
    }

    /// Load a configuration file synchronously (for non-async contexts)
    pub fn load_sync(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let format = ConfigFormat::from_path(path)?;
        let content = std::fs::read_to_string(path)?;
        debug!(path = %path.display(), ?format, "loading parser config");
        Self::from_str_with_format(&content, format)
    }

    /// Parse and validate configuration text in the given format
    pub fn from_str_with_format(content: &str, format: ConfigFormat) -> ConfigResult<Self> {
        let config: ParserConfig = match format {
            #[cfg(feature = "toml")]
            ConfigFormat::Toml => toml::from_str(content)?,
            #[cfg(feature = "yaml")]
            ConfigFormat::Yaml => serde_yaml::from_str(content)?,
            ConfigFormat::Json => serde_json::from_str(content)?,
            #[allow(unreachable_patterns)]
            other => {
                return Err(ConfigError::UnsupportedFormat(
                    format!("{:?}", other).to_lowercase(),
                ))
            }
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate TOML configuration text
    #[cfg(feature = "toml")]
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        Self::from_str_with_format(content, ConfigFormat::Toml)
    }

    /// Serialize to pretty TOML
    #[cfg(feature = "toml")]
    pub fn to_toml_string(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject configurations the parsers cannot work with
    pub fn validate(&self) -> ConfigResult<()> {
        if self.red_letter_classes.iter().all(|c| c.trim().is_empty()) {
            return Err(ConfigError::invalid("red_letter_classes must not be empty"));
        }
        if self.psalm_books.iter().all(|b| b.trim().is_empty()) {
            return Err(ConfigError::invalid("psalm_books must not be empty"));
        }
        if self.footnote_marker.trim().is_empty() {
            return Err(ConfigError::invalid("footnote_marker must not be empty"));
        }
        if self.cross_reference_marker.trim().is_empty() {
            return Err(ConfigError::invalid(
                "cross_reference_marker must not be empty",
            ));
        }
        Ok(())
    }

    /// Check a single class name (or tag name) against the red-letter aliases
    pub fn is_red_letter_class(&self, class: &str) -> bool {
        self.red_letter_classes
            .iter()
            .any(|alias| alias.eq_ignore_ascii_case(class))
    }

    /// Check a whitespace-separated `class` attribute value
    pub fn class_list_has_red_letter(&self, class_attr: &str) -> bool {
        class_attr
            .split_whitespace()
            .any(|class| self.is_red_letter_class(class))
    }

    /// Check whether a book name refers to the Psalter
    pub fn is_psalm_book(&self, book: &str) -> bool {
        let book = book.trim();
        self.psalm_books
            .iter()
            .any(|name| name.eq_ignore_ascii_case(book))
    }

    /// Check whether a chunk of markup carries a copyright marker
    pub fn is_copyright(&self, markup: &str) -> bool {
        let lowered = markup.to_lowercase();
        self.copyright_markers
            .iter()
            .filter(|m| !m.is_empty())
            .any(|m| lowered.contains(&m.to_lowercase()))
    }
}

//! Supported translations and the upstream format family each one arrives in

use crate::error::ParserError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Upstream payload family; one parser implementation per family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceFamily {
    /// HTML passage with inline chapter:verse markers
    Passage,
    /// Pseudo-XML `verse_export` blocks
    VerseExport,
    /// Structured JSON paragraph/item tree
    ContentTree,
}

/// Closed set of translation identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Translation {
    Esv,
    Niv,
    Nkjv,
    Nasb,
    Csb,
    Nlt,
    Ntv,
    Kjv,
    Asv,
    Web,
    Bsb,
}

impl Translation {
    /// Every supported translation, in a stable order
    pub const ALL: [Translation; 11] = [
        Translation::Esv,
        Translation::Niv,
        Translation::Nkjv,
        Translation::Nasb,
        Translation::Csb,
        Translation::Nlt,
        Translation::Ntv,
        Translation::Kjv,
        Translation::Asv,
        Translation::Web,
        Translation::Bsb,
    ];

    /// Short code, e.g. "ESV"
    pub fn as_str(&self) -> &'static str {
        match self {
            Translation::Esv => "ESV",
            Translation::Niv => "NIV",
            Translation::Nkjv => "NKJV",
            Translation::Nasb => "NASB",
            Translation::Csb => "CSB",
            Translation::Nlt => "NLT",
            Translation::Ntv => "NTV",
            Translation::Kjv => "KJV",
            Translation::Asv => "ASV",
            Translation::Web => "WEB",
            Translation::Bsb => "BSB",
        }
    }

    /// Human-readable name
    pub fn full_name(&self) -> &'static str {
        match self {
            Translation::Esv => "English Standard Version",
            Translation::Niv => "New International Version",
            Translation::Nkjv => "New King James Version",
            Translation::Nasb => "New American Standard Bible",
            Translation::Csb => "Christian Standard Bible",
            Translation::Nlt => "New Living Translation",
            Translation::Ntv => "Nueva Traducción Viviente",
            Translation::Kjv => "King James Version",
            Translation::Asv => "American Standard Version",
            Translation::Web => "World English Bible",
            Translation::Bsb => "Berean Standard Bible",
        }
    }

    /// Which payload family (and therefore which parser) serves this translation
    pub fn family(&self) -> SourceFamily {
        match self {
            Translation::Esv
            | Translation::Niv
            | Translation::Nkjv
            | Translation::Nasb
            | Translation::Csb => SourceFamily::Passage,
            Translation::Nlt | Translation::Ntv => SourceFamily::VerseExport,
            Translation::Kjv | Translation::Asv | Translation::Web | Translation::Bsb => {
                SourceFamily::ContentTree
            }
        }
    }
}

impl fmt::Display for Translation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Translation {
    type Err = ParserError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim();
        Translation::ALL
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(code))
            .ok_or_else(|| ParserError::UnknownTranslation(code.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_is_case_insensitive() {
        assert_eq!("esv".parse::<Translation>().unwrap(), Translation::Esv);
        assert_eq!(" NkJv ".parse::<Translation>().unwrap(), Translation::Nkjv);
        assert!(matches!(
            "MSG".parse::<Translation>(),
            Err(ParserError::UnknownTranslation(code)) if code == "MSG"
        ));
    }

    #[test]
    fn test_every_translation_round_trips() {
        for t in Translation::ALL {
            assert_eq!(t.as_str().parse::<Translation>().unwrap(), t);
            assert!(!t.full_name().is_empty());
        }
    }

    #[test]
    fn test_families() {
        assert_eq!(Translation::Esv.family(), SourceFamily::Passage);
        assert_eq!(Translation::Nlt.family(), SourceFamily::VerseExport);
        assert_eq!(Translation::Kjv.family(), SourceFamily::ContentTree);
    }

    #[test]
    fn test_serde_uses_codes() {
        assert_eq!(serde_json::to_string(&Translation::Nasb).unwrap(), "\"NASB\"");
        let t: Translation = serde_json::from_str("\"BSB\"").unwrap();
        assert_eq!(t, Translation::Bsb);
    }
}

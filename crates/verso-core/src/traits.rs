//! Parser abstraction
//!
//! Each upstream payload family has one implementation in `verso-parser`.
//! Implementations hold only immutable configuration, so a single instance can
//! be shared across threads and invoked concurrently.

use crate::error::ParserResult;
use crate::translation::{SourceFamily, Translation};
use crate::types::Chapter;
use verso_config::ParserConfig;

/// Turns one raw chapter payload into a canonical [`Chapter`]
pub trait ChapterParser: Send + Sync {
    /// Translation this instance was built for
    fn translation(&self) -> Translation;

    /// Payload family this implementation understands
    fn family(&self) -> SourceFamily;

    /// Configuration the instance consults while scanning
    fn config(&self) -> &ParserConfig;

    /// Parse an already-deserialized payload
    ///
    /// Either returns a chapter with at least one verse or a typed error.
    fn parse(&self, payload: &serde_json::Value) -> ParserResult<Chapter>;

    /// Parser name for diagnostics
    fn name(&self) -> String {
        format!("{:?}/{}", self.family(), self.translation())
    }
}

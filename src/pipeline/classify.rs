//! Format classifier: decide whether an answer is a table or prose.
//!
//! This is a marker check, not a parser. The prompt asks the model to open
//! tabular answers with a `Table:` line; anything containing the marker is
//! routed to the spreadsheet renderer, everything else to the document
//! renderer. Misclassifications are not detected.

/// Literal substring that marks an answer as tabular.
pub const TABLE_MARKER: &str = "Table:";

/// Output shape chosen for an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentShape {
    Tabular,
    Narrative,
}

/// `Tabular` exactly when `answer` contains [`TABLE_MARKER`].
pub fn classify(answer: &str) -> ContentShape {
    if answer.contains(TABLE_MARKER) {
        ContentShape::Tabular
    } else {
        ContentShape::Narrative
    }
}

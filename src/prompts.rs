//! Prompt construction for the content locator.
//!
//! The locator sends a single user message, built entirely here.

/// Instruction asking for a `Table:` marker line before tabular answers, so
/// the format classifier has something to key on.
pub const TABLE_FORMAT_HINT: &str = "If the associated content is a table, start your answer with a line containing only \"Table:\" and then give one row per line with cells separated by commas.";

/// Build the prompt that asks the model for the content under `heading`.
///
/// The heading is embedded verbatim between double quotes; the extracted text
/// follows in full, with no truncation.
pub fn locate_prompt(heading: &str, text: &str) -> String {
    format!(
        "Based on the extracted text from the PDF, find the heading \"{heading}\" and return its associated content. \
If the heading is not present, return a message indicating that.\n\
{TABLE_FORMAT_HINT}\n\
Extracted PDF Text:\n\
{text}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_heading_and_text() {
        let p = locate_prompt("Summary", "Summary\nTotal: 42");
        assert!(p.contains("find the heading \"Summary\""));
        assert!(p.ends_with("Extracted PDF Text:\nSummary\nTotal: 42"));
    }

    #[test]
    fn braces_in_inputs_are_copied_verbatim() {
        let p = locate_prompt("{text}", "literal {heading} in body");
        assert!(p.contains("\"{text}\""));
        assert!(p.ends_with("literal {heading} in body"));
    }

    #[test]
    fn prompt_mentions_not_found_and_table_marker() {
        let p = locate_prompt("Scope", "");
        assert!(p.contains("heading is not present"));
        assert!(p.contains("\"Table:\""));
    }
}

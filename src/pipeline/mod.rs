//! Pipeline stages for heading extraction.
//!
//! Each submodule implements exactly one transformation step and can be
//! tested on its own.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ extract ──▶ llm ──▶ classify ──▶ render
//! (path/URL) (pdf-extract) (Gemini) ("Table:") (xlsx/docx)
//! ```
//!
//! 1. [`input`]  : resolve the CLI's path or URL to a readable file; the
//!    server hands over its staged upload instead
//! 2. [`extract`]: pull plain text out of the PDF on the blocking pool
//! 3. [`llm`]    : ask the model for the text under the heading, with a
//!    per-attempt timeout and bounded retry; the only stage with network I/O
//! 4. [`classify`]: pick the output shape from the `Table:` marker in the
//!    raw answer
//! 5. [`table`] + [`render`]: decode tabular answers into a grid (after
//!    [`postprocess`] cleanup) and write the `.xlsx` or `.docx` artifact; a
//!    narrative answer goes into the document as returned

pub mod classify;
pub mod extract;
pub mod input;
pub mod llm;
pub mod postprocess;
pub mod render;
pub mod table;

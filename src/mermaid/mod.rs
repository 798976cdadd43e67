//! Mermaid flowchart and sequence diagram compiler.
//!
//! Parses Mermaid `flowchart`/`graph` and `sequenceDiagram` text into an AST,
//! lays the diagram out, and converts it into canvas creation requests
//! (boxes, connecting lines, frames) ready for the diagram service.

pub mod ast;
pub mod convert;
mod flow;
pub mod layout;
pub mod parse;
mod sequence;

pub use convert::{ConvertOptions, ConvertedDiagram, convert, convert_with};
pub use layout::{LayoutConfig, LayoutOverrides, PositionedDiagram, layout};
pub use parse::{ParseError, parse};

/// Parse, lay out and convert `text` in one pass, using the per-kind default
/// geometry with `overrides` layered on top.
///
/// # Errors
///
/// Returns a [`ParseError`] when the text cannot be parsed.
pub fn compile(text: &str, overrides: &LayoutOverrides) -> Result<ConvertedDiagram, ParseError> {
    compile_with(text, overrides, &ConvertOptions::default())
}

/// [`compile`] with explicit converter options.
///
/// # Errors
///
/// Returns a [`ParseError`] when the text cannot be parsed.
pub fn compile_with(
    text: &str,
    overrides: &LayoutOverrides,
    options: &ConvertOptions,
) -> Result<ConvertedDiagram, ParseError> {
    let diagram = parse(text)?;
    let config = LayoutConfig::for_kind(diagram.kind()).with_overrides(overrides);
    Ok(convert_with(&layout(diagram, &config), options))
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;

//! Template parser.
//!
//! Parsing runs in two passes: the grammar scans text into a concrete parse
//! tree of borrowed fragments, and the builder turns those fragments into the
//! owned AST in [`ast`]. The AST is immutable and can be rendered any number
//! of times.

pub mod ast;
mod builder;
mod cst;
pub mod error;
mod grammar;

pub use ast::*;
pub use error::ParseError;

/// Default limit on block and subexpression nesting.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Parse a template string into its root block.
pub fn parse_template(input: &str) -> Result<Block, ParseError> {
    parse_template_with_max_depth(input, DEFAULT_MAX_DEPTH)
}

/// Parse a template string, failing if blocks or subexpressions nest deeper
/// than `max_depth`.
#[tracing::instrument(level = "debug", skip_all, fields(len = input.len()))]
pub fn parse_template_with_max_depth(input: &str, max_depth: usize) -> Result<Block, ParseError> {
    match grammar::parse_fragments(input, max_depth) {
        Ok(fragments) => {
            let block = builder::build(fragments);
            tracing::trace!(nodes = block.items.len(), "parsed template");
            Ok(block)
        }
        Err(error) => {
            tracing::debug!(%error, "template failed to parse");
            Err(error)
        }
    }
}

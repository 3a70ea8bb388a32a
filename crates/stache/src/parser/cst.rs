//! Concrete parse tree produced by the grammar.
//!
//! Fragments borrow their text from the source template and only live for the
//! duration of a single parse call. The builder turns them into owned AST nodes.

use super::ast::{BlockTrim, Trim};

/// Which delimiter pair a tag was written with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Braces {
    /// `{{ ... }}`: output is escaped.
    Double,
    /// `{{{ ... }}}`: output is emitted raw.
    Triple,
}

impl Braces {
    pub(crate) fn open(self) -> &'static str {
        match self {
            Braces::Double => "{{",
            Braces::Triple => "{{{",
        }
    }

    pub(crate) fn close(self) -> &'static str {
        match self {
            Braces::Double => "}}",
            Braces::Triple => "}}}",
        }
    }
}

/// A top-level or block-level fragment of the template.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Fragment<'i> {
    /// A run of literal text, single braces included.
    Text(&'i str),
    /// `{{path}}` or `{{{path}}}`.
    Replacement {
        path: &'i str,
        braces: Braces,
        trim: Trim,
    },
    /// `{{name param...}}` or `{{{name param...}}}`.
    Helper {
        name: &'i str,
        params: Vec<Param<'i>>,
        braces: Braces,
        trim: Trim,
    },
    /// `{{> name key=value...}}`.
    Partial {
        name: &'i str,
        args: Vec<(&'i str, Param<'i>)>,
        trim: Trim,
    },
    /// `{{#name param... [as |a b|]}} body [{{else}} body] {{/name}}`.
    Block {
        name: &'i str,
        params: Vec<Param<'i>>,
        block_params: Option<Vec<&'i str>>,
        body: Vec<Fragment<'i>>,
        else_body: Option<Vec<Fragment<'i>>>,
        trim: BlockTrim,
    },
}

/// A helper or partial argument.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Param<'i> {
    Path(&'i str),
    Str(&'i str),
    Subexpression { name: &'i str, params: Vec<Param<'i>> },
}

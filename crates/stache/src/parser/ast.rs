//! Public AST types for templates.
//!
//! These types are public so helpers can inspect their parameters and blocks,
//! and so external tooling can walk a parsed template.

/// Whitespace-trim markers (`~`) recorded on one tag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Trim {
    /// Strip leading whitespace of the rendered value.
    pub left: bool,
    /// Strip trailing whitespace of the rendered value.
    pub right: bool,
}

impl Trim {
    /// No stripping on either side.
    pub const NONE: Trim = Trim {
        left: false,
        right: false,
    };

    /// Markers for the left and right side of a tag.
    pub fn new(left: bool, right: bool) -> Self {
        Self { left, right }
    }

    /// Apply the recorded stripping to a rendered value.
    pub fn apply(self, output: String) -> String {
        match (self.left, self.right) {
            (false, false) => output,
            (true, false) => output.trim_start().to_string(),
            (false, true) => output.trim_end().to_string(),
            (true, true) => output.trim().to_string(),
        }
    }
}

/// The six trim markers of a block construct, one pair per tag.
///
/// `{{~#each items~}} ... {{~else~}} ... {{~/each~}}`
///
/// Block markers are recorded for helpers to inspect; rendering never
/// strips block output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlockTrim {
    pub open: Trim,
    pub else_tag: Trim,
    pub close: Trim,
}

/// A renderable sequence of nodes.
///
/// The root of a parsed template is a `Block`, as are the bodies and else
/// bodies of block helpers. Helpers receive blocks unevaluated and render them
/// against whatever context they choose.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Block {
    pub items: Vec<Node>,
}

impl Block {
    pub fn new(items: Vec<Node>) -> Self {
        Self { items }
    }

    /// The nodes of this block, in template order.
    pub fn items(&self) -> &[Node] {
        &self.items
    }

    /// Append a node, for helpers that synthesize content.
    pub fn add_item(&mut self, item: Node) {
        self.items.push(item);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// A node of the template AST.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Literal template text.
    TemplateContent(String),
    /// A quoted string used as a parameter.
    StringLiteral(String),
    /// `{{{path}}}`: raw output.
    Replacement(Replacement),
    /// `{{path}}`: escaped output.
    EscapedReplacement(Replacement),
    /// `{{{helper ...}}}`, a subexpression, or a `{{#block}}` helper.
    Helper(HelperCall),
    /// `{{helper ...}}`: escaped output.
    EscapedHelper(HelperCall),
    /// `{{#helper ... as |a b|}}`.
    AsHelper(AsHelperCall),
    /// `{{> name}}`.
    Partial(PartialCall),
    /// `{{> name key=value}}`.
    PartialWithArgs(PartialCall),
    Block(Block),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Replacement {
    /// Dotted variable path, or the name of a zero-argument helper.
    pub path: String,
    pub trim: Trim,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HelperCall {
    pub name: String,
    pub params: Vec<Parameter>,
    pub block: Option<Block>,
    pub else_block: Option<Block>,
    /// Markers of an inline helper tag. Always [`Trim::NONE`] for block
    /// helpers, whose markers are in `block_trim`.
    pub trim: Trim,
    /// Markers of the open, else, and close tags of a block helper.
    pub block_trim: Option<BlockTrim>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AsHelperCall {
    pub name: String,
    pub params: Vec<Parameter>,
    /// Names between the pipes of `as |...|`.
    pub block_params: Vec<String>,
    pub block: Block,
    pub else_block: Option<Block>,
    /// Markers of the open and close tags. `else_tag` is always empty since
    /// this form's `{{else}}` takes no markers.
    pub trim: BlockTrim,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PartialCall {
    pub name: String,
    /// Empty for a plain `Partial`.
    pub args: Vec<Argument>,
    pub trim: Trim,
}

/// A `key=value` partial argument.
#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    pub key: String,
    pub value: Parameter,
}

/// A helper or partial argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Parameter {
    /// Dotted variable path, resolved against the context.
    Path(String),
    /// A nested node: a string literal or a subexpression helper call.
    Node(Box<Node>),
}

impl Parameter {
    pub fn path(path: impl Into<String>) -> Self {
        Parameter::Path(path.into())
    }

    pub fn literal(text: impl Into<String>) -> Self {
        Parameter::Node(Box::new(Node::StringLiteral(text.into())))
    }
}

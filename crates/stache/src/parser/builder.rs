//! Conversion of CST fragments into AST nodes.
//!
//! A purely structural pass: every fragment shape maps to exactly one node
//! constructor and nothing is evaluated.

use super::ast::{
    Argument, AsHelperCall, Block, HelperCall, Node, Parameter, PartialCall, Replacement, Trim,
};
use super::cst::{Braces, Fragment, Param};

/// Build the root block of a template.
pub(crate) fn build(fragments: Vec<Fragment<'_>>) -> Block {
    Block::new(build_nodes(fragments))
}

fn build_nodes(fragments: Vec<Fragment<'_>>) -> Vec<Node> {
    fragments.into_iter().map(build_node).collect()
}

fn build_node(fragment: Fragment<'_>) -> Node {
    match fragment {
        Fragment::Text(text) => Node::TemplateContent(text.to_string()),
        Fragment::Replacement { path, braces, trim } => {
            let replacement = Replacement {
                path: path.to_string(),
                trim,
            };
            match braces {
                Braces::Double => Node::EscapedReplacement(replacement),
                Braces::Triple => Node::Replacement(replacement),
            }
        }
        Fragment::Helper {
            name,
            params,
            braces,
            trim,
        } => {
            let call = HelperCall {
                name: name.to_string(),
                params: build_params(params),
                block: None,
                else_block: None,
                trim,
                block_trim: None,
            };
            match braces {
                Braces::Double => Node::EscapedHelper(call),
                Braces::Triple => Node::Helper(call),
            }
        }
        Fragment::Partial { name, args, trim } => {
            let args: Vec<Argument> = args
                .into_iter()
                .map(|(key, value)| Argument {
                    key: key.to_string(),
                    value: build_param(value),
                })
                .collect();
            let call = PartialCall {
                name: name.to_string(),
                args,
                trim,
            };
            if call.args.is_empty() {
                Node::Partial(call)
            } else {
                Node::PartialWithArgs(call)
            }
        }
        Fragment::Block {
            name,
            params,
            block_params,
            body,
            else_body,
            trim,
        } => {
            let block = Block::new(build_nodes(body));
            let else_block = else_body.map(|nodes| Block::new(build_nodes(nodes)));
            match block_params {
                Some(names) => Node::AsHelper(AsHelperCall {
                    name: name.to_string(),
                    params: build_params(params),
                    block_params: names.into_iter().map(str::to_string).collect(),
                    block,
                    else_block,
                    trim,
                }),
                None => Node::Helper(HelperCall {
                    name: name.to_string(),
                    params: build_params(params),
                    block: Some(block),
                    else_block,
                    trim: Trim::NONE,
                    block_trim: Some(trim),
                }),
            }
        }
    }
}

fn build_params(params: Vec<Param<'_>>) -> Vec<Parameter> {
    params.into_iter().map(build_param).collect()
}

fn build_param(param: Param<'_>) -> Parameter {
    match param {
        Param::Path(path) => Parameter::Path(path.to_string()),
        Param::Str(text) => Parameter::literal(text),
        Param::Subexpression { name, params } => Parameter::Node(Box::new(Node::Helper(
            HelperCall {
                name: name.to_string(),
                params: build_params(params),
                block: None,
                else_block: None,
                trim: Trim::NONE,
                block_trim: None,
            },
        ))),
    }
}

//! One rendering routine per block kind.
//!
//! Routines read fields and render child sockets through the [`GenerationPass`];
//! an empty socket falls back to a placeholder value so that an unfinished
//! program still produces parseable Hexput.

use crate::block::BlockKind;
use crate::error::GenerateError;
use crate::generator::{Code, GenerationPass};
use crate::order::Order;
use crate::workspace::{Block, BlockId};
use anyhow::Result;

pub(crate) fn render(pass: &mut GenerationPass<'_>, id: BlockId, block: &Block) -> Result<Code> {
    let code = match &block.kind {
        BlockKind::VariableDeclaration => {
            let name = block.field("VAR_NAME").unwrap_or_default();
            let value = value_or(pass, id, "VALUE", Order::ASSIGNMENT, "\"\"")?;
            Code::Stmt(format!("vl {} = {};\n", name, value))
        }
        BlockKind::ReturnStatement => {
            let value = value_or(pass, id, "VALUE", Order::NONE, "null")?;
            Code::Stmt(format!("res {};\n", value))
        }
        BlockKind::NumberLiteral => atomic(block.field("NUM").unwrap_or("0")),
        BlockKind::StringLiteral => {
            Code::Expr(quote(block.field("TEXT").unwrap_or_default()), Order::ATOMIC)
        }
        BlockKind::BooleanLiteral => atomic(block.field("BOOL").unwrap_or("true")),
        BlockKind::VariableReference => atomic(block.field("VAR_NAME").unwrap_or_default()),
        BlockKind::AnyConcat => binary(pass, id, "+", Order::ADDITION, "\"\"")?,
        BlockKind::MathSubtract => binary(pass, id, "-", Order::SUBTRACTION, "0")?,
        BlockKind::MathMultiply => binary(pass, id, "*", Order::MULTIPLICATION, "0")?,
        BlockKind::MathDivide => binary(pass, id, "/", Order::DIVISION, "0")?,
        BlockKind::LogicAnd => binary(pass, id, "&&", Order::LOGICAL_AND, "true")?,
        BlockKind::LogicOr => binary(pass, id, "||", Order::LOGICAL_OR, "false")?,
        BlockKind::LogicNot => {
            // Parenthesized unconditionally, so the operand needs no wrapping of its own.
            let value = value_or(pass, id, "BOOL", Order::NONE, "true")?;
            Code::Expr(format!("!({})", value), Order::LOGICAL_NOT)
        }
        BlockKind::ComparisonGt => binary(pass, id, ">", Order::RELATIONAL, "0")?,
        BlockKind::ComparisonLt => binary(pass, id, "<", Order::RELATIONAL, "0")?,
        BlockKind::ComparisonEq => binary(pass, id, "==", Order::EQUALITY, "0")?,
        BlockKind::ComparisonNeq => binary(pass, id, "!=", Order::EQUALITY, "0")?,
        BlockKind::ComparisonGte => binary(pass, id, ">=", Order::RELATIONAL, "0")?,
        BlockKind::ComparisonLte => binary(pass, id, "<=", Order::RELATIONAL, "0")?,
        BlockKind::IfStatement => {
            let condition = value_or(pass, id, "CONDITION", Order::NONE, "true")?;
            let body = pass.statement_to_code(id, "DO")?;
            Code::Stmt(format!("if {} {{\n{}}}\n", condition, body))
        }
        BlockKind::LoopStatement => {
            let var = block.field("ITER_VAR").unwrap_or_default();
            let iterable = value_or(pass, id, "ITERABLE", Order::MEMBER, "[]")?;
            let body = pass.statement_to_code(id, "DO")?;
            Code::Stmt(format!("loop {} in {} {{\n{}}}\n", var, iterable, body))
        }
        BlockKind::ArrayLiteral => {
            let items = separated_items(pass.chain_items(id, "ITEMS")?);
            Code::Expr(format!("[{}]", items.join(", ")), Order::ATOMIC)
        }
        BlockKind::ArrayItem => {
            let value = value_or(pass, id, "VALUE", Order::COMMA, "\"\"")?;
            Code::Stmt(format!("{},\n", value))
        }
        BlockKind::ObjectLiteral => {
            let properties = pass
                .chain_items(id, "PROPERTIES")?
                .into_iter()
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty())
                .collect::<Vec<_>>();
            if properties.is_empty() {
                atomic("{}")
            } else {
                Code::Expr(format!("{{ {} }}", properties.join(" ")), Order::ATOMIC)
            }
        }
        BlockKind::ObjectProperty => {
            let name = block.field("PROP_NAME").unwrap_or_default();
            let value = value_or(pass, id, "VALUE", Order::COMMA, "\"\"")?;
            Code::Stmt(format!("{}: {},", name, value))
        }
        BlockKind::ObjectPropertyAccess => {
            let object = value_or(pass, id, "OBJECT", Order::MEMBER, "null")?;
            let property = block.field("PROPERTY").unwrap_or_default();
            Code::Expr(format!("{}.{}", object, property), Order::MEMBER)
        }
        BlockKind::ObjectBracketAccess => {
            let object = value_or(pass, id, "OBJECT", Order::MEMBER, "null")?;
            let property = value_or(pass, id, "PROPERTY", Order::NONE, "\"property\"")?;
            Code::Expr(format!("{}[{}]", object, property), Order::MEMBER)
        }
        BlockKind::ArrayIndexAccess => {
            let array = value_or(pass, id, "ARRAY", Order::MEMBER, "[]")?;
            let index = value_or(pass, id, "INDEX", Order::NONE, "0")?;
            Code::Expr(format!("{}[{}]", array, index), Order::MEMBER)
        }
        BlockKind::FunctionCall => function_call(pass, id, block)?,
        BlockKind::FunctionParams => {
            if pass.take_consumed(id) {
                Code::Stmt(String::new())
            } else {
                let params = separated_items(pass.chain_items(id, "PARAMS")?);
                Code::Stmt(params.join(", "))
            }
        }
        BlockKind::FunctionParameter => {
            let value = value_or(pass, id, "PARAM_VALUE", Order::COMMA, "\"\"")?;
            Code::Stmt(format!("{},", value))
        }
        BlockKind::Custom(name) => {
            let value = pass
                .generator()
                .custom_literal(name)
                .ok_or_else(|| GenerateError::UnknownCustomType(name.clone()))?;
            atomic(value)
        }
    };
    Ok(code)
}

// The parameter list is a chained sibling, not an input. Render it here and mark
// it consumed so the chain walk that follows the call does not emit it again.
fn function_call(pass: &mut GenerationPass<'_>, id: BlockId, block: &Block) -> Result<Code> {
    let callee = value_or(pass, id, "FUNCTION_NAME", Order::ATOMIC, "undefined")?;
    let name = bare_callee(&callee);
    let Some(params) = block.next else {
        return Ok(Code::Expr(format!("{}()", name), Order::FUNCTION_CALL));
    };
    let args = pass.block_to_code(params, true)?.into_text();
    pass.consume(params);
    Ok(Code::Expr(format!("{}({})", name, args), Order::FUNCTION_CALL))
}

/// Strips one pair of enclosing quotes, then one pair of enclosing parentheses.
// A raw newline inside the quotes would be split and terminated by `finish`.
fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn bare_callee(callee: &str) -> &str {
    let mut name = callee.trim();
    if let Some(inner) = strip_pair(name, '"', '"') {
        name = inner.trim();
    }
    if let Some(inner) = strip_pair(name, '(', ')') {
        name = inner.trim();
    }
    name
}

fn strip_pair(text: &str, open: char, close: char) -> Option<&str> {
    if text.len() < 2 {
        return None;
    }
    text.strip_prefix(open)?.strip_suffix(close)
}

fn atomic(text: &str) -> Code {
    Code::Expr(text.to_string(), Order::ATOMIC)
}

fn value_or(
    pass: &mut GenerationPass<'_>,
    id: BlockId,
    input: &str,
    order: Order,
    default: &str,
) -> Result<String> {
    let code = pass.value_to_code(id, input, order)?;
    if code.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(code)
    }
}

fn binary(
    pass: &mut GenerationPass<'_>,
    id: BlockId,
    op: &str,
    order: Order,
    default: &str,
) -> Result<Code> {
    let a = value_or(pass, id, "A", order, default)?;
    let b = value_or(pass, id, "B", order, default)?;
    Ok(Code::Expr(format!("{} {} {}", a, op, b), order))
}

/// Item fragments end in `,` (and maybe a newline); drop that and skip empties.
fn separated_items(fragments: Vec<String>) -> Vec<String> {
    fragments
        .iter()
        .map(|f| f.trim())
        .map(|f| f.strip_suffix(',').unwrap_or(f).trim())
        .filter(|f| !f.is_empty())
        .map(ToString::to_string)
        .collect()
}

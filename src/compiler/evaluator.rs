use crate::compiler::operator::{Catalogue, OperatorFn};
use crate::compiler::stream::PrefixStream;
use crate::compiler::token::Token;
use anyhow::{bail, Context, Result};
use std::collections::HashMap;
use std::slice;

/// Evaluates a prefix token stream against a variable binding.
///
/// The stream is consumed front to back: an operator pulls its arity's worth
/// of sub-expressions, a literal parses its lexeme, a variable resolves
/// through the binding. Operator semantics come from the catalogue handlers,
/// so the evaluator itself is arithmetic-agnostic.
///
/// # Arguments
///
/// * `stream`: A prefix token stream, as produced by the parser.
/// * `catalogue`: The catalogue the stream was parsed against.
/// * `bindings`: Values for the variables appearing in the stream.
///
/// returns: The numeric value of the expression.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use prefix_compiler::compiler::{compile, evaluator::evaluate, operator::Catalogue};
/// # use anyhow::Result;
///
/// # fn main() -> Result<()> {
/// let stream = compile("x^2 + 1")?;
/// let bindings = HashMap::from([("x".to_string(), 3.0)]);
/// let value = evaluate(&stream, &Catalogue::standard(), &bindings)?;
/// assert_eq!(value, 10.0);
/// # Ok::<(), anyhow::Error>(()) }
/// ```
pub fn evaluate(
    stream: &PrefixStream,
    catalogue: &Catalogue,
    bindings: &HashMap<String, f64>,
) -> Result<f64> {
    let mut tokens = stream.iter();
    let value = evaluate_next(&mut tokens, catalogue, bindings)?;
    if tokens.next().is_some() {
        bail!("Leftover tokens after the first complete expression");
    }
    Ok(value)
}

fn evaluate_next(
    tokens: &mut slice::Iter<'_, Token>,
    catalogue: &Catalogue,
    bindings: &HashMap<String, f64>,
) -> Result<f64> {
    let token = tokens.next().context("Expected an operand")?;
    match token {
        Token::Number { lexeme, offset } => lexeme
            .parse()
            .with_context(|| format!("Invalid numeric literal `{lexeme}` at offset {offset}")),
        Token::Variable { name, offset } => bindings
            .get(name)
            .copied()
            .with_context(|| format!("Unbound variable `{name}` at offset {offset}")),
        Token::Operator { operator, .. } => match catalogue.get(*operator).function {
            OperatorFn::Unary(function) => {
                let operand = evaluate_next(tokens, catalogue, bindings)?;
                Ok(function(operand))
            }
            OperatorFn::Binary(function) => {
                let left = evaluate_next(tokens, catalogue, bindings)?;
                let right = evaluate_next(tokens, catalogue, bindings)?;
                Ok(function(left, right))
            }
        },
    }
}

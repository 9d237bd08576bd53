pub mod classifier;
pub mod error;
pub mod evaluator;
pub mod operator;
pub mod parser;
pub(crate) mod scanner;
pub mod stream;
pub mod token;
pub mod tree;

use crate::compiler::operator::Catalogue;
use crate::compiler::parser::Parser;
use crate::compiler::stream::PrefixStream;
use anyhow::Result;

pub use crate::compiler::error::ParseError;
pub use crate::compiler::token::Token;

/// Compiles the given infix expression into a prefix token stream, using the
/// standard operator catalogue.
///
/// # Arguments
///
/// * `expression`: A text expression in infix format.
///
/// returns: The expression as a flat token stream in prefix order.
///
/// # Examples
///
/// ```
/// use prefix_compiler::compiler::compile;
/// # use anyhow::Result;
///
/// # fn main() -> Result<()> {
/// let stream = compile("a + b * c")?;
/// assert_eq!(stream.len(), 5);
/// # Ok::<(), anyhow::Error>(()) }
/// ```
pub fn compile(expression: &str) -> Result<PrefixStream> {
    let catalogue = Catalogue::standard();
    let stream = Parser::new(&catalogue).parse(expression)?;
    Ok(stream)
}

/// Serialises a stream compiled against the standard catalogue into its
/// canonical `op#arg#arg` text form.
///
/// # Arguments
///
/// * `stream`: The stream to serialise.
///
/// returns: The canonical text.
///
/// # Examples
///
/// ```
/// use prefix_compiler::compiler::{compile, export};
/// # use anyhow::Result;
///
/// # fn main() -> Result<()> {
/// let stream = compile("a + b * c")?;
/// assert_eq!(export(&stream)?, "+#a#*#b#c");
/// # Ok::<(), anyhow::Error>(()) }
/// ```
pub fn export(stream: &PrefixStream) -> Result<String> {
    stream.export(&Catalogue::standard())
}

/// Loads a stream from its canonical text form, against the standard
/// catalogue.
///
/// # Arguments
///
/// * `text`: Canonical `op#arg#arg` text, as produced by [`export`].
///
/// returns: The reconstructed token stream.
pub fn import(text: &str) -> Result<PrefixStream> {
    PrefixStream::import(text, &Catalogue::standard())
}

/// Parses input that must consist of exactly one variable name, using the
/// standard operator catalogue.
///
/// # Arguments
///
/// * `input`: The candidate variable name.
///
/// returns: The identifier, when it is a single word that does not collide
/// with any operator name.
pub fn parse_variable(input: &str) -> Result<String> {
    let catalogue = Catalogue::standard();
    let name = Parser::new(&catalogue).parse_variable(input)?;
    Ok(name)
}

#[macro_export]
#[cfg(debug_assertions)]
macro_rules! debug {
    ($( $args:expr ),*) => { dbg!( $( $args ),* ); }
}

#[macro_export]
#[cfg(not(debug_assertions))]
macro_rules! debug {
    ($( $args:expr ),*) => {()}
}

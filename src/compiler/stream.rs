use crate::compiler::operator::{is_word_name, Catalogue, Category};
use crate::compiler::token::Token;
use anyhow::{Context, Result};
use string_builder::Builder;

/// The parser's product: tokens in preorder, consumed front to back.
///
/// The stream owns copies of every token, so it outlives the parse that
/// produced it; only operator handles still point into the catalogue.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PrefixStream {
    tokens: Vec<Token>,
}

/// Separator between tokens in the canonical text form.
const SEPARATOR: char = '#';

impl PrefixStream {
    pub(crate) fn new(tokens: Vec<Token>) -> PrefixStream {
        PrefixStream { tokens }
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    /// Serialises the stream into its canonical text form: the textual form
    /// of every token, joined by `#`.
    ///
    /// # Arguments
    ///
    /// * `catalogue`: The catalogue the stream was parsed against.
    ///
    /// returns: The canonical `op#arg#arg` text.
    pub fn export(&self, catalogue: &Catalogue) -> Result<String> {
        let mut builder = Builder::new(self.tokens.len());
        let pieces = self.tokens.iter().map(|token| token.text(catalogue));
        // Have to use fully qualified syntax here until 'intersperse' is added into stdlib
        for piece in itertools::Itertools::intersperse(pieces, SEPARATOR.to_string()) {
            builder.append(piece);
        }
        builder.string().context("Failed to build export string")
    }

    /// Re-tokenises canonical text produced by [`PrefixStream::export`].
    ///
    /// Each `#`-separated piece resolves as a number first, then as an
    /// operator (infix before prefix), then as a variable name. Offsets are
    /// the piece positions within the text.
    pub fn import(text: &str, catalogue: &Catalogue) -> Result<PrefixStream> {
        let mut tokens = Vec::new();
        let mut offset = 0;
        for piece in text.split(SEPARATOR) {
            let token = resolve_piece(piece, offset, catalogue)
                .with_context(|| format!("Unrecognised token `{piece}` at offset {offset}"))?;
            tokens.push(token);
            offset += piece.chars().count() + 1;
        }
        Ok(PrefixStream::new(tokens))
    }
}

fn resolve_piece(piece: &str, offset: usize, catalogue: &Catalogue) -> Option<Token> {
    if piece.is_empty() {
        return None;
    }
    if piece.parse::<f64>().is_ok() && !catalogue.is_known(piece) {
        return Some(Token::Number {
            lexeme: piece.to_string(),
            offset,
        });
    }
    if let Some(operator) = catalogue
        .find(piece, Category::Infix)
        .or_else(|| catalogue.find(piece, Category::Prefix))
    {
        return Some(Token::Operator { operator, offset });
    }
    if is_word_name(piece) && !catalogue.is_known(piece) {
        return Some(Token::Variable {
            name: piece.to_string(),
            offset,
        });
    }
    None
}

impl IntoIterator for PrefixStream {
    type Item = Token;
    type IntoIter = std::vec::IntoIter<Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.into_iter()
    }
}

impl<'a> IntoIterator for &'a PrefixStream {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}

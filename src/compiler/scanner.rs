use crate::compiler::classifier::{classify, CharClass};
use crate::compiler::operator::{Catalogue, Category};
use crate::compiler::token::Token;
use crate::compiler::tree::{NodeArena, NodeKey};

/// Position-keeping matcher over one input string.
///
/// Every primitive observes two contracts: it advances the cursor on success
/// and restores it on failure (callers snapshot with [`Scanner::position`]
/// around larger backtracking regions), and whitespace is skipped before
/// each match attempt and again after a successful one.
pub(crate) struct Scanner<'c> {
    chars: Vec<char>,
    classes: Vec<CharClass>,
    catalogue: &'c Catalogue,
    decimal_separator: char,
    at: usize,
}

impl<'c> Scanner<'c> {
    pub(crate) fn new(input: &str, catalogue: &'c Catalogue, decimal_separator: char) -> Scanner<'c> {
        let chars: Vec<char> = input.chars().collect();
        let classes = classify(&chars);
        Scanner {
            chars,
            classes,
            catalogue,
            decimal_separator,
            at: 0,
        }
    }

    /// The current cursor position, a snapshot for later [`Scanner::restore`].
    pub(crate) fn position(&self) -> usize {
        self.at
    }

    pub(crate) fn restore(&mut self, position: usize) {
        self.at = position;
    }

    pub(crate) fn at_end(&self) -> bool {
        self.at >= self.chars.len()
    }

    fn class_at(&self) -> Option<CharClass> {
        self.classes.get(self.at).copied()
    }

    fn char_at(&self) -> Option<char> {
        self.chars.get(self.at).copied()
    }

    pub(crate) fn skip_whitespace(&mut self) {
        while self.class_at() == Some(CharClass::Whitespace) {
            self.at += 1;
        }
    }

    /// Consumes a maximal letter-led run of letters and digits. Returns the
    /// word and the offset of its first character.
    pub(crate) fn match_word(&mut self) -> Option<(String, usize)> {
        self.skip_whitespace();
        if self.class_at() != Some(CharClass::Letter) {
            return None;
        }

        let start = self.at;
        while matches!(self.class_at(), Some(CharClass::Letter | CharClass::Digit)) {
            self.at += 1;
        }
        let word = self.chars[start..self.at].iter().collect();
        self.skip_whitespace();
        Some((word, start))
    }

    pub(crate) fn match_opening_brace(&mut self) -> bool {
        self.match_single('(')
    }

    pub(crate) fn match_closing_brace(&mut self) -> bool {
        self.match_single(')')
    }

    fn match_single(&mut self, expected: char) -> bool {
        self.skip_whitespace();
        if self.char_at() != Some(expected) {
            return false;
        }
        self.at += 1;
        self.skip_whitespace();
        true
    }

    /// Consumes a numeric literal: a maximal digit run that may contain at
    /// most one decimal separator. A leading `-` belongs to the literal when
    /// a digit follows it directly.
    pub(crate) fn match_number(&mut self, arena: &mut NodeArena) -> Option<NodeKey> {
        self.skip_whitespace();
        let start = self.at;
        let mut end = start;

        if self.chars.get(end) == Some(&'-')
            && matches!(self.classes.get(end + 1), Some(CharClass::Digit))
        {
            end += 1;
        }
        if !matches!(self.classes.get(end), Some(CharClass::Digit)) {
            return None;
        }
        while matches!(self.classes.get(end), Some(CharClass::Digit)) {
            end += 1;
        }
        if self.chars.get(end) == Some(&self.decimal_separator)
            && matches!(self.classes.get(end + 1), Some(CharClass::Digit))
        {
            end += 1;
            while matches!(self.classes.get(end), Some(CharClass::Digit)) {
                end += 1;
            }
        }

        let lexeme = self.chars[start..end].iter().collect();
        self.at = end;
        self.skip_whitespace();
        Some(arena.insert(Token::Number {
            lexeme,
            offset: start,
        }))
    }

    /// Consumes a word that does not collide with any known operator name.
    pub(crate) fn match_variable_name(&mut self, arena: &mut NodeArena) -> Option<NodeKey> {
        let start = self.position();
        let (name, offset) = self.match_word()?;
        if self.catalogue.is_known(&name) {
            self.restore(start);
            return None;
        }
        Some(arena.insert(Token::Variable { name, offset }))
    }

    /// Consumes an operator of the category, in word or symbolic form.
    ///
    /// Word form: the word is consumed before the catalogue lookup, and on a
    /// lookup miss it stays consumed with no node produced. Callers snapshot
    /// around every operator attempt, so the advanced cursor never leaks
    /// into a successful parse.
    ///
    /// Symbolic form: longest match, trying candidate lengths from the
    /// catalogue's longest symbolic entry down to one code point.
    pub(crate) fn match_operator(
        &mut self,
        category: Category,
        arena: &mut NodeArena,
    ) -> Option<NodeKey> {
        self.skip_whitespace();

        if self.class_at() == Some(CharClass::Letter) {
            let (word, offset) = self.match_word()?;
            let operator = self.catalogue.find(&word, category)?;
            return Some(arena.insert(Token::Operator { operator, offset }));
        }

        let start = self.at;
        let remaining = self.chars.len() - self.at;
        let longest = self.catalogue.longest_symbolic(category).min(remaining);
        for length in (1..=longest).rev() {
            let candidate: String = self.chars[start..start + length].iter().collect();
            if let Some(operator) = self.catalogue.find(&candidate, category) {
                self.at += length;
                self.skip_whitespace();
                return Some(arena.insert(Token::Operator {
                    operator,
                    offset: start,
                }));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::operator::OperatorInfo;
    use pretty_assertions::assert_eq;

    fn scanner<'c>(input: &str, catalogue: &'c Catalogue) -> Scanner<'c> {
        Scanner::new(input, catalogue, '.')
    }

    #[test]
    fn match_word_consumes_letters_and_digits() {
        let catalogue = Catalogue::standard();
        let mut scanner = scanner("  alpha2 + 1", &catalogue);

        let (word, offset) = scanner.match_word().unwrap();

        assert_eq!(word, "alpha2");
        assert_eq!(offset, 2);
        assert_eq!(scanner.position(), 9);
    }

    #[test]
    fn match_word_fails_without_moving_past_digits() {
        let catalogue = Catalogue::standard();
        let mut scanner = scanner("1abc", &catalogue);

        assert!(scanner.match_word().is_none());
        assert_eq!(scanner.position(), 0);
    }

    #[test]
    fn match_number_consumes_a_decimal_literal() {
        let catalogue = Catalogue::standard();
        let mut arena = NodeArena::new();
        let mut scanner = scanner("0.25 + x", &catalogue);

        let key = scanner.match_number(&mut arena).unwrap();

        assert_eq!(
            arena.node(key).token,
            Token::Number {
                lexeme: "0.25".to_string(),
                offset: 0,
            }
        );
    }

    #[test]
    fn match_number_takes_a_leading_minus_when_a_digit_follows() {
        let catalogue = Catalogue::standard();
        let mut arena = NodeArena::new();
        let mut scanner = scanner("-17", &catalogue);

        let key = scanner.match_number(&mut arena).unwrap();

        assert_eq!(
            arena.node(key).token,
            Token::Number {
                lexeme: "-17".to_string(),
                offset: 0,
            }
        );
    }

    #[test]
    fn match_number_rejects_a_bare_minus() {
        let catalogue = Catalogue::standard();
        let mut arena = NodeArena::new();
        let mut scanner = scanner("-x", &catalogue);

        assert!(scanner.match_number(&mut arena).is_none());
        assert_eq!(scanner.position(), 0);
    }

    #[test]
    fn match_number_stops_at_a_second_separator() {
        let catalogue = Catalogue::standard();
        let mut arena = NodeArena::new();
        let mut scanner = scanner("1.2.3", &catalogue);

        let key = scanner.match_number(&mut arena).unwrap();

        assert_eq!(
            arena.node(key).token,
            Token::Number {
                lexeme: "1.2".to_string(),
                offset: 0,
            }
        );
        assert_eq!(scanner.position(), 3);
    }

    #[test]
    fn match_number_honours_a_custom_separator() {
        let catalogue = Catalogue::standard();
        let mut arena = NodeArena::new();
        let mut scanner = Scanner::new("3;14", &catalogue, ';');

        let key = scanner.match_number(&mut arena).unwrap();

        assert_eq!(
            arena.node(key).token,
            Token::Number {
                lexeme: "3;14".to_string(),
                offset: 0,
            }
        );
    }

    #[test]
    fn match_variable_name_rejects_operator_words_and_restores_the_cursor() {
        let catalogue = Catalogue::standard();
        let mut arena = NodeArena::new();
        let mut scanner = scanner("mod", &catalogue);

        assert!(scanner.match_variable_name(&mut arena).is_none());
        assert_eq!(scanner.position(), 0);
        assert!(arena.is_empty());
    }

    #[test]
    fn match_operator_resolves_word_form() {
        let catalogue = Catalogue::standard();
        let mut arena = NodeArena::new();
        let mut scanner = scanner(" div 2", &catalogue);

        let key = scanner.match_operator(Category::Infix, &mut arena).unwrap();

        let expected = catalogue.find("div", Category::Infix).unwrap();
        assert_eq!(
            arena.node(key).token,
            Token::Operator {
                operator: expected,
                offset: 1,
            }
        );
    }

    #[test]
    fn match_operator_word_miss_leaves_the_word_consumed() {
        // The word is consumed before the lookup; a miss does not restore.
        // Grammar alternatives snapshot around operator attempts, which is
        // what keeps this from leaking into a successful parse.
        let catalogue = Catalogue::standard();
        let mut arena = NodeArena::new();
        let mut scanner = scanner("notanop + 1", &catalogue);

        assert!(scanner.match_operator(Category::Infix, &mut arena).is_none());
        assert_eq!(scanner.position(), 8);
    }

    #[test]
    fn match_operator_prefers_the_longest_symbolic_match() {
        let catalogue = Catalogue::with_operators(vec![
            OperatorInfo::infix("<", 0, |a, b| a + b),
            OperatorInfo::infix("<=", 0, |a, b| a + b),
        ]);
        let mut arena = NodeArena::new();
        let mut scanner = Scanner::new("<=1", &catalogue, '.');

        let key = scanner.match_operator(Category::Infix, &mut arena).unwrap();

        let expected = catalogue.find("<=", Category::Infix).unwrap();
        assert_eq!(
            arena.node(key).token,
            Token::Operator {
                operator: expected,
                offset: 0,
            }
        );
        assert_eq!(scanner.position(), 2);
    }

    #[test]
    fn match_operator_symbolic_miss_restores_the_cursor() {
        let catalogue = Catalogue::standard();
        let mut arena = NodeArena::new();
        let mut scanner = scanner(", 0", &catalogue);

        assert!(scanner.match_operator(Category::Infix, &mut arena).is_none());
        assert_eq!(scanner.position(), 0);
    }

    #[test]
    fn braces_match_with_surrounding_whitespace() {
        let catalogue = Catalogue::standard();
        let mut scanner = scanner("  ( x )", &catalogue);

        assert!(scanner.match_opening_brace());
        assert_eq!(scanner.position(), 4);
        assert!(!scanner.match_opening_brace());
    }
}

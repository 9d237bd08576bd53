use crate::compiler::error::ParseError;
use crate::compiler::operator::{Catalogue, Category};
use crate::compiler::scanner::Scanner;
use crate::compiler::stream::PrefixStream;
use crate::compiler::token::Token;
use crate::compiler::tree::{NodeArena, NodeKey};
use crate::debug;

/// Flags steering one `parse_statement` call.
///
/// `full` requires the cursor to reach end-of-input for the match to count;
/// `not_operation` forbids the operation alternative, which is what breaks
/// the left recursion of the infix production.
#[derive(Debug, Clone, Copy, Default)]
struct StatementFlags {
    full: bool,
    not_operation: bool,
}

/// Recursive-descent parser over one operator catalogue.
///
/// The parser itself is immutable and reusable; all per-call state (cursor,
/// class table, node arena) lives in a context created inside each
/// [`Parser::parse`] call, so concurrent parses over one `Parser` are
/// independent and the arena is released when the call returns.
pub struct Parser<'c> {
    catalogue: &'c Catalogue,
    decimal_separator: char,
}

impl<'c> Parser<'c> {
    pub fn new(catalogue: &'c Catalogue) -> Parser<'c> {
        Parser {
            catalogue,
            decimal_separator: '.',
        }
    }

    /// Overrides the decimal separator used by the number scanner.
    pub fn with_decimal_separator(mut self, separator: char) -> Parser<'c> {
        self.decimal_separator = separator;
        self
    }

    /// Parses a complete expression into a prefix token stream.
    ///
    /// # Arguments
    ///
    /// * `input`: The text-representation of the infix expression.
    ///
    /// returns: The expression as a flat token stream in preorder.
    pub fn parse(&self, input: &str) -> Result<PrefixStream, ParseError> {
        let mut context = ParseContext {
            scanner: Scanner::new(input, self.catalogue, self.decimal_separator),
            arena: NodeArena::new(),
            catalogue: self.catalogue,
        };

        let flags = StatementFlags {
            full: true,
            not_operation: false,
        };
        let Some(root) = context.parse_statement(flags)? else {
            return Err(ParseError::ParsingFailed);
        };
        debug!(&context.arena.render(root, self.catalogue));

        Ok(PrefixStream::new(context.arena.linearize(root)))
    }

    /// Parses input that must consist of exactly one variable name.
    ///
    /// # Arguments
    ///
    /// * `input`: The candidate variable name, surrounding whitespace allowed.
    ///
    /// returns: The identifier, when it does not collide with any operator.
    pub fn parse_variable(&self, input: &str) -> Result<String, ParseError> {
        let mut scanner = Scanner::new(input, self.catalogue, self.decimal_separator);
        let invalid = || ParseError::InvalidVariableName {
            name: input.trim().to_string(),
        };

        let Some((name, _)) = scanner.match_word() else {
            return Err(invalid());
        };
        if self.catalogue.is_known(&name) || !scanner.at_end() {
            return Err(invalid());
        }
        Ok(name)
    }
}

/// Per-call parser state: one scanner, one arena, one catalogue reference.
struct ParseContext<'c> {
    scanner: Scanner<'c>,
    arena: NodeArena,
    catalogue: &'c Catalogue,
}

/// Soft failure is `Ok(None)` with the cursor restored by the caller that
/// holds the snapshot; `Err` is a hard error that aborts the whole parse.
type Alternative = Result<Option<NodeKey>, ParseError>;

impl ParseContext<'_> {
    /// statement = operation | block | operand, first success wins.
    fn parse_statement(&mut self, flags: StatementFlags) -> Alternative {
        let start = self.scanner.position();

        if !flags.not_operation {
            if let Some(node) = self.parse_operation()? {
                if self.matches_full(flags) {
                    return Ok(Some(node));
                }
            }
            self.scanner.restore(start);
        }

        if let Some(node) = self.parse_block()? {
            if self.matches_full(flags) {
                return Ok(Some(node));
            }
            self.scanner.restore(start);
        }

        if let Some(node) = self.parse_operand() {
            if self.matches_full(flags) {
                return Ok(Some(node));
            }
            self.scanner.restore(start);
        }

        Ok(None)
    }

    fn matches_full(&mut self, flags: StatementFlags) -> bool {
        if !flags.full {
            return true;
        }
        self.scanner.skip_whitespace();
        self.scanner.at_end()
    }

    /// operation = (prefix_op statement) | (statement[¬operation] infix_op statement)
    fn parse_operation(&mut self) -> Alternative {
        let start = self.scanner.position();

        if let Some(operator) = self.scanner.match_operator(Category::Prefix, &mut self.arena) {
            if let Some(operand) = self.parse_statement(StatementFlags::default())? {
                self.arena.node_mut(operator).right = Some(operand);
                return Ok(Some(self.fix_precedence(operator, operand, Category::Prefix)));
            }
        }
        self.scanner.restore(start);

        let left_flags = StatementFlags {
            not_operation: true,
            ..StatementFlags::default()
        };
        if let Some(left) = self.parse_statement(left_flags)? {
            if let Some(operator) = self.scanner.match_operator(Category::Infix, &mut self.arena) {
                if let Some(right) = self.parse_statement(StatementFlags::default())? {
                    let node = self.arena.node_mut(operator);
                    node.left = Some(left);
                    node.right = Some(right);
                    return Ok(Some(self.fix_precedence(operator, right, Category::Infix)));
                }
            }
        }
        self.scanner.restore(start);

        Ok(None)
    }

    /// block = '(' statement ')'. Once the opening brace is consumed, a
    /// missing statement or closing brace is a hard error.
    fn parse_block(&mut self) -> Alternative {
        if !self.scanner.match_opening_brace() {
            return Ok(None);
        }

        let Some(statement) = self.parse_statement(StatementFlags::default())? else {
            return Err(ParseError::InvalidStatement);
        };
        if !self.scanner.match_closing_brace() {
            return Err(ParseError::UnmatchedBraces);
        }

        self.arena.node_mut(statement).grouped = true;
        Ok(Some(statement))
    }

    /// operand = number | variable
    fn parse_operand(&mut self) -> Option<NodeKey> {
        if let Some(node) = self.scanner.match_number(&mut self.arena) {
            return Some(node);
        }
        self.scanner.match_variable_name(&mut self.arena)
    }

    /// Re-associates the freshly attached right operand of `operator`.
    ///
    /// The descent is right-skewed, so after `operator.right = attached` the
    /// attached subtree may hold an operator of equal or lower priority that
    /// should have bound first. `operator` is pushed down into the left
    /// spine of `attached` until the priorities admit it, and the original
    /// `attached` root becomes the root of the rewritten subtree. Grouped
    /// subtrees are atomic: they never trigger and are never descended into.
    fn fix_precedence(
        &mut self,
        operator: NodeKey,
        attached: NodeKey,
        category: Category,
    ) -> NodeKey {
        let demoted = self.lower_priority_than(Some(attached), operator)
            && self.arena.node(attached).left.is_some();
        let triggered = match category {
            Category::Infix => demoted,
            Category::Prefix => demoted || self.left_grouped(Some(attached)),
        };
        if !triggered {
            return operator;
        }

        let mut target = attached;
        loop {
            let left = self.arena.node(target).left;
            if !self.lower_priority_than(left, operator) {
                break;
            }
            let left = left.expect("A node admitted by priority comparison exists");
            // Stop above nodes with no left spine (prefix operators), so the
            // pivot below always exists.
            if self.arena.node(left).left.is_none() {
                break;
            }
            target = left;
        }

        let pivot = self
            .arena
            .node(target)
            .left
            .expect("The descent keeps a left child under the target");
        self.arena.node_mut(operator).right = Some(pivot);
        self.arena.node_mut(target).left = Some(operator);
        attached
    }

    /// True when `compare` is an ungrouped operator node whose priority does
    /// not exceed that of `against`. The non-strict comparison is what makes
    /// equal-priority operators associate to the left.
    fn lower_priority_than(&self, compare: Option<NodeKey>, against: NodeKey) -> bool {
        let Some(compare) = compare else {
            return false;
        };
        let node = self.arena.node(compare);
        if node.grouped {
            return false;
        }
        match (self.priority_of(compare), self.priority_of(against)) {
            (Some(compare_priority), Some(against_priority)) => {
                compare_priority <= against_priority
            }
            _ => false,
        }
    }

    /// True when `compare` is an ungrouped operator node whose left child is
    /// grouped.
    fn left_grouped(&self, compare: Option<NodeKey>) -> bool {
        let Some(compare) = compare else {
            return false;
        };
        let node = self.arena.node(compare);
        if node.grouped || self.priority_of(compare).is_none() {
            return false;
        }
        match node.left {
            Some(left) => self.arena.node(left).grouped,
            None => false,
        }
    }

    fn priority_of(&self, key: NodeKey) -> Option<u8> {
        match self.arena.node(key).token {
            Token::Operator { operator, .. } => Some(self.catalogue.get(operator).priority),
            _ => None,
        }
    }
}

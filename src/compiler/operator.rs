use crate::compiler::classifier::{classify_char, CharClass};
use std::fmt;
use std::fmt::Formatter;

/// Grammatical category of an operator, which also implies its arity:
/// prefix operators take one operand, infix operators take two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Prefix,
    Infix,
}

/// Textual form of an operator name. Word-form operators match under
/// identifier rules; symbolic operators match by longest prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Form {
    Symbolic,
    Word,
}

/// The arithmetic handler attached to a catalogue entry.
#[derive(Clone, Copy)]
pub enum OperatorFn {
    Unary(fn(f64) -> f64),
    Binary(fn(f64, f64) -> f64),
}

/// One catalogue entry.
pub struct OperatorInfo {
    pub name: String,
    pub category: Category,
    pub priority: u8,
    pub form: Form,
    pub function: OperatorFn,
}

impl OperatorInfo {
    /// Creates an infix entry. The form is derived from the name.
    pub fn infix(name: &str, priority: u8, function: fn(f64, f64) -> f64) -> OperatorInfo {
        OperatorInfo {
            name: name.to_string(),
            category: Category::Infix,
            priority,
            form: derive_form(name),
            function: OperatorFn::Binary(function),
        }
    }

    /// Creates a prefix entry. The form is derived from the name.
    pub fn prefix(name: &str, priority: u8, function: fn(f64) -> f64) -> OperatorInfo {
        OperatorInfo {
            name: name.to_string(),
            category: Category::Prefix,
            priority,
            form: derive_form(name),
            function: OperatorFn::Unary(function),
        }
    }
}

impl fmt::Debug for OperatorInfo {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:?}, priority {})", self.name, self.category, self.priority)
    }
}

fn derive_form(name: &str) -> Form {
    if is_word_name(name) {
        Form::Word
    } else {
        Form::Symbolic
    }
}

/// Returns true when the name matches identifier rules: a letter followed by
/// letters or digits.
pub(crate) fn is_word_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    classify_char(first) == CharClass::Letter
        && chars.all(|ch| matches!(classify_char(ch), CharClass::Letter | CharClass::Digit))
}

/// Copyable handle into the operator catalogue. Token streams store handles,
/// never owned entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OperatorRef(usize);

/// The registry of known operators, fixed for the lifetime of a parser.
///
/// The same textual name may exist in both the prefix and the infix category
/// (disambiguation is by parse context), but a (name, category) pair resolves
/// to at most one entry.
pub struct Catalogue {
    entries: Vec<OperatorInfo>,
    longest_symbolic_prefix: usize,
    longest_symbolic_infix: usize,
}

impl Catalogue {
    /// Builds a catalogue from the given entries.
    pub fn with_operators(entries: Vec<OperatorInfo>) -> Catalogue {
        let longest = |category: Category| {
            entries
                .iter()
                .filter(|info| info.category == category && info.form == Form::Symbolic)
                .map(|info| info.name.chars().count())
                .max()
                .unwrap_or(0)
        };
        let longest_symbolic_prefix = longest(Category::Prefix);
        let longest_symbolic_infix = longest(Category::Infix);
        Catalogue {
            entries,
            longest_symbolic_prefix,
            longest_symbolic_infix,
        }
    }

    /// The default operator table.
    ///
    /// It carries no symbolic prefix operator: a leading `-` on a digit is
    /// scanned as the sign of the literal instead, so `-1` stays one token.
    pub fn standard() -> Catalogue {
        Catalogue::with_operators(vec![
            OperatorInfo::infix("+", 1, |a, b| a + b),
            OperatorInfo::infix("-", 1, |a, b| a - b),
            OperatorInfo::infix("*", 2, |a, b| a * b),
            OperatorInfo::infix("/", 2, |a, b| a / b),
            OperatorInfo::infix("div", 2, |a, b| (a / b).trunc()),
            OperatorInfo::infix("mod", 2, |a, b| a % b),
            OperatorInfo::infix("^", 3, f64::powf),
            OperatorInfo::prefix("sqrt", 4, f64::sqrt),
            OperatorInfo::prefix("ln", 4, f64::ln),
        ])
    }

    /// Looks up an operator by exact name within one category.
    pub fn find(&self, name: &str, category: Category) -> Option<OperatorRef> {
        self.entries
            .iter()
            .position(|info| info.category == category && info.name == name)
            .map(OperatorRef)
    }

    /// Resolves a handle back into its entry.
    pub fn get(&self, operator: OperatorRef) -> &OperatorInfo {
        &self.entries[operator.0]
    }

    /// Returns true when the name matches any entry in any category.
    pub fn is_known(&self, name: &str) -> bool {
        self.entries.iter().any(|info| info.name == name)
    }

    /// The maximum length, in code points, among symbolic operators of the
    /// category. Bounds the longest-match scan.
    pub fn longest_symbolic(&self, category: Category) -> usize {
        match category {
            Category::Prefix => self.longest_symbolic_prefix,
            Category::Infix => self.longest_symbolic_infix,
        }
    }
}

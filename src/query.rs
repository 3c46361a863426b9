//! Parsing of free-form search input.
//!
//! `;` separates OR-groups, `,` separates AND-terms inside a group. A term
//! is `[-][field:]value`, where a value starting with `>`, `<` or `=` turns
//! the term into a numeric/length comparison. Malformed fragments never
//! produce errors; they are dropped.

/// Inputs shorter than this (after trimming) skip scoring entirely.
pub const MIN_QUERY_CHARS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Greater,
    Less,
    Equal,
}

impl CompareOp {
    fn from_prefix(c: char) -> Option<Self> {
        match c {
            '>' => Some(CompareOp::Greater),
            '<' => Some(CompareOp::Less),
            '=' => Some(CompareOp::Equal),
            _ => None,
        }
    }

    pub fn holds(self, lhs: f64, rhs: f64) -> bool {
        match self {
            CompareOp::Greater => lhs > rhs,
            CompareOp::Less => lhs < rhs,
            CompareOp::Equal => lhs == rhs,
        }
    }
}

/// What a term looks for in a field value.
#[derive(Debug, Clone, PartialEq)]
pub enum TermMatch {
    /// Case-insensitive substring / exact scalar match.
    Contains(String),
    /// Numeric or length comparison; the operand is kept raw and parsed
    /// when matching so a non-numeric operand simply never matches.
    Compare { op: CompareOp, operand: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Term {
    pub negated: bool,
    /// Logical field name, `None` to match against every field.
    pub field: Option<String>,
    pub matcher: TermMatch,
}

/// AND-terms: a record must satisfy all of them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Group {
    pub terms: Vec<Term>,
}

/// OR-groups: a record must satisfy at least one.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Query {
    pub groups: Vec<Group>,
}

/// The outcome of reading the search box.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedInput {
    /// Too short to search, or nothing usable: show everything.
    Browse,
    Search(Query),
}

/// Classify raw input as browsing or a scored search.
pub fn parse_input(raw: &str) -> ParsedInput {
    if raw.trim().chars().count() < MIN_QUERY_CHARS {
        return ParsedInput::Browse;
    }
    let query = Query::parse(raw);
    if query.groups.is_empty() {
        ParsedInput::Browse
    } else {
        ParsedInput::Search(query)
    }
}

impl Query {
    pub fn parse(raw: &str) -> Self {
        let groups = raw
            .split(';')
            .map(Group::parse)
            .filter(|group| !group.terms.is_empty())
            .collect();
        Self { groups }
    }
}

impl Group {
    pub fn parse(raw: &str) -> Self {
        let terms = raw.split(',').filter_map(Term::parse).collect();
        Self { terms }
    }
}

impl Term {
    /// Parse a single term, returning `None` for empty fragments.
    pub fn parse(raw: &str) -> Option<Self> {
        let mut text = raw.trim();
        let negated = text.starts_with('-');
        if negated {
            text = text[1..].trim_start();
        }

        let (field, value) = match text.split_once(':') {
            Some((field, value)) => {
                let field = field.trim();
                ((!field.is_empty()).then(|| field.to_string()), value.trim())
            }
            None => (None, text),
        };
        if value.is_empty() {
            return None;
        }

        let mut chars = value.chars();
        let matcher = match chars.next().and_then(CompareOp::from_prefix) {
            Some(op) => TermMatch::Compare {
                op,
                operand: chars.as_str().trim().to_string(),
            },
            None => TermMatch::Contains(value.to_string()),
        };

        Some(Self {
            negated,
            field,
            matcher,
        })
    }
}

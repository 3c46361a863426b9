use crate::{
    fields::{self, StorageKey},
    query::{CompareOp, Group, Query, Term, TermMatch},
    record::Record,
    value::{FieldRef, FieldValue},
};

/// How repeated hits inside one term contribute to the score.
///
/// Inclusion only ever depends on a score being non-zero; the mode only
/// changes how strongly matching records rank against each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScoreMode {
    /// Every hit counts, so a tag list matching twice outranks one match.
    #[default]
    Accumulate,
    /// Each satisfied term contributes exactly one.
    Presence,
}

impl ScoreMode {
    pub fn from_count_multiple(count_multiple: bool) -> Self {
        if count_multiple {
            ScoreMode::Accumulate
        } else {
            ScoreMode::Presence
        }
    }
}

/// Count how often `target` occurs in `value`.
///
/// Scalars count once when their string form equals `target`, strings once
/// when they contain it case-insensitively, and lists/maps sum over their
/// items.
pub fn count_matches(value: &FieldValue, target: &str) -> usize {
    count_in(FieldRef::Value(value), target, &target.to_lowercase())
}

fn contains_folded(text: &str, lowered: &str) -> usize {
    usize::from(text.to_lowercase().contains(lowered))
}

fn count_in(value: FieldRef<'_>, target: &str, lowered: &str) -> usize {
    match value {
        FieldRef::Null => 0,
        FieldRef::Bool(_) | FieldRef::Integer(_) | FieldRef::Float(_) => {
            usize::from(value.to_value().to_string() == target)
        }
        FieldRef::Text(s) => contains_folded(s, lowered),
        FieldRef::Texts(items) => {
            items.iter().map(|s| contains_folded(s, lowered)).sum()
        }
        FieldRef::Ids(ids) => ids
            .iter()
            .map(|id| contains_folded(id.as_str(), lowered))
            .sum(),
        FieldRef::Json(json) => match json {
            serde_json::Value::Null => 0,
            serde_json::Value::String(s) => contains_folded(s, lowered),
            serde_json::Value::Array(items) => items
                .iter()
                .map(|item| count_in(FieldRef::Json(item), target, lowered))
                .sum(),
            serde_json::Value::Object(map) => map
                .values()
                .map(|item| count_in(FieldRef::Json(item), target, lowered))
                .sum(),
            scalar => usize::from(FieldValue::from(scalar).to_string() == target),
        },
        FieldRef::Value(value) => match value {
            FieldValue::Null => 0,
            FieldValue::Text(s) => contains_folded(s, lowered),
            FieldValue::List(items) => items
                .iter()
                .map(|item| count_in(FieldRef::Value(item), target, lowered))
                .sum(),
            FieldValue::Map(entries) => entries
                .values()
                .map(|item| count_in(FieldRef::Value(item), target, lowered))
                .sum(),
            scalar => usize::from(scalar.to_string() == target),
        },
    }
}

/// Compare `value` against a numeric operand: containers by length,
/// numbers (and numeric-looking strings) by value, anything else by the
/// length of its string form. Returns 1 on success, 0 otherwise, including
/// when the operand is not a finite number.
pub fn compare_match(
    value: &FieldValue,
    op: CompareOp,
    operand: &str,
) -> usize {
    let Some(rhs) = parse_operand(operand) else {
        return 0;
    };
    usize::from(op.holds(comparable(FieldRef::Value(value)), rhs))
}

fn parse_operand(operand: &str) -> Option<f64> {
    operand.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

fn comparable(value: FieldRef<'_>) -> f64 {
    if let Some(len) = value.container_len() {
        return len as f64;
    }
    value.as_number().unwrap_or_else(|| value.text_len() as f64)
}

/// A term with its field resolution and case folding done once per query.
#[derive(Debug, Clone)]
struct CompiledTerm {
    negated: bool,
    /// `None` visits every value the record carries.
    keys: Option<Vec<StorageKey>>,
    kind: CompiledMatch,
}

#[derive(Debug, Clone)]
enum CompiledMatch {
    Contains { target: String, lowered: String },
    Compare { op: CompareOp, operand: Option<f64> },
}

impl CompiledTerm {
    fn new(term: &Term) -> Self {
        let kind = match &term.matcher {
            TermMatch::Contains(target) => CompiledMatch::Contains {
                target: target.clone(),
                lowered: target.to_lowercase(),
            },
            TermMatch::Compare { op, operand } => CompiledMatch::Compare {
                op: *op,
                operand: parse_operand(operand),
            },
        };
        Self {
            negated: term.negated,
            keys: term.field.as_deref().map(fields::resolve),
            kind,
        }
    }

    fn hits_in(&self, value: FieldRef<'_>) -> usize {
        match &self.kind {
            CompiledMatch::Contains { target, lowered } => {
                count_in(value, target, lowered)
            }
            CompiledMatch::Compare { op, operand } => match operand {
                Some(rhs) => usize::from(op.holds(comparable(value), *rhs)),
                None => 0,
            },
        }
    }

    /// Sum of hits over the resolved fields.
    fn raw_hits(&self, record: &Record) -> usize {
        match &self.keys {
            Some(keys) => keys
                .iter()
                .map(|key| self.hits_in(record.field_or_default(key)))
                .sum(),
            None => record
                .present_fields()
                .map(|value| self.hits_in(value))
                .sum(),
        }
    }

    fn score(&self, record: &Record, mode: ScoreMode) -> usize {
        let raw = self.raw_hits(record);
        if self.negated {
            return usize::from(raw == 0);
        }
        match mode {
            ScoreMode::Accumulate => raw,
            ScoreMode::Presence => raw.min(1),
        }
    }
}

/// Score a single term against a record.
///
/// A negated term scores 1 when nothing matched and 0 otherwise.
pub fn match_score(record: &Record, term: &Term, mode: ScoreMode) -> usize {
    CompiledTerm::new(term).score(record, mode)
}

/// A query prepared for scoring many records.
#[derive(Debug, Clone)]
pub struct QueryMatcher {
    groups: Vec<Vec<CompiledTerm>>,
    mode: ScoreMode,
}

impl QueryMatcher {
    pub fn new(query: &Query, mode: ScoreMode) -> Self {
        let groups = query
            .groups
            .iter()
            .map(|group| group.terms.iter().map(CompiledTerm::new).collect())
            .collect();
        Self { groups, mode }
    }

    /// Score of the first OR-group the record satisfies, 0 if none.
    pub fn score(&self, record: &Record) -> usize {
        self.groups
            .iter()
            .map(|terms| group_terms_score(terms, record, self.mode))
            .find(|score| *score > 0)
            .unwrap_or(0)
    }
}

/// Sum of term scores; any term scoring zero vetoes the whole group.
fn group_terms_score(
    terms: &[CompiledTerm],
    record: &Record,
    mode: ScoreMode,
) -> usize {
    let mut total = 0;
    for term in terms {
        let score = term.score(record, mode);
        if score == 0 {
            return 0;
        }
        total += score;
    }
    total
}

/// Score one AND-group against a record.
pub fn group_score(record: &Record, group: &Group, mode: ScoreMode) -> usize {
    let terms: Vec<CompiledTerm> =
        group.terms.iter().map(CompiledTerm::new).collect();
    group_terms_score(&terms, record, mode)
}

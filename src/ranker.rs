use std::cmp::Ordering;

use crate::{catalog::Catalog, record::Record};

/// An `f64` with a total order, so missing values can sit at ±infinity.
#[derive(Debug, Clone, Copy)]
pub struct TotalF64(pub f64);

impl PartialEq for TotalF64 {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for TotalF64 {}

impl PartialOrd for TotalF64 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TotalF64 {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Ids made only of digits sort numerically and before every other id.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum IdKey {
    Numeric(u128),
    Lexical(String),
}

impl IdKey {
    pub fn new(id: &str) -> Self {
        if !id.is_empty()
            && id.bytes().all(|b| b.is_ascii_digit())
            && let Ok(n) = id.parse()
        {
            return IdKey::Numeric(n);
        }
        IdKey::Lexical(id.to_string())
    }
}

/// The orderable value a comparator extracts from a record.
///
/// A single comparator always produces the same variant.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortKey {
    Position(usize),
    Id(IdKey),
    /// `(has_date, date)`: records without a date sort before dated ones
    /// in ascending order, so after them in the default descending order.
    Date(bool, String),
    Text(String),
    Number(TotalF64),
}

type KeyFn = fn(&Catalog, usize, &Record) -> SortKey;

/// A named ordering of records.
pub struct Comparator {
    pub name: &'static str,
    pub description: &'static str,
    pub default_reverse: bool,
    key: KeyFn,
}

impl std::fmt::Debug for Comparator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Comparator")
            .field("name", &self.name)
            .field("default_reverse", &self.default_reverse)
            .finish_non_exhaustive()
    }
}

impl Comparator {
    pub fn key(&self, catalog: &Catalog, position: usize) -> SortKey {
        (self.key)(catalog, position, &catalog.records()[position])
    }
}

fn date_key(value: &Option<String>) -> SortKey {
    match value.as_deref().map(str::trim) {
        Some(date) if !date.is_empty() => SortKey::Date(true, date.to_string()),
        _ => SortKey::Date(false, String::new()),
    }
}

/// Every available ordering. The first entry is the fallback.
pub const COMPARATORS: &[Comparator] = &[
    Comparator {
        name: "data",
        description: "order entries were added in",
        default_reverse: false,
        key: |_, position, _| SortKey::Position(position),
    },
    Comparator {
        name: "id",
        description: "entry id, numeric ids first",
        default_reverse: true,
        key: |_, _, record| SortKey::Id(IdKey::new(record.id.as_str())),
    },
    Comparator {
        name: "upload",
        description: "upload date, undated last",
        default_reverse: true,
        key: |_, _, record| date_key(&record.upload),
    },
    Comparator {
        name: "title",
        description: "display title",
        default_reverse: false,
        key: |_, _, record| SortKey::Text(record.display_title().to_lowercase()),
    },
    Comparator {
        name: "artist",
        description: "first artist, else first group",
        default_reverse: false,
        key: |_, _, record| {
            SortKey::Text(record.primary_credit().to_lowercase())
        },
    },
    Comparator {
        name: "score",
        description: "user score, unscored last",
        default_reverse: true,
        key: |_, _, record| {
            SortKey::Number(TotalF64(record.score.unwrap_or(f64::NEG_INFINITY)))
        },
    },
    Comparator {
        name: "collection",
        description: "position of the entry's collection",
        default_reverse: false,
        key: |catalog, _, record| {
            SortKey::Position(
                record
                    .collection
                    .as_deref()
                    .and_then(|name| catalog.collection_position(name))
                    .unwrap_or(usize::MAX),
            )
        },
    },
    Comparator {
        name: "pages",
        description: "page count",
        default_reverse: true,
        key: |_, _, record| {
            SortKey::Number(TotalF64(record.pages.map_or(
                f64::NEG_INFINITY,
                |p| p as f64,
            )))
        },
    },
    Comparator {
        name: "opens",
        description: "times opened",
        default_reverse: true,
        key: |_, _, record| SortKey::Number(TotalF64(record.opens as f64)),
    },
    Comparator {
        name: "last_opened",
        description: "last time opened",
        default_reverse: true,
        key: |_, _, record| date_key(&record.last_opened),
    },
    Comparator {
        name: "last_edited",
        description: "last time edited",
        default_reverse: true,
        key: |_, _, record| date_key(&record.last_edited),
    },
];

/// Look up a comparator by name, falling back to data order.
pub fn comparator(name: &str) -> &'static Comparator {
    let name = name.trim();
    COMPARATORS
        .iter()
        .find(|c| c.name.eq_ignore_ascii_case(name))
        .unwrap_or_else(|| {
            tracing::warn!(sort = name, "unknown sort, using data order");
            &COMPARATORS[0]
        })
}

/// Orders candidate records by one comparator and a direction.
#[derive(Debug, Clone, Copy)]
pub struct Ranker {
    comparator: &'static Comparator,
    reverse: bool,
}

impl Ranker {
    /// The effective direction is the comparator's default flipped by the
    /// user's toggle.
    pub fn new(sort: &str, user_reverse: bool) -> Self {
        let comparator = comparator(sort);
        Self {
            comparator,
            reverse: comparator.default_reverse ^ user_reverse,
        }
    }

    pub fn comparator(&self) -> &'static Comparator {
        self.comparator
    }

    pub fn is_reversed(&self) -> bool {
        self.reverse
    }

    fn directed(&self, a: &SortKey, b: &SortKey) -> Ordering {
        let ord = a.cmp(b);
        if self.reverse { ord.reverse() } else { ord }
    }

    /// Order data positions by the comparator alone.
    ///
    /// The sort is stable, so ties keep data order in either direction.
    pub fn order(
        &self,
        catalog: &Catalog,
        positions: Vec<usize>,
    ) -> Vec<usize> {
        let mut keyed: Vec<(SortKey, usize)> = positions
            .into_iter()
            .map(|pos| (self.comparator.key(catalog, pos), pos))
            .collect();
        keyed.sort_by(|a, b| self.directed(&a.0, &b.0));
        keyed.into_iter().map(|(_, pos)| pos).collect()
    }

    /// Order `(position, score)` pairs: score descending first, then the
    /// comparator in its effective direction, then data order.
    pub fn order_scored(
        &self,
        catalog: &Catalog,
        scored: Vec<(usize, usize)>,
    ) -> Vec<(usize, usize)> {
        let mut keyed: Vec<(SortKey, (usize, usize))> = scored
            .into_iter()
            .map(|item| (self.comparator.key(catalog, item.0), item))
            .collect();
        keyed.sort_by(|a, b| {
            b.1.1.cmp(&a.1.1).then_with(|| self.directed(&a.0, &b.0))
        });
        keyed.into_iter().map(|(_, item)| item).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog(records: Vec<Record>) -> Catalog {
        Catalog::new(records).unwrap()
    }

    fn ids(catalog: &Catalog, positions: &[usize]) -> Vec<String> {
        positions
            .iter()
            .map(|&p| catalog.records()[p].id.to_string())
            .collect()
    }

    fn all(catalog: &Catalog) -> Vec<usize> {
        (0..catalog.len()).collect()
    }

    #[test]
    fn effective_direction_is_default_xor_toggle() {
        for c in COMPARATORS {
            assert_eq!(Ranker::new(c.name, false).is_reversed(), c.default_reverse);
            assert_eq!(Ranker::new(c.name, true).is_reversed(), !c.default_reverse);
        }
    }

    #[test]
    fn unknown_sort_falls_back_to_data_order() {
        assert_eq!(comparator("nonsense").name, "data");
        assert_eq!(comparator("SCORE").name, "score");
    }

    #[test]
    fn id_sort_puts_numeric_ids_first() {
        let cat = catalog(vec![
            Record::new("b7"),
            Record::new("100"),
            Record::new("9"),
            Record::new("a1"),
        ]);
        let ranker = Ranker::new("id", true);
        assert!(!ranker.is_reversed());
        assert_eq!(
            ids(&cat, &ranker.order(&cat, all(&cat))),
            vec!["9", "100", "a1", "b7"]
        );
    }

    #[test]
    fn upload_sort_puts_undated_last() {
        let cat = catalog(vec![
            Record::new("none"),
            Record {
                upload: Some("2020-01-01".into()),
                ..Record::new("old")
            },
            Record {
                upload: Some("2023-05-01".into()),
                ..Record::new("new")
            },
        ]);
        let ranker = Ranker::new("upload", false);
        assert_eq!(
            ids(&cat, &ranker.order(&cat, all(&cat))),
            vec!["new", "old", "none"]
        );
    }

    #[test]
    fn title_sort_is_case_folded() {
        let cat = catalog(vec![
            Record {
                title: Some("beta".into()),
                ..Record::new("1")
            },
            Record {
                title: Some("Alpha".into()),
                ..Record::new("2")
            },
            Record {
                title: Some("Gamma".into()),
                title_short: Some("aardvark".into()),
                ..Record::new("3")
            },
        ]);
        let ranker = Ranker::new("title", false);
        assert_eq!(ids(&cat, &ranker.order(&cat, all(&cat))), vec!["3", "2", "1"]);
    }

    #[test]
    fn artist_sort_falls_back_to_group() {
        let cat = catalog(vec![
            Record {
                artist: vec!["Zed".into()],
                ..Record::new("1")
            },
            Record {
                group: vec!["alpha circle".into()],
                ..Record::new("2")
            },
        ]);
        let ranker = Ranker::new("artist", false);
        assert_eq!(ids(&cat, &ranker.order(&cat, all(&cat))), vec!["2", "1"]);
    }

    #[test]
    fn score_sort_puts_unscored_last_and_is_stable() {
        let cat = catalog(vec![
            Record::new("first-unscored"),
            Record {
                score: Some(3.0),
                ..Record::new("three")
            },
            Record::new("second-unscored"),
            Record {
                score: Some(0.0),
                ..Record::new("zero-a")
            },
            Record {
                score: Some(0.0),
                ..Record::new("zero-b")
            },
        ]);
        let ranker = Ranker::new("score", false);
        assert_eq!(
            ids(&cat, &ranker.order(&cat, all(&cat))),
            vec![
                "three",
                "zero-a",
                "zero-b",
                "first-unscored",
                "second-unscored"
            ]
        );

        let flipped = Ranker::new("score", true);
        assert_eq!(
            ids(&cat, &flipped.order(&cat, all(&cat))),
            vec![
                "first-unscored",
                "second-unscored",
                "zero-a",
                "zero-b",
                "three"
            ]
        );
    }

    #[test]
    fn collection_sort_puts_non_members_last() {
        let cat = catalog(vec![
            Record::new("loose"),
            Record {
                collection: Some("later".into()),
                ..Record::new("l")
            },
            Record {
                collection: Some("first".into()),
                ..Record::new("f")
            },
            Record {
                collection: Some("deleted".into()),
                ..Record::new("d")
            },
        ])
        .with_collections(vec!["first".into(), "later".into()]);
        let ranker = Ranker::new("collection", false);
        assert_eq!(
            ids(&cat, &ranker.order(&cat, all(&cat))),
            vec!["f", "l", "loose", "d"]
        );
    }

    #[test]
    fn scored_order_puts_score_before_comparator() {
        let cat = catalog(vec![
            Record {
                title: Some("a".into()),
                ..Record::new("1")
            },
            Record {
                title: Some("b".into()),
                ..Record::new("2")
            },
            Record {
                title: Some("c".into()),
                ..Record::new("3")
            },
        ]);
        let ranker = Ranker::new("title", true);
        let ordered =
            ranker.order_scored(&cat, vec![(0, 1), (1, 5), (2, 1)]);
        assert_eq!(ordered, vec![(1, 5), (2, 1), (0, 1)]);
    }
}

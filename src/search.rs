use crate::{
    catalog::Catalog,
    matcher::{QueryMatcher, ScoreMode},
    query::{self, ParsedInput},
    ranker::Ranker,
    record::{Record, RecordId},
    settings::Settings,
};

/// One record in an evaluated result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hit {
    pub rank: usize,
    pub id: RecordId,
    /// Match score; always 0 when browsing.
    pub score: usize,
}

/// The outcome of evaluating one input state against the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    /// True when the input was too short to score and everything is shown.
    pub browsing: bool,
    /// Ordered hits, truncated to the threshold.
    pub hits: Vec<Hit>,
    /// Every record that satisfied the query, regardless of threshold.
    pub hit_count: usize,
}

impl Evaluation {
    pub fn ids(&self) -> Vec<RecordId> {
        self.hits.iter().map(|hit| hit.id.clone()).collect()
    }
}

/// Whether a record survives the collection/removed pre-filter.
pub fn passes_filter(record: &Record, settings: &Settings) -> bool {
    if record.removed && !settings.show_removed {
        return false;
    }
    match settings.collection.as_deref() {
        Some(wanted) => record.collection.as_deref() == Some(wanted),
        None => true,
    }
}

/// Evaluate raw search input against the catalog.
///
/// 1. Pre-filter by collection and removed flag
/// 2. Short input: order by the ranker alone, no threshold
/// 3. Otherwise score every candidate and keep those above zero
/// 4. Order by score, then the ranker
/// 5. Truncate to the threshold, keeping the full hit count
pub fn evaluate(catalog: &Catalog, settings: &Settings, raw: &str) -> Evaluation {
    let ranker = Ranker::new(&settings.sort, settings.reverse);

    // Stage 1: pre-filter
    let candidates: Vec<usize> = catalog
        .records()
        .iter()
        .enumerate()
        .filter(|(_, record)| passes_filter(record, settings))
        .map(|(pos, _)| pos)
        .collect();

    let query = match query::parse_input(raw) {
        ParsedInput::Browse => {
            // Stage 2: browse shortcut
            let ordered = ranker.order(catalog, candidates);
            tracing::debug!(
                shown = ordered.len(),
                sort = ranker.comparator().name,
                "browsing"
            );
            return Evaluation {
                browsing: true,
                hit_count: ordered.len(),
                hits: to_hits(catalog, ordered.into_iter().map(|p| (p, 0))),
            };
        }
        ParsedInput::Search(query) => query,
    };

    // Stage 3: scoring
    let matcher = QueryMatcher::new(
        &query,
        ScoreMode::from_count_multiple(settings.count_multiple_matches),
    );
    let scored: Vec<(usize, usize)> = candidates
        .into_iter()
        .map(|pos| (pos, matcher.score(&catalog.records()[pos])))
        .filter(|(_, score)| *score > 0)
        .collect();
    let hit_count = scored.len();

    // Stage 4: ordering
    let ordered = ranker.order_scored(catalog, scored);

    // Stage 5: threshold
    let limit = settings.limit().unwrap_or(usize::MAX);
    let hits = to_hits(catalog, ordered.into_iter().take(limit));

    tracing::debug!(
        query = raw,
        groups = query.groups.len(),
        hit_count,
        shown = hits.len(),
        "evaluated search"
    );
    Evaluation {
        browsing: false,
        hits,
        hit_count,
    }
}

fn to_hits(
    catalog: &Catalog,
    ordered: impl Iterator<Item = (usize, usize)>,
) -> Vec<Hit> {
    ordered
        .enumerate()
        .map(|(i, (pos, score))| Hit {
            rank: i + 1,
            id: catalog.records()[pos].id.clone(),
            score,
        })
        .collect()
}

/// Print an evaluation for a terminal.
pub fn format_human(catalog: &Catalog, evaluation: &Evaluation) {
    if evaluation.hits.is_empty() {
        println!("No results found.");
        return;
    }

    for hit in &evaluation.hits {
        let Some(record) = catalog.get(&hit.id) else {
            continue;
        };
        if evaluation.browsing {
            println!("{:>3}. {} #{}", hit.rank, record.display_title(), hit.id);
        } else {
            println!(
                "{:>3}. [{}] {} #{}",
                hit.rank,
                hit.score,
                record.display_title(),
                hit.id
            );
        }
        let credit = record.primary_credit();
        if !credit.is_empty() {
            println!("     {credit}");
        }
    }
    println!(
        "\n{} shown, {} hit(s)",
        evaluation.hits.len(),
        evaluation.hit_count
    );
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn tagged(id: &str, tags: &[&str]) -> Record {
        Record {
            tags: tags.iter().map(|t| t.to_string()).collect(),
            ..Record::new(id)
        }
    }

    fn ids(evaluation: &Evaluation) -> Vec<String> {
        evaluation.hits.iter().map(|h| h.id.to_string()).collect()
    }

    #[test]
    fn threshold_clamps_rendered_but_not_hit_count() {
        let records: Vec<Record> = (0..50)
            .map(|i| {
                let tag = if i < 37 { "match" } else { "other" };
                tagged(&i.to_string(), &[tag])
            })
            .collect();
        let catalog = Catalog::new(records).unwrap();
        let settings = Settings {
            threshold: 10,
            ..Settings::default()
        };

        let evaluation = evaluate(&catalog, &settings, "tag:match");
        assert!(!evaluation.browsing);
        assert_eq!(evaluation.hits.len(), 10);
        assert_eq!(evaluation.hit_count, 37);
        assert_eq!(evaluation.hits[0].rank, 1);
        assert_eq!(evaluation.hits[9].rank, 10);
    }

    #[test]
    fn zero_threshold_is_unlimited() {
        let records: Vec<Record> =
            (0..150).map(|i| tagged(&i.to_string(), &["x"])).collect();
        let catalog = Catalog::new(records).unwrap();
        let settings = Settings {
            threshold: 0,
            ..Settings::default()
        };
        let evaluation = evaluate(&catalog, &settings, "tags:x");
        assert_eq!(evaluation.hits.len(), 150);
        assert_eq!(evaluation.hit_count, 150);
    }

    #[test]
    fn or_groups_union() {
        let catalog = Catalog::new(vec![
            tagged("c", &["comedy"]),
            tagged("d", &["drama"]),
            tagged("h", &["horror"]),
            tagged("cd", &["comedy", "drama"]),
        ])
        .unwrap();
        let evaluation =
            evaluate(&catalog, &Settings::default(), "tag:comedy;tag:drama");

        let mut found = ids(&evaluation);
        found.sort();
        assert_eq!(found, vec!["c", "cd", "d"]);
        assert_eq!(evaluation.hit_count, 3);
    }

    #[test]
    fn and_terms_with_negation() {
        let catalog = Catalog::new(vec![
            tagged("1", &["comedy", "school"]),
            tagged("2", &["comedy", "drama"]),
            tagged("3", &["drama"]),
        ])
        .unwrap();
        let evaluation =
            evaluate(&catalog, &Settings::default(), "tag:comedy, -tag:drama");
        assert_eq!(ids(&evaluation), vec!["1"]);
    }

    #[test]
    fn higher_scores_rank_first() {
        let catalog = Catalog::new(vec![
            tagged("once", &["comedy"]),
            tagged("twice", &["comedy", "romantic comedy"]),
        ])
        .unwrap();
        let evaluation =
            evaluate(&catalog, &Settings::default(), "tag:comedy");
        assert_eq!(ids(&evaluation), vec!["twice", "once"]);

        let presence = Settings {
            count_multiple_matches: false,
            ..Settings::default()
        };
        let evaluation = evaluate(&catalog, &presence, "tag:comedy");
        assert_eq!(ids(&evaluation), vec!["once", "twice"]);
    }

    #[test]
    fn score_sort_ties_keep_data_order() {
        let catalog = Catalog::new(vec![
            tagged("first", &["comedy"]),
            tagged("second", &["comedy"]),
            Record {
                score: Some(5.0),
                ..tagged("rated", &["comedy"])
            },
        ])
        .unwrap();
        let settings = Settings {
            sort: "score".into(),
            ..Settings::default()
        };
        let evaluation = evaluate(&catalog, &settings, "comedy");
        assert_eq!(ids(&evaluation), vec!["rated", "first", "second"]);

        let browse = evaluate(&catalog, &settings, "");
        assert_eq!(ids(&browse), vec!["rated", "first", "second"]);
    }

    #[test]
    fn pre_filter_hides_removed_and_other_collections() {
        let catalog = Catalog::new(vec![
            Record {
                collection: Some("favs".into()),
                ..tagged("fav", &["comedy"])
            },
            Record {
                removed: true,
                collection: Some("favs".into()),
                ..tagged("gone", &["comedy"])
            },
            tagged("loose", &["comedy"]),
        ])
        .unwrap();

        let evaluation = evaluate(&catalog, &Settings::default(), "comedy");
        assert_eq!(ids(&evaluation), vec!["fav", "loose"]);

        let favs = Settings {
            collection: Some("favs".into()),
            show_removed: true,
            ..Settings::default()
        };
        assert_eq!(ids(&evaluate(&catalog, &favs, "comedy")), vec!["fav", "gone"]);
        assert_eq!(ids(&evaluate(&catalog, &favs, "")), vec!["fav", "gone"]);
    }

    #[test]
    fn browse_ignores_threshold() {
        let records: Vec<Record> =
            (0..20).map(|i| Record::new(i.to_string())).collect();
        let catalog = Catalog::new(records).unwrap();
        let settings = Settings {
            threshold: 5,
            ..Settings::default()
        };
        let evaluation = evaluate(&catalog, &settings, "ab");
        assert!(evaluation.browsing);
        assert_eq!(evaluation.hits.len(), 20);
        assert!(evaluation.hits.iter().all(|h| h.score == 0));
    }

    fn arb_catalog() -> impl Strategy<Value = Catalog> {
        prop::collection::vec(
            (
                prop::option::of(0.0f64..5.0),
                any::<bool>(),
                prop::option::of(prop_oneof![Just("a"), Just("b")]),
            ),
            0..20,
        )
        .prop_map(|rows| {
            let records = rows
                .into_iter()
                .enumerate()
                .map(|(i, (score, removed, collection))| Record {
                    score,
                    removed,
                    collection: collection.map(str::to_string),
                    ..Record::new(i.to_string())
                })
                .collect();
            Catalog::new(records).unwrap()
        })
    }

    proptest! {
        #[test]
        fn short_input_is_filtered_set_in_ranker_order(
            catalog in arb_catalog(),
            input in "[ a-z]{0,2}",
            sort in prop_oneof![Just("data"), Just("score"), Just("id")],
            reverse in any::<bool>(),
            show_removed in any::<bool>(),
            collection in prop::option::of(Just("a".to_string())),
        ) {
            let settings = Settings {
                sort: sort.to_string(),
                reverse,
                show_removed,
                collection,
                ..Settings::default()
            };
            let expected_positions: Vec<usize> = catalog
                .records()
                .iter()
                .enumerate()
                .filter(|(_, r)| passes_filter(r, &settings))
                .map(|(p, _)| p)
                .collect();
            let expected: Vec<RecordId> = Ranker::new(sort, reverse)
                .order(&catalog, expected_positions)
                .into_iter()
                .map(|p| catalog.records()[p].id.clone())
                .collect();

            let evaluation = evaluate(&catalog, &settings, &input);
            prop_assert!(evaluation.browsing);
            prop_assert_eq!(evaluation.ids(), expected);
        }
    }
}

use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use cabinet::{
    Catalog, DataDir, Debouncer, RecordId, ResultView, Settings, TagOrder,
    error, fields, ranker, search,
};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

mod cli;

use cli::{Cli, Command, SearchArgs, TagsArgs, WatchArgs};

fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if let Ok(env) = std::env::var("CABINET_LOG") {
        EnvFilter::new(env)
    } else if quiet {
        EnvFilter::new("warn")
    } else {
        match verbose {
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn main() -> error::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    match &cli.command {
        Command::Completions(args) => args.generate(),
        Command::Sorts => cmd_sorts(),
        Command::Fields => {
            for name in fields::logical_names() {
                println!("{name}");
            }
        }
        Command::Search(args) => {
            let (catalog, settings) = load(&cli)?;
            cmd_search(&catalog, settings, args)?;
        }
        Command::Tags(args) => {
            let (catalog, _) = load(&cli)?;
            cmd_tags(&catalog, args)?;
        }
        Command::Watch(args) => {
            let (catalog, settings) = load(&cli)?;
            cmd_watch(catalog, settings, args)?;
        }
    }

    Ok(())
}

fn load(cli: &Cli) -> error::Result<(Catalog, Settings)> {
    let data_dir = DataDir::resolve(cli.data_dir.as_deref())?;
    let catalog =
        Catalog::load(&data_dir.catalog(), &data_dir.collections())?;
    let settings = Settings::load(&data_dir.settings())?;
    Ok((catalog, settings))
}

fn cmd_sorts() {
    for comparator in ranker::COMPARATORS {
        let direction = if comparator.default_reverse {
            "descending"
        } else {
            "ascending"
        };
        println!(
            "{:<12} {:<10} {}",
            comparator.name, direction, comparator.description
        );
    }
}

fn cmd_search(
    catalog: &Catalog,
    mut settings: Settings,
    args: &SearchArgs,
) -> error::Result<()> {
    args.overrides.apply(&mut settings);
    warn_unknown_collection(catalog, &settings);

    let evaluation = search::evaluate(catalog, &settings, &args.query);
    if args.json {
        let results: Vec<serde_json::Value> = evaluation
            .hits
            .iter()
            .filter_map(|hit| {
                let record = catalog.get(&hit.id)?;
                Some(serde_json::json!({
                    "rank": hit.rank,
                    "score": hit.score,
                    "id": hit.id,
                    "title": record.display_title(),
                }))
            })
            .collect();
        let out = serde_json::json!({
            "query": args.query,
            "browsing": evaluation.browsing,
            "hit_count": evaluation.hit_count,
            "results": results,
        });
        println!("{}", serde_json::to_string(&out)?);
    } else {
        search::format_human(catalog, &evaluation);
    }
    Ok(())
}

fn warn_unknown_collection(catalog: &Catalog, settings: &Settings) {
    if let Some(name) = settings.collection.as_deref()
        && catalog.collection_position(name).is_none()
    {
        tracing::warn!(collection = name, "collection is not registered");
    }
}

fn cmd_tags(catalog: &Catalog, args: &TagsArgs) -> error::Result<()> {
    let index = catalog.tag_index();
    let order = if args.by_name {
        TagOrder::Name
    } else {
        TagOrder::Count
    };
    let rows = index.listing(&args.filter, order);

    if args.json {
        let out: Vec<serde_json::Value> = rows
            .iter()
            .map(|(tag, count)| {
                serde_json::json!({ "tag": tag, "count": count })
            })
            .collect();
        println!("{}", serde_json::to_string(&out)?);
        return Ok(());
    }

    if rows.is_empty() {
        println!("No tags found.");
        return Ok(());
    }
    for (tag, count) in &rows {
        println!("{count:>5}  {tag}");
    }
    Ok(())
}

/// Shared between the input loop and debounced evaluations.
struct WatchState {
    catalog: Catalog,
    settings: Settings,
    view: ResultView,
}

impl WatchState {
    fn run(&mut self, input: &str) -> error::Result<()> {
        let evaluation =
            search::evaluate(&self.catalog, &self.settings, input);
        let materialized = self.view.materialize(&evaluation);
        let out = serde_json::json!({
            "input": input,
            "hit_count": materialized.hit_count,
            "commands": materialized.commands,
        });
        println!("{}", serde_json::to_string(&out)?);
        Ok(())
    }
}

fn cmd_watch(
    catalog: Catalog,
    mut settings: Settings,
    args: &WatchArgs,
) -> error::Result<()> {
    args.overrides.apply(&mut settings);
    if let Some(ms) = args.debounce_ms {
        settings.debounce_ms = ms;
    }
    warn_unknown_collection(&catalog, &settings);

    let delay = Duration::from_millis(settings.debounce_ms);
    let state = Arc::new(Mutex::new(WatchState {
        catalog,
        settings,
        view: ResultView::default(),
    }));

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(watch_loop(state, delay))
}

async fn watch_loop(
    state: Arc<Mutex<WatchState>>,
    delay: Duration,
) -> error::Result<()> {
    let mut debouncer = Debouncer::new(delay);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        if let Some(id) = line.strip_prefix(":select ") {
            lock(&state).view.select(RecordId::new(id.trim()));
            continue;
        }

        let state = Arc::clone(&state);
        debouncer.schedule(move || {
            if let Err(e) = lock(&state).run(&line) {
                tracing::error!(error = %e, "evaluation failed");
            }
        });
    }

    debouncer.settle().await;
    tracing::debug!("input closed");
    Ok(())
}

fn lock(state: &Mutex<WatchState>) -> MutexGuard<'_, WatchState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

//! cabinet - a query engine and tag index for a personal catalog.
//!
//! Search input is parsed into OR-groups of AND-terms, every record is
//! scored against it, and the survivors are ranked by a selectable sort
//! order, truncated to a threshold and reconciled against what is already
//! on screen.
//!
//! # Quick start
//!
//! ```
//! use cabinet::{Catalog, Record, ResultView, Settings, search};
//!
//! let catalog = Catalog::new(vec![
//!     Record {
//!         tags: vec!["comedy".into()],
//!         ..Record::new("1")
//!     },
//!     Record {
//!         tags: vec!["drama".into()],
//!         ..Record::new("2")
//!     },
//! ])
//! .unwrap();
//!
//! let evaluation =
//!     search::evaluate(&catalog, &Settings::default(), "tag:comedy");
//! assert_eq!(evaluation.hit_count, 1);
//!
//! let mut view = ResultView::default();
//! let rendered = view.materialize(&evaluation);
//! assert!(rendered.rebuilt());
//! ```

pub mod catalog;
pub mod data_dir;
pub mod debounce;
pub mod error;
pub mod fields;
pub mod materialize;
pub mod matcher;
pub mod query;
pub mod ranker;
pub mod record;
pub mod search;
pub mod settings;
pub mod tag_index;
pub mod value;

pub use catalog::Catalog;
pub use data_dir::DataDir;
pub use debounce::Debouncer;
pub use error::{Error, Result};
pub use materialize::{Materialized, RenderCommand, ResultView};
pub use record::{Record, RecordId};
pub use search::Evaluation;
pub use settings::Settings;
pub use tag_index::{TagIndex, TagOrder};
pub use value::{FieldRef, FieldValue};

//! Core types for the persistence layer.
//!
//! - [`Predicate`], [`FilterSet`], [`Filter`] - Equality filters
//! - [`FilterPolicy`] - Handling of unknown or mistyped filter fields
//! - [`Page`], [`sort_by_field`] - In-memory pagination and ordering
//! - [`Record`] - An entity serialized to a JSON object
//!
//! # Examples
//!
//! ```
//! use storefront_persistence::types::{FilterSet, Page};
//!
//! let filters = FilterSet::new().with("category_id", "books");
//! assert!(!filters.is_empty());
//!
//! let page = Page::paginate(vec!["a", "b", "c"], 2, 2).unwrap();
//! assert_eq!(page.items(), &["c"]);
//! ```

mod filter;
mod pagination;
mod record;

pub use filter::{Filter, FilterPolicy, FilterSet, Predicate, resolve};
pub(crate) use pagination::compare_values;
pub use pagination::{Page, SortDirection, sort_by_field};
pub(crate) use record::json_type_name;
pub use record::{Record, from_record, to_record};

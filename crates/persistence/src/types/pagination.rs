//! Pagination and ordering of entity lists.
//!
//! Backends return whole result sets; these helpers slice and order them in
//! memory for listing pages.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::record::to_record;
use crate::entity::{Entity, FieldKind, timestamp};
use crate::error::{StorageResult, ValidationError};

/// One page of a larger result set.
///
/// Page indexes are 1-based. An out-of-range index is clamped to the first or
/// last page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    items: Vec<T>,
    page_index: usize,
    per_page: usize,
    total_pages: usize,
    total_count: usize,
}

impl<T> Page<T> {
    /// Slices `items` into pages of `per_page` and returns page `page_index`.
    ///
    /// # Examples
    ///
    /// ```
    /// use storefront_persistence::types::Page;
    ///
    /// let page = Page::paginate((1..=7).collect(), 2, 3).unwrap();
    /// assert_eq!(page.items(), &[4, 5, 6]);
    /// assert_eq!(page.total_pages(), 3);
    /// assert!(page.has_previous_page());
    /// assert!(page.has_next_page());
    /// ```
    pub fn paginate(items: Vec<T>, page_index: usize, per_page: usize) -> StorageResult<Self> {
        if per_page == 0 {
            return Err(ValidationError::InvalidArgument {
                argument: "per_page".to_string(),
                message: "must be positive".to_string(),
            }
            .into());
        }

        let total_count = items.len();
        let total_pages = total_count.div_ceil(per_page);
        let page_index = page_index.clamp(1, total_pages.max(1));

        let items = items
            .into_iter()
            .skip((page_index - 1) * per_page)
            .take(per_page)
            .collect();

        Ok(Self {
            items,
            page_index,
            per_page,
            total_pages,
            total_count,
        })
    }

    /// Returns the items on this page.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Consumes the page, returning its items.
    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    /// Returns the (clamped) 1-based page index.
    pub fn page_index(&self) -> usize {
        self.page_index
    }

    /// Returns the page size.
    pub fn per_page(&self) -> usize {
        self.per_page
    }

    /// Returns the number of pages.
    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    /// Returns the size of the whole result set.
    pub fn total_count(&self) -> usize {
        self.total_count
    }

    /// Returns `true` if there is a page before this one.
    pub fn has_previous_page(&self) -> bool {
        self.page_index > 1
    }

    /// Returns `true` if there is a page after this one.
    pub fn has_next_page(&self) -> bool {
        self.page_index < self.total_pages
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending order.
    #[default]
    Ascending,
    /// Descending order.
    Descending,
}

/// Sorts entities by a named field.
///
/// Returns `Ok(false)` and leaves the order untouched when `field` is not part
/// of the entity schema. The sort is stable; missing and null values sort
/// first in ascending order.
pub fn sort_by_field<E: Entity>(
    items: &mut Vec<E>,
    field: &str,
    direction: SortDirection,
) -> StorageResult<bool> {
    let Some(kind) = E::field_kind(field) else {
        tracing::debug!(entity = E::ENTITY_NAME, field, "ignoring sort on unknown field");
        return Ok(false);
    };

    let mut keyed = Vec::with_capacity(items.len());
    for item in items.drain(..) {
        let key = to_record(&item)?.remove(field).unwrap_or(Value::Null);
        let instant = match kind {
            FieldKind::Timestamp => key.as_str().and_then(timestamp::parse),
            _ => None,
        };
        keyed.push((key, instant, item));
    }

    keyed.sort_by(|(a, a_instant, _), (b, b_instant, _)| {
        let ordering = match kind {
            FieldKind::Timestamp => a_instant.cmp(b_instant),
            _ => compare_values(a, b),
        };
        match direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });

    items.extend(keyed.into_iter().map(|(_, _, item)| item));
    Ok(true)
}

/// Orders two stored JSON scalars. Values of different types compare equal,
/// except that null sorts before everything else.
pub(crate) fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Less,
        (_, Value::Null) => Ordering::Greater,
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => Ordering::Equal,
        },
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;

use super::client::{
    AttributeValue, IndexQuerySpec, Item, PutCondition, ScanCondition, WideColumnApi,
    WideColumnClientError,
};
use crate::types::compare_values;

#[derive(Debug)]
struct MemoryTable {
    key_attribute: String,
    items: Vec<Item>,
}

impl MemoryTable {
    fn key_of<'a>(&self, item: &'a Item) -> Result<&'a AttributeValue, WideColumnClientError> {
        item.get(&self.key_attribute).ok_or_else(|| {
            WideColumnClientError::InvalidInput(format!(
                "missing key attribute '{}'",
                self.key_attribute
            ))
        })
    }

    fn position(&self, key: &AttributeValue) -> Option<usize> {
        self.items
            .iter()
            .position(|item| item.get(&self.key_attribute) == Some(key))
    }
}

/// A process-local wide-column store.
///
/// Like the real service, tables must be created before use and calls on a
/// missing table fail with `ResourceNotFound`. Indexes are not materialized:
/// a query filters on the hash key attribute and sorts by the sort key.
#[derive(Debug, Default)]
pub struct InMemoryWideColumnStore {
    tables: RwLock<HashMap<String, MemoryTable>>,
    unavailable: AtomicBool,
}

impl InMemoryWideColumnStore {
    /// Creates a store with no tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a table keyed on `key_attribute`. Existing tables are kept.
    pub fn create_table(&self, name: &str, key_attribute: &str) {
        self.tables
            .write()
            .entry(name.to_string())
            .or_insert_with(|| MemoryTable {
                key_attribute: key_attribute.to_string(),
                items: Vec::new(),
            });
    }

    /// Returns `true` if the table exists.
    pub fn has_table(&self, name: &str) -> bool {
        self.tables.read().contains_key(name)
    }

    /// Returns the number of items in a table.
    pub fn item_count(&self, name: &str) -> usize {
        self.tables
            .read()
            .get(name)
            .map(|table| table.items.len())
            .unwrap_or(0)
    }

    /// Makes every subsequent call fail with `Unavailable` until reset.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), WideColumnClientError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(WideColumnClientError::Unavailable(
                "in-memory wide-column store is offline".to_string(),
            ));
        }
        Ok(())
    }
}

fn table_not_found(name: &str) -> WideColumnClientError {
    WideColumnClientError::ResourceNotFound(format!("table '{}' does not exist", name))
}

#[async_trait]
impl WideColumnApi for InMemoryWideColumnStore {
    async fn get_item(&self, table: &str, key: Item) -> Result<Option<Item>, WideColumnClientError> {
        self.check_available()?;
        let tables = self.tables.read();
        let mem = tables.get(table).ok_or_else(|| table_not_found(table))?;
        let key = mem.key_of(&key)?;
        Ok(mem.position(key).map(|i| mem.items[i].clone()))
    }

    async fn scan(
        &self,
        table: &str,
        conditions: &[ScanCondition],
    ) -> Result<Vec<Item>, WideColumnClientError> {
        self.check_available()?;
        let tables = self.tables.read();
        let mem = tables.get(table).ok_or_else(|| table_not_found(table))?;
        Ok(mem
            .items
            .iter()
            .filter(|item| conditions.iter().all(|c| c.matches(item)))
            .cloned()
            .collect())
    }

    async fn query(
        &self,
        table: &str,
        spec: &IndexQuerySpec,
    ) -> Result<Vec<Item>, WideColumnClientError> {
        self.check_available()?;
        let tables = self.tables.read();
        let mem = tables.get(table).ok_or_else(|| table_not_found(table))?;

        let mut items: Vec<Item> = mem
            .items
            .iter()
            .filter(|item| item.get(&spec.hash_key_attribute) == Some(&spec.hash_key_value))
            .filter(|item| match &spec.sort_key_attribute {
                Some(sort_key) => item.contains_key(sort_key),
                None => true,
            })
            .cloned()
            .collect();

        if let Some(sort_key) = &spec.sort_key_attribute {
            items.sort_by(|a, b| {
                let ordering = match (a.get(sort_key), b.get(sort_key)) {
                    (Some(x), Some(y)) => compare_values(&x.to_json(), &y.to_json()),
                    _ => std::cmp::Ordering::Equal,
                };
                if spec.scan_forward {
                    ordering
                } else {
                    ordering.reverse()
                }
            });
        }

        Ok(items)
    }

    async fn put_item(
        &self,
        table: &str,
        item: Item,
        condition: Option<PutCondition>,
    ) -> Result<(), WideColumnClientError> {
        self.check_available()?;
        let mut tables = self.tables.write();
        let mem = tables.get_mut(table).ok_or_else(|| table_not_found(table))?;
        let existing = mem.position(mem.key_of(&item)?);

        let satisfied = match &condition {
            None => true,
            Some(PutCondition::AttributeNotExists(attribute)) => existing
                .map(|i| !mem.items[i].contains_key(attribute))
                .unwrap_or(true),
            Some(PutCondition::AttributeEquals(attribute, value)) => existing
                .map(|i| mem.items[i].get(attribute) == Some(value))
                .unwrap_or(false),
        };
        if !satisfied {
            return Err(WideColumnClientError::ConditionFailed);
        }

        match existing {
            Some(i) => mem.items[i] = item,
            None => mem.items.push(item),
        }
        Ok(())
    }

    async fn delete_item(&self, table: &str, key: Item) -> Result<(), WideColumnClientError> {
        self.check_available()?;
        let mut tables = self.tables.write();
        let mem = tables.get_mut(table).ok_or_else(|| table_not_found(table))?;
        if let Some(i) = mem.position(mem.key_of(&key)?) {
            mem.items.remove(i);
        }
        Ok(())
    }
}

//! Test entities.

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use storefront_persistence::entity::{
    Entity, Field, FieldDef, FieldKind, Validator, Versioned, timestamp,
};
use storefront_persistence::error::ValidationDetail;
use storefront_persistence::soft_delete::SoftDeletable;

/// The catalog item used throughout the integration tests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Widget {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub category_id: String,
    pub stock: i64,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(default)]
    pub version: u64,
}

impl Widget {
    pub const NAME: Field<Widget, String> = Field::new("name");
    pub const PRICE: Field<Widget, f64> = Field::new("price");
    pub const CATEGORY_ID: Field<Widget, String> = Field::new("category_id");
    pub const STOCK: Field<Widget, i64> = Field::new("stock");
    pub const CREATED_AT: Field<Widget, DateTime<Utc>> = Field::new("created_at");

    /// Creates a widget in category `cat0` with ten in stock.
    pub fn new(id: &str, name: &str, price: f64) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            price,
            category_id: "cat0".to_string(),
            stock: 10,
            created_at: epoch(),
            is_deleted: false,
            version: 0,
        }
    }

    pub fn in_category(mut self, category_id: &str) -> Self {
        self.category_id = category_id.to_string();
        self
    }

    pub fn created_minutes_after_epoch(mut self, minutes: i64) -> Self {
        self.created_at = epoch() + Duration::minutes(minutes);
        self
    }

    pub fn with_stock(mut self, stock: i64) -> Self {
        self.stock = stock;
        self
    }
}

impl Entity for Widget {
    type Key = String;
    const ENTITY_NAME: &'static str = "Widget";

    fn id(&self) -> &String {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn fields() -> &'static [FieldDef] {
        const FIELDS: &[FieldDef] = &[
            FieldDef::new("name", FieldKind::Text),
            FieldDef::new("price", FieldKind::Float),
            FieldDef::new("category_id", FieldKind::Text),
            FieldDef::new("stock", FieldKind::Integer),
            FieldDef::new("created_at", FieldKind::Timestamp),
            FieldDef::new("is_deleted", FieldKind::Boolean),
            FieldDef::new("version", FieldKind::Integer),
        ];
        FIELDS
    }

    fn validate(&self) -> Vec<ValidationDetail> {
        Validator::new()
            .required("name", &self.name)
            .range("price", self.price, 0.0, 100_000.0)
            .finish()
    }
}

impl Versioned for Widget {
    fn version(&self) -> u64 {
        self.version
    }

    fn set_version(&mut self, version: u64) {
        self.version = version;
    }
}

impl SoftDeletable for Widget {
    fn is_deleted(&self) -> bool {
        self.is_deleted
    }

    fn set_deleted(&mut self, deleted: bool) {
        self.is_deleted = deleted;
    }
}

/// The fixed creation time of fixture widgets.
pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

/// Ten widgets: `w0`..`w9`, even ones in `cat1`, odd ones in `cat2`.
pub fn widget_set() -> Vec<Widget> {
    (0..10)
        .map(|i| {
            let category = if i % 2 == 0 { "cat1" } else { "cat2" };
            Widget::new(&format!("w{i}"), &format!("Widget {i}"), 1.0 + i as f64)
                .in_category(category)
                .created_minutes_after_epoch(i)
        })
        .collect()
}

/// Sorts by id so results from either adapter compare equal.
pub fn sorted(mut widgets: Vec<Widget>) -> Vec<Widget> {
    widgets.sort_by(|a, b| a.id.cmp(&b.id));
    widgets
}

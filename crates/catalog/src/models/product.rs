use serde::{Deserialize, Serialize};
use storefront_persistence::entity::{Entity, Field, FieldDef, FieldKind, Validator};
use storefront_persistence::error::ValidationDetail;
use storefront_persistence::soft_delete::SoftDeletable;
use uuid::Uuid;

use super::limits;

/// A product offered in the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    /// Units in stock.
    pub availability: i64,
    pub category_id: String,
    #[serde(default)]
    pub is_deleted: bool,
}

impl Product {
    pub const NAME: Field<Product, String> = Field::new("name");
    pub const CATEGORY_ID: Field<Product, String> = Field::new("category_id");
    pub const AVAILABILITY: Field<Product, i64> = Field::new("availability");

    /// Creates a product with a fresh id and nothing in stock.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        price: f64,
        category_id: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            description: description.into(),
            price,
            availability: 0,
            category_id: category_id.into(),
            is_deleted: false,
        }
    }

    /// Sets the units in stock.
    pub fn with_availability(mut self, availability: i64) -> Self {
        self.availability = availability;
        self
    }
}

impl Entity for Product {
    type Key = String;
    const ENTITY_NAME: &'static str = "Product";

    fn id(&self) -> &String {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn fields() -> &'static [FieldDef] {
        const FIELDS: &[FieldDef] = &[
            FieldDef::new("name", FieldKind::Text),
            FieldDef::new("description", FieldKind::Text),
            FieldDef::new("price", FieldKind::Float),
            FieldDef::new("availability", FieldKind::Integer),
            FieldDef::new("category_id", FieldKind::Text),
            FieldDef::new("is_deleted", FieldKind::Boolean),
        ];
        FIELDS
    }

    fn validate(&self) -> Vec<ValidationDetail> {
        Validator::new()
            .required("name", &self.name)
            .min_length("name", &self.name, limits::PRODUCT_NAME_MIN)
            .required("description", &self.description)
            .min_length("description", &self.description, limits::PRODUCT_DESCRIPTION_MIN)
            .range("price", self.price, limits::PRODUCT_PRICE_MIN, limits::PRODUCT_PRICE_MAX)
            .check("availability", self.availability >= 0, "must not be negative")
            .required("category_id", &self.category_id)
            .finish()
    }
}

impl SoftDeletable for Product {
    fn is_deleted(&self) -> bool {
        self.is_deleted
    }

    fn set_deleted(&mut self, deleted: bool) {
        self.is_deleted = deleted;
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use storefront_persistence::entity::{Entity, Field, FieldDef, FieldKind, Validator, timestamp};
use storefront_persistence::error::ValidationDetail;
use uuid::Uuid;

use super::limits;

/// A product category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    #[serde(with = "timestamp")]
    pub date_created: DateTime<Utc>,
    pub name: String,
    #[serde(default)]
    pub picture_url: Option<String>,
}

impl Category {
    pub const NAME: Field<Category, String> = Field::new("name");

    /// Creates a category with a fresh id, created now.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            date_created: Utc::now(),
            name: name.into(),
            picture_url: None,
        }
    }
}

impl Entity for Category {
    type Key = String;
    const ENTITY_NAME: &'static str = "Category";

    fn id(&self) -> &String {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn fields() -> &'static [FieldDef] {
        const FIELDS: &[FieldDef] = &[
            FieldDef::new("date_created", FieldKind::Timestamp),
            FieldDef::new("name", FieldKind::Text),
            FieldDef::new("picture_url", FieldKind::Text),
        ];
        FIELDS
    }

    fn validate(&self) -> Vec<ValidationDetail> {
        Validator::new()
            .required("name", &self.name)
            .min_length("name", &self.name, limits::CATEGORY_NAME_MIN)
            .finish()
    }
}

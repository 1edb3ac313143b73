use serde::{Deserialize, Serialize};
use storefront_persistence::entity::{Entity, FieldDef, FieldKind, Validator};
use storefront_persistence::error::ValidationDetail;
use uuid::Uuid;

/// An image attached to another entity, usually a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Picture {
    pub id: String,
    pub url: String,
    /// Id of the entity the picture belongs to.
    pub entity_id: String,
}

impl Picture {
    pub fn new(url: impl Into<String>, entity_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            url: url.into(),
            entity_id: entity_id.into(),
        }
    }
}

impl Entity for Picture {
    type Key = String;
    const ENTITY_NAME: &'static str = "Picture";

    fn id(&self) -> &String {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn fields() -> &'static [FieldDef] {
        const FIELDS: &[FieldDef] = &[
            FieldDef::new("url", FieldKind::Text),
            FieldDef::new("entity_id", FieldKind::Text),
        ];
        FIELDS
    }

    fn validate(&self) -> Vec<ValidationDetail> {
        Validator::new()
            .required("url", &self.url)
            .required("entity_id", &self.entity_id)
            .finish()
    }
}

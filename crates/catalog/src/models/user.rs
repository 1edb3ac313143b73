use std::sync::LazyLock;

use serde::{Deserialize, Serialize};
use storefront_persistence::entity::{Entity, FieldDef, FieldKind};
use storefront_persistence::error::ValidationDetail;
use storefront_persistence::soft_delete::SoftDeletable;
use storefront_persistence::users::{AuthenticationUser, UserEntity};
use uuid::Uuid;

use super::limits;

/// A store customer or administrator.
///
/// The account fields are stored flat alongside the name fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(flatten)]
    pub account: AuthenticationUser,
    pub first_name: String,
    pub last_name: String,
}

impl User {
    pub fn new(
        email: impl Into<String>,
        password_hash: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            account: AuthenticationUser::new(email, password_hash),
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl Entity for User {
    type Key = Uuid;
    const ENTITY_NAME: &'static str = "User";

    fn id(&self) -> &Uuid {
        &self.account.id
    }

    fn set_id(&mut self, id: Uuid) {
        self.account.id = id;
    }

    fn fields() -> &'static [FieldDef] {
        static FIELDS: LazyLock<Vec<FieldDef>> = LazyLock::new(|| {
            let mut fields = AuthenticationUser::FIELDS.to_vec();
            fields.push(FieldDef::new("first_name", FieldKind::Text));
            fields.push(FieldDef::new("last_name", FieldKind::Text));
            fields
        });
        &FIELDS
    }

    fn validate(&self) -> Vec<ValidationDetail> {
        self.account
            .validator()
            .required("first_name", &self.first_name)
            .min_length("first_name", &self.first_name, limits::PERSON_NAME_MIN)
            .required("last_name", &self.last_name)
            .min_length("last_name", &self.last_name, limits::PERSON_NAME_MIN)
            .finish()
    }
}

impl SoftDeletable for User {
    fn is_deleted(&self) -> bool {
        self.account.is_deleted
    }

    fn set_deleted(&mut self, deleted: bool) {
        self.account.is_deleted = deleted;
    }
}

impl UserEntity for User {
    fn email(&self) -> &str {
        &self.account.email
    }

    fn username(&self) -> &str {
        &self.account.username
    }
}

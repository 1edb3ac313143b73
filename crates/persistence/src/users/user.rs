use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::{Entity, Field, FieldDef, FieldKind, Validator};
use crate::error::ValidationDetail;
use crate::soft_delete::SoftDeletable;

/// Entities that represent an authenticating user.
pub trait UserEntity: SoftDeletable {
    /// The serialized name of the email field.
    const EMAIL_FIELD: &'static str = "email";

    /// The serialized name of the username field.
    const USERNAME_FIELD: &'static str = "username";

    /// Returns the user's email address.
    fn email(&self) -> &str;

    /// Returns the user's login name.
    fn username(&self) -> &str;
}

/// The stored credentials and account flags of one user.
///
/// Passwords are never stored; hashing is the caller's concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthenticationUser {
    /// Unique identifier.
    pub id: Uuid,
    /// Email address.
    pub email: String,
    /// Login name. Defaults to the email address.
    pub username: String,
    /// Hash of the user's password.
    pub password_hash: String,
    /// Whether the email address has been confirmed.
    #[serde(default)]
    pub email_confirmed: bool,
    /// Whether the user has administrator rights.
    #[serde(default)]
    pub is_admin: bool,
    /// Whether the account is logically deleted.
    #[serde(default)]
    pub is_deleted: bool,
    /// Pending email confirmation token.
    #[serde(default)]
    pub email_confirmation_token: Option<String>,
    /// Pending password reset token.
    #[serde(default)]
    pub password_reset_token: Option<String>,
}

impl AuthenticationUser {
    /// Typed handle on the email field.
    pub const EMAIL: Field<AuthenticationUser, String> = Field::new("email");
    /// Typed handle on the username field.
    pub const USERNAME: Field<AuthenticationUser, String> = Field::new("username");
    /// Typed handle on the admin flag.
    pub const IS_ADMIN: Field<AuthenticationUser, bool> = Field::new("is_admin");

    /// Schema shared with types that flatten an `AuthenticationUser`.
    pub const FIELDS: &'static [FieldDef] = &[
        FieldDef::new("email", FieldKind::Text),
        FieldDef::new("username", FieldKind::Text),
        FieldDef::new("password_hash", FieldKind::Text),
        FieldDef::new("email_confirmed", FieldKind::Boolean),
        FieldDef::new("is_admin", FieldKind::Boolean),
        FieldDef::new("is_deleted", FieldKind::Boolean),
        FieldDef::new("email_confirmation_token", FieldKind::Text),
        FieldDef::new("password_reset_token", FieldKind::Text),
    ];

    /// Creates an unconfirmed, non-admin user with a fresh random id. The
    /// username is the email address.
    pub fn new(email: impl Into<String>, password_hash: impl Into<String>) -> Self {
        let email = email.into();
        Self {
            id: Uuid::new_v4(),
            username: email.clone(),
            email,
            password_hash: password_hash.into(),
            email_confirmed: false,
            is_admin: false,
            is_deleted: false,
            email_confirmation_token: None,
            password_reset_token: None,
        }
    }

    /// Replaces the username.
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    /// Checks the email and password hash.
    pub fn validator(&self) -> Validator {
        Validator::new()
            .required("email", &self.email)
            .email("email", &self.email)
            .required("password_hash", &self.password_hash)
    }
}

impl Entity for AuthenticationUser {
    type Key = Uuid;
    const ENTITY_NAME: &'static str = "AuthenticationUser";

    fn id(&self) -> &Uuid {
        &self.id
    }

    fn set_id(&mut self, id: Uuid) {
        self.id = id;
    }

    fn fields() -> &'static [FieldDef] {
        Self::FIELDS
    }

    fn validate(&self) -> Vec<ValidationDetail> {
        self.validator().finish()
    }
}

impl SoftDeletable for AuthenticationUser {
    fn is_deleted(&self) -> bool {
        self.is_deleted
    }

    fn set_deleted(&mut self, deleted: bool) {
        self.is_deleted = deleted;
    }
}

impl UserEntity for AuthenticationUser {
    fn email(&self) -> &str {
        &self.email
    }

    fn username(&self) -> &str {
        &self.username
    }
}

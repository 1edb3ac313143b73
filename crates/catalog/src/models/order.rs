use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use storefront_persistence::entity::{
    Entity, Field, FieldDef, FieldKind, FieldType, FieldValue, Validator, timestamp,
};
use storefront_persistence::error::ValidationDetail;
use uuid::Uuid;

use super::Product;
use super::limits;

/// Processing state of an order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderState {
    #[default]
    Pending,
    Approved,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderState {
    /// Every state, in processing order.
    pub const ALL: [OrderState; 5] = [
        OrderState::Pending,
        OrderState::Approved,
        OrderState::Shipped,
        OrderState::Delivered,
        OrderState::Cancelled,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            OrderState::Pending => "Pending",
            OrderState::Approved => "Approved",
            OrderState::Shipped => "Shipped",
            OrderState::Delivered => "Delivered",
            OrderState::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for OrderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<OrderState> for FieldValue {
    fn from(state: OrderState) -> Self {
        FieldValue::Text(state.as_str().to_string())
    }
}

impl FieldType for OrderState {
    const KIND: FieldKind = FieldKind::Text;
}

/// One ordered product, with the product as it was when ordered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product: Product,
    pub count: u32,
}

impl OrderItem {
    /// Price of the line.
    pub fn subtotal(&self) -> f64 {
        self.product.price * f64::from(self.count)
    }
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    #[serde(with = "timestamp")]
    pub date_time: DateTime<Utc>,
    pub customer_name: String,
    pub customer_phone_number: String,
    pub delivery_address: String,
    pub total_amount: f64,
    #[serde(default)]
    pub state: OrderState,
    /// Owning user; anonymous orders only carry a browser id.
    #[serde(default)]
    pub user_id: Option<String>,
    pub browser_id: String,
    #[serde(default)]
    pub items: Vec<OrderItem>,
}

impl Order {
    pub const USER_ID: Field<Order, String> = Field::new("user_id");
    pub const STATE: Field<Order, OrderState> = Field::new("state");
    pub const BROWSER_ID: Field<Order, String> = Field::new("browser_id");

    /// Creates a pending order placed now, totalling its items.
    pub fn new(
        browser_id: impl Into<String>,
        customer_name: impl Into<String>,
        customer_phone_number: impl Into<String>,
        delivery_address: impl Into<String>,
        items: Vec<OrderItem>,
    ) -> Self {
        let total_amount = items.iter().map(OrderItem::subtotal).sum();
        Self {
            id: Uuid::new_v4().to_string(),
            date_time: Utc::now(),
            customer_name: customer_name.into(),
            customer_phone_number: customer_phone_number.into(),
            delivery_address: delivery_address.into(),
            total_amount,
            state: OrderState::Pending,
            user_id: None,
            browser_id: browser_id.into(),
            items,
        }
    }

    /// Assigns the order to a signed-in user.
    pub fn for_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }
}

fn is_phone_number(value: &str) -> bool {
    let digits = value.chars().filter(char::is_ascii_digit).count();
    digits >= 6
        && value
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | ' ' | '(' | ')'))
}

impl Entity for Order {
    type Key = String;
    const ENTITY_NAME: &'static str = "Order";

    fn id(&self) -> &String {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn fields() -> &'static [FieldDef] {
        const FIELDS: &[FieldDef] = &[
            FieldDef::new("date_time", FieldKind::Timestamp),
            FieldDef::new("customer_name", FieldKind::Text),
            FieldDef::new("customer_phone_number", FieldKind::Text),
            FieldDef::new("delivery_address", FieldKind::Text),
            FieldDef::new("total_amount", FieldKind::Float),
            FieldDef::new("state", FieldKind::Text),
            FieldDef::new("user_id", FieldKind::Text),
            FieldDef::new("browser_id", FieldKind::Text),
        ];
        FIELDS
    }

    fn validate(&self) -> Vec<ValidationDetail> {
        Validator::new()
            .required("customer_name", &self.customer_name)
            .min_length("customer_name", &self.customer_name, limits::PERSON_NAME_MIN)
            .required("customer_phone_number", &self.customer_phone_number)
            .check(
                "customer_phone_number",
                self.customer_phone_number.is_empty() || is_phone_number(&self.customer_phone_number),
                "is not a valid phone number",
            )
            .required("delivery_address", &self.delivery_address)
            .required("browser_id", &self.browser_id)
            .check("total_amount", self.total_amount >= 0.0, "must not be negative")
            .finish()
    }
}

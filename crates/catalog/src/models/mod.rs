//! Store entities.

mod category;
mod order;
mod picture;
mod product;
mod user;

pub use category::Category;
pub use order::{Order, OrderItem, OrderState};
pub use picture::Picture;
pub use product::Product;
pub use user::User;

/// Field constraints shared by the models.
pub mod limits {
    pub const CATEGORY_NAME_MIN: usize = 3;
    pub const PERSON_NAME_MIN: usize = 2;
    pub const PRODUCT_NAME_MIN: usize = 3;
    pub const PRODUCT_DESCRIPTION_MIN: usize = 5;
    pub const PRODUCT_PRICE_MIN: f64 = 0.01;
    pub const PRODUCT_PRICE_MAX: f64 = 1_000_000.0;
}

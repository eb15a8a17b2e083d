//! Types that represent the core data model: `Expense` and `Category`.
mod category;
mod expense;

pub use category::{
    category_name, Categories, Category, BILLS_ID, COFFEE_ID, ENTERTAINMENT_ID, FOOD_ID,
    GROCERIES_ID, HEALTH_ID, OTHER_ID, RENT_ID, SHOPPING_ID, TRANSPORT_ID, UNKNOWN_CATEGORY,
};
pub use expense::Expense;

pub mod driver;
pub mod message;
pub mod order;
pub mod promo_code;
pub mod ride;
pub mod user;

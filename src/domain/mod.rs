pub mod errors;
pub mod fulfillment;
pub mod order;
pub mod ports;
pub mod product;
pub mod records;
pub mod user;

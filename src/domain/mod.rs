pub mod display;
pub mod mapping;
pub mod models;

pub use models::{Book, CatalogPage};

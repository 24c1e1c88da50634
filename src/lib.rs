//! Terminal browser for the IT Bookstore catalog: a new-books feed, a
//! paginated live search, book details and per-book memos.
//!
//! The interesting part is [`session`]: it decides which list is visible,
//! when pagination resets, and which fetch results are still current.

pub mod catalog_client;
pub mod config;
pub mod console;
pub mod domain;
pub mod session;
pub mod storage;

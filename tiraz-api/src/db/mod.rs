//! Database access for tiraz-api
//!
//! Pool creation and schema live in `tiraz_common::db`; this module holds the
//! per-table queries used by the handlers and the seeder.

pub mod catalog;
pub mod items;
pub mod measurements;

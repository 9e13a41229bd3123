//! # JotDB
//!
//! An embedded record store keeping one JSON document per table.
//!
//! Each table file holds an ordered field list, a primary-key counter, and
//! rows stored positionally against the field list. Tables support schema
//! evolution (add, remove, and rename fields), single-condition filters,
//! projection, multi-key ordering, and limit windows.
//!
//! ## Quick Start
//!
//! ```no_run
//! use jotdb_core::api::{JotDb, OrderKey, Query};
//! use jotdb_core::config::DatabaseOptions;
//! use serde_json::json;
//!
//! // Open (or bootstrap) the database directory
//! let db = JotDb::open(DatabaseOptions::new("database")).unwrap();
//!
//! // Create a table with two fields after the primary key
//! let houses = db.table("houses").unwrap();
//! houses.create_with_fields("house, words").unwrap();
//!
//! // Insert rows; the primary key is assigned automatically
//! let id = houses
//!     .insert(json!({"house": "Stark", "words": "Winter Is Coming"}))
//!     .unwrap();
//! assert_eq!(id, 1);
//!
//! // Query
//! let rows = houses
//!     .select(
//!         &Query::new()
//!             .filter("house != Lannister")
//!             .project("house")
//!             .order_by(OrderKey::asc("house"))
//!             .limit(10),
//!     )
//!     .unwrap();
//! assert_eq!(rows[0]["house"], "Stark");
//! ```

pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod storage;
pub mod types;

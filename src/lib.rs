//! Relational dataset generator.
//!
//! Builds large, internally consistent tables whose columns can reference
//! each other (foreign keys sampled from already generated tables) and whose
//! values can cluster around a small pool of repeated values, then writes
//! each table to a CSV file.
//!
//! # Example
//!
//! ```rust
//! use relgen::column::{self, Reference};
//! use relgen::{Session, SessionConfig, TableSpec, Value};
//!
//! let mut session = Session::new(SessionConfig::default()).unwrap();
//!
//! let mut next_id = 0;
//! let companies = session.add(
//!     TableSpec::builder("companies", 3)
//!         .column("ID", column::simple(move || {
//!             next_id += 1;
//!             Value::from(format!("cmp-{next_id}"))
//!         }))
//!         .build()
//!         .unwrap(),
//! );
//! let people = session.add(
//!     TableSpec::builder("people", 5)
//!         .column("CompanyID", Reference::new(companies, "ID"))
//!         .build()
//!         .unwrap(),
//! );
//!
//! assert_eq!(session.rows_of(people).unwrap().len(), 5);
//! ```

pub mod column;
pub mod config;
pub mod demo;
pub mod error;
pub mod fake;
pub mod json_schema;
pub mod row;
pub mod session;
pub mod spec;
pub mod value;
pub mod writer;

pub use error::{GenError, Result};
pub use row::{Row, RowBuilder};
pub use session::{Session, SessionConfig, TableHandle};
pub use spec::{TableSpec, TableSpecBuilder};
pub use value::Value;

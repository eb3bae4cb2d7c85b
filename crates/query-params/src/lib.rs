//! # elif-query-params: SQL Parameter Serialization for elif.rs
//!
//! Renders typed application values as escaped SQL text fragments and flattens
//! records into `key = value` lists for `UPDATE`/`INSERT ... SET` statements.
//!
//! - [`QueryParameter`]: the capability every renderable value implements
//! - [`QueryDictionary`], [`QueryArray`], [`Omittable`], `Option<T>`: composites
//! - [`to_query_dictionary`] and [`Record`]: flatten any `Serialize` record
//! - [`query_id!`]: strongly-typed identifiers over scalar keys
//! - [`SqlEscaper`]: injectable escaping, chosen through [`QueryParameterOption`]
//!
//! ```
//! use elif_query_params::{render, to_query_dictionary, Omittable};
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct ProfileUpdate {
//!     name: String,
//!     bio: Omittable<Option<String>>,
//! }
//!
//! let update = ProfileUpdate { name: "O'Brien".into(), bio: Omittable::Omitted };
//! let set = render(&to_query_dictionary(&update).unwrap()).unwrap();
//! assert_eq!(format!("UPDATE users SET {} WHERE id = {}", set, render(&7).unwrap()),
//!            "UPDATE users SET `name` = 'O\\'Brien' WHERE id = 7");
//!
//! let ids = render(&vec![1, 2, 3]).unwrap();
//! assert_eq!(ids.as_str(), "1, 2, 3");
//! ```

pub mod composite;
pub mod datetime;
pub mod decode;
pub mod dynamic;
pub mod error;
pub mod escape;
pub mod id;
pub mod option;
pub mod parameter;
pub mod record;
pub mod scalar;

// Re-export core traits and types
pub use composite::*;
pub use decode::*;
pub use error::*;
pub use escape::*;
pub use id::*;
pub use option::*;
pub use parameter::*;
pub use record::{to_query_dictionary, Record};
pub use scalar::*;

#[doc(hidden)]
pub mod __private {
    pub use serde;
}

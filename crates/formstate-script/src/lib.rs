//! Formstate Script - RON form definitions
//!
//! Loads field declarations from RON files:
//! - Field names, in declaration order
//! - Initial values
//! - Field configuration (visibility, enablement, view mode, rules)
//!
//! ```text
//! (
//!     fields: [
//!         (
//!             name: "email",
//!             initial: String(""),
//!             config: (
//!                 validation_rules: Some((
//!                     kind: string,
//!                     constraints: [(method: "required", params: (message: "Required"))],
//!                 )),
//!             ),
//!         ),
//!     ],
//! )
//! ```

mod error;
mod loader;
mod schema;

pub use error::{Error, Result};
pub use loader::{FormDef, Loader};
pub use schema::FieldDef;

//! OpenAPI schema support for contract hierarchies.
//!
//! [`SchemaProcessor`] post-processes a map of component schemas, keyed by
//! type name, that some schema generator produced. It adds the
//! `discriminator` object to hierarchy roots and links member schemas to
//! their root through `allOf`.

// -----------------------------------------------------------------------------
// Modules

mod processor;

// -----------------------------------------------------------------------------
// Exports

pub use processor::{DEFAULT_REF_PREFIX, SchemaProcessor};

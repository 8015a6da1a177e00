//! Reading documents that hold many independent contract objects.
//!
//! See [`ObjectReader`].

// -----------------------------------------------------------------------------
// Modules

mod object_reader;

// -----------------------------------------------------------------------------
// Exports

pub use object_reader::{ObjectReader, ReadError, ReadObject};

// -----------------------------------------------------------------------------
// Modules

mod cast;
mod deserialize;
mod upcast;

// -----------------------------------------------------------------------------
// Exports

pub use cast::TypeTraitCast;
pub use deserialize::TypeTraitDeserialize;
pub use upcast::{TypeTraitUpcast, UpcastFn};

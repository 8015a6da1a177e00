use alloc::vec::Vec;

use crate::info::TypeInfo;
use crate::registry::TypeRegistryArc;

// -----------------------------------------------------------------------------
// RelatedTypes

/// Supplies the candidate types scanned when the hierarchy of a root is built.
///
/// Candidates do not need to be filtered: the factory keeps those assignable
/// to the root that have a discriminator value. The same input must yield
/// the same candidates in the same order, so hierarchy construction is
/// deterministic.
///
/// Implemented for:
///
/// - [`TypeRegistryArc`]: every registered type, sorted by type path.
/// - `Vec<&'static TypeInfo>`: a fixed list, as given.
/// - [`RelatedTypesFn`]: any function.
pub trait RelatedTypes: Send + Sync {
    /// Returns the candidate members of the hierarchy rooted at `root`.
    fn related_types(&self, root: &'static TypeInfo) -> Vec<&'static TypeInfo>;
}

impl RelatedTypes for TypeRegistryArc {
    fn related_types(&self, _root: &'static TypeInfo) -> Vec<&'static TypeInfo> {
        self.read().type_infos()
    }
}

impl RelatedTypes for Vec<&'static TypeInfo> {
    #[inline]
    fn related_types(&self, _root: &'static TypeInfo) -> Vec<&'static TypeInfo> {
        self.clone()
    }
}

/// Adapts a function to [`RelatedTypes`].
///
/// # Examples
///
/// ```
/// use vc_contract::contract::{ContractRegistry, RelatedTypesFn};
/// use vc_contract::derive::Contract;
/// use vc_contract::info::{TypeInfo, Typed};
///
/// #[derive(Contract)]
/// #[contract(name = "kind", abstract)]
/// struct Event;
///
/// let registry = ContractRegistry::with_related_types(RelatedTypesFn(|_: &TypeInfo| vec![Event::type_info()]));
/// assert!(registry.is_polymorphic_of::<Event>().unwrap().is_some());
/// ```
#[derive(Clone, Copy, Debug)]
pub struct RelatedTypesFn<F>(pub F);

impl<F> RelatedTypes for RelatedTypesFn<F>
where
    F: Fn(&'static TypeInfo) -> Vec<&'static TypeInfo> + Send + Sync,
{
    #[inline]
    fn related_types(&self, root: &'static TypeInfo) -> Vec<&'static TypeInfo> {
        (self.0)(root)
    }
}

use alloc::sync::Arc;
use alloc::vec::Vec;

use vc_utils::TypeIdOnceMap;

use crate::contract::{ContractError, Member, RelatedTypes, TypeHierarchy};
use crate::info::TypeInfo;
use crate::registry::TypeRegistryArc;

// -----------------------------------------------------------------------------
// Contract

/// The resolved contract of one type.
#[derive(Clone, Debug)]
pub enum Contract {
    /// The type takes part in no hierarchy.
    NotPolymorphic,
    /// The type belongs to the contained hierarchy.
    Polymorphic(Arc<TypeHierarchy>),
}

impl Contract {
    /// Returns the hierarchy of a polymorphic contract.
    #[inline]
    pub fn hierarchy(&self) -> Option<&Arc<TypeHierarchy>> {
        match self {
            Self::NotPolymorphic => None,
            Self::Polymorphic(hierarchy) => Some(hierarchy),
        }
    }

    /// Returns `true` for [`Contract::Polymorphic`].
    #[inline]
    pub fn is_polymorphic(&self) -> bool {
        matches!(self, Self::Polymorphic(_))
    }
}

// -----------------------------------------------------------------------------
// ContractFactory

/// Decides whether a type belongs to a hierarchy.
///
/// Called by [`ContractRegistry`] at most once per queried type.
///
/// [`ContractRegistry`]: crate::contract::ContractRegistry
pub trait ContractFactory: Send + Sync {
    /// Resolves the contract of the type described by `info`.
    fn create_contract(&self, info: &'static TypeInfo) -> Result<Contract, ContractError>;
}

// -----------------------------------------------------------------------------
// DefaultContractFactory

/// The declaration-driven [`ContractFactory`].
///
/// A type is polymorphic if it carries a contract declaration and exactly
/// one type of its [ancestry] declares a discriminator name. That type is
/// the root. The hierarchy of a root is built once from the candidates of
/// the [`RelatedTypes`] supplier and shared by every member.
///
/// [ancestry]: TypeInfo::ancestors
pub struct DefaultContractFactory<R = TypeRegistryArc> {
    related: R,
    hierarchies: TypeIdOnceMap<Result<Arc<TypeHierarchy>, ContractError>>,
}

impl<R: RelatedTypes> DefaultContractFactory<R> {
    /// Creates a factory drawing hierarchy members from `related`.
    pub fn new(related: R) -> Self {
        Self {
            related,
            hierarchies: TypeIdOnceMap::new(),
        }
    }

    /// Returns the related-types supplier.
    #[inline]
    pub fn related(&self) -> &R {
        &self.related
    }

    /// Finds the root of the hierarchy `info` belongs to, and its
    /// discriminator name.
    ///
    /// Returns `Ok(None)` if no type of the ancestry declares a name. The
    /// declaration on `info` itself is not required here.
    pub fn root_contract_type(
        info: &'static TypeInfo,
    ) -> Result<Option<(&'static TypeInfo, &'static str)>, ContractError> {
        let declared: Vec<(&'static TypeInfo, &'static str)> = info
            .ancestors()
            .into_iter()
            .filter_map(|ancestor| ancestor.discriminator_name().map(|name| (ancestor, name)))
            .collect();

        match declared.as_slice() {
            [] => Ok(None),
            [root] => Ok(Some(*root)),
            _ => {
                let err = ContractError::AmbiguousDiscriminatorName {
                    type_name: info.type_name(),
                    declared_on: declared.iter().map(|(ancestor, _)| ancestor.type_name()).collect(),
                };
                log::warn!("{err}");
                Err(err)
            }
        }
    }

    fn build_hierarchy(
        &self,
        root: &'static TypeInfo,
        discriminator_name: &'static str,
    ) -> Result<TypeHierarchy, ContractError> {
        let members = self
            .related
            .related_types(root)
            .into_iter()
            .filter(|candidate| root.is_assignable_from(*candidate))
            .filter_map(|candidate| {
                candidate
                    .default_discriminator_value()
                    .map(|value| Member::new(candidate, value))
            });

        let hierarchy = TypeHierarchy::new(root, discriminator_name, members).inspect_err(|err| {
            log::warn!("{err}");
        })?;

        log::debug!(
            "built contract hierarchy of `{}` with discriminator `{}` and {} members",
            root.type_path(),
            discriminator_name,
            hierarchy.members().len(),
        );
        Ok(hierarchy)
    }
}

impl<R: RelatedTypes> ContractFactory for DefaultContractFactory<R> {
    fn create_contract(&self, info: &'static TypeInfo) -> Result<Contract, ContractError> {
        if info.contract().is_none() {
            return Ok(Contract::NotPolymorphic);
        }

        let Some((root, discriminator_name)) = Self::root_contract_type(info)? else {
            return Ok(Contract::NotPolymorphic);
        };

        self.hierarchies
            .get_or_init(root.type_id(), || {
                self.build_hierarchy(root, discriminator_name).map(Arc::new)
            })
            .map(Contract::Polymorphic)
    }
}

impl<R> core::fmt::Debug for DefaultContractFactory<R> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DefaultContractFactory")
            .field("hierarchies", &self.hierarchies.len())
            .finish_non_exhaustive()
    }
}

use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec::Vec;
use std::sync::OnceLock;

use vc_utils::TypeIdOnceMap;

use crate::contract::{Contract, ContractError, ContractFactory, DefaultContractFactory};
use crate::contract::{Member, RelatedTypes, TypeHierarchy};
use crate::info::{TypeInfo, Typed};
use crate::registry::TypeRegistryArc;

// -----------------------------------------------------------------------------
// ContractRegistry

/// The memoizing front door of contract resolution.
///
/// Every queried type is resolved once through the [`ContractFactory`],
/// and the outcome (including "not polymorphic" and configuration errors)
/// is cached. Concurrent first queries for the same type block on a single
/// resolution, and all types of one hierarchy receive the same
/// `Arc<TypeHierarchy>`.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use vc_contract::contract::ContractRegistry;
/// use vc_contract::derive::{Contract, contract_trait};
/// use vc_contract::info::Typed;
/// use serde::{Deserialize, Serialize};
///
/// #[contract_trait(name = "Type")]
/// trait Message {}
///
/// #[derive(Contract, Serialize, Deserialize)]
/// #[contract(value = "ping", implements(dyn Message))]
/// struct Ping;
///
/// #[derive(Contract, Serialize, Deserialize)]
/// #[contract(implements(dyn Message))]
/// struct Pong;
///
/// impl Message for Ping {}
/// impl Message for Pong {}
///
/// let registry = ContractRegistry::with_related_types(vec![
///     <dyn Message>::type_info(),
///     Ping::type_info(),
///     Pong::type_info(),
/// ]);
///
/// let hierarchy = registry.hierarchy_of::<Ping>().unwrap();
/// assert_eq!(hierarchy.discriminator_name(), "Type");
/// assert_eq!(hierarchy.discriminator_value(Pong::type_info()), Ok("Pong"));
/// assert!(Arc::ptr_eq(&hierarchy, &registry.hierarchy_of::<dyn Message>().unwrap()));
/// ```
pub struct ContractRegistry {
    factory: Box<dyn ContractFactory>,
    contracts: TypeIdOnceMap<Result<Contract, ContractError>>,
}

impl ContractRegistry {
    /// Creates a registry resolving contracts through `factory`.
    pub fn new(factory: impl ContractFactory + 'static) -> Self {
        Self {
            factory: Box::new(factory),
            contracts: TypeIdOnceMap::new(),
        }
    }

    /// Creates a registry over a [`DefaultContractFactory`] with the given supplier.
    #[inline]
    pub fn with_related_types(related: impl RelatedTypes + 'static) -> Self {
        Self::new(DefaultContractFactory::new(related))
    }

    /// The process-wide registry, drawing members from [`TypeRegistryArc::global`].
    pub fn global() -> &'static Arc<ContractRegistry> {
        static GLOBAL: OnceLock<Arc<ContractRegistry>> = OnceLock::new();
        GLOBAL.get_or_init(|| {
            Arc::new(ContractRegistry::with_related_types(
                TypeRegistryArc::global().clone(),
            ))
        })
    }

    /// Returns the cached contract of `info`, resolving it on first use.
    pub fn contract(&self, info: &'static TypeInfo) -> Result<Contract, ContractError> {
        self.contracts.get_or_init(info.type_id(), || {
            log::trace!("resolving contract of `{}`", info.type_path());
            self.factory.create_contract(info)
        })
    }

    /// Returns the hierarchy of `info`, or `None` if it is not polymorphic.
    pub fn is_polymorphic(
        &self,
        info: &'static TypeInfo,
    ) -> Result<Option<Arc<TypeHierarchy>>, ContractError> {
        Ok(match self.contract(info)? {
            Contract::NotPolymorphic => None,
            Contract::Polymorphic(hierarchy) => Some(hierarchy),
        })
    }

    /// See [`is_polymorphic`](Self::is_polymorphic).
    #[inline]
    pub fn is_polymorphic_of<T: Typed + ?Sized>(
        &self,
    ) -> Result<Option<Arc<TypeHierarchy>>, ContractError> {
        self.is_polymorphic(T::type_info())
    }

    /// Returns the hierarchy of `info`, failing if it is not polymorphic.
    pub fn hierarchy_info(&self, info: &'static TypeInfo) -> Result<Arc<TypeHierarchy>, ContractError> {
        self.is_polymorphic(info)?
            .ok_or(ContractError::NotAContractType {
                type_name: info.type_name(),
            })
    }

    /// See [`hierarchy_info`](Self::hierarchy_info).
    #[inline]
    pub fn hierarchy_of<T: Typed + ?Sized>(&self) -> Result<Arc<TypeHierarchy>, ContractError> {
        self.hierarchy_info(T::type_info())
    }

    /// Returns the members of the hierarchy of `info`, other than `info`
    /// itself, that can stand where `info` is expected.
    ///
    /// Empty for types that are not polymorphic.
    pub fn derived_types(&self, info: &'static TypeInfo) -> Result<Vec<Member>, ContractError> {
        let Some(hierarchy) = self.is_polymorphic(info)? else {
            return Ok(Vec::new());
        };

        Ok(hierarchy
            .members()
            .iter()
            .filter(|member| {
                member.info().type_id() != info.type_id() && info.is_assignable_from(member.info())
            })
            .copied()
            .collect())
    }
}

impl core::fmt::Debug for ContractRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ContractRegistry")
            .field("contracts", &self.contracts.len())
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::sync::Arc;
    use core::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    use serde::{Deserialize, Serialize};

    use crate::contract::{ContractError, ContractRegistry, Member, RelatedTypesFn};
    use crate::derive::{Contract, Typed, contract_trait};
    use crate::info::{TypeInfo, Typed as _};

    #[contract_trait(name = "Type")]
    trait BaseA {}

    #[derive(Contract, Serialize, Deserialize)]
    #[contract(value = "Subclass-A1", implements(dyn BaseA))]
    struct SubclassA1;

    #[derive(Typed, Serialize, Deserialize)]
    #[contract(implements(dyn BaseA))]
    struct SubclassA2;

    #[derive(Contract, Serialize, Deserialize)]
    #[contract(value = "Subclass-A2-1", base = SubclassA2, implements(dyn BaseA))]
    struct SubclassA21;

    impl BaseA for SubclassA1 {}
    impl BaseA for SubclassA2 {}
    impl BaseA for SubclassA21 {}

    #[derive(Contract, Serialize, Deserialize)]
    #[contract(name = "Type", value = "Base-B")]
    struct BaseB;

    #[derive(Contract, Serialize, Deserialize)]
    #[contract(value = "Subclass-A1", base = BaseB)]
    struct SubclassB;

    #[derive(Contract, Serialize, Deserialize)]
    #[contract(base = BaseB)]
    struct SubclassB2;

    #[derive(Typed)]
    struct Plain;

    fn all_types() -> Vec<&'static TypeInfo> {
        vec![
            <dyn BaseA>::type_info(),
            SubclassA1::type_info(),
            SubclassA2::type_info(),
            SubclassA21::type_info(),
            BaseB::type_info(),
            SubclassB::type_info(),
            SubclassB2::type_info(),
            Plain::type_info(),
        ]
    }

    #[test]
    fn only_declared_types_of_a_hierarchy_are_polymorphic() {
        let reg = ContractRegistry::with_related_types(all_types());

        assert!(reg.is_polymorphic_of::<dyn BaseA>().unwrap().is_some());
        assert!(reg.is_polymorphic_of::<SubclassA1>().unwrap().is_some());
        assert!(reg.is_polymorphic_of::<SubclassA2>().unwrap().is_none());
        assert!(reg.is_polymorphic_of::<SubclassA21>().unwrap().is_some());
        assert!(reg.is_polymorphic_of::<Plain>().unwrap().is_none());
    }

    #[test]
    fn members_share_one_hierarchy() {
        let reg = ContractRegistry::with_related_types(all_types());

        let h = reg.hierarchy_of::<SubclassA1>().unwrap();
        assert!(Arc::ptr_eq(&h, &reg.hierarchy_of::<dyn BaseA>().unwrap()));
        assert!(Arc::ptr_eq(&h, &reg.hierarchy_of::<SubclassA21>().unwrap()));

        assert!(h.root().is::<dyn BaseA>());
        assert_eq!(h.discriminator_name(), "Type");
        assert_eq!(
            h.members(),
            [
                Member::new(SubclassA1::type_info(), "Subclass-A1"),
                Member::new(SubclassA21::type_info(), "Subclass-A2-1"),
            ]
        );
        assert_eq!(h.discriminator_value(SubclassA21::type_info()), Ok("Subclass-A2-1"));
        assert!(h.resolve_type("Subclass-A1").unwrap().is::<SubclassA1>());
        assert!(h.resolve_type("Subclass-A2-1").unwrap().is::<SubclassA21>());
    }

    #[test]
    fn values_are_scoped_per_hierarchy() {
        let reg = ContractRegistry::with_related_types(all_types());

        let h = reg.hierarchy_of::<BaseB>().unwrap();
        assert!(h.resolve_type("Subclass-A1").unwrap().is::<SubclassB>());
        assert!(h.members().contains(&Member::new(BaseB::type_info(), "Base-B")));

        // Concrete types default to their type name.
        assert_eq!(h.discriminator_value(SubclassB2::type_info()), Ok("SubclassB2"));
        assert!(h.resolve_type("SubclassB2").unwrap().is::<SubclassB2>());
    }

    #[test]
    fn not_a_contract_type() {
        let reg = ContractRegistry::with_related_types(all_types());

        assert_eq!(
            reg.hierarchy_of::<Plain>().unwrap_err(),
            ContractError::NotAContractType { type_name: "Plain" }
        );
    }

    #[test]
    fn derived_types_exclude_the_queried_type() {
        let reg = ContractRegistry::with_related_types(all_types());

        let derived: Vec<_> = reg
            .derived_types(BaseB::type_info())
            .unwrap()
            .into_iter()
            .map(|member| member.discriminator_value())
            .collect();
        assert_eq!(derived, ["Subclass-A1", "SubclassB2"]);

        assert!(reg.derived_types(SubclassB::type_info()).unwrap().is_empty());
        assert!(reg.derived_types(Plain::type_info()).unwrap().is_empty());
    }

    #[contract_trait(name = "Type")]
    trait First {}

    #[contract_trait(name = "Type")]
    trait Second {}

    #[derive(Contract, Serialize, Deserialize)]
    #[contract(implements(dyn First, dyn Second))]
    struct Both;

    impl First for Both {}
    impl Second for Both {}

    #[test]
    fn redundant_discriminator_name_is_an_error() {
        let reg = ContractRegistry::with_related_types(vec![Both::type_info()]);

        let err = reg.contract(Both::type_info()).unwrap_err();
        assert_eq!(
            err,
            ContractError::AmbiguousDiscriminatorName {
                type_name: "Both",
                declared_on: vec!["dyn First", "dyn Second"],
            }
        );
        assert!(err.to_string().contains("Both"));

        // Cached, not retried.
        assert_eq!(reg.contract(Both::type_info()).unwrap_err(), err);
    }

    #[derive(Contract, Serialize, Deserialize)]
    #[contract(value = "Base-B", base = BaseB)]
    struct Clash;

    #[test]
    fn duplicate_value_fails_every_member() {
        let reg = ContractRegistry::with_related_types(vec![
            BaseB::type_info(),
            Clash::type_info(),
        ]);

        let err = reg.hierarchy_of::<BaseB>().unwrap_err();
        assert!(matches!(err, ContractError::DuplicateDiscriminatorValue { value: "Base-B", .. }));
        assert_eq!(reg.hierarchy_of::<Clash>().unwrap_err(), err);
    }

    #[test]
    fn concurrent_queries_build_once() {
        static CALLS: AtomicUsize = AtomicUsize::new(0);

        let reg = Arc::new(ContractRegistry::with_related_types(RelatedTypesFn(|_: &TypeInfo| {
            CALLS.fetch_add(1, Ordering::SeqCst);
            thread::yield_now();
            all_types()
        })));

        let queries: [fn() -> &'static TypeInfo; 3] = [
            <dyn BaseA>::type_info,
            SubclassA1::type_info,
            SubclassA21::type_info,
        ];

        let handles: Vec<_> = (0..9)
            .map(|i| {
                let reg = Arc::clone(&reg);
                let query = queries[i % 3];
                thread::spawn(move || reg.hierarchy_info(query()).unwrap())
            })
            .collect();

        let hierarchies: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(CALLS.load(Ordering::SeqCst), 1);
        assert!(hierarchies.iter().all(|h| Arc::ptr_eq(h, &hierarchies[0])));
    }
}

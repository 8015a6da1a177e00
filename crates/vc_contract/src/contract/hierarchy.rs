use alloc::string::ToString;
use alloc::vec::Vec;
use core::any::TypeId;
use core::fmt;

use vc_utils::TypeIdMap;
use vc_utils::hash::HashMap;

use crate::contract::ContractError;
use crate::info::TypeInfo;

// -----------------------------------------------------------------------------
// Member

/// A type of a hierarchy together with its discriminator value.
#[derive(Clone, Copy)]
pub struct Member {
    info: &'static TypeInfo,
    discriminator_value: &'static str,
}

impl Member {
    /// Creates a member.
    #[inline]
    pub const fn new(info: &'static TypeInfo, discriminator_value: &'static str) -> Self {
        Self {
            info,
            discriminator_value,
        }
    }

    /// Returns the [`TypeInfo`] of the member type.
    #[inline]
    pub const fn info(&self) -> &'static TypeInfo {
        self.info
    }

    /// Returns the discriminator value denoting the member type.
    #[inline]
    pub const fn discriminator_value(&self) -> &'static str {
        self.discriminator_value
    }
}

impl PartialEq for Member {
    fn eq(&self, other: &Self) -> bool {
        self.info.type_id() == other.info.type_id()
            && self.discriminator_value == other.discriminator_value
    }
}

impl Eq for Member {}

impl fmt::Debug for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} => {:?}", self.info.type_path(), self.discriminator_value)
    }
}

// -----------------------------------------------------------------------------
// TypeHierarchy

/// A resolved hierarchy: a root type, the discriminator field name, and the
/// bidirectional mapping between member types and discriminator values.
///
/// Immutable once built. A [`ContractRegistry`] hands out the same
/// `Arc<TypeHierarchy>` for every type of one hierarchy.
///
/// The root is only a member if it has a discriminator value of its own.
///
/// # Examples
///
/// ```
/// use vc_contract::contract::{Member, TypeHierarchy};
/// use vc_contract::derive::Contract;
/// use vc_contract::info::Typed;
/// use serde::Deserialize;
///
/// #[derive(Contract)]
/// #[contract(name = "kind", abstract)]
/// struct Shape;
///
/// #[derive(Contract, Deserialize)]
/// #[contract(value = "circle", base = Shape)]
/// struct Circle;
///
/// let hierarchy = TypeHierarchy::new(
///     Shape::type_info(),
///     "kind",
///     [Member::new(Circle::type_info(), "circle")],
/// ).unwrap();
///
/// assert_eq!(hierarchy.discriminator_value(Circle::type_info()), Ok("circle"));
/// assert!(hierarchy.resolve_type("circle").unwrap().is::<Circle>());
/// assert!(hierarchy.resolve_type("square").is_err());
/// ```
///
/// [`ContractRegistry`]: crate::contract::ContractRegistry
pub struct TypeHierarchy {
    root: &'static TypeInfo,
    discriminator_name: &'static str,
    members: Vec<Member>,
    by_type: TypeIdMap<usize>,
    by_value: HashMap<&'static str, usize>,
}

impl TypeHierarchy {
    /// Builds a hierarchy from its members.
    ///
    /// A type listed more than once is kept once, with its first value.
    /// Two distinct types sharing a discriminator value are a configuration
    /// error.
    pub fn new(
        root: &'static TypeInfo,
        discriminator_name: &'static str,
        members: impl IntoIterator<Item = Member>,
    ) -> Result<Self, ContractError> {
        let mut hierarchy = Self {
            root,
            discriminator_name,
            members: Vec::new(),
            by_type: TypeIdMap::new(),
            by_value: HashMap::default(),
        };

        for member in members {
            if hierarchy.by_type.contains(&member.info.type_id()) {
                continue;
            }

            let index = hierarchy.members.len();
            if let Some(&other) = hierarchy.by_value.get(member.discriminator_value) {
                return Err(ContractError::DuplicateDiscriminatorValue {
                    root: root.type_name(),
                    value: member.discriminator_value,
                    first: hierarchy.members[other].info.type_name(),
                    second: member.info.type_name(),
                });
            }

            hierarchy.by_value.insert(member.discriminator_value, index);
            hierarchy.by_type.insert(member.info.type_id(), index);
            hierarchy.members.push(member);
        }

        Ok(hierarchy)
    }

    /// Returns the type the discriminator name is declared on.
    #[inline]
    pub const fn root(&self) -> &'static TypeInfo {
        self.root
    }

    /// Returns the name of the field carrying the discriminator.
    #[inline]
    pub const fn discriminator_name(&self) -> &'static str {
        self.discriminator_name
    }

    /// Returns the members in the order they were supplied.
    #[inline]
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    /// Returns `true` if the type with `type_id` is a member.
    #[inline]
    pub fn contains(&self, type_id: TypeId) -> bool {
        self.by_type.contains(&type_id)
    }

    /// Returns the discriminator value of a member type.
    ///
    /// For a type that is not a member, the error tells apart a type without
    /// any contract declaration, a declared type that belongs here but was
    /// never supplied (usually a missing registration), and a type of
    /// another hierarchy.
    pub fn discriminator_value(&self, info: &'static TypeInfo) -> Result<&'static str, ContractError> {
        if let Some(&index) = self.by_type.get(&info.type_id()) {
            return Ok(self.members[index].discriminator_value);
        }

        let type_name = info.type_name();
        let root = self.root.type_name();

        if info.contract().is_none() {
            Err(ContractError::MissingContract { type_name })
        } else if info.default_discriminator_value().is_some() && self.root.is_assignable_from(info) {
            Err(ContractError::NotRegistered { type_name, root })
        } else {
            Err(ContractError::NotInHierarchy { type_name, root })
        }
    }

    /// Returns the member type denoted by `discriminator_value`.
    pub fn resolve_type(&self, discriminator_value: &str) -> Result<&'static TypeInfo, ContractError> {
        match self.by_value.get(discriminator_value) {
            Some(&index) => Ok(self.members[index].info),
            None => Err(ContractError::UnknownDiscriminatorValue {
                value: discriminator_value.to_string(),
                root: self.root.type_name(),
            }),
        }
    }
}

impl fmt::Debug for TypeHierarchy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeHierarchy")
            .field("root", &self.root.type_path())
            .field("discriminator_name", &self.discriminator_name)
            .field("members", &self.members)
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Tests

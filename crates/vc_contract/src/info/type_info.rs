use alloc::vec::Vec;
use core::any::TypeId;
use core::fmt;

use crate::info::{ContractDecl, Type, TypePath, Typed};

// -----------------------------------------------------------------------------
// TypeKind

/// How a type participates in a hierarchy.
///
/// Only concrete types receive their type name as default discriminator value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// A trait object, the counterpart of an interface.
    Interface,
    /// A type that is never serialized as itself.
    Abstract,
    /// A constructible type.
    Concrete,
}

impl TypeKind {
    /// Returns `true` for [`TypeKind::Concrete`].
    #[inline]
    pub const fn is_concrete(self) -> bool {
        matches!(self, TypeKind::Concrete)
    }
}

// -----------------------------------------------------------------------------
// TypeInfo

type InfoFn = fn() -> &'static TypeInfo;

/// Compile-time information about a contract participant.
///
/// Ancestors are stored as accessor functions, so building one `TypeInfo`
/// never forces the construction of another; mutually referring types do
/// not recurse during initialization.
///
/// # Examples
///
/// ```
/// use vc_contract::info::{
///     ContractDecl, NonGenericTypeInfoCell, TypeInfo, TypeKind, TypePath, Typed,
/// };
///
/// struct Vehicle;
/// struct Car;
///
/// impl TypePath for Vehicle {
///     fn type_path() -> &'static str { "garage::Vehicle" }
///     fn type_name() -> &'static str { "Vehicle" }
/// }
/// impl TypePath for Car {
///     fn type_path() -> &'static str { "garage::Car" }
///     fn type_name() -> &'static str { "Car" }
/// }
///
/// impl Typed for Vehicle {
///     fn type_info() -> &'static TypeInfo {
///         static CELL: NonGenericTypeInfoCell = NonGenericTypeInfoCell::new();
///         CELL.get_or_init(|| {
///             TypeInfo::new::<Self>(TypeKind::Abstract)
///                 .with_contract(ContractDecl::new().with_name("Type"))
///         })
///     }
/// }
/// impl Typed for Car {
///     fn type_info() -> &'static TypeInfo {
///         static CELL: NonGenericTypeInfoCell = NonGenericTypeInfoCell::new();
///         CELL.get_or_init(|| {
///             TypeInfo::new::<Self>(TypeKind::Concrete)
///                 .with_base::<Vehicle>()
///                 .with_contract(ContractDecl::new())
///         })
///     }
/// }
///
/// assert!(Vehicle::type_info().is_assignable_from(Car::type_info()));
/// assert_eq!(Car::type_info().default_discriminator_value(), Some("Car"));
/// assert_eq!(Vehicle::type_info().default_discriminator_value(), None);
/// ```
pub struct TypeInfo {
    ty: Type,
    kind: TypeKind,
    contract: Option<ContractDecl>,
    base: Option<InfoFn>,
    interfaces: Vec<InfoFn>,
}

impl TypeInfo {
    /// Creates the info of `T` without ancestors or declaration.
    pub fn new<T: TypePath + ?Sized>(kind: TypeKind) -> Self {
        Self {
            ty: Type::of::<T>(),
            kind,
            contract: None,
            base: None,
            interfaces: Vec::new(),
        }
    }

    /// Attaches a contract declaration.
    pub fn with_contract(mut self, contract: ContractDecl) -> Self {
        self.contract = Some(contract);
        self
    }

    /// Sets the base type `B`.
    pub fn with_base<B: Typed + ?Sized>(mut self) -> Self {
        self.base = Some(B::type_info);
        self
    }

    /// Adds `I` to the implemented (or, for interfaces, extended) interfaces.
    pub fn with_interface<I: Typed + ?Sized>(mut self) -> Self {
        self.interfaces.push(I::type_info);
        self
    }

    /// Returns the [`Type`].
    #[inline(always)]
    pub const fn ty(&self) -> &Type {
        &self.ty
    }

    /// Returns the [`TypeId`].
    #[inline]
    pub const fn type_id(&self) -> TypeId {
        self.ty.id()
    }

    /// See [`TypePath::type_path`].
    #[inline]
    pub fn type_path(&self) -> &'static str {
        self.ty.path()
    }

    /// See [`TypePath::type_name`].
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.ty.name()
    }

    /// Returns `true` if this is the info of `T`.
    #[inline]
    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.ty.is::<T>()
    }

    /// Returns the [`TypeKind`].
    #[inline]
    pub const fn kind(&self) -> TypeKind {
        self.kind
    }

    /// Returns the declaration on this exact type.
    #[inline]
    pub const fn contract(&self) -> Option<&ContractDecl> {
        self.contract.as_ref()
    }

    /// Returns the discriminator name this exact type declares.
    pub fn discriminator_name(&self) -> Option<&'static str> {
        self.contract.and_then(|decl| decl.discriminator_name())
    }

    /// Returns the discriminator value this type has as a hierarchy member.
    ///
    /// The explicit value if declared, otherwise the type name for concrete
    /// types. `None` for undeclared types and for abstract types and
    /// interfaces without an explicit value.
    pub fn default_discriminator_value(&self) -> Option<&'static str> {
        let decl = self.contract?;
        match decl.discriminator_value() {
            Some(value) => Some(value),
            None if self.kind.is_concrete() => Some(self.type_name()),
            None => None,
        }
    }

    /// Returns the base type.
    #[inline]
    pub fn base(&self) -> Option<&'static TypeInfo> {
        self.base.map(|f| f())
    }

    /// Returns the directly implemented interfaces.
    pub fn interfaces(&self) -> impl ExactSizeIterator<Item = &'static TypeInfo> + '_ {
        self.interfaces.iter().map(|f| f())
    }

    /// Returns this type followed by all of its ancestors, without duplicates.
    ///
    /// The order is: the type itself, its base chain, then every interface
    /// reachable from those (breadth first, including interfaces extended by
    /// interfaces).
    pub fn ancestors(&'static self) -> Vec<&'static TypeInfo> {
        let mut out: Vec<&'static TypeInfo> = Vec::new();
        let push = |out: &mut Vec<&'static TypeInfo>, info: &'static TypeInfo| {
            let fresh = !out.iter().any(|seen| seen.type_id() == info.type_id());
            if fresh {
                out.push(info);
            }
            fresh
        };

        let mut current = Some(self);
        while let Some(info) = current {
            if !push(&mut out, info) {
                break;
            }
            current = info.base();
        }

        let mut index = 0;
        while index < out.len() {
            let info = out[index];
            for interface in info.interfaces() {
                push(&mut out, interface);
            }
            index += 1;
        }

        out
    }

    /// Returns `true` if a value of `other` can stand where this type is expected.
    ///
    /// Every type is assignable from itself.
    pub fn is_assignable_from(&self, other: &'static TypeInfo) -> bool {
        other
            .ancestors()
            .iter()
            .any(|ancestor| ancestor.type_id() == self.type_id())
    }
}

impl fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeInfo")
            .field("type_path", &self.type_path())
            .field("kind", &self.kind)
            .field("contract", &self.contract)
            .field("base", &self.base().map(TypeInfo::type_path))
            .field(
                "interfaces",
                &self.interfaces().map(TypeInfo::type_path).collect::<Vec<_>>(),
            )
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use crate::info::{ContractDecl, NonGenericTypeInfoCell, TypeInfo, TypeKind, TypePath, Typed};

    macro_rules! typed {
        ($ty:ident, $build:expr) => {
            impl TypePath for $ty {
                fn type_path() -> &'static str {
                    concat!("tests::", stringify!($ty))
                }
                fn type_name() -> &'static str {
                    stringify!($ty)
                }
            }
            impl Typed for $ty {
                fn type_info() -> &'static TypeInfo {
                    static CELL: NonGenericTypeInfoCell = NonGenericTypeInfoCell::new();
                    CELL.get_or_init($build)
                }
            }
        };
    }

    struct Root;
    struct Middle;
    struct Leaf;
    struct Marker;
    struct Extended;

    typed!(Root, || TypeInfo::new::<Root>(TypeKind::Interface)
        .with_contract(ContractDecl::new().with_name("Type")));
    typed!(Extended, || TypeInfo::new::<Extended>(TypeKind::Interface)
        .with_interface::<Root>());
    typed!(Marker, || TypeInfo::new::<Marker>(TypeKind::Interface));
    typed!(Middle, || TypeInfo::new::<Middle>(TypeKind::Abstract)
        .with_interface::<Extended>()
        .with_interface::<Marker>());
    typed!(Leaf, || TypeInfo::new::<Leaf>(TypeKind::Concrete)
        .with_base::<Middle>()
        .with_interface::<Marker>()
        .with_contract(ContractDecl::new()));

    #[test]
    fn ancestors_are_ordered_and_unique() {
        let names: Vec<_> = Leaf::type_info()
            .ancestors()
            .into_iter()
            .map(TypeInfo::type_name)
            .collect();

        assert_eq!(names, ["Leaf", "Middle", "Marker", "Extended", "Root"]);
    }

    #[test]
    fn assignability_follows_declared_ancestry() {
        assert!(Root::type_info().is_assignable_from(Leaf::type_info()));
        assert!(Middle::type_info().is_assignable_from(Leaf::type_info()));
        assert!(Leaf::type_info().is_assignable_from(Leaf::type_info()));
        assert!(!Leaf::type_info().is_assignable_from(Middle::type_info()));
        assert!(!Marker::type_info().is_assignable_from(Root::type_info()));
    }

    #[test]
    fn default_values_only_for_declared_concrete_types() {
        assert_eq!(Leaf::type_info().default_discriminator_value(), Some("Leaf"));
        assert_eq!(Root::type_info().default_discriminator_value(), None);
        assert_eq!(Middle::type_info().default_discriminator_value(), None);
    }
}

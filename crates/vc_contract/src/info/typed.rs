use crate::info::{TypeInfo, TypePath};

// -----------------------------------------------------------------------------
// Typed

/// A static accessor to a type's [`TypeInfo`].
///
/// Implemented by `#[derive(Contract)]`, `#[derive(Typed)]` and
/// `#[contract_trait]`. Manual implementations store the info in a
/// [`NonGenericTypeInfoCell`](crate::info::NonGenericTypeInfoCell):
///
/// ```
/// use vc_contract::info::{
///     ContractDecl, NonGenericTypeInfoCell, TypeInfo, TypeKind, TypePath, Typed,
/// };
///
/// struct Truck;
///
/// impl TypePath for Truck {
///     fn type_path() -> &'static str { "garage::Truck" }
///     fn type_name() -> &'static str { "Truck" }
/// }
///
/// impl Typed for Truck {
///     fn type_info() -> &'static TypeInfo {
///         static CELL: NonGenericTypeInfoCell = NonGenericTypeInfoCell::new();
///         CELL.get_or_init(|| {
///             TypeInfo::new::<Self>(TypeKind::Concrete)
///                 .with_contract(ContractDecl::new().with_name("kind"))
///         })
///     }
/// }
///
/// assert_eq!(Truck::type_info().discriminator_name(), Some("kind"));
/// ```
pub trait Typed: TypePath {
    /// Returns the compile-time info of the type.
    fn type_info() -> &'static TypeInfo;
}

// -----------------------------------------------------------------------------
// DynamicTyped

/// Access to the [`TypeInfo`] of a value's runtime type.
///
/// Blanket implemented for every sized [`Typed`] type, so it survives
/// type erasure behind a trait object.
pub trait DynamicTyped {
    /// See [`Typed::type_info`].
    fn reflect_type_info(&self) -> &'static TypeInfo;
}

impl<T: Typed> DynamicTyped for T {
    #[inline]
    fn reflect_type_info(&self) -> &'static TypeInfo {
        T::type_info()
    }
}

// -----------------------------------------------------------------------------
// TypePath

/// A static accessor to type paths and names.
///
/// A stable alternative to [`core::any::type_name`]: the values are chosen
/// by the implementation and do not change between compiler versions.
///
/// - [`type_path`](TypePath::type_path): unique, fully qualified.
/// - [`type_name`](TypePath::type_name): without module path, may be duplicated.
///   Concrete contract types use it as their default discriminator value.
/// - [`module_path`](TypePath::module_path): optional module path.
///
/// Paths never start with `::`.
///
/// Usually implemented by `#[derive(Contract)]`, `#[derive(Typed)]` or
/// `#[contract_trait]`. Trait objects are named with a `dyn ` prefix.
///
/// # Examples
///
/// ```
/// use vc_contract::info::TypePath;
///
/// struct Circle;
///
/// impl TypePath for Circle {
///     fn type_path() -> &'static str {
///         "shapes::Circle"
///     }
///
///     fn type_name() -> &'static str {
///         "Circle"
///     }
/// }
///
/// assert_eq!(Circle::type_name(), "Circle");
/// assert_eq!(Circle::module_path(), None);
/// ```
pub trait TypePath: 'static {
    /// Returns the fully qualified path of the type.
    fn type_path() -> &'static str;

    /// Returns the short name of the type.
    fn type_name() -> &'static str;

    /// Returns the module path of the type, if known.
    #[inline]
    fn module_path() -> Option<&'static str> {
        None
    }
}

use crate::info::Typed;

/// Creates a [`TypeTrait`] for the type `T`.
///
/// Used by `#[derive(Contract)]` to fill a [`TypeMeta`] through
/// [`TypeMeta::insert_trait`].
///
/// # Example
///
/// ```
/// # use vc_contract::registry::{FromType, TypeMeta, TypeTraitCast, TypeTraitDeserialize};
/// # use vc_contract::derive::Contract;
/// # use serde::Deserialize;
/// #[derive(Contract, Deserialize)]
/// #[contract(name = "kind", deserialize = false)]
/// struct Note {
///     text: String,
/// }
///
/// let mut meta = TypeMeta::of::<Note>();
/// meta.insert_trait::<TypeTraitDeserialize>(FromType::<Note>::from_type());
/// meta.insert_trait::<TypeTraitCast<Note>>(FromType::<Note>::from_type());
///
/// assert!(meta.has_trait::<TypeTraitDeserialize>());
/// ```
///
/// [`TypeTrait`]: crate::registry::TypeTrait
/// [`TypeMeta`]: crate::registry::TypeMeta
/// [`TypeMeta::insert_trait`]: crate::registry::TypeMeta::insert_trait
pub trait FromType<T: Typed + ?Sized> {
    fn from_type() -> Self;
}

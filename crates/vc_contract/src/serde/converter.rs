use alloc::boxed::Box;
use alloc::string::{String, ToString};
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::{Any, TypeId};
use core::cell::RefCell;
use std::sync::OnceLock;

use serde_json::{Map, Value};

use super::info_stack::StackGuard;
use super::{ContractObject, ConvertError, Position};
use crate::contract::ContractRegistry;
use crate::info::{TypeInfo, Typed};
use crate::registry::{
    TypeRegistry, TypeRegistryArc, TypeTraitCast, TypeTraitDeserialize, TypeTraitUpcast, UpcastFn,
};

std::thread_local! {
    static SCOPED: RefCell<Vec<Arc<ContractConverter>>> = const { RefCell::new(Vec::new()) };
}

/// Returns a short description of a JSON value kind for error messages.
pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// -----------------------------------------------------------------------------
// ContractConverter

/// Writes and reads contract values with their discriminator.
///
/// Dispatch and binding are separate steps. The converter decides the
/// concrete type (from the runtime type on write, from the discriminator on
/// read), and then hands the remaining fields to that type's own serde
/// implementation. Binding never comes back to the converter for the same
/// value, so no reentrancy guard is involved; nested contract values go
/// through the converter again as independent values.
///
/// The intermediate form is a [`serde_json::Value`] object. The discriminator
/// is always its first field on write and may be anywhere on read.
///
/// # Choosing a converter
///
/// The `Serialize`/`Deserialize` implementations generated by
/// `#[contract_trait]` use [`ContractConverter::current`]: the innermost
/// [`scope`](ContractConverter::scope) on the current thread, or else the
/// [`global`](ContractConverter::global) converter, which sees every
/// auto-registered type.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use vc_contract::derive::{Contract, contract_trait};
/// use vc_contract::registry::{TypeRegistry, TypeRegistryArc};
/// use vc_contract::serde::ContractConverter;
/// use serde::{Deserialize, Serialize};
///
/// #[contract_trait(name = "Type")]
/// trait Shape {}
///
/// #[derive(Contract, Serialize, Deserialize)]
/// #[contract(value = "circle", implements(dyn Shape))]
/// struct Circle {
///     radius: f64,
/// }
///
/// impl Shape for Circle {}
///
/// let mut types = TypeRegistry::new();
/// types.register::<Circle>();
/// let converter = Arc::new(ContractConverter::with_types(types.into()));
///
/// let shapes: Vec<Box<dyn Shape>> = vec![Box::new(Circle { radius: 1.5 })];
/// let json = converter.scope(|| serde_json::to_string(&shapes)).unwrap();
/// assert_eq!(json, r#"[{"Type":"circle","radius":1.5}]"#);
///
/// let back: Vec<Box<dyn Shape>> = converter.scope(|| serde_json::from_str(&json)).unwrap();
/// assert_eq!(back.len(), 1);
/// ```
pub struct ContractConverter {
    contracts: Arc<ContractRegistry>,
    types: TypeRegistryArc,
}

impl ContractConverter {
    /// Creates a converter from a contract registry and the type registry
    /// holding the capabilities of the member types.
    pub fn new(contracts: Arc<ContractRegistry>, types: TypeRegistryArc) -> Self {
        Self { contracts, types }
    }

    /// Creates a converter whose hierarchies are drawn from `types`.
    pub fn with_types(types: TypeRegistryArc) -> Self {
        let contracts = Arc::new(ContractRegistry::with_related_types(types.clone()));
        Self::new(contracts, types)
    }

    /// The process-wide converter over [`ContractRegistry::global`] and
    /// [`TypeRegistryArc::global`].
    pub fn global() -> &'static Arc<ContractConverter> {
        static GLOBAL: OnceLock<Arc<ContractConverter>> = OnceLock::new();
        GLOBAL.get_or_init(|| {
            Arc::new(ContractConverter::new(
                ContractRegistry::global().clone(),
                TypeRegistryArc::global().clone(),
            ))
        })
    }

    /// Returns the contract registry.
    #[inline]
    pub fn contracts(&self) -> &Arc<ContractRegistry> {
        &self.contracts
    }

    /// Returns the type registry.
    #[inline]
    pub fn types(&self) -> &TypeRegistryArc {
        &self.types
    }

    /// Runs `f` with this converter as the [current](Self::current) one on
    /// this thread. Scopes nest.
    pub fn scope<R>(self: &Arc<Self>, f: impl FnOnce() -> R) -> R {
        struct Guard;

        impl Drop for Guard {
            fn drop(&mut self) {
                SCOPED.with_borrow_mut(|stack| {
                    stack.pop();
                });
            }
        }

        SCOPED.with_borrow_mut(|stack| stack.push(Arc::clone(self)));
        let _guard = Guard;
        f()
    }

    /// Calls `f` with the innermost scoped converter, or the global one.
    pub fn current<R>(f: impl FnOnce(&ContractConverter) -> R) -> R {
        match SCOPED.with_borrow(|stack| stack.last().cloned()) {
            Some(converter) => f(&converter),
            None => f(Self::global()),
        }
    }

    /// Writes `value`, or `null` for `None`.
    pub fn write(&self, value: Option<&dyn ContractObject>) -> Result<Value, ConvertError> {
        match value {
            Some(value) => self.to_value(value),
            None => Ok(Value::Null),
        }
    }

    /// Writes `value` as an object whose first field is its discriminator.
    ///
    /// The runtime type of `value` must be a member of a hierarchy. A field
    /// of the body with the discriminator's name is dropped.
    pub fn to_value(&self, value: &dyn ContractObject) -> Result<Value, ConvertError> {
        let info = value.contract_type_info();
        let hierarchy = self.contracts.hierarchy_info(info)?;
        let discriminator_value = hierarchy.discriminator_value(info)?;

        let body = {
            let _guard = StackGuard::push(info);
            serde_json::to_value(value as &dyn erased_serde::Serialize).map_err(|source| {
                ConvertError::Serialize {
                    type_name: info.type_name(),
                    source,
                }
            })?
        };

        let fields = match body {
            Value::Object(fields) => fields,
            other => {
                return Err(ConvertError::NotAnObject {
                    declared_type: info.type_name(),
                    found: value_kind(&other),
                    position: None,
                });
            }
        };

        let name = hierarchy.discriminator_name();
        let mut out = Map::with_capacity(fields.len() + 1);
        out.insert(name.to_string(), Value::String(discriminator_value.to_string()));
        for (key, field) in fields {
            if key == name {
                log::warn!(
                    "field `{key}` of `{}` is shadowed by the discriminator and not written",
                    info.type_path(),
                );
                continue;
            }
            out.insert(key, field);
        }

        Ok(Value::Object(out))
    }

    /// Reads a value declared as `T`, or `None` for `null`.
    ///
    /// The discriminator field selects the concrete type and is removed
    /// before the remaining fields are bound by that type's own
    /// `Deserialize` implementation. `position` is attached to data errors.
    pub fn from_value<T: Typed + ?Sized>(
        &self,
        value: Value,
        position: Option<Position>,
    ) -> Result<Option<Box<T>>, ConvertError> {
        let declared = T::type_info();

        let mut fields = match value {
            Value::Null => return Ok(None),
            Value::Object(fields) => fields,
            other => {
                return Err(ConvertError::NotAnObject {
                    declared_type: declared.type_name(),
                    found: value_kind(&other),
                    position,
                });
            }
        };

        let hierarchy = self.contracts.hierarchy_info(declared)?;
        let discriminator_name = hierarchy.discriminator_name();

        let discriminator_value: String = match fields.shift_remove(discriminator_name) {
            Some(Value::String(s)) if !s.trim().is_empty() => s,
            None | Some(Value::Null) | Some(Value::String(_)) => {
                return Err(ConvertError::MissingDiscriminator {
                    declared_type: declared.type_name(),
                    discriminator_name,
                    position,
                });
            }
            Some(other) => {
                return Err(ConvertError::InvalidDiscriminator {
                    declared_type: declared.type_name(),
                    root: hierarchy.root().type_name(),
                    discriminator_name,
                    discriminator_value: other.to_string(),
                    position,
                });
            }
        };

        let Ok(target) = hierarchy.resolve_type(&discriminator_value) else {
            return Err(ConvertError::InvalidDiscriminator {
                declared_type: declared.type_name(),
                root: hierarchy.root().type_name(),
                discriminator_name,
                discriminator_value,
                position,
            });
        };
        if !declared.is_assignable_from(target) {
            return Err(ConvertError::NotCastable {
                target_type: target.type_name(),
                declared_type: declared.type_name(),
            });
        }

        let not_castable = || ConvertError::NotCastable {
            target_type: target.type_name(),
            declared_type: declared.type_name(),
        };

        let (deserialize, cast) = {
            let types = self.types.read();
            let meta = types
                .get(target.type_id())
                .ok_or(ConvertError::Unregistered {
                    target_type: target.type_name(),
                })?;
            let deserialize = meta.get_trait::<TypeTraitDeserialize>().cloned().ok_or(
                ConvertError::MissingTypeTrait {
                    target_type: target.type_name(),
                    type_trait: "TypeTraitDeserialize",
                },
            )?;
            let cast = match meta.get_trait::<TypeTraitCast<T>>() {
                Some(cast) => Cast::Direct(*cast),
                None => {
                    let mut steps = Vec::new();
                    if !upcast_path(&types, target.type_id(), declared, &mut steps) {
                        return Err(not_castable());
                    }
                    Cast::Upcast(steps)
                }
            };
            (deserialize, cast)
        };

        let bound = {
            let _guard = StackGuard::push(target);
            deserialize.deserialize(Value::Object(fields))
        };
        let bound = bound.map_err(|source| ConvertError::Payload {
            target_type: target.type_name(),
            discriminator_name,
            discriminator_value,
            position,
            source,
        })?;

        cast.apply(bound).map(Some).ok_or_else(not_castable)
    }
}

/// How a bound value becomes a `Box<T>`.
enum Cast<T: ?Sized> {
    Direct(TypeTraitCast<T>),
    /// Steps through implemented and extended interfaces, ending in `Box<Box<T>>`.
    Upcast(Vec<UpcastFn>),
}

impl<T: ?Sized + 'static> Cast<T> {
    fn apply(self, value: Box<dyn Any>) -> Option<Box<T>> {
        match self {
            Cast::Direct(cast) => cast.cast(value).ok(),
            Cast::Upcast(steps) => {
                let mut value = value;
                for step in steps {
                    value = step(value).ok()?;
                }
                value.downcast::<Box<T>>().ok().map(|value| *value)
            }
        }
    }
}

/// Finds the interface steps from the type with `from` to `declared`.
///
/// Only interfaces assignable to `declared` are followed; extension chains
/// are acyclic, so the walk ends.
fn upcast_path(
    types: &TypeRegistry,
    from: TypeId,
    declared: &'static TypeInfo,
    steps: &mut Vec<UpcastFn>,
) -> bool {
    let Some(upcast) = types.get_type_trait::<TypeTraitUpcast>(from) else {
        return false;
    };
    for interface in upcast.interfaces() {
        let Some(info) = types.get_type_info(interface) else {
            continue;
        };
        if !declared.is_assignable_from(info) {
            continue;
        }
        let Some(step) = upcast.get(interface) else {
            continue;
        };
        steps.push(step);
        if interface == declared.type_id() || upcast_path(types, interface, declared, steps) {
            return true;
        }
        steps.pop();
    }
    false
}

impl core::fmt::Debug for ContractConverter {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ContractConverter")
            .field("contracts", &self.contracts)
            .field("types", &self.types)
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::sync::Arc;
    use core::any::Any;
    use std::collections::BTreeMap;

    use serde::{Deserialize, Deserializer, Serialize};
    use serde_json::{Value, json};

    use crate::contract::ContractError;
    use crate::derive::{Contract, Typed, contract_trait};
    use crate::registry::TypeRegistry;
    use crate::serde::{ContractConverter, ConvertError};

    #[contract_trait(name = "Type")]
    trait Base: core::fmt::Debug {}

    fn reject_invalid<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        let value = String::deserialize(deserializer)?;
        if value == "INVALID" {
            return Err(serde::de::Error::custom("value out of range"));
        }
        Ok(value)
    }

    #[derive(Contract, Serialize, Deserialize, Debug, PartialEq)]
    #[contract(implements(dyn Base))]
    #[serde(rename_all = "PascalCase")]
    struct Subtype1 {
        #[serde(deserialize_with = "reject_invalid")]
        value: String,
        #[serde(default)]
        int_value: i32,
        #[serde(flatten)]
        extra: BTreeMap<String, Value>,
    }

    #[derive(Contract, Serialize, Deserialize, Debug, PartialEq)]
    #[contract(base = Subtype1, implements(dyn Base))]
    #[serde(rename_all = "PascalCase")]
    struct Subtype12 {
        value: String,
    }

    #[derive(Typed, Serialize, Deserialize, Debug)]
    #[contract(implements(dyn Base))]
    struct Subtype2;

    #[derive(Contract, Serialize, Deserialize, Debug)]
    #[contract(value = "ST-2-1", base = Subtype2, implements(dyn Base))]
    #[serde(rename_all = "PascalCase")]
    struct Subtype21 {
        value1: String,
        #[serde(default)]
        children: Vec<Box<dyn Base>>,
    }

    #[derive(Contract, Serialize, Deserialize, Debug)]
    #[contract(value = "shadow", implements(dyn Base))]
    struct Shadow {
        #[serde(rename = "Type")]
        kind: u8,
        id: u8,
    }

    #[contract_trait(extends(dyn Base))]
    trait Extended {
        fn id(&self) -> u8;
    }

    #[derive(Contract, Serialize, Deserialize, Debug, PartialEq)]
    #[contract(value = "extended", implements(dyn Extended))]
    struct ExtendedMember {
        id: u8,
    }

    impl Extended for ExtendedMember {
        fn id(&self) -> u8 {
            self.id
        }
    }

    impl Base for ExtendedMember {}
    impl Base for Subtype1 {}
    impl Base for Subtype12 {}
    impl Base for Subtype2 {}
    impl Base for Subtype21 {}
    impl Base for Shadow {}

    #[derive(Serialize, Deserialize, Debug)]
    #[serde(rename_all = "PascalCase")]
    struct Container {
        value: Box<dyn Base>,
    }

    #[derive(Debug, Typed, Serialize)]
    struct Plain {
        id: u8,
    }

    fn converter() -> Arc<ContractConverter> {
        let mut types = TypeRegistry::new();
        types.register::<Subtype1>();
        types.register::<Subtype12>();
        types.register::<Subtype21>();
        types.register::<Shadow>();
        types.register::<ExtendedMember>();
        Arc::new(ContractConverter::with_types(types.into()))
    }

    fn downcast<T: 'static>(value: &dyn Base) -> &T {
        (value as &dyn Any).downcast_ref::<T>().unwrap()
    }

    fn subtype1(value: &str) -> Subtype1 {
        Subtype1 {
            value: value.into(),
            int_value: 0,
            extra: BTreeMap::new(),
        }
    }

    #[test]
    fn discriminator_is_the_first_field() {
        let conv = converter();
        let value = Subtype21 {
            value1: "TEST".into(),
            children: Vec::new(),
        };

        let json = conv.to_value(&value).unwrap();
        let fields = json.as_object().unwrap();
        assert_eq!(fields.iter().next(), Some((&"Type".to_string(), &json!("ST-2-1"))));
        assert_eq!(fields["Value1"], "TEST");
    }

    #[test]
    fn container_round_trip() {
        let conv = converter();
        let orig = Container {
            value: Box::new(Subtype21 {
                value1: "TEST".into(),
                children: vec![Box::new(subtype1("a")), Box::new(Subtype12 { value: "b".into() })],
            }),
        };

        let json = conv.scope(|| serde_json::to_string(&orig)).unwrap();
        assert!(json.starts_with(r#"{"Value":{"Type":"ST-2-1","Value1":"TEST""#));
        assert!(json.contains(r#"{"Type":"Subtype12","Value":"b"}"#));

        let back: Container = conv.scope(|| serde_json::from_str(&json)).unwrap();
        let root = downcast::<Subtype21>(back.value.as_ref());
        assert_eq!(root.value1, "TEST");
        assert_eq!(downcast::<Subtype1>(root.children[0].as_ref()), &subtype1("a"));
        assert_eq!(downcast::<Subtype12>(root.children[1].as_ref()).value, "b");
    }

    #[test]
    fn ron_round_trip() {
        let conv = converter();
        let orig = Container {
            value: Box::new(subtype1("ron")),
        };

        let text = conv.scope(|| ron::to_string(&orig)).unwrap();
        let back: Container = conv.scope(|| ron::from_str(&text)).unwrap();

        assert_eq!(downcast::<Subtype1>(back.value.as_ref()), &subtype1("ron"));
    }

    #[test]
    fn discriminator_is_removed_before_binding() {
        let value = converter()
            .from_value::<dyn Base>(json!({ "Value": "x", "Type": "Subtype1" }), None)
            .unwrap()
            .unwrap();

        assert!(downcast::<Subtype1>(value.as_ref()).extra.is_empty());
    }

    #[test]
    fn missing_discriminator() {
        let conv = converter();

        let err = conv
            .from_value::<dyn Base>(json!({ "Value": "1" }), None)
            .unwrap_err();
        assert!(matches!(
            err,
            ConvertError::MissingDiscriminator {
                discriminator_name: "Type",
                declared_type: "dyn Base",
                ..
            }
        ));

        let err = conv
            .scope(|| serde_json::from_str::<Box<dyn Base>>("\n{ \"Value\": \"1\" }"))
            .unwrap_err();
        assert!(err.to_string().contains("missing discriminator property `Type`"));
    }

    #[test]
    fn invalid_discriminator() {
        let conv = converter();

        let err = conv
            .scope(|| serde_json::from_str::<Box<dyn Base>>("\n\n{ \"Type\": \"<INVALID>\" }"))
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("discriminator") && message.contains("<INVALID>"));
        assert!(message.contains("dyn Base"));

        let err = conv
            .from_value::<dyn Base>(json!({ "Type": 42 }), None)
            .unwrap_err();
        assert_eq!(err.discriminator_value(), Some("42"));
    }

    #[test]
    fn payload_errors_carry_discriminator_context() {
        let err = converter()
            .from_value::<dyn Base>(json!({ "Type": "Subtype1", "Value": "INVALID" }), None)
            .unwrap_err();

        assert_eq!(err.discriminator_name(), Some("Type"));
        assert_eq!(err.discriminator_value(), Some("Subtype1"));
        assert_eq!(err.target_type(), Some("Subtype1"));
        match err {
            ConvertError::Payload { source, .. } => {
                assert!(source.to_string().contains("value out of range"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn nested_payload_errors_have_positions() {
        let json = "{\"Value\":\n{ \"Type\": \"Subtype1\", \"IntValue\": \"INVALID\" }}";
        let err = converter()
            .scope(|| serde_json::from_str::<Container>(json))
            .unwrap_err();

        let message = err.to_string();
        assert!(message.contains("`Subtype1`") && message.contains("invalid type"));
        assert_eq!(err.line(), 2);
    }

    #[test]
    fn reading_as_a_narrower_type() {
        let conv = converter();

        let value = conv
            .from_value::<Subtype1>(json!({ "Type": "Subtype1", "Value": "x" }), None)
            .unwrap()
            .unwrap();
        assert_eq!(*value, subtype1("x"));

        let err = conv
            .from_value::<Subtype1>(json!({ "Type": "ST-2-1", "Value1": "x" }), None)
            .unwrap_err();
        assert!(matches!(
            err,
            ConvertError::NotCastable {
                target_type: "Subtype21",
                declared_type: "Subtype1",
            }
        ));
    }

    #[test]
    fn null_and_non_objects() {
        let conv = converter();

        assert_eq!(conv.write(None).unwrap(), Value::Null);
        assert!(conv.from_value::<dyn Base>(Value::Null, None).unwrap().is_none());
        assert!(matches!(
            conv.from_value::<dyn Base>(json!([1, 2]), None),
            Err(ConvertError::NotAnObject { found: "an array", .. })
        ));
    }

    #[test]
    fn body_field_named_like_the_discriminator_is_dropped() {
        let json = converter().to_value(&Shadow { kind: 9, id: 1 }).unwrap();
        assert_eq!(json, json!({ "Type": "shadow", "id": 1 }));
    }

    #[test]
    fn non_polymorphic_values_are_rejected() {
        let err = converter().to_value(&Plain { id: 1 }).unwrap_err();
        assert!(matches!(
            err,
            ConvertError::Contract(ContractError::NotAContractType { type_name: "Plain" })
        ));
    }

    #[test]
    fn unregistered_member_types() {
        let mut types = TypeRegistry::new();
        types.register::<Subtype1>();
        let conv = ContractConverter::with_types(types.into());

        let err = conv.to_value(&Subtype12 { value: "x".into() }).unwrap_err();
        assert!(matches!(
            err,
            ConvertError::Contract(ContractError::NotRegistered { type_name: "Subtype12", .. })
        ));
    }

    #[test]
    fn members_joining_through_an_extended_trait() {
        let conv = converter();
        let orig: Box<dyn Base> = Box::new(ExtendedMember { id: 7 });

        let json = conv.scope(|| serde_json::to_string(&orig)).unwrap();
        assert_eq!(json, r#"{"Type":"extended","id":7}"#);

        let back: Box<dyn Base> = conv.scope(|| serde_json::from_str(&json)).unwrap();
        assert_eq!(downcast::<ExtendedMember>(back.as_ref()), &ExtendedMember { id: 7 });

        let back = conv
            .from_value::<dyn Base>(json!({ "id": 8, "Type": "extended" }), None)
            .unwrap()
            .unwrap();
        assert_eq!(downcast::<ExtendedMember>(back.as_ref()).id(), 8);
    }

    #[test]
    fn reading_a_non_polymorphic_type_is_rejected() {
        let err = converter()
            .from_value::<Plain>(json!({ "Type": "Subtype1", "id": 1 }), None)
            .unwrap_err();
        assert!(matches!(
            err,
            ConvertError::Contract(ContractError::NotAContractType { type_name: "Plain" })
        ));
    }
}

use alloc::borrow::ToOwned;
use alloc::boxed::Box;
use alloc::format;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;

use serde_json::{Map, Value, json};

use crate::contract::{ContractError, ContractRegistry, Member};
use crate::info::{TypeInfo, TypeKind};
use crate::serde::value_kind;

/// The reference prefix of OpenAPI 3 component schemas.
pub const DEFAULT_REF_PREFIX: &str = "#/components/schemas/";

type MemberFilter = Box<dyn Fn(&Member) -> bool + Send + Sync>;

// -----------------------------------------------------------------------------
// SchemaProcessor

/// Adds discriminator information to generated component schemas.
///
/// Components are keyed by type name; trait objects drop the `dyn ` prefix,
/// so `dyn Shape` is described by the component `Shape`. Member schemas
/// missing from the map are created as plain object schemas.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use serde::{Deserialize, Serialize};
/// use serde_json::json;
/// use vc_contract::contract::ContractRegistry;
/// use vc_contract::derive::{Contract, contract_trait};
/// use vc_contract::info::Typed;
/// use vc_contract::schema::SchemaProcessor;
///
/// #[contract_trait(name = "kind")]
/// trait Shape {}
///
/// #[derive(Contract, Serialize, Deserialize)]
/// #[contract(value = "circle", implements(dyn Shape))]
/// struct Circle { radius: f64 }
///
/// impl Shape for Circle {}
///
/// let contracts = ContractRegistry::with_related_types(vec![
///     <dyn Shape>::type_info(),
///     Circle::type_info(),
/// ]);
/// let processor = SchemaProcessor::new(Arc::new(contracts));
///
/// let mut components = json!({
///     "Shape": { "type": "object" },
///     "Circle": { "type": "object", "properties": { "radius": { "type": "number" } } },
/// });
/// let components = components.as_object_mut().unwrap();
///
/// assert!(processor.process(<dyn Shape>::type_info(), components).unwrap());
/// assert_eq!(
///     components["Shape"]["discriminator"],
///     json!({
///         "propertyName": "kind",
///         "mapping": { "circle": "#/components/schemas/Circle" },
///     }),
/// );
/// assert_eq!(
///     components["Circle"]["allOf"],
///     json!([{ "$ref": "#/components/schemas/Shape" }]),
/// );
/// ```
pub struct SchemaProcessor {
    contracts: Arc<ContractRegistry>,
    ref_prefix: String,
    derived_type_filter: Option<MemberFilter>,
}

impl SchemaProcessor {
    /// Creates a processor resolving hierarchies through `contracts`.
    pub fn new(contracts: Arc<ContractRegistry>) -> Self {
        Self {
            contracts,
            ref_prefix: DEFAULT_REF_PREFIX.to_owned(),
            derived_type_filter: None,
        }
    }

    /// Replaces the prefix of generated `$ref`s, [`DEFAULT_REF_PREFIX`] by default.
    pub fn with_ref_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.ref_prefix = prefix.into();
        self
    }

    /// Only members accepted by `filter` are mapped and linked to their root.
    pub fn with_derived_type_filter(
        mut self,
        filter: impl Fn(&Member) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.derived_type_filter = Some(Box::new(filter));
        self
    }

    /// Returns the `$ref` string of the component named `name`.
    pub fn reference(&self, name: &str) -> String {
        format!("{}{name}", self.ref_prefix)
    }

    /// Describes the hierarchy rooted at `info`.
    ///
    /// The root schema gains the `discriminator` object and a required string
    /// property named after the discriminator. Every other member schema
    /// gains the root as `allOf` base. Repeated calls leave the components
    /// unchanged.
    ///
    /// Returns `Ok(false)` without touching `components` when `info` is not
    /// the root of a hierarchy.
    pub fn process(
        &self,
        info: &'static TypeInfo,
        components: &mut Map<String, Value>,
    ) -> Result<bool, ContractError> {
        let Some(hierarchy) = self.contracts.is_polymorphic(info)? else {
            return Ok(false);
        };
        if hierarchy.root().type_id() != info.type_id() {
            return Ok(false);
        }

        let root_name = schema_name(info);
        let root_ref = self.reference(root_name);
        let mut mapping = Map::new();

        for member in hierarchy.members() {
            if self.derived_type_filter.as_ref().is_some_and(|accept| !accept(member)) {
                continue;
            }

            let name = schema_name(member.info());
            if member.info().type_id() != info.type_id()
                && let Some(schema) = component(components, name)
            {
                push_all_of(schema, &root_ref);
            }
            mapping.insert(
                member.discriminator_value().to_owned(),
                Value::String(self.reference(name)),
            );
        }

        let discriminator_name = hierarchy.discriminator_name();
        let Some(root) = component(components, root_name) else {
            return Ok(true);
        };

        root.insert(
            "discriminator".to_owned(),
            json!({ "propertyName": discriminator_name, "mapping": mapping }),
        );
        if let Some(properties) = root
            .entry("properties")
            .or_insert_with(|| Value::Object(Map::new()))
            .as_object_mut()
        {
            properties.insert(discriminator_name.to_owned(), json!({ "type": "string" }));
        }
        if let Some(required) = root
            .entry("required")
            .or_insert_with(|| Value::Array(Vec::new()))
            .as_array_mut()
            && !required.iter().any(|name| name == discriminator_name)
        {
            required.push(Value::String(discriminator_name.to_owned()));
        }

        Ok(true)
    }

    /// Makes the single contract interface of `info` the `allOf` base of its
    /// schema.
    ///
    /// Applies when the schema of `info` has no `allOf` yet and `info`
    /// implements exactly one contract interface, or exactly one that no
    /// other of its contract interfaces extends. Properties the interface
    /// schema (and its own `allOf` bases) already describe are removed from
    /// `properties` and `required`.
    ///
    /// Returns `true` if the schema was changed.
    pub fn inherit_contract_interface(
        &self,
        info: &'static TypeInfo,
        components: &mut Map<String, Value>,
    ) -> bool {
        let Some(interface) = unique_contract_interface(info) else {
            return false;
        };

        let name = schema_name(info);
        let has_bases = components
            .get(name)
            .and_then(|schema| schema.get("allOf"))
            .and_then(Value::as_array)
            .is_some_and(|bases| !bases.is_empty());
        if has_bases {
            return false;
        }

        let base_name = schema_name(interface);
        let mut inherited = Vec::new();
        self.collect_properties(base_name, components, &mut Vec::new(), &mut inherited);

        let Some(schema) = components.get_mut(name).and_then(Value::as_object_mut) else {
            return false;
        };

        schema.insert(
            "allOf".to_owned(),
            json!([{ "$ref": self.reference(base_name) }]),
        );
        if let Some(properties) = schema.get_mut("properties").and_then(Value::as_object_mut) {
            for property in &inherited {
                properties.shift_remove(property);
            }
        }
        if let Some(required) = schema.get_mut("required").and_then(Value::as_array_mut) {
            required.retain(|name| {
                name.as_str()
                    .is_none_or(|name| !inherited.iter().any(|property| property == name))
            });
        }

        true
    }

    fn collect_properties(
        &self,
        name: &str,
        components: &Map<String, Value>,
        visited: &mut Vec<String>,
        out: &mut Vec<String>,
    ) {
        if visited.iter().any(|seen| seen == name) {
            return;
        }
        visited.push(name.to_owned());

        if let Some(schema) = components.get(name).and_then(Value::as_object) {
            self.collect_schema_properties(schema, components, visited, out);
        }
    }

    fn collect_schema_properties(
        &self,
        schema: &Map<String, Value>,
        components: &Map<String, Value>,
        visited: &mut Vec<String>,
        out: &mut Vec<String>,
    ) {
        if let Some(properties) = schema.get("properties").and_then(Value::as_object) {
            out.extend(properties.keys().cloned());
        }

        let bases = schema.get("allOf").and_then(Value::as_array);
        for base in bases.into_iter().flatten().filter_map(Value::as_object) {
            let target = base
                .get("$ref")
                .and_then(Value::as_str)
                .and_then(|target| target.strip_prefix(self.ref_prefix.as_str()));
            match target {
                Some(name) => self.collect_properties(name, components, visited, out),
                None => self.collect_schema_properties(base, components, visited, out),
            }
        }
    }
}

impl Default for SchemaProcessor {
    /// A processor over [`ContractRegistry::global`].
    fn default() -> Self {
        Self::new(ContractRegistry::global().clone())
    }
}

impl core::fmt::Debug for SchemaProcessor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SchemaProcessor")
            .field("contracts", &self.contracts)
            .field("ref_prefix", &self.ref_prefix)
            .field("derived_type_filter", &self.derived_type_filter.is_some())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Helpers

fn schema_name(info: &TypeInfo) -> &'static str {
    let name = info.type_name();
    name.strip_prefix("dyn ").unwrap_or(name)
}

/// Returns the component `name`, creating an object schema if it is missing.
fn component<'a>(
    components: &'a mut Map<String, Value>,
    name: &str,
) -> Option<&'a mut Map<String, Value>> {
    match components
        .entry(name)
        .or_insert_with(|| json!({ "type": "object" }))
    {
        Value::Object(schema) => Some(schema),
        other => {
            log::warn!(
                "component schema `{name}` is a {}, not an object; left unchanged",
                value_kind(other)
            );
            None
        }
    }
}

fn push_all_of(schema: &mut Map<String, Value>, reference: &str) {
    let Some(bases) = schema
        .entry("allOf")
        .or_insert_with(|| Value::Array(Vec::new()))
        .as_array_mut()
    else {
        return;
    };

    let present = bases
        .iter()
        .any(|base| base.get("$ref").and_then(Value::as_str) == Some(reference));
    if !present {
        bases.push(json!({ "$ref": reference }));
    }
}

fn unique_contract_interface(info: &'static TypeInfo) -> Option<&'static TypeInfo> {
    let interfaces: Vec<&'static TypeInfo> = info
        .ancestors()
        .into_iter()
        .skip(1)
        .filter(|ancestor| ancestor.kind() == TypeKind::Interface && ancestor.contract().is_some())
        .collect();

    if let &[single] = interfaces.as_slice() {
        return Some(single);
    }

    // Drop interfaces that another contract interface of `info` already extends.
    let immediate: Vec<&'static TypeInfo> = interfaces
        .iter()
        .copied()
        .filter(|candidate| {
            !interfaces.iter().any(|other| {
                other.type_id() != candidate.type_id() && candidate.is_assignable_from(*other)
            })
        })
        .collect();

    match immediate.as_slice() {
        &[single] => Some(single),
        _ => None,
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::sync::Arc;
    use alloc::vec;

    use serde::{Deserialize, Serialize};
    use serde_json::{Map, Value, json};

    use super::SchemaProcessor;
    use crate::contract::ContractRegistry;
    use crate::derive::{Contract, Typed, contract_trait};
    use crate::info::Typed as _;

    #[contract_trait(name = "kind")]
    trait Shape {}

    #[contract_trait(name = "tag")]
    trait Named {}

    #[contract_trait]
    trait Labelled {}

    #[derive(Contract, Serialize, Deserialize)]
    #[contract(value = "circle", implements(dyn Shape))]
    struct Circle {
        area: f64,
        radius: f64,
    }

    #[derive(Contract, Serialize, Deserialize)]
    #[contract(implements(dyn Shape))]
    struct Square {
        area: f64,
        side: f64,
    }

    #[derive(Typed, Serialize)]
    #[contract(implements(dyn Shape, dyn Labelled))]
    struct Triangle {
        area: f64,
    }

    #[derive(Typed, Serialize)]
    #[contract(implements(dyn Shape, dyn Named))]
    struct Badge {
        area: f64,
    }

    #[derive(Contract, Serialize, Deserialize)]
    struct Plain;

    impl Shape for Circle {}
    impl Shape for Square {}
    impl Shape for Triangle {}
    impl Labelled for Triangle {}
    impl Shape for Badge {}
    impl Named for Badge {}

    fn processor() -> SchemaProcessor {
        SchemaProcessor::new(Arc::new(ContractRegistry::with_related_types(vec![
            <dyn Shape>::type_info(),
            Circle::type_info(),
            Square::type_info(),
            Plain::type_info(),
        ])))
    }

    fn components() -> Map<String, Value> {
        let value = json!({
            "Shape": {
                "type": "object",
                "properties": { "area": { "type": "number" } },
                "required": ["area"],
            },
            "Circle": {
                "type": "object",
                "properties": {
                    "area": { "type": "number" },
                    "radius": { "type": "number" },
                },
                "required": ["area", "radius"],
            },
        });
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn root_gains_discriminator() {
        let mut components = components();
        assert!(processor().process(<dyn Shape>::type_info(), &mut components).unwrap());

        let shape = &components["Shape"];
        assert_eq!(
            shape["discriminator"],
            json!({
                "propertyName": "kind",
                "mapping": {
                    "circle": "#/components/schemas/Circle",
                    "Square": "#/components/schemas/Square",
                },
            })
        );
        assert_eq!(shape["properties"]["kind"], json!({ "type": "string" }));
        assert_eq!(shape["required"], json!(["area", "kind"]));
    }

    #[test]
    fn members_extend_root() {
        let mut components = components();
        processor().process(<dyn Shape>::type_info(), &mut components).unwrap();

        let base = json!([{ "$ref": "#/components/schemas/Shape" }]);
        assert_eq!(components["Circle"]["allOf"], base);
        // Missing member schemas are created.
        assert_eq!(components["Square"]["type"], "object");
        assert_eq!(components["Square"]["allOf"], base);
    }

    #[test]
    fn repeated_processing_is_stable() {
        let processor = processor();
        let mut components = components();
        processor.process(<dyn Shape>::type_info(), &mut components).unwrap();
        let once = components.clone();
        processor.process(<dyn Shape>::type_info(), &mut components).unwrap();

        assert_eq!(components, once);
    }

    #[test]
    fn only_roots_are_processed() {
        let processor = processor();
        let mut components = components();
        let before = components.clone();

        assert!(!processor.process(Circle::type_info(), &mut components).unwrap());
        assert!(!processor.process(Plain::type_info(), &mut components).unwrap());
        assert_eq!(components, before);
    }

    #[test]
    fn filtered_members_are_skipped() {
        let processor = processor().with_derived_type_filter(|member| {
            member.discriminator_value() != "Square"
        });
        let mut components = components();
        processor.process(<dyn Shape>::type_info(), &mut components).unwrap();

        assert_eq!(
            components["Shape"]["discriminator"]["mapping"],
            json!({ "circle": "#/components/schemas/Circle" })
        );
        assert!(!components.contains_key("Square"));
    }

    #[test]
    fn custom_ref_prefix() {
        let processor = processor().with_ref_prefix("#/definitions/");
        let mut components = components();
        processor.process(<dyn Shape>::type_info(), &mut components).unwrap();

        assert_eq!(
            components["Shape"]["discriminator"]["mapping"]["circle"],
            "#/definitions/Circle"
        );
        assert_eq!(
            components["Circle"]["allOf"],
            json!([{ "$ref": "#/definitions/Shape" }])
        );
    }

    #[test]
    fn interface_becomes_base() {
        let mut components = components();
        assert!(processor().inherit_contract_interface(Circle::type_info(), &mut components));

        let circle = &components["Circle"];
        assert_eq!(circle["allOf"], json!([{ "$ref": "#/components/schemas/Shape" }]));
        assert_eq!(circle["properties"], json!({ "radius": { "type": "number" } }));
        assert_eq!(circle["required"], json!(["radius"]));
    }

    #[test]
    fn inherited_properties_follow_bases() {
        let mut components = components();
        components.insert(
            "Shape".into(),
            json!({
                "allOf": [
                    { "$ref": "#/components/schemas/Measured" },
                    { "properties": { "radius": { "type": "number" } } },
                ],
            }),
        );
        components.insert(
            "Measured".into(),
            json!({ "properties": { "area": { "type": "number" } } }),
        );

        assert!(processor().inherit_contract_interface(Circle::type_info(), &mut components));
        assert_eq!(components["Circle"]["properties"], json!({}));
        assert_eq!(components["Circle"]["required"], json!([]));
    }

    #[test]
    fn existing_bases_are_kept() {
        let mut components = components();
        let base = json!([{ "$ref": "#/components/schemas/Other" }]);
        components["Circle"]["allOf"] = base.clone();

        assert!(!processor().inherit_contract_interface(Circle::type_info(), &mut components));
        assert_eq!(components["Circle"]["allOf"], base);
    }

    #[test]
    fn plain_interfaces_are_ignored() {
        let mut components = components();
        components.insert(
            "Triangle".into(),
            json!({ "properties": { "area": { "type": "number" } } }),
        );

        assert!(processor().inherit_contract_interface(Triangle::type_info(), &mut components));
        assert_eq!(
            components["Triangle"]["allOf"],
            json!([{ "$ref": "#/components/schemas/Shape" }])
        );
    }

    #[test]
    fn several_contract_interfaces() {
        let mut components = components();
        let badge = json!({ "properties": { "area": { "type": "number" } } });
        components.insert("Badge".into(), badge.clone());

        assert!(!processor().inherit_contract_interface(Badge::type_info(), &mut components));
        assert!(!processor().inherit_contract_interface(Plain::type_info(), &mut components));
        assert_eq!(components["Badge"], badge);
    }
}

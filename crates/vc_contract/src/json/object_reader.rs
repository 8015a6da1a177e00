use alloc::boxed::Box;
use alloc::sync::Arc;
use core::iter::FusedIterator;
use core::marker::PhantomData;
use core::ops::Range;

use serde_json::de::StrRead;
use serde_json::{StreamDeserializer, Value};
use thiserror::Error;

use crate::info::Typed;
use crate::serde::{ContractConverter, ConvertError, Position, value_kind};

// -----------------------------------------------------------------------------
// ReadObject

/// An object read by an [`ObjectReader`].
pub struct ReadObject<'a, T: ?Sized> {
    /// The bound value.
    pub value: Box<T>,
    /// Where the object starts.
    pub position: Position,
    /// The JSON text of the object.
    pub json: &'a str,
}

impl<T: ?Sized> core::fmt::Debug for ReadObject<'_, T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ReadObject")
            .field("position", &self.position)
            .field("json", &self.json)
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// ReadError

/// An error of an [`ObjectReader`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReadError {
    /// One object could not be read. Reading continues with the next one.
    #[error("{source}")]
    Object {
        #[source]
        source: ConvertError,
        position: Position,
        span: Range<usize>,
    },

    /// The document is not valid JSON. Nothing after it can be read.
    #[error("invalid JSON document: {0}")]
    Document(#[source] serde_json::Error),
}

impl ReadError {
    /// Returns `true` for [`ReadError::Document`].
    #[inline]
    pub fn is_document_error(&self) -> bool {
        matches!(self, Self::Document(_))
    }

    /// Returns the 1-based line of the failed object or of the syntax error.
    pub fn line(&self) -> usize {
        match self {
            Self::Object { position, .. } => position.line,
            Self::Document(err) => err.line(),
        }
    }

    /// Returns the 1-based column of the failed object or of the syntax error.
    pub fn column(&self) -> usize {
        match self {
            Self::Object { position, .. } => position.column,
            Self::Document(err) => err.column(),
        }
    }
}

// -----------------------------------------------------------------------------
// ObjectReader

/// Iterates over the JSON objects of a document, read as `T`.
///
/// Objects follow each other, optionally separated by whitespace. Every
/// object is buffered and then read through a [`ContractConverter`], so
/// `T` is usually a `dyn Trait` declared with `#[contract_trait]`.
///
/// - A successfully read object yields `Ok(ReadObject)`.
/// - An object that is valid JSON but cannot be read (missing or unknown
///   discriminator, invalid payload, or a value that is not an object)
///   yields [`ReadError::Object`], and reading goes on.
/// - A syntax error yields [`ReadError::Document`] and ends the iteration.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use vc_contract::derive::{Contract, contract_trait};
/// use vc_contract::json::{ObjectReader, ReadError};
/// use vc_contract::registry::TypeRegistry;
/// use vc_contract::serde::ContractConverter;
/// use serde::{Deserialize, Serialize};
///
/// #[contract_trait(name = "Type")]
/// trait Vehicle {
///     fn speed(&self) -> u32;
/// }
///
/// #[derive(Contract, Serialize, Deserialize)]
/// #[contract(implements(dyn Vehicle))]
/// struct Car {
///     speed: u32,
/// }
///
/// impl Vehicle for Car {
///     fn speed(&self) -> u32 {
///         self.speed
///     }
/// }
///
/// let mut types = TypeRegistry::new();
/// types.register::<Car>();
/// let converter = Arc::new(ContractConverter::with_types(types.into()));
///
/// let json = r#"
///     { "Type": "Car", "speed": 200 }
///     { "Type": "Bike", "speed": 50 }
///     { "Type": "Car", "speed": 120 } <
/// "#;
///
/// let results: Vec<_> = ObjectReader::<dyn Vehicle>::with_converter(json, converter).collect();
///
/// assert_eq!(results.len(), 4);
/// assert_eq!(results[0].as_ref().unwrap().value.speed(), 200);
/// assert!(matches!(results[1], Err(ReadError::Object { .. })));
/// assert_eq!(results[2].as_ref().unwrap().position.line, 4);
/// assert!(results[3].as_ref().unwrap_err().is_document_error());
/// ```
pub struct ObjectReader<'a, T: ?Sized> {
    json: &'a str,
    stream: StreamDeserializer<'a, StrRead<'a>, Value>,
    converter: Arc<ContractConverter>,
    cursor: Position,
    done: bool,
    _marker: PhantomData<fn() -> Box<T>>,
}

impl<'a, T: Typed + ?Sized> ObjectReader<'a, T> {
    /// Reads `json` with the [global](ContractConverter::global) converter.
    pub fn new(json: &'a str) -> Self {
        Self::with_converter(json, Arc::clone(ContractConverter::global()))
    }

    /// Reads `json` with `converter`.
    pub fn with_converter(json: &'a str, converter: Arc<ContractConverter>) -> Self {
        Self {
            json,
            stream: serde_json::Deserializer::from_str(json).into_iter(),
            converter,
            cursor: Position {
                line: 1,
                column: 1,
                offset: 0,
            },
            done: false,
            _marker: PhantomData,
        }
    }

    /// Returns the position of `offset`, moving forward from the last one.
    fn locate(&mut self, offset: usize) -> Position {
        let skipped = self.json.get(self.cursor.offset..offset).unwrap_or_default();
        match skipped.rfind('\n') {
            Some(last) => {
                self.cursor.line += skipped.matches('\n').count();
                self.cursor.column = skipped[last + 1..].chars().count() + 1;
            }
            None => self.cursor.column += skipped.chars().count(),
        }
        self.cursor.offset = offset;
        self.cursor
    }

    fn start_of_next_value(&self) -> usize {
        let consumed = self.stream.byte_offset();
        let rest = self.json.get(consumed..).unwrap_or_default();
        consumed + (rest.len() - rest.trim_start().len())
    }

    fn read(&self, value: Value, position: Position) -> Result<Box<T>, ConvertError> {
        if !value.is_object() {
            return Err(ConvertError::NotAnObject {
                declared_type: T::type_info().type_name(),
                found: value_kind(&value),
                position: Some(position),
            });
        }

        let bound = self
            .converter
            .scope(|| self.converter.from_value::<T>(value, Some(position)))?;
        // `from_value` only returns `None` for `null`.
        bound.ok_or(ConvertError::NotAnObject {
            declared_type: T::type_info().type_name(),
            found: "null",
            position: Some(position),
        })
    }
}

impl<'a, T: Typed + ?Sized> Iterator for ObjectReader<'a, T> {
    type Item = Result<ReadObject<'a, T>, ReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let start = self.start_of_next_value();
        let value = match self.stream.next()? {
            Ok(value) => value,
            Err(err) => {
                self.done = true;
                log::debug!("stopped reading objects: {err}");
                return Some(Err(ReadError::Document(err)));
            }
        };

        let span = start..self.stream.byte_offset();
        let position = self.locate(start);

        Some(match self.read(value, position) {
            Ok(value) => Ok(ReadObject {
                value,
                position,
                json: &self.json[span],
            }),
            Err(source) => Err(ReadError::Object {
                source,
                position,
                span,
            }),
        })
    }
}

impl<'a, T: Typed + ?Sized> FusedIterator for ObjectReader<'a, T> {}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::sync::Arc;
    use core::any::Any;

    use serde::{Deserialize, Deserializer, Serialize};

    use super::{ObjectReader, ReadError};
    use crate::derive::{Contract, contract_trait};
    use crate::registry::TypeRegistry;
    use crate::serde::{ContractConverter, ConvertError};

    #[contract_trait(name = "Type")]
    trait TestObjectBase {}

    fn reject_invalid<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        let value = String::deserialize(deserializer)?;
        if value == "INVALID" {
            return Err(serde::de::Error::custom("'Value' must not be 'INVALID'"));
        }
        Ok(value)
    }

    #[derive(Contract, Serialize, Deserialize, Debug, PartialEq)]
    #[contract(value = "test-object", implements(dyn TestObjectBase))]
    #[serde(rename_all = "PascalCase")]
    struct TestObject {
        #[serde(deserialize_with = "reject_invalid")]
        value: String,
        #[serde(default)]
        count: u32,
    }

    impl TestObjectBase for TestObject {}

    type Results<'a> = Vec<Result<super::ReadObject<'a, dyn TestObjectBase>, ReadError>>;

    fn read(json: &str) -> Results<'_> {
        let mut types = TypeRegistry::new();
        types.register::<TestObject>();
        let converter = Arc::new(ContractConverter::with_types(types.into()));
        ObjectReader::with_converter(json, converter).collect()
    }

    fn value_of<'a>(
        result: &'a Result<super::ReadObject<'_, dyn TestObjectBase>, ReadError>,
    ) -> &'a str {
        let object = result.as_ref().unwrap();
        let object = (object.value.as_ref() as &dyn Any)
            .downcast_ref::<TestObject>()
            .unwrap();
        &object.value
    }

    #[test]
    fn reads_all_objects() {
        let json = "\n    { \"Type\": \"test-object\", \"Value\": \"1\" }\n    { \"Type\": \"test-object\", \"Value\": \"2\" }\n";
        let results = read(json);

        assert_eq!(results.len(), 2);
        assert_eq!(value_of(&results[0]), "1");
        assert_eq!(value_of(&results[1]), "2");

        let second = results[1].as_ref().unwrap();
        assert_eq!((second.position.line, second.position.column), (3, 5));
        assert_eq!(second.json, "{ \"Type\": \"test-object\", \"Value\": \"2\" }");
    }

    #[test]
    fn payload_error_is_an_object_error() {
        let results = read("\n{ \"Type\": \"test-object\", \"Value\": \"INVALID\" }");

        assert_eq!(results.len(), 1);
        let Err(ReadError::Object { source, position, .. }) = &results[0] else {
            panic!("expected an object error");
        };
        assert!(matches!(source, ConvertError::Payload { .. }));
        assert_eq!((position.line, position.column), (2, 1));
        let message = source.to_string();
        assert!(message.contains("`test-object`") && message.contains("must not be 'INVALID'"));
        assert!(message.contains("line 2 column 1"));
    }

    #[test]
    fn invalid_syntax_is_a_document_error() {
        let results = read("invalid test {");

        assert_eq!(results.len(), 1);
        assert!(results[0].as_ref().unwrap_err().is_document_error());
    }

    #[test]
    fn error_between_objects_keeps_earlier_results() {
        let json = "\n  { \"Type\": \"test-object\", \"Value\": \"1\" } <\n  { \"Type\": \"test-object\", \"Value\": \"2\" }";
        let results = read(json);

        assert_eq!(results.len(), 2);
        assert_eq!(value_of(&results[0]), "1");
        let err = results[1].as_ref().unwrap_err();
        assert!(err.is_document_error());
        assert_eq!(err.line(), 2);
    }

    #[test]
    fn syntax_error_inside_an_object_ends_reading() {
        let json = "\n  { \"Type\": \"test-object\", \"Value\": \"1\" }\n  { \"Type\": \"test-object\" \"Value\": \"2\" }";
        let results = read(json);

        assert_eq!(results.len(), 2);
        assert_eq!(value_of(&results[0]), "1");
        let err = results[1].as_ref().unwrap_err();
        assert!(err.is_document_error());
        assert!(err.to_string().contains("line 3"));
    }

    #[test]
    fn unknown_type_is_an_object_error() {
        let json = "\n  { \"Type\": \"test-object\", \"Value\": \"1\" }\n  { \"Type\": \"InvalidObjectType\" }\n  { \"Type\": \"test-object\", \"Value\": \"3\" }";
        let results = read(json);

        assert_eq!(results.len(), 3);
        let err = results[1].as_ref().unwrap_err();
        assert!(!err.is_document_error());
        assert_eq!(err.line(), 3);
        assert!(err.to_string().contains("discriminator property `Type`"));
        assert_eq!(value_of(&results[2]), "3");
    }

    #[test]
    fn wrong_datatype_is_an_object_error() {
        let json = "\n  { \"Type\": \"test-object\", \"Value\": \"1\" }\n  { \"Type\": \"test-object\", \"Value\": \"2\", \"Count\": \"invalid\" }";
        let results = read(json);

        assert_eq!(results.len(), 2);
        let Err(ReadError::Object { source, position, .. }) = &results[1] else {
            panic!("expected an object error");
        };
        assert_eq!(position.line, 3);
        assert!(source.to_string().contains("invalid type"));
    }

    #[test]
    fn non_objects_are_object_errors() {
        let results = read("{ \"Type\": \"test-object\", \"Value\": \"1\" } null 5");

        assert_eq!(results.len(), 3);
        assert!(matches!(
            &results[1],
            Err(ReadError::Object {
                source: ConvertError::NotAnObject { found: "null", .. },
                ..
            })
        ));
        assert!(matches!(
            &results[2],
            Err(ReadError::Object {
                source: ConvertError::NotAnObject { found: "a number", .. },
                ..
            })
        ));
    }
}

use alloc::string::String;
use core::fmt;

use thiserror::Error;

use crate::contract::ContractError;

// -----------------------------------------------------------------------------
// Position

/// A location in a source document.
///
/// `line` and `column` are 1-based, `offset` is the 0-based byte offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

impl Position {
    /// Computes the position of the byte `offset` in `source`.
    ///
    /// Columns count characters, not bytes.
    ///
    /// # Examples
    ///
    /// ```
    /// use vc_contract::serde::Position;
    ///
    /// let pos = Position::locate("{}\n  {}", 5);
    /// assert_eq!((pos.line, pos.column), (2, 3));
    /// ```
    pub fn locate(source: &str, offset: usize) -> Self {
        let offset = offset.min(source.len());
        let before = source.get(..offset).unwrap_or(source);
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        Self {
            line: before.matches('\n').count() + 1,
            column: before[line_start..].chars().count() + 1,
            offset,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {} column {}", self.line, self.column)
    }
}

/// Formats an optional position as a message suffix.
struct At<'a>(&'a Option<Position>);

impl fmt::Display for At<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(position) => write!(f, " at {position}"),
            None => Ok(()),
        }
    }
}

// -----------------------------------------------------------------------------
// ConvertError

/// Errors of the contract converter.
///
/// [`MissingDiscriminator`], [`InvalidDiscriminator`], [`NotAnObject`] and
/// [`Payload`] are data errors of one object. All others point at a
/// configuration or registration problem.
///
/// [`MissingDiscriminator`]: ConvertError::MissingDiscriminator
/// [`InvalidDiscriminator`]: ConvertError::InvalidDiscriminator
/// [`NotAnObject`]: ConvertError::NotAnObject
/// [`Payload`]: ConvertError::Payload
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConvertError {
    #[error(transparent)]
    Contract(#[from] ContractError),

    #[error(
        "missing discriminator property `{discriminator_name}` for `{declared_type}`{}",
        At(.position)
    )]
    MissingDiscriminator {
        declared_type: &'static str,
        discriminator_name: &'static str,
        position: Option<Position>,
    },

    #[error(
        "invalid value `{discriminator_value}` of discriminator property `{discriminator_name}` for `{declared_type}`, \
         it denotes no type of the `{root}` hierarchy{}",
        At(.position)
    )]
    InvalidDiscriminator {
        declared_type: &'static str,
        root: &'static str,
        discriminator_name: &'static str,
        discriminator_value: String,
        position: Option<Position>,
    },

    #[error("expected an object for `{declared_type}`, found {found}{}", At(.position))]
    NotAnObject {
        declared_type: &'static str,
        found: &'static str,
        position: Option<Position>,
    },

    #[error(
        "invalid `{target_type}` ({discriminator_name} = `{discriminator_value}`){}: {source}",
        At(.position)
    )]
    Payload {
        target_type: &'static str,
        discriminator_name: &'static str,
        discriminator_value: String,
        position: Option<Position>,
        #[source]
        source: serde_json::Error,
    },

    #[error("`{target_type}` is not registered in the type registry")]
    Unregistered { target_type: &'static str },

    #[error("`{target_type}` is registered without `{type_trait}`")]
    MissingTypeTrait {
        target_type: &'static str,
        type_trait: &'static str,
    },

    #[error("`{target_type}` cannot be read as `{declared_type}`")]
    NotCastable {
        target_type: &'static str,
        declared_type: &'static str,
    },

    #[error("cannot serialize `{type_name}`: {source}")]
    Serialize {
        type_name: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl ConvertError {
    /// Returns `true` for errors caused by the data of one object.
    ///
    /// A reader of many objects can skip the failed object and continue.
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            Self::MissingDiscriminator { .. }
                | Self::InvalidDiscriminator { .. }
                | Self::NotAnObject { .. }
                | Self::Payload { .. }
        )
    }

    /// Returns the discriminator property name, if known.
    pub fn discriminator_name(&self) -> Option<&'static str> {
        match self {
            Self::MissingDiscriminator {
                discriminator_name, ..
            }
            | Self::InvalidDiscriminator {
                discriminator_name, ..
            }
            | Self::Payload {
                discriminator_name, ..
            } => Some(*discriminator_name),
            _ => None,
        }
    }

    /// Returns the discriminator value read from the document, if any.
    pub fn discriminator_value(&self) -> Option<&str> {
        match self {
            Self::InvalidDiscriminator {
                discriminator_value,
                ..
            }
            | Self::Payload {
                discriminator_value,
                ..
            } => Some(discriminator_value.as_str()),
            _ => None,
        }
    }

    /// Returns the resolved concrete type, if resolution succeeded.
    pub fn target_type(&self) -> Option<&'static str> {
        match self {
            Self::Payload { target_type, .. }
            | Self::Unregistered { target_type }
            | Self::MissingTypeTrait { target_type, .. }
            | Self::NotCastable { target_type, .. } => Some(*target_type),
            _ => None,
        }
    }

    /// Returns the declared type being read, if known.
    pub fn declared_type(&self) -> Option<&'static str> {
        match self {
            Self::MissingDiscriminator { declared_type, .. }
            | Self::InvalidDiscriminator { declared_type, .. }
            | Self::NotAnObject { declared_type, .. }
            | Self::NotCastable { declared_type, .. } => Some(*declared_type),
            _ => None,
        }
    }

    /// Returns the position of the object in its document, if known.
    pub fn position(&self) -> Option<Position> {
        match self {
            Self::MissingDiscriminator { position, .. }
            | Self::InvalidDiscriminator { position, .. }
            | Self::NotAnObject { position, .. }
            | Self::Payload { position, .. } => *position,
            _ => None,
        }
    }

    /// Attaches `position` to a data error that has none.
    pub fn with_position(mut self, at: Position) -> Self {
        match &mut self {
            Self::MissingDiscriminator { position, .. }
            | Self::InvalidDiscriminator { position, .. }
            | Self::NotAnObject { position, .. }
            | Self::Payload { position, .. } => {
                position.get_or_insert(at);
            }
            _ => {}
        }
        self
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{ConvertError, Position};

    #[test]
    fn locate_counts_lines_and_columns() {
        let source = "{\"a\": 1}\n\n  {\"b\": 2}";

        assert_eq!(Position::locate(source, 0), Position { line: 1, column: 1, offset: 0 });
        let second = source.find("{\"b\"").unwrap();
        assert_eq!(Position::locate(source, second), Position { line: 3, column: 3, offset: second });
    }

    #[test]
    fn messages_carry_context() {
        let err = ConvertError::MissingDiscriminator {
            declared_type: "dyn Shape",
            discriminator_name: "Type",
            position: None,
        }
        .with_position(Position { line: 2, column: 5, offset: 12 });

        assert_eq!(err.discriminator_name(), Some("Type"));
        assert_eq!(err.position().map(|p| p.line), Some(2));
        assert_eq!(
            err.to_string(),
            "missing discriminator property `Type` for `dyn Shape` at line 2 column 5"
        );
        assert!(err.is_data_error());
    }
}

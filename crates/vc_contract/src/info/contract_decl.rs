/// The discriminator name used by a root declaration that names none.
pub const DEFAULT_DISCRIMINATOR_NAME: &str = "$type";

// -----------------------------------------------------------------------------
// ContractDecl

/// The contract declared on one exact type.
///
/// Declarations are never inherited: a type without its own `ContractDecl`
/// is not polymorphic, whatever its ancestors declare.
///
/// - A non-blank discriminator name makes the declaring type a hierarchy root.
/// - `root` forces root status and defaults the name to
///   [`DEFAULT_DISCRIMINATOR_NAME`].
/// - An explicit discriminator value overrides the default value (the type
///   name, for concrete types only).
///
/// Blank strings count as absent.
///
/// # Examples
///
/// ```
/// use vc_contract::info::ContractDecl;
///
/// let decl = ContractDecl::new().with_root(true);
/// assert_eq!(decl.discriminator_name(), Some("$type"));
///
/// let decl = ContractDecl::new().with_name("Type").with_value("  ");
/// assert_eq!(decl.discriminator_name(), Some("Type"));
/// assert_eq!(decl.discriminator_value(), None);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ContractDecl {
    name: Option<&'static str>,
    value: Option<&'static str>,
    root: bool,
}

#[inline]
fn non_blank(s: Option<&'static str>) -> Option<&'static str> {
    s.filter(|s| !s.trim().is_empty())
}

impl ContractDecl {
    /// An empty declaration: a hierarchy member using its default value.
    #[inline]
    pub const fn new() -> Self {
        Self {
            name: None,
            value: None,
            root: false,
        }
    }

    /// Declares the discriminator field name.
    #[inline]
    pub const fn with_name(mut self, name: &'static str) -> Self {
        self.name = Some(name);
        self
    }

    /// Declares an explicit discriminator value.
    #[inline]
    pub const fn with_value(mut self, value: &'static str) -> Self {
        self.value = Some(value);
        self
    }

    /// Sets the root flag.
    #[inline]
    pub const fn with_root(mut self, root: bool) -> Self {
        self.root = root;
        self
    }

    /// Returns the effective discriminator name, if this declaration defines a root.
    pub fn discriminator_name(&self) -> Option<&'static str> {
        match non_blank(self.name) {
            Some(name) => Some(name),
            None if self.root => Some(DEFAULT_DISCRIMINATOR_NAME),
            None => None,
        }
    }

    /// Returns the explicit discriminator value, if any.
    pub fn discriminator_value(&self) -> Option<&'static str> {
        non_blank(self.value)
    }

    /// Returns the root flag as declared.
    #[inline]
    pub const fn is_root(&self) -> bool {
        self.root
    }
}

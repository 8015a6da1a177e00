use core::fmt::Display;

#[cfg(all(debug_assertions, feature = "debug"))]
use crate::info::TypeInfo;

// -----------------------------------------------------------------------------
// TypeInfoStack

#[cfg(all(debug_assertions, feature = "debug"))]
mod stack {
    use alloc::vec::Vec;
    use core::fmt::{Debug, Formatter};

    use crate::info::TypeInfo;

    /// The contract types currently being converted on this thread, outermost first.
    #[derive(Default, Clone)]
    pub(crate) struct TypeInfoStack {
        stack: Vec<&'static TypeInfo>,
    }

    impl TypeInfoStack {
        pub const fn new() -> Self {
            Self { stack: Vec::new() }
        }

        pub fn push(&mut self, type_info: &'static TypeInfo) {
            self.stack.push(type_info);
        }

        pub fn pop(&mut self) {
            self.stack.pop();
        }

        pub fn is_empty(&self) -> bool {
            self.stack.is_empty()
        }
    }

    impl Debug for TypeInfoStack {
        fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
            let mut iter = self.stack.iter();

            if let Some(first) = iter.next() {
                write!(f, "`{}`", first.type_path())?;
            }
            for info in iter {
                write!(f, " -> `{}`", info.type_path())?;
            }
            Ok(())
        }
    }

    std::thread_local! {
        pub(crate) static TYPE_INFO_STACK: core::cell::RefCell<TypeInfoStack> =
            const { core::cell::RefCell::new(TypeInfoStack::new()) };
    }
}

#[cfg(all(debug_assertions, feature = "debug"))]
use stack::TYPE_INFO_STACK;

// -----------------------------------------------------------------------------
// StackGuard

/// Keeps a type on the thread's type info stack until dropped.
///
/// Does nothing unless the `debug` feature is enabled in a debug build.
pub(super) struct StackGuard(());

impl StackGuard {
    #[cfg(all(debug_assertions, feature = "debug"))]
    #[inline]
    pub fn push(type_info: &'static TypeInfo) -> Self {
        TYPE_INFO_STACK.with_borrow_mut(|stack| stack.push(type_info));
        Self(())
    }

    #[cfg(not(all(debug_assertions, feature = "debug")))]
    #[inline(always)]
    pub fn push(_: &'static crate::info::TypeInfo) -> Self {
        Self(())
    }
}

impl Drop for StackGuard {
    #[inline]
    fn drop(&mut self) {
        #[cfg(all(debug_assertions, feature = "debug"))]
        TYPE_INFO_STACK.with_borrow_mut(|stack| stack.pop());
    }
}

// -----------------------------------------------------------------------------
// Error helpers

/// Creates a custom serialization error.
///
/// Preferred over [`Error::custom`](serde_core::ser::Error::custom): in
/// debug builds it appends the stack of contract types being converted.
#[inline]
pub(super) fn make_ser_error<E: serde_core::ser::Error, M: Display>(msg: M) -> E {
    #[cfg(all(debug_assertions, feature = "debug"))]
    {
        TYPE_INFO_STACK.with_borrow(|stack| {
            if stack.is_empty() {
                E::custom(msg)
            } else {
                E::custom(format_args!("{msg} (stack: {stack:?})"))
            }
        })
    }
    #[cfg(not(all(debug_assertions, feature = "debug")))]
    {
        E::custom(msg)
    }
}

/// Creates a custom deserialization error, see [`make_ser_error`].
#[inline]
pub(super) fn make_de_error<E: serde_core::de::Error, M: Display>(msg: M) -> E {
    #[cfg(all(debug_assertions, feature = "debug"))]
    {
        TYPE_INFO_STACK.with_borrow(|stack| {
            if stack.is_empty() {
                E::custom(msg)
            } else {
                E::custom(format_args!("{msg} (stack: {stack:?})"))
            }
        })
    }
    #[cfg(not(all(debug_assertions, feature = "debug")))]
    {
        E::custom(msg)
    }
}

use proc_macro2::TokenStream;

#[inline(always)]
pub(crate) fn empty() -> TokenStream {
    TokenStream::new()
}

/// Splits a `::`-separated path into its module part and its last segment.
///
/// `"a::b::C"` gives `(Some("a::b"), "C")`, `"C"` gives `(None, "C")`.
pub(crate) fn split_type_path(path: &str) -> (Option<&str>, &str) {
    match path.rsplit_once("::") {
        Some((module, name)) => (Some(module), name),
        None => (None, path),
    }
}

#[cfg(test)]
mod tests {
    use super::split_type_path;

    #[test]
    fn split() {
        assert_eq!(split_type_path("garage::cars::Car"), (Some("garage::cars"), "Car"));
        assert_eq!(split_type_path("Car"), (None, "Car"));
    }
}

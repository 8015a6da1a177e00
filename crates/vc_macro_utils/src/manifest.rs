use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};
use std::time::SystemTime;

use toml_edit::{Document, Item, Table};

/// The caller's `Cargo.toml`, used to find how generated code can name
/// another crate.
///
/// Derive macros emit absolute paths such as `::vc_contract::info::Typed`.
/// Those paths are only valid if the invoking crate can see `vc_contract`
/// under that name, which is not the case when it depends on the crate
/// through the umbrella package or under a renamed key.
///
/// # Example
///
/// ```rust
/// # use vc_macro_utils::Manifest;
/// let p: syn::Path = Manifest::shared(|m| m.get_crate_path("vc_contract"));
/// ```
///
/// # Resolution rules
///
/// For `[dependencies]`, then `[dev-dependencies]`:
///
/// 1. A dependency whose package is the requested crate, returns `::key`.
///    The key may differ from the package name (`foo = { package = "vc_contract" }`).
/// 2. For a requested crate named `vc_xxx`, a dependency on the umbrella
///    package `vc_poly` returns `::key::xxx`.
///
/// Otherwise the path falls back to `::crate_name`.
///
/// A crate referencing itself from its own tests resolves to the fallback,
/// so it needs `extern crate self as vc_contract;` in its root.
#[derive(Debug)]
pub struct Manifest {
    manifest: Document<Box<str>>,
    modified_time: SystemTime,
}

const UMBRELLA_PACKAGE: &str = "vc_poly";
const PACKAGE_PREFIX: &str = "vc_";

impl Manifest {
    #[inline(never)]
    fn manifest_path() -> PathBuf {
        let dir = env::var_os("CARGO_MANIFEST_DIR")
            .unwrap_or_else(|| panic!("CARGO_MANIFEST_DIR should be set by cargo"));
        let path = PathBuf::from(dir).join("Cargo.toml");
        assert!(
            path.exists(),
            "Cargo manifest does not exist at path {}",
            path.display(),
        );
        path
    }

    #[inline(never)]
    fn modified_time(path: &Path) -> SystemTime {
        std::fs::metadata(path)
            .and_then(|metadata| metadata.modified())
            .unwrap_or(SystemTime::UNIX_EPOCH)
    }

    #[inline(never)]
    fn read(path: &Path) -> Document<Box<str>> {
        let text = std::fs::read_to_string(path)
            .unwrap_or_else(|err| panic!("Unable to read {}: {err}", path.display()));
        Document::parse(text.into_boxed_str())
            .unwrap_or_else(|err| panic!("Failed to parse {}: {err}", path.display()))
    }

    fn parse_path(path: &str) -> syn::Path {
        syn::parse_str(path)
            .unwrap_or_else(|err| panic!("`{path}` is not a valid crate path: {err}"))
    }

    // The package a dependency entry points at, honouring `package = "..."` renames.
    fn package_of<'a>(key: &'a str, item: &'a Item) -> &'a str {
        item.get("package").and_then(Item::as_str).unwrap_or(key)
    }

    fn key_of(deps: &Table, package: &str) -> Option<String> {
        deps.iter()
            .find(|(key, item)| Self::package_of(key, item) == package)
            .map(|(key, _)| key.replace('-', "_"))
    }

    fn find_in_deps(deps: &Table, name: &str) -> Option<syn::Path> {
        if let Some(key) = Self::key_of(deps, name) {
            return Some(Self::parse_path(&format!("::{key}")));
        }

        let module = name.strip_prefix(PACKAGE_PREFIX)?;
        let umbrella = Self::key_of(deps, UMBRELLA_PACKAGE)?;
        Some(Self::parse_path(&format!("::{umbrella}::{module}")))
    }

    /// Returns the path under which the invoking crate sees the package `name`.
    ///
    /// See the type documentation for the resolution order.
    #[inline(never)]
    pub fn get_crate_path(&self, name: &str) -> syn::Path {
        ["dependencies", "dev-dependencies"]
            .into_iter()
            .filter_map(|section| match self.manifest.get(section) {
                Some(Item::Table(deps)) => Self::find_in_deps(deps, name),
                _ => None,
            })
            .next()
            .unwrap_or_else(|| Self::parse_path(&format!("::{name}")))
    }

    /// Runs `func` with the invoking crate's manifest.
    ///
    /// Parsed manifests are cached per path and re-read when the file's
    /// modification time changes.
    pub fn shared<R>(func: impl FnOnce(&Self) -> R) -> R {
        static MANIFESTS: RwLock<BTreeMap<PathBuf, Manifest>> = RwLock::new(BTreeMap::new());

        let path = Self::manifest_path();
        let modified_time = Self::modified_time(&path);

        {
            let manifests = MANIFESTS.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(manifest) = manifests.get(&path)
                && manifest.modified_time == modified_time
            {
                return func(manifest);
            }
        }

        let manifest = Manifest {
            manifest: Self::read(&path),
            modified_time,
        };
        let result = func(&manifest);

        MANIFESTS
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path, manifest);

        result
    }
}

#[cfg(test)]
mod tests {
    use quote::ToTokens;
    use toml_edit::Document;

    use super::Manifest;

    fn resolve(toml: &str, name: &str) -> String {
        let manifest = Manifest {
            manifest: Document::parse(toml.to_owned().into_boxed_str()).unwrap(),
            modified_time: std::time::SystemTime::UNIX_EPOCH,
        };
        manifest
            .get_crate_path(name)
            .to_token_stream()
            .to_string()
            .replace(' ', "")
    }

    #[test]
    fn direct_dependency() {
        let toml = "[dependencies]\nvc_contract = { path = \"../vc_contract\" }\n";
        assert_eq!(resolve(toml, "vc_contract"), "::vc_contract");
    }

    #[test]
    fn renamed_dependency() {
        let toml = "[dependencies]\ncontracts = { package = \"vc_contract\", version = \"0.0.1\" }\n";
        assert_eq!(resolve(toml, "vc_contract"), "::contracts");
    }

    #[test]
    fn umbrella_dependency() {
        let toml = "[dev-dependencies]\nvc_poly = \"0.0.1\"\n";
        assert_eq!(resolve(toml, "vc_contract"), "::vc_poly::contract");
    }

    #[test]
    fn fallback() {
        assert_eq!(resolve("[package]\nname = \"demo\"\n", "vc_contract"), "::vc_contract");
    }
}

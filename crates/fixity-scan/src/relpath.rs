//! Root-relative store keys.

use std::path::{Component, Path};

use compact_str::CompactString;

/// Build the store key for `path` under `root`.
///
/// Keys use `/` as separator on every platform. Returns `None` when `path`
/// is not strictly inside `root` or contains `..`/prefix components.
pub fn relative_key(root: &Path, path: &Path) -> Option<CompactString> {
    let rel = path.strip_prefix(root).ok()?;
    let mut key = CompactString::default();

    for component in rel.components() {
        match component {
            Component::Normal(part) => {
                if !key.is_empty() {
                    key.push('/');
                }
                key.push_str(&part.to_string_lossy());
            }
            Component::CurDir => {}
            _ => return None,
        }
    }

    if key.is_empty() { None } else { Some(key) }
}

//! Typed navigation over `serde_json::Value` trees

use serde_json::Value;

/// Follow `path` through nested objects, ending at any value kind.
///
/// Returns `None` if any key is missing or any node before the last one is
/// not an object.
pub fn value_at_mut<'a>(root: &'a mut Value, path: &[&str]) -> Option<&'a mut Value> {
    let mut node = root;
    for key in path {
        node = node.as_object_mut()?.get_mut(*key)?;
    }
    Some(node)
}

/// Dotted form of a key path, for log output
pub fn display_path(path: &[&str]) -> String {
    path.join(".")
}

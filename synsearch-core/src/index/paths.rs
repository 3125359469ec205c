use crate::archive::ArchiveKind;

/// Asset path carried by a tar `pathname` payload: the first line, without
/// NUL padding or surrounding whitespace. Unity appends a `\n00` line that
/// this drops.
pub fn pathname_payload(data: &[u8]) -> String {
    let text = String::from_utf8_lossy(data);
    let first = text.split('\n').next().unwrap_or_default();
    first
        .trim_matches(|c: char| c == '\0' || c.is_whitespace())
        .to_string()
}

/// Path below the asset root.
///
/// A unitypackage stores project paths, so the root is only stripped from
/// the front. Zips wrap the project folder, so everything up to and
/// including the first occurrence of the root goes.
pub fn under_asset_root<'a>(path: &'a str, root: &str, kind: ArchiveKind) -> &'a str {
    if root.is_empty() {
        return path;
    }
    match kind {
        ArchiveKind::UnityPackage => path.strip_prefix(root).unwrap_or(path),
        ArchiveKind::Zip => path
            .find(root)
            .map_or(path, |i| &path[i + root.len()..]),
    }
}

/// `(package, relative)` split at the first `/`.
pub fn split_package(path: &str) -> Option<(&str, &str)> {
    path.split_once('/')
}

/// File name without directory and extension.
pub fn asset_name(relative: &str) -> &str {
    let start = relative.rfind('/').map_or(0, |i| i + 1);
    let end = relative[start..]
        .rfind('.')
        .map_or(relative.len(), |i| start + i);
    &relative[start..end]
}

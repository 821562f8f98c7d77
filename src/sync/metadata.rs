// sitesync/src/sync/metadata.rs
use std::path::Path;

use crate::config::HeaderRule;
use crate::store::ObjectMetadata;

pub const ACCESS_KEY: &str = "access";
pub const PUBLIC_READ: &str = "public-read";
pub const CONTENT_TYPE: &str = "Content-Type";

/// Content type implied by the file name, if any.
pub fn find_matching_content_type(path: &str) -> Option<&'static str> {
    let ext = Path::new(path)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase());
    if matches!(ext.as_deref(), Some("html") | Some("xview")) {
        return Some("text/html");
    }
    if path.contains(".js.gz") {
        return Some("application/javascript");
    }
    if path.contains(".css.gz") {
        return Some("text/css");
    }
    if path.contains(".html.gz") {
        return Some("text/html");
    }
    None
}

/// Builds the storage metadata for one file.
///
/// Header rules apply in list order so later matches overwrite earlier ones.
/// An inferred content type is applied last and overwrites any `Content-Type`
/// set by a rule.
pub fn customize_file_metadata(path: &str, rules: &[HeaderRule]) -> ObjectMetadata {
    let mut data = ObjectMetadata::new();
    data.insert(ACCESS_KEY.to_string(), PUBLIC_READ.to_string());

    for rule in rules.iter().filter(|rule| rule.pattern.is_match(path)) {
        data.insert(rule.header.clone(), rule.value.clone());
    }

    if let Some(content_type) = find_matching_content_type(path) {
        data.insert(CONTENT_TYPE.to_string(), content_type.to_string());
    }

    data
}

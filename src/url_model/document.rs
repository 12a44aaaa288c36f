//! Document id extraction from self links.

/// Returns the last segment of a document self link (`/resources/hosts/abc` → `abc`).
///
/// A link without `/` is returned whole; an empty link has no id.
pub fn document_id(self_link: &str) -> Option<&str> {
    if self_link.is_empty() {
        return None;
    }
    Some(self_link.rsplit_once('/').map_or(self_link, |(_, id)| id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_segment() {
        assert_eq!(document_id("/resources/compute/host-1"), Some("host-1"));
        assert_eq!(document_id("/a"), Some("a"));
    }

    #[test]
    fn no_slash_returns_whole_link() {
        assert_eq!(document_id("host-1"), Some("host-1"));
    }

    #[test]
    fn empty_or_trailing_slash() {
        assert_eq!(document_id(""), None);
        assert_eq!(document_id("/resources/compute/"), Some(""));
    }
}

//! Navigation paths.
//!
//! `/workflow/<urlencoded id>` addresses the detail view of one record; any
//! other path is the list view.

/// Path of the list view.
pub const LIST_PATH: &str = "/";

const DETAIL_PREFIX: &str = "/workflow/";

/// Detail path for a record id.
pub fn detail_path(id: &str) -> String {
    format!("{DETAIL_PREFIX}{}", urlencoding::encode(id))
}

/// Record id addressed by `path`, or `None` for the list view.
///
/// A path whose id segment does not decode as UTF-8 is treated as the list
/// view.
pub fn parse_detail_id(path: &str) -> Option<String> {
    let encoded = path.strip_prefix(DETAIL_PREFIX)?;
    if encoded.is_empty() {
        return None;
    }
    urlencoding::decode(encoded).ok().map(|id| id.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_path_round_trips() {
        for id in [
            "sheet-3",
            "1AbC_xyz-12",
            "my sheet/with?odd#chars-0",
            "ünï-1",
        ] {
            let path = detail_path(id);
            assert!(path.starts_with("/workflow/"));
            assert_eq!(parse_detail_id(&path).as_deref(), Some(id), "{path}");
        }
    }

    #[test]
    fn detail_path_encodes_reserved_characters() {
        assert_eq!(detail_path("a/b c"), "/workflow/a%2Fb%20c");
    }

    #[test]
    fn other_paths_are_the_list_view() {
        assert_eq!(parse_detail_id("/"), None);
        assert_eq!(parse_detail_id("/workflow/"), None);
        assert_eq!(parse_detail_id("/settings"), None);
        assert_eq!(parse_detail_id(""), None);
    }

    #[test]
    fn invalid_utf8_is_the_list_view() {
        assert_eq!(parse_detail_id("/workflow/%FF%FE"), None);
    }
}

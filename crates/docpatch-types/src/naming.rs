//! External field naming.
//!
//! A field's external name is what appears in a patch path. It comes from the
//! first comma-separated segment of the field's serialization tag, or, when no
//! tag is given, from converting the field name to `snake_case`.

/// Convert a `PascalCase` / `camelCase` name to `snake_case`.
///
/// An underscore is inserted before every uppercase character except the
/// first, then the whole string is lower-cased. Runs of capitals are not
/// collapsed: `ID` becomes `i_d`, `UserID` becomes `user_i_d`.
pub fn to_snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, ch) in name.chars().enumerate() {
        if i > 0 && ch.is_uppercase() {
            out.push('_');
        }
        out.extend(ch.to_lowercase());
    }
    out
}

/// Resolve the external name of a field.
///
/// Returns `None` when the tag's first segment is `-`, meaning the field is
/// never serialized and never diffed.
pub fn external_name(name: &str, tag: Option<&str>) -> Option<String> {
    if let Some(tag) = tag {
        let head = tag.split(',').next().unwrap_or("").trim();
        if head == "-" {
            return None;
        }
        if !head.is_empty() {
            return Some(head.to_string());
        }
    }
    Some(to_snake_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pascal_case_conversion() {
        assert_eq!(to_snake_case("UserName"), "user_name");
        assert_eq!(to_snake_case("Age"), "age");
        assert_eq!(to_snake_case("createdAt"), "created_at");
    }

    #[test]
    fn capital_runs_are_split_per_letter() {
        assert_eq!(to_snake_case("ID"), "i_d");
        assert_eq!(to_snake_case("UserID"), "user_i_d");
    }

    #[test]
    fn snake_case_is_unchanged() {
        assert_eq!(to_snake_case("already_snake"), "already_snake");
        assert_eq!(to_snake_case(""), "");
    }

    #[test]
    fn tag_first_segment_wins() {
        assert_eq!(external_name("Id", Some("_id,omitempty")), Some("_id".into()));
        assert_eq!(external_name("Name", Some("full_name")), Some("full_name".into()));
    }

    #[test]
    fn empty_tag_segment_falls_back_to_conversion() {
        assert_eq!(external_name("EmailAddress", Some(",omitempty")), Some("email_address".into()));
        assert_eq!(external_name("EmailAddress", None), Some("email_address".into()));
    }

    #[test]
    fn dash_tag_skips_field() {
        assert_eq!(external_name("Secret", Some("-")), None);
    }
}

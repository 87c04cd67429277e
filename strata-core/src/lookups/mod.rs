//! Lookup handlers resolving `<left>::<right>` references.

pub mod hook_data;
pub mod output;

use crate::error::{Result, StrataError};

/// Split a lookup value on the `::` separator, which must appear exactly
/// once.
pub(crate) fn split_lookup<'a>(kind: &'static str, value: &'a str) -> Result<(&'a str, &'a str)> {
    let parts: Vec<&str> = value.split("::").collect();
    match parts.as_slice() {
        [left, right] => Ok((left, right)),
        _ => Err(StrataError::MalformedLookup { kind, value: value.to_string() }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_lookup() {
        assert_eq!(split_lookup("output", "web::Url").unwrap(), ("web", "Url"));
        assert!(split_lookup("output", "web-Url").is_err());
        assert!(split_lookup("output", "a::b::c").is_err());
    }
}

//! Drift detection between desired and normalized remote state
//!
//! The drift rule is deliberately one-sided. A field drifts only when:
//!
//! - it is not marked `ignored_in_diff`,
//! - its desired value is set (see [`FieldValue::is_set`]),
//! - the provider reported the field at all, and
//! - the text forms of the desired and remote values differ.
//!
//! An unset desired value never drifts, whatever the remote holds. Comparing
//! text forms lets `300` and `"300"` match.

use crate::normalize::NormalizedResource;
use crate::resource::DesiredResource;
use crate::types::{Diff, FieldChange, FieldValue};

/// Compute the fields that must change for the remote to match `desired`.
///
/// The result follows the schema's field order.
pub fn diff(desired: &DesiredResource, remote: &NormalizedResource) -> Diff {
    let changes = desired
        .iter()
        .filter(|(field, want)| !field.ignored_in_diff && want.is_set())
        .filter_map(|(field, want)| {
            let have = remote.get(field.name)?;
            drifted(want, have).then(|| FieldChange {
                field: field.name,
                before: have.clone(),
                after: want.clone(),
            })
        })
        .collect();
    Diff::new(changes)
}

fn drifted(want: &FieldValue, have: &FieldValue) -> bool {
    want.to_string() != have.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::{RawResource, normalize};
    use crate::resource::Params;
    use crate::schema::fixtures::SITE;
    use crate::types::Intent;
    use serde_json::{Value, json};

    fn desired(value: Value) -> DesiredResource {
        let params: Params = value.as_object().cloned().unwrap();
        DesiredResource::build(&SITE, Intent::Present, &params).unwrap()
    }

    fn remote(value: Value) -> NormalizedResource {
        let raw: RawResource = value.as_object().cloned().unwrap();
        normalize(&SITE, &raw)
    }

    #[test]
    fn test_identical_values_no_diff() {
        let d = desired(json!({"name": "site1", "url": "https://a.test", "confirmation": 300}));
        let r = remote(json!({
            "WebsiteName": "site1",
            "URI": "https://a.test",
            "CheckRate": 300,
            "Confirmation": 300
        }));
        assert!(diff(&d, &r).is_empty());
    }

    #[test]
    fn test_drifted_field_reported() {
        let d = desired(json!({"name": "site1", "url": "https://a.test", "confirmation": 300}));
        let r = remote(json!({"WebsiteName": "site1", "URI": "https://a.test", "Confirmation": 200}));

        let result = diff(&d, &r);
        assert_eq!(result.fields(), vec!["confirmation"]);
        let change = result.get("confirmation").unwrap();
        assert_eq!(change.before, FieldValue::Int(200));
        assert_eq!(change.after, FieldValue::Int(300));
    }

    #[test]
    fn test_numeric_text_tolerated() {
        let d = desired(json!({"name": "site1", "url": "u", "confirmation": 300}));
        let r = remote(json!({"WebsiteName": "site1", "URI": "u", "Confirmation": "300"}));
        assert!(diff(&d, &r).is_empty());
    }

    #[test]
    fn test_unset_desired_never_drifts() {
        let d = desired(json!({"name": "site1", "url": "u", "paused": 0, "custom_header": ""}));
        let r = remote(json!({
            "WebsiteName": "site1",
            "URI": "u",
            "Paused": true,
            "CustomHeader": "{\"X\": \"1\"}",
            "Confirmation": 900,
            "Port": 8080
        }));
        assert!(diff(&d, &r).is_empty());
    }

    #[test]
    fn test_ignored_field_never_drifts() {
        let d = desired(json!({"name": "site1", "url": "u", "check_rate": 60}));
        let r = remote(json!({"WebsiteName": "site1", "URI": "u", "CheckRate": 3600}));
        assert!(diff(&d, &r).is_empty());
        assert!(d.payload().contains(&("CheckRate", "60".to_string())));
    }

    #[test]
    fn test_unreported_field_skipped() {
        let d = desired(json!({"name": "site1", "url": "u", "basic_pass": "secret"}));
        let r = remote(json!({"WebsiteName": "site1", "URI": "u"}));
        assert!(diff(&d, &r).is_empty());
    }

    #[test]
    fn test_null_remote_drifts_against_set_desired() {
        let d = desired(json!({"name": "site1", "url": "u", "port": 443}));
        let r = remote(json!({"WebsiteName": "site1", "URI": "u", "Port": null}));
        let result = diff(&d, &r);
        assert_eq!(result.get("port").unwrap().before, FieldValue::Null);
    }

    #[test]
    fn test_diff_preserves_schema_order() {
        let d = desired(json!({
            "confirmation": 5,
            "url": "https://b.test",
            "name": "site1",
            "tags": "a,b"
        }));
        let r = remote(json!({
            "WebsiteName": "site1",
            "URI": "https://a.test",
            "Tags": ["a"],
            "Confirmation": 1
        }));
        assert_eq!(diff(&d, &r).fields(), vec!["url", "tags", "confirmation"]);
    }
}

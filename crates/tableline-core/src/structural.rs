//! Structural dataset decoding: JSON array → [`Restaurant`] (location, media, payment)

use std::io::Read;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::enums::PaymentOption;
use crate::error::{PipelineError, Result};
use crate::record::{Geolocation, Restaurant};

/// Every field a structural object may carry. Anything else is schema drift.
pub const STRUCTURAL_FIELDS: &[&str] = &[
    "objectID",
    "name",
    "address",
    "area",
    "city",
    "country",
    "image_url",
    "mobile_reserve_url",
    "payment_options",
    "phone",
    "postal_code",
    "price",
    "reserve_url",
    "state",
    "_geoloc",
];

const GEOLOCATION_FIELDS: &[&str] = &["lat", "lng"];

// === Row struct (deserialized from JSON) ===

/// One object of the structural dataset. `null` is treated as omitted.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Listing {
    #[serde(rename = "objectID")]
    object_id: Option<i64>,
    name: Option<String>,
    address: Option<String>,
    area: Option<String>,
    city: Option<String>,
    country: Option<String>,
    image_url: Option<String>,
    mobile_reserve_url: Option<String>,
    payment_options: Option<Vec<String>>,
    phone: Option<String>,
    postal_code: Option<String>,
    price: Option<i64>,
    reserve_url: Option<String>,
    state: Option<String>,
    #[serde(rename = "_geoloc")]
    geoloc: Option<ListingGeoloc>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ListingGeoloc {
    lat: Option<f64>,
    lng: Option<f64>,
}

impl Listing {
    fn into_restaurant(self, index: usize) -> Result<Restaurant> {
        let id = match self.object_id {
            None => {
                return Err(PipelineError::Decode(format!(
                    "record {index}: missing objectID"
                )));
            }
            Some(0) => {
                return Err(PipelineError::Decode(format!(
                    "record {index}: objectID must be non-zero"
                )));
            }
            Some(id) => id,
        };

        let payment_options =
            PaymentOption::classify_all(self.payment_options.as_deref().unwrap_or_default())?;

        let geolocation = self
            .geoloc
            .map(|g| Geolocation {
                lat: g.lat,
                lng: g.lng,
            })
            .unwrap_or_default();

        Ok(Restaurant {
            id,
            name: self.name.unwrap_or_default(),
            address: self.address.unwrap_or_default(),
            area: self.area.unwrap_or_default(),
            city: self.city.unwrap_or_default(),
            country: self.country.unwrap_or_default(),
            image_url: self.image_url.unwrap_or_default(),
            mobile_reserve_url: self.mobile_reserve_url.unwrap_or_default(),
            payment_options,
            phone: self.phone.unwrap_or_default(),
            postal_code: self.postal_code.unwrap_or_default(),
            price: self.price.unwrap_or_default(),
            reserve_url: self.reserve_url.unwrap_or_default(),
            state: self.state.unwrap_or_default(),
            geolocation,
            content: None,
        })
    }
}

/// Reject any key outside the declared schema, including inside `_geoloc`.
fn check_fields(obj: &Map<String, Value>, index: usize) -> Result<()> {
    if let Some(key) = obj.keys().find(|k| !STRUCTURAL_FIELDS.contains(&k.as_str())) {
        return Err(PipelineError::SchemaViolation(format!(
            "record {index}: unknown field {key:?}"
        )));
    }
    if let Some(Value::Object(geo)) = obj.get("_geoloc") {
        if let Some(key) = geo.keys().find(|k| !GEOLOCATION_FIELDS.contains(&k.as_str())) {
            return Err(PipelineError::SchemaViolation(format!(
                "record {index}: unknown field \"_geoloc.{key}\""
            )));
        }
    }
    Ok(())
}

/// Decode the structural dataset.
///
/// The whole document is validated before anything is returned: one unknown
/// field, malformed object or unrecognised payment option fails the decode.
pub fn decode_structural(input: impl Read) -> Result<Vec<Restaurant>> {
    let doc: Value = serde_json::from_reader(input)
        .map_err(|e| PipelineError::Decode(format!("structural JSON: {e}")))?;

    let Value::Array(items) = doc else {
        return Err(PipelineError::Decode(
            "structural JSON: expected an array of restaurants".to_string(),
        ));
    };

    let mut restaurants = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        let Value::Object(obj) = &item else {
            return Err(PipelineError::Decode(format!(
                "record {index}: expected an object"
            )));
        };
        check_fields(obj, index)?;

        let listing: Listing = serde_json::from_value(item)
            .map_err(|e| PipelineError::Decode(format!("record {index}: {e}")))?;
        restaurants.push(listing.into_restaurant(index)?);
    }

    log::debug!("decoded {} structural records", restaurants.len());
    Ok(restaurants)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(json: &str) -> Result<Vec<Restaurant>> {
        decode_structural(json.as_bytes())
    }

    #[test]
    fn decodes_full_record() {
        let json = r#"[{
            "objectID": 116272,
            "name": "Nobu",
            "address": "105 Hudson St",
            "area": "New York / Tri-State Area",
            "city": "New York",
            "country": "US",
            "image_url": "https://example.com/116272.jpg",
            "mobile_reserve_url": "https://m.example.com/116272",
            "payment_options": ["AMEX", "Visa", "Diners Club", "MasterCard", "Discover"],
            "phone": "2122190500",
            "postal_code": "10013",
            "price": 4,
            "reserve_url": "https://example.com/r/116272",
            "state": "NY",
            "_geoloc": {"lat": 40.719586, "lng": -74.008751}
        }]"#;
        let records = decode(json).unwrap();
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.id, 116272);
        assert_eq!(r.name, "Nobu");
        assert_eq!(r.state, "NY");
        assert_eq!(r.price, 4);
        assert_eq!(
            r.payment_options,
            vec![
                PaymentOption::Amex,
                PaymentOption::Visa,
                PaymentOption::Discover,
                PaymentOption::MasterCard,
                PaymentOption::Discover,
            ]
        );
        assert_eq!(r.geolocation, Geolocation::new(40.719586, -74.008751));
        assert!(r.content.is_none());
    }

    #[test]
    fn optional_fields_default() {
        let records = decode(r#"[{"objectID": 1, "name": "A"}]"#).unwrap();
        let r = &records[0];
        assert_eq!(r.name, "A");
        assert_eq!(r.city, "");
        assert_eq!(r.price, 0);
        assert!(r.payment_options.is_empty());
        assert_eq!(r.geolocation, Geolocation::default());
    }

    #[test]
    fn null_is_treated_as_omitted() {
        let records =
            decode(r#"[{"objectID": 2, "name": null, "payment_options": null, "_geoloc": null}]"#)
                .unwrap();
        assert_eq!(records[0].name, "");
        assert!(records[0].payment_options.is_empty());
    }

    #[test]
    fn preserves_input_order() {
        let records = decode(r#"[{"objectID": 3}, {"objectID": 1}, {"objectID": 2}]"#).unwrap();
        let ids: Vec<_> = records.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn ignored_payment_options_are_dropped() {
        let records =
            decode(r#"[{"objectID": 1, "payment_options": ["JCB", "Cash Only", "Visa"]}]"#)
                .unwrap();
        assert_eq!(records[0].payment_options, vec![PaymentOption::Visa]);
    }

    #[test]
    fn unknown_field_is_schema_violation() {
        let err = decode(r#"[{"objectID": 1}, {"objectID": 2, "rating": 5}]"#).unwrap_err();
        match err {
            PipelineError::SchemaViolation(msg) => {
                assert!(msg.contains("record 1"));
                assert!(msg.contains("rating"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unknown_geoloc_field_is_schema_violation() {
        let err = decode(r#"[{"objectID": 1, "_geoloc": {"lat": 1.0, "lon": 2.0}}]"#).unwrap_err();
        assert!(matches!(err, PipelineError::SchemaViolation(ref m) if m.contains("_geoloc.lon")));
    }

    #[test]
    fn unknown_payment_option_fails_decode() {
        let err = decode(r#"[{"objectID": 1, "payment_options": ["Visa", "Bitcoin"]}]"#)
            .unwrap_err();
        match err {
            PipelineError::UnknownEnumValue { value, .. } => assert_eq!(value, "Bitcoin"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_or_zero_id_fails() {
        assert!(matches!(
            decode(r#"[{"name": "A"}]"#),
            Err(PipelineError::Decode(ref m)) if m.contains("missing objectID")
        ));
        assert!(matches!(
            decode(r#"[{"objectID": 0}]"#),
            Err(PipelineError::Decode(ref m)) if m.contains("non-zero")
        ));
    }

    #[test]
    fn malformed_documents_fail() {
        assert!(matches!(decode("[{"), Err(PipelineError::Decode(_))));
        assert!(matches!(
            decode(r#"{"objectID": 1}"#),
            Err(PipelineError::Decode(_))
        ));
        assert!(matches!(decode(r#"[1, 2]"#), Err(PipelineError::Decode(_))));
        assert!(matches!(
            decode(r#"[{"objectID": "one"}]"#),
            Err(PipelineError::Decode(_))
        ));
        assert!(matches!(
            decode(r#"[{"objectID": 1, "price": 2.5}]"#),
            Err(PipelineError::Decode(_))
        ));
    }

    #[test]
    fn half_filled_geoloc_survives_to_row() {
        let records = decode(r#"[{"objectID": 1, "_geoloc": {"lat": 40.7}}]"#).unwrap();
        assert_eq!(records[0].geolocation.lat, Some(40.7));
        let row = records[0].to_row();
        assert_eq!(row["_geoloc"], serde_json::json!({"lat": 40.7, "lng": 0.0}));
    }

    #[test]
    fn empty_array_is_valid() {
        assert!(decode("[]").unwrap().is_empty());
    }
}

//! Canonical restaurant record and its search-index row form

use serde_json::{Map, Value, json};

use crate::enums::{PaymentOption, PriceRange};

/// Geographic position. Either coordinate may be absent in the source.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Geolocation {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

impl Geolocation {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self {
            lat: Some(lat),
            lng: Some(lng),
        }
    }

    /// Both coordinates, if present.
    pub fn point(&self) -> Option<(f64, f64)> {
        self.lat.zip(self.lng)
    }

    /// Index form: `None` when neither coordinate is known, otherwise both
    /// with a missing one written as 0.
    pub fn indexed_point(&self) -> Option<(f64, f64)> {
        if self.lat.is_none() && self.lng.is_none() {
            return None;
        }
        Some((self.lat.unwrap_or_default(), self.lng.unwrap_or_default()))
    }
}

/// Attributes supplied only by the content (CSV) dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct Content {
    pub food_type: String,
    pub stars_count: f64,
    pub reviews_count: i64,
    pub neighborhood: String,
    pub phone_number: String,
    pub price_range: PriceRange,
    pub dining_style: String,
}

/// One decoded row of the content dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentRow {
    pub id: i64,
    pub content: Content,
}

/// Unified restaurant entity.
///
/// Structural fields come from the JSON dataset. `content` stays `None` until
/// the merger attaches the matching CSV row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Restaurant {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub area: String,
    pub city: String,
    pub country: String,
    pub image_url: String,
    pub mobile_reserve_url: String,
    pub payment_options: Vec<PaymentOption>,
    pub phone: String,
    pub postal_code: String,
    pub price: i64,
    pub reserve_url: String,
    pub state: String,
    pub geolocation: Geolocation,
    pub content: Option<Content>,
}

impl Restaurant {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    /// Whether both halves of the record have been populated.
    pub fn is_complete(&self) -> bool {
        self.content.is_some()
    }

    /// Render as a search-index object.
    ///
    /// `objectID` is the primary key, geolocation is nested under `_geoloc`
    /// as `{lat, lng}` (omitted when neither coordinate is known) and enums
    /// are written as their canonical literals. Content fields of an
    /// incomplete record are written as empty values.
    pub fn to_row(&self) -> Map<String, Value> {
        let mut row = Map::new();
        row.insert("objectID".into(), json!(self.id));
        row.insert("name".into(), json!(self.name));
        row.insert("address".into(), json!(self.address));
        row.insert("area".into(), json!(self.area));
        row.insert("city".into(), json!(self.city));
        row.insert("country".into(), json!(self.country));
        row.insert("image_url".into(), json!(self.image_url));
        row.insert("mobile_reserve_url".into(), json!(self.mobile_reserve_url));
        row.insert("payment_options".into(), json!(self.payment_options));
        row.insert("phone".into(), json!(self.phone));
        row.insert("postal_code".into(), json!(self.postal_code));
        row.insert("price".into(), json!(self.price));
        row.insert("reserve_url".into(), json!(self.reserve_url));
        row.insert("state".into(), json!(self.state));

        if let Some((lat, lng)) = self.geolocation.indexed_point() {
            if self.geolocation.point().is_none() {
                log::debug!(
                    "restaurant {}: partial geolocation, missing coordinate is 0",
                    self.id
                );
            }
            row.insert("_geoloc".into(), json!({ "lat": lat, "lng": lng }));
        }

        match &self.content {
            Some(c) => {
                row.insert("food_type".into(), json!(c.food_type));
                row.insert("stars_count".into(), json!(c.stars_count));
                row.insert("reviews_count".into(), json!(c.reviews_count));
                row.insert("neighborhood".into(), json!(c.neighborhood));
                row.insert("phone_number".into(), json!(c.phone_number));
                row.insert("price_range".into(), json!(c.price_range));
                row.insert("dining_style".into(), json!(c.dining_style));
            }
            None => {
                row.insert("food_type".into(), json!(""));
                row.insert("stars_count".into(), json!(0.0));
                row.insert("reviews_count".into(), json!(0));
                row.insert("neighborhood".into(), json!(""));
                row.insert("phone_number".into(), json!(""));
                row.insert("price_range".into(), Value::Null);
                row.insert("dining_style".into(), json!(""));
            }
        }
        row
    }
}

/// Convert a record set to index rows, preserving order.
pub fn to_rows(records: &[Restaurant]) -> Vec<Map<String, Value>> {
    records.iter().map(Restaurant::to_row).collect()
}

//! Search index capability and facet reconciliation.
//!
//! The core only talks to a search index through [`SearchIndex`]; transport,
//! authentication and batching belong to the implementation.

use serde_json::{Map, Value};

use crate::error::Result;

/// Attributes that must be facetable for the restaurant search UI.
pub const DEFAULT_FACETS: &[&str] = &["food_type", "payment_options"];

/// A hosted search index holding restaurant objects.
pub trait SearchIndex {
    /// Upsert all objects, keyed by their `objectID`. Returns one task id per
    /// batch the implementation sent.
    fn save_objects(&self, objects: &[Map<String, Value>]) -> Result<Vec<i64>>;

    /// Current `attributesForFaceting` (empty when unset).
    fn facet_attributes(&self) -> Result<Vec<String>>;

    /// Replace `attributesForFaceting`. Returns the settings task id.
    fn set_facet_attributes(&self, attributes: &[String]) -> Result<i64>;
}

/// Outcome of [`ensure_facets`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FacetUpdate {
    UpToDate,
    Updated { attributes: Vec<String>, task_id: i64 },
}

/// Current attributes plus the required ones, sorted and deduplicated.
/// `None` when nothing is missing.
pub fn plan_facets(current: &[String], required: &[&str]) -> Option<Vec<String>> {
    if required.iter().all(|r| current.iter().any(|c| c == r)) {
        return None;
    }
    let mut attributes: Vec<String> = current
        .iter()
        .cloned()
        .chain(required.iter().map(|r| r.to_string()))
        .collect();
    attributes.sort();
    attributes.dedup();
    Some(attributes)
}

/// Make sure every `required` attribute is facetable, writing the settings
/// only when something is missing.
pub fn ensure_facets(index: &dyn SearchIndex, required: &[&str]) -> Result<FacetUpdate> {
    let current = index.facet_attributes()?;
    let Some(attributes) = plan_facets(&current, required) else {
        log::info!("index settings up to date");
        return Ok(FacetUpdate::UpToDate);
    };

    let task_id = index.set_facet_attributes(&attributes)?;
    log::info!("index settings updated (task {task_id}): {}", attributes.join(", "));
    Ok(FacetUpdate::Updated {
        attributes,
        task_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// In-memory index recording writes.
    #[derive(Default)]
    struct FakeIndex {
        facets: RefCell<Vec<String>>,
        writes: RefCell<usize>,
    }

    impl SearchIndex for FakeIndex {
        fn save_objects(&self, objects: &[Map<String, Value>]) -> Result<Vec<i64>> {
            Ok(vec![objects.len() as i64])
        }

        fn facet_attributes(&self) -> Result<Vec<String>> {
            Ok(self.facets.borrow().clone())
        }

        fn set_facet_attributes(&self, attributes: &[String]) -> Result<i64> {
            *self.facets.borrow_mut() = attributes.to_vec();
            *self.writes.borrow_mut() += 1;
            Ok(42)
        }
    }

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn plan_none_when_current() {
        let current = strings(&["payment_options", "city", "food_type"]);
        assert_eq!(plan_facets(&current, DEFAULT_FACETS), None);
    }

    #[test]
    fn plan_sorts_and_dedups() {
        let current = strings(&["searchable(city)", "food_type", "area", "area"]);
        assert_eq!(
            plan_facets(&current, DEFAULT_FACETS),
            Some(strings(&[
                "area",
                "food_type",
                "payment_options",
                "searchable(city)"
            ]))
        );
    }

    #[test]
    fn ensure_writes_when_missing() {
        let index = FakeIndex::default();
        let update = ensure_facets(&index, DEFAULT_FACETS).unwrap();
        assert_eq!(
            update,
            FacetUpdate::Updated {
                attributes: strings(&["food_type", "payment_options"]),
                task_id: 42
            }
        );
        assert_eq!(*index.writes.borrow(), 1);
    }

    #[test]
    fn ensure_is_noop_when_current() {
        let index = FakeIndex::default();
        ensure_facets(&index, DEFAULT_FACETS).unwrap();
        let second = ensure_facets(&index, DEFAULT_FACETS).unwrap();
        assert_eq!(second, FacetUpdate::UpToDate);
        assert_eq!(*index.writes.borrow(), 1);
    }
}

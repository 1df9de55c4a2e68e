//! Product attribute aggregation.
//!
//! Attributes are stored one row per `(product, name, value)`. Clients receive
//! them grouped as `name -> [values]`, with values in display order:
//!
//! - `Size`: Small, Medium, Large, Extra Large, then anything else A-Z
//! - `Capacity`: 256GB, 512GB, 1TB, then anything else A-Z
//! - everything else: A-Z
//!
//! The special names are matched ignoring ASCII case.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::ProductId;

const SIZE_ORDER: &[&str] = &["Small", "Medium", "Large", "Extra Large"];
const CAPACITY_ORDER: &[&str] = &["256GB", "512GB", "1TB"];

/// A named attribute with its values in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub values: Vec<String>,
}

/// A single stored attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeRow {
    pub product_id: ProductId,
    pub name: String,
    pub value: String,
}

fn custom_order(attribute_name: &str) -> Option<&'static [&'static str]> {
    if attribute_name.eq_ignore_ascii_case("Size") {
        Some(SIZE_ORDER)
    } else if attribute_name.eq_ignore_ascii_case("Capacity") {
        Some(CAPACITY_ORDER)
    } else {
        None
    }
}

/// Compare two values of the named attribute in display order.
#[must_use]
pub fn compare_values(attribute_name: &str, a: &str, b: &str) -> Ordering {
    match custom_order(attribute_name) {
        Some(order) => {
            let rank = |v: &str| order.iter().position(|o| *o == v).unwrap_or(order.len());
            rank(a).cmp(&rank(b)).then_with(|| a.cmp(b))
        }
        None => a.cmp(b),
    }
}

/// Sort values of the named attribute into display order.
///
/// Empty strings and duplicates are removed.
pub fn sort_attribute_values(attribute_name: &str, values: &mut Vec<String>) {
    values.retain(|v| !v.is_empty());
    values.sort_by(|a, b| compare_values(attribute_name, a, b));
    values.dedup();
}

/// Group `(name, value)` pairs of one product into attributes.
///
/// Attributes come back ordered by name; values follow [`compare_values`].
pub fn collect_attributes<I>(pairs: I) -> Vec<Attribute>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut by_name: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (name, value) in pairs {
        by_name.entry(name).or_default().push(value);
    }

    by_name
        .into_iter()
        .filter_map(|(name, mut values)| {
            sort_attribute_values(&name, &mut values);
            (!values.is_empty()).then_some(Attribute { name, values })
        })
        .collect()
}

/// Group attribute rows of many products, ordered by product id.
pub fn group_attributes<I>(rows: I) -> Vec<(ProductId, Vec<Attribute>)>
where
    I: IntoIterator<Item = AttributeRow>,
{
    let mut by_product: BTreeMap<ProductId, Vec<(String, String)>> = BTreeMap::new();
    for row in rows {
        by_product
            .entry(row.product_id)
            .or_default()
            .push((row.name, row.value));
    }

    by_product
        .into_iter()
        .map(|(product_id, pairs)| (product_id, collect_attributes(pairs)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(name: &str, values: &[&str]) -> Vec<String> {
        let mut values = values.iter().map(ToString::to_string).collect();
        sort_attribute_values(name, &mut values);
        values
    }

    #[test]
    fn test_size_custom_order() {
        assert_eq!(
            sorted("Size", &["Large", "Small", "Medium"]),
            ["Small", "Medium", "Large"]
        );
        assert_eq!(
            sorted("Size", &["XS", "Extra Large", "40", "Small"]),
            ["Small", "Extra Large", "40", "XS"]
        );
    }

    #[test]
    fn test_capacity_custom_order() {
        assert_eq!(
            sorted("Capacity", &["1TB", "256GB", "512GB"]),
            ["256GB", "512GB", "1TB"]
        );
        assert_eq!(
            sorted("capacity", &["2TB", "1TB", "128GB"]),
            ["1TB", "128GB", "2TB"]
        );
    }

    #[test]
    fn test_other_attributes_sort_lexicographically() {
        assert_eq!(
            sorted("Color", &["#FF0000", "#00FF00", "#000000"]),
            ["#000000", "#00FF00", "#FF0000"]
        );
    }

    #[test]
    fn test_empty_and_duplicate_values_dropped() {
        assert_eq!(sorted("Color", &["Red", "", "Red", "Blue"]), ["Blue", "Red"]);
    }

    #[test]
    fn test_collect_attributes_orders_by_name() {
        let attributes = collect_attributes(vec![
            ("Size".to_string(), "Large".to_string()),
            ("Color".to_string(), "Red".to_string()),
            ("Size".to_string(), "Small".to_string()),
        ]);
        assert_eq!(attributes.len(), 2);
        assert_eq!(attributes[0].name, "Color");
        assert_eq!(attributes[1].values, ["Small", "Large"]);
    }

    #[test]
    fn test_group_attributes_by_product() {
        let row = |product: &str, name: &str, value: &str| AttributeRow {
            product_id: ProductId::from(product),
            name: name.to_string(),
            value: value.to_string(),
        };
        let grouped = group_attributes(vec![
            row("ps-5", "Capacity", "1TB"),
            row("apple-airtag", "Color", "White"),
            row("ps-5", "Capacity", "512GB"),
        ]);

        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].0.as_str(), "apple-airtag");
        assert_eq!(grouped[1].1[0].values, ["512GB", "1TB"]);
    }
}

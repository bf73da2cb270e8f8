//! Client-side catalog filtering.
//!
//! The whole catalog is held in memory and the visible list is recomputed
//! from scratch on every keystroke or filter change. Filtering is a single
//! pass that keeps the catalog order; it never ranks or reorders.

use serde::{Deserialize, Serialize};

use crate::product::Product;

/// Sizes the filter panel always offers, in display order.
pub const STANDARD_SIZES: [&str; 6] = ["XS", "S", "M", "L", "XL", "XXL"];

/// A single-valued, exact-match filter dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterField {
    KitType,
    Manufacturer,
    League,
    Season,
    Condition,
    Size,
}

impl FilterField {
    pub const ALL: [FilterField; 6] = [
        FilterField::KitType,
        FilterField::Manufacturer,
        FilterField::League,
        FilterField::Season,
        FilterField::Condition,
        FilterField::Size,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FilterField::KitType => "Kit type",
            FilterField::Manufacturer => "Manufacturer",
            FilterField::League => "League",
            FilterField::Season => "Season",
            FilterField::Condition => "Condition",
            FilterField::Size => "Size",
        }
    }

    /// Query parameter name understood by the backend.
    pub fn query_key(self) -> &'static str {
        match self {
            FilterField::KitType => "type",
            FilterField::Manufacturer => "manufacturer",
            FilterField::League => "league",
            FilterField::Season => "season",
            FilterField::Condition => "condition",
            FilterField::Size => "size",
        }
    }

    /// Whether `product` satisfies `value` on this dimension.
    fn accepts(self, product: &Product, value: &str) -> bool {
        match self {
            FilterField::KitType => product.kit_type == value,
            FilterField::Manufacturer => product.manufacturer == value,
            FilterField::League => product.league == value,
            FilterField::Season => product.season == value,
            FilterField::Condition => product.condition == value,
            FilterField::Size => product.sizes.contains(value),
        }
    }
}

/// Inclusive price bounds in whole currency units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: u64,
    pub max: u64,
}

impl PriceRange {
    pub const FULL: PriceRange = PriceRange { min: 0, max: u64::MAX };

    pub fn new(min: u64, max: u64) -> Self {
        Self { min, max }
    }

    /// A range with `min > max` contains nothing.
    pub fn contains(&self, price: u64) -> bool {
        self.min <= price && price <= self.max
    }

    pub fn is_full(&self) -> bool {
        *self == Self::FULL
    }
}

impl Default for PriceRange {
    fn default() -> Self {
        Self::FULL
    }
}

/// The user's current constraints. `None` on a field means "any".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveFilterSet {
    pub kit_type: Option<String>,
    pub manufacturer: Option<String>,
    pub league: Option<String>,
    pub season: Option<String>,
    pub condition: Option<String>,
    pub size: Option<String>,
    pub price: PriceRange,
}

impl ActiveFilterSet {
    pub fn get(&self, field: FilterField) -> Option<&str> {
        self.slot(field).as_deref()
    }

    /// Set a field; an empty value clears it.
    pub fn set(&mut self, field: FilterField, value: impl Into<String>) {
        let value = value.into();
        *self.slot_mut(field) = if value.is_empty() { None } else { Some(value) };
    }

    pub fn clear(&mut self, field: FilterField) {
        *self.slot_mut(field) = None;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        self.active_count() == 0
    }

    /// Number of constraints in effect, counting a narrowed price range as one.
    pub fn active_count(&self) -> usize {
        let fields = FilterField::ALL
            .iter()
            .filter(|field| self.get(**field).is_some())
            .count();
        fields + usize::from(!self.price.is_full())
    }

    /// Non-empty fields in declaration order.
    pub fn active_fields(&self) -> impl Iterator<Item = (FilterField, &str)> {
        FilterField::ALL
            .into_iter()
            .filter_map(move |field| self.get(field).map(|value| (field, value)))
    }

    fn slot(&self, field: FilterField) -> &Option<String> {
        match field {
            FilterField::KitType => &self.kit_type,
            FilterField::Manufacturer => &self.manufacturer,
            FilterField::League => &self.league,
            FilterField::Season => &self.season,
            FilterField::Condition => &self.condition,
            FilterField::Size => &self.size,
        }
    }

    fn slot_mut(&mut self, field: FilterField) -> &mut Option<String> {
        match field {
            FilterField::KitType => &mut self.kit_type,
            FilterField::Manufacturer => &mut self.manufacturer,
            FilterField::League => &mut self.league,
            FilterField::Season => &mut self.season,
            FilterField::Condition => &mut self.condition,
            FilterField::Size => &mut self.size,
        }
    }
}

/// Free-text search, case-insensitive substring over name, manufacturer
/// and league. Lowercased once at construction; the text is otherwise
/// matched exactly as typed, surrounding spaces included.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    raw: String,
    needle: String,
}

impl SearchQuery {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let needle = raw.to_lowercase();
        Self { raw, needle }
    }

    /// Text as typed, for echoing back into the search box.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn is_empty(&self) -> bool {
        self.needle.is_empty()
    }

    pub fn matches(&self, product: &Product) -> bool {
        if self.needle.is_empty() {
            return true;
        }
        [&product.name, &product.manufacturer, &product.league]
            .iter()
            .any(|text| text.to_lowercase().contains(&self.needle))
    }
}

/// True when `product` passes the search and every active constraint.
pub fn matches(product: &Product, filters: &ActiveFilterSet, query: &SearchQuery) -> bool {
    query.matches(product)
        && filters
            .active_fields()
            .all(|(field, value)| field.accepts(product, value))
        && filters.price.contains(product.price)
}

/// Order-preserving subsequence of `products` that passes [`matches`].
pub fn filter_products(products: &[Product], filters: &ActiveFilterSet, query: &SearchQuery) -> Vec<Product> {
    products
        .iter()
        .filter(|product| matches(product, filters, query))
        .cloned()
        .collect()
}

/// Lowest and highest price in the catalog.
pub fn price_bounds(products: &[Product]) -> Option<PriceRange> {
    let min = products.iter().map(|p| p.price).min()?;
    let max = products.iter().map(|p| p.price).max()?;
    Some(PriceRange::new(min, max))
}

/// Values offered by each select in the filter panel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOptions {
    #[serde(rename = "type", default)]
    pub kit_type: Vec<String>,
    #[serde(default)]
    pub manufacturer: Vec<String>,
    #[serde(default)]
    pub league: Vec<String>,
    #[serde(default)]
    pub season: Vec<String>,
    #[serde(default)]
    pub condition: Vec<String>,
    #[serde(default)]
    pub size: Vec<String>,
}

impl FilterOptions {
    /// Distinct values in first-seen catalog order. Sizes start from
    /// [`STANDARD_SIZES`] and append anything non-standard the catalog uses.
    pub fn from_products(products: &[Product]) -> Self {
        let mut options = FilterOptions {
            size: STANDARD_SIZES.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        };
        for product in products {
            push_distinct(&mut options.kit_type, &product.kit_type);
            push_distinct(&mut options.manufacturer, &product.manufacturer);
            push_distinct(&mut options.league, &product.league);
            push_distinct(&mut options.season, &product.season);
            push_distinct(&mut options.condition, &product.condition);
            for size in product.sizes.iter() {
                push_distinct(&mut options.size, size);
            }
        }
        options
    }

    pub fn values(&self, field: FilterField) -> &[String] {
        match field {
            FilterField::KitType => &self.kit_type,
            FilterField::Manufacturer => &self.manufacturer,
            FilterField::League => &self.league,
            FilterField::Season => &self.season,
            FilterField::Condition => &self.condition,
            FilterField::Size => &self.size,
        }
    }
}

fn push_distinct(values: &mut Vec<String>, value: &str) {
    if !value.is_empty() && !values.iter().any(|v| v == value) {
        values.push(value.to_string());
    }
}

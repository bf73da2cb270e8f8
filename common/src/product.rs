use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Backend product identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub u64);

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Small label rendered on top of a product card (e.g. condition, season).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Badge {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
}

/// A catalog entry. Owned by the backend; the client never mutates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub team: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub manufacturer: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub league: String,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kit_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub season: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub condition: String,
    /// Price in whole roubles.
    #[serde(deserialize_with = "de_amount")]
    pub price: u64,
    #[serde(rename = "size", default)]
    pub sizes: SizeSet,
    #[serde(default, deserialize_with = "null_as_default")]
    pub color: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "de_images")]
    pub images: Vec<ImageRef>,
    #[serde(default)]
    pub badges: Vec<Badge>,
    #[serde(default = "default_true")]
    pub is_available: bool,
    #[serde(default = "default_stock")]
    pub stock_quantity: i64,
}

impl Product {
    /// First image, used for cards and list rows.
    pub fn primary_image(&self) -> Option<&ImageRef> {
        self.images.first()
    }

    /// Size preselected when adding to the cart without an explicit choice.
    pub fn default_size(&self) -> &str {
        self.sizes.first()
    }
}

/// Reference to a product image.
///
/// The backend sends image objects (`{id, image, image_url, ..}`); older
/// payloads and the demo catalog use bare URLs. Both collapse to the URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ImageRef(pub String);

impl ImageRef {
    pub fn url(&self) -> &str {
        &self.0
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ImageWire {
    Url(String),
    Object {
        #[serde(default)]
        image_url: Option<String>,
        #[serde(default)]
        image: Option<String>,
    },
}

impl ImageWire {
    fn into_ref(self) -> Option<ImageRef> {
        let url = match self {
            ImageWire::Url(url) => Some(url),
            ImageWire::Object { image_url, image } => image_url.filter(|u| !u.is_empty()).or(image),
        };
        url.filter(|u| !u.is_empty()).map(ImageRef)
    }
}

impl<'de> Deserialize<'de> for ImageRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        ImageWire::deserialize(deserializer)?
            .into_ref()
            .ok_or_else(|| serde::de::Error::custom("image without a URL"))
    }
}

/// Image list of a product. Images whose file is gone come back with
/// `image` and `image_url` both null; those are dropped.
fn de_images<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<ImageRef>, D::Error> {
    let images: Option<Vec<ImageWire>> = Option::deserialize(deserializer)?;
    Ok(images
        .unwrap_or_default()
        .into_iter()
        .filter_map(ImageWire::into_ref)
        .collect())
}

/// Size used when the backend gives no usable size at all.
pub const ONE_SIZE: &str = "ONE SIZE";

/// Non-empty, ordered, duplicate-free set of sizes a product is offered in.
///
/// The backend stores sizes as free text (`"M"`, `"S, M, L"`, `"S/M"`),
/// some payloads send arrays. Everything is normalised here so the filter
/// and the views only ever see one shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SizeSet(Vec<String>);

impl SizeSet {
    /// Parse free-text sizes. Never fails: empty input gives [`ONE_SIZE`].
    pub fn parse(raw: &str) -> Self {
        Self::from_parts(raw.split(|c: char| matches!(c, ',' | '/' | ';') || c.is_whitespace()))
    }

    pub fn from_parts<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut sizes: Vec<String> = Vec::new();
        for part in parts {
            let size = part.as_ref().trim();
            if size.is_empty() || sizes.iter().any(|s| s == size) {
                continue;
            }
            sizes.push(size.to_string());
        }
        if sizes.is_empty() {
            sizes.push(ONE_SIZE.to_string());
        }
        SizeSet(sizes)
    }

    pub fn contains(&self, size: &str) -> bool {
        self.0.iter().any(|s| s == size)
    }

    pub fn first(&self) -> &str {
        // Construction guarantees at least one entry.
        &self.0[0]
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl Default for SizeSet {
    fn default() -> Self {
        SizeSet(vec![ONE_SIZE.to_string()])
    }
}

impl fmt::Display for SizeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(", "))
    }
}

impl Serialize for SizeSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SizeSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            Text(String),
            List(Vec<String>),
            Missing(()),
        }

        Ok(match Wire::deserialize(deserializer)? {
            Wire::Text(raw) => SizeSet::parse(&raw),
            Wire::List(parts) => SizeSet::from_parts(parts),
            Wire::Missing(()) => SizeSet::default(),
        })
    }
}

/// Accepts a JSON number or a decimal string (`"6500.00"`) and rounds to
/// whole currency units. Negative amounts are clamped to zero.
pub(crate) fn de_amount<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Wire {
        Int(u64),
        Float(f64),
        Text(String),
    }

    let value = match Wire::deserialize(deserializer)? {
        Wire::Int(v) => return Ok(v),
        Wire::Float(v) => v,
        Wire::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| serde::de::Error::custom(format!("invalid amount: {s:?}")))?,
    };
    if !value.is_finite() {
        return Err(serde::de::Error::custom("amount is not finite"));
    }
    Ok(value.max(0.0).round() as u64)
}

pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn default_true() -> bool {
    true
}

fn default_stock() -> i64 {
    1
}

#[cfg(test)]
pub(crate) fn sample_product(id: u64, name: &str, manufacturer: &str, price: u64) -> Product {
    Product {
        id: ProductId(id),
        name: name.into(),
        team: name.into(),
        manufacturer: manufacturer.into(),
        league: String::new(),
        kit_type: String::new(),
        season: String::new(),
        condition: String::new(),
        price,
        sizes: SizeSet::default(),
        color: String::new(),
        description: String::new(),
        images: Vec::new(),
        badges: Vec::new(),
        is_available: true,
        stock_quantity: 1,
    }
}

//! Table rows, read projections, and the partial product update.

use chrono::NaiveDate;
use serde::{de, Deserialize, Deserializer, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub id: i32,
    pub price: i32,
    pub count: i32,
    pub order_id: Option<i32>,
    pub description_id: i32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Description {
    pub id: i32,
    pub dimensions: String,
    pub weight: f64,
    pub furniture_type: String,
    pub material: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct SalesAccounting {
    pub id: i32,
    pub date: NaiveDate,
    pub product_id: i32,
    pub buyer_id: i32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Buyer {
    pub id: i32,
    pub full_name: String,
    pub organization_name: String,
    pub phone_number: String,
    pub address: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Provider {
    pub id: i32,
    pub product_name: String,
    pub email: String,
    pub phone_number: String,
    pub full_name: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Order {
    pub id: i32,
    pub product_quantity: i32,
    pub total_cost: i32,
    pub provider_id: i32,
}

/// Product joined with its description.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProductInfo {
    pub price: i32,
    pub count: i32,
    pub dimensions: String,
    pub weight: f64,
    pub furniture_type: String,
    pub material: String,
}

/// Product joined with each of its sales.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct SaleInfo {
    pub price: i32,
    pub count: i32,
    pub order_id: Option<i32>,
    pub date: NaiveDate,
}

/// Buyer joined with each of their purchases.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct BuyerInfo {
    pub full_name: String,
    pub organization_name: String,
    pub phone_number: String,
    pub address: String,
    pub date: NaiveDate,
    pub product_id: i32,
}

/// Order joined with its provider and the products it delivered.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct OrderInfo {
    pub product_quantity: i32,
    pub total_cost: i32,
    pub price: i32,
    pub count: i32,
    pub product_name: String,
    pub email: String,
    pub phone_number: String,
    pub full_name: String,
}

/// New value for one column. Absent and `null` both deserialize to `Unchanged`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldUpdate<T> {
    #[default]
    Unchanged,
    Set(T),
}

impl<T> FieldUpdate<T> {
    pub fn is_set(&self) -> bool {
        matches!(self, FieldUpdate::Set(_))
    }

    pub fn as_option(&self) -> Option<&T> {
        match self {
            FieldUpdate::Unchanged => None,
            FieldUpdate::Set(v) => Some(v),
        }
    }
}

impl<T: Clone> FieldUpdate<T> {
    /// Overwrite `target` when a value is present.
    pub fn apply_to(&self, target: &mut T) {
        if let FieldUpdate::Set(v) = self {
            *target = v.clone();
        }
    }
}

impl<T> From<Option<T>> for FieldUpdate<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(FieldUpdate::Unchanged, FieldUpdate::Set)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for FieldUpdate<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(FieldUpdate::from)
    }
}

/// Integer that also accepts numeric strings and floats without a fractional part.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LenientInt(pub i32);

impl<'de> Deserialize<'de> for LenientInt {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(LenientIntVisitor)
    }
}

struct LenientIntVisitor;

impl LenientIntVisitor {
    fn from_f64<E: de::Error>(v: f64) -> Result<LenientInt, E> {
        if v.fract() != 0.0 || !v.is_finite() || v < i32::MIN as f64 || v > i32::MAX as f64 {
            return Err(E::invalid_value(de::Unexpected::Float(v), &"an integer"));
        }
        Ok(LenientInt(v as i32))
    }
}

impl<'de> de::Visitor<'de> for LenientIntVisitor {
    type Value = LenientInt;

    fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str("an integer, a whole float, or a numeric string")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<LenientInt, E> {
        i32::try_from(v)
            .map(LenientInt)
            .map_err(|_| E::invalid_value(de::Unexpected::Signed(v), &"a 32-bit integer"))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<LenientInt, E> {
        i32::try_from(v)
            .map(LenientInt)
            .map_err(|_| E::invalid_value(de::Unexpected::Unsigned(v), &"a 32-bit integer"))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<LenientInt, E> {
        Self::from_f64(v)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<LenientInt, E> {
        let trimmed = v.trim();
        if let Ok(n) = trimmed.parse::<i64>() {
            return self.visit_i64(n);
        }
        match trimmed.parse::<f64>() {
            Ok(f) => Self::from_f64(f),
            Err(_) => Err(E::invalid_value(de::Unexpected::Str(v), &self)),
        }
    }
}

fn lenient_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i32, D::Error> {
    LenientInt::deserialize(deserializer).map(|v| v.0)
}

fn lenient_update<'de, D: Deserializer<'de>>(deserializer: D) -> Result<FieldUpdate<i32>, D::Error> {
    Option::<LenientInt>::deserialize(deserializer).map(|v| v.map(|v| v.0).into())
}

/// PATCH body: target product id plus the columns to change.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductData {
    #[serde(deserialize_with = "lenient_id")]
    pub id: i32,
    #[serde(default, deserialize_with = "lenient_update", skip_serializing_if = "is_unchanged")]
    pub price: FieldUpdate<i32>,
    #[serde(default, deserialize_with = "lenient_update", skip_serializing_if = "is_unchanged")]
    pub count: FieldUpdate<i32>,
    #[serde(default, deserialize_with = "lenient_update", skip_serializing_if = "is_unchanged")]
    pub order_id: FieldUpdate<i32>,
    #[serde(default, deserialize_with = "lenient_update", skip_serializing_if = "is_unchanged")]
    pub description_id: FieldUpdate<i32>,
}

fn is_unchanged<T>(f: &FieldUpdate<T>) -> bool {
    !f.is_set()
}

impl ProductData {
    pub fn new(id: i32) -> Self {
        ProductData {
            id,
            ..Default::default()
        }
    }

    pub fn is_noop(&self) -> bool {
        !(self.price.is_set() || self.count.is_set() || self.order_id.is_set() || self.description_id.is_set())
    }

    /// Apply the present fields to a loaded row.
    pub fn apply(&self, product: &mut Product) {
        self.price.apply_to(&mut product.price);
        self.count.apply_to(&mut product.count);
        if let FieldUpdate::Set(order_id) = self.order_id {
            product.order_id = Some(order_id);
        }
        self.description_id.apply_to(&mut product.description_id);
    }
}

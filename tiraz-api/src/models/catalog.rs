//! Catalog entities: categories, designs, fabrics, colors
//!
//! Each entity has a row type (read back from SQLite), an `*Input` used on
//! create, and a `*Patch` whose `None` fields leave the stored value alone.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::FromRow;

/// Row type stored in its own catalog table
pub trait CatalogEntity:
    for<'r> FromRow<'r, SqliteRow> + Serialize + Send + Unpin + 'static
{
    /// Table name (trusted, never user input)
    const TABLE: &'static str;
    /// Human-readable name used in error messages
    const LABEL: &'static str;
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub name_ar: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CatalogEntity for Category {
    const TABLE: &'static str = "categories";
    const LABEL: &'static str = "Category";
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryInput {
    pub name: String,
    pub name_ar: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub name_ar: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Design {
    pub id: i64,
    pub category_id: Option<i64>,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub base_price: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CatalogEntity for Design {
    const TABLE: &'static str = "designs";
    const LABEL: &'static str = "Design";
}

#[derive(Debug, Clone, Deserialize)]
pub struct DesignInput {
    pub category_id: Option<i64>,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub base_price: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DesignPatch {
    pub category_id: Option<i64>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub base_price: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Fabric {
    pub id: i64,
    pub name: String,
    pub material: Option<String>,
    pub price_per_meter: f64,
    pub in_stock: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CatalogEntity for Fabric {
    const TABLE: &'static str = "fabrics";
    const LABEL: &'static str = "Fabric";
}

#[derive(Debug, Clone, Deserialize)]
pub struct FabricInput {
    pub name: String,
    pub material: Option<String>,
    #[serde(default)]
    pub price_per_meter: f64,
    #[serde(default = "default_in_stock")]
    pub in_stock: bool,
}

fn default_in_stock() -> bool {
    true
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FabricPatch {
    pub name: Option<String>,
    pub material: Option<String>,
    pub price_per_meter: Option<f64>,
    pub in_stock: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Color {
    pub id: i64,
    pub name: String,
    pub hex_code: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CatalogEntity for Color {
    const TABLE: &'static str = "colors";
    const LABEL: &'static str = "Color";
}

#[derive(Debug, Clone, Deserialize)]
pub struct ColorInput {
    pub name: String,
    pub hex_code: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ColorPatch {
    pub name: Option<String>,
    pub hex_code: Option<String>,
}

// Field validation shared by create and update

pub fn validate_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("name must not be empty".to_string());
    }
    Ok(())
}

pub fn validate_price(field: &str, price: f64) -> Result<(), String> {
    if !price.is_finite() || price < 0.0 {
        return Err(format!("{} must be a non-negative number", field));
    }
    Ok(())
}

/// `#RRGGBB`
pub fn validate_hex_code(hex: &str) -> Result<(), String> {
    let valid = hex.len() == 7
        && hex.starts_with('#')
        && hex[1..].chars().all(|c| c.is_ascii_hexdigit());

    if !valid {
        return Err(format!("hex_code must look like #RRGGBB, got {:?}", hex));
    }
    Ok(())
}

impl CategoryInput {
    pub fn validate(&self) -> Result<(), String> {
        validate_name(&self.name)
    }
}

impl CategoryPatch {
    pub fn validate(&self) -> Result<(), String> {
        self.name.as_deref().map_or(Ok(()), validate_name)
    }
}

impl DesignInput {
    pub fn validate(&self) -> Result<(), String> {
        validate_name(&self.name)?;
        validate_price("base_price", self.base_price)
    }
}

impl DesignPatch {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(price) = self.base_price {
            validate_price("base_price", price)?;
        }
        Ok(())
    }
}

impl FabricInput {
    pub fn validate(&self) -> Result<(), String> {
        validate_name(&self.name)?;
        validate_price("price_per_meter", self.price_per_meter)
    }
}

impl FabricPatch {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(price) = self.price_per_meter {
            validate_price("price_per_meter", price)?;
        }
        Ok(())
    }
}

impl ColorInput {
    pub fn validate(&self) -> Result<(), String> {
        validate_name(&self.name)?;
        validate_hex_code(&self.hex_code)
    }
}

impl ColorPatch {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(hex) = &self.hex_code {
            validate_hex_code(hex)?;
        }
        Ok(())
    }
}

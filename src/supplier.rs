//! Client for the wholesale supplier catalog.
//!
//! Two endpoints: game top-up products and premium subscription services.
//! The premium list uses different field names (`service_id`,
//! `service_name`, `packages`), so both shapes are normalized into one
//! `CatalogItem` form before markup is applied. A supplier outage degrades
//! to an empty section with a warning; the storefront stays up.

use serde::Serialize;
use serde_json::Value;

use crate::config::Config;
use crate::error::Result;
use crate::models::money::{value_to_satang, Satang};

/// A sellable package inside a catalog item, priced at wholesale cost
#[derive(Debug, Clone, Serialize)]
pub struct CatalogPackage {
    pub id: String,
    pub name: String,
    /// Wholesale cost in satang; markup turns this into the resale price
    pub cost: Satang,
}

/// A game or premium service with its packages
#[derive(Debug, Clone, Serialize)]
pub struct CatalogItem {
    pub id: String,
    pub name: String,
    pub image: Option<String>,
    /// "game" or "premium"
    pub category: String,
    pub packages: Vec<CatalogPackage>,
}

fn str_field(item: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|k| item.get(*k).and_then(Value::as_str))
        .map(|s| s.to_string())
}

/// Normalize one package entry. Id falls back to the name, then to the
/// position, matching how the storefront keyed its markup settings.
fn normalize_package(pkg: &Value, idx: usize) -> Option<CatalogPackage> {
    let name = str_field(pkg, &["name", "service_name"])?;
    let id = str_field(pkg, &["id", "service_id"]).unwrap_or_else(|| name.clone());
    let id = if id.is_empty() {
        format!("pkg-{}", idx)
    } else {
        id
    };

    let cost = pkg
        .get("price")
        .or_else(|| pkg.get("amount"))
        .map(value_to_satang)?
        .ok()?;

    Some(CatalogPackage { id, name, cost })
}

/// Normalize one catalog entry from either endpoint shape
fn normalize_item(item: &Value, category: &str) -> Option<CatalogItem> {
    let name = str_field(item, &["name", "service_name"])?;
    let id = str_field(item, &["id", "service_id"]).unwrap_or_else(|| name.clone());
    let image = str_field(item, &["image", "icon"]);

    let packages = item
        .get("services")
        .or_else(|| item.get("packages"))
        .or_else(|| item.get("items"))
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .enumerate()
                .filter_map(|(idx, pkg)| normalize_package(pkg, idx))
                .collect()
        })
        .unwrap_or_default();

    Some(CatalogItem {
        id,
        name,
        image,
        category: category.to_string(),
        packages,
    })
}

/// Supplier catalog client
#[derive(Clone)]
pub struct SupplierCatalog {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl SupplierCatalog {
    pub fn new(http: reqwest::Client, config: &Config) -> Self {
        Self {
            http,
            base_url: config.supplier_api_url.clone(),
            api_key: config.supplier_api_key.clone(),
        }
    }

    async fn fetch_list(&self, path: &str) -> Result<Vec<Value>> {
        let body: Value = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .header("X-API-Key", &self.api_key)
            .send()
            .await?
            .json()
            .await?;

        match body {
            Value::Array(items) => Ok(items),
            other => {
                tracing::warn!("Supplier returned non-array data from {}: {}", path, other);
                Ok(Vec::new())
            }
        }
    }

    /// Fetch and merge both catalog sections. Either section failing
    /// yields an empty list for that section, never an error.
    pub async fn fetch_catalog(&self) -> Vec<CatalogItem> {
        let games = match self.fetch_list("/api/v1/products/list").await {
            Ok(items) => items
                .iter()
                .filter_map(|item| normalize_item(item, "game"))
                .collect(),
            Err(e) => {
                tracing::warn!("Failed to fetch games catalog (using empty list): {}", e);
                Vec::new()
            }
        };

        let premium: Vec<CatalogItem> = match self.fetch_list("/api/v1/premium/services/list").await
        {
            Ok(items) => items
                .iter()
                .filter_map(|item| normalize_item(item, "premium"))
                .collect(),
            Err(e) => {
                tracing::warn!("Failed to fetch premium catalog (using empty list): {}", e);
                Vec::new()
            }
        };

        let mut catalog = games;
        catalog.extend(premium);
        catalog
    }
}

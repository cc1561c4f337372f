use std::collections::HashMap;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::error::Result;
use crate::models::{PackageSetting, ProductSetting};
use crate::supplier::CatalogItem;
use crate::AppState;

/// A package priced for resale
#[derive(Debug, Serialize)]
pub struct PricedPackage {
    pub id: String,
    pub name: String,
    /// Resale price in satang, always a whole baht
    pub price: i64,
}

/// Catalog item with resale prices and game-level overrides applied
#[derive(Debug, Serialize)]
pub struct PricedItem {
    pub id: String,
    pub name: String,
    pub image: Option<String>,
    pub category: String,
    pub is_popular: bool,
    pub packages: Vec<PricedPackage>,
}

/// Apply game and markup settings to the wholesale catalog.
///
/// Both setting kinds are keyed by the supplier's game name, the way the
/// store admin configures them. Games marked inactive disappear entirely;
/// custom name/image override the supplier's. Packages marked inactive are
/// dropped; a package with no setting sells at ceil(cost).
pub fn price_catalog(
    catalog: Vec<CatalogItem>,
    games: &HashMap<String, ProductSetting>,
    packages: &HashMap<(String, String), PackageSetting>,
) -> Vec<PricedItem> {
    catalog
        .into_iter()
        .filter_map(|item| {
            let game = games.get(&item.name);
            if game.is_some_and(|g| !g.is_active) {
                return None;
            }

            let priced_packages = item
                .packages
                .iter()
                .filter_map(|pkg| {
                    let setting = packages.get(&(item.name.clone(), pkg.id.clone()));
                    if setting.is_some_and(|s| !s.active) {
                        return None;
                    }
                    let price = match setting {
                        Some(s) => s.apply(pkg.cost),
                        None => crate::models::money::ceil_to_baht(pkg.cost),
                    };
                    Some(PricedPackage {
                        id: pkg.id.clone(),
                        name: pkg.name.clone(),
                        price,
                    })
                })
                .collect();

            let name = game
                .and_then(|g| g.custom_name.clone())
                .unwrap_or_else(|| item.name.clone());
            let image = game
                .and_then(|g| g.custom_image.clone())
                .or_else(|| item.image.clone());

            Some(PricedItem {
                id: item.id,
                name,
                image,
                category: item.category,
                is_popular: game.is_some_and(|g| g.is_popular),
                packages: priced_packages,
            })
        })
        .collect()
}

/// Public catalog endpoint: supplier lists merged, filtered, and marked up.
///
/// GET /api/products
pub async fn list_products(State(state): State<AppState>) -> Result<Json<Vec<PricedItem>>> {
    let catalog = state.supplier.fetch_catalog().await;

    let game_rows: Vec<ProductSetting> = sqlx::query_as(
        "SELECT game_id, custom_name, custom_image, is_active, is_popular FROM products",
    )
    .fetch_all(&state.pool)
    .await?;

    let package_rows: Vec<PackageSetting> = sqlx::query_as(
        "SELECT game_id, package_id, markup_type, markup_value, active FROM package_settings",
    )
    .fetch_all(&state.pool)
    .await?;

    let games: HashMap<String, ProductSetting> = game_rows
        .into_iter()
        .map(|s| (s.game_id.clone(), s))
        .collect();

    let packages: HashMap<(String, String), PackageSetting> = package_rows
        .into_iter()
        .map(|s| ((s.game_id.clone(), s.package_id.clone()), s))
        .collect();

    Ok(Json(price_catalog(catalog, &games, &packages)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::supplier::CatalogPackage;

    fn catalog_item() -> CatalogItem {
        CatalogItem {
            id: "genshin".to_string(),
            name: "Genshin Impact".to_string(),
            image: Some("https://cdn.example/genshin.png".to_string()),
            category: "game".to_string(),
            packages: vec![
                CatalogPackage {
                    id: "60-crystals".to_string(),
                    name: "60 Crystals".to_string(),
                    cost: 4500,
                },
                CatalogPackage {
                    id: "300-crystals".to_string(),
                    name: "300 Crystals".to_string(),
                    cost: 21900,
                },
            ],
        }
    }

    fn game_setting(active: bool, popular: bool) -> ProductSetting {
        ProductSetting {
            game_id: "Genshin Impact".to_string(),
            custom_name: None,
            custom_image: None,
            is_active: active,
            is_popular: popular,
        }
    }

    fn pkg_setting(pkg: &str, markup_type: &str, value: i64, active: bool) -> PackageSetting {
        PackageSetting {
            game_id: "Genshin Impact".to_string(),
            package_id: pkg.to_string(),
            markup_type: markup_type.to_string(),
            markup_value: value,
            active,
        }
    }

    #[test]
    fn test_price_catalog_applies_markup() {
        let games = HashMap::new();
        let mut packages = HashMap::new();
        packages.insert(
            ("Genshin Impact".to_string(), "60-crystals".to_string()),
            pkg_setting("60-crystals", "fixed", 500, true),
        );

        let priced = price_catalog(vec![catalog_item()], &games, &packages);
        assert_eq!(priced[0].packages[0].price, 5000);
        // No setting: cost passes through (already whole baht)
        assert_eq!(priced[0].packages[1].price, 21900);
        // No game setting: visible, not popular
        assert!(!priced[0].is_popular);
    }

    #[test]
    fn test_price_catalog_drops_inactive_package() {
        let games = HashMap::new();
        let mut packages = HashMap::new();
        packages.insert(
            ("Genshin Impact".to_string(), "60-crystals".to_string()),
            pkg_setting("60-crystals", "fixed", 0, false),
        );

        let priced = price_catalog(vec![catalog_item()], &games, &packages);
        assert_eq!(priced[0].packages.len(), 1);
        assert_eq!(priced[0].packages[0].id, "300-crystals");
    }

    #[test]
    fn test_price_catalog_drops_inactive_game() {
        let mut games = HashMap::new();
        games.insert("Genshin Impact".to_string(), game_setting(false, false));

        let priced = price_catalog(vec![catalog_item()], &games, &HashMap::new());
        assert!(priced.is_empty());
    }

    #[test]
    fn test_price_catalog_game_overrides() {
        let mut games = HashMap::new();
        let mut setting = game_setting(true, true);
        setting.custom_name = Some("Genshin (Top-up)".to_string());
        setting.custom_image = Some("https://cdn.example/custom.png".to_string());
        games.insert("Genshin Impact".to_string(), setting);

        let priced = price_catalog(vec![catalog_item()], &games, &HashMap::new());
        assert_eq!(priced[0].name, "Genshin (Top-up)");
        assert_eq!(
            priced[0].image.as_deref(),
            Some("https://cdn.example/custom.png")
        );
        assert!(priced[0].is_popular);
    }
}

//! Tests for the storefront's verification and pricing logic.
//!
//! Handlers themselves need a live Postgres, so these tests cover the pure
//! seams the handlers are built from: webhook signatures, signed client
//! requests, money parsing, and markup pricing.

use std::collections::HashMap;

use hmac::{Hmac, Mac};
use sha2::Sha256;

use topup_store_server::models::money::{format_baht, parse_baht, parse_satang};
use topup_store_server::models::pricing::{resale_price, MarkupType, PackageSetting, ProductSetting};
use topup_store_server::routes::products::price_catalog;
use topup_store_server::routes::webhook::{normalize_payment_event, parse_signed_payload};
use topup_store_server::routes::{signed_payload, validate_signed_request};
use topup_store_server::security::{gateway_signature, verify_gateway_signature};
use topup_store_server::supplier::{CatalogItem, CatalogPackage};

const TEST_SECRET: &str = "test-secret-key";
const TEST_GATEWAY_KEY: &str = "test-gateway-api-key";

/// Sign data the way the official client app does
fn app_signature(data: &str, secret: &str) -> String {
    type HmacSha256 = Hmac<Sha256>;
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(data.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

// =============================================================================
// Gateway webhook verification
// =============================================================================

#[test]
fn test_webhook_signature_round_trip() {
    // The gateway signs the raw JSON string; any whitespace difference
    // must break verification
    let data = r#"{"id_pay":"754349","ref1":"user-1","amount_check":"1901","amount":"19.00"}"#;
    let signature = gateway_signature(data, TEST_GATEWAY_KEY);

    assert!(verify_gateway_signature(data, &signature, TEST_GATEWAY_KEY));

    let reserialized = r#"{"id_pay": "754349", "ref1": "user-1"}"#;
    assert!(!verify_gateway_signature(
        reserialized,
        &signature,
        TEST_GATEWAY_KEY
    ));
    assert!(!verify_gateway_signature(data, &signature, "other-key"));
}

#[test]
fn test_webhook_payload_parses_to_satang() {
    let data = r#"{"id_pay":"754349","ref1":"user-1","amount":"19.00","date_pay":"2024-06-01 10:00:00"}"#;
    let (id_pay, ref1, amount) = parse_signed_payload(data).unwrap();

    assert_eq!(id_pay, "754349");
    assert_eq!(ref1.as_deref(), Some("user-1"));
    assert_eq!(amount, 1900);
    assert_eq!(format_baht(amount), "19.00");
}

#[test]
fn test_webhook_rejects_negative_amount() {
    let data = r#"{"id_pay":"754349","amount":"-19.00"}"#;
    assert!(parse_signed_payload(data).is_err());
}

#[test]
fn test_payment_event_shapes() {
    // Both webhook variants: flat and nested, string and numeric status
    let flat = serde_json::json!({
        "trans_id": "TOP-1700000000000",
        "payment_status": "completed",
        "amount": "50.00"
    });
    let event = normalize_payment_event(&flat).unwrap();
    assert!(event.completed);
    assert_eq!(event.ref_no, "TOP-1700000000000");
    assert_eq!(event.amount, 5000);

    let nested = serde_json::json!({
        "data": { "ref1": "TOP-1700000000001", "status": 1, "amount": 50 }
    });
    let event = normalize_payment_event(&nested).unwrap();
    assert!(event.completed);
    assert_eq!(event.amount, 5000);

    let failed = serde_json::json!({
        "ref1": "TOP-1700000000002", "payment_status": "expired", "amount": 50
    });
    assert!(!normalize_payment_event(&failed).unwrap().completed);
}

// =============================================================================
// Signed client requests
// =============================================================================

#[test]
fn test_signed_order_request_accepted() {
    let timestamp = chrono::Utc::now().timestamp();
    let data = signed_payload("user-1", 4500, timestamp);
    let signature = app_signature(&data, TEST_SECRET);

    assert!(validate_signed_request(&data, &signature, timestamp, TEST_SECRET).is_ok());
}

#[test]
fn test_signed_request_amount_is_bound() {
    // A signature over one amount must not authorize another
    let timestamp = chrono::Utc::now().timestamp();
    let signature = app_signature(&signed_payload("user-1", 4500, timestamp), TEST_SECRET);

    let tampered = signed_payload("user-1", 100, timestamp);
    assert!(validate_signed_request(&tampered, &signature, timestamp, TEST_SECRET).is_err());
}

#[test]
fn test_signed_request_replay_window() {
    let stale = chrono::Utc::now().timestamp() - 600;
    let data = signed_payload("user-1", 4500, stale);
    let signature = app_signature(&data, TEST_SECRET);

    assert!(validate_signed_request(&data, &signature, stale, TEST_SECRET).is_err());
}

// =============================================================================
// Money and markup
// =============================================================================

#[test]
fn test_money_boundary_parsing() {
    // Gateway reports baht as decimal strings and amount_check as satang
    assert_eq!(parse_baht("19.00").unwrap(), 1900);
    assert_eq!(parse_satang("1901").unwrap(), 1901);
    // The salted satang digits differ from the requested amount
    assert_ne!(parse_baht("19.00").unwrap(), parse_satang("1901").unwrap());
}

#[test]
fn test_markup_arithmetic() {
    // ceil(cost + markup), fixed and percent
    assert_eq!(resale_price(4500, MarkupType::Fixed, 500), 5000);
    assert_eq!(resale_price(4500, MarkupType::Percent, 10), 5000);
    assert_eq!(resale_price(1900, MarkupType::Percent, 5), 2000);
    assert_eq!(resale_price(1900, MarkupType::Fixed, 0), 1900);
}

#[test]
fn test_catalog_pricing_end_to_end() {
    let catalog = vec![CatalogItem {
        id: "genshin".to_string(),
        name: "Genshin Impact".to_string(),
        image: None,
        category: "game".to_string(),
        packages: vec![
            CatalogPackage {
                id: "60-crystals".to_string(),
                name: "60 Crystals".to_string(),
                cost: 4500,
            },
            CatalogPackage {
                id: "retired".to_string(),
                name: "Retired Pack".to_string(),
                cost: 100,
            },
        ],
    }];

    let mut settings = HashMap::new();
    settings.insert(
        ("Genshin Impact".to_string(), "60-crystals".to_string()),
        PackageSetting {
            game_id: "Genshin Impact".to_string(),
            package_id: "60-crystals".to_string(),
            markup_type: "percent".to_string(),
            markup_value: 10,
            active: true,
        },
    );
    settings.insert(
        ("Genshin Impact".to_string(), "retired".to_string()),
        PackageSetting {
            game_id: "Genshin Impact".to_string(),
            package_id: "retired".to_string(),
            markup_type: "fixed".to_string(),
            markup_value: 0,
            active: false,
        },
    );

    let priced = price_catalog(catalog, &HashMap::new(), &settings);
    assert_eq!(priced.len(), 1);
    // 45.00 + 10% = 49.50 -> 50.00, and the inactive package is gone
    assert_eq!(priced[0].packages.len(), 1);
    assert_eq!(priced[0].packages[0].price, 5000);
}

#[test]
fn test_catalog_game_overrides_end_to_end() {
    let catalog = vec![
        CatalogItem {
            id: "genshin".to_string(),
            name: "Genshin Impact".to_string(),
            image: Some("https://supplier.example/genshin.png".to_string()),
            category: "game".to_string(),
            packages: vec![CatalogPackage {
                id: "60-crystals".to_string(),
                name: "60 Crystals".to_string(),
                cost: 4500,
            }],
        },
        CatalogItem {
            id: "delisted".to_string(),
            name: "Delisted Game".to_string(),
            image: None,
            category: "game".to_string(),
            packages: vec![],
        },
    ];

    let mut games = HashMap::new();
    games.insert(
        "Genshin Impact".to_string(),
        ProductSetting {
            game_id: "Genshin Impact".to_string(),
            custom_name: Some("Genshin (Instant)".to_string()),
            custom_image: None,
            is_active: true,
            is_popular: true,
        },
    );
    games.insert(
        "Delisted Game".to_string(),
        ProductSetting {
            game_id: "Delisted Game".to_string(),
            custom_name: None,
            custom_image: None,
            is_active: false,
            is_popular: false,
        },
    );

    let priced = price_catalog(catalog, &games, &HashMap::new());

    // Inactive game is gone entirely
    assert_eq!(priced.len(), 1);
    // Custom name replaces the supplier's; the supplier image survives
    // because no custom image is set
    assert_eq!(priced[0].name, "Genshin (Instant)");
    assert_eq!(
        priced[0].image.as_deref(),
        Some("https://supplier.example/genshin.png")
    );
    assert!(priced[0].is_popular);
}

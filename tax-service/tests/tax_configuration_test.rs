//! Tax configuration tests for tax-service.

mod common;

use common::{date, dec, test_user, MemoryStore};
use tax_service::models::{NewTaxConfiguration, TaxType};
use tax_service::services::TaxStore;

#[tokio::test]
async fn first_configuration_becomes_active() {
    let user = test_user();
    let store = MemoryStore::new();

    let created = store
        .create_tax_configuration(NewTaxConfiguration::nz_gst(user, date(2020, 1, 1)))
        .await
        .expect("Failed to create configuration");

    assert!(created.active);
    assert_eq!(created.rate, dec("0.15"));
    assert_eq!(created.effective_to, None);

    let active = store
        .active_tax_configuration(user, "NZ", TaxType::Gst)
        .await
        .expect("Lookup failed")
        .expect("Expected an active configuration");
    assert_eq!(active.tax_config_id, created.tax_config_id);
}

#[tokio::test]
async fn rate_change_supersedes_the_active_configuration() {
    let user = test_user();
    let store = MemoryStore::new();

    let original = store
        .create_tax_configuration(NewTaxConfiguration::nz_gst(user, date(2020, 1, 1)))
        .await
        .expect("Failed to create configuration");

    let replacement = store
        .create_tax_configuration(NewTaxConfiguration {
            rate: dec("0.16"),
            name: "GST (revised)".to_string(),
            ..NewTaxConfiguration::nz_gst(user, date(2024, 4, 1))
        })
        .await
        .expect("Failed to create replacement");

    // The old row is closed off the day before the new rate starts.
    let rows = store.configs_for(user);
    let superseded = rows
        .iter()
        .find(|c| c.tax_config_id == original.tax_config_id)
        .expect("Original row should still exist");
    assert!(!superseded.active);
    assert_eq!(superseded.effective_to, Some(date(2024, 3, 31)));

    let active = store
        .active_tax_configuration(user, "NZ", TaxType::Gst)
        .await
        .expect("Lookup failed")
        .expect("Expected an active configuration");
    assert_eq!(active.tax_config_id, replacement.tax_config_id);
    assert_eq!(active.rate, dec("0.16"));
}

#[tokio::test]
async fn selection_respects_the_effective_date_range() {
    let user = test_user();
    let store = MemoryStore::new();

    // Active flag alone is not enough: the row must also cover today.
    store
        .create_tax_configuration(NewTaxConfiguration {
            effective_to: Some(date(2021, 12, 31)),
            ..NewTaxConfiguration::nz_gst(user, date(2020, 1, 1))
        })
        .await
        .expect("Failed to create expired configuration");

    let active = store
        .active_tax_configuration(user, "NZ", TaxType::Gst)
        .await
        .expect("Lookup failed");
    assert!(active.is_none());
}

#[tokio::test]
async fn unconfigured_user_has_no_active_configuration() {
    let store = MemoryStore::new();

    let active = store
        .active_tax_configuration(test_user(), "NZ", TaxType::Gst)
        .await
        .expect("Lookup failed");

    assert!(active.is_none());
}

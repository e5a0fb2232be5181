//! Tax return lifecycle tests for tax-service.

mod common;

use std::sync::Arc;

use common::{date, dec, gst_config, invoice, test_user, MemoryStore};
use tax_service::error::TaxError;
use tax_service::models::{InvoiceStatus, TaxReturn, UpdateTaxReturn};
use tax_service::services::returns::ReturnService;
use tax_service::services::SimulatedIrdGateway;
use uuid::Uuid;

async fn draft_return(store: Arc<MemoryStore>) -> (ReturnService, TaxReturn) {
    let user = test_user();
    store.add_config(gst_config(user));
    store.add_invoice(invoice(user, "115.00", InvoiceStatus::Paid, date(2025, 2, 1)));

    let svc = ReturnService::new(store, Arc::new(SimulatedIrdGateway));
    let tax_return = svc
        .generate_gst_return(user, date(2025, 1, 1), date(2025, 3, 31))
        .await
        .expect("Failed to generate GST return");
    (svc, tax_return)
}

#[tokio::test]
async fn submitting_a_draft_stamps_the_ird_reference() {
    let store = Arc::new(MemoryStore::new());
    let (svc, draft) = draft_return(store).await;

    let submitted = svc
        .submit_tax_return(draft.tax_return_id)
        .await
        .expect("Failed to submit");

    assert!(!submitted.is_draft());
    assert_eq!(submitted.status, "submitted");
    let reference = submitted.ird_reference.expect("Missing IRD reference");
    assert!(reference.starts_with("IRD-"));
    assert_eq!(reference.len(), 16);
    assert!(submitted.submitted_utc.is_some());
}

#[tokio::test]
async fn a_return_can_only_be_submitted_once() {
    let store = Arc::new(MemoryStore::new());
    let (svc, draft) = draft_return(store).await;

    svc.submit_tax_return(draft.tax_return_id)
        .await
        .expect("First submission should succeed");

    let result = svc.submit_tax_return(draft.tax_return_id).await;

    assert!(matches!(
        result,
        Err(TaxError::InvalidStateTransition(ref msg))
            if msg == "Only draft tax returns can be submitted"
    ));
}

#[tokio::test]
async fn submitting_an_unknown_return_is_not_found() {
    let store = Arc::new(MemoryStore::new());
    let svc = ReturnService::new(store, Arc::new(SimulatedIrdGateway));

    let result = svc.submit_tax_return(Uuid::new_v4()).await;

    assert!(matches!(result, Err(TaxError::Store(_))));
}

#[tokio::test]
async fn a_draft_can_be_updated() {
    let store = Arc::new(MemoryStore::new());
    let (svc, draft) = draft_return(store).await;

    let updated = svc
        .update_tax_return(
            draft.tax_return_id,
            UpdateTaxReturn {
                net_gst: Some(dec("99.00")),
                ..Default::default()
            },
        )
        .await
        .expect("Failed to update draft");

    assert_eq!(updated.net_gst, dec("99.00"));
    // Untouched fields keep their values.
    assert_eq!(updated.total_sales, draft.total_sales);
}

#[tokio::test]
async fn a_submitted_return_cannot_be_updated() {
    let store = Arc::new(MemoryStore::new());
    let (svc, draft) = draft_return(store).await;
    svc.submit_tax_return(draft.tax_return_id)
        .await
        .expect("Failed to submit");

    let result = svc
        .update_tax_return(
            draft.tax_return_id,
            UpdateTaxReturn {
                net_gst: Some(dec("0.00")),
                ..Default::default()
            },
        )
        .await;

    assert!(matches!(result, Err(TaxError::InvalidStateTransition(_))));
}

#[tokio::test]
async fn a_draft_can_be_deleted() {
    let store = Arc::new(MemoryStore::new());
    let (svc, draft) = draft_return(Arc::clone(&store)).await;

    svc.delete_tax_return(draft.tax_return_id)
        .await
        .expect("Failed to delete draft");

    use tax_service::services::TaxStore;
    let gone = store
        .get_tax_return(draft.tax_return_id)
        .await
        .expect("Store lookup failed");
    assert!(gone.is_none());
}

#[tokio::test]
async fn a_submitted_return_cannot_be_deleted() {
    let store = Arc::new(MemoryStore::new());
    let (svc, draft) = draft_return(store).await;
    svc.submit_tax_return(draft.tax_return_id)
        .await
        .expect("Failed to submit");

    let result = svc.delete_tax_return(draft.tax_return_id).await;

    assert!(matches!(result, Err(TaxError::InvalidStateTransition(_))));
}

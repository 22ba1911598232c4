use crate::server::{
    data::{order::OrderRepository, payment::PaymentRepository},
    model::payment::PaymentStatus,
};
use chrono::Utc;
use sea_orm::DbErr;
use test_utils::{builder::TestBuilder, factory};

/// Tests settling a pending payment.
///
/// Expected: Ok(true), status PAID with gateway details and linked order IDs
#[tokio::test]
async fn settles_pending_payment() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_order_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let (customer, _shop, _address, _product, order) =
        factory::helpers::create_order_with_dependencies(db).await?;
    let payment = factory::payment::create_pending_payment(db, customer.id, 65_000).await?;
    OrderRepository::new(db)
        .attach_payment(vec![order.id], payment.id, false)
        .await?;

    let repo = PaymentRepository::new(db);
    let settled = repo
        .settle(
            payment.id,
            PaymentStatus::Paid,
            Some("14000001".to_string()),
            Some("00".to_string()),
            Utc::now(),
        )
        .await?;

    assert!(settled);
    let found = repo.find_by_txn_ref(&payment.txn_ref).await?.unwrap();
    assert_eq!(found.status, PaymentStatus::Paid);
    assert_eq!(found.gateway_transaction_no.as_deref(), Some("14000001"));
    assert!(found.paid_at.is_some());
    assert_eq!(found.order_ids, vec![order.id]);

    Ok(())
}

/// Tests that an already settled payment is left alone.
///
/// Repeated gateway callbacks must not flip a PAID payment to FAILED.
///
/// Expected: second settle returns Ok(false) and status stays PAID
#[tokio::test]
async fn ignores_second_settlement() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_order_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let customer = factory::create_user(db).await?;
    let payment = factory::payment::create_pending_payment(db, customer.id, 10_000).await?;

    let repo = PaymentRepository::new(db);
    assert!(
        repo.settle(payment.id, PaymentStatus::Paid, None, Some("00".into()), Utc::now())
            .await?
    );
    assert!(
        !repo
            .settle(payment.id, PaymentStatus::Failed, None, Some("24".into()), Utc::now())
            .await?
    );

    let found = repo.find_by_id(payment.id).await?.unwrap();
    assert_eq!(found.status, PaymentStatus::Paid);

    Ok(())
}

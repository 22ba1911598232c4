use super::*;

/// Tests linking orders to a payment and marking them paid afterwards.
///
/// Expected: orders reference the payment, start unpaid and become paid
#[tokio::test]
async fn attaches_and_marks_paid() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_order_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let (customer, _shop, _address, _product, order) =
        factory::helpers::create_order_with_dependencies(db).await?;
    let payment = factory::payment::create_pending_payment(db, customer.id, 65_000).await?;

    let repo = OrderRepository::new(db);
    repo.attach_payment(vec![order.id], payment.id, false).await?;

    let linked = repo.list_by_payment(payment.id).await?;
    assert_eq!(linked.len(), 1);
    assert!(!linked[0].is_paid);

    let ids = repo.ids_by_payments(vec![payment.id]).await?;
    assert_eq!(ids.get(&payment.id), Some(&vec![order.id]));

    let updated = repo.mark_paid_by_payment(payment.id).await?;
    assert_eq!(updated, 1);
    assert!(repo.find_by_id(order.id).await?.unwrap().is_paid);

    Ok(())
}

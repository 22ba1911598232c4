use crate::server::data::address::AddressRepository;
use sea_orm::DbErr;
use test_utils::{builder::TestBuilder, factory};

/// Tests that switching the default leaves exactly one default address.
///
/// Expected: only the newly flagged address is default
#[tokio::test]
async fn switches_default_address() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_order_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let customer = factory::create_user(db).await?;
    let first = factory::create_address(db, customer.id).await?;
    let second = factory::address::AddressFactory::new(db, customer.id)
        .is_default(false)
        .build()
        .await?;

    let repo = AddressRepository::new(db);
    repo.clear_default(customer.id).await?;
    repo.mark_default(second.id).await?;

    let addresses = repo.list_by_user(customer.id).await?;
    let defaults: Vec<i32> = addresses
        .iter()
        .filter(|a| a.is_default)
        .map(|a| a.id)
        .collect();

    assert_eq!(defaults, vec![second.id]);
    assert_eq!(addresses[0].id, second.id);
    assert!(addresses.iter().any(|a| a.id == first.id && !a.is_default));

    Ok(())
}

/// Tests that an address without coordinates maps to `None`.
///
/// Expected: coordinates is None
#[tokio::test]
async fn missing_coordinates_are_none() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_order_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let customer = factory::create_user(db).await?;
    let address = factory::address::AddressFactory::new(db, customer.id)
        .coordinates(None)
        .build()
        .await?;

    let repo = AddressRepository::new(db);
    let found = repo.find_by_id(address.id).await?.unwrap();

    assert!(found.coordinates.is_none());

    Ok(())
}

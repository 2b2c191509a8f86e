mod common;

use checkin_store::{StoreError, model::NewClient, store};
use common::{date, new_client, pool, seed_demo};

#[tokio::test]
async fn create_client_with_and_without_location() {
    let pool = pool().await;

    let abc = store::create_client(
        &pool,
        new_client("ABC Corp", "Cyber City, Gurugram", 28.4946, 77.0887),
    )
    .await
    .unwrap();
    assert_eq!(abc.address.as_deref(), Some("Cyber City, Gurugram"));
    assert_eq!(abc.location().map(|c| c.latitude), Some(28.4946));

    let bare = store::create_client(
        &pool,
        NewClient { name: "Walk-in".to_string(), ..NewClient::default() },
    )
    .await
    .unwrap();
    assert_eq!(bare.address, None);
    assert!(bare.location().is_none());

    assert_eq!(store::get_client(&pool, abc.id).await.unwrap().name, "ABC Corp");
    assert!(store::get_client(&pool, 404).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn clients_are_listed_by_name() {
    let pool = pool().await;
    seed_demo(&pool).await;

    let names: Vec<_> = store::list_clients(&pool)
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(
        names,
        ["ABC Corp", "Global Services", "Innovate Inc", "Tech Solutions", "XYZ Ltd"]
    );
}

#[tokio::test]
async fn referenced_client_cannot_be_deleted() {
    let pool = pool().await;
    let demo = seed_demo(&pool).await;

    let err = store::delete_client(&pool, demo.abc_corp).await.unwrap_err();
    assert!(matches!(err, StoreError::InvalidState(_)), "got {err:?}");
    assert!(store::get_client(&pool, demo.abc_corp).await.is_ok());

    let err = store::delete_client(&pool, 404).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)), "got {err:?}");

    let spare = store::create_client(
        &pool,
        new_client("Spare Site", "Sector 29, Gurugram", 28.4700, 77.0600),
    )
    .await
    .unwrap();
    store::delete_client(&pool, spare.id).await.unwrap();
    assert!(store::get_client(&pool, spare.id).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn assignment_requires_existing_rows() {
    let pool = pool().await;
    let demo = seed_demo(&pool).await;

    let err = store::assign_employee(&pool, 404, demo.abc_corp, date(2024, 2, 1))
        .await
        .unwrap_err();
    match err {
        StoreError::InvalidReference(msg) => assert!(msg.contains("employee 404"), "{msg}"),
        other => panic!("expected InvalidReference, got {other:?}"),
    }

    let err = store::assign_employee(&pool, demo.rahul, 404, date(2024, 2, 1))
        .await
        .unwrap_err();
    match err {
        StoreError::InvalidReference(msg) => assert!(msg.contains("client 404"), "{msg}"),
        other => panic!("expected InvalidReference, got {other:?}"),
    }

    assert!(!store::is_assigned(&pool, demo.rahul, 404).await.unwrap());
}

#[tokio::test]
async fn assigned_clients_for_employee() {
    let pool = pool().await;
    let demo = seed_demo(&pool).await;

    let assigned = store::list_assigned_clients(&pool, demo.rahul).await.unwrap();
    let names: Vec<_> = assigned.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, ["ABC Corp", "Tech Solutions", "XYZ Ltd"]);
    assert_eq!(assigned[1].assigned_date, date(2024, 1, 15));
    assert_eq!(assigned[1].client_id, demo.tech_solutions);

    assert!(store::is_assigned(&pool, demo.priya, demo.global_services).await.unwrap());
    assert!(!store::is_assigned(&pool, demo.priya, demo.innovate_inc).await.unwrap());
    assert!(store::list_assigned_clients(&pool, demo.amit).await.unwrap().is_empty());
}

#[tokio::test]
async fn repeated_assignment_is_kept() {
    let pool = pool().await;
    let demo = seed_demo(&pool).await;

    let again = store::assign_employee(&pool, demo.vikram, demo.innovate_inc, date(2024, 3, 1))
        .await
        .unwrap();
    assert_eq!(again.employee_id, demo.vikram);
    assert_eq!(again.client_id, demo.innovate_inc);

    let rows: Vec<_> = store::list_assigned_clients(&pool, demo.vikram)
        .await
        .unwrap()
        .into_iter()
        .filter(|a| a.client_id == demo.innovate_inc)
        .map(|a| a.assigned_date)
        .collect();
    assert_eq!(rows, [date(2024, 1, 10), date(2024, 3, 1)]);
}

mod common;

use chrono::{NaiveDate, Utc};
use people_service::domain::entities::{
    Address, AddressKind, Employee, EmployeeStatus, EmployeeUpdate,
};
use people_service::domain::repositories::{EmployeeFilter, EmployeeRepository, EmployeeSort};
use people_service::error::AppError;
use people_service::infrastructure::persistence::PgEmployeeRepository;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

fn employee(email: &str, username: &str) -> Employee {
    let now = Utc::now();
    Employee {
        id: Uuid::new_v4(),
        subject_id: format!("subject-{username}"),
        username: username.to_string(),
        first_name: "Jane".to_string(),
        last_name: "Doe".to_string(),
        email: email.to_string(),
        phone: Some("+421900123456".to_string()),
        status: EmployeeStatus::Active,
        started_work: NaiveDate::from_ymd_opt(2024, 3, 1),
        end_work: None,
        termination_reason: None,
        version: 0,
        created_at: now,
        updated_at: now,
        created_by: None,
        updated_by: None,
    }
}

fn address_for(employee: &Employee) -> Address {
    let now = Utc::now();
    Address {
        id: Uuid::new_v4(),
        employee_id: employee.id,
        kind: AddressKind::Home,
        street: Some("Main St 1".to_string()),
        city: Some("Springfield".to_string()),
        postal_code: Some("12345".to_string()),
        country: Some("USA".to_string()),
        created_at: now,
        updated_at: now,
    }
}

#[sqlx::test]
async fn test_insert_and_find(pool: PgPool) {
    let repo = PgEmployeeRepository::new(Arc::new(pool));

    let new = employee("jane@example.com", "jdoe");
    let addresses = vec![address_for(&new)];

    repo.insert(&new, &addresses).await.unwrap();

    let found = repo.find_by_id(new.id).await.unwrap().unwrap();
    assert_eq!(found.email, "jane@example.com");
    assert_eq!(found.status, EmployeeStatus::Active);
    assert_eq!(found.version, 0);

    let stored_addresses = repo.addresses_for(new.id).await.unwrap();
    assert_eq!(stored_addresses.len(), 1);
    assert_eq!(stored_addresses[0].kind, AddressKind::Home);
    assert_eq!(stored_addresses[0].full_address(), "Main St 1, Springfield, 12345, USA");
}

#[sqlx::test]
async fn test_find_missing_returns_none(pool: PgPool) {
    let repo = PgEmployeeRepository::new(Arc::new(pool));

    let found = repo.find_by_id(Uuid::new_v4()).await.unwrap();
    assert!(found.is_none());
}

#[sqlx::test]
async fn test_insert_duplicate_email_is_conflict(pool: PgPool) {
    let repo = PgEmployeeRepository::new(Arc::new(pool));

    repo.insert(&employee("dup@example.com", "first"), &[])
        .await
        .unwrap();

    let result = repo.insert(&employee("dup@example.com", "second"), &[]).await;

    assert!(matches!(result.unwrap_err(), AppError::Conflict { .. }));
}

#[sqlx::test]
async fn test_insert_rolls_back_employee_on_address_failure(pool: PgPool) {
    let repo = PgEmployeeRepository::new(Arc::new(pool.clone()));

    let new = employee("tx@example.com", "txuser");
    let mut address = address_for(&new);
    // Point the address at a non-existent employee to violate the FK.
    address.employee_id = Uuid::new_v4();

    let result = repo.insert(&new, &[address]).await;
    assert!(result.is_err());

    // The employee insert was rolled back with it.
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM employees WHERE email = 'tx@example.com'")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(count, 0);
}

#[sqlx::test]
async fn test_exists_checks_are_case_insensitive(pool: PgPool) {
    let repo = PgEmployeeRepository::new(Arc::new(pool));

    repo.insert(&employee("case@example.com", "casey"), &[])
        .await
        .unwrap();

    assert!(repo.exists_by_email("CASE@example.com").await.unwrap());
    assert!(repo.exists_by_username("CASEY").await.unwrap());
    assert!(!repo.exists_by_email("other@example.com").await.unwrap());
    assert!(!repo.exists_by_username("other").await.unwrap());
}

#[sqlx::test]
async fn test_list_filters_and_sorting(pool: PgPool) {
    let repo = PgEmployeeRepository::new(Arc::new(pool));

    let mut alice = employee("alice@example.com", "alice");
    alice.first_name = "Alice".to_string();
    alice.last_name = "Adams".to_string();

    let mut bob = employee("bob@example.com", "bob");
    bob.first_name = "Bob".to_string();
    bob.last_name = "Brown".to_string();
    bob.status = EmployeeStatus::Terminated;

    repo.insert(&alice, &[]).await.unwrap();
    repo.insert(&bob, &[]).await.unwrap();

    // Status filter.
    let filter = EmployeeFilter::new(0, 20).with_status(Some(EmployeeStatus::Terminated));
    let listed = repo.list(&filter).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].username, "bob");
    assert_eq!(repo.count(&filter).await.unwrap(), 1);

    // Search over names and email.
    let filter = EmployeeFilter::new(0, 20).with_search(Some("ADAMS".to_string()));
    let listed = repo.list(&filter).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].username, "alice");

    // Sort descending by last name.
    let filter = EmployeeFilter::new(0, 20).with_sort(EmployeeSort::LastName, true);
    let listed = repo.list(&filter).await.unwrap();
    assert_eq!(listed[0].last_name, "Brown");

    // Pagination bounds.
    let filter = EmployeeFilter::new(1, 1);
    let listed = repo.list(&filter).await.unwrap();
    assert_eq!(listed.len(), 1);
}

#[sqlx::test]
async fn test_update_profile_bumps_version(pool: PgPool) {
    let repo = PgEmployeeRepository::new(Arc::new(pool));

    let new = employee("up@example.com", "updatee");
    repo.insert(&new, &[]).await.unwrap();

    let update = EmployeeUpdate {
        first_name: "Janet".to_string(),
        last_name: "Doe".to_string(),
        phone: None,
        username: "janet".to_string(),
    };

    let actor = Uuid::new_v4();
    let saved = repo.update_profile(new.id, &update, Some(actor)).await.unwrap();

    assert_eq!(saved.first_name, "Janet");
    assert_eq!(saved.username, "janet");
    assert_eq!(saved.phone, None);
    assert_eq!(saved.version, 1);
    assert_eq!(saved.updated_by, Some(actor));
}

#[sqlx::test]
async fn test_update_profile_unknown_id_is_not_found(pool: PgPool) {
    let repo = PgEmployeeRepository::new(Arc::new(pool));

    let update = EmployeeUpdate {
        first_name: "No".to_string(),
        last_name: "One".to_string(),
        phone: None,
        username: "noone".to_string(),
    };

    let result = repo.update_profile(Uuid::new_v4(), &update, None).await;

    assert!(matches!(result.unwrap_err(), AppError::NotFound { .. }));
}

#[sqlx::test]
async fn test_record_termination(pool: PgPool) {
    let repo = PgEmployeeRepository::new(Arc::new(pool));

    let new = employee("term@example.com", "termee");
    repo.insert(&new, &[]).await.unwrap();

    let end = NaiveDate::from_ymd_opt(2026, 6, 30).unwrap();
    let saved = repo
        .record_termination(new.id, end, "Contract ended", None)
        .await
        .unwrap();

    assert_eq!(saved.status, EmployeeStatus::Terminated);
    assert_eq!(saved.end_work, Some(end));
    assert_eq!(saved.termination_reason.as_deref(), Some("Contract ended"));
    assert_eq!(saved.version, 1);
}

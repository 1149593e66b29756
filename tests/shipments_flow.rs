use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};
use shipment_tracking_api::{
    config::AppConfig,
    db::{create_orm_conn, create_pool, run_migrations},
    dto::{
        auth::AdminLoginRequest,
        shipments::{CreateShipmentRequest, UpdateProgressRequest, UpdateShipmentRequest},
    },
    error::AppError,
    models::ShipmentStatus,
    routes::params::{Pagination, ShipmentListQuery},
    services::{admin_service, shipment_service},
    state::AppState,
    tracking_id,
};
use uuid::Uuid;

// Full aggregate lifecycle: create with stopovers -> fetch -> advance progress
// -> edit -> delete twice. Gated on a configured database, like the rest of
// the integration suite.
#[tokio::test]
async fn create_track_and_delete_flow() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };

    let created = shipment_service::create_shipment(&state, request("jane@example.com"))
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .data
        .expect("created shipment");

    // Initial state and tracking id shape.
    assert!(created.id.starts_with("TRK"));
    assert_eq!(created.id.len(), 12);
    assert_eq!(created.status, ShipmentStatus::Pending);
    assert_eq!(created.current_location_index, 0);
    assert_eq!(created.name, "Laptop");
    assert_eq!(created.start_location.name, "Berlin");
    assert_eq!(created.start_location.address, "Berlin");
    assert_eq!(created.end_location.name, "Madrid");
    let stopover_names: Vec<&str> = created.stopovers.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(stopover_names, vec!["Warsaw", "Vienna"]);

    let eta = created.estimated_delivery.expect("default eta");
    let expected = Utc::now() + Duration::days(7);
    assert!((eta - expected).num_minutes().abs() < 5, "eta defaults to +7 days");

    // Round-trip: fetch returns the same aggregate.
    let fetched = shipment_service::get_shipment(&state, &created.id)
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .data
        .expect("fetched shipment");
    assert_eq!(fetched, created);

    // Advancing to a mid-route slot derives in-progress.
    let updated = shipment_service::update_shipment(
        &state,
        &created.id,
        UpdateShipmentRequest {
            name: None,
            status: None,
            current_location_index: Some(1),
            estimated_delivery: None,
        },
    )
    .await
    .map_err(|e| anyhow::anyhow!(e.to_string()))?
    .data
    .expect("updated shipment");
    assert_eq!(updated.status, ShipmentStatus::InProgress);
    assert_eq!(updated.current_location_index, 1);
    assert!(updated.updated_at >= created.updated_at);

    // Advancing to the final slot derives completed. Route is
    // start + 2 stopovers + end, so the last index is 3.
    let completed = shipment_service::update_shipment(
        &state,
        &created.id,
        UpdateShipmentRequest {
            name: None,
            status: None,
            current_location_index: Some(3),
            estimated_delivery: None,
        },
    )
    .await
    .map_err(|e| anyhow::anyhow!(e.to_string()))?
    .data
    .expect("completed shipment");
    assert_eq!(completed.status, ShipmentStatus::Completed);

    // An explicit status on the progress endpoint overrides the derivation.
    let cancelled = shipment_service::update_progress(
        &state,
        &created.id,
        UpdateProgressRequest {
            status: ShipmentStatus::Cancelled,
            current_location_index: Some(0),
        },
    )
    .await
    .map_err(|e| anyhow::anyhow!(e.to_string()))?
    .data
    .expect("cancelled shipment");
    assert_eq!(cancelled.status, ShipmentStatus::Cancelled);
    assert_eq!(cancelled.current_location_index, 0);

    // Out-of-range index is rejected and leaves the row untouched.
    let err = shipment_service::update_shipment(
        &state,
        &created.id,
        UpdateShipmentRequest {
            name: None,
            status: None,
            current_location_index: Some(10),
            estimated_delivery: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Validation("currentLocationIndex")));

    let unchanged = shipment_service::get_shipment(&state, &created.id)
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .data
        .expect("unchanged shipment");
    assert_eq!(unchanged.current_location_index, 0);
    assert_eq!(unchanged.status, ShipmentStatus::Cancelled);

    // Partial edit leaves the untouched fields alone.
    let renamed = shipment_service::update_shipment(
        &state,
        &created.id,
        UpdateShipmentRequest {
            name: Some("Laptop (fragile)".to_string()),
            status: None,
            current_location_index: None,
            estimated_delivery: None,
        },
    )
    .await
    .map_err(|e| anyhow::anyhow!(e.to_string()))?
    .data
    .expect("renamed shipment");
    assert_eq!(renamed.name, "Laptop (fragile)");
    assert_eq!(renamed.status, ShipmentStatus::Cancelled);
    assert_eq!(renamed.current_location_index, 0);

    // Delete is idempotent from the caller's perspective: the second call is
    // a clean not-found, never a crash.
    shipment_service::delete_shipment(&state, &created.id)
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;
    let err = shipment_service::delete_shipment(&state, &created.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    let err = shipment_service::get_shipment(&state, &created.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    Ok(())
}

#[tokio::test]
async fn customers_are_deduped_by_email_and_lists_are_newest_first() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };

    let first = shipment_service::create_shipment(&state, request("dedup@example.com"))
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .data
        .expect("first shipment");

    // Keep created_at strictly ordered for the list assertion below.
    tokio::time::sleep(std::time::Duration::from_millis(10)).await;

    let mut second_request = request("dedup@example.com");
    second_request.name = "Second parcel".to_string();
    second_request.user_name = "Different Name".to_string();
    let second = shipment_service::create_shipment(&state, second_request)
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .data
        .expect("second shipment");

    // Same email reuses the existing customer row rather than overwriting it.
    assert_eq!(first.user.id, second.user.id);
    assert_eq!(second.user.name, "Jane");

    let list = shipment_service::list_shipments(
        &state,
        ShipmentListQuery {
            pagination: Pagination {
                page: None,
                per_page: Some(100),
            },
            status: None,
            sort_order: None,
        },
    )
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .data
        .expect("shipment list");
    let ids: Vec<&str> = list.items.iter().map(|s| s.id.as_str()).collect();
    let first_pos = ids.iter().position(|id| *id == first.id).expect("first listed");
    let second_pos = ids.iter().position(|id| *id == second.id).expect("second listed");
    assert!(second_pos < first_pos, "newest shipment listed first");

    Ok(())
}

// A colliding tracking id restarts the whole creation transaction with a
// fresh id; only a bounded number of draws is attempted.
#[tokio::test]
async fn creation_retries_tracking_id_collisions() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };

    let existing = shipment_service::create_shipment(&state, request("retry@example.com"))
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .data
        .expect("existing shipment");

    // First draw collides with the existing shipment, the second is fresh.
    let existing_id = existing.id.clone();
    let mut draws = 0;
    let created = shipment_service::create_shipment_with_ids(&state, request("retry@example.com"), || {
        draws += 1;
        if draws == 1 {
            existing_id.clone()
        } else {
            tracking_id::generate()
        }
    })
    .await
    .map_err(|e| anyhow::anyhow!(e.to_string()))?
    .data
    .expect("retried shipment");

    assert_eq!(draws, 2);
    assert_ne!(created.id, existing.id);
    assert_eq!(created.status, ShipmentStatus::Pending);

    // A source that only ever collides gives up after the bounded number of
    // attempts instead of looping forever.
    let mut draws = 0;
    let err = shipment_service::create_shipment_with_ids(&state, request("retry@example.com"), || {
        draws += 1;
        existing_id.clone()
    })
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Internal(_)));
    assert_eq!(draws, 5);

    Ok(())
}

// The user and location rows are written before the shipment row, so a
// failed creation must roll all of them back; nothing may survive outside
// the transaction.
#[tokio::test]
async fn failed_creation_leaves_no_orphan_rows() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };

    let existing = shipment_service::create_shipment(&state, request("occupant@example.com"))
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .data
        .expect("existing shipment");

    // Every draw collides, so each attempt fails after the user and the
    // route locations have already been inserted.
    let orphan_request = CreateShipmentRequest {
        name: "Doomed parcel".to_string(),
        start_location: "Orphan Quay".to_string(),
        end_location: "Orphan Terminal".to_string(),
        stopovers: vec!["Orphan Junction".to_string()],
        user_name: "Nobody".to_string(),
        user_email: "orphan@example.com".to_string(),
        user_phone: "555-0199".to_string(),
        image_url: None,
    };
    let existing_id = existing.id.clone();
    let err =
        shipment_service::create_shipment_with_ids(&state, orphan_request, || existing_id.clone())
            .await
            .unwrap_err();
    assert!(matches!(err, AppError::Internal(_)));

    let (users,): (i64,) = sqlx::query_as("SELECT count(*) FROM users WHERE email = $1")
        .bind("orphan@example.com")
        .fetch_one(&state.pool)
        .await?;
    assert_eq!(users, 0, "rolled-back creation must not leave a user row");

    let (locations,): (i64,) =
        sqlx::query_as("SELECT count(*) FROM locations WHERE name LIKE 'Orphan %'")
            .fetch_one(&state.pool)
            .await?;
    assert_eq!(locations, 0, "rolled-back creation must not leave location rows");

    Ok(())
}

#[tokio::test]
async fn admin_login_verifies_hashed_credentials() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };

    seed_admin(&state, "dispatch", "correct horse").await?;

    let ok = admin_service::login_admin(
        &state.pool,
        AdminLoginRequest {
            username: "dispatch".to_string(),
            password: "correct horse".to_string(),
        },
    )
    .await
    .map_err(|e| anyhow::anyhow!(e.to_string()))?;
    assert!(ok.data.expect("login data").success);

    let err = admin_service::login_admin(
        &state.pool,
        AdminLoginRequest {
            username: "dispatch".to_string(),
            password: "wrong".to_string(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Unauthorized));

    let err = admin_service::login_admin(
        &state.pool,
        AdminLoginRequest {
            username: "nobody".to_string(),
            password: "irrelevant".to_string(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Unauthorized));

    Ok(())
}

fn request(email: &str) -> CreateShipmentRequest {
    CreateShipmentRequest {
        name: "Laptop".to_string(),
        start_location: "Berlin".to_string(),
        end_location: "Madrid".to_string(),
        stopovers: vec!["Warsaw".to_string(), "Vienna".to_string()],
        user_name: "Jane".to_string(),
        user_email: email.to_string(),
        user_phone: "555-0100".to_string(),
        image_url: None,
    }
}

// Allow skipping when no DB is configured in the environment.
async fn setup_state() -> anyhow::Result<Option<AppState>> {
    let database_url =
        match std::env::var("TEST_DATABASE_URL").or_else(|_| std::env::var("DATABASE_URL")) {
            Ok(url) => url,
            Err(_) => {
                eprintln!(
                    "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
                );
                return Ok(None);
            }
        };

    let pool = create_pool(&database_url).await?;
    let orm = create_orm_conn(&database_url).await?;
    run_migrations(&orm).await?;

    let config = AppConfig {
        database_url,
        host: "127.0.0.1".to_string(),
        port: 0,
        upload_dir: std::env::temp_dir()
            .join("shipment-tracking-test-uploads")
            .to_string_lossy()
            .into_owned(),
    };

    Ok(Some(AppState { pool, orm, config }))
}

async fn seed_admin(state: &AppState, username: &str, password: &str) -> anyhow::Result<()> {
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();

    sqlx::query(
        r#"
        INSERT INTO admins (id, username, password_hash)
        VALUES ($1, $2, $3)
        ON CONFLICT (username) DO UPDATE SET password_hash = EXCLUDED.password_hash
        "#,
    )
        .bind(Uuid::new_v4())
        .bind(username)
        .bind(password_hash)
        .execute(&state.pool)
        .await?;

    Ok(())
}

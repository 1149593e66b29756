use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};
use shipment_tracking_api::{
    config::AppConfig,
    db::{create_orm_conn, create_pool},
    dto::shipments::CreateShipmentRequest,
    services::shipment_service,
    state::AppState,
};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    // Ensure migrations are applied.
    sqlx::migrate!("./migrations").run(&pool).await?;

    ensure_admin(&pool, "admin", "admin123").await?;

    let orm = create_orm_conn(&config.database_url).await?;
    let state = AppState {
        pool,
        orm,
        config,
    };
    seed_demo_shipment(&state).await?;

    println!("Seed completed");
    Ok(())
}

async fn ensure_admin(pool: &sqlx::PgPool, username: &str, password: &str) -> anyhow::Result<()> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();

    sqlx::query(
        r#"
        INSERT INTO admins (id, username, password_hash)
        VALUES ($1, $2, $3)
        ON CONFLICT (username) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(username)
    .bind(password_hash)
    .execute(pool)
    .await?;

    println!("Ensured admin {username}");
    Ok(())
}

async fn seed_demo_shipment(state: &AppState) -> anyhow::Result<()> {
    let existing: (i64,) = sqlx::query_as("SELECT count(*) FROM shipments")
        .fetch_one(&state.pool)
        .await?;
    if existing.0 > 0 {
        println!("Shipments already present, skipping demo data");
        return Ok(());
    }

    let resp = shipment_service::create_shipment(
        state,
        CreateShipmentRequest {
            name: "Demo parcel".to_string(),
            start_location: "Hamburg".to_string(),
            end_location: "Lisbon".to_string(),
            stopovers: vec!["Paris".to_string(), "Madrid".to_string()],
            user_name: "Demo Customer".to_string(),
            user_email: "demo@example.com".to_string(),
            user_phone: "555-0100".to_string(),
            image_url: None,
        },
    )
    .await
    .map_err(|e| anyhow::anyhow!(e.to_string()))?;

    if let Some(shipment) = resp.data {
        println!("Seeded demo shipment {}", shipment.id);
    }
    Ok(())
}

use chrono::{Duration, Utc};
use sea_orm::ActiveValue::NotSet;
use sea_orm::error::SqlErr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::shipments::{
        CreateShipmentRequest, NewShipment, ShipmentList, UpdateProgressRequest,
        UpdateShipmentRequest,
    },
    entity::{
        locations::{self, Entity as Locations, Model as LocationModel},
        shipment_stopovers::{self, Column as StopoverCol, Entity as ShipmentStopovers},
        shipments::{self, Column as ShipmentCol, Entity as Shipments, Model as ShipmentModel},
        users::{self, Column as UserCol, Entity as Users},
    },
    error::{AppError, AppResult},
    models::{Coordinates, Customer, Location, Shipment, ShipmentStatus},
    progress,
    response::{ApiResponse, Meta},
    routes::params::{ShipmentListQuery, SortOrder},
    state::AppState,
    tracking_id,
};

/// Generation is a bare random draw, so the whole creation transaction is
/// retried on a primary-key collision instead of surfacing the conflict.
const MAX_ID_ATTEMPTS: usize = 5;

pub async fn list_shipments(
    state: &AppState,
    query: ShipmentListQuery,
) -> AppResult<ApiResponse<ShipmentList>> {
    let (page, limit, offset) = query.pagination.normalize();

    let mut condition = Condition::all();
    if let Some(status) = query.status.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(ShipmentCol::Status.eq(status.clone()));
    }

    let mut finder = Shipments::find().filter(condition);
    finder = match query.sort_order.unwrap_or(SortOrder::Desc) {
        SortOrder::Asc => finder.order_by_asc(ShipmentCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(ShipmentCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let models = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;

    let mut items = Vec::with_capacity(models.len());
    for model in models {
        items.push(hydrate(&state.orm, model).await?);
    }

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Ok", ShipmentList { items }, Some(meta)))
}

pub async fn get_shipment(state: &AppState, id: &str) -> AppResult<ApiResponse<Shipment>> {
    let model = Shipments::find_by_id(id.to_string())
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let shipment = hydrate(&state.orm, model).await?;
    Ok(ApiResponse::success("Ok", shipment, Some(Meta::empty())))
}

pub async fn create_shipment(
    state: &AppState,
    payload: CreateShipmentRequest,
) -> AppResult<ApiResponse<Shipment>> {
    create_shipment_with_ids(state, payload, tracking_id::generate).await
}

/// Creation with an injectable tracking-id source, so the collision-retry
/// path is reachable without depending on a real collision.
pub async fn create_shipment_with_ids(
    state: &AppState,
    payload: CreateShipmentRequest,
    mut next_id: impl FnMut() -> String,
) -> AppResult<ApiResponse<Shipment>> {
    let input = payload.validate()?;

    for attempt in 1..=MAX_ID_ATTEMPTS {
        let id = next_id();
        match insert_aggregate(&state.orm, &input, &id).await {
            Ok(model) => {
                let shipment = hydrate(&state.orm, model).await?;

                if let Err(err) = log_audit(
                    &state.pool,
                    None,
                    "shipment_created",
                    Some("shipments"),
                    Some(serde_json::json!({ "shipment_id": shipment.id })),
                )
                .await
                {
                    tracing::warn!(error = %err, "audit log failed");
                }

                return Ok(ApiResponse::success(
                    "Shipment created",
                    shipment,
                    Some(Meta::empty()),
                ));
            }
            Err(AppError::OrmError(err))
                if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) =>
            {
                tracing::warn!(tracking_id = %id, attempt, "tracking id collision, regenerating");
            }
            Err(err) => return Err(err),
        }
    }

    Err(AppError::Internal(anyhow::anyhow!(
        "tracking id generation exhausted after {MAX_ID_ATTEMPTS} attempts"
    )))
}

/// The multi-row write: customer (find-or-create by email), start and end
/// locations, the shipment row, then one location plus one ordering row per
/// stopover. All inside a single transaction so a failure anywhere leaves no
/// orphaned rows.
async fn insert_aggregate(
    orm: &sea_orm::DatabaseConnection,
    input: &NewShipment,
    id: &str,
) -> AppResult<ShipmentModel> {
    let txn = orm.begin().await?;

    // Soft identity merge: an existing customer with the same email is
    // reused, not overwritten.
    let user = match Users::find()
        .filter(UserCol::Email.eq(input.user_email.as_str()))
        .one(&txn)
        .await?
    {
        Some(user) => user,
        None => {
            users::ActiveModel {
                id: Set(Uuid::new_v4()),
                name: Set(input.user_name.clone()),
                email: Set(input.user_email.clone()),
                phone: Set(input.user_phone.clone()),
                created_at: NotSet,
                updated_at: NotSet,
            }
            .insert(&txn)
            .await?
        }
    };

    let start = insert_location(&txn, &input.start_location).await?;
    let end = insert_location(&txn, &input.end_location).await?;

    let shipment = shipments::ActiveModel {
        id: Set(id.to_string()),
        name: Set(input.name.clone()),
        user_id: Set(user.id),
        start_location_id: Set(start.id),
        end_location_id: Set(end.id),
        status: Set(ShipmentStatus::Pending.as_str().to_string()),
        current_location_index: Set(0),
        estimated_delivery: Set(Some((Utc::now() + Duration::days(7)).into())),
        image_url: Set(input.image_url.clone()),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;

    for (order, text) in input.stopovers.iter().enumerate() {
        let stopover = insert_location(&txn, text).await?;
        shipment_stopovers::ActiveModel {
            id: Set(Uuid::new_v4()),
            shipment_id: Set(shipment.id.clone()),
            location_id: Set(stopover.id),
            order: Set(order as i32),
            created_at: NotSet,
        }
        .insert(&txn)
        .await?;
    }

    txn.commit().await?;
    Ok(shipment)
}

// Creation does not separate a human label from a street address; both
// columns receive the same literal text.
async fn insert_location<C: ConnectionTrait>(conn: &C, text: &str) -> AppResult<LocationModel> {
    let location = locations::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(text.to_string()),
        address: Set(text.to_string()),
        latitude: Set(None),
        longitude: Set(None),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(conn)
    .await?;
    Ok(location)
}

pub async fn update_shipment(
    state: &AppState,
    id: &str,
    payload: UpdateShipmentRequest,
) -> AppResult<ApiResponse<Shipment>> {
    let model = Shipments::find_by_id(id.to_string())
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut shipment = hydrate(&state.orm, model.clone()).await?;

    // Index changes route through the progress engine so the bound invariant
    // holds on this path too, not just on the timeline endpoint.
    if let Some(index) = payload.current_location_index {
        progress::advance_to(&mut shipment, index, payload.status)?;
    } else if let Some(status) = payload.status {
        progress::set_status(&mut shipment, status);
    }

    if let Some(name) = payload.name {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::Validation("name"));
        }
        shipment.name = name;
    }

    if let Some(eta) = payload.estimated_delivery {
        shipment.estimated_delivery = Some(eta);
    }

    let shipment = persist(state, model, &shipment).await?;

    if let Err(err) = log_audit(
        &state.pool,
        None,
        "shipment_updated",
        Some("shipments"),
        Some(serde_json::json!({ "shipment_id": shipment.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Shipment updated",
        shipment,
        Some(Meta::empty()),
    ))
}

pub async fn update_progress(
    state: &AppState,
    id: &str,
    payload: UpdateProgressRequest,
) -> AppResult<ApiResponse<Shipment>> {
    let model = Shipments::find_by_id(id.to_string())
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut shipment = hydrate(&state.orm, model.clone()).await?;

    match payload.current_location_index {
        Some(index) => progress::advance_to(&mut shipment, index, Some(payload.status))?,
        None => progress::set_status(&mut shipment, payload.status),
    }

    let shipment = persist(state, model, &shipment).await?;

    if let Err(err) = log_audit(
        &state.pool,
        None,
        "progress_updated",
        Some("shipments"),
        Some(serde_json::json!({
            "shipment_id": shipment.id,
            "status": shipment.status,
            "current_location_index": shipment.current_location_index,
        })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Progress updated",
        shipment,
        Some(Meta::empty()),
    ))
}

pub async fn delete_shipment(
    state: &AppState,
    id: &str,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let txn = state.orm.begin().await?;

    // Stopover ordering rows go with the shipment; users and locations stay.
    ShipmentStopovers::delete_many()
        .filter(StopoverCol::ShipmentId.eq(id))
        .exec(&txn)
        .await?;

    let result = Shipments::delete_by_id(id.to_string()).exec(&txn).await?;

    txn.commit().await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    if let Err(err) = log_audit(
        &state.pool,
        None,
        "shipment_deleted",
        Some("shipments"),
        Some(serde_json::json!({ "shipment_id": id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Shipment deleted",
        serde_json::json!({ "id": id }),
        Some(Meta::empty()),
    ))
}

/// Write the mutable fields of an edited aggregate back to its row, then
/// re-read the full hydrated shipment.
async fn persist(
    state: &AppState,
    model: ShipmentModel,
    edited: &Shipment,
) -> AppResult<Shipment> {
    let mut active: shipments::ActiveModel = model.into();
    active.name = Set(edited.name.clone());
    active.status = Set(edited.status.as_str().to_string());
    active.current_location_index = Set(edited.current_location_index);
    active.estimated_delivery = Set(edited.estimated_delivery.map(Into::into));
    active.updated_at = Set(Utc::now().into());
    let updated = active.update(&state.orm).await?;

    hydrate(&state.orm, updated).await
}

/// Assemble the full aggregate: customer, start and end locations, and the
/// stopovers in their stored order.
pub async fn hydrate<C: ConnectionTrait>(conn: &C, model: ShipmentModel) -> AppResult<Shipment> {
    let user = Users::find_by_id(model.user_id)
        .one(conn)
        .await?
        .ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!(
                "shipment {} references missing user {}",
                model.id,
                model.user_id
            ))
        })?;

    let start_location = load_location(conn, model.start_location_id, &model.id).await?;
    let end_location = load_location(conn, model.end_location_id, &model.id).await?;

    let stopover_rows = ShipmentStopovers::find()
        .filter(StopoverCol::ShipmentId.eq(model.id.as_str()))
        .order_by_asc(StopoverCol::Order)
        .all(conn)
        .await?;

    let mut stopovers = Vec::with_capacity(stopover_rows.len());
    for row in stopover_rows {
        stopovers.push(load_location(conn, row.location_id, &model.id).await?);
    }

    let status: ShipmentStatus = model.status.parse().map_err(AppError::Internal)?;

    Ok(Shipment {
        id: model.id,
        name: model.name,
        status,
        current_location_index: model.current_location_index,
        estimated_delivery: model.estimated_delivery.map(|dt| dt.with_timezone(&Utc)),
        image_url: model.image_url,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
        user: Customer {
            id: user.id,
            name: user.name,
            email: user.email,
            phone: user.phone,
        },
        start_location,
        end_location,
        stopovers,
    })
}

async fn load_location<C: ConnectionTrait>(
    conn: &C,
    location_id: Uuid,
    shipment_id: &str,
) -> AppResult<Location> {
    let model = Locations::find_by_id(location_id)
        .one(conn)
        .await?
        .ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!(
                "shipment {shipment_id} references missing location {location_id}"
            ))
        })?;
    Ok(location_from_entity(model))
}

fn location_from_entity(model: LocationModel) -> Location {
    let coordinates = match (model.latitude.as_deref(), model.longitude.as_deref()) {
        (Some(lat), Some(lng)) => lat
            .parse::<f64>()
            .ok()
            .zip(lng.parse::<f64>().ok())
            .map(|(lat, lng)| Coordinates { lat, lng }),
        _ => None,
    };

    Location {
        id: model.id,
        name: model.name,
        address: model.address,
        coordinates,
    }
}

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "shipments")]
pub struct Model {
    /// External tracking identifier, e.g. `TRK4F8C21A0B`.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub user_id: Uuid,
    pub start_location_id: Uuid,
    pub end_location_id: Uuid,
    pub status: String,
    pub current_location_index: i32,
    pub estimated_delivery: Option<DateTimeWithTimeZone>,
    pub image_url: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    Users,
    #[sea_orm(
        belongs_to = "super::locations::Entity",
        from = "Column::StartLocationId",
        to = "super::locations::Column::Id"
    )]
    StartLocation,
    #[sea_orm(
        belongs_to = "super::locations::Entity",
        from = "Column::EndLocationId",
        to = "super::locations::Column::Id"
    )]
    EndLocation,
    #[sea_orm(has_many = "super::shipment_stopovers::Entity")]
    ShipmentStopovers,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::shipment_stopovers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ShipmentStopovers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

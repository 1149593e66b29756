use sea_orm::entity::prelude::*;

// Coordinates are stored as text columns, parsed into floats at the model
// boundary; creation currently never writes them.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "locations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::shipment_stopovers::Entity")]
    ShipmentStopovers,
}

impl Related<super::shipment_stopovers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ShipmentStopovers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

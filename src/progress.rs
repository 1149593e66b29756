//! The rules keeping `status` and `current_location_index` coherent. Every
//! index change, whether from the timeline endpoint or the generic update
//! endpoint, goes through here before anything is persisted.

use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::{Shipment, ShipmentStatus},
};

/// Classification of one route slot relative to the current position, as the
/// tracking timeline renders it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum LocationState {
    Completed,
    Current,
    Pending,
}

/// Move the shipment to `new_index` in the flattened route.
///
/// Without an explicit status the new status is derived from position: the
/// final slot means `completed`, anything earlier means `in-progress`. An
/// explicit status is stored verbatim and may diverge from the derived value;
/// administrators can cancel a shipment without touching its position.
///
/// Out-of-range indices fail and leave the shipment untouched.
pub fn advance_to(
    shipment: &mut Shipment,
    new_index: i32,
    explicit_status: Option<ShipmentStatus>,
) -> AppResult<()> {
    let last = shipment.route_len() - 1;
    if new_index < 0 || new_index > last {
        return Err(AppError::Validation("currentLocationIndex"));
    }

    let derived = if new_index == last {
        ShipmentStatus::Completed
    } else {
        ShipmentStatus::InProgress
    };

    shipment.current_location_index = new_index;
    shipment.status = explicit_status.unwrap_or(derived);
    shipment.updated_at = Utc::now();
    Ok(())
}

/// Change the status without moving the shipment. No transition table is
/// enforced; any status may follow any other.
pub fn set_status(shipment: &mut Shipment, status: ShipmentStatus) {
    shipment.status = status;
    shipment.updated_at = Utc::now();
}

/// Boundary is strict: slots before the pointer are completed, the pointer
/// itself is current, everything after is pending.
pub fn location_state(shipment: &Shipment, index: i32) -> LocationState {
    if index < shipment.current_location_index {
        LocationState::Completed
    } else if index == shipment.current_location_index {
        LocationState::Current
    } else {
        LocationState::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Customer, Location};
    use uuid::Uuid;

    fn location(name: &str) -> Location {
        Location {
            id: Uuid::new_v4(),
            name: name.to_string(),
            address: name.to_string(),
            coordinates: None,
        }
    }

    fn shipment_with_stopovers(count: usize) -> Shipment {
        let now = Utc::now();
        Shipment {
            id: "TRKTEST00001".to_string(),
            name: "Test parcel".to_string(),
            status: ShipmentStatus::Pending,
            current_location_index: 0,
            estimated_delivery: None,
            image_url: None,
            created_at: now,
            updated_at: now,
            user: Customer {
                id: Uuid::new_v4(),
                name: "Jane".to_string(),
                email: "jane@example.com".to_string(),
                phone: "555-0100".to_string(),
            },
            start_location: location("Berlin"),
            end_location: location("Madrid"),
            stopovers: (0..count).map(|i| location(&format!("Stop {i}"))).collect(),
        }
    }

    #[test]
    fn advance_to_final_index_derives_completed() {
        // Two stopovers: flattened route length 4, valid indices 0..=3.
        let mut shipment = shipment_with_stopovers(2);
        advance_to(&mut shipment, 3, None).unwrap();
        assert_eq!(shipment.status, ShipmentStatus::Completed);
        assert_eq!(shipment.current_location_index, 3);
    }

    #[test]
    fn advance_to_mid_route_derives_in_progress() {
        for index in 0..=2 {
            let mut shipment = shipment_with_stopovers(2);
            advance_to(&mut shipment, index, None).unwrap();
            assert_eq!(shipment.status, ShipmentStatus::InProgress, "index {index}");
            assert_eq!(shipment.current_location_index, index);
        }
    }

    #[test]
    fn advance_to_out_of_range_fails_and_leaves_shipment_unchanged() {
        let mut shipment = shipment_with_stopovers(2);
        let before = shipment.clone();

        for bad in [-1, 4, 100] {
            let err = advance_to(&mut shipment, bad, None).unwrap_err();
            assert!(matches!(err, AppError::Validation("currentLocationIndex")));
            assert_eq!(shipment, before, "index {bad} must not mutate");
        }
    }

    #[test]
    fn explicit_status_overrides_derivation() {
        let mut shipment = shipment_with_stopovers(2);
        advance_to(&mut shipment, 0, Some(ShipmentStatus::Cancelled)).unwrap();
        assert_eq!(shipment.status, ShipmentStatus::Cancelled);
        assert_eq!(shipment.current_location_index, 0);

        // The divergent direction too: completed while mid-route.
        advance_to(&mut shipment, 1, Some(ShipmentStatus::Completed)).unwrap();
        assert_eq!(shipment.status, ShipmentStatus::Completed);
        assert_eq!(shipment.current_location_index, 1);
    }

    #[test]
    fn set_status_leaves_index_untouched() {
        let mut shipment = shipment_with_stopovers(1);
        advance_to(&mut shipment, 1, None).unwrap();
        set_status(&mut shipment, ShipmentStatus::Cancelled);
        assert_eq!(shipment.status, ShipmentStatus::Cancelled);
        assert_eq!(shipment.current_location_index, 1);
    }

    #[test]
    fn location_state_boundary() {
        let mut shipment = shipment_with_stopovers(2);
        advance_to(&mut shipment, 1, None).unwrap();

        assert_eq!(location_state(&shipment, 0), LocationState::Completed);
        assert_eq!(location_state(&shipment, 1), LocationState::Current);
        assert_eq!(location_state(&shipment, 2), LocationState::Pending);
        assert_eq!(location_state(&shipment, 3), LocationState::Pending);
    }

    #[test]
    fn routes_without_stopovers_have_two_slots() {
        let mut shipment = shipment_with_stopovers(0);
        assert_eq!(shipment.route_len(), 2);
        advance_to(&mut shipment, 1, None).unwrap();
        assert_eq!(shipment.status, ShipmentStatus::Completed);
        assert!(advance_to(&mut shipment, 2, None).is_err());
    }
}

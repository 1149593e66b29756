use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::{Shipment, ShipmentStatus},
};

// Same simple local@domain.tld shape the tracking form enforces.
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex"));

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateShipmentRequest {
    pub name: String,
    pub start_location: String,
    pub end_location: String,
    #[serde(default)]
    pub stopovers: Vec<String>,
    pub user_name: String,
    pub user_email: String,
    pub user_phone: String,
    pub image_url: Option<String>,
}

/// Creation input after trimming and validation. Stopovers keep their given
/// order; blank entries are already dropped.
#[derive(Debug, Clone)]
pub struct NewShipment {
    pub name: String,
    pub start_location: String,
    pub end_location: String,
    pub stopovers: Vec<String>,
    pub user_name: String,
    pub user_email: String,
    pub user_phone: String,
    pub image_url: Option<String>,
}

impl CreateShipmentRequest {
    /// Fail fast with the first offending field, before anything is persisted.
    pub fn validate(self) -> AppResult<NewShipment> {
        let name = required(&self.name, "name")?;
        let start_location = required(&self.start_location, "startLocation")?;
        let end_location = required(&self.end_location, "endLocation")?;
        let user_name = required(&self.user_name, "userName")?;
        let user_email = required(&self.user_email, "userEmail")?;
        let user_phone = required(&self.user_phone, "userPhone")?;

        if !EMAIL_RE.is_match(&user_email) {
            return Err(AppError::Validation("userEmail"));
        }

        let stopovers = self
            .stopovers
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        Ok(NewShipment {
            name,
            start_location,
            end_location,
            stopovers,
            user_name,
            user_email,
            user_phone,
            image_url: self.image_url.filter(|url| !url.trim().is_empty()),
        })
    }
}

fn required(value: &str, field: &'static str) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(field));
    }
    Ok(trimmed.to_string())
}

/// Administrator edit: every field optional, absent fields left untouched.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateShipmentRequest {
    pub name: Option<String>,
    pub status: Option<ShipmentStatus>,
    pub current_location_index: Option<i32>,
    pub estimated_delivery: Option<DateTime<Utc>>,
}

/// Timeline update: status is mandatory, the index optional.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProgressRequest {
    pub status: ShipmentStatus,
    pub current_location_index: Option<i32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ShipmentList {
    pub items: Vec<Shipment>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CreateShipmentRequest {
        CreateShipmentRequest {
            name: "Laptop".to_string(),
            start_location: "Berlin".to_string(),
            end_location: "Madrid".to_string(),
            stopovers: vec![],
            user_name: "Jane".to_string(),
            user_email: "jane@example.com".to_string(),
            user_phone: "555-0100".to_string(),
            image_url: None,
        }
    }

    #[test]
    fn empty_name_is_rejected_by_field() {
        let req = CreateShipmentRequest {
            name: "   ".to_string(),
            ..request()
        };
        assert!(matches!(
            req.validate().unwrap_err(),
            AppError::Validation("name")
        ));
    }

    #[test]
    fn malformed_email_is_rejected_by_field() {
        for email in ["not-an-email", "a@b", "a b@c.d", "@x.y"] {
            let req = CreateShipmentRequest {
                user_email: email.to_string(),
                ..request()
            };
            assert!(
                matches!(req.validate().unwrap_err(), AppError::Validation("userEmail")),
                "email {email:?} should be rejected"
            );
        }
    }

    #[test]
    fn stopovers_are_trimmed_and_blanks_dropped() {
        let req = CreateShipmentRequest {
            stopovers: vec!["".to_string(), " A ".to_string(), "".to_string()],
            ..request()
        };
        let input = req.validate().unwrap();
        assert_eq!(input.stopovers, vec!["A".to_string()]);
    }

    #[test]
    fn stopover_order_is_preserved() {
        let req = CreateShipmentRequest {
            stopovers: vec!["Paris".to_string(), " ".to_string(), "Lyon".to_string()],
            ..request()
        };
        let input = req.validate().unwrap();
        assert_eq!(input.stopovers, vec!["Paris".to_string(), "Lyon".to_string()]);
    }

    #[test]
    fn fields_are_trimmed() {
        let req = CreateShipmentRequest {
            name: "  Laptop  ".to_string(),
            user_email: " jane@example.com ".to_string(),
            ..request()
        };
        let input = req.validate().unwrap();
        assert_eq!(input.name, "Laptop");
        assert_eq!(input.user_email, "jane@example.com");
    }
}

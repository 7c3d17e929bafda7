//! DTOs for employee endpoints.

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use uuid::Uuid;
use validator::Validate;

use crate::api::dto::pagination::{PaginationMeta, PaginationParams, parse_sort};
use crate::domain::entities::{
    Address, AddressKind, Employee, EmployeeStatus, EmployeeUpdate, NewAddress, NewEmployee,
};
use crate::domain::repositories::EmployeeSort;

/// Compiled regex for login name validation: lowercase alphanumerics plus
/// `.`, `_`, `-`, starting with an alphanumeric.
static USERNAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9][a-z0-9._-]*$").unwrap());

/// Request to create an employee.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateEmployeeRequest {
    #[validate(length(min = 1, max = 100, message = "First name is required"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 100, message = "Last name is required"))]
    pub last_name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(max = 30))]
    pub phone: Option<String>,

    /// Login name provisioned in the identity provider.
    #[validate(length(min = 3, max = 50))]
    #[validate(regex(
        path = "*USERNAME_REGEX",
        message = "Username may contain lowercase letters, digits, '.', '_' and '-'"
    ))]
    pub username: String,

    pub started_work: Option<NaiveDate>,

    #[serde(default)]
    #[validate(nested)]
    pub addresses: Vec<CreateAddressRequest>,
}

impl CreateEmployeeRequest {
    /// Converts the validated request into the domain input type.
    pub fn into_new_employee(self) -> NewEmployee {
        NewEmployee {
            username: self.username,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            started_work: self.started_work,
            addresses: self
                .addresses
                .into_iter()
                .map(CreateAddressRequest::into_new_address)
                .collect(),
        }
    }
}

/// Address submitted alongside employee creation.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateAddressRequest {
    /// Defaults to `HOME` when absent.
    pub kind: Option<AddressKind>,

    #[validate(length(max = 200))]
    pub street: Option<String>,

    #[validate(length(max = 100))]
    pub city: Option<String>,

    #[validate(length(max = 20))]
    pub postal_code: Option<String>,

    #[validate(length(max = 100))]
    pub country: Option<String>,
}

impl CreateAddressRequest {
    fn into_new_address(self) -> NewAddress {
        NewAddress {
            kind: self.kind.unwrap_or(AddressKind::Home),
            street: self.street,
            city: self.city,
            postal_code: self.postal_code,
            country: self.country,
        }
    }
}

/// Request to update an employee profile.
///
/// Status, dates, and identity linkage are not updatable here.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateEmployeeRequest {
    #[validate(length(min = 1, max = 100, message = "First name is required"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 100, message = "Last name is required"))]
    pub last_name: String,

    #[validate(length(max = 30))]
    pub phone: Option<String>,

    #[validate(length(min = 3, max = 50))]
    #[validate(regex(
        path = "*USERNAME_REGEX",
        message = "Username may contain lowercase letters, digits, '.', '_' and '-'"
    ))]
    pub username: String,
}

impl UpdateEmployeeRequest {
    pub fn into_update(self) -> EmployeeUpdate {
        EmployeeUpdate {
            first_name: self.first_name,
            last_name: self.last_name,
            phone: self.phone,
            username: self.username,
        }
    }
}

/// Request to terminate an employment.
#[derive(Debug, Deserialize, Validate)]
pub struct TerminateEmployeeRequest {
    pub end_work: NaiveDate,

    #[validate(length(min = 1, max = 500, message = "Reason is required"))]
    pub reason: String,
}

/// Query parameters for the employee list endpoint.
#[derive(Debug, Deserialize)]
pub struct EmployeeQueryParams {
    #[serde(flatten)]
    pub pagination: PaginationParams,

    /// Case-insensitive substring match over first name, last name, email.
    pub search: Option<String>,

    pub status: Option<EmployeeStatus>,

    /// `field` or `field,desc`; whitelisted fields only.
    pub sort: Option<String>,
}

impl EmployeeQueryParams {
    /// Resolves the sort parameter against the whitelist.
    ///
    /// Defaults to `last_name` ascending.
    pub fn sort_params(&self) -> Result<(EmployeeSort, bool), String> {
        let Some(raw) = self.sort.as_deref() else {
            return Ok((EmployeeSort::LastName, false));
        };

        let (field, descending) = parse_sort(raw)?;

        let sort = match field {
            "last_name" => EmployeeSort::LastName,
            "first_name" => EmployeeSort::FirstName,
            "email" => EmployeeSort::Email,
            "started_work" => EmployeeSort::StartedWork,
            "created_at" => EmployeeSort::CreatedAt,
            other => return Err(format!("Unsortable field '{other}'")),
        };

        Ok((sort, descending))
    }
}

/// JSON representation of an address.
#[derive(Debug, Serialize)]
pub struct AddressResponse {
    pub id: Uuid,
    pub kind: AddressKind,
    /// Single-line rendering of the address parts.
    pub full_address: String,
}

impl From<&Address> for AddressResponse {
    fn from(address: &Address) -> Self {
        Self {
            id: address.id,
            kind: address.kind,
            full_address: address.full_address(),
        }
    }
}

/// JSON representation of an employee.
#[derive(Debug, Serialize)]
pub struct EmployeeResponse {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub username: String,
    pub status: EmployeeStatus,
    pub started_work: Option<NaiveDate>,
    /// Present on detail responses, omitted on list items.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub addresses: Option<Vec<AddressResponse>>,
}

impl EmployeeResponse {
    /// Full representation including addresses.
    pub fn detail(employee: &Employee, addresses: &[Address]) -> Self {
        Self {
            addresses: Some(addresses.iter().map(AddressResponse::from).collect()),
            ..Self::summary(employee)
        }
    }

    /// List representation; addresses are skipped to keep list queries cheap.
    pub fn summary(employee: &Employee) -> Self {
        Self {
            id: employee.id,
            full_name: employee.full_name(),
            email: employee.email.clone(),
            username: employee.username.clone(),
            status: employee.status,
            started_work: employee.started_work,
            addresses: None,
        }
    }
}

/// Paginated employee listing.
#[derive(Debug, Serialize)]
pub struct EmployeeListResponse {
    pub pagination: PaginationMeta,
    pub items: Vec<EmployeeResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_create() -> CreateEmployeeRequest {
        serde_json::from_value(json!({
            "first_name": "Jane",
            "last_name": "Doe",
            "email": "jane@example.com",
            "phone": "+421900123456",
            "username": "jane.doe",
            "started_work": "2026-02-01",
            "addresses": [
                { "kind": "HOME", "street": "Main St 1", "city": "Springfield" }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_valid_create_request() {
        let request = valid_create();
        assert!(request.validate().is_ok());

        let input = request.into_new_employee();
        assert_eq!(input.username, "jane.doe");
        assert_eq!(input.addresses.len(), 1);
        assert_eq!(input.addresses[0].kind, AddressKind::Home);
    }

    #[test]
    fn test_invalid_email_is_rejected() {
        let mut request = valid_create();
        request.email = "not-an-email".to_string();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_username_pattern_is_enforced() {
        let mut request = valid_create();

        request.username = "Jane Doe".to_string();
        assert!(request.validate().is_err());

        request.username = "ab".to_string();
        assert!(request.validate().is_err());

        request.username = "jane_doe-2".to_string();
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_address_kind_defaults_to_home() {
        let request: CreateAddressRequest =
            serde_json::from_value(json!({ "street": "Main St 1" })).unwrap();
        assert_eq!(request.into_new_address().kind, AddressKind::Home);
    }

    #[test]
    fn test_sort_whitelist() {
        let mut params: EmployeeQueryParams = serde_json::from_value(json!({})).unwrap();

        assert_eq!(
            params.sort_params().unwrap(),
            (EmployeeSort::LastName, false)
        );

        params.sort = Some("email,desc".to_string());
        assert_eq!(params.sort_params().unwrap(), (EmployeeSort::Email, true));

        params.sort = Some("subject_id".to_string());
        assert!(params.sort_params().is_err());
    }

    #[test]
    fn test_status_filter_parses_uppercase() {
        let params: EmployeeQueryParams =
            serde_json::from_value(json!({ "status": "TERMINATED" })).unwrap();
        assert_eq!(params.status, Some(EmployeeStatus::Terminated));
    }

    #[test]
    fn test_summary_omits_addresses() {
        let request = valid_create();
        let input = request.into_new_employee();

        let employee = Employee {
            id: Uuid::new_v4(),
            subject_id: "s".to_string(),
            username: input.username,
            first_name: input.first_name,
            last_name: input.last_name,
            email: input.email,
            phone: None,
            status: EmployeeStatus::Active,
            started_work: None,
            end_work: None,
            termination_reason: None,
            version: 0,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
            created_by: None,
            updated_by: None,
        };

        let summary = serde_json::to_value(EmployeeResponse::summary(&employee)).unwrap();
        assert_eq!(summary["full_name"], "Jane Doe");
        assert!(summary.get("addresses").is_none());
    }
}

use std::fmt;

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

use super::domain::{HostelId, RoomNumber};
use super::error::InventoryError;

/// Identifier wrapper for residents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResidentId(pub String);

impl fmt::Display for ResidentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A person holding one bed in one room of one hostel for a bounded tenancy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resident {
    pub id: ResidentId,
    pub hostel_id: HostelId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub(crate) room: RoomNumber,
    pub duration_months: u32,
    pub join_date: NaiveDate,
    pub(crate) end_date: NaiveDate,
}

impl Resident {
    pub(crate) fn admit(
        id: ResidentId,
        hostel_id: HostelId,
        room: RoomNumber,
        admission: ResidentAdmission,
    ) -> Self {
        Self {
            id,
            hostel_id,
            name: admission.name,
            email: admission.email,
            room,
            duration_months: admission.duration_months,
            join_date: admission.join_date,
            end_date: admission.end_date,
        }
    }

    pub fn room(&self) -> &RoomNumber {
        &self.room
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    /// Tenancy has elapsed once its end date lies strictly before `today`.
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.end_date < today
    }
}

/// Information a warden supplies when adding a resident. The room is never chosen here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResidentSubmission {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    pub duration_months: u32,
    #[serde(default)]
    pub join_date: Option<NaiveDate>,
}

/// A submission that passed validation, with its tenancy window resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResidentAdmission {
    pub name: String,
    pub email: Option<String>,
    pub duration_months: u32,
    pub join_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl ResidentSubmission {
    pub fn validate(self, today: NaiveDate) -> Result<ResidentAdmission, InventoryError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(InventoryError::InvalidResident(
                "name must not be empty".to_string(),
            ));
        }
        if self.duration_months == 0 {
            return Err(InventoryError::InvalidResident(
                "duration_months must be at least 1".to_string(),
            ));
        }

        let join_date = self.join_date.unwrap_or(today);
        let end_date = tenancy_end(join_date, self.duration_months).ok_or_else(|| {
            InventoryError::InvalidResident(format!(
                "tenancy of {} months from {join_date} is out of range",
                self.duration_months
            ))
        })?;

        let email = self
            .email
            .map(|email| email.trim().to_string())
            .filter(|email| !email.is_empty());

        Ok(ResidentAdmission {
            name,
            email,
            duration_months: self.duration_months,
            join_date,
            end_date,
        })
    }
}

/// Calendar-month arithmetic; a join on the 31st ends on the last day of a shorter month.
pub fn tenancy_end(join_date: NaiveDate, duration_months: u32) -> Option<NaiveDate> {
    join_date.checked_add_months(Months::new(duration_months))
}

use serde::{Deserialize, Serialize};

use super::clean::{clean_date, clean_optional_string, clean_required_string};
use super::MemberFields;

/// Rejected member input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("firstName is required")]
    MissingFirstName,
    #[error("datePurchased is not a valid date: {0}")]
    InvalidDate(String),
    #[error("{field} must be a finite number")]
    InvalidNumber { field: &'static str },
    #[error("coveredWeeks must be a whole number, got {0}")]
    FractionalWeeks(f64),
    #[error("version is required when updating a member")]
    MissingVersion,
    #[error("version must be at least 1")]
    ZeroVersion,
}

/// Member fields as they arrive over the wire, before cleaning.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberInput {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub home_phone: Option<String>,
    #[serde(default)]
    pub mobile_phone: Option<String>,
    #[serde(default)]
    pub address1: Option<String>,
    #[serde(default)]
    pub address2: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub zip: Option<String>,
    #[serde(default)]
    pub zip4: Option<String>,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub date_purchased: Option<String>,
    #[serde(default)]
    pub paid_amount: Option<f64>,
    #[serde(default)]
    pub covered_weeks: Option<f64>,
    #[serde(default)]
    pub last_state_worked: Option<String>,
}

impl MemberInput {
    /// Clean every field and check the ones with a shape.
    pub fn validate(&self) -> Result<MemberFields, ValidationError> {
        let first_name = clean_required_string(self.first_name.as_deref());
        if first_name.is_empty() {
            return Err(ValidationError::MissingFirstName);
        }

        let date_purchased = match clean_optional_string(self.date_purchased.as_deref()) {
            Some(raw) => Some(
                clean_date(Some(raw.as_str())).ok_or_else(|| ValidationError::InvalidDate(raw.clone()))?,
            ),
            None => None,
        };

        let paid_amount = match self.paid_amount {
            Some(amount) if !amount.is_finite() => {
                return Err(ValidationError::InvalidNumber {
                    field: "paidAmount",
                })
            }
            other => other,
        };

        let covered_weeks = match self.covered_weeks {
            Some(weeks) if !weeks.is_finite() => {
                return Err(ValidationError::InvalidNumber {
                    field: "coveredWeeks",
                })
            }
            Some(weeks) if weeks.fract() != 0.0 => {
                return Err(ValidationError::FractionalWeeks(weeks))
            }
            // i64::MAX as f64 rounds up to 2^63, which is itself out of range.
            Some(weeks) if weeks < i64::MIN as f64 || weeks >= i64::MAX as f64 => {
                return Err(ValidationError::InvalidNumber {
                    field: "coveredWeeks",
                })
            }
            Some(weeks) => Some(weeks as i64),
            None => None,
        };

        Ok(MemberFields {
            first_name,
            last_name: clean_optional_string(self.last_name.as_deref()),
            email: clean_optional_string(self.email.as_deref()),
            home_phone: clean_optional_string(self.home_phone.as_deref()),
            mobile_phone: clean_optional_string(self.mobile_phone.as_deref()),
            address1: clean_optional_string(self.address1.as_deref()),
            address2: clean_optional_string(self.address2.as_deref()),
            city: clean_optional_string(self.city.as_deref()),
            state: clean_optional_string(self.state.as_deref()),
            zip: clean_optional_string(self.zip.as_deref()),
            zip4: clean_optional_string(self.zip4.as_deref()),
            product_name: clean_optional_string(self.product_name.as_deref()),
            date_purchased,
            paid_amount,
            covered_weeks,
            last_state_worked: clean_optional_string(self.last_state_worked.as_deref()),
        })
    }
}

/// An edit: the new field values plus the version the editor last saw.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequest {
    #[serde(flatten)]
    pub input: MemberInput,
    #[serde(default)]
    pub version: Option<u64>,
    #[serde(default)]
    pub last_modified_by: Option<String>,
}

impl UpdateRequest {
    /// The submitted version, the cleaned payload, and the attribution.
    pub fn validate(&self) -> Result<(u64, MemberFields, Option<String>), ValidationError> {
        let version = self.version.ok_or(ValidationError::MissingVersion)?;
        if version == 0 {
            return Err(ValidationError::ZeroVersion);
        }
        let fields = self.input.validate()?;
        let modified_by = clean_optional_string(self.last_modified_by.as_deref());
        Ok((version, fields, modified_by))
    }
}

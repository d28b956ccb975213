//! Member search - filters built from query-string parameters.
//!
//! Every present, non-blank parameter adds one condition and all conditions
//! must hold. Text matches are substring matches; names, email, address,
//! city, state and product ignore case, phone numbers and zip codes don't.

use std::cmp::Ordering;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::member::{clean_date, clean_number, clean_optional_string, Member};

/// Rejected search parameters.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QueryError {
    #[error("{field} is not a number: {value}")]
    InvalidNumber { field: &'static str, value: String },
    #[error("datePurchased is not a valid date: {0}")]
    InvalidDate(String),
}

/// Raw search parameters, as they appear in the query string.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchParams {
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub mobile_phone: Option<String>,
    pub first_name: Option<String>,
    pub home_phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub product_name: Option<String>,
    pub date_purchased: Option<String>,
    pub paid_amount_min: Option<String>,
    pub paid_amount_max: Option<String>,
    pub has_covered_weeks: Option<String>,
}

/// A parsed member filter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemberQuery {
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub mobile_phone: Option<String>,
    pub first_name: Option<String>,
    pub home_phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub product_name: Option<String>,
    pub date_purchased: Option<NaiveDate>,
    pub paid_amount_min: Option<f64>,
    pub paid_amount_max: Option<f64>,
    pub has_covered_weeks: bool,
}

impl TryFrom<&SearchParams> for MemberQuery {
    type Error = QueryError;

    fn try_from(params: &SearchParams) -> Result<Self, Self::Error> {
        let date_purchased = match clean_optional_string(params.date_purchased.as_deref()) {
            Some(raw) => Some(clean_date(Some(raw.as_str())).ok_or(QueryError::InvalidDate(raw))?),
            None => None,
        };

        Ok(Self {
            last_name: clean_optional_string(params.last_name.as_deref()),
            email: clean_optional_string(params.email.as_deref()),
            mobile_phone: clean_optional_string(params.mobile_phone.as_deref()),
            first_name: clean_optional_string(params.first_name.as_deref()),
            home_phone: clean_optional_string(params.home_phone.as_deref()),
            address: clean_optional_string(params.address.as_deref()),
            city: clean_optional_string(params.city.as_deref()),
            state: clean_optional_string(params.state.as_deref()),
            zip: clean_optional_string(params.zip.as_deref()),
            product_name: clean_optional_string(params.product_name.as_deref()),
            date_purchased,
            paid_amount_min: parse_bound("paidAmountMin", params.paid_amount_min.as_deref())?,
            paid_amount_max: parse_bound("paidAmountMax", params.paid_amount_max.as_deref())?,
            has_covered_weeks: params.has_covered_weeks.as_deref() == Some("true"),
        })
    }
}

fn parse_bound(field: &'static str, raw: Option<&str>) -> Result<Option<f64>, QueryError> {
    let Some(raw) = clean_optional_string(raw) else {
        return Ok(None);
    };
    match clean_number(Some(raw.as_str())) {
        Some(value) => Ok(Some(value)),
        None => Err(QueryError::InvalidNumber { field, value: raw }),
    }
}

fn contains_ignore_case(haystack: Option<&str>, needle: &str) -> bool {
    haystack.is_some_and(|h| h.to_lowercase().contains(&needle.to_lowercase()))
}

fn contains(haystack: Option<&str>, needle: &str) -> bool {
    haystack.is_some_and(|h| h.contains(needle))
}

impl MemberQuery {
    /// True when no condition is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn matches(&self, member: &Member) -> bool {
        let f = &member.fields;

        let text = |want: &Option<String>, have: Option<&str>| {
            want.as_deref()
                .map_or(true, |needle| contains_ignore_case(have, needle))
        };
        let exact_case = |want: &Option<String>, have: Option<&str>| {
            want.as_deref().map_or(true, |needle| contains(have, needle))
        };

        text(&self.last_name, f.last_name.as_deref())
            && text(&self.email, f.email.as_deref())
            && exact_case(&self.mobile_phone, f.mobile_phone.as_deref())
            && text(&self.first_name, Some(f.first_name.as_str()))
            && exact_case(&self.home_phone, f.home_phone.as_deref())
            && self.address.as_deref().map_or(true, |needle| {
                contains_ignore_case(f.address1.as_deref(), needle)
                    || contains_ignore_case(f.address2.as_deref(), needle)
            })
            && text(&self.city, f.city.as_deref())
            && text(&self.state, f.state.as_deref())
            && self.zip.as_deref().map_or(true, |needle| {
                contains(f.zip.as_deref(), needle) || contains(f.zip4.as_deref(), needle)
            })
            && text(&self.product_name, f.product_name.as_deref())
            && self
                .date_purchased
                .map_or(true, |date| f.date_purchased == Some(date))
            && self
                .paid_amount_min
                .map_or(true, |min| f.paid_amount.is_some_and(|paid| paid >= min))
            && self
                .paid_amount_max
                .map_or(true, |max| f.paid_amount.is_some_and(|paid| paid <= max))
            && (!self.has_covered_weeks || f.covered_weeks.is_some_and(|weeks| weeks > 0))
    }
}

/// Order by last name ascending, members without one last, then by id.
pub fn by_last_name(a: &Member, b: &Member) -> Ordering {
    let names = match (&a.fields.last_name, &b.fields.last_name) {
        (Some(x), Some(y)) => x.cmp(y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    names.then(a.id.cmp(&b.id))
}

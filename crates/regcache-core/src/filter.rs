//! Validation of the date filters accepted by the live registry view.

use chrono::{Months, NaiveDate, NaiveDateTime};

use crate::error::{Error, Result};
use crate::expiration::EXPIRATION_MONTHS;
use crate::utils::format::{REMOTE_DATETIME_FORMAT, REMOTE_DATE_FORMAT};

/// Registration/modification lower bounds for a registry query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateFilter {
    pub registered_since: NaiveDate,
    pub modified_since: Option<NaiveDateTime>,
}

impl DateFilter {
    /// Parse raw query values.
    ///
    /// `registered_since` must be `YYYY-MM-DD` and defaults to two years before
    /// `today`; `modified_since` must be `YYYY-MM-DD HH:MM:SS` when given.
    /// Empty values count as absent.
    pub fn parse(
        registered_since: Option<&str>,
        modified_since: Option<&str>,
        today: NaiveDate,
    ) -> Result<Self> {
        let registered_since = match registered_since.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => NaiveDate::parse_from_str(raw, REMOTE_DATE_FORMAT).map_err(|_| {
                Error::InvalidInput(format!(
                    "registration date must be YYYY-MM-DD, got {:?}",
                    raw
                ))
            })?,
            None => Self::default_registered_since(today),
        };

        let modified_since = match modified_since.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => Some(
                NaiveDateTime::parse_from_str(raw, REMOTE_DATETIME_FORMAT).map_err(|_| {
                    Error::InvalidInput(format!(
                        "modification date must be YYYY-MM-DD HH:MM:SS, got {:?}",
                        raw
                    ))
                })?,
            ),
            None => None,
        };

        Ok(Self {
            registered_since,
            modified_since,
        })
    }

    fn default_registered_since(today: NaiveDate) -> NaiveDate {
        today
            .checked_sub_months(Months::new(EXPIRATION_MONTHS))
            .unwrap_or(NaiveDate::MIN)
    }
}

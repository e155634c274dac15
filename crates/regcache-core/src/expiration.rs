//! Expiration tracking.
//!
//! A customer expires two calendar years after its effective date: the
//! modification date when there is one, the registration date otherwise.
//! Adding two years is done as adding 24 months, so Feb 29 lands on Feb 28.

use chrono::{Local, Months, NaiveDateTime};
use tracing::debug;

use crate::models::{CustomerCache, CustomerRecord, ExpirationEntry, ExpirationStatus};

/// Length of the expiration window
pub const EXPIRATION_MONTHS: u32 = 24;

const SECONDS_PER_DAY: f64 = 86_400.0;

pub fn expiration_date(effective: NaiveDateTime) -> NaiveDateTime {
    effective
        .checked_add_months(Months::new(EXPIRATION_MONTHS))
        .unwrap_or(NaiveDateTime::MAX)
}

/// Whole days from `now` until `expiration`, truncated toward zero
pub fn days_remaining(expiration: NaiveDateTime, now: NaiveDateTime) -> i64 {
    (expiration - now).num_days()
}

/// Days from `now` until `expiration`, rounded to the nearest day with
/// halves going up. Used by the live registry listing.
pub fn rounded_days_remaining(expiration: NaiveDateTime, now: NaiveDateTime) -> i64 {
    let days = (expiration - now).num_seconds() as f64 / SECONDS_PER_DAY;
    (days + 0.5).floor() as i64
}

/// Expiration row for one customer. `None` without a registration date.
pub fn expiration_entry(record: &CustomerRecord, now: NaiveDateTime) -> Option<ExpirationEntry> {
    let Some(registered) = record.registration_date else {
        debug!(id = %record.id, "Customer has no registration date, skipping");
        return None;
    };
    let effective = record.modification_date.unwrap_or(registered);
    let expires = expiration_date(effective);
    let days = days_remaining(expires, now);

    Some(ExpirationEntry {
        id: record.id.clone(),
        name: record.name.clone(),
        registration_date: record.registration_date,
        modification_date: record.modification_date,
        expiration_date: expires,
        days_remaining: days,
        status: ExpirationStatus::from_days_remaining(days),
        email: record.email().map(str::to_string),
        phone: record.phone().map(str::to_string),
        tax_id: record.tax_id().map(str::to_string),
    })
}

/// Expiration rows for `records`, soonest expiration first
pub fn expiration_report<'a, I>(records: I, now: NaiveDateTime) -> Vec<ExpirationEntry>
where
    I: IntoIterator<Item = &'a CustomerRecord>,
{
    let mut entries: Vec<ExpirationEntry> = records
        .into_iter()
        .filter_map(|record| expiration_entry(record, now))
        .collect();
    entries.sort_by_key(|e| e.expiration_date);
    entries
}

/// Rows for a live registry listing. Same ordering and status as
/// `expiration_report`, but `days_remaining` is rounded rather than truncated.
pub fn registry_listing<'a, I>(records: I, now: NaiveDateTime) -> Vec<ExpirationEntry>
where
    I: IntoIterator<Item = &'a CustomerRecord>,
{
    let mut entries = expiration_report(records, now);
    for entry in &mut entries {
        entry.days_remaining = rounded_days_remaining(entry.expiration_date, now);
    }
    entries
}

/// Report over every cached customer that is not flagged
pub fn compute_report_at(cache: &CustomerCache, now: NaiveDateTime) -> Vec<ExpirationEntry> {
    expiration_report(cache.unflagged(), now)
}

/// Report against the current local time
pub fn compute_report(cache: &CustomerCache) -> Vec<ExpirationEntry> {
    compute_report_at(cache, Local::now().naive_local())
}

/// Flagged customers, verbatim, in id order
pub fn flagged_customers(cache: &CustomerCache) -> Vec<CustomerRecord> {
    cache.flagged().cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn customer(id: &str, registered: Option<NaiveDateTime>, modified: Option<NaiveDateTime>) -> CustomerRecord {
        let mut record = CustomerRecord::new(id, format!("Customer {}", id));
        record.registration_date = registered;
        record.modification_date = modified;
        record
    }

    #[test]
    fn test_registration_only_customer_expired() {
        let record = customer("1", Some(at(2022, 1, 10)), None);
        let entry = expiration_entry(&record, at(2024, 6, 1)).expect("entry");

        assert_eq!(entry.expiration_date, at(2024, 1, 10));
        assert!(entry.days_remaining < 0);
        assert_eq!(entry.days_remaining, -143);
        assert_eq!(entry.status, ExpirationStatus::Expired);
    }

    #[test]
    fn test_modification_date_takes_precedence() {
        let record = customer("1", Some(at(2020, 3, 1)), Some(at(2023, 8, 20)));
        let entry = expiration_entry(&record, at(2024, 6, 1)).expect("entry");

        assert_eq!(entry.expiration_date, at(2025, 8, 20));
        assert_eq!(entry.status, ExpirationStatus::Upcoming);
    }

    #[test]
    fn test_two_years_is_exact_calendar_shift() {
        let effective = NaiveDate::from_ymd_opt(2021, 11, 30)
            .unwrap()
            .and_hms_opt(14, 5, 0)
            .unwrap();
        let expected = NaiveDate::from_ymd_opt(2023, 11, 30)
            .unwrap()
            .and_hms_opt(14, 5, 0)
            .unwrap();
        assert_eq!(expiration_date(effective), expected);
    }

    #[test]
    fn test_leap_day_clamps_to_feb_28() {
        assert_eq!(expiration_date(at(2024, 2, 29)), at(2026, 2, 28));
    }

    #[test]
    fn test_days_remaining_truncates_toward_zero() {
        let expiration = at(2024, 1, 10);
        let half_day_before = expiration - chrono::Duration::hours(12);
        let half_day_after = expiration + chrono::Duration::hours(12);
        assert_eq!(days_remaining(expiration, half_day_before), 0);
        assert_eq!(days_remaining(expiration, half_day_after), 0);
        assert_eq!(days_remaining(expiration, at(2024, 1, 12)), -2);
        assert_eq!(ExpirationStatus::from_days_remaining(0), ExpirationStatus::Upcoming);
    }

    #[test]
    fn test_missing_registration_date_is_excluded() {
        let cache: CustomerCache = vec![
            customer("1", None, Some(at(2023, 1, 1))),
            customer("2", Some(at(2023, 1, 1)), None),
        ]
        .into_iter()
        .collect();

        let report = compute_report_at(&cache, at(2024, 1, 1));
        assert_eq!(report.len(), 1);
        assert_eq!(report[0].id, "2");
    }

    #[test]
    fn test_report_sorted_and_excludes_flagged() {
        let mut flagged = customer("4", Some(at(2019, 1, 1)), None);
        flagged.flag = Some(true);
        let cache: CustomerCache = vec![
            customer("1", Some(at(2023, 5, 1)), None),
            customer("2", Some(at(2021, 1, 1)), Some(at(2022, 9, 9))),
            customer("3", Some(at(2020, 7, 7)), None),
            flagged,
        ]
        .into_iter()
        .collect();

        let report = compute_report_at(&cache, at(2024, 1, 1));
        let ids: Vec<&str> = report.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["3", "2", "1"]);
        assert!(report
            .windows(2)
            .all(|pair| pair[0].expiration_date <= pair[1].expiration_date));
    }

    #[test]
    fn test_cleared_flag_rejoins_report() {
        let mut record = customer("1", Some(at(2022, 1, 10)), None);
        record.flag = Some(true);
        let mut cache: CustomerCache = std::iter::once(record).collect();
        assert!(compute_report_at(&cache, at(2024, 1, 1)).is_empty());

        cache.get_mut("1").expect("record").flag = None;
        assert_eq!(compute_report_at(&cache, at(2024, 1, 1)).len(), 1);

        cache.get_mut("1").expect("record").flag = Some(false);
        assert_eq!(compute_report_at(&cache, at(2024, 1, 1)).len(), 1);
    }

    #[test]
    fn test_flagged_customers_verbatim() {
        let mut flagged = customer("9", None, None);
        flagged.flag = Some(true);
        flagged
            .extra
            .insert("email_cliente".to_string(), serde_json::json!("x@y.com"));
        let cache: CustomerCache = vec![flagged.clone(), customer("1", Some(at(2022, 1, 1)), None)]
            .into_iter()
            .collect();

        assert_eq!(flagged_customers(&cache), vec![flagged]);
    }

    #[test]
    fn test_entry_serializes_dates_as_days() {
        let mut record = customer("1", Some(at(2022, 1, 10)), None);
        record
            .extra
            .insert("cnpj_cliente".to_string(), serde_json::json!("12.345.678/0001-90"));
        let entry = expiration_entry(&record, at(2024, 6, 1)).expect("entry");
        let json = serde_json::to_value(&entry).expect("serialize");

        assert_eq!(json["expiration_date"], "2024-01-10");
        assert_eq!(json["registration_date"], "2022-01-10");
        assert!(json["modification_date"].is_null());
        assert_eq!(json["status"], "Expired");
        assert_eq!(json["tax_id"], "12.345.678/0001-90");
        assert!(json.get("email").is_none());
    }

    #[test]
    fn test_registry_listing_rounds_days() {
        // Expires 2024-01-10 00:00; 36 hours before is 1.5 days out
        let record = customer("1", Some(at(2022, 1, 10)), None);
        let now = at(2024, 1, 8) + chrono::Duration::hours(12);

        let report = expiration_report([&record], now);
        assert_eq!(report[0].days_remaining, 1);

        let listing = registry_listing([&record], now);
        assert_eq!(listing[0].days_remaining, 2);
        assert_eq!(listing[0].status, ExpirationStatus::Upcoming);
    }

    #[test]
    fn test_rounded_days_remaining_halves_go_up() {
        let expires = at(2024, 1, 10);
        assert_eq!(rounded_days_remaining(expires, expires - chrono::Duration::hours(11)), 0);
        assert_eq!(rounded_days_remaining(expires, expires + chrono::Duration::hours(12)), 0);
        assert_eq!(rounded_days_remaining(expires, expires + chrono::Duration::hours(13)), -1);
    }
}

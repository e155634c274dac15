//! Server-rendered HTML pages. All dynamic text goes through `escape_html`.

use regcache_core::utils::{escape_html, format_date, format_optional_date};
use regcache_core::{CustomerRecord, DateFilter, ExpirationEntry, ExpirationStatus};

const STYLE: &str = "\
table { width: 100%; border-collapse: collapse; }
th, td { padding: 8px 12px; border: 1px solid #ccc; }
th { background-color: #f4f4f4; }
tr.expired td { color: #a40000; }
nav a { margin-right: 12px; }";

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>
<html lang=\"en\">
<head>
<meta charset=\"UTF-8\">
<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">
<title>{title}</title>
<style>
{style}
</style>
</head>
<body>
<nav><a href=\"/\">Expiring</a><a href=\"/flagged\">Flagged</a><a href=\"/registry\">Registry</a></nav>
<h1>{title}</h1>
{body}
</body>
</html>
",
        title = escape_html(title),
        style = STYLE,
        body = body,
    )
}

fn table(headers: &[&str], rows: &[String]) -> String {
    let head: String = headers
        .iter()
        .map(|h| format!("<th>{}</th>", escape_html(h)))
        .collect();
    format!(
        "<table>\n<thead><tr>{}</tr></thead>\n<tbody>\n{}\n</tbody>\n</table>",
        head,
        rows.join("\n")
    )
}

fn cell(value: &str) -> String {
    format!("<td>{}</td>", escape_html(value))
}

/// Cached customers with their expiration status
pub(crate) fn report_page(entries: &[ExpirationEntry], cache_age: &str) -> String {
    let rows: Vec<String> = entries
        .iter()
        .map(|e| {
            let class = match e.status {
                ExpirationStatus::Expired => " class=\"expired\"",
                ExpirationStatus::Upcoming => "",
            };
            format!(
                "<tr{}>{}{}{}{}{}{}{}</tr>",
                class,
                cell(&e.id),
                cell(&e.name),
                cell(&format_optional_date(e.registration_date.as_ref(), "-")),
                cell(&format_optional_date(e.modification_date.as_ref(), "-")),
                cell(&format_date(&e.expiration_date)),
                cell(&e.days_remaining.to_string()),
                cell(&e.status.to_string()),
            )
        })
        .collect();

    let body = format!(
        "<p>{} customers tracked. Cache updated {}.</p>\n{}",
        entries.len(),
        escape_html(cache_age),
        table(
            &["Id", "Name", "Registered", "Modified", "Expires", "Days remaining", "Status"],
            &rows
        )
    );
    page("Customer expirations", &body)
}

pub(crate) fn flagged_page(customers: &[CustomerRecord]) -> String {
    let rows: Vec<String> = customers
        .iter()
        .map(|c| {
            format!(
                "<tr>{}{}{}{}</tr>",
                cell(&c.id),
                cell(&c.name),
                cell(&format_optional_date(c.registration_date.as_ref(), "-")),
                cell(&format_optional_date(c.modification_date.as_ref(), "-")),
            )
        })
        .collect();

    let body = format!(
        "<p>{} customers excluded from expiration tracking.</p>\n{}",
        customers.len(),
        table(&["Id", "Name", "Registered", "Modified"], &rows)
    );
    page("Flagged customers", &body)
}

/// Live registry listing for a date filter
pub(crate) fn registry_page(entries: &[ExpirationEntry], filter: &DateFilter) -> String {
    let rows: Vec<String> = entries
        .iter()
        .map(|e| {
            format!(
                "<tr>{}{}{}{}{}</tr>",
                cell(&e.name),
                cell(e.email.as_deref().unwrap_or("")),
                cell(e.phone.as_deref().unwrap_or("")),
                cell(e.tax_id.as_deref().unwrap_or("N/A")),
                cell(&e.days_remaining.to_string()),
            )
        })
        .collect();

    let mut criteria = format!(
        "Registered since {}",
        filter.registered_since.format("%Y-%m-%d")
    );
    if let Some(modified) = filter.modified_since {
        criteria.push_str(&format!(", modified since {}", modified.format("%Y-%m-%d %H:%M:%S")));
    }

    let body = format!(
        "<p>{}.</p>\n{}",
        escape_html(&criteria),
        table(&["Name", "Email", "Phone", "CNPJ", "Days remaining"], &rows)
    );
    page("Registry customers", &body)
}

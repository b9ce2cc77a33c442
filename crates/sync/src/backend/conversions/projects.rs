//! Project row conversions.

use serde_json::{Value, json};
use siteline_core::Project;

use super::{date, decimal, enumeration, id, integer, text, text_or};

/// Map a `projects` row. `progress` is clamped to `0..=100`.
#[must_use]
pub fn map_project(row: &Value) -> Project {
    let progress = u8::try_from(integer(row, "progress").clamp(0, 100)).unwrap_or(0);

    Project {
        id: id(row),
        name: text_or(row, "name", ""),
        client_name: text_or(row, "client_name", ""),
        site_address: text(row, "site_address"),
        status: enumeration(row, "status"),
        budget: decimal(row, "budget"),
        currency: enumeration(row, "currency"),
        progress,
        start_date: date(row, "start_date"),
        due_date: date(row, "due_date"),
    }
}

/// Build the `projects` row for `project`.
#[must_use]
pub fn project_row(project: &Project) -> Value {
    json!({
        "id": project.id,
        "name": project.name,
        "client_name": project.client_name,
        "site_address": project.site_address,
        "status": project.status.to_string(),
        "budget": project.budget.to_string(),
        "currency": project.currency.to_string(),
        "progress": project.progress,
        "start_date": project.start_date.map(|d| d.format("%Y-%m-%d").to_string()),
        "due_date": project.due_date.map(|d| d.format("%Y-%m-%d").to_string()),
    })
}

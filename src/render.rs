//! Terminal rendering for catalog pages, applications and credentials.

use comfy_table::{modifiers, presets, ContentArrangement, Table};
use terminal_size::{terminal_size, Width};
use yansi::Paint;

use crate::catalog::{Pagination, ViewMode};
use crate::models::{Application, CatalogEntry, Credential, OneTimeSecret, PortalContext, ResultPage};
use crate::notice::{Notice, NoticeLevel};

const DESCRIPTION_WIDTH: usize = 80;

pub fn new_table() -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL);
    table.apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    if let Some((Width(w), _)) = terminal_size() {
        table.set_width(w.saturating_sub(4));
    }
    table
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", cut.trim_end())
}

fn latest_version_label(entry: &CatalogEntry) -> String {
    entry
        .latest_version()
        .map(|v| v.version.clone())
        .unwrap_or_else(|| "-".to_string())
}

pub fn catalog_table(page: &ResultPage) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Service", "Version", "Description", "Docs"]);
    for entry in &page.items {
        table.add_row(vec![
            entry.name.clone(),
            latest_version_label(entry),
            entry.description.as_deref().map(|d| truncate(d, DESCRIPTION_WIDTH)).unwrap_or_default(),
            if entry.has_documentation { "yes".into() } else { String::new() },
        ]);
    }
    table
}

/// One block per service: name with its latest version, then the
/// description.
pub fn catalog_cards(page: &ResultPage) -> String {
    let mut out = String::new();
    for entry in &page.items {
        out.push_str(&format!(
            "{}  {}\n",
            entry.name.as_str().bold(),
            latest_version_label(entry).cyan()
        ));
        if let Some(desc) = entry.description.as_deref().filter(|d| !d.trim().is_empty()) {
            out.push_str(&format!("  {}\n", truncate(desc, DESCRIPTION_WIDTH).dim()));
        }
        out.push_str(&format!("  {}\n\n", entry.id.as_str().dim()));
    }
    out
}

pub fn catalog_page(page: &ResultPage, mode: ViewMode) -> String {
    if page.is_empty() {
        return "No services found".to_string();
    }
    match mode {
        ViewMode::Table => format!("{}", catalog_table(page)),
        ViewMode::Card => catalog_cards(page),
    }
}

/// `"13 - 24 of 37"`, or `None` for an empty result set.
pub fn range_line(pagination: &Pagination) -> Option<String> {
    pagination
        .current_range()
        .map(|(from, to)| format!("{} - {} of {}", from, to, pagination.total_count()))
}

/// Paging keys that currently do something.
pub fn navigation_hint(pagination: &Pagination) -> String {
    let mut keys = vec![];
    if pagination.can_go_first() {
        keys.push("[f]irst");
        keys.push("[p]rev");
    }
    if pagination.can_go_next() {
        keys.push("[n]ext");
        keys.push("[l]ast");
    }
    keys.join("  ")
}

pub fn applications_table(apps: &[Application], ctx: &PortalContext) -> Table {
    let mut table = new_table();
    table.set_header(vec!["ID", "Name", "Reference ID", "Registrations", "Mode"]);
    for app in apps {
        let mode = match (app.is_dcr, app.is_compatible_with(ctx)) {
            (true, true) => "dcr".to_string(),
            (false, true) => "key-auth".to_string(),
            (true, false) => "dcr (incompatible)".to_string(),
            (false, false) => "key-auth (incompatible)".to_string(),
        };
        table.add_row(vec![
            app.id.clone(),
            app.name.clone(),
            app.reference_id.clone().unwrap_or_default(),
            app.registrations.len().to_string(),
            mode,
        ]);
    }
    table
}

pub fn application_detail(app: &Application) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Field", "Value"]);
    table.add_row(vec!["ID", app.id.as_str()]);
    table.add_row(vec!["Name", app.name.as_str()]);
    table.add_row(vec!["Description", app.description.as_deref().unwrap_or("")]);
    table.add_row(vec!["Reference ID", app.reference_id.as_deref().unwrap_or("")]);
    table.add_row(vec!["Redirect URI", app.redirect_uri.as_deref().unwrap_or("")]);
    table.add_row(vec!["DCR", if app.is_dcr { "yes" } else { "no" }]);
    table
}

pub fn registrations_table(app: &Application) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Service", "Version", "Status", "Created"]);
    for reg in &app.registrations {
        table.add_row(vec![
            reg.service_name.clone().unwrap_or_else(|| reg.service_version_id.clone()),
            reg.version_name.clone().unwrap_or_default(),
            reg.status.as_str().to_string(),
            reg.created_at.map(|t| t.format("%Y-%m-%d %H:%M").to_string()).unwrap_or_default(),
        ]);
    }
    table
}

pub fn credentials_table(credentials: &[Credential]) -> Table {
    let mut table = new_table();
    table.set_header(vec!["ID", "Name"]);
    for c in credentials {
        table.add_row(vec![c.id.as_str(), c.display_name.as_str()]);
    }
    table
}

pub fn secret_table(secret: &OneTimeSecret) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Field", "Value"]);
    for (field, value) in secret.fields() {
        table.add_row(vec![field, value]);
    }
    table
}

pub fn print_secret(secret: &OneTimeSecret) {
    println!("\n{}", secret.label().bold());
    println!("{}", secret_table(secret));
    println!(
        "{}\n",
        "Copy it now: this value will not be shown again.".yellow()
    );
}

pub fn print_notices(notices: &[Notice]) {
    for n in notices {
        match n.level {
            NoticeLevel::Success => println!("{}", n.message.as_str().green()),
            NoticeLevel::Info => println!("{}", n.message.as_str().cyan()),
            NoticeLevel::Error => eprintln!("{}", n.message.as_str().red()),
        }
    }
}

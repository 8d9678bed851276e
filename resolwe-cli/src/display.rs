//! Terminal rendering of data objects and schemas

use colored::*;
use resolwe_core::domain::data::{Data, DataStatus};
use resolwe_core::domain::descriptor::{DescriptorSchema, SchemaField};
use serde_json::Value as JsonValue;

/// Print a one-entry summary of a data object
pub fn print_data_summary(data: &Data) {
    println!("  {} Data {}", "▸".cyan(), data.id.to_string().bold());
    if !data.name.is_empty() {
        println!("    Name:    {}", data.name);
    }
    if !data.process_slug.is_empty() {
        println!("    Process: {}", data.process_slug.dimmed());
    }
    println!("    Status:  {}", colorize_status(data.status));
    println!();
}

/// Print detailed data object information
pub fn print_data_details(data: &Data) {
    println!("{}", "Data Details:".bold());
    println!("  ID:        {}", data.id.to_string().cyan());
    if !data.slug.is_empty() {
        println!("  Slug:      {}", data.slug);
    }
    if !data.name.is_empty() {
        println!("  Name:      {}", data.name);
    }
    if !data.process_slug.is_empty() {
        println!("  Process:   {}", data.process_slug);
    }
    println!("  Status:    {}", colorize_status(data.status));

    if let Some(started) = data.started {
        println!("  Started:   {}", started.format("%Y-%m-%d %H:%M:%S"));
    }

    if let Some(finished) = data.finished {
        println!("  Finished:  {}", finished.format("%Y-%m-%d %H:%M:%S"));

        if let Some(started) = data.started {
            let seconds = finished.signed_duration_since(started).num_seconds();
            println!("  Duration:  {}s", seconds);
        }
    }

    print_values("Inputs:", data.input.iter());
    print_values("Outputs:", data.output.iter());

    if let Some(error) = data.error_message() {
        println!("\n{}", "Error:".bold());
        println!("{}", error.red());
    }

    if !data.current_user_permissions.is_empty() {
        println!("\n{}", "Permissions:".bold());
        for perm in &data.current_user_permissions {
            println!(
                "  {} ({}): {}",
                perm.name.as_deref().unwrap_or("?"),
                perm.kind.as_deref().unwrap_or("?"),
                perm.permissions.join(",")
            );
        }
    }
}

fn print_values<'a>(title: &str, values: impl Iterator<Item = (&'a String, &'a JsonValue)>) {
    let mut values: Vec<_> = values.collect();
    if values.is_empty() {
        return;
    }
    values.sort_by(|a, b| a.0.cmp(b.0));

    println!("\n{}", title.bold());
    for (key, value) in values {
        println!("  {} = {}", key.cyan(), value);
    }
}

/// Print data objects as a table whose columns come from a descriptor schema
pub fn print_data_table(objects: &[Data], schema: &DescriptorSchema) {
    let fields = schema.tabular_fields();
    let header: Vec<String> = std::iter::once("ID".to_string())
        .chain(fields.iter().map(|f| f.display_label().to_string()))
        .collect();
    println!("{}", header.join("\t").bold());

    for data in objects {
        let row: Vec<String> = std::iter::once(data.id.to_string())
            .chain(fields.iter().map(|f| tabular_value(data, f)))
            .collect();
        println!("{}", row.join("\t"));
    }
}

/// Value of a tabular descriptor field
///
/// File name and size fall back to the `table` output when the descriptor
/// does not carry them.
pub fn tabular_value(data: &Data, field: &SchemaField) -> String {
    let from_descriptor = data
        .descriptor
        .get("tabular")
        .and_then(|tabular| tabular.get(&field.name))
        .filter(|value| !value.is_null());

    let value = match (from_descriptor, field.name.as_str()) {
        (Some(value), _) => Some(value),
        (None, "file_name") => data.output.get("table").and_then(|t| t.get("file")),
        (None, "file_size") => data.output.get("table").and_then(|t| t.get("size")),
        (None, _) => None,
    };

    match value {
        Some(JsonValue::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => "?".to_string(),
    }
}

/// Print descriptor schema fields as an indented tree
pub fn print_schema(schema: &DescriptorSchema) {
    println!("{}", "Descriptor Schema:".bold());
    println!("  ID:   {}", schema.id.to_string().cyan());
    println!("  Slug: {}", schema.slug);
    if !schema.name.is_empty() {
        println!("  Name: {}", schema.name);
    }
    println!();

    for field in &schema.schema {
        print_field(field, 1);
    }
}

fn print_field(field: &SchemaField, depth: usize) {
    let indent = "  ".repeat(depth);
    let kind = field.kind.as_deref().unwrap_or("group");
    println!(
        "{}{} {} {}",
        indent,
        field.name.cyan(),
        field.display_label(),
        format!("({})", kind).dimmed()
    );
    for child in &field.group {
        print_field(child, depth + 1);
    }
}

/// Colorize a data status for display
pub fn colorize_status(status: DataStatus) -> ColoredString {
    let text = status.to_string().to_uppercase();
    match status {
        DataStatus::Pending => text.yellow(),
        DataStatus::Running => text.cyan(),
        DataStatus::Ok => text.green(),
        DataStatus::Error => text.red(),
    }
}

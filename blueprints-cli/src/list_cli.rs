//! `blueprints list` command

use anyhow::Result;
use std::path::Path;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

use blueprints_core::registry::{Blueprint, Catalog, CatalogStore};

/// Table row for registry entries
#[derive(Tabled)]
struct BlueprintRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Version")]
    version: String,
    #[tabled(rename = "Tags")]
    tags: String,
    #[tabled(rename = "Description")]
    description: String,
}

impl From<&Blueprint> for BlueprintRow {
    fn from(entry: &Blueprint) -> Self {
        Self {
            name: entry.name.clone(),
            version: entry.version.clone(),
            tags: entry.tags.join(", "),
            description: truncate(&entry.description, 50),
        }
    }
}

pub fn execute(registry: &Path, json_output: bool) -> Result<()> {
    let catalog = CatalogStore::new(registry).load()?;
    println!("{}", render(&catalog, json_output)?);
    Ok(())
}

fn render(catalog: &Catalog, json_output: bool) -> Result<String> {
    if json_output {
        return Ok(serde_json::to_string_pretty(catalog.entries())?);
    }

    if catalog.is_empty() {
        return Ok("No blueprints registered.".to_string());
    }

    let rows: Vec<BlueprintRow> = catalog.iter().map(BlueprintRow::from).collect();
    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()))
        .to_string();

    Ok(format!("{} blueprint(s):\n\n{table}", catalog.len()))
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let head: String = text.chars().take(max_chars - 3).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}

use anyhow::{Context, Result};

use scrollsync_core::{AppConfig, ProgressStore};

pub async fn run(config: &AppConfig) -> Result<()> {
    let path = config.store_path();
    let store = ProgressStore::open(&path)
        .with_context(|| format!("Failed to open progress store {}", path.display()))?;

    if store.is_empty() {
        println!("No saved reading positions yet.");
        println!("\nTo start reading, run:");
        println!("  scrollsync read <file>");
        return Ok(());
    }

    println!("Saved positions ({}):\n", store.len());

    let mut entries: Vec<_> = store.entries().collect();
    entries.sort_by(|a, b| b.1.updated_at.cmp(&a.1.updated_at));

    for (document, saved) in entries {
        println!("  {:>5.1}%  {}", saved.progress * 100.0, document);
        println!(
            "          Last read: {}",
            saved.updated_at.format("%Y-%m-%d %H:%M")
        );
    }

    Ok(())
}

use std::path::Path;

use anyhow::{Context, Result};

use scrollsync_core::{store::document_key, AppConfig, ProgressStore};

pub async fn run(config: &AppConfig, file: &Path) -> Result<()> {
    let path = config.store_path();
    let mut store = ProgressStore::open(&path)
        .with_context(|| format!("Failed to open progress store {}", path.display()))?;

    let key = document_key(file);
    match store.remove(&key) {
        Some(saved) => {
            store.save()?;
            println!(
                "Forgot position {:.1}% for: {}",
                saved.progress * 100.0,
                key
            );
        }
        None => {
            println!("No saved position for '{}'.", file.display());
            if !store.is_empty() {
                println!("\nSaved documents:");
                for (document, _) in store.entries() {
                    println!("  - {}", document);
                }
            }
        }
    }

    Ok(())
}

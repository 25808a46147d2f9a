use super::context::AppContext;
use crate::output::Output;
use color_eyre::Result;
use comfy_table::{Cell, Table};
use movie_cache_config::{Config, CredentialStore, PathManager, API_KEY_ENV};
use owo_colors::OwoColorize;
use serde_json::json;

pub async fn run_config(cmd: &crate::ConfigCommands, output: &Output) -> Result<()> {
    match cmd {
        crate::ConfigCommands::Init { api_key, force } => init_config(api_key.clone(), *force, output).await,
        crate::ConfigCommands::Show => show_config(output).await,
    }
}

/// Show only the first and last few characters of a secret.
fn mask(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}…{}", head, tail)
}

async fn init_config(api_key: Option<String>, force: bool, output: &Output) -> Result<()> {
    let path_manager = PathManager::default();
    path_manager
        .ensure_directories()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to create directories: {}", e))?;

    let config_file = path_manager.config_file();
    if config_file.exists() && !force {
        output.info(format!("Keeping existing configuration at {}", config_file.display()));
    } else {
        Config::default()
            .save_to_file(&config_file)
            .map_err(|e| color_eyre::eyre::eyre!("Failed to write config to {}: {}", config_file.display(), e))?;
        output.success(format!("Wrote default configuration to {}", config_file.display()));
    }

    if let Some(key) = api_key {
        let credentials_file = path_manager.credentials_file();
        let mut cred_store = CredentialStore::new(credentials_file.clone());
        cred_store
            .load()
            .map_err(|e| color_eyre::eyre::eyre!("Failed to load credentials: {}", e))?;
        cred_store.set_tmdb_api_key(key.trim().to_string());
        cred_store
            .save()
            .map_err(|e| color_eyre::eyre::eyre!("Failed to save credentials: {}", e))?;
        output.success(format!("Stored TMDB API key in {}", credentials_file.display()));
    }

    Ok(())
}

async fn show_config(output: &Output) -> Result<()> {
    let ctx = AppContext::load()?;
    let mut cred_store = CredentialStore::new(ctx.paths.credentials_file());
    cred_store
        .load()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load credentials: {}", e))?;
    let api_key = cred_store.resolve_tmdb_api_key().ok().map(|k| mask(&k));
    let store_path = ctx.config.store_path(&ctx.paths);
    let tmdb = &ctx.config.tmdb;

    if !output.is_human() {
        output.json(&json!({
            "config_file": ctx.paths.config_file(),
            "api_key": api_key,
            "api_base_url": tmdb.api_base_url,
            "image_base_url": tmdb.image_base_url,
            "image_size": tmdb.image_size,
            "request_timeout_secs": tmdb.request_timeout_secs,
            "store_path": store_path,
            "log_file": ctx.config.logging.file,
        }));
        return Ok(());
    }
    if output.is_quiet() {
        return Ok(());
    }

    println!("\n{}\n", "Configuration".bright_cyan().bold());
    let mut table = Table::new();
    table.set_header(vec![
        Cell::new("Setting").add_attribute(comfy_table::Attribute::Bold),
        Cell::new("Value").add_attribute(comfy_table::Attribute::Bold),
    ]);
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    table.add_row(vec!["Config file".to_string(), ctx.paths.config_file().display().to_string()]);
    table.add_row(vec![
        "API key".to_string(),
        api_key.unwrap_or_else(|| format!("not set (use {} or 'config init --api-key')", API_KEY_ENV)),
    ]);
    table.add_row(vec!["API base URL".to_string(), tmdb.api_base_url.clone()]);
    table.add_row(vec!["Image base URL".to_string(), tmdb.image_base_url.clone()]);
    table.add_row(vec!["Image size".to_string(), tmdb.image_size.clone()]);
    table.add_row(vec!["Request timeout".to_string(), format!("{}s", tmdb.request_timeout_secs)]);
    table.add_row(vec!["Movie store".to_string(), store_path.display().to_string()]);
    table.add_row(vec![
        "Log file".to_string(),
        ctx.config
            .logging
            .file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "stderr".to_string()),
    ]);
    println!("{}", table);
    Ok(())
}

use std::path::{Path, PathBuf};

use super::types::AppConfig;

/// Get the default genius data directory: ~/.genius
pub fn get_genius_data_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map_err(|_| anyhow::anyhow!("Cannot determine home directory"))?;
    Ok(PathBuf::from(home).join(".genius"))
}

pub fn load_default() -> anyhow::Result<AppConfig> {
    // Priority 1: ~/.genius/config.toml (highest)
    let genius_dir = get_genius_data_dir()?;
    let user_config = genius_dir.join("config.toml");

    // Priority 2: ./genius.toml (current directory)
    let local_config = Path::new("genius.toml");

    let mut cfg = if user_config.exists() {
        load_file(&user_config)?
    } else if local_config.exists() {
        load_file(local_config)?
    } else {
        AppConfig::default()
    };

    apply_env_overrides(&mut cfg, |key| std::env::var(key).ok());
    Ok(cfg)
}

pub fn load_file(path: &Path) -> anyhow::Result<AppConfig> {
    let s = std::fs::read_to_string(path)?;
    let cfg = toml::from_str::<AppConfig>(&s)
        .map_err(|e| anyhow::anyhow!("invalid config {}: {}", path.display(), e))?;
    Ok(cfg)
}

/// Environment variable overrides (Priority 0: highest). Blank values are ignored.
pub fn apply_env_overrides<F>(cfg: &mut AppConfig, get: F)
where
    F: Fn(&str) -> Option<String>,
{
    let var = |key: &str| get(key).filter(|v| !v.trim().is_empty());

    if let Some(v) = var("GENIUS_TEST_CMD") {
        cfg.validation.test_cmd = Some(v);
    }
    if let Some(v) = var("GENIUS_LINT_CMD") {
        cfg.validation.lint_cmd = Some(v);
    }
    if let Some(v) = var("GENIUS_EDITOR_CMD") {
        cfg.editor.cmd = v;
    }
    if let Some(v) = var("GENIUS_PLANNER_URL") {
        cfg.planner.base_url = v;
    }
    if let Some(v) = var("GENIUS_PLANNER_API_KEY") {
        cfg.planner.api_key = v;
    } else if let Some(v) = var("OPENAI_API_KEY") {
        if cfg.planner.api_key.trim().is_empty() {
            cfg.planner.api_key = v;
        }
    }
    if let Some(v) = var("GENIUS_PLANNER_MODEL") {
        cfg.planner.model = v;
    }
    if let Some(v) = var("SERPER_API_KEY") {
        cfg.search.api_key = v;
    }
}

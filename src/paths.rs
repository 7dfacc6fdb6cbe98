use std::path::{Path, PathBuf};

const BASE_DIR_ENV: &str = "KORTAR_DIR";
const BASE_DIR_NAME: &str = ".kortar";
const CONFIG_FILE_NAME: &str = "config.json";

pub fn base_dir() -> PathBuf {
    if let Ok(value) = std::env::var(BASE_DIR_ENV)
        && let Some(path) = normalize_dir(&value)
    {
        return path;
    }
    home_join(BASE_DIR_NAME).unwrap_or_else(|| PathBuf::from(BASE_DIR_NAME))
}

pub fn sessions_dir() -> PathBuf {
    base_dir().join("sessions")
}

pub fn config_path() -> PathBuf {
    base_dir().join(CONFIG_FILE_NAME)
}

pub fn ensure_dirs() -> anyhow::Result<()> {
    std::fs::create_dir_all(sessions_dir())?;
    Ok(())
}

fn home_dir() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|home| home.trim().to_string())
        .filter(|home| !home.is_empty())
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
}

fn home_join(suffix: &str) -> Option<PathBuf> {
    home_dir().map(|home| home.join(suffix))
}

fn normalize_dir(value: &str) -> Option<PathBuf> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(normalize_path(&expand_tilde(trimmed)))
}

fn normalize_path(path: &Path) -> PathBuf {
    path.components()
        .map(|component| component.as_os_str())
        .collect()
}

fn expand_tilde(value: &str) -> PathBuf {
    let rest = match value.strip_prefix('~') {
        Some("") => Some(""),
        Some(rest) if rest.starts_with('/') => Some(&rest[1..]),
        _ => None,
    };
    match (rest, home_dir()) {
        (Some(""), Some(home)) => home,
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaves_plain_paths_alone() {
        assert_eq!(
            normalize_dir(" /var/lib/kortar/ "),
            Some(PathBuf::from("/var/lib/kortar"))
        );
        assert_eq!(normalize_dir("   "), None);
    }

    #[test]
    fn expands_home_prefix() {
        let Some(home) = home_dir() else {
            return;
        };
        assert_eq!(expand_tilde("~"), home);
        assert_eq!(expand_tilde("~/media"), home.join("media"));
        assert_eq!(expand_tilde("~other"), PathBuf::from("~other"));
    }
}

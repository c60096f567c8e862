use anyhow::{Context, Result, bail};
use dataplane::ConnectionConfig;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Get the config directory path
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".config").join("haproxyctl"))
}

/// Get the default credentials file path
pub fn default_config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.json"))
}

/// Resolve the credentials file, honouring `--config` / `HAPROXYCTL_CONFIG`.
pub fn resolve_path(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => default_config_path(),
    }
}

// ============================================================================
// Credentials
// ============================================================================

/// Load the credentials written by `haproxyctl login`.
pub fn load(path: &Path) -> Result<ConnectionConfig> {
    let content = fs::read_to_string(path).with_context(|| {
        format!(
            "Could not read {} (run 'haproxyctl login' first)",
            path.display()
        )
    })?;
    let config: ConnectionConfig = serde_json::from_str(&content)
        .with_context(|| format!("Invalid config file {}", path.display()))?;
    if config.api_base_url.trim().is_empty() {
        bail!("api_base_url is not set in {}", path.display());
    }
    Ok(config)
}

/// Save credentials to `path`, readable only by the current user.
pub fn save(config: &ConnectionConfig, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("Cannot create config dir {}", dir.display()))?;
        restrict(dir, 0o700)?;
    }
    let content = serde_json::to_string_pretty(config)?;
    let mut file = private_file(path)
        .with_context(|| format!("Cannot write config file {}", path.display()))?;
    // An existing file keeps its old mode through `open`.
    restrict(path, 0o600)?;
    file.write_all(content.as_bytes())
        .with_context(|| format!("Cannot write config file {}", path.display()))
}

/// Open `path` for writing, created with mode 0600 on unix.
fn private_file(path: &Path) -> std::io::Result<fs::File> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    options.open(path)
}

#[cfg(unix)]
fn restrict(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
        .with_context(|| format!("Cannot set permissions on {}", path.display()))
}

#[cfg(not(unix))]
fn restrict(_path: &Path, _mode: u32) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> ConnectionConfig {
        ConnectionConfig::new("http://lb:5555", "admin", "secret")
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("haproxyctl").join("config.json");

        save(&sample(), &path).unwrap();
        assert_eq!(load(&path).unwrap(), sample());
    }

    #[cfg(unix)]
    #[test]
    fn test_save_restricts_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("haproxyctl").join("config.json");
        save(&sample(), &path).unwrap();

        let file_mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        let dir_mode = fs::metadata(path.parent().unwrap())
            .unwrap()
            .permissions()
            .mode()
            & 0o777;
        assert_eq!(file_mode, 0o600);
        assert_eq!(dir_mode, 0o700);
    }

    #[cfg(unix)]
    #[test]
    fn test_save_creates_file_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        let file = private_file(&path).unwrap();

        let mode = file.metadata().unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }

    #[cfg(unix)]
    #[test]
    fn test_save_tightens_existing_file() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{}").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        save(&sample(), &path).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
        assert_eq!(load(&path).unwrap(), sample());
    }

    #[test]
    fn test_load_missing_file_mentions_login() {
        let dir = TempDir::new().unwrap();
        let err = load(&dir.path().join("nope.json")).unwrap_err();
        assert!(err.to_string().contains("haproxyctl login"));
    }

    #[test]
    fn test_load_rejects_empty_url() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"api_base_url": " ", "username": "a", "password": "b"}"#).unwrap();
        assert!(load(&path).is_err());
    }

    #[test]
    fn test_resolve_prefers_explicit_path() {
        let explicit = PathBuf::from("/etc/haproxyctl.json");
        assert_eq!(resolve_path(Some(&explicit)).unwrap(), explicit);
    }
}

use std::path::PathBuf;

/// Returns the user's home directory, honoring `PETNAMER_HOME` first.
pub fn home_dir() -> Option<PathBuf> {
    std::env::var_os("PETNAMER_HOME")
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var_os("HOME")
                .or_else(|| std::env::var_os("USERPROFILE"))
                .map(PathBuf::from)
        })
}

/// Returns the default path to ~/.env (or $PETNAMER_HOME/.env if set).
pub fn home_env_path() -> Option<PathBuf> {
    home_dir().map(|dir| dir.join(".env"))
}

/// Returns the directory holding run logs.
pub fn logs_dir() -> PathBuf {
    home_dir()
        .map(|dir| dir.join(".petnamer"))
        .unwrap_or_else(|| PathBuf::from(".petnamer"))
        .join("logs")
}

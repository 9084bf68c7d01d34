use std::path::PathBuf;

pub(crate) const DEFAULT_USER_AGENT: &str = concat!("edgeprobe/", env!("CARGO_PKG_VERSION"));

pub(crate) const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";

pub(crate) fn default_cache_path() -> String {
    default_base_dir()
        .join("cache.json")
        .to_string_lossy()
        .into_owned()
}

fn default_base_dir() -> PathBuf {
    if let Some(home) = user_home_dir() {
        return home.join(".edgeprobe");
    }

    PathBuf::from(".edgeprobe")
}

fn user_home_dir() -> Option<PathBuf> {
    #[cfg(windows)]
    {
        if let Some(value) = std::env::var_os("USERPROFILE") {
            return Some(PathBuf::from(value));
        }
    }

    if let Some(value) = std::env::var_os("HOME") {
        return Some(PathBuf::from(value));
    }

    None
}

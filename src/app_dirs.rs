use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    pub fn state_dir() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            let state_dir = PathBuf::from(home)
                .join(".local")
                .join("state")
                .join("whackavo");
            Some(state_dir)
        } else {
            ProjectDirs::from("", "", "whackavo")
                .map(|proj_dirs| proj_dirs.data_local_dir().to_path_buf())
        }
    }

    /// Where the terminal game writes its log, since it owns the screen
    pub fn log_path() -> Option<PathBuf> {
        Self::state_dir().map(|dir| dir.join("whackavo.log"))
    }
}

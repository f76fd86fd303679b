use std::{
    ffi::OsString,
    path::PathBuf,
    sync::{Mutex, MutexGuard, OnceLock},
};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

const VARS: [&str; 2] = ["GRADECAST_CONFIG_HOME", "GRADECAST_DATASET"];

/// Points the app directories at a temp dir and restores the environment on drop.
pub struct GradecastEnvGuard {
    previous: Vec<(&'static str, Option<OsString>)>,
    _lock: MutexGuard<'static, ()>,
}

impl GradecastEnvGuard {
    pub fn set_config_home(path: PathBuf) -> Self {
        let lock = ENV_LOCK
            .get_or_init(|| Mutex::new(()))
            .lock()
            .unwrap_or_else(|err| err.into_inner());
        let previous = VARS
            .iter()
            .map(|&name| (name, std::env::var_os(name)))
            .collect();
        // SAFETY: tests run under a global lock to prevent concurrent env mutations.
        unsafe {
            std::env::set_var("GRADECAST_CONFIG_HOME", path);
            std::env::remove_var("GRADECAST_DATASET");
        }
        Self {
            previous,
            _lock: lock,
        }
    }

    pub fn set_dataset(&self, path: PathBuf) {
        // SAFETY: the guard holds the global env lock.
        unsafe {
            std::env::set_var("GRADECAST_DATASET", path);
        }
    }
}

impl Drop for GradecastEnvGuard {
    fn drop(&mut self) {
        for (name, value) in self.previous.drain(..) {
            // SAFETY: tests run under a global lock to prevent concurrent env mutations.
            unsafe {
                match value {
                    Some(value) => std::env::set_var(name, value),
                    None => std::env::remove_var(name),
                }
            }
        }
    }
}

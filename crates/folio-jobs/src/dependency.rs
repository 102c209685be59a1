//! Staleness checks based on filesystem timestamps.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// A dependency whose modification time could not be read.
///
/// Never fatal: the target is treated as stale so the job runs and the
/// real error surfaces from the job itself.
#[derive(Debug, thiserror::Error)]
#[error("Cannot read modification time of dependency {path}: {source}")]
pub struct StaleCheckError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

fn modified(path: &Path) -> std::io::Result<SystemTime> {
    fs::metadata(path)?.modified()
}

/// Decide whether `target` must be rebuilt.
///
/// Returns true when the target is missing, when any dependency is strictly
/// newer than the target, or when a dependency cannot be stat'd.
pub fn is_stale<P: AsRef<Path>>(target: &Path, dependencies: &[P]) -> bool {
    let Ok(target_time) = modified(target) else {
        return true;
    };

    dependencies.iter().any(|dependency| {
        let path = dependency.as_ref();
        match modified(path) {
            Ok(dependency_time) => dependency_time > target_time,
            Err(source) => {
                let err = StaleCheckError {
                    path: path.to_path_buf(),
                    source,
                };
                tracing::warn!("{}; rebuilding {}", err, target.display());
                true
            }
        }
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::fs::File;
    use std::time::Duration;
    use tempfile::tempdir;

    /// Write `path` and pin its mtime to `secs` seconds after the epoch.
    pub(crate) fn touch(path: &Path, secs: u64) {
        fs::write(path, "x").unwrap();
        let time = SystemTime::UNIX_EPOCH + Duration::from_secs(secs);
        File::options()
            .write(true)
            .open(path)
            .unwrap()
            .set_modified(time)
            .unwrap();
    }

    #[test]
    fn missing_target_is_stale() {
        let temp = tempdir().unwrap();
        let dep = temp.path().join("source.yaml");
        touch(&dep, 1_000);

        assert!(is_stale(&temp.path().join("out.rst"), &[&dep]));
        assert!(is_stale(&temp.path().join("out.rst"), &[] as &[PathBuf]));
    }

    #[test]
    fn newer_target_is_fresh() {
        let temp = tempdir().unwrap();
        let dep = temp.path().join("source.yaml");
        let target = temp.path().join("out.rst");
        touch(&dep, 1_000);
        touch(&target, 2_000);

        assert!(!is_stale(&target, &[&dep]));
    }

    #[test]
    fn equal_timestamps_are_fresh() {
        let temp = tempdir().unwrap();
        let dep = temp.path().join("source.yaml");
        let target = temp.path().join("out.rst");
        touch(&dep, 1_500);
        touch(&target, 1_500);

        assert!(!is_stale(&target, &[&dep]));
    }

    #[test]
    fn any_newer_dependency_makes_stale() {
        let temp = tempdir().unwrap();
        let old = temp.path().join("old.yaml");
        let new = temp.path().join("new.yaml");
        let target = temp.path().join("out.rst");
        touch(&old, 1_000);
        touch(&target, 2_000);
        touch(&new, 3_000);

        assert!(is_stale(&target, &[&old, &new]));
    }

    #[test]
    fn unreadable_dependency_forces_rebuild() {
        let temp = tempdir().unwrap();
        let target = temp.path().join("out.rst");
        touch(&target, 2_000);

        assert!(is_stale(&target, &[temp.path().join("gone.yaml")]));
    }

    #[test]
    fn no_dependencies_with_existing_target_is_fresh() {
        let temp = tempdir().unwrap();
        let target = temp.path().join("out.rst");
        touch(&target, 2_000);

        assert!(!is_stale(&target, &[] as &[PathBuf]));
    }
}

//! Rebuild on source changes.

use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use anyhow::{Context, Result};
use folio_tasks::build_all;
use folio_tasks::tasks::robots;
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use super::build::Settings;

/// Quiet period before a batch of changes triggers a rebuild.
const DEBOUNCE: Duration = Duration::from_millis(300);

/// Extensions whose changes trigger a rebuild.
const WATCHED_EXTENSIONS: &[&str] = &["yaml", "toml", "svg"];

/// File watcher over the source and build data trees.
pub struct SourceWatcher {
    _watcher: RecommendedWatcher,
    events: mpsc::Receiver<notify::Event>,
}

impl SourceWatcher {
    /// Watch every existing path in `paths`.
    pub fn new(paths: &[PathBuf]) -> Result<Self> {
        let (tx, events) = mpsc::channel();

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            if let Ok(event) = res {
                let _ = tx.send(event);
            }
        })
        .context("Failed to create file watcher")?;

        for path in paths.iter().filter(|p| p.exists()) {
            let mode = if path.is_dir() {
                RecursiveMode::Recursive
            } else {
                RecursiveMode::NonRecursive
            };
            watcher
                .watch(path, mode)
                .with_context(|| format!("Failed to watch {}", path.display()))?;
            tracing::debug!("Watching {}", path.display());
        }

        Ok(Self {
            _watcher: watcher,
            events,
        })
    }

    /// Block until a relevant change arrives, then wait out the debounce
    /// window. Returns the changed paths, or `None` once the watcher stops.
    pub fn next_batch(&self) -> Option<Vec<PathBuf>> {
        self.wait(None)
    }

    /// Like [`next_batch`](Self::next_batch), giving up after `limit`
    /// without a relevant change.
    fn wait(&self, limit: Option<Duration>) -> Option<Vec<PathBuf>> {
        let mut changed = Vec::new();

        while changed.is_empty() {
            let event = match limit {
                Some(limit) => self.events.recv_timeout(limit).ok()?,
                None => self.events.recv().ok()?,
            };
            changed.extend(relevant_paths(&event));
        }

        while let Ok(event) = self.events.recv_timeout(DEBOUNCE) {
            changed.extend(relevant_paths(&event));
        }

        changed.sort();
        changed.dedup();
        Some(changed)
    }
}

fn relevant_paths(event: &notify::Event) -> impl Iterator<Item = PathBuf> + '_ {
    event
        .paths
        .iter()
        .filter(|path| is_relevant(path, &event.kind))
        .cloned()
}

/// Whether a change to `path` should trigger a rebuild.
fn is_relevant(path: &Path, kind: &EventKind) -> bool {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    match kind {
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_) => {
            WATCHED_EXTENSIONS.contains(&ext)
        }
        _ => false,
    }
}

/// Run the watch command: build once, then rebuild after every change.
pub fn run(settings: &Settings) -> Result<()> {
    let ctx = settings.context()?;
    let config = &ctx.config;

    let mut paths = vec![config.source_dir(), config.builddata_dir()];
    paths.extend(config.config_file.clone());
    let watcher = SourceWatcher::new(&paths)?;

    rebuild(settings);
    tracing::info!("Watching for changes...");

    while let Some(changed) = watcher.next_batch() {
        for path in &changed {
            tracing::info!("Changed: {}", path.display());
        }
        rebuild(settings);
    }

    Ok(())
}

/// Reload configuration and build; failures are logged, not fatal.
fn rebuild(settings: &Settings) {
    let result = settings.context().and_then(|ctx| {
        let runner = settings.runner(&ctx);
        let jobs = build_all(&ctx, &runner)?;
        robots::refresh_robots(&ctx)?;
        Ok(jobs)
    });

    match result {
        Ok(jobs) => tracing::info!("Rebuilt: {} jobs executed", jobs),
        Err(e) => tracing::error!("Build failed: {:#}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, ModifyKind};
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn yaml_changes_are_relevant() {
        let kind = EventKind::Modify(ModifyKind::Any);

        assert!(is_relevant(Path::new("source/includes/toc-a.yaml"), &kind));
        assert!(is_relevant(Path::new("folio.toml"), &kind));
        assert!(!is_relevant(Path::new("source/includes/toc/a.rst"), &kind));
        assert!(!is_relevant(
            Path::new("source/includes/toc-a.yaml"),
            &EventKind::Access(notify::event::AccessKind::Any)
        ));
    }

    #[test]
    fn generated_outputs_are_ignored() {
        let kind = EventKind::Create(CreateKind::File);

        assert!(!is_relevant(Path::new("source/images/a.png"), &kind));
        assert!(is_relevant(Path::new("source/images/a.svg"), &kind));
    }

    #[test]
    fn reports_created_fragment() {
        let temp = tempdir().unwrap();
        let watcher = SourceWatcher::new(&[temp.path().to_path_buf()]).unwrap();

        // Give inotify time to set up
        std::thread::sleep(Duration::from_millis(100));
        fs::write(temp.path().join("toc-new.yaml"), "a:\n  ref: /a\n").unwrap();

        let batch = watcher
            .wait(Some(Duration::from_secs(3)))
            .expect("timeout waiting for file watch event");

        assert!(batch.iter().any(|p| p.ends_with("toc-new.yaml")));
    }
}

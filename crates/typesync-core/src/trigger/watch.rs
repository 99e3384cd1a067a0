//! Filesystem watch trigger
//!
//! Observes a directory recursively for change events, ignoring hidden
//! files and directories (names beginning with a dot) and their
//! descendants.
//!
//! ## Debouncing
//!
//! A burst of rapid events collapses to a single trigger: each qualifying
//! event (re)arms a fixed 100 ms quiet window, and the trigger fires once
//! when the window elapses without further events. Together with the
//! coordinator's drop-while-busy policy this bounds the number of runs a
//! burst of file changes can cause.
//!
//! ## Self-Owned Paths
//!
//! When the generated artifact (or the intermediate spec file) lives
//! inside the watched directory, each pipeline run would otherwise look
//! like a file change and schedule the next run. Paths registered via
//! [`WatchTrigger::with_ignored_paths`] never qualify, so only external
//! edits fire the trigger.

use notify::{EventKind, RecursiveMode, Watcher};
use std::path::{Component, Path, PathBuf};
use std::pin::Pin;
use tokio::sync::mpsc;
use tokio::time::{Duration, Sleep, sleep};
use tokio_stream::Stream;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{debug, error, warn};

use crate::traits::{Trigger, TriggerEvent};

/// Quiet window applied to bursts of filesystem events
const WATCH_DEBOUNCE_MS: u64 = 100;

/// Filesystem-change regeneration trigger
#[derive(Debug, Clone)]
pub struct WatchTrigger {
    dir: PathBuf,
    debounce: Duration,
    ignored_paths: Vec<PathBuf>,
}

impl WatchTrigger {
    /// Create a trigger watching `dir` recursively
    pub fn new(dir: PathBuf) -> Self {
        Self {
            dir,
            debounce: Duration::from_millis(WATCH_DEBOUNCE_MS),
            ignored_paths: Vec::new(),
        }
    }

    /// Override the debounce window (used by tests)
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Register files whose changes never qualify as triggers
    ///
    /// The engine registers the pipeline's own output and intermediate
    /// paths here so a run does not schedule the next one.
    pub fn with_ignored_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.ignored_paths = paths;
        self
    }
}

impl Trigger for WatchTrigger {
    fn watch(&self) -> Pin<Box<dyn Stream<Item = TriggerEvent> + Send + 'static>> {
        let dir = self.dir.clone();
        let debounce_window = self.debounce;
        let ignored_paths = self.ignored_paths.clone();
        let (tx, rx) = mpsc::unbounded_channel();
        let (raw_tx, mut raw_rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            // notify delivers absolute event paths, so a relative root
            // (the default ".") must be resolved before prefix stripping,
            // or hidden ancestors of the working directory would mark
            // every event hidden.
            let root = dir.canonicalize().unwrap_or(dir);
            let ignored: Vec<PathBuf> = ignored_paths.iter().map(|path| resolve(path)).collect();

            let mut watcher = match notify::recommended_watcher(move |result| {
                let _ = raw_tx.send(result);
            }) {
                Ok(watcher) => watcher,
                Err(err) => {
                    error!("Failed to create file watcher: {err}");
                    return;
                }
            };

            if let Err(err) = watcher.watch(&root, RecursiveMode::Recursive) {
                error!(dir = %root.display(), "Failed to watch directory: {err}");
                return;
            }
            debug!(dir = %root.display(), "Starting watch trigger");

            let mut debounce: Option<Pin<Box<Sleep>>> = None;

            loop {
                tokio::select! {
                    _ = tx.closed() => break,

                    maybe = raw_rx.recv() => {
                        let Some(result) = maybe else { break };
                        match result {
                            Ok(event) => {
                                if !is_relevant(&event.kind) {
                                    continue;
                                }
                                let qualifying = event.paths.iter().any(|path| {
                                    !is_hidden_path(&root, path)
                                        && !ignored.contains(&resolve(path))
                                });
                                if qualifying {
                                    debounce = Some(Box::pin(sleep(debounce_window)));
                                }
                            }
                            Err(err) => warn!("File watcher error: {err}"),
                        }
                    }

                    _ = async {
                        match debounce.as_mut() {
                            Some(window) => window.await,
                            None => std::future::pending().await,
                        }
                    }, if debounce.is_some() => {
                        debounce = None;
                        debug!("File change detected, requesting regeneration");
                        if tx.send(TriggerEvent::now("watch")).is_err() {
                            break;
                        }
                    }
                }
            }

            debug!("Watch trigger stopped");
        });

        Box::pin(UnboundedReceiverStream::new(rx))
    }

    fn name(&self) -> &'static str {
        "watch"
    }
}

/// Whether the event kind represents a content change worth reacting to
fn is_relevant(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    )
}

/// Resolve a path to its canonical form for comparison
///
/// Falls back to canonicalizing the parent when the file does not exist
/// yet (the artifact is only created by the first successful run).
fn resolve(path: &Path) -> PathBuf {
    if let Ok(canonical) = path.canonicalize() {
        return canonical;
    }
    if let (Some(parent), Some(name)) = (path.parent(), path.file_name())
        && !parent.as_os_str().is_empty()
        && let Ok(parent) = parent.canonicalize()
    {
        return parent.join(name);
    }
    path.to_path_buf()
}

/// Whether any component of `path` below the watch root is hidden
fn is_hidden_path(root: &Path, path: &Path) -> bool {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative.components().any(|component| {
        let Component::Normal(name) = component else {
            return false;
        };
        name.to_str().is_some_and(|name| name.starts_with('.'))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_stream::StreamExt;

    #[test]
    fn hidden_components_are_ignored() {
        let root = Path::new("/project");

        assert!(is_hidden_path(root, Path::new("/project/.git/index")));
        assert!(is_hidden_path(root, Path::new("/project/src/.cache/x.ts")));
        assert!(is_hidden_path(root, Path::new("/project/.env")));

        assert!(!is_hidden_path(root, Path::new("/project/src/main.ts")));
        assert!(!is_hidden_path(root, Path::new("/project/api/routes.py")));
    }

    #[test]
    fn hidden_watch_root_does_not_hide_its_children() {
        // Watching from inside a hidden directory is fine; only components
        // below the root count.
        let root = Path::new("/home/user/.config/app");
        assert!(!is_hidden_path(root, Path::new("/home/user/.config/app/file.ts")));
        assert!(is_hidden_path(root, Path::new("/home/user/.config/app/.secret")));
    }

    #[tokio::test]
    async fn burst_of_changes_collapses_to_one_event() {
        let dir = tempfile::tempdir().unwrap();
        let trigger =
            WatchTrigger::new(dir.path().to_path_buf()).with_debounce(Duration::from_millis(100));
        let mut events = trigger.watch();

        // Give the watcher a moment to register
        tokio::time::sleep(Duration::from_millis(200)).await;

        for i in 0..5 {
            std::fs::write(dir.path().join(format!("file{i}.ts")), "export {};").unwrap();
        }

        let first = tokio::time::timeout(Duration::from_secs(2), events.next())
            .await
            .expect("a change event should fire");
        assert!(first.is_some());

        // The burst was debounced: no second event arrives afterwards
        let second = tokio::time::timeout(Duration::from_millis(400), events.next()).await;
        assert!(second.is_err(), "burst should collapse to a single event");
    }

    #[tokio::test]
    async fn relative_root_under_hidden_ancestor_still_fires() {
        // A checkout under a dot-named directory must not disable the
        // trigger when the root is given relatively.
        let base = tempfile::tempdir().unwrap();
        let project = base.path().join(".wrap").join("project");
        std::fs::create_dir_all(&project).unwrap();
        std::env::set_current_dir(&project).unwrap();

        let trigger =
            WatchTrigger::new(PathBuf::from(".")).with_debounce(Duration::from_millis(50));
        let mut events = trigger.watch();

        tokio::time::sleep(Duration::from_millis(200)).await;

        std::fs::write(project.join("a.ts"), "export {};").unwrap();

        let fired = tokio::time::timeout(Duration::from_secs(2), events.next())
            .await
            .expect("change under a relative root should fire");
        assert!(fired.is_some());
    }

    #[tokio::test]
    async fn ignored_paths_do_not_fire_but_other_changes_do() {
        let dir = tempfile::tempdir().unwrap();
        let output_path = dir.path().join("types.ts");
        let spec_path = dir.path().join("api.json");

        let trigger = WatchTrigger::new(dir.path().to_path_buf())
            .with_debounce(Duration::from_millis(50))
            .with_ignored_paths(vec![output_path.clone(), spec_path.clone()]);
        let mut events = trigger.watch();

        tokio::time::sleep(Duration::from_millis(200)).await;

        // Writes a pipeline run would make
        std::fs::write(&spec_path, "{}").unwrap();
        std::fs::write(&output_path, "export {};").unwrap();
        std::fs::remove_file(&spec_path).unwrap();

        let fired = tokio::time::timeout(Duration::from_millis(500), events.next()).await;
        assert!(fired.is_err(), "self-owned paths must not trigger");

        std::fs::write(dir.path().join("schema.ts"), "export {};").unwrap();
        let fired = tokio::time::timeout(Duration::from_secs(2), events.next())
            .await
            .expect("external changes still fire");
        assert!(fired.is_some());
    }

    #[tokio::test]
    async fn hidden_file_changes_do_not_fire() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join(".git")).unwrap();

        let trigger =
            WatchTrigger::new(dir.path().to_path_buf()).with_debounce(Duration::from_millis(50));
        let mut events = trigger.watch();

        tokio::time::sleep(Duration::from_millis(200)).await;

        std::fs::write(dir.path().join(".git").join("index"), "ref").unwrap();
        std::fs::write(dir.path().join(".hidden"), "x").unwrap();

        let fired = tokio::time::timeout(Duration::from_millis(500), events.next()).await;
        assert!(fired.is_err(), "hidden paths must not trigger regeneration");
    }
}

//! Trigger-file watching that raises reload signals.

use crate::error::{InjectError, Result};
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher as NotifyWatcher};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{Instant, sleep_until};

/// Watcher that turns trigger-file changes into reload signals.
///
/// Uses the `notify` crate to watch trigger files (for example the file an
/// external reloader touches after it has swapped code in) and sends `()`
/// on a channel when one changes. Bursts of filesystem events are debounced
/// so that one write does not turn into several signals.
///
/// Must be created inside a tokio runtime.
///
/// # Examples
///
/// ```rust,no_run
/// use hotswap_inject::notify::SignalWatcher;
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let (watcher, mut rx) = SignalWatcher::new(Duration::from_millis(100))?;
/// watcher.watch("/tmp/injection.trigger").await?;
///
/// while let Some(()) = rx.recv().await {
///     println!("reload signal");
/// }
/// # Ok(())
/// # }
/// ```
pub struct SignalWatcher {
    watcher: Arc<tokio::sync::Mutex<RecommendedWatcher>>,
    debounce_duration: Duration,
    watched_paths: Arc<tokio::sync::Mutex<Vec<PathBuf>>>,
}

impl SignalWatcher {
    /// Create a new signal watcher.
    ///
    /// Returns the watcher and the receiving end of its signal channel.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying file watcher cannot be created.
    pub fn new(debounce_duration: Duration) -> Result<(Self, mpsc::Receiver<()>)> {
        let (tx, rx) = mpsc::channel(100);
        let debounce = debounce_duration;

        let (event_tx, mut event_rx) = mpsc::unbounded_channel::<Event>();

        let watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
            Ok(event)
                if matches!(
                    event.kind,
                    notify::EventKind::Modify(_) | notify::EventKind::Create(_)
                ) =>
            {
                let _ = event_tx.send(event);
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(error = %e, "trigger watcher error"),
        })
        .map_err(|e| InjectError::Watch(format!("Failed to create file watcher: {}", e)))?;

        tokio::spawn(async move {
            let mut last_signal: Option<Instant> = None;

            while let Some(event) = event_rx.recv().await {
                tracing::trace!(paths = ?event.paths, "trigger file changed");
                let now = Instant::now();

                match last_signal {
                    // A delayed signal is already scheduled and covers this event.
                    Some(at) if now < at => continue,
                    Some(at) if now.duration_since(at) < debounce => {
                        let fire_at = at + debounce;
                        let tx = tx.clone();
                        tokio::spawn(async move {
                            sleep_until(fire_at).await;
                            let _ = tx.send(()).await;
                        });
                        last_signal = Some(fire_at);
                    }
                    _ => {
                        if tx.send(()).await.is_err() {
                            break;
                        }
                        last_signal = Some(now);
                    }
                }
            }
        });

        Ok((
            Self {
                watcher: Arc::new(tokio::sync::Mutex::new(watcher)),
                debounce_duration,
                watched_paths: Arc::new(tokio::sync::Mutex::new(Vec::new())),
            },
            rx,
        ))
    }

    /// Add a trigger path to watch.
    ///
    /// # Errors
    ///
    /// Returns an error if the path cannot be resolved or watched.
    pub async fn watch(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let canonical_path = path
            .canonicalize()
            .map_err(|source| InjectError::PathResolution {
                path: path.to_path_buf(),
                source,
            })?;

        let mut watcher = self.watcher.lock().await;
        watcher
            .watch(&canonical_path, RecursiveMode::NonRecursive)
            .map_err(|e| InjectError::Watch(format!("Failed to watch path: {}", e)))?;

        let mut paths = self.watched_paths.lock().await;
        if !paths.contains(&canonical_path) {
            tracing::debug!(path = %canonical_path.display(), "watching trigger file");
            paths.push(canonical_path);
        }

        Ok(())
    }

    /// Stop watching a trigger path.
    ///
    /// # Errors
    ///
    /// Returns an error if the path cannot be resolved or unwatched.
    pub async fn unwatch(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let canonical_path = path
            .canonicalize()
            .map_err(|source| InjectError::PathResolution {
                path: path.to_path_buf(),
                source,
            })?;

        let mut watcher = self.watcher.lock().await;
        watcher
            .unwatch(&canonical_path)
            .map_err(|e| InjectError::Watch(format!("Failed to unwatch path: {}", e)))?;

        let mut paths = self.watched_paths.lock().await;
        paths.retain(|p| p != &canonical_path);

        Ok(())
    }

    /// Minimum time between two signals.
    pub fn debounce_duration(&self) -> Duration {
        self.debounce_duration
    }

    /// Currently watched paths.
    pub async fn watched_paths(&self) -> Vec<PathBuf> {
        self.watched_paths.lock().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_watcher_creation() {
        let result = SignalWatcher::new(Duration::from_millis(100));
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_watch_file() {
        let temp_dir = TempDir::new().unwrap();
        let trigger = temp_dir.path().join("injection.trigger");
        fs::write(&trigger, "0").unwrap();

        let (watcher, _rx) = SignalWatcher::new(Duration::from_millis(100)).unwrap();
        watcher.watch(&trigger).await.unwrap();
        watcher.watch(&trigger).await.unwrap();

        assert_eq!(watcher.watched_paths().await.len(), 1);
    }

    #[tokio::test]
    async fn test_watch_nonexistent_file() {
        let (watcher, _rx) = SignalWatcher::new(Duration::from_millis(100)).unwrap();
        let result = watcher.watch("/nonexistent/injection.trigger").await;
        assert!(matches!(result, Err(InjectError::PathResolution { .. })));
    }

    #[tokio::test]
    async fn test_file_change_raises_signal() {
        let temp_dir = TempDir::new().unwrap();
        let trigger = temp_dir.path().join("injection.trigger");
        fs::write(&trigger, "0").unwrap();

        let (watcher, mut rx) = SignalWatcher::new(Duration::from_millis(100)).unwrap();
        watcher.watch(&trigger).await.unwrap();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            fs::write(&trigger, "1").unwrap();
        });

        let result = timeout(Duration::from_secs(2), rx.recv()).await;
        assert!(matches!(result, Ok(Some(()))));
    }

    #[tokio::test]
    async fn test_unwatch() {
        let temp_dir = TempDir::new().unwrap();
        let trigger = temp_dir.path().join("injection.trigger");
        fs::write(&trigger, "0").unwrap();

        let (watcher, _rx) = SignalWatcher::new(Duration::from_millis(100)).unwrap();
        watcher.watch(&trigger).await.unwrap();
        watcher.unwatch(&trigger).await.unwrap();

        assert!(watcher.watched_paths().await.is_empty());
    }

    #[tokio::test]
    async fn test_debounce_duration() {
        let duration = Duration::from_millis(500);
        let (watcher, _rx) = SignalWatcher::new(duration).unwrap();
        assert_eq!(watcher.debounce_duration(), duration);
    }
}

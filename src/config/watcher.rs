//! Routes file watcher for hot reload.

use std::sync::Arc;
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::schema::RoutesConfig;
use crate::routing::{RouteTable, Router};

/// Running watcher handle plus the stream of rebuilt tables.
pub type WatchHandle = (RecommendedWatcher, mpsc::UnboundedReceiver<Arc<RouteTable>>);

/// Start watching `router` when `config.watch` is set. `Ok(None)` means
/// watching is disabled and the router keeps the table it already has.
pub fn watch_routes(router: Arc<Router>, config: &RoutesConfig) -> Result<Option<WatchHandle>, notify::Error> {
    if !config.watch {
        tracing::info!(routes = %router.routes_path().display(), "Route watching disabled");
        return Ok(None);
    }
    let (watcher, updates) = RoutesWatcher::new(router, config.poll_interval());
    Ok(Some((watcher.run()?, updates)))
}

/// Rebuilds a [`Router`] whenever one of its routes files changes.
pub struct RoutesWatcher {
    router: Arc<Router>,
    poll_interval: Duration,
    update_tx: mpsc::UnboundedSender<Arc<RouteTable>>,
}

impl RoutesWatcher {
    /// Returns the watcher and a receiver for every successfully rebuilt table.
    pub fn new(
        router: Arc<Router>,
        poll_interval: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<Arc<RouteTable>>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                router,
                poll_interval,
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching. Dropping the returned handle stops it.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let paths = self.router.watch_paths();
        let router = self.router.clone();
        let tx = self.update_tx.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if event.kind.is_modify() || event.kind.is_create() {
                        tracing::info!(paths = ?event.paths, "Routes file change detected, rebuilding");
                        // Failures are logged by the router, which keeps the current table.
                        if let Ok(table) = router.refresh() {
                            let _ = tx.send(table);
                        }
                    }
                }
                Err(e) => tracing::error!(error = ?e, "Watch error"),
            },
            Config::default().with_poll_interval(self.poll_interval),
        )?;

        for path in &paths {
            watcher.watch(path, RecursiveMode::NonRecursive)?;
        }

        tracing::info!(paths = ?paths, "Routes watcher started");
        Ok(watcher)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_fails_to_start() {
        let router = Arc::new(Router::new("/nonexistent/conf/routes"));
        let (watcher, _rx) = RoutesWatcher::new(router, Duration::from_secs(1));
        assert!(watcher.run().is_err());
    }

    #[test]
    fn test_watch_disabled_skips_watcher() {
        let router = Arc::new(Router::new("/nonexistent/conf/routes"));
        let mut config = RoutesConfig::default();

        config.watch = false;
        assert!(matches!(watch_routes(router.clone(), &config), Ok(None)));

        config.watch = true;
        assert!(watch_routes(router, &config).is_err());
    }
}

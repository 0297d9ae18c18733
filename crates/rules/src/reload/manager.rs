//! [`ReloadManager`]: watches the rule repository and republishes changed formats.

use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use metagame_core::config::{RulesConfig, SyncConfig};
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::{mpsc, Notify};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::loader::{LoadReport, Result, RuleError, RuleLoader};
use crate::model::Format;
use crate::store::RuleStore;
use crate::sync::{sync_with_timeout, RuleSync};

use super::watcher::{affected_format, is_relevant};

/// Callback invoked with the formats whose snapshots were just replaced.
pub type Subscriber = Arc<dyn Fn(&[Format]) + Send + Sync>;

/// Handle returned by [`ReloadManager::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Where the consumer task is in its reload cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadPhase {
    Idle,
    ChangeDetected,
    Syncing,
    Reloading,
    Swapping,
}

#[derive(Debug, Clone)]
pub struct ReloadOptions {
    /// Events arriving within this window after the first one share a cycle.
    pub debounce: Duration,
    /// Upper bound on a remote sync before reloading from local state.
    pub sync_timeout: Duration,
}

impl Default for ReloadOptions {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(500),
            sync_timeout: Duration::from_secs(30),
        }
    }
}

impl ReloadOptions {
    pub fn from_config(rules: &RulesConfig, sync: &SyncConfig) -> Self {
        Self {
            debounce: rules.debounce(),
            sync_timeout: sync.timeout(),
        }
    }
}

/// Keeps the [`RuleStore`] in step with the rule repository on disk.
///
/// Reloads are serialized: the watcher's consumer task and the manual
/// [`force_reload_all`](Self::force_reload_all) share one reload lock, so two
/// reloads of the same format never interleave. Subscribers run after the
/// new snapshots are published, outside that lock.
#[derive(Clone)]
pub struct ReloadManager {
    store: Arc<RuleStore>,
    loader: RuleLoader,
    options: ReloadOptions,
    sync: Option<Arc<dyn RuleSync>>,
    subscribers: Arc<RwLock<Vec<(SubscriptionId, Subscriber)>>>,
    next_subscription: Arc<AtomicU64>,
    reload_lock: Arc<Mutex<()>>,
    phase: Arc<Mutex<ReloadPhase>>,
}

impl fmt::Debug for ReloadManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReloadManager")
            .field("repo", &self.loader.repo())
            .field("options", &self.options)
            .field("sync", &self.sync.as_ref().map(|s| s.name().to_string()))
            .field("phase", &self.phase())
            .finish()
    }
}

impl ReloadManager {
    pub fn new(store: Arc<RuleStore>, loader: RuleLoader, options: ReloadOptions) -> Self {
        Self {
            store,
            loader,
            options,
            sync: None,
            subscribers: Arc::new(RwLock::new(Vec::new())),
            next_subscription: Arc::new(AtomicU64::new(1)),
            reload_lock: Arc::new(Mutex::new(())),
            phase: Arc::new(Mutex::new(ReloadPhase::Idle)),
        }
    }

    /// Pull from a remote before every watcher-triggered reload.
    pub fn with_sync(mut self, sync: Arc<dyn RuleSync>) -> Self {
        self.sync = Some(sync);
        self
    }

    pub fn store(&self) -> &Arc<RuleStore> {
        &self.store
    }

    pub fn loader(&self) -> &RuleLoader {
        &self.loader
    }

    pub fn phase(&self) -> ReloadPhase {
        *self.phase.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn set_phase(&self, phase: ReloadPhase) {
        *self.phase.lock().unwrap_or_else(|e| e.into_inner()) = phase;
    }

    // ── Subscriptions ───────────────────────────────────────────────

    /// Register a callback for the list of formats that were just reloaded.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&[Format]) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        let callback: Subscriber = Arc::new(callback);
        self.subscribers
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push((id, callback));
        id
    }

    /// Remove a subscription. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.write().unwrap_or_else(|e| e.into_inner());
        let before = subscribers.len();
        subscribers.retain(|(sub_id, _)| *sub_id != id);
        subscribers.len() != before
    }

    fn notify_subscribers(&self, formats: &[Format]) {
        if formats.is_empty() {
            return;
        }
        // Snapshot the list so callbacks may (un)subscribe without deadlocking.
        let subscribers: Vec<Subscriber> = self
            .subscribers
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|(_, s)| Arc::clone(s))
            .collect();

        for subscriber in subscribers {
            if catch_unwind(AssertUnwindSafe(|| subscriber(formats))).is_err() {
                warn!(formats = ?formats, "reload subscriber panicked");
            }
        }
    }

    // ── Reloading ───────────────────────────────────────────────────

    /// Reload every known format now: those on disk plus any registered or
    /// previously published. Used at startup and for admin refreshes.
    pub fn force_reload_all(&self) -> Vec<LoadReport> {
        let mut formats: BTreeSet<Format> = self.store.known_formats().into_iter().collect();
        match self.loader.discover_formats() {
            Ok(found) => formats.extend(found),
            Err(e) => warn!(error = %e, "reloading known formats only"),
        }
        let formats: Vec<Format> = formats.into_iter().collect();
        info!(count = formats.len(), "force reloading all formats");
        self.reload_formats(&formats)
    }

    /// Sync (if configured) and then reload every known format.
    pub async fn refresh_all(&self) -> Vec<LoadReport> {
        if let Some(sync) = &self.sync {
            let _ = sync_with_timeout(sync.as_ref(), self.loader.repo(), self.options.sync_timeout).await;
        }
        let manager = self.clone();
        match tokio::task::spawn_blocking(move || manager.force_reload_all()).await {
            Ok(reports) => reports,
            Err(e) => {
                warn!(error = %e, "reload task failed");
                Vec::new()
            }
        }
    }

    pub fn reload_format(&self, format: &Format) -> LoadReport {
        self.reload_formats(std::slice::from_ref(format))
            .pop()
            .unwrap_or_else(|| LoadReport::new(format.clone()))
    }

    /// Re-parse and publish exactly `formats`, then notify subscribers.
    pub fn reload_formats(&self, formats: &[Format]) -> Vec<LoadReport> {
        let mut reports = Vec::with_capacity(formats.len());
        {
            let _guard = self.reload_lock.lock().unwrap_or_else(|e| e.into_inner());
            for format in formats {
                self.store.register_format(format.clone());
                self.set_phase(ReloadPhase::Reloading);
                let (rules, report) = self.loader.load_format(format);
                self.set_phase(ReloadPhase::Swapping);
                self.store.publish(format.clone(), rules);
                reports.push(report);
            }
            self.set_phase(ReloadPhase::Idle);
        }
        self.notify_subscribers(formats);
        reports
    }

    // ── Watching ────────────────────────────────────────────────────

    /// Start watching the repository. Must be called inside a tokio runtime.
    ///
    /// A missing repository is reported as
    /// [`RuleError::RepositoryUnavailable`]; it is never created.
    ///
    /// The `notify` callback only forwards changed paths into a channel; a
    /// dedicated task debounces them, syncs, reloads the affected formats and
    /// notifies subscribers.
    pub fn start(&self) -> Result<ReloadHandle> {
        let repo = self.loader.repo().to_path_buf();
        if !repo.is_dir() {
            warn!(path = %repo.display(), "rule repository missing, not watching");
            return Err(RuleError::RepositoryUnavailable(repo));
        }

        let (tx, rx) = mpsc::unbounded_channel::<PathBuf>();
        let mut watcher = notify::recommended_watcher(
            move |res: std::result::Result<notify::Event, notify::Error>| match res {
                Ok(event) if is_relevant(&event) => {
                    for path in event.paths {
                        // Receiver gone means the manager is shutting down.
                        let _ = tx.send(path);
                    }
                }
                Ok(_) => {}
                Err(e) => warn!(error = %e, "filesystem watcher error"),
            },
        )?;
        watcher.watch(&repo, RecursiveMode::Recursive)?;

        info!(path = %repo.display(), debounce = ?self.options.debounce, "watching rule repository (recursive)");
        Ok(self.spawn_consumer(rx, Some(watcher)))
    }

    /// Start watching, then sync and load every known format.
    ///
    /// The watcher is installed first, so an edit landing during the initial
    /// load still triggers a reload afterwards.
    pub async fn start_with_initial_load(&self) -> Result<(ReloadHandle, Vec<LoadReport>)> {
        let handle = self.start()?;
        let reports = self.refresh_all().await;
        Ok((handle, reports))
    }

    /// Spawn the consumer task over an existing path channel.
    pub(crate) fn spawn_consumer(
        &self,
        rx: mpsc::UnboundedReceiver<PathBuf>,
        watcher: Option<RecommendedWatcher>,
    ) -> ReloadHandle {
        let shutdown = Arc::new(Notify::new());
        let manager = self.clone();
        let signal = Arc::clone(&shutdown);
        let task = tokio::spawn(async move { manager.run(rx, signal).await });
        ReloadHandle {
            watcher,
            shutdown,
            task,
        }
    }

    async fn run(self, mut rx: mpsc::UnboundedReceiver<PathBuf>, shutdown: Arc<Notify>) {
        let repo = self.loader.repo().to_path_buf();
        let mut roots = vec![repo.clone()];
        if let Ok(canonical) = fs::canonicalize(&repo) {
            if canonical != repo {
                roots.push(canonical);
            }
        }

        loop {
            let first = tokio::select! {
                biased;
                _ = shutdown.notified() => break,
                path = rx.recv() => match path {
                    Some(path) => path,
                    None => break,
                },
            };

            let mut pending = BTreeSet::new();
            self.collect_format(&roots, &first, &mut pending);

            let deadline = Instant::now() + self.options.debounce;
            loop {
                tokio::select! {
                    _ = tokio::time::sleep_until(deadline) => break,
                    path = rx.recv() => match path {
                        Some(path) => self.collect_format(&roots, &path, &mut pending),
                        None => break,
                    },
                }
            }

            if pending.is_empty() {
                continue;
            }
            self.run_cycle(pending.into_iter().collect()).await;
        }

        self.set_phase(ReloadPhase::Idle);
        info!("rule reload manager stopped");
    }

    fn collect_format(&self, roots: &[PathBuf], path: &Path, pending: &mut BTreeSet<Format>) {
        let known = self.store.known_formats();
        match roots.iter().find_map(|root| affected_format(root, path, &known)) {
            Some(format) => {
                if pending.insert(format.clone()) {
                    self.set_phase(ReloadPhase::ChangeDetected);
                    debug!(format = %format, path = %path.display(), "rule change detected");
                }
            }
            None => debug!(path = %path.display(), "ignoring change outside any format"),
        }
    }

    async fn run_cycle(&self, formats: Vec<Format>) {
        if let Some(sync) = &self.sync {
            self.set_phase(ReloadPhase::Syncing);
            let _ = sync_with_timeout(sync.as_ref(), self.loader.repo(), self.options.sync_timeout).await;
        }

        self.set_phase(ReloadPhase::Reloading);
        let manager = self.clone();
        let names: Vec<String> = formats.iter().map(Format::to_string).collect();
        match tokio::task::spawn_blocking(move || manager.reload_formats(&formats)).await {
            Ok(reports) => {
                let failed: usize = reports.iter().map(LoadReport::failed).sum();
                info!(formats = ?names, failed, "hot-reloaded rule formats");
            }
            Err(e) => warn!(formats = ?names, error = %e, "reload task failed"),
        }
        self.set_phase(ReloadPhase::Idle);
    }
}

/// Running watcher plus its consumer task.
pub struct ReloadHandle {
    watcher: Option<RecommendedWatcher>,
    shutdown: Arc<Notify>,
    task: JoinHandle<()>,
}

impl fmt::Debug for ReloadHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReloadHandle")
            .field("watching", &self.watcher.is_some())
            .field("finished", &self.task.is_finished())
            .finish()
    }
}

impl ReloadHandle {
    /// Stop watching, let an in-flight reload cycle finish, and join the task.
    pub async fn shutdown(self) {
        let ReloadHandle {
            watcher,
            shutdown,
            task,
        } = self;
        drop(watcher);
        shutdown.notify_one();
        if let Err(e) = task.await {
            warn!(error = %e, "reload task ended abnormally");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

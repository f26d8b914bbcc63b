//! Emission repository
//!
//! Owns the single background production task, reconciles each produced
//! emission against the store (insert new city, update repeat city in place)
//! and republishes the ordered list after every successful write.

use super::CityRepository;
use crate::producer::EmissionSource;
use crate::store::EmissionStore;
use async_trait::async_trait;
use cityemit_common::events::{CityEvent, EventBus, RecordOutcome};
use cityemit_common::{time, CityEmission, Result};
use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Repository over an [`EmissionStore`] fed by an [`EmissionSource`]
#[derive(Clone)]
pub struct EmissionRepository {
    inner: Arc<Inner>,
}

struct Inner {
    store: Arc<dyn EmissionStore>,
    source: Arc<dyn EmissionSource>,
    events: EventBus,
    snapshot: watch::Sender<Vec<CityEmission>>,
    production: Mutex<Option<ProductionTask>>,
}

struct ProductionTask {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl EmissionRepository {
    /// Create the repository and load the current contents of the store
    pub async fn new(
        store: Arc<dyn EmissionStore>,
        source: Arc<dyn EmissionSource>,
        events: EventBus,
    ) -> Result<Self> {
        let mut initial = store.all_emissions().await?;
        sort_by_city(&mut initial);
        debug!("Repository loaded {} stored emissions", initial.len());

        let (snapshot, _) = watch::channel(initial);

        Ok(Self {
            inner: Arc::new(Inner {
                store,
                source,
                events,
                snapshot,
                production: Mutex::new(None),
            }),
        })
    }

    /// Whether a production task is currently live
    pub async fn is_producing(&self) -> bool {
        self.inner
            .production
            .lock()
            .await
            .as_ref()
            .map(|task| !task.handle.is_finished())
            .unwrap_or(false)
    }

    /// Reload the observable list from the store
    pub async fn refresh(&self) -> Result<()> {
        self.inner.refresh().await
    }
}

impl Inner {
    async fn refresh(&self) -> Result<()> {
        let mut all = self.store.all_emissions().await?;
        sort_by_city(&mut all);
        self.snapshot.send_replace(all);
        Ok(())
    }

    async fn reconcile(&self, emission: CityEmission) -> Option<RecordOutcome> {
        match self.write(&emission).await {
            Ok((id, outcome)) => {
                debug!("Stored emission for {} ({:?}, id {})", emission.city, outcome, id);
                self.events.emit_lossy(CityEvent::EmissionRecorded {
                    id,
                    city: emission.city.clone(),
                    color: emission.color.clone(),
                    outcome,
                    timestamp: time::now(),
                });

                if let Err(e) = self.refresh().await {
                    warn!("Failed to refresh emission list: {}", e);
                }
                Some(outcome)
            }
            Err(e) => {
                warn!("Dropping emission for {}: {}", emission.city, e);
                self.events.emit_lossy(CityEvent::StorageFailure {
                    city: emission.city,
                    message: e.to_string(),
                    timestamp: time::now(),
                });
                None
            }
        }
    }

    async fn write(&self, emission: &CityEmission) -> Result<(i64, RecordOutcome)> {
        match self.store.emission_by_city(&emission.city).await? {
            Some(existing) => {
                let updated = CityEmission {
                    id: existing.id,
                    city: existing.city,
                    color: emission.color.clone(),
                    timestamp: emission.timestamp,
                    latitude: emission.latitude,
                    longitude: emission.longitude,
                };
                self.store.update_emission(&updated).await?;
                Ok((updated.id, RecordOutcome::Updated))
            }
            None => {
                let id = self.store.insert_emission(emission).await?;
                Ok((id, RecordOutcome::Inserted))
            }
        }
    }
}

#[async_trait]
impl CityRepository for EmissionRepository {
    fn city_emissions(&self) -> watch::Receiver<Vec<CityEmission>> {
        self.inner.snapshot.subscribe()
    }

    async fn start_producing(&self) {
        let mut production = self.inner.production.lock().await;

        if let Some(task) = production.as_ref() {
            if !task.handle.is_finished() {
                debug!("Emission production already running, ignoring start");
                return;
            }
        }

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run_production(Arc::clone(&self.inner), cancel.clone()));
        *production = Some(ProductionTask { cancel, handle });

        info!("Emission production started");
        self.inner.events.emit_lossy(CityEvent::ProductionStarted {
            timestamp: time::now(),
        });
    }

    async fn stop_producing(&self) {
        // Lock held until the task has finished so a concurrent start cannot overlap it
        let mut production = self.inner.production.lock().await;

        let Some(task) = production.take() else {
            debug!("Emission production not running, ignoring stop");
            return;
        };

        task.cancel.cancel();
        if let Err(e) = task.handle.await {
            warn!("Production task ended abnormally: {}", e);
        }

        info!("Emission production stopped");
        self.inner.events.emit_lossy(CityEvent::ProductionStopped {
            timestamp: time::now(),
        });
    }

    async fn insert_emission(&self, emission: CityEmission) -> Option<RecordOutcome> {
        self.inner.reconcile(emission).await
    }
}

async fn run_production(inner: Arc<Inner>, cancel: CancellationToken) {
    let mut emissions = inner.source.emissions();

    loop {
        tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                debug!("Production task cancelled");
                break;
            }

            next = emissions.next() => match next {
                Some(emission) => {
                    inner.reconcile(emission).await;
                }
                None => {
                    info!("Emission source exhausted");
                    inner.events.emit_lossy(CityEvent::ProductionExhausted {
                        timestamp: time::now(),
                    });
                    break;
                }
            },
        }
    }
}

fn sort_by_city(emissions: &mut [CityEmission]) {
    emissions.sort_by(|a, b| a.city.cmp(&b.city));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SqliteEmissionStore;
    use async_stream::stream;
    use chrono::{TimeZone, Utc};
    use cityemit_common::db::init_memory_database;
    use cityemit_common::Error;
    use futures::stream::BoxStream;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Replays a fixed list of emissions, one per interval
    struct ScriptedSource {
        script: Vec<CityEmission>,
        interval: Duration,
        calls: AtomicUsize,
    }

    impl ScriptedSource {
        fn new(script: Vec<CityEmission>, interval: Duration) -> Arc<Self> {
            Arc::new(Self {
                script,
                interval,
                calls: AtomicUsize::new(0),
            })
        }
    }

    impl EmissionSource for ScriptedSource {
        fn emissions(&self) -> BoxStream<'static, CityEmission> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let script = self.script.clone();
            let interval = self.interval;
            Box::pin(stream! {
                for emission in script {
                    yield emission;
                    tokio::time::sleep(interval).await;
                }
            })
        }
    }

    /// Never-ending source of distinct cities
    struct EndlessSource;

    impl EmissionSource for EndlessSource {
        fn emissions(&self) -> BoxStream<'static, CityEmission> {
            Box::pin(stream! {
                let mut n = 0u32;
                loop {
                    yield emission(&format!("City {:03}", n), "Blue", 0);
                    n += 1;
                    tokio::time::sleep(Duration::from_millis(10)).await;
                }
            })
        }
    }

    /// Store that refuses to insert one particular city
    struct FlakyStore {
        inner: SqliteEmissionStore,
        poisoned_city: String,
    }

    #[async_trait]
    impl EmissionStore for FlakyStore {
        async fn all_emissions(&self) -> Result<Vec<CityEmission>> {
            self.inner.all_emissions().await
        }

        async fn emission_by_city(&self, city: &str) -> Result<Option<CityEmission>> {
            self.inner.emission_by_city(city).await
        }

        async fn insert_emission(&self, emission: &CityEmission) -> Result<i64> {
            if emission.city == self.poisoned_city {
                return Err(Error::Io(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "disk full",
                )));
            }
            self.inner.insert_emission(emission).await
        }

        async fn update_emission(&self, emission: &CityEmission) -> Result<()> {
            self.inner.update_emission(emission).await
        }
    }

    fn emission(city: &str, color: &str, minute: u32) -> CityEmission {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 12, minute, 0).unwrap();
        CityEmission::new(city, color, ts, 10.0 + minute as f64, -20.0)
    }

    async fn sqlite_store() -> Arc<SqliteEmissionStore> {
        Arc::new(SqliteEmissionStore::new(init_memory_database().await.unwrap()))
    }

    async fn wait_for_len(rx: &mut watch::Receiver<Vec<CityEmission>>, len: usize) {
        tokio::time::timeout(Duration::from_secs(5), rx.wait_for(|list| list.len() >= len))
            .await
            .expect("Timed out waiting for emissions")
            .expect("Snapshot channel closed");
    }

    /// Wait until the production task has asked the source for `calls` streams
    async fn wait_for_calls(source: &ScriptedSource, calls: usize) {
        tokio::time::timeout(Duration::from_secs(1), async {
            while source.calls.load(Ordering::SeqCst) < calls {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("Production task never opened its stream");
    }

    #[tokio::test]
    async fn test_distinct_cities_all_inserted() {
        let store = sqlite_store().await;
        let script = vec![
            emission("Nashville", "Blue", 0),
            emission("Miami", "Red", 1),
            emission("Scranton", "Green", 2),
        ];
        let source = ScriptedSource::new(script, Duration::from_millis(1));
        let repo = EmissionRepository::new(store, source, EventBus::default()).await.unwrap();

        let mut rx = repo.city_emissions();
        repo.start_producing().await;
        wait_for_len(&mut rx, 3).await;

        let list = rx.borrow().clone();
        assert_eq!(list.len(), 3);
        let cities: Vec<&str> = list.iter().map(|e| e.city.as_str()).collect();
        assert_eq!(cities, vec!["Miami", "Nashville", "Scranton"]);
    }

    #[tokio::test]
    async fn test_repeat_city_updates_in_place() {
        let store = sqlite_store().await;
        let source = ScriptedSource::new(vec![], Duration::from_millis(1));
        let repo = EmissionRepository::new(store, source, EventBus::default()).await.unwrap();

        let first = repo.insert_emission(emission("Miami", "Red", 1)).await;
        assert_eq!(first, Some(RecordOutcome::Inserted));
        let original_id = repo.city_emissions().borrow()[0].id;

        let second = repo.insert_emission(emission("Miami", "Yellow", 7)).await;
        assert_eq!(second, Some(RecordOutcome::Updated));

        let list = repo.city_emissions().borrow().clone();
        assert_eq!(list.len(), 1);
        let stored = &list[0];
        assert_eq!(stored.id, original_id);
        assert_eq!(stored.color, "Yellow");
        assert_eq!(stored.timestamp, emission("Miami", "Yellow", 7).timestamp);
        assert_eq!(stored.latitude, 17.0);
    }

    #[tokio::test]
    async fn test_storage_failure_is_swallowed_and_loop_continues() {
        let store = Arc::new(FlakyStore {
            inner: SqliteEmissionStore::new(init_memory_database().await.unwrap()),
            poisoned_city: "Scranton".to_string(),
        });
        let script = vec![
            emission("Miami", "Red", 0),
            emission("Scranton", "Green", 1),
            emission("Nashville", "Blue", 2),
        ];
        let source = ScriptedSource::new(script, Duration::from_millis(1));
        let events = EventBus::new(16);
        let mut event_rx = events.subscribe();
        let repo = EmissionRepository::new(store, source, events).await.unwrap();

        let mut rx = repo.city_emissions();
        repo.start_producing().await;
        wait_for_len(&mut rx, 2).await;

        let cities: Vec<String> = rx.borrow().iter().map(|e| e.city.clone()).collect();
        assert_eq!(cities, vec!["Miami", "Nashville"]);

        let mut saw_failure = false;
        while let Ok(event) = event_rx.try_recv() {
            if let CityEvent::StorageFailure { city, .. } = event {
                assert_eq!(city, "Scranton");
                saw_failure = true;
            }
        }
        assert!(saw_failure, "Expected a StorageFailure event");
    }

    #[tokio::test]
    async fn test_stop_prevents_further_records() {
        let store = sqlite_store().await;
        let repo = EmissionRepository::new(store.clone(), Arc::new(EndlessSource), EventBus::default())
            .await
            .unwrap();

        let mut rx = repo.city_emissions();
        repo.start_producing().await;
        wait_for_len(&mut rx, 2).await;

        repo.stop_producing().await;
        assert!(!repo.is_producing().await);
        let stored_at_stop = store.all_emissions().await.unwrap().len();
        assert!(stored_at_stop >= 2);

        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(store.all_emissions().await.unwrap().len(), stored_at_stop);
        assert_eq!(rx.borrow().len(), stored_at_stop);
    }

    #[tokio::test]
    async fn test_second_start_is_ignored() {
        let store = sqlite_store().await;
        let source = ScriptedSource::new(
            vec![emission("Miami", "Red", 0), emission("Nashville", "Blue", 1)],
            Duration::from_millis(200),
        );
        let repo = EmissionRepository::new(store, source.clone(), EventBus::default())
            .await
            .unwrap();

        repo.start_producing().await;
        wait_for_calls(&source, 1).await;

        repo.start_producing().await;
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(repo.is_producing().await);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);

        repo.stop_producing().await;
        // Stopping twice is harmless
        repo.stop_producing().await;
        assert!(!repo.is_producing().await);
    }

    #[tokio::test]
    async fn test_exhausted_source_allows_restart() {
        let store = sqlite_store().await;
        let source = ScriptedSource::new(vec![emission("Miami", "Red", 0)], Duration::from_millis(1));
        let events = EventBus::new(16);
        let mut event_rx = events.subscribe();
        let repo = EmissionRepository::new(store, source.clone(), events).await.unwrap();

        repo.start_producing().await;
        loop {
            let event = tokio::time::timeout(Duration::from_secs(5), event_rx.recv())
                .await
                .expect("Timed out waiting for exhaustion")
                .unwrap();
            if matches!(event, CityEvent::ProductionExhausted { .. }) {
                break;
            }
        }

        // Handle may need a moment to be reported finished after the event
        tokio::time::timeout(Duration::from_secs(1), async {
            while repo.is_producing().await {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("Task should finish after exhaustion");

        repo.start_producing().await;
        wait_for_calls(&source, 2).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
        repo.stop_producing().await;
    }

    #[tokio::test]
    async fn test_new_loads_existing_rows_in_order() {
        let store = sqlite_store().await;
        store.insert_emission(&emission("Scranton", "Red", 0)).await.unwrap();
        store.insert_emission(&emission("Los Angeles", "Blue", 1)).await.unwrap();

        let source = ScriptedSource::new(vec![], Duration::from_millis(1));
        let repo = EmissionRepository::new(store, source, EventBus::default()).await.unwrap();

        let cities: Vec<String> = repo
            .city_emissions()
            .borrow()
            .iter()
            .map(|e| e.city.clone())
            .collect();
        assert_eq!(cities, vec!["Los Angeles", "Scranton"]);
    }
}

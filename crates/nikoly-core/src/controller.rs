// ── Controller facade ──
//
// Single entry point for consumers. Owns the current settings, the
// protocol client built from them, and the snapshot store. Calls that
// touch the network are serialized through one session lock; cache
// reads go straight to the store and never wait.

use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use serde_json::{Map, Value};
use tokio::sync::Mutex;
use tracing::{debug, info};

use nikoly_api::{NikoClient, Response};

use crate::config::ControllerConfig;
use crate::error::CoreError;
use crate::model::{Classifier, Device, Location, Setting};
use crate::store::{DataStore, Snapshot};

// ── Session ──────────────────────────────────────────────────────────

/// Settings plus everything derived from them. Replaced as a unit.
struct Session {
    config: ControllerConfig,
    client: NikoClient,
    classifier: Classifier,
}

impl Session {
    fn new(config: ControllerConfig) -> Self {
        Self {
            client: NikoClient::new(config.endpoint()),
            classifier: config.classifier(),
            config,
        }
    }
}

// ── Controller ───────────────────────────────────────────────────────

/// Cheaply cloneable handle to one controller.
#[derive(Clone)]
pub struct Controller {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    session: Mutex<Session>,
    store: DataStore,
}

impl Controller {
    /// Create a controller handle. Does not touch the network; call
    /// [`refresh()`](Self::refresh) to populate the cache.
    pub fn new(config: ControllerConfig) -> Self {
        Self {
            inner: Arc::new(ControllerInner {
                session: Mutex::new(Session::new(config)),
                store: DataStore::new(),
            }),
        }
    }

    /// One-shot: refresh, run the closure, return its result.
    pub async fn oneshot<F, Fut, T>(config: ControllerConfig, f: F) -> Result<T, CoreError>
    where
        F: FnOnce(Controller) -> Fut,
        Fut: Future<Output = Result<T, CoreError>>,
    {
        let controller = Controller::new(config);
        controller.refresh().await?;
        f(controller).await
    }

    pub async fn config(&self) -> ControllerConfig {
        self.inner.session.lock().await.config.clone()
    }

    pub async fn classifier(&self) -> Classifier {
        self.inner.session.lock().await.classifier.clone()
    }

    // ── Network operations ───────────────────────────────────────────

    /// Fetch system info, devices and locations, in that order.
    ///
    /// The cache is replaced only when all three succeed; on any failure
    /// the previous snapshot stays in place and the error is returned.
    /// The swap happens before the session lock is released.
    pub async fn refresh(&self) -> Result<(), CoreError> {
        let session = self.inner.session.lock().await;
        let client = &session.client;

        let system_info = client.system_info().await?;
        let devices: Vec<Device> = client
            .list_actions()
            .await?
            .into_iter()
            .map(Device::from)
            .collect();
        let locations: Vec<Location> = client
            .list_locations()
            .await?
            .into_iter()
            .map(Location::from)
            .collect();

        debug!(
            devices = devices.len(),
            locations = locations.len(),
            "data refresh complete"
        );
        self.inner.store.replace(Snapshot {
            system_info,
            devices,
            locations,
            refreshed_at: Some(Utc::now()),
        });
        drop(session);
        Ok(())
    }

    /// Set a device's primary value. The cache is not refreshed.
    pub async fn execute(&self, device: &Device, value: i64) -> Result<(), CoreError> {
        let session = self.inner.session.lock().await;
        debug!(id = device.id, value, "executing action");
        session.client.execute_action(device.id, value).await?;
        Ok(())
    }

    /// Translate a setting for the device's kind and execute it.
    pub async fn apply(&self, device: &Device, setting: Setting) -> Result<i64, CoreError> {
        let session = self.inner.session.lock().await;
        let kind = session.classifier.classify(device);
        let value = setting.wire_value(kind)?;
        debug!(id = device.id, %kind, %setting, value, "applying setting");
        session.client.execute_action(device.id, value).await?;
        Ok(value)
    }

    /// Send an arbitrary command. The cache is not touched.
    pub async fn raw_command(
        &self,
        cmd: &str,
        fields: Map<String, Value>,
    ) -> Result<Response, CoreError> {
        let session = self.inner.session.lock().await;
        Ok(session.client.raw_command(cmd, fields).await?)
    }

    /// Swap in new settings, rebuilding the client and classifier.
    ///
    /// Waits for any in-flight call, which completes against the old
    /// client. The cached snapshot is kept.
    pub async fn update_endpoint(&self, config: ControllerConfig) {
        let mut session = self.inner.session.lock().await;
        info!(
            address = %config.address,
            port = config.port,
            "controller endpoint updated"
        );
        *session = Session::new(config);
    }

    // ── Cache reads ──────────────────────────────────────────────────

    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.inner.store.snapshot()
    }

    pub fn devices(&self) -> Vec<Device> {
        self.inner.store.snapshot().devices.clone()
    }

    /// Devices in one location. Unknown locations yield an empty list.
    pub fn devices_in(&self, location_id: i64) -> Vec<Device> {
        self.inner.store.snapshot().devices_in(location_id)
    }

    pub fn device(&self, id: i64) -> Result<Device, CoreError> {
        self.inner
            .store
            .snapshot()
            .device(id)
            .cloned()
            .ok_or(CoreError::DeviceNotFound { id })
    }

    /// User-facing locations (reserved id 0 excluded).
    pub fn locations(&self) -> Vec<Location> {
        self.inner.store.snapshot().user_locations()
    }

    /// Every location the controller reported.
    pub fn all_locations(&self) -> Vec<Location> {
        self.inner.store.snapshot().locations.clone()
    }

    /// Any location the controller reported, reserved or not.
    pub fn location(&self, id: i64) -> Result<Location, CoreError> {
        self.inner
            .store
            .snapshot()
            .location(id)
            .cloned()
            .ok_or(CoreError::LocationNotFound { id })
    }

    pub fn system_info(&self) -> Map<String, Value> {
        self.inner.store.snapshot().system_info.clone()
    }

    pub fn last_refresh(&self) -> Option<chrono::DateTime<Utc>> {
        self.inner.store.last_refresh()
    }
}

//! Version-keyed client cache.
//!
//! # Locking
//!
//! Two locks cooperate:
//!
//! - `clients` is a reader/writer lock held only long enough to look up or
//!   insert one entry, so a reader never sees a half-written entry and cached
//!   lookups never wait on the network.
//! - `construct` serializes the check, construct, ping and store sequence.
//!   Construction for different versions is therefore serialized too.
//!
//! `get_client` first peeks at `clients` without taking `construct`. On a
//! miss it takes `construct` and checks again, since another caller may have
//! finished building the same version while this one waited. Both guards are
//! scoped and `parking_lot` locks do not poison, so a failing or panicking
//! provider never leaves the cache unusable.

use std::collections::HashMap;
use std::sync::Arc;

use dockhand_protocol::{ProtocolVersion, DEFAULT_VERSION, SUPPORTED_VERSIONS};
use parking_lot::{Mutex, RwLock};

use crate::error::FactoryError;
use crate::provider::{ClientProvider, VersionedClient};

pub struct ClientFactory<P: ClientProvider> {
    endpoint: String,
    provider: P,
    supported_versions: Vec<ProtocolVersion>,
    default_version: ProtocolVersion,
    clients: RwLock<HashMap<ProtocolVersion, Arc<P::Client>>>,
    construct: Mutex<()>,
}

impl<P: ClientProvider> ClientFactory<P> {
    pub fn new(endpoint: impl Into<String>, provider: P) -> Self {
        let endpoint = endpoint.into();
        tracing::debug!(%endpoint, "constructing new client factory");
        Self {
            endpoint,
            provider,
            supported_versions: SUPPORTED_VERSIONS.to_vec(),
            default_version: DEFAULT_VERSION,
            clients: RwLock::new(HashMap::new()),
            construct: Mutex::new(()),
        }
    }

    /// Replaces the list [`find_available_versions`](Self::find_available_versions)
    /// walks. Order is preserved as given.
    pub fn with_supported_versions(
        mut self,
        versions: impl IntoIterator<Item = ProtocolVersion>,
    ) -> Self {
        self.supported_versions = versions.into_iter().collect();
        self
    }

    pub fn with_default_version(mut self, version: ProtocolVersion) -> Self {
        self.default_version = version;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn default_version(&self) -> ProtocolVersion {
        self.default_version
    }

    pub fn supported_versions(&self) -> &[ProtocolVersion] {
        &self.supported_versions
    }

    pub fn is_cached(&self, version: ProtocolVersion) -> bool {
        self.clients.read().contains_key(&version)
    }

    /// Versions holding a validated client, in ascending order.
    pub fn cached_versions(&self) -> Vec<ProtocolVersion> {
        let mut versions: Vec<_> = self.clients.read().keys().copied().collect();
        versions.sort();
        versions
    }

    pub fn get_default_client(&self) -> Result<Arc<P::Client>, FactoryError> {
        tracing::debug!(version = %self.default_version, "getting default client from factory");
        self.get_client(self.default_version)
    }

    /// Returns the cached client for `version`, building and pinging one on
    /// first use.
    ///
    /// `version` does not have to be in the supported list. Failures are not
    /// remembered: the next call for the same version tries again.
    ///
    /// # Errors
    ///
    /// [`FactoryError::Construction`] when the provider cannot build a client,
    /// [`FactoryError::Liveness`] when the new client fails its ping.
    pub fn get_client(&self, version: ProtocolVersion) -> Result<Arc<P::Client>, FactoryError> {
        tracing::debug!(%version, "getting specific client from factory");

        if let Some(client) = self.cached(version) {
            tracing::debug!(%version, "returning cached client before lock");
            return Ok(client);
        }

        let _guard = self.construct.lock();

        if let Some(client) = self.cached(version) {
            tracing::debug!(%version, "returning cached client after lock");
            return Ok(client);
        }

        let client = self
            .provider
            .connect(&self.endpoint, version)
            .map_err(|source| {
                tracing::debug!(%version, error = %source, "error acquiring client");
                FactoryError::Construction { version, source }
            })?;

        client.ping().map_err(|source| {
            tracing::debug!(%version, error = %source, "error pinging client");
            FactoryError::Liveness { version, source }
        })?;

        let client = Arc::new(client);
        self.clients.write().insert(version, Arc::clone(&client));
        tracing::debug!(%version, "returning new client");
        Ok(client)
    }

    /// Tries every supported version in order and returns the ones that
    /// produced a live client. Each success stays cached.
    pub fn find_available_versions(&self) -> Vec<ProtocolVersion> {
        let available: Vec<ProtocolVersion> = self
            .supported_versions
            .iter()
            .copied()
            .filter(|&version| match self.get_client(version) {
                Ok(_) => true,
                Err(e) => {
                    tracing::debug!(%version, error = %e, "failed to ping with API version");
                    false
                }
            })
            .collect();

        let detected: Vec<String> = available.iter().map(ToString::to_string).collect();
        tracing::info!(
            endpoint = %self.endpoint,
            versions = ?detected,
            "detected daemon API versions"
        );
        available
    }

    fn cached(&self, version: ProtocolVersion) -> Option<Arc<P::Client>> {
        self.clients.read().get(&version).cloned()
    }
}

impl<P: ClientProvider> std::fmt::Debug for ClientFactory<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientFactory")
            .field("endpoint", &self.endpoint)
            .field("default_version", &self.default_version)
            .field("supported_versions", &self.supported_versions)
            .field("cached_versions", &self.cached_versions())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Barrier;
    use std::thread;
    use std::time::Duration;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::error::{ClientError, Result};

    const ENDPOINT: &str = "unix:///var/run/docker.sock";

    #[derive(Debug)]
    struct MockClient {
        version: ProtocolVersion,
        serial: usize,
        alive: bool,
        pings: Arc<AtomicUsize>,
    }

    impl VersionedClient for MockClient {
        fn api_version(&self) -> ProtocolVersion {
            self.version
        }

        fn ping(&self) -> Result<()> {
            self.pings.fetch_add(1, Ordering::SeqCst);
            if self.alive {
                Ok(())
            } else {
                Err(ClientError::Daemon {
                    status: 400,
                    message: format!("client version {} is too old", self.version),
                })
            }
        }
    }

    #[derive(Default)]
    struct MockProvider {
        connects: Mutex<HashMap<ProtocolVersion, usize>>,
        pings: Arc<AtomicUsize>,
        unbuildable: Mutex<HashSet<ProtocolVersion>>,
        dead: Mutex<HashSet<ProtocolVersion>>,
        delay: Option<Duration>,
        endpoints: Mutex<Vec<String>>,
    }

    impl MockProvider {
        fn failing_construction(versions: &[ProtocolVersion]) -> Self {
            let provider = Self::default();
            provider.unbuildable.lock().extend(versions);
            provider
        }

        fn failing_ping(versions: &[ProtocolVersion]) -> Self {
            let provider = Self::default();
            provider.dead.lock().extend(versions);
            provider
        }

        fn connects_for(&self, version: ProtocolVersion) -> usize {
            self.connects.lock().get(&version).copied().unwrap_or(0)
        }

        fn total_connects(&self) -> usize {
            self.connects.lock().values().sum()
        }
    }

    impl ClientProvider for MockProvider {
        type Client = MockClient;

        fn connect(&self, endpoint: &str, version: ProtocolVersion) -> Result<MockClient> {
            self.endpoints.lock().push(endpoint.to_string());
            let serial = {
                let mut connects = self.connects.lock();
                let count = connects.entry(version).or_insert(0);
                *count += 1;
                *count
            };
            if let Some(delay) = self.delay {
                thread::sleep(delay);
            }
            if self.unbuildable.lock().contains(&version) {
                return Err(ClientError::InvalidEndpoint {
                    endpoint: endpoint.to_string(),
                    reason: "unsupported transport".to_string(),
                });
            }
            Ok(MockClient {
                version,
                serial,
                alive: !self.dead.lock().contains(&version),
                pings: Arc::clone(&self.pings),
            })
        }
    }

    #[test]
    fn test_get_client_caches_success() {
        let factory = ClientFactory::new(ENDPOINT, MockProvider::default());

        let first = factory.get_client(ProtocolVersion::V1_20).unwrap();
        let second = factory.get_client(ProtocolVersion::V1_20).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(factory.provider.connects_for(ProtocolVersion::V1_20), 1);
        assert_eq!(factory.provider.pings.load(Ordering::SeqCst), 1);
        assert_eq!(first.api_version(), ProtocolVersion::V1_20);
    }

    #[test]
    fn test_get_client_passes_endpoint_to_provider() {
        let factory = ClientFactory::new(ENDPOINT, MockProvider::default());
        factory.get_client(ProtocolVersion::V1_22).unwrap();

        assert_eq!(*factory.provider.endpoints.lock(), vec![ENDPOINT.to_string()]);
        assert_eq!(factory.endpoint(), ENDPOINT);
    }

    #[test]
    fn test_construction_failure_is_not_cached() {
        let factory = ClientFactory::new(
            ENDPOINT,
            MockProvider::failing_construction(&[ProtocolVersion::V1_21]),
        );

        let err = factory.get_client(ProtocolVersion::V1_21).unwrap_err();
        assert!(matches!(err, FactoryError::Construction { .. }));
        assert_eq!(factory.provider.pings.load(Ordering::SeqCst), 0);

        let err = factory.get_client(ProtocolVersion::V1_21).unwrap_err();
        assert!(matches!(err, FactoryError::Construction { .. }));
        assert_eq!(factory.provider.connects_for(ProtocolVersion::V1_21), 2);
        assert!(!factory.is_cached(ProtocolVersion::V1_21));
    }

    #[test]
    fn test_liveness_failure_is_not_cached() {
        let factory =
            ClientFactory::new(ENDPOINT, MockProvider::failing_ping(&[ProtocolVersion::V1_17]));

        for attempt in 1..=3 {
            let err = factory.get_client(ProtocolVersion::V1_17).unwrap_err();
            assert!(matches!(
                err,
                FactoryError::Liveness {
                    version: ProtocolVersion::V1_17,
                    ..
                }
            ));
            assert_eq!(factory.provider.connects_for(ProtocolVersion::V1_17), attempt);
        }
        assert!(factory.cached_versions().is_empty());
    }

    #[test]
    fn test_recovers_after_transient_failure() {
        let factory =
            ClientFactory::new(ENDPOINT, MockProvider::failing_ping(&[ProtocolVersion::V1_23]));
        assert!(factory.get_client(ProtocolVersion::V1_23).is_err());

        factory.provider.dead.lock().clear();

        let client = factory.get_client(ProtocolVersion::V1_23).unwrap();
        assert_eq!(client.serial, 2);
        assert!(factory.is_cached(ProtocolVersion::V1_23));
    }

    #[test]
    fn test_default_client_matches_default_version() {
        let factory = ClientFactory::new(ENDPOINT, MockProvider::default());

        let default = factory.get_default_client().unwrap();
        let explicit = factory.get_client(DEFAULT_VERSION).unwrap();

        assert!(Arc::ptr_eq(&default, &explicit));
        assert_eq!(factory.default_version(), ProtocolVersion::V1_24);
        assert_eq!(factory.provider.total_connects(), 1);
    }

    #[test]
    fn test_default_client_propagates_failure() {
        let factory = ClientFactory::new(
            ENDPOINT,
            MockProvider::failing_construction(&[ProtocolVersion::V1_22]),
        )
        .with_default_version(ProtocolVersion::V1_22);

        let err = factory.get_default_client().unwrap_err();
        assert_eq!(err.version(), ProtocolVersion::V1_22);
        assert!(matches!(err, FactoryError::Construction { .. }));
    }

    #[test]
    fn test_unsupported_version_is_still_attempted() {
        let unknown = ProtocolVersion::new(1, 25);
        let factory = ClientFactory::new(ENDPOINT, MockProvider::default());

        let client = factory.get_client(unknown).unwrap();

        assert_eq!(client.api_version(), unknown);
        assert_eq!(factory.provider.connects_for(unknown), 1);
        assert!(!factory.supported_versions().contains(&unknown));
    }

    #[test]
    fn test_unsupported_version_error_is_surfaced() {
        let unknown = ProtocolVersion::new(1, 25);
        let factory = ClientFactory::new(ENDPOINT, MockProvider::failing_ping(&[unknown]));

        let err = factory.get_client(unknown).unwrap_err();
        assert!(err.to_string().contains("1.25"));
    }

    #[test]
    fn test_find_available_versions_skips_failures_in_order() {
        let provider = MockProvider::failing_ping(&[ProtocolVersion::V1_17, ProtocolVersion::V1_18]);
        let factory = ClientFactory::new(ENDPOINT, provider);

        let available = factory.find_available_versions();

        let expected = vec![
            ProtocolVersion::V1_19,
            ProtocolVersion::V1_20,
            ProtocolVersion::V1_21,
            ProtocolVersion::V1_22,
            ProtocolVersion::V1_23,
            ProtocolVersion::V1_24,
        ];
        assert_eq!(available, expected);
        assert_eq!(factory.cached_versions(), expected);
    }

    #[test]
    fn test_find_available_versions_continues_past_middle_failure() {
        let provider = MockProvider::failing_construction(&[ProtocolVersion::V1_20]);
        let factory = ClientFactory::new(ENDPOINT, provider);

        let available = factory.find_available_versions();

        assert_eq!(available.len(), SUPPORTED_VERSIONS.len() - 1);
        assert!(!available.contains(&ProtocolVersion::V1_20));
        assert!(available.contains(&ProtocolVersion::V1_24));
        assert_eq!(
            factory.provider.total_connects(),
            SUPPORTED_VERSIONS.len()
        );
    }

    #[test]
    fn test_find_available_versions_reuses_cache() {
        let factory = ClientFactory::new(ENDPOINT, MockProvider::default());
        let warm = factory.get_client(ProtocolVersion::V1_19).unwrap();

        factory.find_available_versions();

        assert_eq!(factory.provider.connects_for(ProtocolVersion::V1_19), 1);
        assert!(Arc::ptr_eq(
            &warm,
            &factory.get_client(ProtocolVersion::V1_19).unwrap()
        ));
    }

    #[test]
    fn test_find_available_versions_uses_configured_list() {
        let custom = [ProtocolVersion::new(1, 25), ProtocolVersion::V1_18];
        let factory =
            ClientFactory::new(ENDPOINT, MockProvider::default()).with_supported_versions(custom);

        assert_eq!(factory.find_available_versions(), custom.to_vec());
        assert_eq!(factory.provider.total_connects(), 2);
    }

    #[test]
    fn test_find_available_versions_none_reachable() {
        let factory =
            ClientFactory::new(ENDPOINT, MockProvider::failing_construction(&SUPPORTED_VERSIONS));

        assert!(factory.find_available_versions().is_empty());
        assert!(factory.cached_versions().is_empty());
    }

    #[test]
    fn test_concurrent_callers_construct_once() {
        const CALLERS: usize = 16;

        let provider = MockProvider {
            delay: Some(Duration::from_millis(50)),
            ..Default::default()
        };
        let factory = Arc::new(ClientFactory::new(ENDPOINT, provider));
        let barrier = Arc::new(Barrier::new(CALLERS));

        let handles: Vec<_> = (0..CALLERS)
            .map(|_| {
                let factory = Arc::clone(&factory);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    factory.get_client(ProtocolVersion::V1_24).unwrap()
                })
            })
            .collect();

        let clients: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(factory.provider.connects_for(ProtocolVersion::V1_24), 1);
        assert_eq!(factory.provider.pings.load(Ordering::SeqCst), 1);
        assert!(clients.iter().all(|c| Arc::ptr_eq(c, &clients[0])));
    }

    #[test]
    fn test_concurrent_callers_all_fail_without_caching() {
        const CALLERS: usize = 8;

        let provider = MockProvider {
            delay: Some(Duration::from_millis(10)),
            ..MockProvider::failing_ping(&[ProtocolVersion::V1_21])
        };
        let factory = Arc::new(ClientFactory::new(ENDPOINT, provider));
        let barrier = Arc::new(Barrier::new(CALLERS));

        let handles: Vec<_> = (0..CALLERS)
            .map(|_| {
                let factory = Arc::clone(&factory);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    factory.get_client(ProtocolVersion::V1_21).is_err()
                })
            })
            .collect();

        assert!(handles.into_iter().all(|h| h.join().unwrap()));
        assert!(factory.provider.connects_for(ProtocolVersion::V1_21) >= 1);
        assert!(!factory.is_cached(ProtocolVersion::V1_21));
    }

    #[test]
    fn test_cached_lookup_does_not_wait_on_construction() {
        let provider = MockProvider {
            delay: Some(Duration::from_millis(300)),
            ..Default::default()
        };
        let factory = Arc::new(ClientFactory::new(ENDPOINT, provider));
        factory.get_client(ProtocolVersion::V1_24).unwrap();

        let slow = {
            let factory = Arc::clone(&factory);
            thread::spawn(move || factory.get_client(ProtocolVersion::V1_17).unwrap())
        };
        while factory.provider.connects_for(ProtocolVersion::V1_17) == 0 {
            thread::yield_now();
        }

        let started = std::time::Instant::now();
        factory.get_client(ProtocolVersion::V1_24).unwrap();
        assert!(started.elapsed() < Duration::from_millis(200));

        slow.join().unwrap();
    }

    #[test]
    fn test_panicking_provider_leaves_factory_usable() {
        struct Flaky {
            calls: AtomicUsize,
            inner: MockProvider,
        }

        impl ClientProvider for Flaky {
            type Client = MockClient;

            fn connect(&self, endpoint: &str, version: ProtocolVersion) -> Result<MockClient> {
                if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    panic!("provider blew up");
                }
                self.inner.connect(endpoint, version)
            }
        }

        let factory = Arc::new(ClientFactory::new(
            ENDPOINT,
            Flaky {
                calls: AtomicUsize::new(0),
                inner: MockProvider::default(),
            },
        ));

        let crashed = {
            let factory = Arc::clone(&factory);
            thread::spawn(move || factory.get_client(ProtocolVersion::V1_20)).join()
        };
        assert!(crashed.is_err());

        assert!(factory.get_client(ProtocolVersion::V1_20).is_ok());
    }
}

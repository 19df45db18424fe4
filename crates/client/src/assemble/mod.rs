//! Concurrent assembly of a tenant's configuration from the remote store.
//!
//! One [`ConfigAssembler::fetch`] issues the parent document, the four
//! single-document subsections and the product list at once. Each round trip
//! consults the shared [`TtlCache`] first and runs under the [`FetchPolicy`]
//! deadline and retry budget. The parent decides the outcome: when it is
//! absent the fetch fails with `NotFound` without waiting for the rest.

pub mod merge;
pub mod retry;

use std::sync::Arc;

use sitecfg_core::{AppConfig, Error, Record, RemoteStore, SiteConfiguration, StoredDocument, TtlCache};
use tokio::task::JoinHandle;

pub use merge::Subsection;
pub use retry::{FetchPolicy, with_timeout_retry};

/// Cache section holding parent documents.
pub const PARENT_SECTION: &str = "config";

/// Cache section holding product lists.
pub const PRODUCTS_SECTION: &str = "produtos";

/// Every cache section the assembler writes, keyed by tenant id.
pub const CACHE_SECTIONS: [&str; 6] = [PARENT_SECTION, "cores", "contato", "modulos", "sobre", PRODUCTS_SECTION];

/// Id of the single document inside each subsection collection.
const SUBSECTION_DOCUMENT: &str = "data";

/// A cached store round trip.
#[derive(Debug, Clone, PartialEq)]
pub enum CachedFetch {
    Document(Option<Record>),
    Collection(Vec<StoredDocument>),
}

/// Everything a spawned fetch task needs, cheap to clone.
#[derive(Clone)]
struct FetchContext {
    store: Arc<dyn RemoteStore>,
    cache: TtlCache<CachedFetch>,
    policy: FetchPolicy,
    tenant_id: String,
}

impl FetchContext {
    async fn document(self, section: &'static str, collection: String, id: String) -> Result<Option<Record>, Error> {
        if let Some(CachedFetch::Document(doc)) = self.cache.get(section, &self.tenant_id) {
            tracing::debug!(section, tenant = %self.tenant_id, "cache hit");
            return Ok(doc);
        }

        let label = format!("{collection}/{id}");
        let doc = with_timeout_retry(&self.policy, &label, || {
            let store = self.store.clone();
            let (collection, id) = (collection.clone(), id.clone());
            async move { store.get_document(&collection, &id).await }
        })
        .await?;

        // an absent parent is re-checked on every fetch
        if doc.is_some() || section != PARENT_SECTION {
            self.cache.set(section, &self.tenant_id, CachedFetch::Document(doc.clone()));
        }
        Ok(doc)
    }

    async fn collection(self, section: &'static str, collection: String) -> Result<Vec<StoredDocument>, Error> {
        if let Some(CachedFetch::Collection(docs)) = self.cache.get(section, &self.tenant_id) {
            tracing::debug!(section, tenant = %self.tenant_id, "cache hit");
            return Ok(docs);
        }

        let docs = with_timeout_retry(&self.policy, &collection, || {
            let store = self.store.clone();
            let collection = collection.clone();
            async move { store.get_collection(&collection).await }
        })
        .await?;

        self.cache.set(section, &self.tenant_id, CachedFetch::Collection(docs.clone()));
        Ok(docs)
    }
}

async fn join<T>(handle: JoinHandle<Result<T, Error>>, label: &str) -> Result<T, Error> {
    handle.await.map_err(|e| Error::RemoteStore(format!("{label} fetch task failed: {e}")))?
}

/// Builds [`SiteConfiguration`]s from a [`RemoteStore`].
#[derive(Clone)]
pub struct ConfigAssembler {
    store: Arc<dyn RemoteStore>,
    cache: TtlCache<CachedFetch>,
    policy: FetchPolicy,
    root_collection: String,
}

impl ConfigAssembler {
    pub fn new(store: Arc<dyn RemoteStore>, cache: TtlCache<CachedFetch>) -> Self {
        Self { store, cache, policy: FetchPolicy::default(), root_collection: "configuracoes".into() }
    }

    /// Assembler using the configured root collection and fetch policy.
    pub fn from_config(store: Arc<dyn RemoteStore>, cache: TtlCache<CachedFetch>, config: &AppConfig) -> Self {
        Self::new(store, cache).with_policy(FetchPolicy::from_config(config)).with_root_collection(&config.root_collection)
    }

    pub fn with_policy(mut self, policy: FetchPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_root_collection(mut self, root_collection: impl Into<String>) -> Self {
        self.root_collection = root_collection.into();
        self
    }

    /// The fetch cache shared with this assembler.
    pub fn cache(&self) -> &TtlCache<CachedFetch> {
        &self.cache
    }

    pub fn policy(&self) -> &FetchPolicy {
        &self.policy
    }

    /// Fetch and merge one tenant's configuration.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` for an empty tenant id or one containing `/`
    /// - `NotFound` when the parent document does not exist
    /// - `Timeout` when any round trip exhausts its retry budget
    /// - `RemoteStore` / `Decode` as reported by the store
    pub async fn fetch(&self, tenant_id: &str) -> Result<SiteConfiguration, Error> {
        if tenant_id.is_empty() || tenant_id.contains('/') {
            return Err(Error::InvalidInput(format!("invalid tenant id: {tenant_id:?}")));
        }

        let start = tokio::time::Instant::now();
        let ctx = FetchContext {
            store: self.store.clone(),
            cache: self.cache.clone(),
            policy: self.policy,
            tenant_id: tenant_id.to_string(),
        };
        let tenant_path = format!("{}/{tenant_id}", self.root_collection);

        let parent = tokio::spawn(ctx.clone().document(PARENT_SECTION, self.root_collection.clone(), tenant_id.to_string()));
        let subsections: Vec<_> = Subsection::ALL
            .into_iter()
            .map(|sub| {
                let collection = format!("{tenant_path}/{}", sub.collection());
                let task = tokio::spawn(ctx.clone().document(sub.collection(), collection, SUBSECTION_DOCUMENT.into()));
                (sub, task)
            })
            .collect();
        let products = tokio::spawn(ctx.collection(PRODUCTS_SECTION, format!("{tenant_path}/{PRODUCTS_SECTION}")));

        // remaining tasks keep running detached and still populate the cache
        let Some(parent) = join(parent, PARENT_SECTION).await? else {
            tracing::info!(tenant = tenant_id, "tenant configuration not found");
            return Err(Error::NotFound(format!("no configuration for tenant {tenant_id}")));
        };

        let mut config = merge::from_parent(&parent);
        for (sub, task) in subsections {
            if let Some(record) = join(task, sub.collection()).await? {
                merge::apply_subsection(&mut config, sub, record);
            }
        }
        config.products = Some(merge::products(join(products, PRODUCTS_SECTION).await?));

        tracing::debug!(tenant = tenant_id, elapsed_ms = start.elapsed().as_millis() as u64, "assembled configuration");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use async_trait::async_trait;
    use serde_json::{Value, json};
    use std::collections::HashMap;
    use std::sync::Mutex;

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    /// Memory store that can hang or fail chosen paths and counts calls.
    #[derive(Default)]
    struct ScriptedStore {
        inner: MemoryStore,
        hangs: Mutex<HashMap<String, u32>>,
        failures: HashMap<String, Error>,
        calls: Mutex<HashMap<String, u32>>,
    }

    impl ScriptedStore {
        fn hang(self, path: &str, times: u32) -> Self {
            self.hangs.lock().unwrap().insert(path.to_string(), times);
            self
        }

        fn fail(mut self, path: &str, err: Error) -> Self {
            self.failures.insert(path.to_string(), err);
            self
        }

        fn calls(&self, path: &str) -> u32 {
            self.calls.lock().unwrap().get(path).copied().unwrap_or(0)
        }

        async fn script(&self, path: &str) -> Result<(), Error> {
            *self.calls.lock().unwrap().entry(path.to_string()).or_default() += 1;

            let hang = {
                let mut hangs = self.hangs.lock().unwrap();
                match hangs.get_mut(path) {
                    Some(n) if *n > 0 => {
                        *n -= 1;
                        true
                    }
                    _ => false,
                }
            };
            if hang {
                std::future::pending::<()>().await;
            }

            match self.failures.get(path) {
                Some(err) => Err(err.clone()),
                None => Ok(()),
            }
        }
    }

    #[async_trait]
    impl RemoteStore for ScriptedStore {
        async fn get_document(&self, collection: &str, id: &str) -> Result<Option<Record>, Error> {
            self.script(&format!("{collection}/{id}")).await?;
            self.inner.get_document(collection, id).await
        }

        async fn get_collection(&self, collection: &str) -> Result<Vec<StoredDocument>, Error> {
            self.script(collection).await?;
            self.inner.get_collection(collection).await
        }
    }

    async fn acme_store() -> ScriptedStore {
        let store = ScriptedStore::default();
        store.inner.insert("configuracoes", "acme", record(json!({"empresaNome": "Acme"}))).await;
        store.inner.insert("configuracoes/acme/contato", "data", record(json!({"telefone": "123"}))).await;
        store
    }

    fn assembler(store: ScriptedStore) -> (ConfigAssembler, Arc<ScriptedStore>) {
        let store = Arc::new(store);
        (ConfigAssembler::new(store.clone(), TtlCache::new()), store)
    }

    #[tokio::test]
    async fn test_merges_parent_and_subsections() {
        let (assembler, _) = assembler(acme_store().await);

        let config = assembler.fetch("acme").await.unwrap();

        assert_eq!(config.company_name.as_deref(), Some("Acme"));
        assert_eq!(config.contact.and_then(|c| c.phone).as_deref(), Some("123"));
        assert!(config.colors.is_none());
        assert!(config.about.is_none());
        assert_eq!(config.products, Some(Vec::new()));
    }

    #[tokio::test]
    async fn test_missing_parent_is_not_found() {
        let (assembler, _) = assembler(ScriptedStore::default());

        let result = assembler.fetch("ghost").await;

        assert!(matches!(result, Err(Error::NotFound(_))));
        assert!(assembler.cache().get(PARENT_SECTION, "ghost").is_none());
    }

    #[tokio::test]
    async fn test_rejects_bad_tenant_id() {
        let (assembler, store) = assembler(ScriptedStore::default());

        assert!(matches!(assembler.fetch("").await, Err(Error::InvalidInput(_))));
        assert!(matches!(assembler.fetch("a/b").await, Err(Error::InvalidInput(_))));
        assert_eq!(store.calls("configuracoes/a/b"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_timed_out_fetch() {
        let (assembler, store) = assembler(acme_store().await.hang("configuracoes/acme", 2));

        let config = assembler.fetch("acme").await.unwrap();

        assert_eq!(config.company_name.as_deref(), Some("Acme"));
        assert_eq!(store.calls("configuracoes/acme"), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fails_after_retry_budget() {
        let (assembler, store) = assembler(acme_store().await.hang("configuracoes/acme/cores/data", 4));

        let result = assembler.fetch("acme").await;

        assert!(matches!(result, Err(Error::Timeout(_))));
        assert_eq!(store.calls("configuracoes/acme/cores/data"), 4);
    }

    #[tokio::test]
    async fn test_store_error_is_not_retried() {
        let store = acme_store().await.fail("configuracoes/acme/produtos", Error::RemoteStore("denied".into()));
        let (assembler, store) = assembler(store);

        let result = assembler.fetch("acme").await;

        assert!(matches!(result, Err(Error::RemoteStore(_))));
        assert_eq!(store.calls("configuracoes/acme/produtos"), 1);
    }

    #[tokio::test]
    async fn test_cached_fetches_skip_the_store() {
        let (assembler, store) = assembler(acme_store().await);

        assembler.fetch("acme").await.unwrap();
        assembler.fetch("acme").await.unwrap();

        assert_eq!(store.calls("configuracoes/acme"), 1);
        assert_eq!(store.calls("configuracoes/acme/produtos"), 1);
        assert!(assembler.cache().get("contato", "acme").is_some());
    }

    #[tokio::test]
    async fn test_clearing_a_section_refetches_only_that_section() {
        let (assembler, store) = assembler(acme_store().await);
        assembler.fetch("acme").await.unwrap();

        store.inner.insert("configuracoes/acme/produtos", "p1", record(json!({"nome": "Tela"}))).await;
        assert_eq!(assembler.cache().clear_section(PRODUCTS_SECTION), 1);

        let config = assembler.fetch("acme").await.unwrap();

        assert_eq!(config.products.map(|p| p.len()), Some(1));
        assert_eq!(store.calls("configuracoes/acme/produtos"), 2);
        assert_eq!(store.calls("configuracoes/acme"), 1);
        assert_eq!(store.calls("configuracoes/acme/contato/data"), 1);
    }

    #[tokio::test]
    async fn test_custom_root_collection() {
        let store = ScriptedStore::default();
        store.inner.insert("sites", "acme", record(json!({"companyName": "Acme"}))).await;
        store.inner.insert("sites/acme/cores", "data", record(json!({"primary": "#123456"}))).await;
        let (assembler, _) = assembler(store);
        let assembler = assembler.with_root_collection("sites");

        let config = assembler.fetch("acme").await.unwrap();

        assert_eq!(config.company_name.as_deref(), Some("Acme"));
        assert_eq!(config.colors.unwrap().get("primary").map(String::as_str), Some("#123456"));
    }
}

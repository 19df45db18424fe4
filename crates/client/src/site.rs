//! The public site: load, apply and render one tenant's page.

use std::sync::Arc;

use serde::Serialize;
use sitecfg_core::{Error, LoadCoordinator, SiteConfiguration};
use tokio::sync::Mutex;

use crate::apply::{ApplyReport, ConfigApplier};
use crate::assemble::ConfigAssembler;
use crate::render::HtmlRenderer;

/// A rendered page and how it was produced.
#[derive(Debug, Clone, Serialize)]
pub struct RenderedPage {
    pub html: String,
    pub report: ApplyReport,
    /// Why the fallback page was served, if it was.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
}

impl RenderedPage {
    pub fn is_fallback(&self) -> bool {
        self.fallback_reason.is_some()
    }
}

struct PageState {
    applier: ConfigApplier<HtmlRenderer>,
    fallback: bool,
}

impl PageState {
    fn fresh(fallback: bool) -> Self {
        Self { applier: ConfigApplier::new(HtmlRenderer::new()), fallback }
    }
}

/// Ties the coordinator, assembler and applier together for one tenant.
pub struct PublicSite {
    tenant_id: String,
    assembler: Arc<ConfigAssembler>,
    coordinator: LoadCoordinator<SiteConfiguration>,
    page: Mutex<PageState>,
}

impl PublicSite {
    pub fn new(tenant_id: impl Into<String>, assembler: Arc<ConfigAssembler>) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            assembler,
            coordinator: LoadCoordinator::new(),
            page: Mutex::new(PageState::fresh(false)),
        }
    }

    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    pub fn assembler(&self) -> &ConfigAssembler {
        &self.assembler
    }

    pub fn coordinator(&self) -> &LoadCoordinator<SiteConfiguration> {
        &self.coordinator
    }

    /// Load the tenant's configuration, joining any load already in flight.
    pub async fn load(&self) -> Result<SiteConfiguration, Error> {
        let assembler = self.assembler.clone();
        let tenant_id = self.tenant_id.clone();
        self.coordinator.start_loading(move || async move { assembler.fetch(&tenant_id).await }).await
    }

    /// Load, apply and render the page.
    ///
    /// A failed load is not an error here: the fallback configuration is
    /// rendered instead. Switching between the fallback and a loaded
    /// configuration starts from a blank page, so neither leaks sections into
    /// the other. Only template failures are returned.
    pub async fn render(&self) -> Result<RenderedPage, Error> {
        let loaded = self.load().await;

        let mut page = self.page.lock().await;
        let (config, fallback_reason) = match loaded {
            Ok(config) => (config, None),
            Err(e) => {
                tracing::warn!(tenant = %self.tenant_id, error = %e, "serving fallback page");
                (SiteConfiguration::fallback(), Some(e.to_string()))
            }
        };
        if page.fallback != fallback_reason.is_some() {
            *page = PageState::fresh(fallback_reason.is_some());
        }

        let report = page.applier.apply(config);
        let html = page.applier.renderer().render_html()?;

        Ok(RenderedPage { html, report, fallback_reason })
    }

    /// Drop the loaded configuration and render again.
    ///
    /// Cached fetches are kept; clear cache sections first to force store reads.
    pub async fn reload(&self) -> Result<RenderedPage, Error> {
        self.coordinator.reset();
        self.render().await
    }

    /// The configuration currently applied to the page.
    pub async fn applied(&self) -> Option<SiteConfiguration> {
        self.page.lock().await.applier.current().cloned()
    }
}

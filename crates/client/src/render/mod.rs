//! Public page rendering.
//!
//! [`HtmlRenderer`] is the page-side [`Renderer`]: section patches update a
//! [`PageModel`], and [`HtmlRenderer::render_html`] turns the model into the
//! public marketing page through the `site.html` template.

use std::collections::BTreeMap;

use askama::Template;
use chrono::Datelike;
use sitecfg_core::Error;
use sitecfg_core::model::{About, Banner, Contact, GlobalSettings, Logo, LogoKind, Modules, Product, SiteModule, SocialLink};

use crate::apply::{Renderer, SectionPatch, validate};

/// Current state of every page section.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageModel {
    pub company_name: Option<String>,
    pub logo: Option<Logo>,
    pub favicon: Option<String>,
    pub banner: Banner,
    pub colors: BTreeMap<String, String>,
    pub contact: Contact,
    pub modules: Modules,
    pub about: About,
    pub products: Vec<Product>,
    pub social_links: Vec<SocialLink>,
    pub global_settings: GlobalSettings,
}

/// Renderer backed by an in-memory [`PageModel`].
#[derive(Debug, Clone, Default)]
pub struct HtmlRenderer {
    page: PageModel,
    writes: u64,
}

impl HtmlRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(&self) -> &PageModel {
        &self.page
    }

    /// Number of section writes received so far.
    pub fn writes(&self) -> u64 {
        self.writes
    }

    /// Render the page as it currently stands.
    pub fn render_html(&self) -> Result<String, Error> {
        SitePage::from_model(&self.page).render().map_err(|e| Error::Render(e.to_string()))
    }
}

impl Renderer for HtmlRenderer {
    fn write(&mut self, patch: SectionPatch<'_>) -> Result<(), Error> {
        tracing::debug!(section = %patch.section(), "writing section");
        let page = &mut self.page;
        match patch {
            SectionPatch::Branding { company_name, logo, favicon } => {
                if let Some(name) = company_name {
                    page.company_name = Some(name.to_string());
                }
                if let Some(logo) = logo {
                    page.logo = Some(logo.clone());
                }
                if let Some(favicon) = favicon {
                    page.favicon = Some(favicon.to_string());
                }
            }
            SectionPatch::Banner(banner) => page.banner = banner.clone(),
            SectionPatch::Colors(colors) => page.colors = colors.clone(),
            SectionPatch::Contact(contact) => page.contact = contact.clone(),
            SectionPatch::Modules(modules) => page.modules = modules.clone(),
            SectionPatch::About(about) => page.about = about.clone(),
            SectionPatch::Products(products) => page.products = products.to_vec(),
            SectionPatch::SocialLinks(links) => page.social_links = links.to_vec(),
            SectionPatch::GlobalSettings(settings) => page.global_settings = settings.clone(),
        }
        self.writes += 1;
        Ok(())
    }
}

struct ColorVar<'a> {
    name: &'a str,
    value: &'a str,
}

/// Loop items use empty strings for absent values.
struct ProductCard<'a> {
    name: &'a str,
    price: &'a str,
    description: &'a str,
    image_url: &'a str,
    focus_point: &'a str,
}

struct LinkItem<'a> {
    name: &'a str,
    url: &'a str,
    icon: &'a str,
}

#[derive(Template)]
#[template(path = "site.html")]
struct SitePage<'a> {
    company_name: &'a str,
    logo_text: Option<&'a str>,
    logo_image: Option<&'a str>,
    favicon: Option<&'a str>,
    font_url: Option<&'a str>,
    font_family: Option<&'a str>,
    tracking_script: Option<&'a str>,
    colors: Vec<ColorVar<'a>>,
    banner_title: Option<&'a str>,
    banner_subtitle: Option<&'a str>,
    banner_image: Option<&'a str>,
    show_about: bool,
    about_text: Option<&'a str>,
    about_image: Option<&'a str>,
    show_products: bool,
    products: Vec<ProductCard<'a>>,
    show_contact: bool,
    phone: Option<&'a str>,
    secondary_phone: Option<&'a str>,
    email: Option<&'a str>,
    address: Option<&'a str>,
    social_links: Vec<LinkItem<'a>>,
    year: i32,
}

impl<'a> SitePage<'a> {
    fn from_model(page: &'a PageModel) -> Self {
        let company_name = page.company_name.as_deref().unwrap_or_default();
        let (logo_text, logo_image) = match &page.logo {
            Some(Logo { kind: LogoKind::Image, value }) => (None, Some(value.as_str())),
            Some(Logo { kind: LogoKind::Text, value }) => (Some(value.as_str()), None),
            None => (Some(company_name), None),
        };

        Self {
            company_name,
            logo_text,
            logo_image,
            favicon: page.favicon.as_deref(),
            font_url: page.global_settings.font_url.as_deref(),
            font_family: page.global_settings.font_family.as_deref(),
            tracking_script: page.global_settings.tracking_script.as_deref(),
            colors: page.colors.iter().map(|(name, value)| ColorVar { name, value: value.trim() }).collect(),
            banner_title: page.banner.title.as_deref(),
            banner_subtitle: page.banner.subtitle.as_deref(),
            banner_image: page.banner.background_image.as_deref(),
            show_about: page.modules.is_enabled(SiteModule::About),
            about_text: page.about.text.as_deref(),
            about_image: page.about.image_url.as_deref(),
            show_products: page.modules.is_enabled(SiteModule::Products) && !page.products.is_empty(),
            products: page
                .products
                .iter()
                .map(|p| ProductCard {
                    name: p.name.as_deref().unwrap_or_default(),
                    price: p.price.as_deref().unwrap_or_default(),
                    description: p.description.as_deref().unwrap_or_default(),
                    image_url: p.image_url.as_deref().unwrap_or_default(),
                    focus_point: focus_point(p),
                })
                .collect(),
            show_contact: page.modules.is_enabled(SiteModule::Contact),
            phone: page.contact.phone.as_deref(),
            secondary_phone: page.contact.secondary_phone.as_deref(),
            email: page.contact.email.as_deref(),
            address: page.contact.address.as_deref(),
            social_links: page
                .social_links
                .iter()
                .map(|l| LinkItem { name: &l.name, url: &l.url, icon: l.icon.as_deref().unwrap_or_default() })
                .collect(),
            year: chrono::Utc::now().year(),
        }
    }
}

/// Focus points that are not plain positions are dropped in favor of `center`.
fn focus_point(product: &Product) -> &str {
    match product.focus_point.as_deref() {
        Some(value) if validate::is_safe_focus_point(value) => value.trim(),
        Some(value) => {
            tracing::warn!(product = %product.id, focus_point = value, "ignoring unsafe focus point");
            "center"
        }
        None => "center",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apply::ConfigApplier;
    use serde_json::json;
    use sitecfg_core::SiteConfiguration;

    fn rendered(config: serde_json::Value) -> String {
        let mut applier = ConfigApplier::new(HtmlRenderer::new());
        applier.apply(serde_json::from_value::<SiteConfiguration>(config).unwrap());
        applier.renderer().render_html().unwrap()
    }

    #[test]
    fn test_branding_patch_keeps_absent_fields() {
        let mut renderer = HtmlRenderer::new();
        renderer
            .write(SectionPatch::Branding { company_name: Some("Acme"), logo: None, favicon: Some("/f.ico") })
            .unwrap();
        renderer.write(SectionPatch::Branding { company_name: None, logo: None, favicon: None }).unwrap();

        assert_eq!(renderer.page().company_name.as_deref(), Some("Acme"));
        assert_eq!(renderer.page().favicon.as_deref(), Some("/f.ico"));
        assert_eq!(renderer.writes(), 2);
    }

    #[test]
    fn test_renders_configured_sections() {
        let html = rendered(json!({
            "companyName": "Acme",
            "banner": {"title": "Telas sob medida"},
            "colors": {"primary": "#0a84ff"},
            "contact": {"phone": "11 9999-9999"},
            "products": [{"id": "p1", "name": "Tela Mosquiteira", "price": "R$ 120"}]
        }));

        assert!(html.contains("Telas sob medida"));
        assert!(html.contains("--color-primary: #0a84ff"));
        assert!(html.contains("Tela Mosquiteira"));
        assert!(html.contains("11 9999-9999"));
    }

    #[test]
    fn test_disabled_module_is_hidden() {
        let html = rendered(json!({
            "companyName": "Acme",
            "about": {"text": "Desde 1990"},
            "modules": {"about": false}
        }));

        assert!(!html.contains("Desde 1990"));
    }

    #[test]
    fn test_text_is_escaped() {
        let html = rendered(json!({"companyName": "<b>Acme</b>"}));
        assert!(!html.contains("<b>Acme</b>"));
        assert!(html.contains("Acme"));
    }

    #[test]
    fn test_unsafe_focus_point_is_centered() {
        let html = rendered(json!({
            "products": [
                {"id": "p1", "name": "Tela", "imageUrl": "/a.png", "focusPoint": "50% 30%"},
                {"id": "p2", "name": "Rede", "imageUrl": "/b.png", "focusPoint": "0;background:red"}
            ]
        }));

        assert!(html.contains("object-position: 50% 30%"));
        assert!(html.contains("object-position: center"));
        assert!(!html.contains("background:red"));
    }

    #[test]
    fn test_unsafe_font_family_is_not_rendered() {
        let html = rendered(json!({
            "companyName": "Acme",
            "globalSettings": {"fontFamily": "x; } body { display: none"}
        }));

        assert!(!html.contains("display: none"));
        assert!(html.contains("Acme"));
    }

    #[test]
    fn test_fallback_page() {
        let mut applier = ConfigApplier::new(HtmlRenderer::new());
        applier.apply(SiteConfiguration::fallback());
        let html = applier.renderer().render_html().unwrap();

        assert!(html.contains("Bem-vindo ao GSM"));
        assert!(html.contains("Telefone não configurado"));
    }
}

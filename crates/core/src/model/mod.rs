//! Typed site configuration.
//!
//! A [`SiteConfiguration`] is the merge of a tenant's parent document, its
//! per-section subdocuments and its product list. Every field is optional:
//! an absent field means "no override" and the rendering layer decides the
//! default. Section records accept both the stored Portuguese field names and
//! their camelCase English spelling.

mod de;
mod product;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use product::{Product, sort_products};

/// Placeholder shown instead of missing contact details on the fallback page.
pub const NOT_CONFIGURED: &str = "não configurado";

/// One tenant's assembled site configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteConfiguration {
    #[serde(default, alias = "empresaNome", skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<Logo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favicon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner: Option<Banner>,
    #[serde(default, alias = "cores", skip_serializing_if = "Option::is_none")]
    pub colors: Option<BTreeMap<String, String>>,
    #[serde(default, alias = "sobre", skip_serializing_if = "Option::is_none")]
    pub about: Option<About>,
    #[serde(default, alias = "contato", skip_serializing_if = "Option::is_none")]
    pub contact: Option<Contact>,
    #[serde(default, alias = "modulos", skip_serializing_if = "Option::is_none")]
    pub modules: Option<Modules>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_settings: Option<GlobalSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub social_links: Option<Vec<SocialLink>>,
    #[serde(default, alias = "produtos", skip_serializing_if = "Option::is_none")]
    pub products: Option<Vec<Product>>,
}

impl SiteConfiguration {
    /// Deterministic content used when the tenant's configuration cannot be
    /// loaded at all.
    pub fn fallback() -> Self {
        let placeholder = |label: &str| format!("{label} {NOT_CONFIGURED}");
        Self {
            company_name: Some("GSM".into()),
            logo: Some(Logo { kind: LogoKind::Text, value: "GSM".into() }),
            banner: Some(Banner {
                title: Some("Bem-vindo ao GSM".into()),
                subtitle: Some("Site em configuração".into()),
                background_image: None,
            }),
            contact: Some(Contact {
                phone: Some(placeholder("Telefone")),
                email: Some(placeholder("E-mail")),
                address: Some(placeholder("Endereço")),
                show_map: Some(false),
                ..Default::default()
            }),
            about: Some(About { text: Some(placeholder("Conteúdo")), image_url: None }),
            ..Default::default()
        }
    }
}

/// How the site logo is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogoKind {
    #[serde(alias = "texto")]
    Text,
    #[serde(alias = "imagem")]
    Image,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Logo {
    #[serde(rename = "type", alias = "tipo")]
    pub kind: LogoKind,
    #[serde(alias = "valor")]
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Banner {
    #[serde(default, alias = "titulo")]
    pub title: Option<String>,
    #[serde(default, alias = "subtitulo")]
    pub subtitle: Option<String>,
    #[serde(default, alias = "imagemFundo")]
    pub background_image: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct About {
    #[serde(default, alias = "texto")]
    pub text: Option<String>,
    #[serde(default, alias = "imagem", alias = "imagemUrl")]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    #[serde(default, alias = "telefone", deserialize_with = "de::opt_text")]
    pub phone: Option<String>,
    #[serde(default, alias = "telefone2", alias = "telefoneSecundario", deserialize_with = "de::opt_text")]
    pub secondary_phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, alias = "endereco")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "de::opt_f64")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "de::opt_f64")]
    pub longitude: Option<f64>,
    #[serde(default, alias = "mostrarMapa")]
    pub show_map: Option<bool>,
}

impl Contact {
    /// Coordinates, when both are present.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        Some((self.latitude?, self.longitude?))
    }
}

/// Toggleable page sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SiteModule {
    About,
    Products,
    Contact,
}

impl SiteModule {
    pub const ALL: [SiteModule; 3] = [SiteModule::About, SiteModule::Products, SiteModule::Contact];

    pub fn key(self) -> &'static str {
        match self {
            SiteModule::About => "about",
            SiteModule::Products => "products",
            SiteModule::Contact => "contact",
        }
    }

    /// Name used by records written before the English keys existed.
    pub fn stored_key(self) -> &'static str {
        match self {
            SiteModule::About => "sobre",
            SiteModule::Products => "produtos",
            SiteModule::Contact => "contato",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.key() == key || m.stored_key() == key)
    }
}

/// Section name → enabled flag. Missing entries count as enabled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Modules(pub BTreeMap<String, bool>);

impl Modules {
    /// Build from a stored record, normalizing legacy section names and
    /// dropping non-boolean values.
    pub fn from_record(record: &crate::Record) -> Self {
        let mut modules = BTreeMap::new();
        for (key, value) in record {
            let Some(enabled) = value.as_bool() else {
                tracing::warn!(module = %key, "ignoring non-boolean module flag");
                continue;
            };
            let key = SiteModule::from_key(key).map(|m| m.key().to_string()).unwrap_or_else(|| key.clone());
            modules.insert(key, enabled);
        }
        Self(modules)
    }

    pub fn is_enabled(&self, module: SiteModule) -> bool {
        self.0.get(module.key()).copied().unwrap_or(true)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalSettings {
    #[serde(default)]
    pub font_url: Option<String>,
    #[serde(default)]
    pub font_family: Option<String>,
    /// Opaque analytics snippet, injected verbatim.
    #[serde(default)]
    pub tracking_script: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialLink {
    #[serde(alias = "nome")]
    pub name: String,
    pub url: String,
    #[serde(default, alias = "icone")]
    pub icon: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_contact_accepts_stored_names() {
        let contact: Contact = serde_json::from_value(json!({
            "telefone": "11999999999",
            "telefone2": 1133334444u64,
            "endereco": "Rua A, 1",
            "latitude": "-23.55",
            "longitude": -46.63,
            "mostrarMapa": true
        }))
        .unwrap();

        assert_eq!(contact.phone.as_deref(), Some("11999999999"));
        assert_eq!(contact.secondary_phone.as_deref(), Some("1133334444"));
        assert_eq!(contact.address.as_deref(), Some("Rua A, 1"));
        assert_eq!(contact.coordinates(), Some((-23.55, -46.63)));
        assert_eq!(contact.show_map, Some(true));
    }

    #[test]
    fn test_contact_rejects_garbage_coordinates() {
        let result = serde_json::from_value::<Contact>(json!({"latitude": "north"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_logo_kinds() {
        let logo: Logo = serde_json::from_value(json!({"tipo": "imagem", "valor": "https://cdn/logo.png"})).unwrap();
        assert_eq!(logo.kind, LogoKind::Image);

        let logo: Logo = serde_json::from_value(json!({"type": "text", "value": "Acme"})).unwrap();
        assert_eq!(logo.kind, LogoKind::Text);
        assert_eq!(serde_json::to_value(&logo).unwrap(), json!({"type": "text", "value": "Acme"}));
    }

    #[test]
    fn test_modules_default_enabled() {
        let modules = Modules::default();
        assert!(SiteModule::ALL.iter().all(|m| modules.is_enabled(*m)));
    }

    #[test]
    fn test_modules_from_record_normalizes_keys() {
        let record = json!({"produtos": false, "about": true, "contato": "yes"});
        let modules = Modules::from_record(record.as_object().unwrap());

        assert!(!modules.is_enabled(SiteModule::Products));
        assert!(modules.is_enabled(SiteModule::About));
        assert!(modules.is_enabled(SiteModule::Contact));
        assert!(modules.0.contains_key("products"));
        assert!(!modules.0.contains_key("contact"));
    }

    #[test]
    fn test_fallback_is_not_empty() {
        let config = SiteConfiguration::fallback();
        assert_eq!(config.banner.and_then(|b| b.title).as_deref(), Some("Bem-vindo ao GSM"));

        let contact = config.contact.unwrap();
        assert!(contact.phone.unwrap().contains(NOT_CONFIGURED));
        assert!(contact.email.unwrap().contains(NOT_CONFIGURED));
    }

    #[test]
    fn test_absent_sections_are_not_serialized() {
        let config = SiteConfiguration { company_name: Some("Acme".into()), ..Default::default() };
        assert_eq!(serde_json::to_value(&config).unwrap(), json!({"companyName": "Acme"}));
    }
}

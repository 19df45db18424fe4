//! Folding stored records into a [`SiteConfiguration`].
//!
//! Decoding is lenient: a field or subsection that does not match its typed
//! form is logged and left undefined instead of failing the whole assembly.

use serde::de::DeserializeOwned;
use serde_json::Value;
use sitecfg_core::model::{Modules, Product, sort_products};
use sitecfg_core::{Record, SiteConfiguration, StoredDocument};

/// Single-document subcollections under a tenant's parent document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subsection {
    Colors,
    Contact,
    Modules,
    About,
}

impl Subsection {
    pub const ALL: [Subsection; 4] = [Subsection::Colors, Subsection::Contact, Subsection::Modules, Subsection::About];

    /// Stored collection name, also used as the cache section.
    pub fn collection(self) -> &'static str {
        match self {
            Subsection::Colors => "cores",
            Subsection::Contact => "contato",
            Subsection::Modules => "modulos",
            Subsection::About => "sobre",
        }
    }
}

fn decode<T: DeserializeOwned>(value: &Value, field: &str) -> Option<T> {
    if value.is_null() {
        return None;
    }
    match T::deserialize(value) {
        Ok(decoded) => Some(decoded),
        Err(e) => {
            tracing::warn!(field, error = %e, "ignoring malformed field");
            None
        }
    }
}

/// First present spelling of a field.
fn field<T: DeserializeOwned>(record: &Record, names: &[&str]) -> Option<T> {
    let (name, value) = names.iter().find_map(|name| record.get(*name).map(|value| (*name, value)))?;
    decode(value, name)
}

/// Top-level fields of the parent document.
pub fn from_parent(record: &Record) -> SiteConfiguration {
    SiteConfiguration {
        company_name: field(record, &["empresaNome", "companyName"]),
        logo: field(record, &["logo"]),
        favicon: field(record, &["favicon"]),
        banner: field(record, &["banner"]),
        colors: field(record, &["cores", "colors"]),
        about: field(record, &["sobre", "about"]),
        contact: field(record, &["contato", "contact"]),
        modules: field::<Record>(record, &["modulos", "modules"]).map(|m| Modules::from_record(&m)),
        global_settings: field(record, &["globalSettings", "configuracoesGlobais"]),
        social_links: field(record, &["socialLinks", "redesSociais"]),
        products: None,
    }
}

/// Overlay a subsection's `data` record onto the configuration.
///
/// A record that cannot be decoded leaves the field as the parent set it.
pub fn apply_subsection(config: &mut SiteConfiguration, subsection: Subsection, record: Record) {
    let name = subsection.collection();
    if subsection == Subsection::Modules {
        config.modules = Some(Modules::from_record(&record));
        return;
    }

    let value = Value::Object(record);
    match subsection {
        Subsection::Colors => {
            if let Some(colors) = decode(&value, name) {
                config.colors = Some(colors);
            }
        }
        Subsection::Contact => {
            if let Some(contact) = decode(&value, name) {
                config.contact = Some(contact);
            }
        }
        Subsection::Modules => {}
        Subsection::About => {
            if let Some(about) = decode(&value, name) {
                config.about = Some(about);
            }
        }
    }
}

/// Decode the product list, dropping entries that do not decode, in display order.
pub fn products(documents: Vec<StoredDocument>) -> Vec<Product> {
    let mut products: Vec<Product> = documents
        .into_iter()
        .filter_map(|doc| {
            Product::try_from(doc)
                .inspect_err(|e| tracing::warn!(error = %e, "dropping malformed product"))
                .ok()
        })
        .collect();
    sort_products(&mut products);
    products
}

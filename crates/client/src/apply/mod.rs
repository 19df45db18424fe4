//! Idempotent application of a configuration to a [`Renderer`].
//!
//! The applier remembers the canonical content hash of the last configuration
//! it applied. Re-applying an equal configuration, even one whose maps were
//! built in a different key order, performs no writes. Otherwise every
//! section is validated and written on its own, so one bad section never
//! blocks the others.

pub mod validate;

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use sitecfg_core::model::{About, Banner, Contact, GlobalSettings, Logo, Modules, Product, SocialLink};
use sitecfg_core::{Error, SiteConfiguration, content_hash};

/// Independently applied parts of the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Branding,
    Banner,
    Colors,
    Contact,
    Modules,
    About,
    Products,
    SocialLinks,
    GlobalSettings,
}

impl Section {
    pub const ALL: [Section; 9] = [
        Section::Branding,
        Section::Banner,
        Section::Colors,
        Section::Contact,
        Section::Modules,
        Section::About,
        Section::Products,
        Section::SocialLinks,
        Section::GlobalSettings,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Section::Branding => "branding",
            Section::Banner => "banner",
            Section::Colors => "colors",
            Section::Contact => "contact",
            Section::Modules => "modules",
            Section::About => "about",
            Section::Products => "products",
            Section::SocialLinks => "social_links",
            Section::GlobalSettings => "global_settings",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A typed write of one section.
#[derive(Debug, Clone, Copy)]
pub enum SectionPatch<'a> {
    Branding { company_name: Option<&'a str>, logo: Option<&'a Logo>, favicon: Option<&'a str> },
    Banner(&'a Banner),
    Colors(&'a BTreeMap<String, String>),
    Contact(&'a Contact),
    /// Full visibility map; absent entries are enabled.
    Modules(&'a Modules),
    About(&'a About),
    Products(&'a [Product]),
    SocialLinks(&'a [SocialLink]),
    GlobalSettings(&'a GlobalSettings),
}

impl SectionPatch<'_> {
    pub fn section(&self) -> Section {
        match self {
            SectionPatch::Branding { .. } => Section::Branding,
            SectionPatch::Banner(_) => Section::Banner,
            SectionPatch::Colors(_) => Section::Colors,
            SectionPatch::Contact(_) => Section::Contact,
            SectionPatch::Modules(_) => Section::Modules,
            SectionPatch::About(_) => Section::About,
            SectionPatch::Products(_) => Section::Products,
            SectionPatch::SocialLinks(_) => Section::SocialLinks,
            SectionPatch::GlobalSettings(_) => Section::GlobalSettings,
        }
    }
}

/// Target of configuration writes.
pub trait Renderer {
    fn write(&mut self, patch: SectionPatch<'_>) -> Result<(), Error>;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionFailure {
    pub section: Section,
    pub reason: String,
}

/// Outcome of one [`ConfigApplier::apply`] call.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ApplyReport {
    /// Content matched the last applied configuration; nothing was written.
    pub skipped: bool,
    pub hash: Option<String>,
    pub applied: Vec<Section>,
    pub failed: Vec<SectionFailure>,
}

impl ApplyReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Applies configurations to a renderer, skipping repeats.
#[derive(Debug)]
pub struct ConfigApplier<R> {
    renderer: R,
    last_hash: Option<String>,
    current: Option<SiteConfiguration>,
}

impl<R: Renderer> ConfigApplier<R> {
    pub fn new(renderer: R) -> Self {
        Self { renderer, last_hash: None, current: None }
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Hash of the last applied configuration.
    pub fn last_hash(&self) -> Option<&str> {
        self.last_hash.as_deref()
    }

    /// The configuration most recently applied.
    pub fn current(&self) -> Option<&SiteConfiguration> {
        self.current.as_ref()
    }

    /// Apply `config` unless it equals the last applied configuration.
    ///
    /// A configuration that cannot be hashed is always applied. The new hash
    /// is recorded even when some sections failed.
    pub fn apply(&mut self, config: SiteConfiguration) -> ApplyReport {
        let hash = match content_hash(&config) {
            Ok(hash) => Some(hash),
            Err(e) => {
                tracing::warn!(error = %e, "cannot hash configuration, applying unconditionally");
                None
            }
        };

        if hash.is_some() && hash == self.last_hash {
            tracing::debug!(hash = hash.as_deref(), "configuration unchanged, skipping apply");
            return ApplyReport { skipped: true, hash, ..Default::default() };
        }

        let mut report = ApplyReport { hash: hash.clone(), ..Default::default() };
        for section in Section::ALL {
            match self.apply_section(&config, section) {
                Ok(true) => report.applied.push(section),
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!(section = %section, error = %e, "section apply failed");
                    report.failed.push(SectionFailure { section, reason: e.to_string() });
                }
            }
        }

        tracing::info!(applied = report.applied.len(), failed = report.failed.len(), "applied configuration");
        self.last_hash = hash;
        self.current = Some(config);
        report
    }

    /// Forget the last applied hash so the next apply always writes.
    pub fn invalidate(&mut self) {
        self.last_hash = None;
    }

    /// Returns whether anything was written.
    fn apply_section(&mut self, config: &SiteConfiguration, section: Section) -> Result<bool, Error> {
        let default_modules = Modules::default();
        let patch = match section {
            Section::Branding => {
                if config.company_name.is_none() && config.logo.is_none() && config.favicon.is_none() {
                    return Ok(false);
                }
                SectionPatch::Branding {
                    company_name: config.company_name.as_deref(),
                    logo: config.logo.as_ref(),
                    favicon: config.favicon.as_deref(),
                }
            }
            Section::Banner => match &config.banner {
                Some(banner) => SectionPatch::Banner(banner),
                None => return Ok(false),
            },
            Section::Colors => match &config.colors {
                Some(colors) => {
                    validate::validate_colors(colors)?;
                    SectionPatch::Colors(colors)
                }
                None => return Ok(false),
            },
            Section::Contact => match &config.contact {
                Some(contact) => {
                    validate::validate_contact(contact)?;
                    SectionPatch::Contact(contact)
                }
                None => return Ok(false),
            },
            // visibility always resets to the defaults when no toggles are stored
            Section::Modules => SectionPatch::Modules(config.modules.as_ref().unwrap_or(&default_modules)),
            Section::About => match &config.about {
                Some(about) => SectionPatch::About(about),
                None => return Ok(false),
            },
            Section::Products => match &config.products {
                Some(products) => SectionPatch::Products(products),
                None => return Ok(false),
            },
            Section::SocialLinks => match &config.social_links {
                Some(links) => SectionPatch::SocialLinks(links),
                None => return Ok(false),
            },
            Section::GlobalSettings => match &config.global_settings {
                Some(settings) => {
                    if let Some(font_family) = &settings.font_family {
                        validate::validate_font_family(font_family)?;
                    }
                    SectionPatch::GlobalSettings(settings)
                }
                None => return Ok(false),
            },
        };

        self.renderer.write(patch)?;
        Ok(true)
    }
}

//! Client side of sitecfg.
//!
//! This crate provides the remote store adapters, the concurrent config
//! assembler, the idempotent config applier and the public page renderer
//! shared by the server.

pub mod apply;
pub mod assemble;
pub mod render;
pub mod site;
pub mod store;

pub use apply::{ApplyReport, ConfigApplier, Renderer, Section, SectionPatch};
pub use assemble::{CACHE_SECTIONS, CachedFetch, ConfigAssembler, FetchPolicy};
pub use render::{HtmlRenderer, PageModel};
pub use site::{PublicSite, RenderedPage};
pub use store::{FirestoreConfig, FirestoreStore, MemoryStore};

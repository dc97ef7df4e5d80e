//! Document-level metadata: title, description, canonical link, Open Graph
//! and Twitter tags, structured data.
//!
//! Every page starts from the site defaults in a [`DocumentMeta`]. A page
//! mounts its own [`SeoHead`] onto it and renders while the returned
//! [`MountedSeo`] is alive; dropping it puts the defaults back so nothing
//! page-specific leaks into whatever is rendered next with the same
//! metadata.

pub mod json_ld;

use crate::config::SiteSettings;
use serde_json::Value;
use std::ops::Deref;

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentMeta {
    defaults: Defaults,
    pub title: String,
    pub description: String,
    pub canonical: String,
    pub og_type: &'static str,
    pub image: String,
    pub robots: &'static str,
    pub site_name: String,
    pub locale: String,
    /// Serialized JSON-LD blocks, safe to embed in a `<script>` element.
    pub json_ld: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
struct Defaults {
    title: String,
    description: String,
    image: String,
    base_url: String,
}

const INDEX: &str = "index, follow";
const NOINDEX: &str = "noindex, nofollow";

impl DocumentMeta {
    pub fn new(site: &SiteSettings) -> Self {
        let base_url = site.base_url.trim_end_matches('/').to_string();
        let defaults = Defaults {
            title: site.default_title.clone(),
            description: site.default_description.clone(),
            image: absolute(&base_url, &site.default_image),
            base_url,
        };

        let mut meta = Self {
            title: String::new(),
            description: String::new(),
            canonical: String::new(),
            og_type: "website",
            image: String::new(),
            robots: INDEX,
            site_name: site.name.clone(),
            locale: site.locale.clone(),
            json_ld: Vec::new(),
            defaults,
        };
        meta.restore_defaults();
        meta
    }

    pub fn default_title(&self) -> &str {
        &self.defaults.title
    }

    pub fn is_default(&self) -> bool {
        self.title == self.defaults.title && self.json_ld.is_empty()
    }

    fn restore_defaults(&mut self) {
        self.title = self.defaults.title.clone();
        self.description = self.defaults.description.clone();
        self.canonical = format!("{}/", self.defaults.base_url);
        self.og_type = "website";
        self.image = self.defaults.image.clone();
        self.robots = INDEX;
        self.json_ld.clear();
    }
}

fn absolute(base_url: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        path.to_string()
    } else if path.starts_with('/') {
        format!("{}{}", base_url, path)
    } else {
        format!("{}/{}", base_url, path)
    }
}

/// Metadata one page wants applied while it renders.
#[derive(Debug, Clone, Default)]
pub struct SeoHead {
    path: String,
    title: Option<String>,
    description: Option<String>,
    og_type: Option<&'static str>,
    image: Option<String>,
    noindex: bool,
    json_ld: Vec<Value>,
}

impl SeoHead {
    /// `path` is the page's canonical path, e.g. `/faq`.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn og_type(mut self, og_type: &'static str) -> Self {
        self.og_type = Some(og_type);
        self
    }

    pub fn image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Keep the page out of search results (login, student area, 404).
    pub fn noindex(mut self) -> Self {
        self.noindex = true;
        self
    }

    pub fn json_ld(mut self, block: Value) -> Self {
        self.json_ld.push(block);
        self
    }

    /// Apply to `meta` until the returned guard is dropped.
    pub fn mount(self, meta: &mut DocumentMeta) -> MountedSeo<'_> {
        if let Some(title) = &self.title {
            meta.title = format!("{} | {}", title, meta.site_name);
        }
        if let Some(description) = self.description {
            meta.description = description;
        }
        meta.canonical = absolute(&meta.defaults.base_url, &self.path);
        if let Some(og_type) = self.og_type {
            meta.og_type = og_type;
        }
        if let Some(image) = self.image {
            meta.image = absolute(&meta.defaults.base_url, &image);
        }
        if self.noindex {
            meta.robots = NOINDEX;
        }
        meta.json_ld = self.json_ld.iter().map(json_ld::to_script).collect();

        MountedSeo { meta }
    }
}

/// Page metadata in effect. Restores the defaults when dropped.
pub struct MountedSeo<'a> {
    meta: &'a mut DocumentMeta,
}

impl Deref for MountedSeo<'_> {
    type Target = DocumentMeta;

    fn deref(&self) -> &DocumentMeta {
        self.meta
    }
}

impl Drop for MountedSeo<'_> {
    fn drop(&mut self) {
        self.meta.restore_defaults();
    }
}

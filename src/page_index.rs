use std::collections::HashMap;
use std::fs;
use std::path::Path;

use spdlog::info;

use crate::config::Config;
use crate::content::markdown::{MarkdownRenderer, RendererTransform};
use crate::content::{ContentKey, Page};
use crate::error::LoadError;

/// Page lookups. Simpler than the post index: a page's id is its slug, and
/// there is no date ordering. The per-locale "404" page is the conventional
/// not-found page and its absence is a startup error.
#[derive(Debug)]
pub struct PageIndex {
    pages: HashMap<ContentKey, Page>,
    locales_by_id: HashMap<String, Vec<String>>,
}

impl PageIndex {
    pub fn build(records: Vec<Page>, config: &Config) -> Result<PageIndex, LoadError> {
        let mut index = PageIndex {
            pages: HashMap::new(),
            locales_by_id: HashMap::new(),
        };

        for page in records {
            if !config.locale_known(&page.key.locale) {
                return Err(LoadError::UnknownLocale {
                    locale: page.key.locale.clone(),
                    path: page.source.clone(),
                });
            }
            if index.pages.contains_key(&page.key) {
                return Err(LoadError::DuplicateIdentity {
                    id: page.key.id.clone(),
                    locale: page.key.locale.clone(),
                    path: page.source.clone(),
                });
            }

            index
                .locales_by_id
                .entry(page.key.id.clone())
                .or_default()
                .push(page.key.locale.clone());
            index.pages.insert(page.key.clone(), page);
        }

        for locale in config.locales.keys() {
            if !index.pages.contains_key(&ContentKey::new("404", locale)) {
                return Err(LoadError::MissingNotFoundPage {
                    locale: locale.clone(),
                });
            }
        }

        Ok(index)
    }

    /// Explicit full re-render pass, mirroring the HTML to
    /// <cache_dir>/pages/<id>.<locale>.html. Idempotent for equal inputs.
    pub fn render(
        &mut self,
        transforms: &[RendererTransform<Page>],
        cache_dir: &Path,
    ) -> Result<(), LoadError> {
        let out_dir = cache_dir.join("pages");
        fs::create_dir_all(&out_dir)?;

        for page in self.pages.values_mut() {
            let mut renderer = MarkdownRenderer::gfm();
            for transform in transforms {
                renderer = (transform.as_ref())(page, renderer);
            }

            let html = match renderer.render(&page.body) {
                Ok(html) => html,
                Err(reason) => {
                    return Err(LoadError::Render {
                        id: page.key.id.clone(),
                        locale: page.key.locale.clone(),
                        reason,
                    });
                }
            };

            fs::write(out_dir.join(format!("{}.html", page.key)), &html)?;
            page.rendered_html = html;
        }

        info!("Rendered {} pages", self.pages.len());
        Ok(())
    }

    pub fn page(&self, id: &str, locale: &str) -> Option<&Page> {
        self.pages.get(&ContentKey::new(id, locale))
    }

    /// Locales carrying a translation of `id`, including the one being
    /// viewed; the caller filters out its own.
    pub fn locales_of(&self, id: &str) -> Vec<String> {
        self.locales_by_id.get(id).cloned().unwrap_or_default()
    }

    pub fn all_pages(&self) -> impl Iterator<Item = &Page> {
        self.pages.values()
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

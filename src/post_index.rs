use std::collections::HashMap;
use std::fs;
use std::path::Path;

use spdlog::info;

use crate::config::Config;
use crate::content::markdown::{MarkdownRenderer, RendererTransform};
use crate::content::meta::MetaDate;
use crate::content::{ContentKey, Post};
use crate::error::LoadError;

/// All post lookup structures, built in one pass at startup and read-only
/// afterwards. Rendered HTML is filled in by the explicit render pass.
#[derive(Debug)]
pub struct PostIndex {
    // (id, locale) to post
    posts: HashMap<ContentKey, Post>,
    // locale to keys, newest first
    by_locale: HashMap<String, Vec<ContentKey>>,
    // url slug to id, per locale
    url_to_id: HashMap<String, HashMap<String, String>>,
    // id to canonical url for every locale carrying a translation
    translations: HashMap<String, HashMap<String, String>>,
}

impl PostIndex {
    pub fn build(records: Vec<Post>, config: &Config) -> Result<PostIndex, LoadError> {
        let mut index = PostIndex {
            posts: HashMap::new(),
            by_locale: HashMap::new(),
            url_to_id: HashMap::new(),
            translations: HashMap::new(),
        };

        // Keys are collected with their dates so each locale's list can be
        // sorted newest-first; the sort is stable, so equal dates keep the
        // load order.
        let mut dated: HashMap<String, Vec<(MetaDate, ContentKey)>> = HashMap::new();

        for post in records {
            if !config.locale_known(&post.key.locale) {
                return Err(LoadError::UnknownLocale {
                    locale: post.key.locale.clone(),
                    path: post.source.clone(),
                });
            }
            if index.posts.contains_key(&post.key) {
                return Err(LoadError::DuplicateIdentity {
                    id: post.key.id.clone(),
                    locale: post.key.locale.clone(),
                    path: post.source.clone(),
                });
            }

            for url in post.urls.iter() {
                let locales = index.url_to_id.entry(url.clone()).or_default();
                if locales.contains_key(&post.key.locale) {
                    return Err(LoadError::DuplicateUrl {
                        url: url.clone(),
                        locale: post.key.locale.clone(),
                    });
                }
                locales.insert(post.key.locale.clone(), post.key.id.clone());
            }

            index
                .translations
                .entry(post.key.id.clone())
                .or_default()
                .insert(post.key.locale.clone(), post.canonical_url().to_string());

            dated
                .entry(post.key.locale.clone())
                .or_default()
                .push((post.date, post.key.clone()));

            index.posts.insert(post.key.clone(), post);
        }

        for (locale, mut keys) in dated {
            keys.sort_by(|a, b| {
                let (da, _) = a;
                let (db, _) = b;
                db.cmp(da)
            });
            index
                .by_locale
                .insert(locale, keys.into_iter().map(|(_, key)| key).collect());
        }

        Ok(index)
    }

    /// Explicit full re-render pass. Every post's body goes through the base
    /// renderer extended by `transforms` in registration order; the result is
    /// cached on the record and mirrored to <cache_dir>/posts/<id>.<locale>.html.
    /// Running it again with the same inputs rewrites identical output.
    pub fn render(
        &mut self,
        transforms: &[RendererTransform<Post>],
        cache_dir: &Path,
    ) -> Result<(), LoadError> {
        let out_dir = cache_dir.join("posts");
        fs::create_dir_all(&out_dir)?;

        for post in self.posts.values_mut() {
            let mut renderer = MarkdownRenderer::gfm();
            for transform in transforms {
                renderer = (transform.as_ref())(post, renderer);
            }

            let html = match renderer.render(&post.body) {
                Ok(html) => html,
                Err(reason) => {
                    return Err(LoadError::Render {
                        id: post.key.id.clone(),
                        locale: post.key.locale.clone(),
                        reason,
                    });
                }
            };

            fs::write(out_dir.join(format!("{}.html", post.key)), &html)?;
            post.rendered_html = html;
        }

        info!("Rendered {} posts", self.posts.len());
        Ok(())
    }

    /// The locale's posts, newest first. Unknown locales yield an empty list.
    pub fn posts_by_locale(&self, locale: &str) -> Vec<&Post> {
        match self.by_locale.get(locale) {
            Some(keys) => keys.iter().filter_map(|key| self.posts.get(key)).collect(),
            None => vec![],
        }
    }

    pub fn post_by_url(&self, url: &str, locale: &str) -> Option<&Post> {
        let id = self.url_to_id.get(url)?.get(locale)?;
        self.posts.get(&ContentKey::new(id, locale))
    }

    /// Canonical url per locale carrying a translation of `id`, including the
    /// locale being viewed; the caller filters out its own.
    pub fn translations_of(&self, id: &str) -> HashMap<String, String> {
        self.translations.get(id).cloned().unwrap_or_default()
    }

    pub fn all_posts(&self) -> impl Iterator<Item = &Post> {
        self.posts.values()
    }

    pub fn post_count(&self) -> usize {
        self.posts.len()
    }
}

use spdlog::info;

use crate::config::Config;
use crate::content::content_file::{list_content_files, ContentFile};
use crate::content::{Page, Post};
use crate::error::LoadError;
use crate::page_index::PageIndex;
use crate::plugin::{PluginRegistry, PluginSnapshot};
use crate::post_index::PostIndex;

/// The content engine handle: indexes built and rendered once at startup,
/// then shared read-only with every request. Content changes need a restart.
pub struct Engine {
    pub config: Config,
    pub posts: PostIndex,
    pub pages: PageIndex,
    pub registry: PluginRegistry,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("posts", &self.posts)
            .field("pages", &self.pages)
            .finish_non_exhaustive()
    }
}

/// Loads, indexes and renders the whole content set, then hands each plugin
/// its one-time snapshot. Any load error aborts startup: the server never
/// comes up over a partially indexed site.
pub fn build_engine(config: Config, registry: PluginRegistry) -> Result<Engine, LoadError> {
    let posts_dir = config.paths.data_dir.join("posts");
    let pages_dir = config.paths.data_dir.join("pages");

    let mut posts = vec![];
    for path in list_content_files(&posts_dir)? {
        let file = ContentFile::from_file(path)?;
        posts.push(Post::from_content_file(file)?);
    }
    info!("Loaded {} posts from {}", posts.len(), posts_dir.display());

    let mut pages = vec![];
    for path in list_content_files(&pages_dir)? {
        let file = ContentFile::from_file(path)?;
        pages.push(Page::from_content_file(file)?);
    }
    info!("Loaded {} pages from {}", pages.len(), pages_dir.display());

    let mut post_index = PostIndex::build(posts, &config)?;
    let mut page_index = PageIndex::build(pages, &config)?;

    post_index.render(&registry.post_renderers(), &config.paths.cache_dir)?;
    page_index.render(&registry.page_renderers(), &config.paths.cache_dir)?;

    let snapshot = PluginSnapshot {
        config: &config,
        posts: post_index.all_posts().collect(),
        pages: page_index.all_pages().collect(),
    };
    registry.initialize_all(&snapshot);
    drop(snapshot);

    Ok(Engine {
        config,
        posts: post_index,
        pages: page_index,
        registry,
    })
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use crate::config::Config;
    use crate::test_data::{
        test_config, PAGE_404_EN, PAGE_404_FR, PAGE_ABOUT_EN, PAGE_ABOUT_FR, POST_HELLO_EN,
        POST_HELLO_FR, POST_OLDER_EN,
    };

    use super::*;

    fn write_content(root: &Path) {
        fs::create_dir_all(root.join("posts")).unwrap();
        fs::create_dir_all(root.join("pages")).unwrap();
        fs::write(root.join("posts/hello.en.md"), POST_HELLO_EN).unwrap();
        fs::write(root.join("posts/hello.fr.md"), POST_HELLO_FR).unwrap();
        fs::write(root.join("posts/older.en.md"), POST_OLDER_EN).unwrap();
        fs::write(root.join("pages/about.en.md"), PAGE_ABOUT_EN).unwrap();
        fs::write(root.join("pages/about.fr.md"), PAGE_ABOUT_FR).unwrap();
        fs::write(root.join("pages/404.en.md"), PAGE_404_EN).unwrap();
        fs::write(root.join("pages/404.fr.md"), PAGE_404_FR).unwrap();
    }

    fn config_for(root: &Path) -> Config {
        let mut config = test_config();
        config.paths.data_dir = root.to_path_buf();
        config.paths.cache_dir = root.join("cache");
        config
    }

    #[test]
    fn test_build_engine_end_to_end() {
        let tmp = tempfile::tempdir().unwrap();
        write_content(tmp.path());

        let engine = build_engine(config_for(tmp.path()), PluginRegistry::new()).unwrap();

        // The English slug resolves in English and nowhere else; its
        // translation map points at the French canonical slug.
        let post = engine.posts.post_by_url("hello-world", "en").unwrap();
        assert_eq!(post.key.id, "hello");
        let translations = engine.posts.translations_of(&post.key.id);
        assert_eq!(translations.get("fr").unwrap(), "bonjour");
        assert!(engine.posts.post_by_url("hello-world", "fr").is_none());

        // Rendered HTML is cached on the records and mirrored on disk.
        assert!(post.rendered_html.contains("<strong>hello</strong>"));
        assert!(tmp.path().join("cache/posts/hello.fr.html").exists());
        assert!(tmp.path().join("cache/pages/404.en.html").exists());

        assert_eq!(engine.posts.post_count(), 3);
        assert_eq!(engine.pages.page_count(), 4);
    }

    #[test]
    fn test_duplicate_identity_aborts_startup() {
        let tmp = tempfile::tempdir().unwrap();
        write_content(tmp.path());
        // Same (id, locale) pair under a different file name
        fs::write(tmp.path().join("posts/hello-again.en.md"), POST_HELLO_EN).unwrap();

        let err = build_engine(config_for(tmp.path()), PluginRegistry::new()).unwrap_err();
        assert!(matches!(err, LoadError::DuplicateIdentity { .. }));
    }

    #[test]
    fn test_missing_404_aborts_startup() {
        let tmp = tempfile::tempdir().unwrap();
        write_content(tmp.path());
        fs::remove_file(tmp.path().join("pages/404.fr.md")).unwrap();

        let err = build_engine(config_for(tmp.path()), PluginRegistry::new()).unwrap_err();
        assert!(matches!(err, LoadError::MissingNotFoundPage { .. }));
    }

    #[test]
    fn test_malformed_file_aborts_startup() {
        let tmp = tempfile::tempdir().unwrap();
        write_content(tmp.path());
        fs::write(tmp.path().join("posts/broken.en.md"), "id = \"broken\"\nno body delimiter").unwrap();

        let err = build_engine(config_for(tmp.path()), PluginRegistry::new()).unwrap_err();
        assert!(matches!(err, LoadError::MalformedContentFile { .. }));
    }
}

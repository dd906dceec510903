use std::fmt;
use std::fmt::Formatter;
use std::path::PathBuf;

pub mod content_file;
pub mod markdown;
pub mod meta;

use crate::error::LoadError;
use crate::text_utils::excerpt_of;
use content_file::ContentFile;
use meta::{parse_page_meta, parse_post_meta, MetaDate};

/// Identity of a record across the content set: the same id in two locales
/// means two translations of the same logical content.
#[derive(Debug, Clone, Eq, Hash, PartialEq)]
pub struct ContentKey {
    pub id: String,
    pub locale: String,
}

impl ContentKey {
    pub fn new(id: &str, locale: &str) -> ContentKey {
        ContentKey {
            id: id.to_string(),
            locale: locale.to_string(),
        }
    }
}

impl fmt::Display for ContentKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.id, self.locale)
    }
}

#[derive(Debug, Clone)]
pub struct Post {
    pub key: ContentKey,
    pub title: String,
    pub date: MetaDate,
    /// Slugs resolving to this post within its locale. The first one is
    /// canonical and is what other locales link to.
    pub urls: Vec<String>,
    pub tags: Vec<String>,
    pub excerpt: String,
    pub body: String,
    /// Set by the explicit render pass; empty until then.
    pub rendered_html: String,
    pub source: PathBuf,
}

impl Post {
    pub fn from_content_file(file: ContentFile) -> Result<Post, LoadError> {
        let meta = parse_post_meta(&file.file_path, &file.meta_block)?;
        if meta.url.is_empty() {
            return Err(LoadError::MissingUrl { path: file.file_path });
        }

        let excerpt = excerpt_of(&file.body);

        Ok(Post {
            key: ContentKey::new(&meta.id, &meta.locale),
            title: meta.title,
            date: meta.date,
            urls: meta.url,
            tags: meta.tags,
            excerpt,
            body: file.body,
            rendered_html: String::new(),
            source: file.file_path,
        })
    }

    pub fn canonical_url(&self) -> &str {
        self.urls[0].as_str()
    }
}

#[derive(Debug, Clone)]
pub struct Page {
    pub key: ContentKey,
    pub title: String,
    pub body: String,
    pub rendered_html: String,
    pub source: PathBuf,
}

impl Page {
    pub fn from_content_file(file: ContentFile) -> Result<Page, LoadError> {
        let meta = parse_page_meta(&file.file_path, &file.meta_block)?;

        Ok(Page {
            key: ContentKey::new(&meta.id, &meta.locale),
            title: meta.title,
            body: file.body,
            rendered_html: String::new(),
            source: file.file_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::test_data::{PAGE_ABOUT_EN, POST_HELLO_EN};

    use super::*;

    #[test]
    fn test_post_from_content_file() {
        let file = ContentFile::from_string(PathBuf::from("posts/hello.en.md"), POST_HELLO_EN).unwrap();
        let post = Post::from_content_file(file).unwrap();

        assert_eq!(post.key, ContentKey::new("hello", "en"));
        assert_eq!(post.title, "Hello, world");
        assert_eq!(post.urls, vec!["hello-world", "hello"]);
        assert_eq!(post.canonical_url(), "hello-world");
        assert_eq!(post.tags, vec!["intro"]);
        assert_eq!(post.excerpt, "Saying hello to the world.");
        assert!(post.body.starts_with("Saying **hello**"));
        assert!(post.rendered_html.is_empty());
    }

    #[test]
    fn test_page_from_content_file() {
        let file = ContentFile::from_string(PathBuf::from("pages/about.en.md"), PAGE_ABOUT_EN).unwrap();
        let page = Page::from_content_file(file).unwrap();

        assert_eq!(page.key.to_string(), "about.en");
        assert_eq!(page.title, "About");
        assert!(page.body.contains("What this site is"));
    }

    #[test]
    fn test_post_without_url_is_rejected() {
        let raw = "id = \"x\"\nlocale = \"en\"\ntitle = \"X\"\ndate = 2024-01-01\nurl = []\n\n\n\nBody.";
        let file = ContentFile::from_string(PathBuf::from("posts/x.en.md"), raw).unwrap();
        let err = Post::from_content_file(file).unwrap_err();
        assert!(matches!(err, LoadError::MissingUrl { .. }));
    }
}

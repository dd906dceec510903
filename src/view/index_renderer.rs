use std::io;
use std::io::ErrorKind;

use ramhorns::Template;

use crate::config::LocaleChrome;
use crate::content::Post;
use crate::text_utils::format_date_time;
use crate::view::{dict_entries, DictEntry, TranslationItem};

#[derive(ramhorns::Content)]
struct IndexPage<'a> {
    blog_title: &'a str,
    blog_tagline: &'a str,
    locale: &'a str,
    posts: Vec<IndexItem<'a>>,
    translations: Vec<TranslationItem>,
    dictionary: Vec<DictEntry>,
}

#[derive(ramhorns::Content)]
struct IndexItem<'a> {
    title: &'a str,
    url: String,
    date: String,
    excerpt: &'a str,
}

pub struct IndexRenderer<'a> {
    pub template: Template<'a>,
}

impl IndexRenderer<'_> {
    pub fn new(index_tpl_src: &str) -> io::Result<IndexRenderer> {
        let template = match Template::new(index_tpl_src) {
            Ok(x) => x,
            Err(e) => {
                return Err(io::Error::new(ErrorKind::InvalidInput, format!("Error parsing index template: {}", e)));
            }
        };

        Ok(IndexRenderer {
            template,
        })
    }

    pub fn render(
        &self,
        locale: &str,
        chrome: &LocaleChrome,
        posts: &[Post],
        translations: Vec<TranslationItem>,
    ) -> String {
        let mut items = vec![];
        for post in posts {
            let (date, _time) = format_date_time(&post.date.0);
            items.push(IndexItem {
                title: post.title.as_str(),
                url: format!("/{}/post/{}/", locale, post.canonical_url()),
                date,
                excerpt: post.excerpt.as_str(),
            });
        }

        self.template.render(&IndexPage {
            blog_title: chrome.blog_title.as_str(),
            blog_tagline: chrome.blog_tagline.as_str(),
            locale,
            posts: items,
            translations,
            dictionary: dict_entries(chrome),
        })
    }
}

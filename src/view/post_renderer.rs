use std::io;
use std::io::ErrorKind;

use ramhorns::Template;

use crate::config::LocaleChrome;
use crate::content::Post;
use crate::text_utils::format_date_time;
use crate::view::{dict_entries, DictEntry, TranslationItem};

#[derive(ramhorns::Content)]
struct ViewTag<'a> {
    tag: &'a str,
}

#[derive(ramhorns::Content)]
struct PostPage<'a> {
    blog_title: &'a str,
    blog_tagline: &'a str,
    locale: &'a str,
    post_title: &'a str,
    date: String,
    time: String,
    tags: Vec<ViewTag<'a>>,
    post_content: &'a str,
    translations: Vec<TranslationItem>,
    dictionary: Vec<DictEntry>,
}

pub struct PostRenderer<'a> {
    pub template: Template<'a>,
}

impl PostRenderer<'_> {
    pub fn new(post_tpl_src: &str) -> io::Result<PostRenderer> {
        let template = match Template::new(post_tpl_src) {
            Ok(x) => x,
            Err(e) => {
                return Err(io::Error::new(ErrorKind::InvalidInput, format!("Error parsing post template: {}", e)));
            }
        };

        Ok(PostRenderer {
            template,
        })
    }

    pub fn render(
        &self,
        chrome: &LocaleChrome,
        post: &Post,
        translations: Vec<TranslationItem>,
    ) -> String {
        let tags: Vec<ViewTag> = post.tags.iter().map(|t| ViewTag { tag: t.as_str() }).collect();
        let (date, time) = format_date_time(&post.date.0);

        self.template.render(&PostPage {
            blog_title: chrome.blog_title.as_str(),
            blog_tagline: chrome.blog_tagline.as_str(),
            locale: post.key.locale.as_str(),
            post_title: post.title.as_str(),
            date,
            time,
            tags,
            post_content: post.rendered_html.as_str(),
            translations,
            dictionary: dict_entries(chrome),
        })
    }
}

use std::io;
use std::io::ErrorKind;

use ramhorns::Template;

use crate::config::LocaleChrome;
use crate::content::Page;
use crate::view::{dict_entries, DictEntry, TranslationItem};

#[derive(ramhorns::Content)]
struct PageView<'a> {
    blog_title: &'a str,
    blog_tagline: &'a str,
    locale: &'a str,
    page_title: &'a str,
    page_content: &'a str,
    translations: Vec<TranslationItem>,
    dictionary: Vec<DictEntry>,
}

pub struct PageRenderer<'a> {
    pub template: Template<'a>,
}

impl PageRenderer<'_> {
    pub fn new(page_tpl_src: &str) -> io::Result<PageRenderer> {
        let template = match Template::new(page_tpl_src) {
            Ok(x) => x,
            Err(e) => {
                return Err(io::Error::new(ErrorKind::InvalidInput, format!("Error parsing page template: {}", e)));
            }
        };

        Ok(PageRenderer {
            template,
        })
    }

    pub fn render(
        &self,
        chrome: &LocaleChrome,
        page: &Page,
        translations: Vec<TranslationItem>,
    ) -> String {
        self.template.render(&PageView {
            blog_title: chrome.blog_title.as_str(),
            blog_tagline: chrome.blog_tagline.as_str(),
            locale: page.key.locale.as_str(),
            page_title: page.title.as_str(),
            page_content: page.rendered_html.as_str(),
            translations,
            dictionary: dict_entries(chrome),
        })
    }
}

pub mod index_renderer;
pub mod page_renderer;
pub mod post_renderer;

use crate::config::LocaleChrome;

/// Link to the same logical content in another locale.
#[derive(ramhorns::Content)]
pub struct TranslationItem {
    pub locale: String,
    pub name: String,
    pub url: String,
}

#[derive(ramhorns::Content)]
pub struct DictEntry {
    pub key: String,
    pub value: String,
}

pub fn dict_entries(chrome: &LocaleChrome) -> Vec<DictEntry> {
    chrome
        .dictionary
        .iter()
        .map(|(key, value)| DictEntry {
            key: key.clone(),
            value: value.clone(),
        })
        .collect()
}

// Sample content shared by the unit tests. The metadata block and the body
// are separated by three blank lines, like the files on disk.

#[cfg(test)]
pub const POST_HELLO_EN: &str = r#"id = "hello"
locale = "en"
title = "Hello, world"
date = 2024-01-01
url = ["hello-world", "hello"]
tags = ["intro"]



Saying **hello** to the world.

The rest of the post goes deeper, with a [link](https://example.com) and some
`inline code` for good measure.
"#;

#[cfg(test)]
pub const POST_HELLO_FR: &str = r#"id = "hello"
locale = "fr"
title = "Bonjour, le monde"
date = 2024-01-01
url = ["bonjour"]
tags = ["intro"]



On dit **bonjour** au monde.

La suite du billet continue en français.
"#;

#[cfg(test)]
pub const POST_OLDER_EN: &str = r#"id = "older"
locale = "en"
title = "An older post"
date = 2023-06-15
url = ["older-post"]



This one was written earlier and must list after newer posts.
"#;

#[cfg(test)]
pub const PAGE_ABOUT_EN: &str = r#"id = "about"
locale = "en"
title = "About"



What this site is, and who writes it.
"#;

#[cfg(test)]
pub const PAGE_ABOUT_FR: &str = r#"id = "about"
locale = "fr"
title = "À propos"



Ce qu'est ce site, et qui l'écrit.
"#;

#[cfg(test)]
pub const PAGE_404_EN: &str = r#"id = "404"
locale = "en"
title = "Not found"



Nothing lives at this address.
"#;

#[cfg(test)]
pub const PAGE_404_FR: &str = r#"id = "404"
locale = "fr"
title = "Introuvable"



Rien n'habite à cette adresse.
"#;

#[cfg(test)]
pub fn test_config() -> crate::config::Config {
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    use crate::config::{Config, LocaleChrome, Paths, Server, Site};

    let mut locales = BTreeMap::new();
    locales.insert("en".to_string(), "English".to_string());
    locales.insert("fr".to_string(), "Français".to_string());

    let mut locale_chrome = BTreeMap::new();
    locale_chrome.insert(
        "en".to_string(),
        LocaleChrome {
            name: "English".to_string(),
            blog_title: "A test blog".to_string(),
            blog_tagline: "Fixtures all the way down".to_string(),
            dictionary: BTreeMap::new(),
        },
    );
    locale_chrome.insert(
        "fr".to_string(),
        LocaleChrome {
            name: "Français".to_string(),
            blog_title: "Un blog de test".to_string(),
            blog_tagline: "Des fixtures jusqu'en bas".to_string(),
            dictionary: BTreeMap::new(),
        },
    );

    Config {
        site: Site {
            default_locale: "en".to_string(),
            pages: vec!["about".to_string(), "404".to_string()],
        },
        locales,
        paths: Paths {
            data_dir: PathBuf::from("data"),
            cache_dir: PathBuf::from("cache"),
            template_dir: PathBuf::from("templates"),
            public_dir: PathBuf::from("public"),
        },
        server: Server {
            address: "127.0.0.1".to_string(),
            port: 0,
            hook_timeout_ms: None,
        },
        log: None,
        locale_chrome,
    }
}

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::{env, fs, io};

use serde::Deserialize;

#[derive(Deserialize)]
pub struct Site {
    pub default_locale: String,
    /// Page ids that may be served; anything else resolves to the 404 flow.
    pub pages: Vec<String>,
}

#[derive(Deserialize)]
pub struct Paths {
    /// Content root, holding posts/, pages/ and the locale.<tag>.toml files.
    pub data_dir: PathBuf,
    /// Where rendered HTML is mirrored, one file per (id, locale) pair.
    pub cache_dir: PathBuf,
    pub template_dir: PathBuf,
    pub public_dir: PathBuf,
}

#[derive(Deserialize)]
pub struct Server {
    pub address: String,
    pub port: u16,
    /// Upper bound for one request's middleware chain, if set.
    pub hook_timeout_ms: Option<u64>,
}

#[derive(Deserialize)]
pub struct Log {
    pub level: LogLevel,
    pub log_to_console: bool,
    pub location: Option<PathBuf>,
}

#[derive(Deserialize, Copy, Clone)]
pub enum LogLevel {
    Critical = 0,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Per-locale site chrome, loaded from locale.<tag>.toml next to the content.
#[derive(Deserialize, Clone, Default)]
pub struct LocaleChrome {
    pub name: String,
    pub blog_title: String,
    pub blog_tagline: String,
    #[serde(default)]
    pub dictionary: BTreeMap<String, String>,
}

#[derive(Deserialize)]
pub struct Config {
    pub site: Site,
    /// Locale tag to display name; the keys are the global locale set.
    pub locales: BTreeMap<String, String>,
    pub paths: Paths,
    pub server: Server,
    pub log: Option<Log>,
    #[serde(skip)]
    pub locale_chrome: BTreeMap<String, LocaleChrome>,
}

impl Config {
    pub fn locale_known(&self, tag: &str) -> bool {
        self.locales.contains_key(tag)
    }

    pub fn chrome(&self, tag: &str) -> LocaleChrome {
        self.locale_chrome.get(tag).cloned().unwrap_or_default()
    }
}

fn parse_path(path: PathBuf) -> PathBuf {
    if path.starts_with("${exe_dir}") {
        let cur_exe = env::current_exe().unwrap();
        let exe_dir = cur_exe.parent().unwrap().to_str().unwrap();
        let str_path = path.to_str().unwrap();
        PathBuf::from(str_path.replace("${exe_dir}", exe_dir))
    } else {
        path
    }
}

fn read_locale_chrome(data_dir: &PathBuf, tag: &str) -> io::Result<LocaleChrome> {
    let chrome_path = data_dir.join(format!("locale.{}.toml", tag));
    let content = match fs::read_to_string(&chrome_path) {
        Ok(content) => content,
        Err(e) => return Err(io::Error::new(e.kind(), format!("Error opening locale file {}: {}", chrome_path.to_str().unwrap(), e))),
    };

    match toml::from_str::<LocaleChrome>(content.as_str()) {
        Ok(chrome) => Ok(chrome),
        Err(e) => Err(io::Error::new(
            ErrorKind::InvalidData, format!("Error parsing locale file {}: {}", chrome_path.to_str().unwrap(), e))),
    }
}

pub fn read_config(cfg_path: &PathBuf) -> io::Result<Config> {
    let cfg_content = match fs::read_to_string(cfg_path) {
        Ok(content) => content,
        Err(e) => return Err(io::Error::new(e.kind(), format!("Error opening configuration file {}: {}", cfg_path.to_str().unwrap(), e))),
    };

    let mut cfg: Config = match toml::from_str::<Config>(cfg_content.as_str()) {
        Ok(cfg) => cfg,
        Err(e) => return Err(io::Error::new(
            ErrorKind::InvalidData, format!("Error parsing configuration file: {}", e))),
    };

    cfg.paths = Paths {
        data_dir: parse_path(cfg.paths.data_dir),
        cache_dir: parse_path(cfg.paths.cache_dir),
        template_dir: parse_path(cfg.paths.template_dir),
        public_dir: parse_path(cfg.paths.public_dir),
    };

    if !cfg.locale_known(&cfg.site.default_locale) {
        return Err(io::Error::new(
            ErrorKind::InvalidData,
            format!("Default locale {} is not in the [locales] table", cfg.site.default_locale)));
    }

    for tag in cfg.locales.keys() {
        let chrome = read_locale_chrome(&cfg.paths.data_dir, tag)?;
        cfg.locale_chrome.insert(tag.clone(), chrome);
    }

    Ok(cfg)
}

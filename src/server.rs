use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use std::{fs, io};

use ntex::web;
use ntex_files::NamedFile;
use spdlog::error;

use crate::compose::Chain;
use crate::config::Config;
use crate::content::Post;
use crate::engine::Engine;
use crate::error::HookError;
use crate::plugin::{IndexCtx, PageCtx, PostCtx, PluginsData};
use crate::view::index_renderer::IndexRenderer;
use crate::view::page_renderer::PageRenderer;
use crate::view::post_renderer::PostRenderer;
use crate::view::TranslationItem;

fn read_template(config: &Config, file_name: &str) -> io::Result<String> {
    fs::read_to_string(config.paths.template_dir.join(file_name))
}

fn html_ok(body: String) -> web::HttpResponse {
    web::HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body)
}

fn redirect_to(target: String) -> web::HttpResponse {
    web::HttpResponse::TemporaryRedirect()
        .header("Location", target)
        .content_type("text/html; charset=utf-8")
        .finish()
}

fn hook_error_response(e: HookError) -> web::HttpResponse {
    web::HttpResponse::InternalServerError()
        .body(format!("Error applying content hooks: {}", e))
}

/// Runs a chain under the configured request budget, if any. A chain that
/// overruns it fails as a whole; the route never serves a half-transformed
/// context.
async fn run_hooks<T: 'static>(
    chain: &Chain<T>,
    ctx: &mut T,
    config: &Config,
) -> Result<(), HookError> {
    match config.server.hook_timeout_ms {
        Some(ms) => match tokio::time::timeout(Duration::from_millis(ms), chain.run(ctx, config)).await {
            Ok(res) => res,
            Err(_) => Err(HookError::Timeout),
        },
        None => chain.run(ctx, config).await,
    }
}

/// Index links: one per configured locale other than the one being viewed.
fn index_translations(config: &Config, current: &str) -> Vec<TranslationItem> {
    config
        .locales
        .iter()
        .filter(|(tag, _)| tag.as_str() != current)
        .map(|(tag, name)| TranslationItem {
            locale: tag.clone(),
            name: name.clone(),
            url: format!("/{}/", tag),
        })
        .collect()
}

/// Post links, built from the index's id-to-canonical-url map minus the
/// locale being viewed.
fn post_translations(
    config: &Config,
    current: &str,
    canonical_urls: HashMap<String, String>,
) -> Vec<TranslationItem> {
    config
        .locales
        .iter()
        .filter(|(tag, _)| tag.as_str() != current)
        .filter_map(|(tag, name)| {
            canonical_urls.get(tag.as_str()).map(|slug| TranslationItem {
                locale: tag.clone(),
                name: name.clone(),
                url: format!("/{}/post/{}/", tag, slug),
            })
        })
        .collect()
}

/// Page links: a page's id is its slug, so only locale membership matters.
fn page_translations(
    config: &Config,
    current: &str,
    id: &str,
    locales: &[String],
) -> Vec<TranslationItem> {
    config
        .locales
        .iter()
        .filter(|(tag, _)| tag.as_str() != current && locales.contains(*tag))
        .map(|(tag, name)| TranslationItem {
            locale: tag.clone(),
            name: name.clone(),
            url: format!("/{}/page/{}/", tag, id),
        })
        .collect()
}

/// Terminal flow for anything unresolved: the current locale's 404 page.
/// Never fails, even when templates or translations are unavailable.
fn not_found(engine: &Engine, locale: &str) -> web::HttpResponse {
    let page = match engine.pages.page("404", locale) {
        Some(page) => page,
        None => {
            return web::HttpResponse::NotFound()
                .content_type("text/html; charset=utf-8")
                .body("Not found");
        }
    };

    let rendered = read_template(&engine.config, "page.tpl")
        .and_then(|src| Ok(PageRenderer::new(&src)?.render(&engine.config.chrome(locale), page, vec![])));

    match rendered {
        Ok(body) => web::HttpResponse::NotFound()
            .content_type("text/html; charset=utf-8")
            .body(body),
        Err(e) => {
            error!("Error rendering 404 page for locale {}: {}", locale, e);
            web::HttpResponse::NotFound()
                .content_type("text/html; charset=utf-8")
                .body("Not found")
        }
    }
}

#[web::get("/")]
async fn root(state: web::types::State<Arc<Engine>>) -> web::HttpResponse {
    redirect_to(format!("/{}/", state.config.site.default_locale))
}

#[web::get("/{locale}/")]
async fn index_route(
    path: web::types::Path<String>,
    state: web::types::State<Arc<Engine>>,
) -> web::HttpResponse {
    let locale = path.into_inner();
    if !state.config.locale_known(&locale) {
        return redirect_to(format!("/{}/", state.config.site.default_locale));
    }

    let posts: Vec<Post> = state.posts.posts_by_locale(&locale).into_iter().cloned().collect();
    let mut ctx = IndexCtx {
        locale: locale.clone(),
        posts,
        plugins_data: PluginsData::new(),
    };
    if let Err(e) = run_hooks(state.registry.index_chain(), &mut ctx, &state.config).await {
        error!("Index hooks failed for locale {}: {}", locale, e);
        return hook_error_response(e);
    }

    let translations = index_translations(&state.config, &locale);
    let rendered = read_template(&state.config, "index.tpl").and_then(|src| {
        Ok(IndexRenderer::new(&src)?.render(&locale, &state.config.chrome(&locale), &ctx.posts, translations))
    });

    match rendered {
        Ok(body) => html_ok(body),
        Err(e) => web::HttpResponse::InternalServerError()
            .body(format!("Error rendering index for locale {}: {}", locale, e)),
    }
}

// Begin: Redirect region --------
#[web::get("/{locale}/post/{slug}")]
async fn post_wo_slash(path: web::types::Path<(String, String)>) -> web::HttpResponse {
    let (locale, slug) = path.into_inner();
    redirect_to(format!("/{}/post/{}/", locale, slug))
}

#[web::get("/{locale}/page/{page}")]
async fn page_wo_slash(path: web::types::Path<(String, String)>) -> web::HttpResponse {
    let (locale, page) = path.into_inner();
    redirect_to(format!("/{}/page/{}/", locale, page))
}
// End: Redirect region --------

#[web::get("/{locale}/post/{slug}/")]
async fn post_route(
    path: web::types::Path<(String, String)>,
    state: web::types::State<Arc<Engine>>,
) -> web::HttpResponse {
    let (locale, slug) = path.into_inner();
    if !state.config.locale_known(&locale) {
        return redirect_to(format!("/{}/post/{}/", state.config.site.default_locale, slug));
    }

    // No post at this slug is a normal outcome, not an error
    let post = match state.posts.post_by_url(&slug, &locale) {
        Some(post) => post.clone(),
        None => return not_found(&state, &locale),
    };

    let mut ctx = PostCtx {
        post,
        plugins_data: PluginsData::new(),
    };
    if let Err(e) = run_hooks(state.registry.post_chain(), &mut ctx, &state.config).await {
        error!("Post hooks failed for {}: {}", ctx.post.key, e);
        return hook_error_response(e);
    }

    let translations = post_translations(
        &state.config,
        &locale,
        state.posts.translations_of(&ctx.post.key.id),
    );
    let rendered = read_template(&state.config, "post.tpl").and_then(|src| {
        Ok(PostRenderer::new(&src)?.render(&state.config.chrome(&locale), &ctx.post, translations))
    });

    match rendered {
        Ok(body) => html_ok(body),
        Err(e) => web::HttpResponse::InternalServerError()
            .body(format!("Error rendering post {}: {}", slug, e)),
    }
}

#[web::get("/{locale}/page/{page}/")]
async fn page_route(
    path: web::types::Path<(String, String)>,
    state: web::types::State<Arc<Engine>>,
) -> web::HttpResponse {
    let (locale, id) = path.into_inner();
    if !state.config.locale_known(&locale) {
        return redirect_to(format!("/{}/page/{}/", state.config.site.default_locale, id));
    }

    // Only allow-listed page ids are routable
    if !state.config.site.pages.contains(&id) {
        return not_found(&state, &locale);
    }

    let page = match state.pages.page(&id, &locale) {
        Some(page) => page.clone(),
        None => return not_found(&state, &locale),
    };

    let mut ctx = PageCtx {
        page,
        plugins_data: PluginsData::new(),
    };
    if let Err(e) = run_hooks(state.registry.page_chain(), &mut ctx, &state.config).await {
        error!("Page hooks failed for {}: {}", ctx.page.key, e);
        return hook_error_response(e);
    }

    let translations = page_translations(&state.config, &locale, &id, &state.pages.locales_of(&id));
    let rendered = read_template(&state.config, "page.tpl").and_then(|src| {
        Ok(PageRenderer::new(&src)?.render(&state.config.chrome(&locale), &ctx.page, translations))
    });

    match rendered {
        Ok(body) => html_ok(body),
        Err(e) => web::HttpResponse::InternalServerError()
            .body(format!("Error rendering page {}: {}", id, e)),
    }
}

#[web::get("/public/{file_name}")]
async fn public_files(
    path: web::types::Path<String>,
    state: web::types::State<Arc<Engine>>,
) -> Result<NamedFile, web::Error> {
    if path.contains("../") {
        return Err(web::error::ErrorUnauthorized("Access forbidden").into());
    }

    let file_path = state.config.paths.public_dir.join(path.into_inner());

    Ok(NamedFile::open(file_path)?)
}

pub async fn server_run(engine: Engine) -> io::Result<()> {
    let bind_addr = engine.config.server.address.clone();
    let bind_port = engine.config.server.port;
    let state = Arc::new(engine);

    web::HttpServer::new(move || {
        web::App::new()
            .state(state.clone())
            .service(root)
            .service(public_files)
            .service(index_route)
            .service(post_route)
            .service(post_wo_slash)
            .service(page_route)
            .service(page_wo_slash)
    })
        .bind((bind_addr, bind_port))?
        .run()
        .await
}

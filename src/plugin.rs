use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use spdlog::{info, warn};

use crate::compose::{Chain, Hook};
use crate::config::Config;
use crate::content::markdown::RendererTransform;
use crate::content::{Page, Post};

/// Scratch space hooks may attach to while a request is served. A fresh map is
/// built per request, so hooks never share scratch state across requests.
pub type PluginsData = HashMap<String, Value>;

/// Context of the index-hook chain: one locale's posts, newest first. Hooks
/// may reorder or drop entries before the listing is rendered.
pub struct IndexCtx {
    pub locale: String,
    pub posts: Vec<Post>,
    pub plugins_data: PluginsData,
}

/// Context of the post-hook chain.
pub struct PostCtx {
    pub post: Post,
    pub plugins_data: PluginsData,
}

/// Context of the page-hook chain.
pub struct PageCtx {
    pub page: Page,
    pub plugins_data: PluginsData,
}

/// Read-only view of the indexed content, handed to each plugin's
/// `initialize` once, before the server accepts requests.
pub struct PluginSnapshot<'a> {
    pub config: &'a Config,
    pub posts: Vec<&'a Post>,
    pub pages: Vec<&'a Page>,
}

/// A unit of third-party behavior. Hooks are optional; a plugin contributes
/// only to the chains it cares about.
pub trait Plugin: Send + Sync {
    fn name(&self) -> &str;

    fn initialize(&self, snapshot: &PluginSnapshot) -> anyhow::Result<()>;

    fn index_hook(&self) -> Option<Hook<IndexCtx>> {
        None
    }

    fn post_hook(&self) -> Option<Hook<PostCtx>> {
        None
    }

    fn page_hook(&self) -> Option<Hook<PageCtx>> {
        None
    }

    /// Renderer extension applied to every post during the render phase.
    fn post_renderer(&self) -> Option<RendererTransform<Post>> {
        None
    }

    /// Renderer extension applied to every page during the render phase.
    fn page_renderer(&self) -> Option<RendererTransform<Page>> {
        None
    }
}

/// The installed plugin set and the three middleware chains fed from it.
pub struct PluginRegistry {
    plugins: Vec<Arc<dyn Plugin>>,
    index_chain: Chain<IndexCtx>,
    post_chain: Chain<PostCtx>,
    page_chain: Chain<PageCtx>,
}

impl PluginRegistry {
    pub fn new() -> PluginRegistry {
        PluginRegistry {
            plugins: vec![],
            index_chain: Chain::new(vec![]),
            post_chain: Chain::new(vec![]),
            page_chain: Chain::new(vec![]),
        }
    }

    /// Installs a plugin and recomposes all three chains. Hook order always
    /// follows plugin registration order, even when plugins contribute to
    /// different chains in between each other.
    pub fn register(&mut self, plugin: Arc<dyn Plugin>) {
        self.plugins.push(plugin);
        self.index_chain = Chain::new(self.plugins.iter().filter_map(|p| p.index_hook()).collect());
        self.post_chain = Chain::new(self.plugins.iter().filter_map(|p| p.post_hook()).collect());
        self.page_chain = Chain::new(self.plugins.iter().filter_map(|p| p.page_hook()).collect());
    }

    pub fn index_chain(&self) -> &Chain<IndexCtx> {
        &self.index_chain
    }

    pub fn post_chain(&self) -> &Chain<PostCtx> {
        &self.post_chain
    }

    pub fn page_chain(&self) -> &Chain<PageCtx> {
        &self.page_chain
    }

    pub fn post_renderers(&self) -> Vec<RendererTransform<Post>> {
        self.plugins.iter().filter_map(|p| p.post_renderer()).collect()
    }

    pub fn page_renderers(&self) -> Vec<RendererTransform<Page>> {
        self.plugins.iter().filter_map(|p| p.page_renderer()).collect()
    }

    /// One-time plugin initialization. A failure is surfaced as a startup
    /// warning and does not abort: the plugin's hooks stay installed.
    pub fn initialize_all(&self, snapshot: &PluginSnapshot) {
        for plugin in self.plugins.iter() {
            match plugin.initialize(snapshot) {
                Ok(()) => info!("Plugin {} initialized", plugin.name()),
                Err(e) => warn!("Plugin {} failed to initialize: {:#}", plugin.name(), e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::compose::{hook, Proceed};
    use crate::test_data::test_config;

    use super::*;

    struct MarkerPlugin {
        name: &'static str,
        with_index: bool,
        with_post: bool,
        fail_init: bool,
    }

    impl Plugin for MarkerPlugin {
        fn name(&self) -> &str {
            self.name
        }

        fn initialize(&self, _snapshot: &PluginSnapshot) -> anyhow::Result<()> {
            if self.fail_init {
                anyhow::bail!("{} refused to start", self.name);
            }
            Ok(())
        }

        fn index_hook(&self) -> Option<Hook<IndexCtx>> {
            if !self.with_index {
                return None;
            }
            let name = self.name;
            Some(hook(
                move |ctx: &mut IndexCtx, config: &Config, proceed: Proceed<'_, IndexCtx>| {
                    Box::pin(async move {
                        let seen = match ctx.plugins_data.get("order") {
                            Some(Value::String(s)) => format!("{},{}", s, name),
                            _ => name.to_string(),
                        };
                        ctx.plugins_data.insert("order".to_string(), Value::String(seen));
                        proceed.run(ctx, config).await
                    })
                },
            ))
        }

        fn post_hook(&self) -> Option<Hook<PostCtx>> {
            if !self.with_post {
                return None;
            }
            let name = self.name;
            Some(hook(
                move |ctx: &mut PostCtx, config: &Config, proceed: Proceed<'_, PostCtx>| {
                    Box::pin(async move {
                        ctx.plugins_data.insert(name.to_string(), Value::Bool(true));
                        proceed.run(ctx, config).await
                    })
                },
            ))
        }
    }

    fn plugin(name: &'static str, with_index: bool, with_post: bool) -> Arc<dyn Plugin> {
        Arc::new(MarkerPlugin {
            name,
            with_index,
            with_post,
            fail_init: false,
        })
    }

    #[ntex::test]
    async fn test_registration_order_is_chain_order() {
        let config = test_config();
        let mut registry = PluginRegistry::new();
        // Interleave hook kinds across registrations; the index chain must
        // still see first/third in registration order.
        registry.register(plugin("first", true, false));
        registry.register(plugin("second", false, true));
        registry.register(plugin("third", true, true));

        let mut ctx = IndexCtx {
            locale: "en".to_string(),
            posts: vec![],
            plugins_data: PluginsData::new(),
        };
        registry.index_chain().run(&mut ctx, &config).await.unwrap();
        assert_eq!(
            ctx.plugins_data.get("order").unwrap(),
            &Value::String("first,third".to_string())
        );
    }

    #[ntex::test]
    async fn test_chains_are_independent() {
        let config = test_config();
        let mut registry = PluginRegistry::new();
        registry.register(plugin("only-post", false, true));

        // Nothing registered an index hook, so the index chain is a no-op.
        let mut ctx = IndexCtx {
            locale: "en".to_string(),
            posts: vec![],
            plugins_data: PluginsData::new(),
        };
        registry.index_chain().run(&mut ctx, &config).await.unwrap();
        assert!(ctx.plugins_data.is_empty());
    }

    #[test]
    fn test_failed_initialize_keeps_hooks() {
        let config = test_config();
        let mut registry = PluginRegistry::new();
        registry.register(Arc::new(MarkerPlugin {
            name: "broken",
            with_index: true,
            with_post: false,
            fail_init: true,
        }));

        let snapshot = PluginSnapshot {
            config: &config,
            posts: vec![],
            pages: vec![],
        };
        // Must not panic or abort; the failure is only logged.
        registry.initialize_all(&snapshot);
        assert_eq!(registry.post_renderers().len(), 0);
    }
}

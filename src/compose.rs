use std::cell::Cell;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::config::Config;
use crate::error::HookError;

/// Boxed future of one middleware step. A request never leaves the worker
/// thread that accepted it, so hook futures do not need to be `Send`.
pub type HookFuture<'a> = Pin<Box<dyn Future<Output = Result<(), HookError>> + 'a>>;

/// One middleware link. It may inspect or mutate the context, then hand
/// control to the rest of the chain through `proceed`.
pub type Hook<T> =
    Arc<dyn for<'a> Fn(&'a mut T, &'a Config, Proceed<'a, T>) -> HookFuture<'a> + Send + Sync>;

/// Wraps a middleware closure as a shareable hook value.
pub fn hook<T, F>(f: F) -> Hook<T>
where
    F: for<'a> Fn(&'a mut T, &'a Config, Proceed<'a, T>) -> HookFuture<'a> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Continuation handed to each hook. Calling it a second time within one
/// invocation is a middleware bug, answered with `HookError::ReentrantProceed`
/// and the whole chain aborts with that error.
pub struct Proceed<'a, T> {
    hooks: &'a [Hook<T>],
    index: usize,
    dispatched: &'a Cell<usize>,
    tail: Option<&'a Proceed<'a, T>>,
}

impl<'a, T> Proceed<'a, T> {
    pub fn run<'b>(&'b self, ctx: &'b mut T, config: &'b Config) -> HookFuture<'b> {
        dispatch(self.hooks, self.index, self.dispatched, self.tail, ctx, config)
    }
}

fn dispatch<'a, T>(
    hooks: &'a [Hook<T>],
    index: usize,
    dispatched: &'a Cell<usize>,
    tail: Option<&'a Proceed<'a, T>>,
    ctx: &'a mut T,
    config: &'a Config,
) -> HookFuture<'a> {
    Box::pin(async move {
        if index < dispatched.get() {
            return Err(HookError::ReentrantProceed);
        }
        dispatched.set(index + 1);

        if let Some(hook) = hooks.get(index) {
            let proceed = Proceed {
                hooks,
                index: index + 1,
                dispatched,
                tail,
            };
            (hook.as_ref())(ctx, config, proceed).await
        } else if let Some(tail) = tail {
            tail.run(ctx, config).await
        } else {
            Ok(())
        }
    })
}

/// An ordered middleware chain with onion semantics: hook N runs before hook
/// N+1 and regains control after it. A hook that never calls `proceed` skips
/// the rest of the chain; a hook that fails aborts it.
pub struct Chain<T> {
    hooks: Arc<[Hook<T>]>,
}

impl<T: 'static> Chain<T> {
    pub fn new(hooks: Vec<Hook<T>>) -> Chain<T> {
        Chain {
            hooks: hooks.into(),
        }
    }

    pub async fn run(&self, ctx: &mut T, config: &Config) -> Result<(), HookError> {
        let dispatched = Cell::new(0);
        dispatch(self.hooks.as_ref(), 0, &dispatched, None, ctx, config).await
    }

    /// The whole chain as a single hook, so chains nest inside other chains.
    /// Its own `proceed` runs exactly once, after the innermost link.
    pub fn into_hook(self) -> Hook<T> {
        hook(move |ctx: &mut T, config: &Config, proceed: Proceed<'_, T>| {
            let hooks = Arc::clone(&self.hooks);
            Box::pin(async move {
                let dispatched = Cell::new(0);
                dispatch(hooks.as_ref(), 0, &dispatched, Some(&proceed), ctx, config).await
            })
        })
    }
}

/// Composes `hooks` into one middleware, preserving registration order. An
/// empty chain composes to a pass-through that only runs its caller's
/// continuation.
pub fn compose<T: 'static>(hooks: Vec<Hook<T>>) -> Hook<T> {
    Chain::new(hooks).into_hook()
}

/// Runs a single hook with a terminal no-op continuation.
pub async fn invoke<T>(hook: &Hook<T>, ctx: &mut T, config: &Config) -> Result<(), HookError> {
    let dispatched = Cell::new(0);
    let end = Proceed {
        hooks: &[],
        index: 0,
        dispatched: &dispatched,
        tail: None,
    };
    (hook.as_ref())(ctx, config, end).await
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::test_data::test_config;

    use super::*;

    fn push_hook(before: &'static str, after: &'static str) -> Hook<Vec<String>> {
        hook(move |ctx: &mut Vec<String>, config: &Config, proceed: Proceed<'_, Vec<String>>| {
            Box::pin(async move {
                ctx.push(before.to_string());
                proceed.run(ctx, config).await?;
                ctx.push(after.to_string());
                Ok(())
            })
        })
    }

    #[ntex::test]
    async fn test_onion_order() {
        let config = test_config();
        let chain = Chain::new(vec![push_hook("a", "a-after"), push_hook("b", "b-after")]);

        let mut log: Vec<String> = vec![];
        chain.run(&mut log, &config).await.unwrap();
        assert_eq!(log, vec!["a", "b", "b-after", "a-after"]);
    }

    #[ntex::test]
    async fn test_empty_chain_is_noop() {
        let config = test_config();
        let chain: Chain<Vec<String>> = Chain::new(vec![]);

        let mut log: Vec<String> = vec![];
        chain.run(&mut log, &config).await.unwrap();
        assert!(log.is_empty());
    }

    #[ntex::test]
    async fn test_composed_empty_chain_is_pass_through() {
        let config = test_config();
        // The composed empty chain sits in front of a counting hook; its only
        // effect must be running that continuation exactly once.
        let chain = Chain::new(vec![compose(vec![]), push_hook("next", "next-after")]);

        let mut log: Vec<String> = vec![];
        chain.run(&mut log, &config).await.unwrap();
        assert_eq!(log, vec!["next", "next-after"]);
    }

    #[ntex::test]
    async fn test_composed_chain_nests() {
        let config = test_config();
        let inner = compose(vec![push_hook("i1", "i1-after"), push_hook("i2", "i2-after")]);
        let chain = Chain::new(vec![push_hook("outer", "outer-after"), inner]);

        let mut log: Vec<String> = vec![];
        chain.run(&mut log, &config).await.unwrap();
        assert_eq!(log, vec!["outer", "i1", "i2", "i2-after", "i1-after", "outer-after"]);
    }

    #[ntex::test]
    async fn test_reentrant_proceed() {
        let config = test_config();
        let double = hook(
            |ctx: &mut Vec<String>, config: &Config, proceed: Proceed<'_, Vec<String>>| {
                Box::pin(async move {
                    ctx.push("double".to_string());
                    proceed.run(ctx, config).await?;
                    proceed.run(ctx, config).await?;
                    ctx.push("unreachable".to_string());
                    Ok(())
                })
            },
        );
        let chain = Chain::new(vec![double, push_hook("b", "b-after")]);

        let mut log: Vec<String> = vec![];
        let err = chain.run(&mut log, &config).await.unwrap_err();
        assert!(matches!(err, HookError::ReentrantProceed));
        // Downstream ran once; nothing ran a second time.
        assert_eq!(log, vec!["double", "b", "b-after"]);
    }

    #[ntex::test]
    async fn test_failure_aborts_chain() {
        let config = test_config();
        let failing = hook(
            |ctx: &mut Vec<String>, _config: &Config, _proceed: Proceed<'_, Vec<String>>| {
                Box::pin(async move {
                    ctx.push("failing".to_string());
                    Err(HookError::Failed(anyhow::anyhow!("boom")))
                })
            },
        );
        let chain = Chain::new(vec![push_hook("a", "a-after"), failing, push_hook("c", "c-after")]);

        let mut log: Vec<String> = vec![];
        let err = chain.run(&mut log, &config).await.unwrap_err();
        assert!(matches!(err, HookError::Failed(_)));
        // The failure propagates out through "a", so its after-part is skipped
        // and "c" never starts.
        assert_eq!(log, vec!["a", "failing"]);
    }

    #[ntex::test]
    async fn test_hook_may_stop_the_chain() {
        let config = test_config();
        let stopper = hook(
            |ctx: &mut Vec<String>, _config: &Config, _proceed: Proceed<'_, Vec<String>>| {
                Box::pin(async move {
                    ctx.push("stop".to_string());
                    Ok(())
                })
            },
        );
        let chain = Chain::new(vec![stopper, push_hook("b", "b-after")]);

        let mut log: Vec<String> = vec![];
        chain.run(&mut log, &config).await.unwrap();
        assert_eq!(log, vec!["stop"]);
    }

    #[ntex::test]
    async fn test_order_survives_suspension() {
        let config = test_config();
        let sleepy = hook(
            |ctx: &mut Vec<String>, config: &Config, proceed: Proceed<'_, Vec<String>>| {
                Box::pin(async move {
                    tokio::time::sleep(Duration::from_millis(5)).await;
                    ctx.push("sleepy".to_string());
                    proceed.run(ctx, config).await?;
                    ctx.push("sleepy-after".to_string());
                    Ok(())
                })
            },
        );
        let chain = Chain::new(vec![sleepy, push_hook("b", "b-after")]);

        let mut log: Vec<String> = vec![];
        chain.run(&mut log, &config).await.unwrap();
        assert_eq!(log, vec!["sleepy", "b", "b-after", "sleepy-after"]);
    }

    #[ntex::test]
    async fn test_invoke_guards_terminal_continuation() {
        let config = test_config();
        let greedy = hook(
            |ctx: &mut Vec<String>, config: &Config, proceed: Proceed<'_, Vec<String>>| {
                Box::pin(async move {
                    ctx.push("greedy".to_string());
                    proceed.run(ctx, config).await?;
                    proceed.run(ctx, config).await?;
                    Ok(())
                })
            },
        );

        let mut log: Vec<String> = vec![];
        let err = invoke(&greedy, &mut log, &config).await.unwrap_err();
        assert!(matches!(err, HookError::ReentrantProceed));
        assert_eq!(log, vec!["greedy"]);
    }
}

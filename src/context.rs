use crate::{
    config::Config, overseerr, persistent_state::PersistentState, volatile_state::VolatileState,
};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Application state constructed once at startup and shared by the gateway
/// handler, the poll task, and the webhook relay task.
pub struct Shared {
    pub cfg: RwLock<Config>,
    pub pstate: RwLock<PersistentState>,
    pub vstate: RwLock<VolatileState>,
    pub overseerr: overseerr::Client,
}

impl Shared {
    pub fn new(
        cfg: Config,
        pstate: PersistentState,
        vstate: VolatileState,
        overseerr: overseerr::Client,
    ) -> Arc<Self> {
        Arc::new(Self {
            cfg: RwLock::new(cfg),
            pstate: RwLock::new(pstate),
            vstate: RwLock::new(vstate),
            overseerr,
        })
    }

    pub fn ctx<'a>(&'a self, discord_ctx: &'a CacheHttp) -> Context<'a> {
        Context {
            pstate: &self.pstate,
            vstate: &self.vstate,
            overseerr: &self.overseerr,
            cache: &discord_ctx.cache,
            http: &discord_ctx.http,
            cache_http: discord_ctx,
        }
    }
}

/// Collection of data that is shared across events
pub struct Context<'a> {
    // Overbot's own context types
    pub pstate: &'a RwLock<PersistentState>,
    pub vstate: &'a RwLock<VolatileState>,
    pub overseerr: &'a overseerr::Client,
    // Discord/Serenity context types
    pub cache: &'a Arc<serenity::all::Cache>,
    pub http: &'a Arc<serenity::all::Http>,
    pub cache_http: &'a CacheHttp,
}

/// Many Serenity functions take a `impl CacheHttp` in order to first check the cache if the item
/// is available and fall back to an http request otherwise.  The most readily available type that
/// impl's this is named very differently in a way that could be confusing, and so we alias it.
pub type CacheHttp = serenity::all::Context;

use std::collections::HashMap;
use std::sync::Arc;

use crate::api::{ApiClient, ApiError, Transport};
use crate::cache::BuilderCache;
use crate::config::Config;
use crate::nav::{Document, EntityTag, ViewContext, ViewKey, ViewState};
use crate::render;
use crate::resolver::Resolver;
use crate::status::StatusPolicy;

/// One interactive browsing session: configuration, API client, the
/// builder cache and every currently open view. All fetching runs through
/// here, strictly sequentially, ancestors first.
pub struct Session {
    config: Config,
    client: ApiClient,
    policy: StatusPolicy,
    builders: BuilderCache,
    views: HashMap<ViewKey, ViewState>,
}

impl Session {
    pub fn new(config: Config, transport: Arc<dyn Transport>) -> Self {
        let client = ApiClient::new(&config.host, transport);
        Self {
            config,
            client,
            policy: StatusPolicy::default(),
            builders: BuilderCache::new(),
            views: HashMap::new(),
        }
    }

    pub fn with_policy(mut self, policy: StatusPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Fills the builder cache, once, before any name resolution. Skipping
    /// this is legal; every lookup then degrades to the unknown sentinel.
    pub async fn init_builders(&mut self) -> Result<(), ApiError> {
        let builders = self.client.builders().await?;
        tracing::debug!(count = builders.len(), "builder cache loaded");
        self.builders.load(builders);
        Ok(())
    }

    pub fn builders(&self) -> &BuilderCache {
        &self.builders
    }

    pub fn view(&self, key: &ViewKey) -> Option<&ViewState> {
        self.views.get(key)
    }

    pub fn open_view_count(&self) -> usize {
        self.views.len()
    }

    fn resolver(&self) -> Resolver<'_> {
        Resolver::new(&self.client, &self.config, &self.policy)
    }

    /// Entry point: browse one revision's builds across branches.
    pub async fn open_revision(&mut self, revision: &str) -> Result<&ViewState, ApiError> {
        self.open(ViewKey::Revision(revision.to_string()), ViewContext::default(), false)
            .await
    }

    /// Entry point: browse a branch's recent changes.
    pub async fn open_branch(&mut self, branch: &str) -> Result<&ViewState, ApiError> {
        self.open(ViewKey::Branch(branch.to_string()), ViewContext::default(), false)
            .await
    }

    /// Opens or refreshes a view. Singleton law: an already-open identity
    /// with `force = false` is reused verbatim, zero fetches. Otherwise a
    /// full resolve-and-render cycle runs; the stored view is only replaced
    /// once that cycle has succeeded, so a failed refresh leaves the
    /// previous content intact.
    pub async fn open(
        &mut self,
        key: ViewKey,
        ctx: ViewContext,
        force: bool,
    ) -> Result<&ViewState, ApiError> {
        if !force && self.views.contains_key(&key) {
            return Ok(&self.views[&key]);
        }
        let (doc, ctx) = self.resolve(&key, ctx).await?;
        self.views.insert(
            key.clone(),
            ViewState {
                key: key.clone(),
                ctx,
                doc,
            },
        );
        Ok(&self.views[&key])
    }

    /// Re-runs the resolve for an open view, same identity, same ancestor
    /// context. An unknown key behaves like a fresh open.
    pub async fn reload(&mut self, key: &ViewKey) -> Result<&ViewState, ApiError> {
        let ctx = self
            .views
            .get(key)
            .map(|view| view.ctx.clone())
            .unwrap_or_default();
        self.open(key.clone(), ctx, true).await
    }

    /// Follows a tag out of an open view: the new view inherits the source
    /// view's ancestor context with the tagged entity slotted in.
    pub async fn drill_down(
        &mut self,
        from: &ViewKey,
        tag: &EntityTag,
    ) -> Result<&ViewState, ApiError> {
        let ctx = self
            .views
            .get(from)
            .map_or_else(|| ViewContext::default().with_tag(tag), |v| v.ctx.with_tag(tag));
        self.open(tag.key(), ctx, false).await
    }

    /// One-shot listing of a builder's recent builds, addressed by name
    /// through the cache. Not a drill-down state; the result is handed to
    /// the caller without registering a view.
    pub async fn builder_overview(&self, name: &str) -> Result<Document, ApiError> {
        // A name miss degrades like any other cache miss, it does not error.
        let Some(builder_id) = self.builders.by_name(name).map(|b| b.builder_id) else {
            let mut doc = Document::new(format!("builder {name}"));
            doc.push(crate::nav::Element::plain(crate::cache::UNKNOWN_BUILDER));
            return Ok(doc);
        };
        let builds = self.resolver().resolve_builder_builds(builder_id).await?;
        Ok(render::builder_builds(name, &builds, &self.builders))
    }

    /// Resolve-and-render for one view kind. Requests run strictly one
    /// after another, root context before children, so a rendered view
    /// never shows partially resolved ancestors.
    async fn resolve(
        &self,
        key: &ViewKey,
        mut ctx: ViewContext,
    ) -> Result<(Document, ViewContext), ApiError> {
        let resolver = self.resolver();
        match key {
            ViewKey::Branch(name) => {
                ctx.branch = Some(name.clone());
                let changes = resolver.resolve_branch(name).await?;
                Ok((render::branch(name, &changes, &self.builders), ctx))
            }
            ViewKey::Revision(revision) => {
                let (info, groups) = resolver.resolve_revision(revision).await?;
                let doc = render::revision(&info, &groups, &self.builders);
                ctx.revision = Some(info);
                Ok((doc, ctx))
            }
            ViewKey::Build(build_id) => {
                // The build record itself is the missing ancestor when the
                // view is opened bare; fetch it before the steps.
                let build = match ctx.build.take().filter(|b| b.build_id == *build_id) {
                    Some(build) => build,
                    None => resolver.resolve_build(*build_id).await?,
                };
                let steps = resolver.resolve_steps(*build_id).await?;
                let doc = render::build(&build, &steps, &self.builders);
                ctx.build = Some(build);
                Ok((doc, ctx))
            }
            ViewKey::Step(step_id) => {
                let step = match ctx.step.take().filter(|s| s.step_id == *step_id) {
                    Some(step) => step,
                    None => {
                        let build_id = ctx
                            .build
                            .as_ref()
                            .map(|b| b.build_id)
                            .ok_or(ApiError::NotFound(*step_id))?;
                        resolver
                            .resolve_steps(build_id)
                            .await?
                            .into_iter()
                            .find(|s| s.step_id == *step_id)
                            .ok_or(ApiError::NotFound(*step_id))?
                    }
                };
                let logs = resolver.resolve_logs(*step_id).await?;
                let doc = render::step(&step, &logs);
                ctx.step = Some(step);
                Ok((doc, ctx))
            }
            ViewKey::Log(log_id) => {
                let name = ctx
                    .log
                    .as_ref()
                    .filter(|l| l.log_id == *log_id)
                    .map_or_else(|| format!("#{log_id}"), |l| l.name.clone());
                let content = resolver.resolve_log_text(*log_id).await?;
                Ok((render::log(&name, &content), ctx))
            }
        }
    }
}

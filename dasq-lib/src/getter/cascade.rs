use crate::{
    config::CascadeConfig,
    context::Context,
    dah::DataAvailabilityHeader,
    eds::ExtendedDataSquare,
    errors::DasqError,
    getter::Getter,
    namespaced_shares::NamespacedShares,
    share::{Namespace, Share},
};
use async_trait::async_trait;
use futures::future::BoxFuture;
use std::sync::Arc;
use tracing::debug;

/// Getter trying several sources in priority order. A source is skipped on a miss, i.e. an error for which
/// `DasqError::is_recoverable` holds; any other error, such as failed verification, is returned straight away.
pub struct CascadeGetter {
    getters: Vec<Arc<dyn Getter>>,
    config: CascadeConfig,
}

impl CascadeGetter {
    pub fn new(getters: Vec<Arc<dyn Getter>>) -> Result<Self, DasqError> {
        Self::with_config(getters, CascadeConfig::default())
    }

    pub fn with_config(getters: Vec<Arc<dyn Getter>>, config: CascadeConfig) -> Result<Self, DasqError> {
        if getters.is_empty() {
            return Err(DasqError::InvalidConfig("cascade getter needs at least one source".to_string()));
        }
        config.validate()?;

        Ok(CascadeGetter { getters, config })
    }

    async fn cascade<'a, T, F>(&'a self, ctx: &Context, mut call: F) -> Result<T, DasqError>
    where
        F: FnMut(&'a dyn Getter) -> BoxFuture<'a, Result<T, DasqError>>,
    {
        let mut last_err = None;

        for attempt in 0..self.config.attempts.max(1) {
            if attempt > 0 {
                ctx.run(async {
                    tokio::time::sleep(self.config.backoff).await;
                    Ok(())
                })
                .await?;
            }

            for (source, getter) in self.getters.iter().enumerate() {
                match call(getter.as_ref()).await {
                    Ok(value) => return Ok(value),
                    Err(err) if err.is_recoverable() => {
                        debug!(attempt, source, %err, "source missed, trying next");
                        last_err = Some(err);
                    }
                    Err(err) => return Err(err),
                }
            }
        }

        // Sources are never empty, so every round records a miss before getting here
        Err(last_err.unwrap_or_else(|| DasqError::InvalidConfig("cascade getter has no sources".to_string())))
    }
}

#[async_trait]
impl Getter for CascadeGetter {
    #[tracing::instrument(skip_all, fields(row = row, col = col, sources = self.getters.len()))]
    async fn get_share(&self, ctx: &Context, dah: &DataAvailabilityHeader, row: usize, col: usize) -> Result<Share, DasqError> {
        self.cascade(ctx, |getter| getter.get_share(ctx, dah, row, col)).await
    }

    #[tracing::instrument(skip_all, fields(namespace = ?namespace, sources = self.getters.len()))]
    async fn get_shares_by_namespace(&self, ctx: &Context, dah: &DataAvailabilityHeader, namespace: Namespace) -> Result<NamespacedShares, DasqError> {
        self.cascade(ctx, |getter| getter.get_shares_by_namespace(ctx, dah, namespace)).await
    }

    #[tracing::instrument(skip_all, fields(width = dah.square_width(), sources = self.getters.len()))]
    async fn get_eds(&self, ctx: &Context, dah: &DataAvailabilityHeader) -> Result<ExtendedDataSquare, DasqError> {
        self.cascade(ctx, |getter| getter.get_eds(ctx, dah)).await
    }
}

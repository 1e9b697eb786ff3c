use crate::{config::SamplerConfig, context::Context, dah::DataAvailabilityHeader, errors::DasqError, getter::Getter};
use async_trait::async_trait;
use std::{collections::HashMap, sync::Arc};
use tokio::{
    sync::{Semaphore, watch},
    task::JoinSet,
};
use tracing::{debug, info, warn};

/// Decides whether the square committed to by a header is available.
#[async_trait]
pub trait Availability: Send + Sync {
    /// Returns `Ok(())` iff the square is deemed available. Otherwise `DasqError::Unavailable` lists the coordinates which
    /// couldn't be retrieved.
    async fn shares_available(&self, ctx: &Context, dah: &DataAvailabilityHeader) -> Result<(), DasqError>;
}

/// Progress of a light availability check, observable while it runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SamplingState {
    Idle,
    Sampling,
    Available,
    Unavailable,
}

/// Light node availability check: retrieves a fixed number of uniformly random shares, each of which the getter verifies
/// against the header, and declares the square available iff all of them are retrieved. Withholding enough of the square
/// to prevent its reconstruction makes a single sample fail with probability at least 1/4, hence confidence grows
/// exponentially with the number of samples, independent of square size.
pub struct LightAvailability<G> {
    getter: Arc<G>,
    config: SamplerConfig,
    state: watch::Sender<SamplingState>,
}

impl<G: Getter + 'static> LightAvailability<G> {
    pub fn new(getter: Arc<G>) -> Self {
        LightAvailability {
            getter,
            config: SamplerConfig::default(),
            state: watch::Sender::new(SamplingState::Idle),
        }
    }

    pub fn with_config(getter: Arc<G>, config: SamplerConfig) -> Result<Self, DasqError> {
        config.validate()?;

        Ok(LightAvailability {
            getter,
            config,
            state: watch::Sender::new(SamplingState::Idle),
        })
    }

    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// State of the latest availability check.
    pub fn state(&self) -> SamplingState {
        *self.state.borrow()
    }

    /// Receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<SamplingState> {
        self.state.subscribe()
    }

    fn finish(&self, sampled: usize, mut failed: Vec<(usize, usize)>) -> Result<(), DasqError> {
        if failed.is_empty() {
            self.state.send_replace(SamplingState::Available);
            info!(sampled, "square available");
            return Ok(());
        }

        failed.sort_unstable();
        self.state.send_replace(SamplingState::Unavailable);
        info!(sampled, failed = failed.len(), "square unavailable");

        Err(DasqError::Unavailable { sampled, failed })
    }
}

/// Picks `count` distinct coordinates of a `width x width` square uniformly at random, capped at the number of cells.
fn random_coordinates(width: usize, count: usize) -> Vec<(usize, usize)> {
    let cells = width * width;

    rand::seq::index::sample(&mut rand::rng(), cells, count.min(cells))
        .into_iter()
        .map(|idx| (idx / width, idx % width))
        .collect()
}

#[async_trait]
impl<G: Getter + 'static> Availability for LightAvailability<G> {
    #[tracing::instrument(skip_all, fields(width = dah.square_width()))]
    async fn shares_available(&self, ctx: &Context, dah: &DataAvailabilityHeader) -> Result<(), DasqError> {
        if dah.is_empty() {
            self.state.send_replace(SamplingState::Unavailable);
            return Err(DasqError::Unavailable {
                sampled: 0,
                failed: Vec::new(),
            });
        }

        self.state.send_replace(SamplingState::Sampling);

        let coordinates = random_coordinates(dah.square_width(), self.config.sample_count);
        let sampled = coordinates.len();
        let dah = Arc::new(dah.clone());
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrency));

        let mut tasks = JoinSet::new();
        let mut pending = HashMap::with_capacity(sampled);

        for (row, col) in coordinates {
            let getter = self.getter.clone();
            let dah = dah.clone();
            let semaphore = semaphore.clone();
            let ctx = ctx.clone();
            let sample_timeout = self.config.sample_timeout;

            let handle = tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await.map_err(|_| DasqError::Cancelled)?;
                let sample_ctx = ctx.with_timeout(sample_timeout);

                sample_ctx.run(getter.get_share(&sample_ctx, &dah, row, col)).await
            });
            pending.insert(handle.id(), (row, col));
        }

        let mut failed = Vec::new();
        let collected = ctx
            .run(async {
                while let Some(joined) = tasks.join_next_with_id().await {
                    let (id, res) = match joined {
                        Ok((id, res)) => (id, res.map(|_| ())),
                        Err(err) => (err.id(), Err(DasqError::Cancelled)),
                    };

                    let Some((row, col)) = pending.remove(&id) else {
                        continue;
                    };
                    if let Err(err) = res {
                        debug!(row, col, %err, "sample failed");
                        failed.push((row, col));
                    }
                }

                Ok(())
            })
            .await;

        if let Err(err) = collected {
            warn!(%err, outstanding = pending.len(), "sampling interrupted");
            tasks.abort_all();
            failed.extend(pending.into_values());
        }

        self.finish(sampled, failed)
    }
}

/// Full node availability check: the square is available iff it can be entirely reconstructed and matches the header.
pub struct FullAvailability<G> {
    getter: Arc<G>,
}

impl<G: Getter> FullAvailability<G> {
    pub fn new(getter: Arc<G>) -> Self {
        FullAvailability { getter }
    }
}

#[async_trait]
impl<G: Getter> Availability for FullAvailability<G> {
    #[tracing::instrument(skip_all, fields(width = dah.square_width()))]
    async fn shares_available(&self, ctx: &Context, dah: &DataAvailabilityHeader) -> Result<(), DasqError> {
        let cells = dah.square_width() * dah.square_width();
        if cells == 0 {
            return Err(DasqError::Unavailable {
                sampled: 0,
                failed: Vec::new(),
            });
        }

        match self.getter.get_eds(ctx, dah).await {
            Ok(_) => {
                info!(cells, "square reconstructed");
                Ok(())
            }
            Err(DasqError::ShareUnavailable(row, col)) => Err(DasqError::Unavailable {
                sampled: cells,
                failed: vec![(row, col)],
            }),
            Err(err) => Err(err),
        }
    }
}

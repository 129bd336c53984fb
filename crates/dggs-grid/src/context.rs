//! Caller-owned lookup table of family providers.

use std::collections::HashMap;

use tracing::debug;

use dggs_common::{AreaMetric, DggsError, DggsFamily, DggsResult};

use crate::families::{
    GeohashProvider, H3Provider, Isea4tProvider, OlcProvider, QtmProvider, QuadkeyProvider,
    RhealpixProvider, S2Provider, TilecodeProvider,
};
use crate::provider::GridProvider;

/// Maps each [`DggsFamily`] to the provider that serves it.
///
/// Build one per run (or share one read-only) and pass it to the resampling
/// core. Registering a provider for a family that already has one replaces
/// it, which is how callers plug in generators for families without a
/// bundled one.
#[derive(Default)]
pub struct DggsContext {
    providers: HashMap<DggsFamily, Box<dyn GridProvider>>,
}

impl DggsContext {
    /// An empty context with no providers.
    pub fn new() -> Self {
        Self::default()
    }

    /// A context with the bundled provider of every family.
    pub fn with_default_providers() -> Self {
        let mut context = Self::new();
        context.register(H3Provider);
        context.register(S2Provider);
        context.register(RhealpixProvider);
        context.register(Isea4tProvider);
        context.register(QtmProvider);
        context.register(OlcProvider);
        context.register(GeohashProvider);
        context.register(TilecodeProvider);
        context.register(QuadkeyProvider);
        context
    }

    /// Register `provider` under its own family, replacing any previous one.
    pub fn register(&mut self, provider: impl GridProvider + 'static) {
        let family = provider.family();
        if self.providers.insert(family, Box::new(provider)).is_some() {
            debug!(family = %family, "Replaced DGGS provider");
        }
    }

    /// Provider for `family`, or `UnsupportedFamily` when none is registered.
    pub fn provider(&self, family: DggsFamily) -> DggsResult<&dyn GridProvider> {
        self.providers
            .get(&family)
            .map(|provider| provider.as_ref())
            .ok_or_else(|| DggsError::UnsupportedFamily(family.to_string()))
    }

    /// Registered families in canonical order.
    pub fn families(&self) -> Vec<DggsFamily> {
        DggsFamily::ALL
            .iter()
            .copied()
            .filter(|family| self.providers.contains_key(family))
            .collect()
    }

    pub fn decode(&self, family: DggsFamily, id: &str) -> DggsResult<u8> {
        self.provider(family)?.decode(id)
    }

    pub fn area_metric(&self, family: DggsFamily, resolution: u8) -> DggsResult<AreaMetric> {
        self.provider(family)?.area_metric(resolution)
    }

    pub fn valid_resolutions(&self, family: DggsFamily) -> DggsResult<Vec<u8>> {
        Ok(self.provider(family)?.valid_resolutions())
    }
}

impl std::fmt::Debug for DggsContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DggsContext")
            .field("families", &self.families())
            .finish()
    }
}

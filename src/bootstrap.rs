//! Explicit object-graph construction: one function builds every shared
//! component from an `ExchangeConfig` and spawns the pipeline. No global or
//! static state anywhere in this crate; a caller that wants a second,
//! independent exchange in the same process just calls `build` again.

use std::sync::Arc;

use crate::config::ExchangeConfig;
use crate::fees::FeeEngine;
use crate::models::team::TeamDirectory;
use crate::phase::PhaseSource;
use crate::phase_poller::PhasePoller;
use crate::pipeline::Pipeline;
use crate::positions::PositionStore;
use crate::response::ResponseCoordinator;
use crate::validation::ConstraintValidator;
use crate::venue::ExchangeVenue;

/// Every long-lived shared component, plus the running pipeline and phase
/// poller. Dropping this without calling `shutdown` leaks the worker
/// threads (they block forever on their input queue or wake on a cadence
/// forever), so callers that tear down should always call
/// `exchange.shutdown()` rather than dropping the struct directly.
pub struct Exchange {
    pub venue: Arc<ExchangeVenue>,
    pub validator: Arc<ConstraintValidator>,
    pub positions: Arc<PositionStore>,
    pub coordinator: Arc<ResponseCoordinator>,
    pub teams: Arc<TeamDirectory>,
    pub fees: Arc<FeeEngine>,
    pub pipeline: Pipeline,
    pub phase_poller: PhasePoller,
}

impl Exchange {
    /// Stop the pipeline first so no new fills are produced, then stop the
    /// phase poller.
    pub fn shutdown(self) {
        self.pipeline.shutdown();
        self.phase_poller.shutdown();
    }
}

/// Wire up a complete exchange from configuration: register every
/// instrument and role's fees/constraints, then spawn the four pipeline
/// stages.
pub fn build(config: ExchangeConfig, phase_source: Arc<dyn PhaseSource>) -> Result<Exchange, crate::errors::ValidationError> {
    let venue = Arc::new(ExchangeVenue::new(phase_source.clone()));
    for instrument in &config.instruments.instruments {
        venue.register_instrument(instrument.symbol.clone());
    }

    let validator = Arc::new(ConstraintValidator::new());
    let mut fee_engine = FeeEngine::new();
    for role in &config.roles {
        validator.load_constraints(role.role.clone(), role.constraints.clone())?;
        fee_engine.register(role.role.clone(), role.fees);
    }
    let fees = Arc::new(fee_engine);

    let positions = Arc::new(PositionStore::new());
    let coordinator = Arc::new(ResponseCoordinator::new(config.coordinator.max_pending_requests));
    let teams = Arc::new(TeamDirectory::new());

    let pipeline = Pipeline::spawn(
        venue.clone(),
        validator.clone(),
        positions.clone(),
        coordinator.clone(),
        teams.clone(),
        fees.clone(),
    );

    let phase_poller = PhasePoller::spawn(venue.clone(), phase_source, config.cadence.phase_check_interval);

    Ok(Exchange {
        venue,
        validator,
        positions,
        coordinator,
        teams,
        fees,
        pipeline,
        phase_poller,
    })
}

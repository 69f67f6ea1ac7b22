use metrics_exporter_prometheus::PrometheusHandle;
use scorecard::config::ScoringConfig;
use scorecard::periods::PeriodService;
use scorecard::scorecards::bsc::BscScorecardService;
use scorecard::scorecards::mpm::MpmScorecardService;
use scorecard::store::memory::{
    InMemoryBscActualRepository, InMemoryBscIndicatorRepository, InMemoryMpmStore,
    InMemoryPeriodRepository,
};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type PeriodServiceHandle = Arc<PeriodService<InMemoryPeriodRepository>>;
pub(crate) type BscServiceHandle = Arc<
    BscScorecardService<
        InMemoryPeriodRepository,
        InMemoryBscIndicatorRepository,
        InMemoryBscActualRepository,
    >,
>;
pub(crate) type MpmServiceHandle = Arc<MpmScorecardService<InMemoryMpmStore>>;

/// Every service over one set of in-memory tables; all of them see the same periods.
pub(crate) struct Services {
    pub(crate) periods: PeriodServiceHandle,
    pub(crate) bsc: BscServiceHandle,
    pub(crate) mpm: MpmServiceHandle,
}

impl Services {
    pub(crate) fn in_memory(scoring: ScoringConfig) -> Self {
        let periods = InMemoryPeriodRepository::default();
        Self {
            periods: Arc::new(PeriodService::new(Arc::new(periods.clone()))),
            bsc: Arc::new(BscScorecardService::new(
                Arc::new(periods.clone()),
                Arc::new(InMemoryBscIndicatorRepository::default()),
                Arc::new(InMemoryBscActualRepository::default()),
            )),
            mpm: Arc::new(MpmScorecardService::new(
                Arc::new(InMemoryMpmStore::with_periods(periods)),
                scoring,
            )),
        }
    }
}

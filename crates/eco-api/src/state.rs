//! Shared handler state.

use std::sync::Arc;

use eco_service::OptimizationService;

use crate::geocode::Gazetteer;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<OptimizationService>,
    pub gazetteer: Arc<Gazetteer>,
}

impl AppState {
    /// Gazetteer built from the service's configured places.
    pub fn new(service: Arc<OptimizationService>) -> Self {
        let gazetteer = Arc::new(Gazetteer::from_places(&service.config().places));
        Self { service, gazetteer }
    }
}

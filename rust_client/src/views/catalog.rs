//! Crop catalogue.

use async_trait::async_trait;
use std::sync::Arc;

use super::state::{settle_items, Refresh, ViewState};
use crate::backend::{ApiResult, FullBackend};
use crate::models::{Crop, CropId};

pub struct CropCatalog {
    backend: Arc<dyn FullBackend>,
    pub crops: ViewState<Vec<Crop>>,
}

impl CropCatalog {
    pub fn new(backend: Arc<dyn FullBackend>) -> Self {
        Self {
            backend,
            crops: ViewState::Idle,
        }
    }

    pub fn find(&self, name: &str) -> Option<&Crop> {
        self.crops
            .items()
            .iter()
            .find(|crop| crop.name.eq_ignore_ascii_case(name))
    }

    pub fn name_of(&self, id: CropId) -> Option<&str> {
        self.crops
            .items()
            .iter()
            .find(|crop| crop.id == id)
            .map(|crop| crop.name.as_str())
    }
}

#[async_trait]
impl Refresh for CropCatalog {
    async fn refresh(&mut self) -> ApiResult<()> {
        self.crops = ViewState::Loading;
        let result = self.backend.list_crops().await;
        settle_items(&mut self.crops, result)
    }
}

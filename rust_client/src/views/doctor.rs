//! Crop doctor: upload a photo, get a diagnosis.

use std::sync::Arc;

use crate::backend::{ApiError, ApiResult, FullBackend};
use crate::models::{Diagnosis, ImageUpload};

pub struct DoctorView {
    backend: Arc<dyn FullBackend>,
    pub diagnosis: Option<Diagnosis>,
    pub alert: Option<String>,
    pub analyzing: bool,
}

impl DoctorView {
    pub fn new(backend: Arc<dyn FullBackend>) -> Self {
        Self {
            backend,
            diagnosis: None,
            alert: None,
            analyzing: false,
        }
    }

    /// Send the photo for analysis. The previous result is dropped first.
    pub async fn analyze(
        &mut self,
        image_bytes: Vec<u8>,
        file_name: &str,
    ) -> ApiResult<&Diagnosis> {
        self.diagnosis = None;
        let upload = ImageUpload::new(file_name, image_bytes);
        if upload.is_empty() {
            let e = ApiError::validation("Please choose a photo first");
            self.alert = Some(e.user_message());
            return Err(e);
        }

        self.analyzing = true;
        let outcome = self.backend.analyze(&upload).await;
        self.analyzing = false;
        match outcome {
            Ok(diagnosis) => {
                self.alert = None;
                Ok(self.diagnosis.insert(diagnosis))
            }
            Err(e) => {
                self.alert = Some(e.user_message());
                Err(e)
            }
        }
    }

    pub fn reset(&mut self) {
        self.diagnosis = None;
        self.alert = None;
    }
}

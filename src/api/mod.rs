use async_trait::async_trait;

use crate::config::Config;
use crate::errors::ApiError;
use crate::wire::ScheduleRecord;

pub mod http;

pub use http::HttpScheduleApi;

/// The remote schedule collection.
#[async_trait]
pub trait ScheduleApi: Send + Sync {
    async fn list(&self) -> Result<Vec<ScheduleRecord>, ApiError>;
    async fn create(&self, record: &ScheduleRecord) -> Result<ScheduleRecord, ApiError>;
    async fn delete(&self, id: &str) -> Result<(), ApiError>;
}

pub type DynScheduleApi = Box<dyn ScheduleApi + Send + Sync>;

pub fn make_api(cfg: &Config) -> Result<DynScheduleApi, ApiError> {
    Ok(Box::new(HttpScheduleApi::new(&cfg.schedules_url(), cfg.timeout_secs)?))
}

#[async_trait]
impl<T: ScheduleApi + ?Sized> ScheduleApi for Box<T> {
    async fn list(&self) -> Result<Vec<ScheduleRecord>, ApiError> {
        (**self).list().await
    }

    async fn create(&self, record: &ScheduleRecord) -> Result<ScheduleRecord, ApiError> {
        (**self).create(record).await
    }

    async fn delete(&self, id: &str) -> Result<(), ApiError> {
        (**self).delete(id).await
    }
}

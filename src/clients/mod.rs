use std::future::Future;

use anyhow::Result;

use crate::clients::models::common::DayOfWeek;
use crate::clients::models::requests::RoutinePayload;
use crate::clients::models::responses::{PaginatedRoutines, Routine, Stats};

pub mod models;
pub mod routines;

/// Everything the home screen needs from the routines server.
pub trait RoutineSource {
    fn list(
        &self,
        page: u32,
        page_size: u32,
        day: Option<DayOfWeek>,
    ) -> impl Future<Output = Result<PaginatedRoutines>> + Send;

    fn search(
        &self,
        term: &str,
        page: u32,
        page_size: u32,
        day: Option<DayOfWeek>,
    ) -> impl Future<Output = Result<PaginatedRoutines>> + Send;

    fn get(&self, routine_id: i64) -> impl Future<Output = Result<Routine>> + Send;

    fn create(&self, payload: &RoutinePayload) -> impl Future<Output = Result<Routine>> + Send;

    fn update(
        &self,
        routine_id: i64,
        payload: &RoutinePayload,
    ) -> impl Future<Output = Result<Routine>> + Send;

    fn delete(&self, routine_id: i64) -> impl Future<Output = Result<()>> + Send;

    fn duplicate(
        &self,
        routine_id: i64,
        new_name: Option<&str>,
    ) -> impl Future<Output = Result<Routine>> + Send;

    fn stats(&self) -> impl Future<Output = Result<Stats>> + Send;

    fn export(&self) -> impl Future<Output = Result<Vec<u8>>> + Send;
}

use anyhow::Result;
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;

use crate::clients::RoutineSource;
use crate::clients::models::common::{DayOfWeek, Exercise};
use crate::clients::models::requests::RoutinePayload;
use crate::clients::models::responses::{PaginatedRoutines, Routine, Stats};
use crate::config::Config;

const ROUTINES_ENDPOINT: &str = "rutinas";
const SEARCH_ENDPOINT: &str = "rutinas/buscar";
const STATS_ENDPOINT: &str = "rutinas/estadisticas";
const EXPORT_ENDPOINT: &str = "rutinas/export/csv";
const EXERCISES_ENDPOINT: &str = "rutinas/ejercicios";
const API_KEY_HEADER: &str = "X-API-Key";

#[derive(Clone)]
pub struct RoutinesClient {
    http: Client,
    base: Url,
    api_key: Option<String>,
}

impl RoutinesClient {
    pub fn new(config: &Config) -> Result<Self> {
        // Relative joins keep a path prefix such as `/api` only if the base ends with a slash.
        let mut base = Url::parse(&config.api_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        Ok(Self {
            http: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()?,
            base,
            api_key: config.api_key.clone(),
        })
    }

    pub async fn get_routines(
        &self,
        page: u32,
        page_size: u32,
        day: Option<DayOfWeek>,
    ) -> Result<PaginatedRoutines> {
        let mut url = self.base.join(ROUTINES_ENDPOINT)?;
        append_page_params(&mut url, page, page_size, day);

        tracing::debug!(page, page_size, day = ?day, "routines.list.request");

        let response = self.send(self.request(Method::GET, url)).await?;
        parse_json(response, "routines list").await
    }

    pub async fn search_routines(
        &self,
        term: &str,
        page: u32,
        page_size: u32,
        day: Option<DayOfWeek>,
    ) -> Result<PaginatedRoutines> {
        let mut url = self.base.join(SEARCH_ENDPOINT)?;
        url.query_pairs_mut().append_pair("nombre", term);
        append_page_params(&mut url, page, page_size, day);

        tracing::debug!(term = %term, page, page_size, day = ?day, "routines.search.request");

        let response = self.send(self.request(Method::GET, url)).await?;
        parse_json(response, "routines search").await
    }

    pub async fn get_routine(&self, routine_id: i64) -> Result<Routine> {
        let url = self
            .base
            .join(&format!("{}/{}", ROUTINES_ENDPOINT, routine_id))?;

        let response = self.send(self.request(Method::GET, url)).await?;
        parse_json(response, "routine").await
    }

    pub async fn create_routine(&self, payload: &RoutinePayload) -> Result<Routine> {
        let url = self.base.join(ROUTINES_ENDPOINT)?;

        tracing::debug!(
            name = %payload.name,
            exercise_count = payload.exercises.len(),
            "routines.create.request"
        );

        let response = self
            .send(self.request(Method::POST, url).json(payload))
            .await?;
        parse_json(response, "created routine").await
    }

    pub async fn update_routine(&self, routine_id: i64, payload: &RoutinePayload) -> Result<Routine> {
        let url = self
            .base
            .join(&format!("{}/{}", ROUTINES_ENDPOINT, routine_id))?;

        tracing::debug!(
            routine_id,
            name = %payload.name,
            exercise_count = payload.exercises.len(),
            "routines.update.request"
        );

        let response = self
            .send(self.request(Method::PUT, url).json(payload))
            .await?;
        parse_json(response, "updated routine").await
    }

    pub async fn delete_routine(&self, routine_id: i64) -> Result<()> {
        let url = self
            .base
            .join(&format!("{}/{}", ROUTINES_ENDPOINT, routine_id))?;

        self.send(self.request(Method::DELETE, url)).await?;
        tracing::debug!(routine_id, "routines.delete.done");
        Ok(())
    }

    /// Server-side copy. Without a name the server picks "<name> (Copia)".
    pub async fn duplicate_routine(&self, routine_id: i64, new_name: Option<&str>) -> Result<Routine> {
        let mut url = self
            .base
            .join(&format!("{}/{}/duplicar", ROUTINES_ENDPOINT, routine_id))?;
        if let Some(name) = new_name.map(str::trim).filter(|name| !name.is_empty()) {
            url.query_pairs_mut().append_pair("nuevo_nombre", name);
        }

        let response = self.send(self.request(Method::POST, url)).await?;
        parse_json(response, "duplicated routine").await
    }

    pub async fn get_stats(&self) -> Result<Stats> {
        let url = self.base.join(STATS_ENDPOINT)?;
        let response = self.send(self.request(Method::GET, url)).await?;
        parse_json(response, "stats").await
    }

    /// Raw CSV bytes, untouched.
    pub async fn export_csv(&self) -> Result<Vec<u8>> {
        let url = self.base.join(EXPORT_ENDPOINT)?;
        let response = self.send(self.request(Method::GET, url)).await?;
        let bytes = response.bytes().await?;

        tracing::debug!(size = bytes.len(), "routines.export.received");
        Ok(bytes.to_vec())
    }

    pub async fn add_exercise(&self, routine_id: i64, exercise: &Exercise) -> Result<Exercise> {
        let url = self
            .base
            .join(&format!("{}/{}/ejercicios", ROUTINES_ENDPOINT, routine_id))?;
        let response = self
            .send(self.request(Method::POST, url).json(exercise))
            .await?;
        parse_json(response, "created exercise").await
    }

    pub async fn update_exercise(&self, exercise_id: i64, exercise: &Exercise) -> Result<Exercise> {
        let url = self
            .base
            .join(&format!("{}/{}", EXERCISES_ENDPOINT, exercise_id))?;
        let response = self
            .send(self.request(Method::PUT, url).json(exercise))
            .await?;
        parse_json(response, "updated exercise").await
    }

    pub async fn delete_exercise(&self, exercise_id: i64) -> Result<()> {
        let url = self
            .base
            .join(&format!("{}/{}", EXERCISES_ENDPOINT, exercise_id))?;
        self.send(self.request(Method::DELETE, url)).await?;
        Ok(())
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.http.request(method, url);
        match &self.api_key {
            Some(key) => builder.header(API_KEY_HEADER, key),
            None => builder,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await?;
            return Err(anyhow::anyhow!(
                "API request failed with status {}: {}",
                status,
                body
            ));
        }

        Ok(response)
    }
}

fn append_page_params(url: &mut Url, page: u32, page_size: u32, day: Option<DayOfWeek>) {
    let mut pairs = url.query_pairs_mut();
    pairs
        .append_pair("page", &page.to_string())
        .append_pair("page_size", &page_size.to_string());
    if let Some(day) = day {
        pairs.append_pair("dia", day.as_str());
    }
}

async fn parse_json<T: DeserializeOwned>(response: Response, what: &str) -> Result<T> {
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| anyhow::anyhow!("Failed to parse {} response: {}", what, e))
}

impl RoutineSource for RoutinesClient {
    async fn list(
        &self,
        page: u32,
        page_size: u32,
        day: Option<DayOfWeek>,
    ) -> Result<PaginatedRoutines> {
        self.get_routines(page, page_size, day).await
    }

    async fn search(
        &self,
        term: &str,
        page: u32,
        page_size: u32,
        day: Option<DayOfWeek>,
    ) -> Result<PaginatedRoutines> {
        self.search_routines(term, page, page_size, day).await
    }

    async fn get(&self, routine_id: i64) -> Result<Routine> {
        self.get_routine(routine_id).await
    }

    async fn create(&self, payload: &RoutinePayload) -> Result<Routine> {
        self.create_routine(payload).await
    }

    async fn update(&self, routine_id: i64, payload: &RoutinePayload) -> Result<Routine> {
        self.update_routine(routine_id, payload).await
    }

    async fn delete(&self, routine_id: i64) -> Result<()> {
        self.delete_routine(routine_id).await
    }

    async fn duplicate(&self, routine_id: i64, new_name: Option<&str>) -> Result<Routine> {
        self.duplicate_routine(routine_id, new_name).await
    }

    async fn stats(&self) -> Result<Stats> {
        self.get_stats().await
    }

    async fn export(&self) -> Result<Vec<u8>> {
        self.export_csv().await
    }
}

//! Trip search and seat maps

use charrua_core::models::{Asiento, SeatMap, TripQuery, Viaje};
use charrua_core::{ApiResult, HttpRequest, TripId};

use super::ApiClient;

pub const TRIP_NOT_FOUND: &str = "Viaje no encontrado";

#[derive(Debug, Clone)]
pub struct TripService {
    client: ApiClient,
}

impl TripService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn search(&self, query: &TripQuery) -> ApiResult<Vec<Viaje>> {
        let request = HttpRequest::get("/viajes").with_query(query.to_query_pairs());
        self.client.send_json(request, &[]).await
    }

    pub async fn get(&self, id: TripId) -> ApiResult<Viaje> {
        self.client
            .send_json(
                HttpRequest::get(format!("/viajes/{}", id)),
                &[(404, TRIP_NOT_FOUND)],
            )
            .await
    }

    pub async fn seats(&self, id: TripId) -> ApiResult<SeatMap> {
        let asientos: Vec<Asiento> = self
            .client
            .send_json(
                HttpRequest::get(format!("/viajes/{}/asientos", id)),
                &[(404, TRIP_NOT_FOUND)],
            )
            .await?;
        Ok(SeatMap::new(id, asientos))
    }
}

//! Google Places nearby search adapter.

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::{PlannerError, PlannerResult};
use crate::geo::Coordinate;
use crate::upstream::http::{join_url, send_json};
use crate::upstream::types::{Candidate, PlaceRank, PlacesQuery, PlacesSearch};

#[derive(Debug, Deserialize)]
struct NearbyResponse {
    status: String,
    error_message: Option<String>,
    #[serde(default)]
    results: Vec<PlaceResult>,
}

#[derive(Debug, Deserialize)]
struct PlaceResult {
    #[serde(default)]
    name: String,
    geometry: PlaceGeometry,
}

#[derive(Debug, Deserialize)]
struct PlaceGeometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

/// HTTP client for the Places nearby search endpoint.
#[derive(Clone)]
pub struct GooglePlacesClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl GooglePlacesClient {
    pub fn new(client: reqwest::Client, base_url: &str, api_key: String) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
            api_key,
        }
    }
}

impl std::fmt::Debug for GooglePlacesClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GooglePlacesClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

fn nearby_params(query: &PlacesQuery) -> Vec<(&'static str, String)> {
    let mut params = vec![
        (
            "location",
            format!("{},{}", query.location.lat, query.location.lon),
        ),
        ("keyword", query.keyword.clone()),
        ("name", query.keyword.clone()),
    ];
    match query.rank {
        PlaceRank::NearestFirst => params.push(("rankby", "distance".to_string())),
        PlaceRank::Within(radius_m) => params.push(("radius", radius_m.to_string())),
    }
    params
}

fn into_candidates(response: NearbyResponse) -> PlannerResult<Vec<Candidate>> {
    match response.status.as_str() {
        "OK" | "ZERO_RESULTS" => {}
        other => {
            let detail = response.error_message.unwrap_or_default();
            return Err(PlannerError::upstream(
                "places",
                format!("status {}: {}", other, detail),
            ));
        }
    }

    Ok(response
        .results
        .into_iter()
        .filter_map(|place| {
            let location = place.geometry.location;
            let coordinate = Coordinate {
                lat: location.lat,
                lon: location.lng,
            };
            coordinate.is_valid().then_some(Candidate {
                name: place.name,
                coordinate,
            })
        })
        .collect())
}

#[async_trait]
impl PlacesSearch for GooglePlacesClient {
    async fn nearby(&self, query: &PlacesQuery) -> PlannerResult<Vec<Candidate>> {
        let request = self
            .client
            .get(join_url(&self.base_url, "/nearbysearch/json"))
            .query(&nearby_params(query))
            .query(&[("key", self.api_key.as_str())]);

        let response: NearbyResponse = send_json("places", request).await?;
        into_candidates(response)
    }
}

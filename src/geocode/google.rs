use crate::geocode::error::GeocodeError;
use crate::geocode::Geocoder;
use log::{debug, warn};
use reqwest::blocking::{Client, Request};
use serde::Deserialize;

pub const GOOGLE_GEOCODE_ENDPOINT: &str = "https://maps.googleapis.com/maps/api/geocode/json";

const REGION_COMPONENT_TYPE: &str = "administrative_area_level_1";

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    #[serde(default)]
    address_components: Vec<AddressComponent>,
}

#[derive(Debug, Deserialize)]
struct AddressComponent {
    short_name: String,
    #[serde(default)]
    types: Vec<String>,
}

/// Reverse geocoder backed by the Google Geocoding web service.
///
/// Every lookup is a single blocking request. Any failure is logged and reported as
/// "no region" so one bad coordinate does not stop a batch.
#[derive(Debug, Clone)]
pub struct GoogleGeocoder {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl GoogleGeocoder {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_endpoint(api_key, GOOGLE_GEOCODE_ENDPOINT)
    }

    /// Uses a different service URL, e.g. a proxy or a local stub.
    pub fn with_endpoint(api_key: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        }
    }

    /// The lookup request, with coordinates and key percent-encoded into the query.
    fn request(&self, lat: f64, lon: f64) -> Result<Request, GeocodeError> {
        self.client
            .get(&self.endpoint)
            .query(&[
                ("latlng", format!("{},{}", lat, lon)),
                ("key", self.api_key.clone()),
            ])
            .build()
            .map_err(|e| GeocodeError::NetworkRequest(self.endpoint.clone(), e))
    }

    fn lookup(&self, lat: f64, lon: f64) -> Result<String, GeocodeError> {
        let response = self
            .client
            .execute(self.request(lat, lon)?)
            .map_err(|e| GeocodeError::NetworkRequest(self.endpoint.clone(), e))?;
        let response = match response.error_for_status() {
            Ok(resp) => resp,
            Err(e) => {
                return Err(match e.status() {
                    Some(status) => GeocodeError::HttpStatus {
                        url: self.endpoint.clone(),
                        status,
                        source: e,
                    },
                    None => GeocodeError::NetworkRequest(self.endpoint.clone(), e),
                });
            }
        };
        let body = response
            .text()
            .map_err(|e| GeocodeError::NetworkRequest(self.endpoint.clone(), e))?;
        region_from_json(&body)
    }
}

impl Geocoder for GoogleGeocoder {
    fn region_code(&self, lat: f64, lon: f64) -> Option<String> {
        match self.lookup(lat, lon) {
            Ok(region) => {
                debug!("({}, {}) is in {}", lat, lon, region);
                Some(region)
            }
            Err(e) => {
                warn!("No region for ({}, {}): {}", lat, lon, e);
                None
            }
        }
    }
}

/// Extracts the first-level administrative area short name from a response body.
pub(crate) fn region_from_json(body: &str) -> Result<String, GeocodeError> {
    let response: GeocodeResponse = serde_json::from_str(body)?;
    region_from_response(&response)
}

fn region_from_response(response: &GeocodeResponse) -> Result<String, GeocodeError> {
    if response.status != "OK" {
        return Err(GeocodeError::ServiceStatus(response.status.clone()));
    }
    // Only the best match is considered
    response
        .results
        .first()
        .into_iter()
        .flat_map(|result| result.address_components.iter())
        .find(|component| component.types.iter().any(|t| t == REGION_COMPONENT_TYPE))
        .map(|component| component.short_name.clone())
        .ok_or(GeocodeError::NoRegion)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ILLINOIS: &str = r#"{
        "status": "OK",
        "results": [
            {
                "address_components": [
                    {"long_name": "Champaign County", "short_name": "Champaign County",
                     "types": ["administrative_area_level_2", "political"]},
                    {"long_name": "Illinois", "short_name": "IL",
                     "types": ["administrative_area_level_1", "political"]},
                    {"long_name": "United States", "short_name": "US",
                     "types": ["country", "political"]}
                ]
            },
            {
                "address_components": [
                    {"long_name": "Indiana", "short_name": "IN",
                     "types": ["administrative_area_level_1", "political"]}
                ]
            }
        ]
    }"#;

    #[test]
    fn test_region_comes_from_first_result() {
        assert_eq!(region_from_json(ILLINOIS).ok(), Some("IL".to_string()));
    }

    #[test]
    fn test_non_ok_status_has_no_region() {
        let body = r#"{"status": "ZERO_RESULTS", "results": []}"#;
        assert!(matches!(
            region_from_json(body),
            Err(GeocodeError::ServiceStatus(status)) if status == "ZERO_RESULTS"
        ));
    }

    #[test]
    fn test_missing_region_component() {
        let body = r#"{"status": "OK", "results": [
            {"address_components": [{"short_name": "US", "types": ["country"]}]}
        ]}"#;
        assert!(matches!(region_from_json(body), Err(GeocodeError::NoRegion)));
    }

    #[test]
    fn test_malformed_body() {
        assert!(matches!(
            region_from_json("<html>oops</html>"),
            Err(GeocodeError::JsonParse(_))
        ));
    }

    #[test]
    fn test_query_is_percent_encoded() -> Result<(), GeocodeError> {
        let geocoder = GoogleGeocoder::with_endpoint("a&b c", "https://example.test/geocode/json");

        let request = geocoder.request(40.5, -89.25)?;

        assert_eq!(request.url().path(), "/geocode/json");
        assert_eq!(request.url().query(), Some("latlng=40.5%2C-89.25&key=a%26b+c"));
        let pairs: Vec<(String, String)> = request.url().query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("latlng".to_string(), "40.5,-89.25".to_string()),
                ("key".to_string(), "a&b c".to_string())
            ]
        );
        Ok(())
    }

    #[test]
    fn test_unreachable_service_fails_open() {
        // Nothing listens on the discard port
        let geocoder = GoogleGeocoder::with_endpoint("key", "http://127.0.0.1:9/geocode/json");
        assert_eq!(geocoder.region_code(40.0, -89.0), None);
    }
}

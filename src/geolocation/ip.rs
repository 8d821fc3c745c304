// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! IP-based geolocation.

use log::debug;
use poi_core::{GeoPoint, LocateError, LocateOptions};

use super::LocationProvider;

/// A lookup service and the JSON keys holding its coordinates.
#[derive(Debug, Clone, Copy)]
struct Endpoint {
    url: &'static str,
    lat_key: &'static str,
    lng_key: &'static str,
}

const ENDPOINTS: [Endpoint; 2] = [
    Endpoint {
        url: "https://ipapi.co/json/",
        lat_key: "latitude",
        lng_key: "longitude",
    },
    // no API key needed
    Endpoint {
        url: "http://ip-api.com/json/",
        lat_key: "lat",
        lng_key: "lon",
    },
];

/// Approximate position from the public IP address.
#[derive(Debug, Clone, Copy, Default)]
pub struct IpProvider;

impl LocationProvider for IpProvider {
    fn name(&self) -> &'static str {
        "ip"
    }

    fn locate(&self, options: &LocateOptions) -> Result<GeoPoint, LocateError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(options.timeout)
            .build()
            .map_err(|e| LocateError::Unavailable(e.to_string()))?;

        let mut last_error = String::from("no lookup service answered");
        for endpoint in &ENDPOINTS {
            match lookup(&client, endpoint) {
                Ok(position) => return Ok(position),
                Err(e) => {
                    debug!("IP lookup via {} failed: {e}", endpoint.url);
                    last_error = e;
                }
            }
        }
        Err(LocateError::Unavailable(last_error))
    }
}

fn lookup(client: &reqwest::blocking::Client, endpoint: &Endpoint) -> Result<GeoPoint, String> {
    let response = client.get(endpoint.url).send().map_err(|e| e.to_string())?;
    if !response.status().is_success() {
        return Err(format!("HTTP error: {}", response.status()));
    }
    let text = response.text().map_err(|e| e.to_string())?;
    parse_position(&text, endpoint.lat_key, endpoint.lng_key)
}

fn parse_position(body: &str, lat_key: &str, lng_key: &str) -> Result<GeoPoint, String> {
    let value: serde_json::Value = serde_json::from_str(body).map_err(|e| e.to_string())?;
    match (
        value.get(lat_key).and_then(serde_json::Value::as_f64),
        value.get(lng_key).and_then(serde_json::Value::as_f64),
    ) {
        (Some(lat), Some(lng)) => Ok(GeoPoint::new(lat, lng)),
        _ => Err(format!("response has no {lat_key}/{lng_key}")),
    }
}

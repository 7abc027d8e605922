use crate::config::RiskConfig;
use crate::library::logger::interface::Logger;
use crate::location::Coordinate;
use crate::risk_oracle::interface::{RiskLabel, RiskOracle};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

const INDEX_BAND: &str = "NDVI";

#[derive(Debug, thiserror::Error)]
pub enum EarthEngineError {
    #[error("no Earth Engine project configured")]
    MissingProject,
    #[error("no Earth Engine access token configured")]
    MissingAccessToken,
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Earth Engine answered {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("unexpected result value: {0}")]
    UnexpectedResult(Value),
}

#[derive(Debug, Deserialize)]
struct ComputeValueResponse {
    #[serde(default)]
    result: Value,
}

/// Vegetation-index risk oracle backed by the Earth Engine REST
/// `value:compute` endpoint.
pub struct RiskOracleEarthEngine {
    client: reqwest::blocking::Client,
    config: RiskConfig,
    logger: Arc<dyn Logger + Send + Sync>,
}

impl RiskOracleEarthEngine {
    pub fn new(
        config: RiskConfig,
        logger: Arc<dyn Logger + Send + Sync>,
    ) -> Result<Self, EarthEngineError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            client,
            config,
            logger: logger.with_namespace("risk_oracle").with_namespace("earth_engine"),
        })
    }

    /// Mean vegetation index of the least cloudy scene over the point, or
    /// `None` when the scene has no valid pixel there.
    pub fn vegetation_index(&self, coordinate: Coordinate) -> Result<Option<f64>, EarthEngineError> {
        if self.config.project.is_empty() {
            return Err(EarthEngineError::MissingProject);
        }
        let token = self
            .config
            .access_token
            .as_deref()
            .filter(|token| !token.is_empty())
            .ok_or(EarthEngineError::MissingAccessToken)?;

        let url = format!(
            "{}/v1/projects/{}/value:compute",
            self.config.endpoint.trim_end_matches('/'),
            self.config.project
        );
        let body = json!({ "expression": build_expression(&self.config, coordinate) });

        let response = self.client.post(url).bearer_auth(token).json(&body).send()?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(EarthEngineError::Status { status, body });
        }

        let parsed: ComputeValueResponse = response.json()?;
        parse_index(parsed.result)
    }
}

impl RiskOracle for RiskOracleEarthEngine {
    fn assess(&self, coordinate: Coordinate) -> RiskLabel {
        let _ = self
            .logger
            .info(&format!("Querying vegetation index at {}", coordinate));

        match self.vegetation_index(coordinate) {
            Ok(index) => {
                let label = RiskLabel::from_vegetation_index(index, &self.config.thresholds);
                let _ = self.logger.info(&format!(
                    "Vegetation index {:?} at {} -> {}",
                    index, coordinate, label
                ));
                label
            }
            Err(e) => {
                let _ = self
                    .logger
                    .warn(&format!("Risk query at {} failed: {}", coordinate, e));
                RiskLabel::Unknown
            }
        }
    }
}

fn parse_index(result: Value) -> Result<Option<f64>, EarthEngineError> {
    match result {
        Value::Null => Ok(None),
        Value::Number(number) => Ok(number.as_f64()),
        other => Err(EarthEngineError::UnexpectedResult(other)),
    }
}

fn constant(value: Value) -> Value {
    json!({ "constantValue": value })
}

fn invoke(function_name: &str, arguments: Value) -> Value {
    json!({
        "functionInvocationValue": {
            "functionName": function_name,
            "arguments": arguments,
        }
    })
}

fn reference(name: &str) -> Value {
    json!({ "valueReference": name })
}

/// Expression graph for: least cloudy scene over the point in the date range,
/// normalized difference of the NIR and red bands, mean over the point.
pub fn build_expression(config: &RiskConfig, coordinate: Coordinate) -> Value {
    let point = invoke(
        "GeometryConstructors.Point",
        json!({ "coordinates": constant(json!([coordinate.longitude, coordinate.latitude])) }),
    );

    let collection = invoke(
        "ImageCollection.load",
        json!({ "id": constant(json!(config.collection)) }),
    );

    let in_bounds = invoke(
        "Collection.filter",
        json!({
            "collection": collection,
            "filter": invoke(
                "Filter.intersects",
                json!({
                    "leftField": constant(json!(".all")),
                    "rightValue": reference("point"),
                }),
            ),
        }),
    );

    let in_dates = invoke(
        "Collection.filter",
        json!({
            "collection": in_bounds,
            "filter": invoke(
                "Filter.dateRangeContains",
                json!({
                    "leftValue": invoke(
                        "DateRange",
                        json!({
                            "start": constant(json!(config.start_date)),
                            "end": constant(json!(config.end_date)),
                        }),
                    ),
                    "rightField": constant(json!("system:time_start")),
                }),
            ),
        }),
    );

    let least_cloudy = invoke(
        "Collection.first",
        json!({
            "collection": invoke(
                "Collection.limit",
                json!({
                    "collection": in_dates,
                    "key": constant(json!(config.cloud_property)),
                    "ascending": constant(json!(true)),
                }),
            ),
        }),
    );

    let index_image = invoke(
        "Image.rename",
        json!({
            "input": invoke(
                "Image.normalizedDifference",
                json!({
                    "input": least_cloudy,
                    "bandNames": constant(json!([config.nir_band, config.red_band])),
                }),
            ),
            "names": constant(json!([INDEX_BAND])),
        }),
    );

    let reduced = invoke(
        "Image.reduceRegion",
        json!({
            "image": index_image,
            "reducer": invoke("Reducer.mean", json!({})),
            "geometry": reference("point"),
            "scale": constant(json!(config.scale_m)),
            "maxPixels": constant(json!(config.max_pixels)),
        }),
    );

    json!({
        "result": "result",
        "values": {
            "point": point,
            "result": invoke(
                "Dictionary.get",
                json!({
                    "dictionary": reduced,
                    "key": constant(json!(INDEX_BAND)),
                }),
            ),
        }
    })
}

use crate::lookup::Lookup;
use crate::types::{Outcome, VehicleType, Violation};
use log::info;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::Filter;

pub async fn run(lookup: Arc<Lookup>, port: u16) {
    info!("Listening on port {}", port);
    warp::serve(routes(lookup)).run(([0, 0, 0, 0], port)).await;
}

fn routes(
    lookup: Arc<Lookup>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::get()
        .and(warp::path!("api"))
        .and(warp::query::<HashMap<String, String>>())
        .and(warp::any().map(move || lookup.clone()))
        .and_then(handle_lookup)
}

async fn handle_lookup(
    params: HashMap<String, String>,
    lookup: Arc<Lookup>,
) -> Result<impl warp::Reply, Infallible> {
    let reply =
        |status: StatusCode, value: Value| warp::reply::with_status(warp::reply::json(&value), status);

    let plate = match params.get("licensePlate") {
        Some(p) if !p.is_empty() => p,
        _ => {
            return Ok(reply(
                StatusCode::BAD_REQUEST,
                json!({"error": "License plate is required"}),
            ))
        }
    };
    // Reject bad vehicle types before any network traffic happens.
    let vehicle = match params
        .get("vehicleType")
        .map(String::as_str)
        .unwrap_or("car")
        .parse::<VehicleType>()
    {
        Ok(v) => v,
        Err(_) => {
            return Ok(reply(
                StatusCode::BAD_REQUEST,
                json!({"error": "Invalid vehicle type. Must be 'car' or 'motorcycle'"}),
            ))
        }
    };

    match lookup.lookup(plate, vehicle).await {
        Outcome::Violations(violations) => Ok(reply(
            StatusCode::OK,
            json!({
                "licensePlate": plate,
                "vehicleType": vehicle.as_str(),
                "violations": violations.iter().map(Violation::to_json).collect::<Vec<_>>(),
            }),
        )),
        Outcome::NoViolations => Ok(reply(
            StatusCode::NOT_FOUND,
            json!({"error": "No violations found"}),
        )),
        Outcome::Failed(e) => Ok(reply(
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({"error": e.to_string()}),
        )),
    }
}

//! Web handlers for the places API.
//!
//! These are the request/response bindings around the storage layer: they
//! validate the inputs, look up the records the route references, and hand
//! back serialized results. The one piece of real logic is the filter in
//! [`places_search`].

use std::collections::HashSet;
use std::sync::Arc;

use actix_web::{
    delete, get, post, put,
    web::{self, Data, ServiceConfig},
    HttpResponse,
};
use casita_store::{Place, PlacePatch, Storage};
use serde::Deserialize;

use crate::errors::HandlerError;

/// Configure the routes of the places API.
pub fn configure(config: &mut ServiceConfig) {
    config
        .service(places_by_city)
        .service(create_place)
        .service(get_place)
        .service(delete_place)
        .service(update_place)
        .service(places_search);
}

/// The fields a client may supply when creating a place.
///
/// `user_id` and `name` are required by the handler, but optional here so
/// that their absence produces the API's own error message rather than a
/// deserialization failure. Any `city_id` in the body is ignored; the path
/// value wins.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct NewPlaceBody {
    /// The owning user. Required.
    user_id: Option<String>,
    /// Listing title. Required.
    name: Option<String>,
    /// The remaining, optional descriptive fields.
    #[serde(flatten)]
    rest: PlacePatch,
}

/// List every place in a city.
#[get("/cities/{city_id}/places")]
#[tracing::instrument(skip(city_id, storage))]
async fn places_by_city(
    city_id: web::Path<String>,
    storage: Data<Arc<dyn Storage>>,
) -> Result<HttpResponse, HandlerError> {
    let city_id = city_id.into_inner();
    if storage.get_city(&city_id).is_none() {
        return Err(HandlerError::NotFound);
    }

    let city_places: Vec<Place> = storage
        .all_places()
        .into_iter()
        .filter(|place| place.city_id == city_id)
        .collect();

    tracing::debug!(
        r#type = "web.places.by-city",
        place_count = city_places.len(),
        "Listing places for a city"
    );
    Ok(HttpResponse::Ok().json(city_places))
}

/// Create a place in a city.
///
/// The checks happen in a fixed order that clients depend on: missing city,
/// unparseable body, missing `user_id`, unknown user, missing `name`.
#[post("/cities/{city_id}/places")]
#[tracing::instrument(skip(city_id, body, storage))]
async fn create_place(
    city_id: web::Path<String>,
    body: web::Bytes,
    storage: Data<Arc<dyn Storage>>,
) -> Result<HttpResponse, HandlerError> {
    let city_id = city_id.into_inner();
    if storage.get_city(&city_id).is_none() {
        return Err(HandlerError::NotFound);
    }

    let body: NewPlaceBody =
        serde_json::from_slice(&body).map_err(|_| HandlerError::not_a_json())?;
    let user_id = body
        .user_id
        .ok_or(HandlerError::BadRequest("Missing user_id"))?;
    if storage.get_user(&user_id).is_none() {
        return Err(HandlerError::NotFound);
    }
    let name = body.name.ok_or(HandlerError::BadRequest("Missing name"))?;

    let mut place = Place::new(city_id, user_id, name);
    place.apply_patch(body.rest);
    storage.save_place(place.clone())?;

    tracing::debug!(
        r#type = "web.places.created",
        place_id = %place.id,
        "Created a place"
    );
    Ok(HttpResponse::Created().json(place))
}

/// Fetch one place by id.
#[get("/places/{place_id}")]
#[tracing::instrument(skip(place_id, storage))]
async fn get_place(
    place_id: web::Path<String>,
    storage: Data<Arc<dyn Storage>>,
) -> Result<HttpResponse, HandlerError> {
    let place = storage
        .get_place(&place_id.into_inner())
        .ok_or(HandlerError::NotFound)?;
    Ok(HttpResponse::Ok().json(place))
}

/// Delete one place by id. Responds with an empty JSON object.
#[delete("/places/{place_id}")]
#[tracing::instrument(skip(place_id, storage))]
async fn delete_place(
    place_id: web::Path<String>,
    storage: Data<Arc<dyn Storage>>,
) -> Result<HttpResponse, HandlerError> {
    let place_id = place_id.into_inner();
    if storage.get_place(&place_id).is_none() {
        return Err(HandlerError::NotFound);
    }
    storage.delete_place(&place_id)?;

    tracing::debug!(
        r#type = "web.places.deleted",
        place_id = %place_id,
        "Deleted a place"
    );
    Ok(HttpResponse::Ok().json(serde_json::json!({})))
}

/// Apply a partial update to one place.
#[put("/places/{place_id}")]
#[tracing::instrument(skip(place_id, body, storage))]
async fn update_place(
    place_id: web::Path<String>,
    body: web::Bytes,
    storage: Data<Arc<dyn Storage>>,
) -> Result<HttpResponse, HandlerError> {
    let mut place = storage
        .get_place(&place_id.into_inner())
        .ok_or(HandlerError::NotFound)?;

    let patch: PlacePatch =
        serde_json::from_slice(&body).map_err(|_| HandlerError::not_a_json())?;
    place.apply_patch(patch);
    storage.save_place(place.clone())?;

    Ok(HttpResponse::Ok().json(place))
}

/// The optional filter criteria accepted by [`places_search`].
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SearchCriteria {
    /// Restrict results to places in cities belonging to these states.
    states: Option<Vec<String>>,
    /// Restrict results to places in these cities, in addition to any
    /// cities derived from `states`.
    cities: Option<Vec<String>>,
    /// Require every listed amenity to be offered by a matching place.
    amenities: Option<Vec<String>>,
}

/// Search places by state, city, and amenity.
///
/// The filter works in two stages. First a city set is derived: the cities
/// of every requested state, unioned with the explicitly requested cities
/// that exist. Places are kept when their city is in that set. Second, if
/// any requested amenities resolve to known amenity ids, a kept place must
/// offer all of them.
///
/// A body that is absent or unparseable means no criteria, which returns
/// every place. So does a body whose amenity list is absent-or-empty while
/// the derived city set is empty. The fall-through is deliberately
/// asymmetric: a non-empty amenity list whose ids all turn out to be unknown
/// does not restore the "return everything" behavior, it runs the city
/// filter against an empty city set and matches nothing.
#[post("/places_search")]
#[tracing::instrument(skip(storage, body))]
async fn places_search(
    body: web::Bytes,
    storage: Data<Arc<dyn Storage>>,
) -> Result<HttpResponse, HandlerError> {
    let all_places = storage.all_places();

    let criteria: SearchCriteria = match serde_json::from_slice(&body) {
        Ok(criteria) => criteria,
        // No usable body means no criteria.
        Err(_) => return Ok(HttpResponse::Ok().json(all_places)),
    };

    // Cities derived from the requested states.
    let mut state_cities: HashSet<String> = HashSet::new();
    if let Some(states) = &criteria.states {
        if !states.is_empty() {
            let states: HashSet<&str> = states.iter().map(String::as_str).collect();
            state_cities.extend(
                storage
                    .all_cities()
                    .into_iter()
                    .filter(|city| states.contains(city.state_id.as_str()))
                    .map(|city| city.id),
            );
        }
    }

    // Union in the explicitly requested cities that exist.
    if let Some(cities) = &criteria.cities {
        state_cities.extend(
            cities
                .iter()
                .filter(|city_id| storage.get_city(city_id).is_some())
                .cloned(),
        );
    }

    let amenities_requested = criteria
        .amenities
        .as_ref()
        .map_or(false, |amenities| !amenities.is_empty());
    if !amenities_requested && state_cities.is_empty() {
        return Ok(HttpResponse::Ok().json(all_places));
    }

    // Keep only the requested amenity ids that actually exist.
    let amenities: HashSet<String> = match criteria.amenities {
        Some(amenities) if amenities_requested => amenities
            .into_iter()
            .filter(|amenity_id| storage.get_amenity(amenity_id).is_some())
            .collect(),
        _ => HashSet::new(),
    };

    let city_places: Vec<Place> = all_places
        .into_iter()
        .filter(|place| state_cities.contains(&place.city_id))
        .collect();

    // An amenity requirement that resolved to nothing is vacuously
    // satisfied.
    if amenities.is_empty() {
        tracing::debug!(
            r#type = "web.places.search",
            place_count = city_places.len(),
            "Search matched on cities only"
        );
        return Ok(HttpResponse::Ok().json(city_places));
    }

    let matching: Vec<Place> = city_places
        .into_iter()
        .filter(|place| {
            let offered: HashSet<&str> = place.amenity_ids.iter().map(String::as_str).collect();
            amenities
                .iter()
                .all(|amenity_id| offered.contains(amenity_id.as_str()))
        })
        .collect();

    tracing::debug!(
        r#type = "web.places.search",
        place_count = matching.len(),
        "Search matched on cities and amenities"
    );
    Ok(HttpResponse::Ok().json(matching))
}

//! The record types stored and served by Casita.
//!
//! Relationships between records are weak by-id references. A place points
//! at its city and owning user by id; nothing in the model layer enforces
//! that the target exists. The web handlers perform the existence checks
//! that the API contract requires.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generate a fresh record id.
fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// The closed set of record kinds the storage layer knows about.
///
/// Used as error context, such as naming the missing kind in a not-found
/// error. Being an enum rather than a string lookup means an unknown kind
/// is unrepresentable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// A top-level geographic region.
    State,
    /// A city within a state.
    City,
    /// An account that can own places.
    User,
    /// A feature a place can offer.
    Amenity,
    /// A bookable listing.
    Place,
}

impl EntityKind {
    /// The canonical name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::State => "State",
            Self::City => "City",
            Self::User => "User",
            Self::Amenity => "Amenity",
            Self::Place => "Place",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A top-level geographic region. Read-only in the places API; it exists to
/// derive city sets during search.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct State {
    /// Unique id.
    pub id: String,
    /// Human readable name.
    pub name: String,
}

impl State {
    /// Create a state with a fresh id.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
        }
    }
}

/// A city, belonging to a state by id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct City {
    /// Unique id.
    pub id: String,
    /// The state this city belongs to.
    pub state_id: String,
    /// Human readable name.
    pub name: String,
}

impl City {
    /// Create a city with a fresh id.
    pub fn new(state_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            state_id: state_id.into(),
            name: name.into(),
        }
    }
}

/// An account that can own places. Read-only here; creation and profile
/// management belong to a different part of the API.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Unique id.
    pub id: String,
    /// Contact address.
    pub email: String,
}

impl User {
    /// Create a user with a fresh id.
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            email: email.into(),
        }
    }
}

/// A feature a place can offer, such as wifi or parking.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Amenity {
    /// Unique id.
    pub id: String,
    /// Human readable name.
    pub name: String,
}

impl Amenity {
    /// Create an amenity with a fresh id.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
        }
    }
}

/// A bookable listing, tied to a city and an owning user.
///
/// Amenities are stored as a list of amenity ids. The search handler treats
/// the list as a set when testing amenity requirements.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Place {
    /// Unique id.
    pub id: String,
    /// The city this place is in. Fixed at creation.
    pub city_id: String,
    /// The owning user. Fixed at creation.
    pub user_id: String,
    /// Listing title.
    pub name: String,
    /// Free-form listing description.
    #[serde(default)]
    pub description: String,
    /// Number of bedrooms.
    #[serde(default)]
    pub number_rooms: i64,
    /// Number of bathrooms.
    #[serde(default)]
    pub number_bathrooms: i64,
    /// Maximum guest count.
    #[serde(default)]
    pub max_guest: i64,
    /// Nightly price, in whole currency units.
    #[serde(default)]
    pub price_by_night: i64,
    /// Latitude of the listing, if geocoded.
    #[serde(default)]
    pub latitude: Option<f64>,
    /// Longitude of the listing, if geocoded.
    #[serde(default)]
    pub longitude: Option<f64>,
    /// Ids of the amenities this place offers.
    #[serde(default)]
    pub amenity_ids: Vec<String>,
}

impl Place {
    /// Create a place with a fresh id and zeroed descriptive fields.
    pub fn new(
        city_id: impl Into<String>,
        user_id: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id: new_id(),
            city_id: city_id.into(),
            user_id: user_id.into(),
            name: name.into(),
            description: String::new(),
            number_rooms: 0,
            number_bathrooms: 0,
            max_guest: 0,
            price_by_night: 0,
            latitude: None,
            longitude: None,
            amenity_ids: Vec::new(),
        }
    }

    /// Merge a partial update into this place, field by field.
    ///
    /// Only fields present in the patch change. `id`, `city_id`, and
    /// `user_id` are immutable and have no corresponding patch fields.
    pub fn apply_patch(&mut self, patch: PlacePatch) {
        let PlacePatch {
            name,
            description,
            number_rooms,
            number_bathrooms,
            max_guest,
            price_by_night,
            latitude,
            longitude,
            amenity_ids,
        } = patch;

        if let Some(name) = name {
            self.name = name;
        }
        if let Some(description) = description {
            self.description = description;
        }
        if let Some(number_rooms) = number_rooms {
            self.number_rooms = number_rooms;
        }
        if let Some(number_bathrooms) = number_bathrooms {
            self.number_bathrooms = number_bathrooms;
        }
        if let Some(max_guest) = max_guest {
            self.max_guest = max_guest;
        }
        if let Some(price_by_night) = price_by_night {
            self.price_by_night = price_by_night;
        }
        if let Some(latitude) = latitude {
            self.latitude = Some(latitude);
        }
        if let Some(longitude) = longitude {
            self.longitude = Some(longitude);
        }
        if let Some(amenity_ids) = amenity_ids {
            self.amenity_ids = amenity_ids;
        }
    }
}

/// A partial update for the mutable fields of a [`Place`].
///
/// Unknown fields in the incoming JSON are ignored, which also covers
/// clients that echo back `id` or `city_id`.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlacePatch {
    /// New listing title.
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New bedroom count.
    pub number_rooms: Option<i64>,
    /// New bathroom count.
    pub number_bathrooms: Option<i64>,
    /// New maximum guest count.
    pub max_guest: Option<i64>,
    /// New nightly price.
    pub price_by_night: Option<i64>,
    /// New latitude.
    pub latitude: Option<f64>,
    /// New longitude.
    pub longitude: Option<f64>,
    /// Replacement amenity id list.
    pub amenity_ids: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn patch_merges_only_present_fields() {
        let mut place = Place::new("city-1", "user-1", "Cozy loft");
        place.price_by_night = 80;

        place.apply_patch(PlacePatch {
            name: Some("Cozier loft".to_string()),
            max_guest: Some(3),
            ..PlacePatch::default()
        });

        assert_eq!(place.name, "Cozier loft");
        assert_eq!(place.max_guest, 3);
        // Untouched fields keep their values.
        assert_eq!(place.price_by_night, 80);
        assert_eq!(place.city_id, "city-1");
        assert_eq!(place.user_id, "user-1");
    }

    #[test]
    fn empty_patch_is_a_no_op() {
        let mut place = Place::new("city-1", "user-1", "Cozy loft");
        let before = place.clone();

        place.apply_patch(PlacePatch::default());

        assert_eq!(place, before);
    }

    #[test]
    fn patch_ignores_unknown_and_immutable_fields() {
        let patch: PlacePatch = serde_json::from_str(
            r#"{"id": "evil", "city_id": "elsewhere", "name": "Renamed", "stray": 1}"#,
        )
        .expect("patch should deserialize");

        assert_eq!(
            patch,
            PlacePatch {
                name: Some("Renamed".to_string()),
                ..PlacePatch::default()
            }
        );
    }

    #[test]
    fn place_serializes_amenities_as_ids() {
        let mut place = Place::new("city-1", "user-1", "Cozy loft");
        place.amenity_ids = vec!["a1".to_string(), "a2".to_string()];

        let json = serde_json::to_value(&place).expect("place should serialize");
        assert_eq!(json["amenity_ids"], serde_json::json!(["a1", "a2"]));
    }
}

//! Tests for the `places_search` filter.

use anyhow::Result;
use casita_store::{Amenity, City, State, Storage};
use pretty_assertions::assert_eq;
use reqwest::StatusCode;
use serde_json::{json, Value};

use crate::utils::fixtures::{id_set, seed_geography, seed_place};
use crate::{casita_test, TestingTools};

#[actix_rt::test]
async fn an_empty_body_returns_every_place() -> Result<()> {
    casita_test(
        |_| (),
        |TestingTools {
             test_client,
             storage,
             ..
         }| async move {
            let geo = seed_geography(&storage);
            let place_1 = seed_place(&storage, &geo.city, &geo.user, "Cozy loft");
            let place_2 = seed_place(&storage, &geo.city, &geo.user, "Beach shack");

            let response = test_client
                .post("/api/v1/places_search")
                .send()
                .await
                .expect("failed to execute request");

            assert_eq!(response.status(), StatusCode::OK);
            let body: Vec<Value> = response.json().await.expect("response should be JSON");
            assert_eq!(id_set(&body), [place_1.id, place_2.id].into_iter().collect());
            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn empty_criteria_return_every_place() -> Result<()> {
    casita_test(
        |_| (),
        |TestingTools {
             test_client,
             storage,
             ..
         }| async move {
            let geo = seed_geography(&storage);
            let place = seed_place(&storage, &geo.city, &geo.user, "Cozy loft");

            let response = test_client
                .post("/api/v1/places_search")
                .json(&json!({}))
                .send()
                .await
                .expect("failed to execute request");

            let body: Vec<Value> = response.json().await.expect("response should be JSON");
            assert_eq!(id_set(&body), [place.id].into_iter().collect());
            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn states_select_the_places_of_their_cities() -> Result<()> {
    casita_test(
        |_| (),
        |TestingTools {
             test_client,
             storage,
             ..
         }| async move {
            let geo = seed_geography(&storage);
            let other_state = State::new("Tasmania");
            let other_city = City::new(&other_state.id, "Hobart");
            storage.save_state(other_state.clone()).expect("seeding state");
            storage.save_city(other_city.clone()).expect("seeding city");

            let wanted = seed_place(&storage, &geo.city, &geo.user, "Cozy loft");
            let _unwanted = seed_place(&storage, &other_city, &geo.user, "Harbor flat");

            let response = test_client
                .post("/api/v1/places_search")
                .json(&json!({ "states": [geo.state.id] }))
                .send()
                .await
                .expect("failed to execute request");

            let body: Vec<Value> = response.json().await.expect("response should be JSON");
            assert_eq!(id_set(&body), [wanted.id].into_iter().collect());
            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn explicit_cities_are_unioned_with_state_cities() -> Result<()> {
    casita_test(
        |_| (),
        |TestingTools {
             test_client,
             storage,
             ..
         }| async move {
            let geo = seed_geography(&storage);
            let other_state = State::new("Tasmania");
            let other_city = City::new(&other_state.id, "Hobart");
            let third_city = City::new(&other_state.id, "Launceston");
            storage.save_state(other_state.clone()).expect("seeding state");
            storage.save_city(other_city.clone()).expect("seeding city");
            storage.save_city(third_city.clone()).expect("seeding city");

            let from_state = seed_place(&storage, &geo.city, &geo.user, "Cozy loft");
            let from_city = seed_place(&storage, &other_city, &geo.user, "Harbor flat");
            let _excluded = seed_place(&storage, &third_city, &geo.user, "Hill house");

            let response = test_client
                .post("/api/v1/places_search")
                .json(&json!({
                    "states": [geo.state.id],
                    "cities": [other_city.id],
                }))
                .send()
                .await
                .expect("failed to execute request");

            let body: Vec<Value> = response.json().await.expect("response should be JSON");
            assert_eq!(
                id_set(&body),
                [from_state.id, from_city.id].into_iter().collect()
            );
            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn explicit_cities_work_without_states() -> Result<()> {
    casita_test(
        |_| (),
        |TestingTools {
             test_client,
             storage,
             ..
         }| async move {
            let geo = seed_geography(&storage);
            let other_city = City::new(&geo.state.id, "Port Lincoln");
            storage.save_city(other_city.clone()).expect("seeding city");

            let wanted = seed_place(&storage, &geo.city, &geo.user, "Cozy loft");
            let _unwanted = seed_place(&storage, &other_city, &geo.user, "Farm stay");

            let response = test_client
                .post("/api/v1/places_search")
                .json(&json!({ "cities": [geo.city.id] }))
                .send()
                .await
                .expect("failed to execute request");

            let body: Vec<Value> = response.json().await.expect("response should be JSON");
            assert_eq!(id_set(&body), [wanted.id].into_iter().collect());
            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn unknown_city_ids_alone_fall_through_to_every_place() -> Result<()> {
    casita_test(
        |_| (),
        |TestingTools {
             test_client,
             storage,
             ..
         }| async move {
            let geo = seed_geography(&storage);
            let place = seed_place(&storage, &geo.city, &geo.user, "Cozy loft");

            // The only requested city does not exist, so the derived city
            // set is empty, and with no amenities requested the filter falls
            // through to the full set.
            let response = test_client
                .post("/api/v1/places_search")
                .json(&json!({ "cities": ["no-such-city"] }))
                .send()
                .await
                .expect("failed to execute request");

            let body: Vec<Value> = response.json().await.expect("response should be JSON");
            assert_eq!(id_set(&body), [place.id].into_iter().collect());
            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn amenities_require_a_superset_match() -> Result<()> {
    casita_test(
        |_| (),
        |TestingTools {
             test_client,
             storage,
             ..
         }| async move {
            let geo = seed_geography(&storage);
            let wifi = Amenity::new("wifi");
            let parking = Amenity::new("parking");
            storage.save_amenity(wifi.clone()).expect("seeding amenity");
            storage
                .save_amenity(parking.clone())
                .expect("seeding amenity");

            let mut with_both = seed_place(&storage, &geo.city, &geo.user, "Cozy loft");
            with_both.amenity_ids = vec![wifi.id.clone(), parking.id.clone()];
            storage.save_place(with_both.clone()).expect("seeding place");

            let mut with_one = seed_place(&storage, &geo.city, &geo.user, "Beach shack");
            with_one.amenity_ids = vec![parking.id.clone()];
            storage.save_place(with_one.clone()).expect("seeding place");

            let response = test_client
                .post("/api/v1/places_search")
                .json(&json!({
                    "states": [geo.state.id],
                    "amenities": [wifi.id],
                }))
                .send()
                .await
                .expect("failed to execute request");

            let body: Vec<Value> = response.json().await.expect("response should be JSON");
            assert_eq!(id_set(&body), [with_both.id].into_iter().collect());
            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn unknown_amenity_ids_do_not_reduce_city_matches() -> Result<()> {
    casita_test(
        |_| (),
        |TestingTools {
             test_client,
             storage,
             ..
         }| async move {
            let geo = seed_geography(&storage);
            let place = seed_place(&storage, &geo.city, &geo.user, "Cozy loft");

            // Every requested amenity is unknown, so the requirement
            // resolves to nothing and the city matches stand.
            let response = test_client
                .post("/api/v1/places_search")
                .json(&json!({
                    "states": [geo.state.id],
                    "amenities": ["no-such-amenity"],
                }))
                .send()
                .await
                .expect("failed to execute request");

            let body: Vec<Value> = response.json().await.expect("response should be JSON");
            assert_eq!(id_set(&body), [place.id].into_iter().collect());
            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn amenities_without_any_cities_match_nothing() -> Result<()> {
    casita_test(
        |_| (),
        |TestingTools {
             test_client,
             storage,
             ..
         }| async move {
            let geo = seed_geography(&storage);
            let wifi = Amenity::new("wifi");
            storage.save_amenity(wifi.clone()).expect("seeding amenity");

            let mut place = seed_place(&storage, &geo.city, &geo.user, "Cozy loft");
            place.amenity_ids = vec![wifi.id.clone()];
            storage.save_place(place).expect("seeding place");

            // A non-empty amenity list does not fall through to "every
            // place", even though no states or cities were requested. The
            // empty derived city set filters everything out first.
            let response = test_client
                .post("/api/v1/places_search")
                .json(&json!({ "amenities": [wifi.id] }))
                .send()
                .await
                .expect("failed to execute request");

            assert_eq!(response.status(), StatusCode::OK);
            let body: Vec<Value> = response.json().await.expect("response should be JSON");
            assert!(body.is_empty());
            Ok(())
        },
    )
    .await
}

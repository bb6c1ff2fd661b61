//! Tests for the CRUD half of the places API.

use anyhow::Result;
use pretty_assertions::assert_eq;
use reqwest::StatusCode;
use serde_json::{json, Value};

use casita_store::{City, Storage};

use crate::utils::fixtures::{id_set, seed_geography, seed_place};
use crate::{casita_test, TestingTools};

#[actix_rt::test]
async fn listing_places_of_an_unknown_city_is_not_found() -> Result<()> {
    casita_test(
        |_| (),
        |TestingTools { test_client, .. }| async move {
            let response = test_client
                .get("/api/v1/cities/no-such-city/places")
                .send()
                .await
                .expect("failed to execute request");

            assert_eq!(response.status(), StatusCode::NOT_FOUND);
            let body: Value = response.json().await.expect("response should be JSON");
            assert_eq!(body, json!({ "error": "Not found" }));
            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn listing_places_returns_exactly_that_citys_places() -> Result<()> {
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

            let here_1 = seed_place(&storage, &geo.city, &geo.user, "Cozy loft");
            let here_2 = seed_place(&storage, &geo.city, &geo.user, "Beach shack");
            let _elsewhere = seed_place(&storage, &other_city, &geo.user, "Farm stay");

            let response = test_client
                .get(&format!("/api/v1/cities/{}/places", geo.city.id))
                .send()
                .await
                .expect("failed to execute request");

            assert_eq!(response.status(), StatusCode::OK);
            let body: Vec<Value> = response.json().await.expect("response should be JSON");
            assert_eq!(id_set(&body), [here_1.id, here_2.id].into_iter().collect());
            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn creating_a_place_in_an_unknown_city_is_not_found() -> Result<()> {
    casita_test(
        |_| (),
        |TestingTools {
             test_client,
             storage,
             ..
         }| async move {
            let geo = seed_geography(&storage);

            let response = test_client
                .post("/api/v1/cities/no-such-city/places")
                .json(&json!({ "user_id": geo.user.id, "name": "Cozy loft" }))
                .send()
                .await
                .expect("failed to execute request");

            assert_eq!(response.status(), StatusCode::NOT_FOUND);
            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn creating_a_place_with_an_unparseable_body_is_bad_request() -> Result<()> {
    casita_test(
        |_| (),
        |TestingTools {
             test_client,
             storage,
             ..
         }| async move {
            let geo = seed_geography(&storage);

            let response = test_client
                .post(&format!("/api/v1/cities/{}/places", geo.city.id))
                .body("this is not json")
                .send()
                .await
                .expect("failed to execute request");

            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            let body: Value = response.json().await.expect("response should be JSON");
            assert_eq!(body, json!({ "error": "Not a JSON" }));
            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn creating_a_place_without_a_user_id_is_bad_request() -> Result<()> {
    casita_test(
        |_| (),
        |TestingTools {
             test_client,
             storage,
             ..
         }| async move {
            let geo = seed_geography(&storage);

            let response = test_client
                .post(&format!("/api/v1/cities/{}/places", geo.city.id))
                .json(&json!({ "name": "Cozy loft" }))
                .send()
                .await
                .expect("failed to execute request");

            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            let body: Value = response.json().await.expect("response should be JSON");
            assert_eq!(body, json!({ "error": "Missing user_id" }));
            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn creating_a_place_for_an_unknown_user_is_not_found() -> Result<()> {
    casita_test(
        |_| (),
        |TestingTools {
             test_client,
             storage,
             ..
         }| async move {
            let geo = seed_geography(&storage);

            let response = test_client
                .post(&format!("/api/v1/cities/{}/places", geo.city.id))
                .json(&json!({ "user_id": "no-such-user", "name": "Cozy loft" }))
                .send()
                .await
                .expect("failed to execute request");

            assert_eq!(response.status(), StatusCode::NOT_FOUND);
            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn creating_a_place_without_a_name_is_bad_request() -> Result<()> {
    casita_test(
        |_| (),
        |TestingTools {
             test_client,
             storage,
             ..
         }| async move {
            let geo = seed_geography(&storage);

            let response = test_client
                .post(&format!("/api/v1/cities/{}/places", geo.city.id))
                .json(&json!({ "user_id": geo.user.id }))
                .send()
                .await
                .expect("failed to execute request");

            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            let body: Value = response.json().await.expect("response should be JSON");
            assert_eq!(body, json!({ "error": "Missing name" }));
            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn creating_a_place_persists_it_with_the_citys_id() -> Result<()> {
    casita_test(
        |_| (),
        |TestingTools {
             test_client,
             storage,
             ..
         }| async move {
            let geo = seed_geography(&storage);

            let response = test_client
                .post(&format!("/api/v1/cities/{}/places", geo.city.id))
                .json(&json!({
                    "user_id": geo.user.id,
                    "name": "Cozy loft",
                    // The path wins over any city in the body.
                    "city_id": "somewhere-else",
                    "price_by_night": 120,
                }))
                .send()
                .await
                .expect("failed to execute request");

            assert_eq!(response.status(), StatusCode::CREATED);
            let body: Value = response.json().await.expect("response should be JSON");
            assert_eq!(body["city_id"], json!(geo.city.id));
            assert_eq!(body["name"], json!("Cozy loft"));
            assert_eq!(body["price_by_night"], json!(120));

            let id = body["id"].as_str().expect("created place should have an id");
            let stored = storage
                .get_place(id)
                .expect("created place should be in storage");
            assert_eq!(stored.city_id, geo.city.id);
            assert_eq!(stored.price_by_night, 120);
            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn fetching_a_place_works_and_unknown_ids_are_not_found() -> Result<()> {
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
                .get(&format!("/api/v1/places/{}", place.id))
                .send()
                .await
                .expect("failed to execute request");
            assert_eq!(response.status(), StatusCode::OK);
            let body: Value = response.json().await.expect("response should be JSON");
            assert_eq!(body["id"], json!(place.id));

            let response = test_client
                .get("/api/v1/places/no-such-place")
                .send()
                .await
                .expect("failed to execute request");
            assert_eq!(response.status(), StatusCode::NOT_FOUND);
            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn updating_a_place_merges_only_the_given_fields() -> Result<()> {
    casita_test(
        |_| (),
        |TestingTools {
             test_client,
             storage,
             ..
         }| async move {
            let geo = seed_geography(&storage);
            let mut place = seed_place(&storage, &geo.city, &geo.user, "Cozy loft");
            place.price_by_night = 80;
            storage.save_place(place.clone()).expect("seeding place");

            let response = test_client
                .put(&format!("/api/v1/places/{}", place.id))
                .json(&json!({ "name": "Cozier loft", "max_guest": 3 }))
                .send()
                .await
                .expect("failed to execute request");
            assert_eq!(response.status(), StatusCode::OK);

            // A later GET sees the merged record.
            let response = test_client
                .get(&format!("/api/v1/places/{}", place.id))
                .send()
                .await
                .expect("failed to execute request");
            let body: Value = response.json().await.expect("response should be JSON");
            assert_eq!(body["name"], json!("Cozier loft"));
            assert_eq!(body["max_guest"], json!(3));
            assert_eq!(body["price_by_night"], json!(80));
            assert_eq!(body["user_id"], json!(geo.user.id));
            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn updating_a_place_with_an_unparseable_body_is_bad_request() -> Result<()> {
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
                .put(&format!("/api/v1/places/{}", place.id))
                .body("{not json")
                .send()
                .await
                .expect("failed to execute request");

            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            let body: Value = response.json().await.expect("response should be JSON");
            assert_eq!(body, json!({ "error": "Not a JSON" }));
            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn updating_an_unknown_place_is_not_found() -> Result<()> {
    casita_test(
        |_| (),
        |TestingTools { test_client, .. }| async move {
            let response = test_client
                .put("/api/v1/places/no-such-place")
                .json(&json!({ "name": "Renamed" }))
                .send()
                .await
                .expect("failed to execute request");

            assert_eq!(response.status(), StatusCode::NOT_FOUND);
            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn deleting_a_place_removes_it() -> Result<()> {
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
                .delete(&format!("/api/v1/places/{}", place.id))
                .send()
                .await
                .expect("failed to execute request");
            assert_eq!(response.status(), StatusCode::OK);
            let body: Value = response.json().await.expect("response should be JSON");
            assert_eq!(body, json!({}));

            let response = test_client
                .get(&format!("/api/v1/places/{}", place.id))
                .send()
                .await
                .expect("failed to execute request");
            assert_eq!(response.status(), StatusCode::NOT_FOUND);

            let response = test_client
                .delete(&format!("/api/v1/places/{}", place.id))
                .send()
                .await
                .expect("failed to execute request");
            assert_eq!(response.status(), StatusCode::NOT_FOUND);
            Ok(())
        },
    )
    .await
}

//! Tests for the root view and other behavior that spans the whole app.

use anyhow::Result;
use pretty_assertions::assert_eq;
use reqwest::StatusCode;

use crate::{casita_test, TestingTools};

#[actix_rt::test]
async fn root_serves_a_description_by_default() -> Result<()> {
    casita_test(
        |_| (),
        |TestingTools { test_client, .. }| async move {
            let response = test_client
                .get("/")
                .send()
                .await
                .expect("failed to execute request");

            assert_eq!(response.status(), StatusCode::OK);
            let body = response.text().await.expect("response should have a body");
            assert!(body.contains("Casita"));
            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn root_redirects_to_documentation_when_configured() -> Result<()> {
    casita_test(
        |settings| {
            settings.public_documentation = Some("https://example.com/docs".to_string());
        },
        |TestingTools { test_client, .. }| async move {
            let response = test_client
                .get("/")
                .send()
                .await
                .expect("failed to execute request");

            // The test client does not follow redirects.
            assert_eq!(response.status(), StatusCode::FOUND);
            assert_eq!(
                response
                    .headers()
                    .get("location")
                    .and_then(|header| header.to_str().ok()),
                Some("https://example.com/docs")
            );
            Ok(())
        },
    )
    .await
}

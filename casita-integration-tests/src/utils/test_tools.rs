//! Tools for running tests.

use std::future::Future;
use std::net::TcpListener;
use std::sync::Arc;

use casita_settings::Settings;
use casita_store::{MemoryStorage, Storage};
use reqwest::{redirect, Client, ClientBuilder, RequestBuilder};

/// Run a test with a fully configured Casita server.
///
/// The server will listen on a port assigned arbitrarily by the OS, backed
/// by a fresh in-memory store. A suite of tools is passed to the test
/// function in the form of an instance of [`TestingTools`]: an HTTP client
/// configured to use the test server, and the storage handle the server
/// reads from, so fixtures can be seeded directly.
///
/// # Example
///
/// ```
/// # use casita_integration_tests::{casita_test, TestingTools};
/// #[actix_rt::test]
/// async fn a_test() {
///     casita_test(
///         |settings| settings.debug = false,
///         |TestingTools { test_client, .. }| async move {
///             assert!(true) // Test goes here
///         },
///     )
///     .await
/// }
/// ```
///
/// # Panics
/// May panic if tests could not be set up correctly.
pub async fn casita_test<FSettings, FTest, Fut>(settings_changer: FSettings, test: FTest) -> Fut::Output
where
    FSettings: FnOnce(&mut Settings),
    FTest: FnOnce(TestingTools) -> Fut,
    Fut: Future,
{
    let settings = Settings::load_for_tests(settings_changer);

    let storage = Arc::new(MemoryStorage::new());
    let storage_handle: Arc<dyn Storage> = storage.clone();

    // Run server in the background
    let listener = TcpListener::bind(settings.http.listen).expect("Failed to bind to a port");
    let address = listener.local_addr().expect("Listener has no address").to_string();
    let server =
        casita_web::run(listener, storage_handle, settings).expect("Failed to start server");
    let server_handle = tokio::spawn(server);
    let test_client = TestReqwestClient::new(address);

    let tools = TestingTools {
        test_client,
        storage,
    };
    let rv = test(tools).await;
    server_handle.abort();
    rv
}

/// A set of tools for tests.
///
/// The struct is marked as non-exhaustive, meaning that any destructuring of
/// it will require a `..` "and the rest" entry, even if all present items
/// are named. This makes adding tools in the future easier, since old tests
/// won't need to be rewritten to account for the added tools.
#[non_exhaustive]
pub struct TestingTools {
    /// A wrapper around a `reqwest::Client` that automatically uses the
    /// Casita server under test.
    pub test_client: TestReqwestClient,

    /// The store the server under test reads from, for seeding fixtures and
    /// inspecting side effects.
    pub storage: Arc<MemoryStorage>,
}

/// A wrapper around a [`reqwest::Client`] that automatically sends requests
/// to the test server.
///
/// The client is configured to not follow any redirects.
pub struct TestReqwestClient {
    /// The wrapped client.
    client: Client,

    /// The server address to implicitly use for all requests.
    address: String,
}

impl TestReqwestClient {
    /// Construct a new test client that uses `address` for every request given.
    pub fn new(address: String) -> Self {
        let client = ClientBuilder::new()
            .redirect(redirect::Policy::none())
            .build()
            .expect("Could not build test client");
        Self { client, address }
    }

    /// Start building a GET request to the test server with the path specified.
    ///
    /// The path should start with `/`, such as `/__heartbeat__`.
    pub fn get(&self, path: &str) -> RequestBuilder {
        assert!(path.starts_with('/'));
        let url = format!("http://{}{}", &self.address, path);
        self.client.get(url)
    }

    /// Start building a POST request to the test server with the path specified.
    pub fn post(&self, path: &str) -> RequestBuilder {
        assert!(path.starts_with('/'));
        let url = format!("http://{}{}", &self.address, path);
        self.client.post(url)
    }

    /// Start building a PUT request to the test server with the path specified.
    pub fn put(&self, path: &str) -> RequestBuilder {
        assert!(path.starts_with('/'));
        let url = format!("http://{}{}", &self.address, path);
        self.client.put(url)
    }

    /// Start building a DELETE request to the test server with the path specified.
    pub fn delete(&self, path: &str) -> RequestBuilder {
        assert!(path.starts_with('/'));
        let url = format!("http://{}{}", &self.address, path);
        self.client.delete(url)
    }
}

#![warn(missing_docs, clippy::missing_docs_in_private_items)]

//! Web server for Casita's public places API.

mod dockerflow;
mod errors;
mod places;

use std::net::TcpListener;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{
    dev::Server,
    get,
    web::{self, Data},
    App, HttpResponse, HttpServer,
};
use casita_settings::Settings;
use casita_store::Storage;
use tracing_actix_web_mozlog::MozLog;

/// Run the web server.
///
/// The returned server is a `Future` that must either be `.await`ed, or run
/// as a background task using `tokio::spawn`.
///
/// Most of the details from `settings` will be respected, except for those
/// that go into building the listener (the host and port). If you want to
/// respect the settings specified in that object, you must include them in
/// the construction of `listener`. The storage handle is shared by every
/// worker; its interior locking is the only synchronization between
/// requests.
///
/// # Errors
///
/// Returns an error if the server cannot be started on the provided
/// listener.
pub fn run(
    listener: TcpListener,
    storage: Arc<dyn Storage>,
    settings: Settings,
) -> Result<Server, std::io::Error> {
    let num_workers = settings.http.workers;

    let moz_log = MozLog::default();
    let storage = Data::new(storage);

    let mut server = HttpServer::new(move || {
        App::new()
            .app_data(Data::new(settings.clone()))
            .app_data(storage.clone())
            .wrap(moz_log.clone())
            .wrap(Cors::permissive())
            // The core functionality of Casita
            .service(web::scope("api/v1").configure(places::configure))
            .service(root_info)
            // Add the behavior necessary to satisfy Dockerflow.
            .service(web::scope("").configure(dockerflow::service))
    })
    .listen(listener)?;

    if let Some(n) = num_workers {
        server = server.workers(n);
    }

    let server = server.run();
    Ok(server)
}

/// The root view, to provide information about what this service is.
///
/// This is intended to be seen by people trying to investigate what this
/// service is. It should redirect to documentation, if it is available, or
/// provide a short message otherwise.
#[get("/")]
async fn root_info(settings: Data<Settings>) -> HttpResponse {
    match &settings.public_documentation {
        Some(redirect_url) => HttpResponse::Found()
            .insert_header(("location", redirect_url.to_string()))
            .finish(),
        None => HttpResponse::Ok()
            .content_type("text/plain")
            .body("Casita is a service providing a REST API for place listings."),
    }
}

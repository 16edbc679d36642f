use actix_web::{middleware, web, App, HttpServer};
use folio::{ContentStore, SessionGate};

mod handlers;
mod mailer;

/// Shared application state
pub struct AppState {
    pub store: ContentStore,
    pub gate: SessionGate,
    pub mailer: Box<dyn mailer::Mailer>,
    pub secure_cookies: bool,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init();
    log::info!("Starting folio server");

    let config = folio::Config::load().map_err(io_error)?;

    log::info!("Opening store at: {}", config.data_file.display());
    let store = config.open_store().map_err(io_error)?;

    if config.mail.api_key.is_none() {
        log::warn!("SENDGRID_API_KEY is not set, contact messages will fail");
    }

    let state = web::Data::new(AppState {
        store,
        gate: config.session_gate(),
        mailer: mailer::from_config(&config.mail),
        secure_cookies: config.secure_cookies,
    });

    if let Some(dir) = &config.static_dir {
        log::info!("Serving frontend from: {}", dir.display());
    }
    let static_dir = config.static_dir.clone();

    log::info!("Listening on {}:{}", config.host, config.port);
    HttpServer::new(move || {
        let app = App::new()
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(handlers::configure);
        match &static_dir {
            Some(dir) => app.service(actix_files::Files::new("/", dir).index_file("index.html")),
            None => app,
        }
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}

fn io_error(e: folio::FolioError) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, e)
}

pub mod application;
pub mod auth;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod openapi;
pub mod schema;

#[cfg(test)]
mod test_support;

use actix_web::{error::JsonPayloadError, middleware::Logger, web, App, HttpRequest, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::application::AppServices;
use crate::auth::TokenService;
use crate::errors::AppError;
use crate::handlers::{auth as auth_handlers, orders, products, records};
use crate::openapi::ApiDoc;

pub use config::AppConfig;
pub use db::{create_pool, DbPool};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) {
    let mut conn = pool.get().expect("Failed to get DB connection for migrations");
    conn.run_pending_migrations(MIGRATIONS)
        .expect("Failed to run database migrations");
}

fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::BadRequest(format!("JSON parse error - {err}")).into()
}

/// Mounts every `/api` route. Shared by the server and tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(
                web::scope("/auth")
                    .route("/login/", web::post().to(auth_handlers::login))
                    .route("/refresh/", web::post().to(auth_handlers::refresh))
                    .route("/logout/", web::post().to(auth_handlers::logout))
                    .route("/verify-token/", web::get().to(auth_handlers::verify_token)),
            )
            .service(
                web::scope("/products")
                    .route("/", web::get().to(products::list_products))
                    .route("/", web::post().to(products::create_product))
                    .route("/{id}/", web::get().to(products::get_product))
                    .route("/{id}/", web::put().to(products::replace_product))
                    .route("/{id}/", web::patch().to(products::patch_product))
                    .route("/{id}/", web::delete().to(products::delete_product)),
            )
            .service(
                web::scope("/orders")
                    .route("/", web::get().to(orders::list_orders))
                    .route("/", web::post().to(orders::create_order))
                    .route("/{id}/", web::get().to(orders::get_order))
                    .route("/{id}/", web::put().to(orders::replace_order))
                    .route("/{id}/", web::patch().to(orders::patch_order))
                    .route("/{id}/", web::delete().to(orders::delete_order))
                    .route("/{id}/complete/", web::post().to(orders::complete_order))
                    .route("/{id}/items/", web::post().to(orders::add_item))
                    .route("/{id}/items/{item_id}/", web::patch().to(orders::update_item))
                    .route("/{id}/items/{item_id}/", web::delete().to(orders::remove_item)),
            )
            .service(
                web::scope("/salerecords")
                    .route("/", web::get().to(records::list_sales))
                    .route("/", web::post().to(records::record_sale))
                    .route("/{id}/", web::get().to(records::get_sale))
                    .route("/{id}/", web::delete().to(records::reverse_sale)),
            )
            .route("/combined-records/", web::get().to(records::list_combined)),
    );
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    pool: DbPool,
    tokens: TokenService,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    let services = web::Data::new(AppServices::new(pool, tokens.clone()));
    let tokens = web::Data::new(tokens);
    let openapi = ApiDoc::openapi();

    Ok(HttpServer::new(move || {
        App::new()
            .app_data(services.clone())
            .app_data(tokens.clone())
            .app_data(web::JsonConfig::default().error_handler(json_error))
            .wrap(Logger::default())
            .configure(configure)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi.clone()),
            )
    })
    .bind((host.to_string(), port))?
    .run())
}

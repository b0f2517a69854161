use chrono::Duration;
use dotenvy::dotenv;
use inventory_service::application::AuthService;
use inventory_service::auth::TokenService;
use inventory_service::infrastructure::DieselUserRepository;
use inventory_service::{build_server, create_pool, run_migrations, AppConfig};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = AppConfig::from_env().unwrap_or_else(|e| {
        log::error!("invalid configuration: {e}");
        std::process::exit(1);
    });

    let pool = create_pool(&config.database_url, config.db_pool_size);
    run_migrations(&pool);

    let tokens = TokenService::new(
        config.jwt_secret.as_bytes(),
        Duration::hours(config.access_token_hours),
        Duration::days(config.refresh_token_days),
    );

    if let Some((username, password)) = &config.admin {
        let auth = AuthService::new(DieselUserRepository::new(pool.clone()), tokens.clone());
        if let Err(e) = auth.seed_user(username, password) {
            log::error!("failed to seed user '{username}': {e}");
        }
    }

    log::info!("Starting server at http://{}:{}", config.host, config.port);

    build_server(pool, tokens, &config.host, config.port)?.await
}

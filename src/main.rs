use actix_web::{middleware::Logger, web, App, HttpServer};
use config::Config;
use errors::AppError;
use dotenv::dotenv;
use models::Models;
use sqlx::postgres::PgPoolOptions;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod errors;
mod handlers;
mod models;
mod schema;
mod utils;
mod validator;
#[cfg(test)]
mod test_init_app;

struct GlobalState{
    models: Models,
    environment: String,
}

#[actix_web::main]
async fn main() -> Result<(), AppError> {

    dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "course_catalog=debug,actix_web=info".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let pool = PgPoolOptions::new()
    .max_connections(config.db_max_connections)
    .acquire_timeout(config.db_acquire_timeout)
    .connect(&config.database_url)
    .await
    .map_err(|e| {
        error!("database connection failed: {}", e);
        AppError::DbConnect
    })?;

    info!("database connection pool established");

    let global_state = GlobalState{
        models: Models::new(pool),
        environment: config.environment.clone(),
    };

    let app_data = web::Data::new(global_state);

    info!(address = %config.address, environment = %config.environment, "starting server");

    HttpServer::new(
        move||{
            App::new()
            .wrap(Logger::default())
            .app_data(handlers::json_config())
            .service(
                web::scope("/api/v1")
                .app_data(app_data.clone())
                .configure(handlers::routes)
            )
        }
    ).bind(&config.address)
    .map_err(|_e|AppError::SocketBind)?
    .run()
    .await
    .map_err(|_e|AppError::ServerStart)?;

    Ok(())

}

use actix_web::{middleware::Logger, web, App, HttpServer};

use cuestionario_server::{
    app_state::AppState, auth::AuthMiddleware, config::Config, middleware::RequestIdMiddleware,
    routes,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env();
    if config.is_production() {
        config.validate_for_production();
    }

    let host = config.web_server_host.clone();
    let port = config.web_server_port;
    let state = AppState::new(config).await;

    log::info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .wrap(AuthMiddleware::new(
                state.gate.clone(),
                state.policies.clone(),
            ))
            .wrap(RequestIdMiddleware)
            .wrap(Logger::default())
            .app_data(web::Data::new(state.clone()))
            .configure(|cfg| routes::configure(cfg, &state))
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}

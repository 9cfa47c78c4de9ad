use actix_web::{App, HttpServer, web};
use std::env;
use timetabler::www;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let server_address = env::var("BIND_ADDRESS").unwrap_or_else(|_| String::from("0.0.0.0"));
    let server_port = env::var("PORT").unwrap_or_else(|_| String::from("8080"));
    let bind_address = format!("{}:{}", server_address, server_port);

    eprintln!("Starting server at: http://{}/", bind_address);
    HttpServer::new(|| {
        App::new()
            .route("/", web::get().to(www::handlers::index))
            .route("/schedules", web::get().to(www::handlers::schedule::index))
            .route("/schedule", web::get().to(www::handlers::schedule::show))
            .route("/api/solve", web::post().to(www::handlers::solve::post))
    })
    .bind(bind_address)?
    .run()
    .await
}

//! src/startup.rs
use crate::configuration::{DatabaseSettings, Settings};
use crate::email_client::EmailClient;
use crate::routes::{health_check, home, subscribe};
use actix_web::dev::Server;
use actix_web::error::InternalError;
use actix_web::{App, HttpResponse, HttpServer, web};
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use std::net::TcpListener;
use tracing_actix_web::TracingLogger;

pub struct Application {
    port: u16,
    server: Server,
}

impl Application {
    pub async fn build(configuration: &Settings) -> Result<Self, anyhow::Error> {
        let connection_pool = get_connection_pool(&configuration.database).await?;
        // Replaces a separate init-db step: the schema is embedded and applied
        // on every start.
        sqlx::migrate!("./migrations").run(&connection_pool).await?;

        let sender_email = configuration
            .email_client
            .sender()
            .expect("Failed to parse the sender email address.");
        let email_client = EmailClient::new(
            configuration.email_client.base_url.clone(),
            sender_email,
            configuration.email_client.authorization_token.clone(),
            configuration.email_client.timeout(),
        );

        let address = format!(
            "{}:{}",
            configuration.application.host, configuration.application.port
        );
        let listener = TcpListener::bind(address)?;
        let port = listener.local_addr()?.port();
        let server = run(listener, connection_pool, email_client)?;

        Ok(Self { port, server })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

pub async fn get_connection_pool(
    configuration: &DatabaseSettings,
) -> Result<SqlitePool, sqlx::Error> {
    SqlitePoolOptions::new()
        .connect_with(configuration.connection_options())
        .await
}

pub fn run(
    listener: TcpListener,
    pool: SqlitePool,
    email_client: EmailClient,
) -> Result<Server, anyhow::Error> {
    let pool = web::Data::new(pool);
    let email_client = web::Data::new(email_client);

    let server = HttpServer::new(move || {
        // Malformed or incomplete payloads get the same `{"error": ...}` shape
        // as domain-level rejections.
        let json_config = web::JsonConfig::default().error_handler(|err, _req| {
            let response = HttpResponse::BadRequest()
                .json(serde_json::json!({ "error": err.to_string() }));
            InternalError::from_response(err, response).into()
        });
        App::new()
            .wrap(TracingLogger::default())
            .route("/health_check", web::get().to(health_check))
            .route("/", web::get().to(home))
            .route("/subscribe", web::post().to(subscribe))
            .app_data(json_config)
            .app_data(pool.clone())
            .app_data(email_client.clone())
    })
    .listen(listener)?
    .run();
    Ok(server)
}

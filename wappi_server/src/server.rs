use std::time::Duration;

use actix_jwt_auth_middleware::use_jwt::UseJWTOnApp;
use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use log::*;
use wappi_engine::{
    notifications::{HubHandle, NotificationHub},
    ImportApi,
    OrderFlowApi,
    SettingsApi,
    SqliteDatabase,
};

use crate::{
    auth::{build_wappi_authority, TokenVerifier},
    config::{ServerConfig, ServerOptions},
    errors::ServerError,
    routes::{
        health,
        AllOrdersRoute,
        ClaimInfoRoute,
        ClaimOrderRoute,
        CreateImportRecordRoute,
        CreateOrderRoute,
        CreateOrderWithLinkRoute,
        DeleteImportRecordRoute,
        DeleteImportRecordsRoute,
        DeliveryFeeRoute,
        ImportRecordRoute,
        ImportRecordsRoute,
        MyOrdersRoute,
        OrderByIdRoute,
        ReplaceImportRecordRoute,
        SettingsRoute,
        UpdateOrderRoute,
        UpdateSettingsRoute,
        UpdateStatusRoute,
        UploadImportRoute,
    },
    ws::websocket,
};

/// Largest spreadsheet upload the server accepts.
pub const MAX_UPLOAD_SIZE: usize = 10 * 1024 * 1024;

/// How long the hub gets to wind down after the HTTP server stops.
const HUB_SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(config.database_url.reveal(), 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.migrate().await.map_err(|e| ServerError::InitializeError(format!("Migrations failed. {e}")))?;
    let hub = NotificationHub::new(config.hub_buffer_size);
    let hub_handle = hub.handle();
    let hub_task = tokio::spawn(hub.run());
    info!("📡️ Notification hub started");
    let srv = create_server_instance(config, db, hub_handle)?;
    let result = srv.await.map_err(|e| ServerError::Unspecified(e.to_string()));
    // Every hub handle lived inside the server, so the hub stops once its queue drains
    match time_limited(hub_task).await {
        Ok(()) => info!("📡️ Notification hub stopped"),
        Err(e) => warn!("📡️ Notification hub did not stop cleanly. {e}"),
    }
    result
}

async fn time_limited(task: tokio::task::JoinHandle<()>) -> Result<(), String> {
    match tokio::time::timeout(HUB_SHUTDOWN_GRACE, task).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(e.to_string()),
        Err(_) => Err("Timed out waiting for connected clients to go away".to_string()),
    }
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    hub: HubHandle,
) -> Result<Server, ServerError> {
    // Fail at startup rather than in every worker
    build_wappi_authority(config.auth.clone())?;
    let auth_config = config.auth.clone();
    let verifier = TokenVerifier::new(&config.auth);
    let options = ServerOptions::from_config(&config);
    let frontend_url = config.frontend_url.clone();
    let srv = HttpServer::new(move || {
        let orders_api = OrderFlowApi::new(db.clone(), hub.clone(), frontend_url.as_str());
        let imports_api = ImportApi::new(db.clone());
        let settings_api = SettingsApi::new(db.clone());
        let authority =
            build_wappi_authority(auth_config.clone()).expect("Authority configuration was validated at startup");
        let app = App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("wappi::access_log"))
            .app_data(web::Data::new(orders_api))
            .app_data(web::Data::new(imports_api))
            .app_data(web::Data::new(settings_api))
            .app_data(web::Data::new(hub.clone()))
            .app_data(web::Data::new(verifier.clone()))
            .app_data(web::Data::new(options))
            .app_data(web::PayloadConfig::new(MAX_UPLOAD_SIZE));
        // Routes that require authentication. More specific paths are registered before `{id}` captures.
        let auth_scope = web::scope("/api")
            .service(CreateOrderRoute::<SqliteDatabase>::new())
            .service(CreateOrderWithLinkRoute::<SqliteDatabase>::new())
            .service(ClaimOrderRoute::<SqliteDatabase>::new())
            .service(MyOrdersRoute::<SqliteDatabase>::new())
            .service(UpdateStatusRoute::<SqliteDatabase>::new())
            .service(OrderByIdRoute::<SqliteDatabase>::new())
            .service(AllOrdersRoute::<SqliteDatabase>::new())
            .service(UpdateOrderRoute::<SqliteDatabase>::new())
            .service(ImportRecordsRoute::<SqliteDatabase>::new())
            .service(CreateImportRecordRoute::<SqliteDatabase>::new())
            .service(DeleteImportRecordsRoute::<SqliteDatabase>::new())
            .service(UploadImportRoute::<SqliteDatabase>::new())
            .service(ImportRecordRoute::<SqliteDatabase>::new())
            .service(ReplaceImportRecordRoute::<SqliteDatabase>::new())
            .service(DeleteImportRecordRoute::<SqliteDatabase>::new())
            .service(SettingsRoute::<SqliteDatabase>::new())
            .service(UpdateSettingsRoute::<SqliteDatabase>::new())
            .service(DeliveryFeeRoute::<SqliteDatabase>::new());
        // The public claim route must be matched before the `/api` scope swallows it
        app.service(health)
            .service(websocket)
            .service(ClaimInfoRoute::<SqliteDatabase>::new())
            .use_jwt(authority, auth_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    info!("🚀️ Listening on {}:{}", config.host, config.port);
    Ok(srv)
}

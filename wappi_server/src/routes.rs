//! Request handler definitions
//!
//! Define each route and it handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests. Database and hub calls are all async, so keep it that way.
//!
//! Routes under `/api` sit behind the JWT authentication middleware, and the claims of the caller are available to
//! handlers as a [`JwtClaims`] extractor. Routes that need more than a valid token say so with `requires [...]`.
use actix_web::{get, web, HttpResponse, Responder};
use log::*;
use wappi_engine::{
    db_types::{NewImportRecord, SettingsUpdate},
    order_objects::{NewOrderRequest, OrderUpdateRequest},
    traits::{ImportManagement, SettingsManagement, WappiDatabase},
    ImportApi,
    OrderFlowApi,
    SettingsApi,
};

use crate::{
    auth::{JwtClaims, Role},
    data_objects::{
        DeleteResult,
        DeliveryFeeParams,
        DeliveryFeeResult,
        JsonResponse,
        StatusUpdateParams,
        UploadParams,
    },
    errors::ServerError,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $bound:path where requires [$($roles:expr),+]) => {
        paste::paste! { pub struct [<$name:camel Route>]<B>(core::marker::PhantomData<fn() -> B>);}
        paste::paste! { impl<B> [<$name:camel Route>]<B> {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self(core::marker::PhantomData::<fn() -> B>)
            }
        }}
        paste::paste! { impl<B> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<B>
        where
            B: $bound + 'static,
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::<B>)
                    .wrap($crate::middleware::AclMiddlewareFactory::new(&[$($roles),+]));
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };

    ($name:ident => $method:ident $path:literal impl $bound:path) => {
        paste::paste! { pub struct [<$name:camel Route>]<B>(core::marker::PhantomData<fn() -> B>);}
        paste::paste! { impl<B> [<$name:camel Route>]<B> {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self(core::marker::PhantomData::<fn() -> B>)
            }
        }}
        paste::paste! { impl<B> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<B>
        where
            B: $bound + 'static,
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::<B>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Claims  ----------------------------------------------------
// Public. Registered outside the `/api` scope so that the claim page can load before the customer logs in.
route!(claim_info => Get "/api/claim/{token}" impl WappiDatabase);
pub async fn claim_info<B: WappiDatabase>(
    path: web::Path<String>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let token = path.into_inner();
    trace!("💻️ GET claim info");
    let info = api.claim_info(&token).await?;
    Ok(HttpResponse::Ok().json(info))
}

route!(claim_order => Post "/orders/claim/{token}" impl WappiDatabase);
/// Assigns the order behind a claim link to the caller. Claiming an order you already own is a no-op; claiming
/// someone else's order is a 409.
pub async fn claim_order<B: WappiDatabase>(
    claims: JwtClaims,
    path: web::Path<String>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let token = path.into_inner();
    debug!("💻️ POST claim order for {}", claims.user_id);
    let order = api.claim_order(&token, &claims.user_id).await?;
    Ok(HttpResponse::Ok().json(order))
}

//----------------------------------------------   Orders  ----------------------------------------------------
route!(create_order => Post "/orders" impl WappiDatabase);
/// Customers always create orders for themselves. Managers may set `user_id` to create an order on a customer's
/// behalf.
pub async fn create_order<B: WappiDatabase>(
    claims: JwtClaims,
    body: web::Json<NewOrderRequest>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let mut request = body.into_inner();
    if !claims.is_manager() || request.user_id.is_none() {
        request.user_id = Some(claims.user_id.clone());
    }
    debug!("💻️ POST new order for {:?}", request.user_id);
    let order = api.create_order(request).await?;
    Ok(HttpResponse::Created().json(order))
}

route!(create_order_with_link => Post "/orders/link" impl WappiDatabase where requires [Role::Manager]);
pub async fn create_order_with_link<B: WappiDatabase>(
    body: web::Json<NewOrderRequest>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ POST new order with claim link");
    let result = api.create_order_with_link(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(result))
}

route!(my_orders => Get "/orders/mine" impl WappiDatabase);
pub async fn my_orders<B: WappiDatabase>(
    claims: JwtClaims,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET my_orders for {}", claims.user_id);
    let orders = api.orders_for_user(&claims.user_id).await?;
    Ok(HttpResponse::Ok().json(orders))
}

route!(order_by_id => Get "/orders/{id}" impl WappiDatabase);
/// Customers can only see their own orders. Managers can see any order.
pub async fn order_by_id<B: WappiDatabase>(
    claims: JwtClaims,
    path: web::Path<String>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    debug!("💻️ GET order {id} for {}", claims.user_id);
    let order = api.fetch_order(&id).await?;
    if claims.is_manager() || order.user_id.as_deref() == Some(claims.user_id.as_str()) {
        Ok(HttpResponse::Ok().json(order))
    } else {
        Err(ServerError::InsufficientPermissions(format!("Order {id} belongs to another customer")))
    }
}

route!(update_status => Patch "/orders/{id}/status" impl WappiDatabase where requires [Role::Manager]);
pub async fn update_status<B: WappiDatabase>(
    path: web::Path<String>,
    body: web::Json<StatusUpdateParams>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    let StatusUpdateParams { status } = body.into_inner();
    debug!("💻️ PATCH status of order {id} to {status}");
    let order = api.update_status(&id, &status).await?;
    Ok(HttpResponse::Ok().json(order))
}

//----------------------------------------------   Admin: orders  ----------------------------------------------
route!(all_orders => Get "/admin/orders" impl WappiDatabase where requires [Role::Manager]);
pub async fn all_orders<B: WappiDatabase>(api: web::Data<OrderFlowApi<B>>) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET all orders");
    let orders = api.all_orders().await?;
    Ok(HttpResponse::Ok().json(orders))
}

route!(update_order => Patch "/admin/orders/{id}" impl WappiDatabase where requires [Role::Manager]);
pub async fn update_order<B: WappiDatabase>(
    path: web::Path<String>,
    body: web::Json<OrderUpdateRequest>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    debug!("💻️ PATCH order {id}");
    let order = api.update_order(&id, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(order))
}

//----------------------------------------------   Admin: imports  ---------------------------------------------
route!(import_records => Get "/admin/imports" impl ImportManagement where requires [Role::Manager]);
pub async fn import_records<B: ImportManagement>(api: web::Data<ImportApi<B>>) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET import records");
    let records = api.fetch_all().await?;
    Ok(HttpResponse::Ok().json(records))
}

route!(create_import_record => Post "/admin/imports" impl ImportManagement where requires [Role::Manager]);
pub async fn create_import_record<B: ImportManagement>(
    body: web::Json<NewImportRecord>,
    api: web::Data<ImportApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ POST import record");
    let record = api.create(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(record))
}

route!(delete_import_records => Delete "/admin/imports" impl ImportManagement where requires [Role::Manager]);
pub async fn delete_import_records<B: ImportManagement>(
    api: web::Data<ImportApi<B>>,
) -> Result<HttpResponse, ServerError> {
    info!("💻️ DELETE all import records");
    let deleted = api.delete_all().await?;
    Ok(HttpResponse::Ok().json(DeleteResult { deleted }))
}

// Registered before the `{id}` routes so that "upload" is not taken for an id.
route!(upload_import => Post "/admin/imports/upload" impl ImportManagement where requires [Role::Manager]);
/// Imports the first sheet of the workbook sent as the raw request body.
pub async fn upload_import<B: ImportManagement>(
    body: web::Bytes,
    query: web::Query<UploadParams>,
    api: web::Data<ImportApi<B>>,
) -> Result<HttpResponse, ServerError> {
    info!("💻️ POST price list upload ({} bytes)", body.len());
    if body.is_empty() {
        return Err(ServerError::InvalidRequestBody("The uploaded file is empty".to_string()));
    }
    let summary = api.import_workbook(&body, query.into_inner().profile_id).await?;
    Ok(HttpResponse::Ok().json(summary))
}

route!(import_record => Get "/admin/imports/{id}" impl ImportManagement where requires [Role::Manager]);
pub async fn import_record<B: ImportManagement>(
    path: web::Path<String>,
    api: web::Data<ImportApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    debug!("💻️ GET import record {id}");
    let record = api.fetch(&id).await?;
    Ok(HttpResponse::Ok().json(record))
}

route!(replace_import_record => Put "/admin/imports/{id}" impl ImportManagement where requires [Role::Manager]);
pub async fn replace_import_record<B: ImportManagement>(
    path: web::Path<String>,
    body: web::Json<NewImportRecord>,
    api: web::Data<ImportApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    let NewImportRecord { data, profile_id } = body.into_inner();
    debug!("💻️ PUT import record {id}");
    let record = api.update(&id, data, profile_id).await?;
    Ok(HttpResponse::Ok().json(record))
}

route!(delete_import_record => Delete "/admin/imports/{id}" impl ImportManagement where requires [Role::Manager]);
pub async fn delete_import_record<B: ImportManagement>(
    path: web::Path<String>,
    api: web::Data<ImportApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    debug!("💻️ DELETE import record {id}");
    api.delete(&id).await?;
    Ok(HttpResponse::Ok().json(JsonResponse::success(format!("Import record {id} deleted"))))
}

//----------------------------------------------   Settings  ---------------------------------------------------
route!(settings => Get "/admin/settings" impl SettingsManagement where requires [Role::Manager]);
pub async fn settings<B: SettingsManagement>(api: web::Data<SettingsApi<B>>) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET settings");
    let settings = api.fetch().await?;
    Ok(HttpResponse::Ok().json(settings))
}

route!(update_settings => Patch "/admin/settings" impl SettingsManagement where requires [Role::Manager]);
pub async fn update_settings<B: SettingsManagement>(
    body: web::Json<SettingsUpdate>,
    api: web::Data<SettingsApi<B>>,
) -> Result<HttpResponse, ServerError> {
    info!("💻️ PATCH settings");
    let settings = api.update(body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(settings))
}

route!(delivery_fee => Post "/delivery_fee" impl SettingsManagement);
pub async fn delivery_fee<B: SettingsManagement>(
    body: web::Json<DeliveryFeeParams>,
    api: web::Data<SettingsApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let DeliveryFeeParams { location, items } = body.into_inner();
    trace!("💻️ POST delivery fee quote for {} items", items.len());
    let fee = api.calculate_delivery_fee(&location, &items).await?;
    Ok(HttpResponse::Ok().json(DeliveryFeeResult { fee }))
}

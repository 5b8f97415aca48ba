//! OpenAPI document for the REST API, served by Swagger UI at `/docs`.

use utoipa::OpenApi;

/// OpenAPI specification for every REST endpoint.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "SwapStop API",
        description = "Users list items and propose item-for-item trades."
    ),
    paths(
        crate::api::handlers::users::create_user,
        crate::api::handlers::users::list_users,
        crate::api::handlers::users::delete_user,
        crate::api::handlers::users::create_item_for_user,
        crate::api::handlers::users::list_user_items,
        crate::api::handlers::users::propose_trade,
        crate::api::handlers::users::list_user_trades,
        crate::api::handlers::items::list_items,
        crate::api::handlers::items::search_items,
        crate::api::handlers::items::get_item,
        crate::api::handlers::items::delete_item,
        crate::api::handlers::trades::get_trade,
        crate::api::handlers::trades::update_trade_status,
        crate::api::handlers::auth::login,
        crate::api::handlers::system::health_handler,
    ),
    components(schemas(crate::error::ErrorResponse, crate::domain::TradeStatus)),
    tags(
        (name = "Users", description = "Registration and per-user resources"),
        (name = "Items", description = "Listed items and search"),
        (name = "Trades", description = "Trade proposals and their lifecycle"),
        (name = "Auth", description = "Credential check"),
        (name = "System", description = "Operational endpoints"),
    )
)]
pub struct ApiDoc;

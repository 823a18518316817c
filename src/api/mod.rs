mod handlers;
pub mod middleware;
pub mod response;

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::relay;
use crate::state::AppState;

pub use response::{ApiResponse, Pagination};

pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        // Auth
        .route("/auth/register", post(handlers::register))
        .route("/auth/login", post(handlers::login))
        .route("/auth/me", get(handlers::me))
        // Boards
        .route("/boards", get(handlers::list_boards).post(handlers::create_board))
        .route(
            "/boards/{id}",
            get(handlers::get_board)
                .put(handlers::update_board)
                .delete(handlers::delete_board),
        )
        .route("/boards/{id}/members", post(handlers::add_member))
        .route(
            "/boards/{id}/lists",
            get(handlers::list_lists).post(handlers::create_list),
        )
        .route("/boards/{id}/tasks", get(handlers::list_board_tasks))
        .route("/boards/{id}/activities", get(handlers::list_activities))
        // Lists
        .route(
            "/lists/{id}",
            put(handlers::update_list).delete(handlers::delete_list),
        )
        .route(
            "/lists/{id}/tasks",
            get(handlers::list_tasks).post(handlers::create_task),
        )
        // Tasks
        .route(
            "/tasks/{id}",
            put(handlers::update_task).delete(handlers::delete_task),
        )
        .route("/tasks/{id}/move", put(handlers::move_task))
        // Users
        .route("/users", get(handlers::list_users))
        .route("/users/search", get(handlers::search_users))
        // Relay
        .route("/ws", get(relay::ws_handler))
        // Health
        .route("/health", get(handlers::health));

    let cors = middleware::cors_layer(&state.config);

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

mod health;
mod users;

pub use health::health_check;
pub use users::auth_routes_config;

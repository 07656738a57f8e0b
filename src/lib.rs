pub mod app;
pub mod config;
pub mod demo_seeder;
pub mod error;
pub mod state;
pub mod api {
    pub mod errors;
    pub mod fictions;
    pub mod query;
    pub mod upload;
    pub mod users;
}
pub mod auth {
    pub mod demo_auth;
    pub mod models;
    pub mod token;
}
pub mod db {
    pub mod fiction_repository;
    pub mod models;
    pub mod user_repository;
}
pub mod models {
    pub mod fiction;
}
pub mod storage {
    pub mod client;
}
pub mod validation {
    pub mod sanitize;
    pub mod validate;
}

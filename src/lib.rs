pub mod error;
pub mod model;
pub mod repository;
pub mod routes;
pub mod service;
pub mod utils;

pub mod clients;
pub mod dtos;
pub mod gate;
pub mod handlers;
pub mod model;
pub mod routes;
pub mod services;

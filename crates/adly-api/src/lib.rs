pub mod ads;
pub mod auth;
pub mod error;
pub mod html;
pub mod middleware;
pub mod oauth;
pub mod pages;
pub mod routes;

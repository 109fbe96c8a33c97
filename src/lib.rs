//! Attendance tracking for a metal workshop: check-in classification, net
//! hours with lunch deducted, rolling statistics and the weekly report,
//! served over actix-web with a MySQL record store.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod docs;
pub mod engine;
pub mod model;
pub mod models;
pub mod repository;
pub mod routes;
pub mod utils;

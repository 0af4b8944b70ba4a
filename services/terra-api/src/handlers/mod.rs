//! HTTP request handlers for the TerraSight viewer.

pub mod api;
pub mod common;
pub mod health;
pub mod pages;

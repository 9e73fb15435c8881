pub mod api;
pub mod auth;
pub mod backend;
pub mod config;
pub mod domain;
pub mod error;
pub mod repository;
pub mod seed;
pub mod service;
pub mod web;

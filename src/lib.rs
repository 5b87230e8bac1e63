pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod models;
pub mod notifier;
pub mod repository;
pub mod router;
pub mod scheduler;
pub mod service;

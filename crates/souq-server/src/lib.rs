//! # souq-server
//!
//! HTTP backend for the Souq classifieds site.
//!
//! This crate provides:
//! - **REST API** (axum) for listing, creating, and deleting offers
//! - **Image upload pipeline** that validates multipart uploads and turns
//!   them into stable public URLs under `/uploads/`
//! - **Static location catalog** driving the frontend's country/city pickers
//!
//! Offer persistence lives in the `souq-store` crate.

pub mod api;
pub mod config;
pub mod error;
pub mod locations;
pub mod uploads;

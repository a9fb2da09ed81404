//! # Vidora Core
//!
//! Core library for the Vidora video platform, providing the domain model,
//! the JSON envelopes shared with clients, and the storage ports the HTTP
//! server talks to.
//!
//! ## Overview
//!
//! `vidora-core` is the foundation of the Vidora backend, offering:
//!
//! - **Domain Model**: users, videos, comments, likes, subscriptions,
//!   playlists and tweets, plus the read projections the API returns
//! - **API Types**: the success/failure envelopes and pagination helpers
//! - **Repository Ports**: `async_trait` interfaces grouped per resource
//! - **PostgreSQL Adapters**: `sqlx` implementations of every port
//! - **Toggle Primitive**: shared like/subscription toggling
//!
//! ## Feature Flags
//!
//! - `test-utils`: an in-memory implementation of every repository port
//! - `pg-tests`: repository tests against a live PostgreSQL (`DATABASE_URL`)
//!
//! ## Architecture
//!
//! - [`api`]: versioned route constants
//! - [`api_types`]: envelopes and pagination
//! - [`domain`]: entities and projections
//! - [`database`]: ports and adapters
//! - [`application`]: the unit of work and cross-port operations
//!
//! ## Examples
//!
//! ```no_run
//! use vidora_core::application::{toggle_like, unit_of_work::AppUnitOfWork};
//! use vidora_core::domain::LikeTarget;
//! use uuid::Uuid;
//!
//! async fn like_twice(uow: &AppUnitOfWork, video: Uuid, actor: Uuid) -> vidora_core::Result<()> {
//!     let first = toggle_like(uow.likes.as_ref(), LikeTarget::Video(video), actor).await?;
//!     let second = toggle_like(uow.likes.as_ref(), LikeTarget::Video(video), actor).await?;
//!     assert_ne!(first.is_liked, second.is_liked);
//!     Ok(())
//! }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]

/// Versioned API route definitions
pub mod api;
/// Envelopes and pagination shared across the API boundary
pub mod api_types;
/// Unit of work and operations spanning several ports
pub mod application;
/// Repository ports and their adapters
pub mod database;
/// Entities and read projections
pub mod domain;
pub mod error;

pub use error::{CoreError, Result};

/// Embedded schema migrations for the PostgreSQL store.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

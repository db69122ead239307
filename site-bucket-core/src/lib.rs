#![doc = "site-bucket-core: core logic library for site-bucket."]

//! This crate contains the provisioning and synchronisation logic for hosting a
//! static website from an object-storage bucket. It has no cloud SDK
//! dependency: all remote calls go through [`contract::StorageService`].
//!
//! # Usage
//! - [`provision::setup_bucket`] creates (or reuses) a bucket, makes it
//!   publicly readable and enables website hosting.
//! - [`synchronise::sync`] uploads a local directory tree into the bucket.
//! - [`provision::website_url`] gives the public URL of the result.

pub mod content_type;
pub mod contract;
pub mod endpoints;
pub mod error;
pub mod provision;
pub mod synchronise;
pub mod walk;

pub use error::{RemoteServiceError, SiteError};

//! Resolwe Core
//!
//! Core types shared by the Resolwe client and command line tools.
//!
//! This crate contains:
//! - Domain types: server-side entities (Data objects, descriptor schemas, storage)
//! - DTOs: request bodies sent to the Resolwe REST API

pub mod domain;
pub mod dto;

//! Core domain types
//!
//! These types mirror the objects returned by the Resolwe REST API. They are
//! deserialized by the client and handed to callers (CLI, task observers).

pub mod data;
pub mod descriptor;
pub mod storage;

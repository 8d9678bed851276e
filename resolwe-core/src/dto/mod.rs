//! Data Transfer Objects for the Resolwe REST API
//!
//! Request bodies sent by the client. Responses are deserialized straight
//! into the domain types, except for the upload endpoint which has its own
//! response shape.

pub mod auth;
pub mod data;
pub mod upload;

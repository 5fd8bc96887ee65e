//! cdm-api: Shared types for talking to a Rubrik CDM cluster
//!
//! Contains the resolved connection settings, the snapshot request model,
//! and the request/response bodies of the cluster REST endpoints used by
//! the task modules.

pub mod connection;
pub mod requests;
pub mod responses;

pub use connection::{ConnectionConfig, Secret};
pub use requests::{HostOs, ObjectType, OnDemandSnapshotRequest};

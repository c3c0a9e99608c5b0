//! AWS CloudFormation backend for stackflow
//!
//! [`CloudFormationClient`] implements [`stackflow_cloud::StackClient`] over
//! `aws-sdk-cloudformation`. Vendor error codes are classified here and never
//! leave this crate.

pub mod client;
pub mod error;
pub mod link;

pub use client::CloudFormationClient;
pub use error::{AwsError, Result, classify};
pub use link::change_set_link;

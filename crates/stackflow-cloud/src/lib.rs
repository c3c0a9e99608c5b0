//! stackflow control-plane abstraction
//!
//! The lifecycle code in `stackflow-compose` talks to the remote control plane
//! only through [`StackClient`]. Adapters such as `stackflow-cloud-aws`
//! translate vendor errors into [`ClientError`] so nothing above this crate
//! matches on vendor error strings.

pub mod changeset;
pub mod client;
pub mod error;
pub mod request;
pub mod status;
pub mod wait;

pub use changeset::{ChangeSetHandle, change_set_name};
pub use client::StackClient;
pub use error::{ClientError, Result};
pub use request::{StackRequest, TemplateBody};
pub use status::StackStatus;
pub use wait::{WaitConfig, poll_until};

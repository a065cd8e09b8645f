//! GCP Cloud Functions listings.
//!
//! This module lists the functions deployed in a project across all
//! regions, following the server's pagination cursor and normalising each
//! record for display.

pub mod error;
pub mod functions;
pub mod lister;

pub use error::GcpError;
pub use functions::{CloudFunction, CloudFunctionsClient, PAGE_SIZE};
pub use lister::{
    CloudFunctionsGateway, FunctionsLister, FunctionsSettings, GcpAuthMethod,
};

#[cfg(test)]
pub use lister::MockCloudFunctionsGateway;

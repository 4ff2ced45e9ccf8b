//! Memory sync pipeline.
//!
//! A run logs in once, resolves the guardian's dependents once, then walks
//! backwards one day at a time: list the attachments posted in a short
//! window ending on that day, and download the ones not seen before.
//!
//! Windows overlap on purpose so memories posted near midnight in another
//! timezone are not missed. The `MediaDownloader` is what keeps that
//! overlap from turning into duplicate downloads.

pub mod downloader;
pub mod lister;
pub mod resolver;
pub mod runner;

pub use downloader::MediaDownloader;
pub use lister::{memory_window, retrieve_attachments, LOOKBACK_DAYS};
pub use resolver::{retrieve_children, Dependents};
pub use runner::{SyncRunner, SyncSummary};

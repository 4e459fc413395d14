//!# Synology Photo Sync Client
//!
//! [![test & release](https://img.shields.io/github/actions/workflow/status/artemy/syno-photo-sync/ci.yml?logo=github)](https://github.com/artemy/syno-photo-sync)
//! [![Crates.io Version](https://img.shields.io/crates/v/syno-photo-sync?logo=rust) ](https://crates.io/crates/syno-photo-sync)
//! [![docs.rs](https://img.shields.io/docsrs/syno-photo-sync?logo=docs.rs)](https://docs.rs/syno-photo-sync/latest/syno_photo_sync/)
//! [![MIT License](https://img.shields.io/github/license/artemy/syno-photo-sync)](https://github.com/artemy/syno-photo-sync)
//!
//! A Rust client library for syncing images from Synology sharing links to a local
//! directory tree. Point it at one or more public sharing links and it downloads
//! every image it has not seen before.
//!
//! ## Features
//!
//! - Resolve sharing links into FileStation API coordinates
//! - List files behind a sharing link, no account credentials needed
//! - Download images with content verification (magic-byte signature check)
//! - Skip directories, non-image files and files already present locally
//! - Sync a single source or all configured sources, with structured results
//!
//! ## Usage example
//!
//! ```rust,no_run
//! use anyhow::Result;
//! use syno_photo_sync::client::SynoPhotoSync;
//! use syno_photo_sync::entities::Source;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<()> {
//!     let sync = SynoPhotoSync::builder()
//!         .data_dir("/var/lib/photo-sync")
//!         .source(Source {
//!             url: "https://nas.example.com/mo/sharing/dRCQK2EDv".to_string(),
//!             folder_name: "family".to_string(),
//!         })
//!         .build()?;
//!
//!     let results = sync.sync_all().await;
//!     for (name, result) in &results.sources {
//!         println!(
//!             "source: {}, downloaded: {}, success: {}",
//!             name, result.files_downloaded, result.success
//!         );
//!     }
//!     println!("total downloaded: {}", results.total_downloaded);
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod entities;
pub mod utils;

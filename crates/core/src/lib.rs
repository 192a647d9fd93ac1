//! Classpath resource discovery and indexing.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐    ┌────────────────┐    ┌────────────────────┐    ┌──────────────┐
//! │ ClassLoader  │───▶│ RootDiscovery  │───▶│  ResourceScanner   │───▶│ ClassScanner │
//! │ (chain)      │    │ (dir / archive)│    │  (names per Root)  │    │ (node cache) │
//! └──────────────┘    └────────────────┘    └────────────────────┘    └──────┬───────┘
//!                                                                            │ resolve
//!                                                                            ▼
//!                                                                    ┌──────────────┐
//!                                                                    │ TypeRuntime  │
//!                                                                    └──────────────┘
//! ```
//!
//! Scan cost is proportional to the number of resources scanned; restrict
//! prefixes and patterns to keep it low. Everything is immutable once
//! constructed, so scanners can be shared across threads.

pub mod class;
pub mod config;
pub mod discovery;
pub mod error;
pub mod logging;
pub mod pattern;
pub mod resource;
pub mod root;

pub use class::{ClassScanner, MatchContext, NodeMatcher};
pub use config::{ScanConfig, ScanFilter};
pub use discovery::RootDiscovery;
pub use error::{Result, ScanError};
pub use pattern::Pattern;
pub use resource::ResourceScanner;
pub use root::{Root, RootKind};

//! # print-relay
//!
//! Local print relay for point-of-sale receipts.
//!
//! # Architecture
//!
//! The relay bridges a business system (which assembles order
//! snapshots) and a physical thermal printer:
//!
//! ```text
//! print-relay/src/
//! ├── core/          # config, state, errors
//! ├── api/           # HTTP routes and handlers
//! ├── printing/      # receipt composer
//! ├── upstream.rs    # order snapshot fetch
//! ├── settings.rs    # persisted relay state
//! └── utils.rs       # logging, LAN discovery
//! ```
//!
//! One print request is one render: snapshot in, finished ESC/POS
//! buffer out, delivered through the `pos-printer` fallback chain.
//! Requests are independent; a failed render or delivery never poisons
//! other in-flight requests.

pub mod api;
pub mod core;
pub mod printing;
pub mod settings;
pub mod upstream;
pub mod utils;

mod server;

pub use crate::core::{Config, Result, ServerError, ServerState};
pub use printing::{ReceiptRenderer, RenderError};
pub use server::Server;
pub use upstream::{UpstreamClient, UpstreamError};
pub use utils::init_logger;

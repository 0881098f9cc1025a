//! genproj: premake bootstrapper for Ashborn
//!
//! Makes sure premake5 is available under the bootstrapper's
//! `third_party/premake` directory (downloading it when missing) and runs it
//! to generate IDE/build-system project files.

pub mod bootstrap;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;

pub use bootstrap::{Bootstrapper, Reporter};
pub use config::Config;
pub use error::BootstrapError;

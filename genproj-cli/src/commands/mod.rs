pub mod bootstrap;

pub use bootstrap::{BootstrapArgs, handle_bootstrap_command};

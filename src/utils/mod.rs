//! Terminal output helpers

pub mod progress;
pub mod styling;

pub use progress::{create_spinner, finish_with_error, finish_with_success};
pub use styling::{print_banner, print_completion, print_config, print_info};

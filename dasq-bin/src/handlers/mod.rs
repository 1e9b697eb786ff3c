mod handle_build;
mod handle_namespace;
mod handle_repair;
mod handle_sample;
mod handle_verify;

pub use handle_build::handle_build_command;
pub use handle_namespace::handle_namespace_command;
pub use handle_repair::handle_repair_command;
pub use handle_sample::handle_sample_command;
pub use handle_verify::handle_verify_command;

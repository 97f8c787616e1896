pub mod toml_loader;

pub use toml_loader::{load_all_applications, load_application, save_application};

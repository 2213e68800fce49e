pub mod csv_loader;

pub use csv_loader::{load_tasks, parse_tasks};

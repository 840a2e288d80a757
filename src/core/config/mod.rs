pub mod data;
pub mod io;
pub mod store;


pub use data::{AppSettings, CatalogError, ModelConfig, NewModel};
pub use io::StoreError;
pub use store::PreferenceStore;

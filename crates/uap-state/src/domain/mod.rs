pub mod address_list;
pub mod codec;
pub mod config;
pub mod diff;
pub mod entities;
pub mod errors;
pub mod keys;
pub mod model;
pub mod order;
pub mod screener_config;
pub mod target;
pub mod value_objects;

pub use address_list::*;
pub use codec::*;
pub use config::*;
pub use diff::*;
pub use entities::*;
pub use errors::*;
pub use keys::*;
pub use model::*;
pub use order::*;
pub use screener_config::*;
pub use target::*;
pub use value_objects::*;

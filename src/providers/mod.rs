pub mod dollar_api;

pub use dollar_api::DollarApiProvider;

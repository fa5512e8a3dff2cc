pub mod currency;
pub mod data;
pub mod error;
pub mod genre;
pub mod join;
pub mod pipeline;
pub mod source;

pub use data::{LoadOptions, MovieData};
pub use error::{Error, Result};
pub use pipeline::Analysis;

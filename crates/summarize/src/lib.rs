mod error;
pub mod utils;
pub use error::{Error, ErrorKind, Result};

pub mod clients;
pub mod config;
pub mod summarization;

pub use config::{Config, ConfigBuilder};
pub use summarization::{
    Summarization, SummarizationRequest, SummarizationRequestBuilder, SummarizationResponse,
};

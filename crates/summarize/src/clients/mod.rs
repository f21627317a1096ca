#[cfg(feature = "huggingface_client")]
pub mod huggingface;

use crate::summarization::Summarization;
use dyn_clone::DynClone;

pub trait Client: DynClone + Summarization + Send + Sync {}

dyn_clone::clone_trait_object!(Client);

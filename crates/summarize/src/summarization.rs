use crate::{Error, Result};
use async_trait::async_trait;
use derive_builder::Builder;
use dyn_clone::DynClone;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

pub const DEFAULT_MAX_LENGTH: u32 = 150;
pub const DEFAULT_MIN_LENGTH: u32 = 30;

/// Bounds offered to users for the maximum summary length.
pub const MAX_LENGTH_RANGE: LengthRange = LengthRange {
    min: 50,
    max: 500,
    step: 10,
    default: DEFAULT_MAX_LENGTH,
};

/// Bounds offered to users for the minimum summary length.
pub const MIN_LENGTH_RANGE: LengthRange = LengthRange {
    min: 10,
    max: 200,
    step: 10,
    default: DEFAULT_MIN_LENGTH,
};

/// An inclusive range with a step, as presented by a front end slider.
///
/// The request types never enforce these; they exist for callers that want to
/// constrain user input before building a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthRange {
    pub min: u32,
    pub max: u32,
    pub step: u32,
    pub default: u32,
}

impl LengthRange {
    pub fn contains(&self, value: u32) -> bool {
        (self.min..=self.max).contains(&value)
    }

    pub fn is_on_step(&self, value: u32) -> bool {
        self.step == 0 || value.saturating_sub(self.min) % self.step == 0
    }
}

#[derive(Debug, Clone, Copy, Builder, PartialEq, Eq)]
#[builder(pattern = "mutable")]
#[builder(setter(into))]
#[builder(derive(Debug))]
pub struct SummarizationParameters {
    #[builder(default = "DEFAULT_MAX_LENGTH")]
    pub max_length: u32,
    #[builder(default = "DEFAULT_MIN_LENGTH")]
    pub min_length: u32,
}

impl Default for SummarizationParameters {
    fn default() -> Self {
        Self {
            max_length: DEFAULT_MAX_LENGTH,
            min_length: DEFAULT_MIN_LENGTH,
        }
    }
}

#[derive(Serialize)]
struct WireParameters {
    max_length: u32,
    min_length: u32,
    do_sample: bool,
}

// Sampling is never requested; the wire form always carries `do_sample: false`.
impl Serialize for SummarizationParameters {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        WireParameters {
            max_length: self.max_length,
            min_length: self.min_length,
            do_sample: false,
        }
        .serialize(serializer)
    }
}

#[derive(Debug, Serialize, Builder)]
#[builder(pattern = "mutable")]
#[builder(setter(into, strip_option))]
pub struct SummarizationRequest {
    pub inputs: String,
    #[builder(default)]
    pub parameters: SummarizationParameters,
    #[builder(default = "None")]
    #[serde(skip)]
    pub cancellation_token: Option<CancellationToken>,
}

impl SummarizationRequest {
    /// Builds a request without validating the length pair. An inverted pair is
    /// submitted as is and left to the endpoint.
    pub fn new(inputs: impl Into<String>, max_length: u32, min_length: u32) -> Self {
        Self {
            inputs: inputs.into(),
            parameters: SummarizationParameters {
                max_length,
                min_length,
            },
            cancellation_token: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SummarizationOutput {
    pub summary_text: String,
}

/// The decoded answer of an inference endpoint. Always holds at least one output.
#[derive(Debug, Clone, PartialEq)]
pub struct SummarizationResponse {
    outputs: Vec<SummarizationOutput>,
}

impl SummarizationResponse {
    /// Decodes raw response bytes, checking every step of the contract:
    /// UTF-8 text, a JSON array, a first element with a string `summary_text`.
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(body)?;
        let value: serde_json::Value = serde_json::from_str(text)?;

        let items = match value {
            serde_json::Value::Array(items) => items,
            other => {
                return Err(Error::UnexpectedResponseShape(format!(
                    "expected a JSON array, got {}",
                    json_type_name(&other)
                )));
            }
        };

        let mut items = items.into_iter();
        let first = match items.next() {
            Some(first) => first,
            None => return Err(Error::EmptyResponse),
        };

        let summary_text = match first {
            serde_json::Value::Object(mut fields) => match fields.remove("summary_text") {
                Some(serde_json::Value::String(text)) => text,
                Some(other) => {
                    return Err(Error::UnexpectedResponseShape(format!(
                        "`summary_text` is {}, expected a string",
                        json_type_name(&other)
                    )));
                }
                None => return Err(Error::MissingSummaryText),
            },
            other => {
                return Err(Error::UnexpectedResponseShape(format!(
                    "expected an object as first element, got {}",
                    json_type_name(&other)
                )));
            }
        };

        let mut outputs = vec![SummarizationOutput { summary_text }];
        outputs.extend(items.filter_map(|item| serde_json::from_value(item).ok()));

        Ok(Self { outputs })
    }

    /// The summary of the first output.
    pub fn summary_text(&self) -> &str {
        &self.outputs[0].summary_text
    }

    pub fn into_summary_text(self) -> String {
        self.outputs
            .into_iter()
            .next()
            .map(|output| output.summary_text)
            .unwrap_or_default()
    }

    pub fn outputs(&self) -> &[SummarizationOutput] {
        &self.outputs
    }
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

#[async_trait]
pub trait Summarization: DynClone + Send + Sync {
    async fn summarize(&self, request: &SummarizationRequest) -> Result<SummarizationResponse>;

    /// Summarizes `text` and returns only the summary string.
    async fn summarize_text(&self, text: &str, max_length: u32, min_length: u32) -> Result<String> {
        let request = SummarizationRequest::new(text, max_length, min_length);
        let response = self.summarize(&request).await?;
        Ok(response.into_summary_text())
    }
}

dyn_clone::clone_trait_object!(Summarization);

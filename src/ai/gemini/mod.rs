pub mod client;
pub mod request;
pub mod types;

pub use client::GeminiHttpClient;
pub use request::{build_request, load_image, ImageAttachment, PromptInput};
pub use types::{
    Candidate, Content, GenerateContentRequest, GenerateContentResponse, InlineData, Part,
};

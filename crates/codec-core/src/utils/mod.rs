//! Helper utilities shared by the sessions

pub mod pcm;
pub mod validation;

pub use pcm::{pcm_to_samples, samples_to_pcm};
pub use validation::{validate_encoded_payload, validate_raw_frame};

//! Transcode pipeline: format dispatch, per-file transcoding and the batch driver.

pub mod batch;
mod formats;
mod palette;
mod transcoder;

pub use batch::BatchProcessor;
pub use formats::{EncoderSettings, encode_asset, save_jpeg, save_png};
pub use transcoder::Transcoder;

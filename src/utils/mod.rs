pub mod error;
pub mod formats;
pub mod fs;

pub use error::{PipelineError, PipelineResult};
pub use formats::{ImageFormat, is_supported_image};
pub use fs::{
    ensure_dir,
    file_exists,
    get_file_size,
    list_file_names,
    natural_cmp,
    read_with_retry,
    sweep_stale_temps,
    write_atomic,
};

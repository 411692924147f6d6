// Enable pedantic lints globally, then allow the noisy ones we're not fixing.
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(clippy::must_use_candidate, clippy::return_self_not_must_use)]
// Audio code performs intentional casts
#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    clippy::cast_lossless,
    clippy::cast_possible_wrap
)]
// Internal API, doc sections add nothing
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]
#![allow(
    clippy::module_name_repetitions,
    clippy::doc_markdown,
    clippy::float_cmp,
    clippy::struct_field_names,
    clippy::needless_pass_by_value
)]
#![allow(clippy::redundant_pub_crate)]

pub mod audio;
pub mod builder;
pub mod engine;
pub mod error;
pub mod io;
pub mod pipeline;
pub mod settings;
pub mod stage;

pub use builder::{Feedback, FilterType, HearingAidBuilder, Initializer, Parameters};
pub use error::{ConfigError, EngineError};
pub use pipeline::{AfcHearingAid, HearingAid, Pipeline};
pub use stage::{FeedbackCanceller, Filter, SignalProcessor};

pub mod load;
pub mod profile;
pub mod save;
pub mod types;

pub use profile::EncodeProfile;
pub use types::{
    Codec, CodecSpec, CodecTable, Config, Language, MAX_RECENT_PATHS, UserSettings, VerifyMode,
};

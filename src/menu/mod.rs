mod encode_prompts;
mod main_menu;
mod settings_menu;

pub use encode_prompts::{DOWNSCALE_HEIGHTS, prompt_encode_request};
pub use main_menu::show_main_menu;

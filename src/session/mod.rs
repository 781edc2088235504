pub mod headless_mode;
pub mod messages;
pub mod setup;
pub mod tui_mode;

pub use headless_mode::{
    AlreadyReported, run_download, run_fetch, run_theme_show, run_theme_toggle,
};
pub use setup::SessionSettings;
pub use tui_mode::run_tui_mode;

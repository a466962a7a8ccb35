//! View-model and rendering for the analyzer page.

mod state;
mod tabs;
mod templates;
mod views;

pub use self::state::*;
pub use self::tabs::*;
pub use self::templates::*;
pub use self::views::*;

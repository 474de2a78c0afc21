//! Data model for showings and grouped search results

mod listing;
mod showing;

pub use listing::{GroupedListing, TitleGroup};
pub use showing::{Showtime, ShowtimeRow};

//! Grouped search results

use serde::Serialize;

use super::showing::{Showtime, ShowtimeRow};

/// One distinct title with its ordered showtimes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TitleGroup {
    /// Movie title
    pub title: String,
    /// Showtimes in the order the store returned them (chronological)
    pub showtimes: Vec<Showtime>,
}

/// Search output: one entry per distinct title, titles in lexicographic
/// order, each carrying its ordered showtimes
///
/// An empty listing is a normal, successfully completed search ("no movies
/// found"), distinct from a connectivity failure, which surfaces as an error
/// before a listing exists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GroupedListing(Vec<TitleGroup>);

impl GroupedListing {
    /// Returns true if no showings matched
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of distinct titles
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates over the title groups in listing order
    pub fn iter(&self) -> std::slice::Iter<'_, TitleGroup> {
        self.0.iter()
    }

    /// Returns the groups as a slice
    #[must_use]
    pub fn groups(&self) -> &[TitleGroup] {
        &self.0
    }

    /// Flattens the listing back into the flat row form it was built from
    ///
    /// Grouping is a lossless partition of its input: for a listing built
    /// from sorted rows, `flatten` reproduces those rows exactly.
    #[must_use]
    pub fn flatten(&self) -> Vec<ShowtimeRow> {
        self.0
            .iter()
            .flat_map(|group| {
                group.showtimes.iter().map(|showtime| ShowtimeRow {
                    title: group.title.clone(),
                    show_date: showtime.date,
                    show_time: showtime.time,
                })
            })
            .collect()
    }
}

impl From<Vec<TitleGroup>> for GroupedListing {
    fn from(groups: Vec<TitleGroup>) -> Self {
        Self(groups)
    }
}

impl IntoIterator for GroupedListing {
    type Item = TitleGroup;
    type IntoIter = std::vec::IntoIter<TitleGroup>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a GroupedListing {
    type Item = &'a TitleGroup;
    type IntoIter = std::slice::Iter<'a, TitleGroup>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

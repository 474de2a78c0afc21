//! Title search and result grouping
//!
//! One operation: take a free-text term, run the parameterized search
//! against the live connection, and fold the title-sorted rows into one
//! group per distinct title.

use tracing::{debug, warn};

use crate::connection::ConnectionManager;
use crate::error::{DatabaseError, DatabaseResult};
use crate::models::{GroupedListing, Showtime, ShowtimeRow, TitleGroup};

/// Read-only search joining screenings to movies
///
/// The ORDER BY is load-bearing: the grouping fold consumes rows in
/// title-then-start order.
const SEARCH_QUERY: &str = "\
    SELECT m.title, s.show_date, s.show_time \
    FROM screenings AS s \
    JOIN movies AS m ON m.movie_id = s.movie_id \
    WHERE LOWER(m.title) LIKE LOWER(?) \
    ORDER BY m.title ASC, s.show_date ASC, s.show_time ASC";

/// Movie search over the connection owned by `ConnectionManager`
///
/// Holds a non-owning reference: the manager outlives the service and
/// cannot be closed while a service still borrows it. `search` takes
/// `&mut self`, so a service instance cannot have two searches in flight.
pub struct MovieQueryService<'a> {
    connection: &'a ConnectionManager,
}

impl<'a> MovieQueryService<'a> {
    /// Creates a service over a live connection
    #[must_use]
    pub fn new(connection: &'a ConnectionManager) -> Self {
        Self { connection }
    }

    /// Searches for showings whose title contains `term`
    ///
    /// The term is bound as a query parameter, never spliced into the
    /// statement text, and wrapped in `%` wildcards for case-insensitive
    /// substring matching. An empty term matches everything. All matching
    /// rows are fetched eagerly; zero rows is a successful search with an
    /// empty listing.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::QueryFailed` if execution fails (dropped
    /// connection, malformed execution). Failures propagate to the caller;
    /// there is no retry or reconnect here.
    pub async fn search(&mut self, term: &str) -> DatabaseResult<GroupedListing> {
        let pattern = like_pattern(term);
        debug!(%pattern, "executing showtime search");

        let rows = sqlx::query_as::<_, ShowtimeRow>(SEARCH_QUERY)
            .bind(&pattern)
            .fetch_all(self.connection.pool())
            .await
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        debug!(rows = rows.len(), "search returned");
        Ok(group_rows(rows))
    }
}

/// Wraps a raw search term for substring matching
fn like_pattern(term: &str) -> String {
    format!("%{term}%")
}

/// Folds title-sorted rows into one group per distinct title
///
/// Single linear pass: a new group opens whenever the title differs from
/// the previous row's, otherwise the showtime is appended to the current
/// group. The store guarantees the ordering; if a row set arrives out of
/// order anyway it is re-sorted here first, so a title can never fragment
/// across groups.
#[must_use]
pub fn group_rows(mut rows: Vec<ShowtimeRow>) -> GroupedListing {
    let sorted = rows.is_sorted_by(|a, b| {
        (&a.title, a.show_date, a.show_time) <= (&b.title, b.show_date, b.show_time)
    });
    if !sorted {
        warn!("store returned rows out of the requested order; re-sorting before grouping");
        rows.sort_by(|a, b| {
            (&a.title, a.show_date, a.show_time).cmp(&(&b.title, b.show_date, b.show_time))
        });
    }

    let mut groups: Vec<TitleGroup> = Vec::new();
    for row in rows {
        let showtime = Showtime::new(row.show_date, row.show_time);
        match groups.last_mut() {
            Some(group) if group.title == row.title => group.showtimes.push(showtime),
            _ => groups.push(TitleGroup {
                title: row.title,
                showtimes: vec![showtime],
            }),
        }
    }
    GroupedListing::from(groups)
}

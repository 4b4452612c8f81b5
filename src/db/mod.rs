//! Database layer with SQLite

pub mod catalog;

use anyhow::{Context, Result};
use rusqlite::{Connection, OpenFlags};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::sync::OnceCell;
use tracing::info;

/// Handle to the movies database, with the ratings database lazily
/// attached into the same session on first use.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
    ratings_path: PathBuf,
    ratings_attached: Arc<OnceCell<()>>,
}

impl Database {
    /// Open the movies database read-only.
    pub fn open(movies_path: &Path, ratings_path: &Path) -> Result<Self> {
        let conn = Connection::open_with_flags(movies_path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .with_context(|| format!("Failed to open movies database at {:?}", movies_path))?;

        conn.execute_batch(
            "PRAGMA cache_size = -64000;
             PRAGMA temp_store = MEMORY;",
        )?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            ratings_path: ratings_path.to_path_buf(),
            ratings_attached: Arc::new(OnceCell::new()),
        })
    }

    /// Create an in-memory database (for testing)
    #[cfg(test)]
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            ratings_path: PathBuf::from(":memory:"),
            ratings_attached: Arc::new(OnceCell::new()),
        })
    }

    /// Attach the ratings database under the `ratings` schema alias.
    ///
    /// Idempotent: the first caller performs the attach, concurrent callers
    /// wait on the same in-flight attach, and every later call returns
    /// immediately. A failed attach leaves the state unattached so a later
    /// call can retry.
    pub async fn attach_ratings(&self) -> Result<()> {
        self.ratings_attached
            .get_or_try_init(|| async {
                let path = self.ratings_path.to_string_lossy().to_string();
                let conn = self.conn.lock().unwrap();
                conn.execute("ATTACH DATABASE ?1 AS ratings", [path.as_str()])
                    .with_context(|| {
                        format!(
                            "Failed to attach ratings database at {:?}",
                            self.ratings_path
                        )
                    })?;
                info!("Ratings database attached from {:?}", self.ratings_path);
                Ok::<_, anyhow::Error>(())
            })
            .await?;

        Ok(())
    }

    /// Get a connection for executing queries
    pub fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap()
    }

    /// In-memory database pre-populated with a small catalog (for testing)
    #[cfg(test)]
    pub(crate) async fn sample() -> Result<Self> {
        let db = Self::in_memory()?;
        db.attach_ratings().await?;

        db.conn().execute_batch(
            r#"
            CREATE TABLE movies (
                movieId INTEGER PRIMARY KEY,
                imdbId TEXT NOT NULL UNIQUE,
                title TEXT NOT NULL,
                overview TEXT,
                productionCompanies TEXT,
                releaseDate TEXT,
                budget INTEGER,
                runtime INTEGER,
                language TEXT,
                genres TEXT
            );

            CREATE TABLE ratings.ratings (
                ratingId INTEGER PRIMARY KEY,
                movieId INTEGER NOT NULL,
                rating REAL NOT NULL,
                timestamp INTEGER
            );

            INSERT INTO movies VALUES
                (13, 'tt0109830', 'Forrest Gump',
                 'A man with a low IQ has accomplished great things in his life.',
                 '["Paramount Pictures"]', '1994-07-06', 55000000, 142, 'en',
                 '["Comedy","Drama","Romance"]'),
                (238, 'tt0068646', 'The Godfather',
                 'The chronicle of the fictional Italian-American Corleone crime family.',
                 '["Paramount Pictures"]', '1972-03-14', 6000000, 175, NULL,
                 '["Drama","Crime"]'),
                (240, 'tt0071562', 'The Godfather Part II',
                 'The continuing saga of the Corleone crime family.',
                 '["Paramount Pictures"]', '1974-12-20', NULL, 200, '',
                 '["Drama","Crime"]'),
                (278, 'tt0111161', 'The Shawshank Redemption',
                 'Framed in the 1940s for the double murder of his wife and her lover, upstanding banker Andy Dufresne begins a new life at the Shawshank prison.',
                 '["Castle Rock Entertainment"]', '1994-09-23', 25000000, 142, 'en',
                 '["Drama","Crime"]'),
                (424, 'tt0108052', 'Schindler''s List',
                 'The true story of how businessman Oskar Schindler saved over a thousand Jewish lives during the Holocaust.',
                 '["Amblin Entertainment"]', '1993-11-30', 22000000, 195, 'en',
                 '["Drama","History","War"]'),
                (680, 'tt0110912', 'Pulp Fiction',
                 'A burger-loving hit man, his philosophical partner, and a washed-up boxer converge in this sprawling crime caper.',
                 '["Miramax"]', '1994-09-10', 8000000, 154, 'en',
                 '["Thriller","Crime"]');

            INSERT INTO ratings.ratings VALUES
                (1, 278, 5.0, 1100000000),
                (2, 278, 4.0, 1100000100),
                (3, 278, 3.0, 1100000200),
                (4, 680, 4.0, 1100000300),
                (5, 680, 5.0, 1100000400),
                (6, 13, 3.0, 1100000500);
            "#,
        )?;

        Ok(db)
    }
}

use rusqlite::{params, OptionalExtension};
use tracing::debug;

use super::{collect_rows, Catalog};
use crate::error::{StoreContext, StoreError};
use crate::models::{Song, SongOverview};

const ENTITY: &str = "song";

impl Catalog {
    /// Insert a song on its own. Artists, albums and categories are linked
    /// afterwards through [`Catalog::link`].
    pub fn create_song(&self, title: &str) -> Result<i64, StoreError> {
        let conn = self.conn()?;
        conn.execute("INSERT INTO Song (Title) VALUES (?1)", params![title])
            .map_err(|err| StoreError::from_write(err, ENTITY, title, "failed to insert song"))?;

        let id = conn.last_insert_rowid();
        debug!(id, title, "created song");
        Ok(id)
    }

    /// Every song, ordered by title.
    pub fn songs(&self) -> Result<Vec<Song>, StoreError> {
        let mut stmt = self
            .conn()?
            .prepare("SELECT SongID, Title FROM Song ORDER BY Title")
            .store_context("failed to prepare song query")?;

        collect_rows(&mut stmt, [], "failed to load songs", |row| {
            Ok(Song {
                id: row.get(0)?,
                title: row.get(1)?,
            })
        })
    }

    /// Exact, case-sensitive title lookup.
    pub fn song_by_title(&self, title: &str) -> Result<Option<Song>, StoreError> {
        self.conn()?
            .query_row(
                "SELECT SongID, Title FROM Song WHERE Title = ?1",
                params![title],
                |row| {
                    Ok(Song {
                        id: row.get(0)?,
                        title: row.get(1)?,
                    })
                },
            )
            .optional()
            .store_context("failed to look up song")
    }

    /// Retitle every song called `old_title`. Links follow the song id, so
    /// they are unaffected.
    pub fn update_song(&self, old_title: &str, new_title: &str) -> Result<bool, StoreError> {
        let updated = self
            .conn()?
            .execute(
                "UPDATE Song SET Title = ?1 WHERE Title = ?2",
                params![new_title, old_title],
            )
            .map_err(|err| StoreError::from_write(err, ENTITY, new_title, "failed to update song"))?;

        debug!(old_title, new_title, updated, "renamed song");
        Ok(updated > 0)
    }

    /// Delete every song titled `title`. Its rows in `Plays`, `IsIn` and `IsOn`
    /// stay behind until [`Catalog::prune_dangling_links`] runs.
    pub fn delete_song(&self, title: &str) -> Result<bool, StoreError> {
        let deleted = self
            .conn()?
            .execute("DELETE FROM Song WHERE Title = ?1", params![title])
            .store_context("failed to delete song")?;

        debug!(title, deleted, "deleted song");
        Ok(deleted > 0)
    }

    /// Every song with the names of its artists, albums and categories.
    pub fn song_overviews(&self) -> Result<Vec<SongOverview>, StoreError> {
        self.songs()?
            .into_iter()
            .map(|song| -> Result<SongOverview, StoreError> {
                let artists = self
                    .artists_for_song(song.id)?
                    .into_iter()
                    .map(|artist| artist.name)
                    .collect();
                let albums = self
                    .albums_for_song(song.id)?
                    .into_iter()
                    .map(|album| album.title)
                    .collect();
                let categories = self
                    .categories_for_song(song.id)?
                    .into_iter()
                    .map(|category| category.name)
                    .collect();
                Ok(SongOverview {
                    song,
                    artists,
                    albums,
                    categories,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use crate::db::{Catalog, Relation, SchemaSource};

    fn catalog() -> Catalog {
        Catalog::open_in_memory(&SchemaSource::Bundled).unwrap()
    }

    #[test]
    fn create_then_get_round_trips_the_title() {
        let catalog = catalog();
        let id = catalog.create_song("Beat It").unwrap();

        let song = catalog.song_by_title("Beat It").unwrap().unwrap();
        assert_eq!((song.id, song.title.as_str()), (id, "Beat It"));
    }

    #[test]
    fn rename_and_delete() {
        let catalog = catalog();
        catalog.create_song("Beat It").unwrap();
        catalog.create_song("Billie Jean").unwrap();

        assert!(catalog.update_song("Beat It", "Beat It (Remastered)").unwrap());
        assert!(catalog.delete_song("Billie Jean").unwrap());
        assert!(!catalog.delete_song("Billie Jean").unwrap());

        let titles: Vec<_> = catalog.songs().unwrap().into_iter().map(|s| s.title).collect();
        assert_eq!(titles, vec!["Beat It (Remastered)"]);
    }

    #[test]
    fn overview_collects_related_names() {
        let catalog = catalog();
        let song = catalog.create_song("Beat It").unwrap();
        let lonely = catalog.create_song("Alone").unwrap();
        let mj = catalog.create_artist("Michael Jackson").unwrap();
        let evh = catalog.create_artist("Eddie Van Halen").unwrap();
        let thriller = catalog.create_album("Thriller", 1982).unwrap();
        let pop = catalog.create_category("Pop").unwrap();

        catalog.link(Relation::Plays, song, mj).unwrap();
        catalog.link(Relation::Plays, song, evh).unwrap();
        catalog.link(Relation::IsOn, song, thriller).unwrap();
        catalog.link(Relation::IsIn, song, pop).unwrap();

        let overviews = catalog.song_overviews().unwrap();
        assert_eq!(overviews.len(), 2);

        assert_eq!(overviews[0].song.id, lonely);
        assert!(overviews[0].artists.is_empty());

        let beat_it = &overviews[1];
        assert_eq!(beat_it.artists, vec!["Eddie Van Halen", "Michael Jackson"]);
        assert_eq!(beat_it.albums, vec!["Thriller"]);
        assert_eq!(beat_it.categories, vec!["Pop"]);
    }

    #[test]
    fn update_and_delete_touch_every_match_without_unique_keys() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let relaxed = crate::db::schema::BUNDLED_SCHEMA.replace("Title TEXT NOT NULL UNIQUE", "Title TEXT NOT NULL");
        file.write_all(relaxed.as_bytes()).unwrap();
        let catalog =
            Catalog::open_in_memory(&SchemaSource::File(file.path().to_path_buf())).unwrap();

        let first = catalog.create_song("Intro").unwrap();
        let second = catalog.create_song("Intro").unwrap();
        assert_ne!(first, second);

        assert!(catalog.update_song("Intro", "Overture").unwrap());
        let songs = catalog.songs().unwrap();
        assert_eq!(songs.len(), 2);
        assert!(songs.iter().all(|song| song.title == "Overture"));

        assert!(catalog.delete_song("Overture").unwrap());
        assert!(catalog.songs().unwrap().is_empty());
    }
}

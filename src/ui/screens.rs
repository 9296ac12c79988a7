use crate::db::{Catalog, Relation};
use crate::error::StoreError;
use crate::models::{Album, AlbumCredit, Artist, Category, Song, SongCredit, SongOverview};

use super::helpers::move_index;

/// The four kinds of rows the catalog manages.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum EntityKind {
    Artist,
    Category,
    Album,
    Song,
}

impl EntityKind {
    /// Lowercase name used in status messages and errors.
    pub(crate) fn noun(self) -> &'static str {
        match self {
            EntityKind::Artist => "artist",
            EntityKind::Category => "category",
            EntityKind::Album => "album",
            EntityKind::Song => "song",
        }
    }

    pub(crate) fn plural(self) -> &'static str {
        match self {
            EntityKind::Artist => "Artists",
            EntityKind::Category => "Categories",
            EntityKind::Album => "Albums",
            EntityKind::Song => "Songs",
        }
    }

    /// Label of the natural key field in forms.
    pub(crate) fn key_label(self) -> &'static str {
        match self {
            EntityKind::Artist | EntityKind::Category => "Name",
            EntityKind::Album | EntityKind::Song => "Title",
        }
    }

    pub(crate) fn has_year(self) -> bool {
        self == EntityKind::Album
    }

    /// Entity on the far side of a song relationship.
    pub(crate) fn linked_by(relation: Relation) -> Self {
        match relation {
            Relation::Plays => EntityKind::Artist,
            Relation::IsIn => EntityKind::Category,
            Relation::IsOn => EntityKind::Album,
        }
    }
}

/// One row of a list view, flattened from whichever model it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Entry {
    pub(crate) id: i64,
    pub(crate) key: String,
    pub(crate) year: Option<i64>,
    pub(crate) detail: Option<String>,
}

impl Entry {
    pub(crate) fn display(&self) -> String {
        let mut text = match self.year {
            Some(year) => format!("{} ({year})", self.key),
            None => self.key.clone(),
        };
        if let Some(detail) = &self.detail {
            text.push_str("  ·  ");
            text.push_str(detail);
        }
        text
    }
}

impl From<Artist> for Entry {
    fn from(artist: Artist) -> Self {
        Self {
            id: artist.id,
            key: artist.name,
            year: None,
            detail: None,
        }
    }
}

impl From<Category> for Entry {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            key: category.name,
            year: None,
            detail: None,
        }
    }
}

impl From<Album> for Entry {
    fn from(album: Album) -> Self {
        Self {
            id: album.id,
            key: album.title,
            year: Some(album.year),
            detail: None,
        }
    }
}

impl From<SongOverview> for Entry {
    fn from(overview: SongOverview) -> Self {
        let mut parts = Vec::new();
        if !overview.artists.is_empty() {
            parts.push(format!("by {}", overview.artists.join(", ")));
        }
        if !overview.albums.is_empty() {
            parts.push(format!("on {}", overview.albums.join(", ")));
        }
        if !overview.categories.is_empty() {
            parts.push(format!("[{}]", overview.categories.join(", ")));
        }
        Self {
            id: overview.song.id,
            key: overview.song.title,
            year: None,
            detail: (!parts.is_empty()).then(|| parts.join(" ")),
        }
    }
}

/// Every row of `kind`, in natural key order.
pub(crate) fn load_entries(catalog: &Catalog, kind: EntityKind) -> Result<Vec<Entry>, StoreError> {
    let entries: Vec<Entry> = match kind {
        EntityKind::Artist => catalog.artists()?.into_iter().map(Entry::from).collect(),
        EntityKind::Category => catalog.categories()?.into_iter().map(Entry::from).collect(),
        EntityKind::Album => catalog.albums()?.into_iter().map(Entry::from).collect(),
        EntityKind::Song => catalog
            .song_overviews()?
            .into_iter()
            .map(Entry::from)
            .collect(),
    };
    Ok(entries)
}

/// Rows linked to `song_id` through `relation`.
pub(crate) fn load_related(
    catalog: &Catalog,
    relation: Relation,
    song_id: i64,
) -> Result<Vec<Entry>, StoreError> {
    let entries: Vec<Entry> = match relation {
        Relation::Plays => catalog
            .artists_for_song(song_id)?
            .into_iter()
            .map(Entry::from)
            .collect(),
        Relation::IsIn => catalog
            .categories_for_song(song_id)?
            .into_iter()
            .map(Entry::from)
            .collect(),
        Relation::IsOn => catalog
            .albums_for_song(song_id)?
            .into_iter()
            .map(Entry::from)
            .collect(),
    };
    Ok(entries)
}

/// Entries in the main menu.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum HomeItem {
    Manage(EntityKind),
    Reports,
    PruneLinks,
    Help,
}

pub(crate) const HOME_ITEMS: [HomeItem; 7] = [
    HomeItem::Manage(EntityKind::Artist),
    HomeItem::Manage(EntityKind::Category),
    HomeItem::Manage(EntityKind::Album),
    HomeItem::Manage(EntityKind::Song),
    HomeItem::Reports,
    HomeItem::PruneLinks,
    HomeItem::Help,
];

impl HomeItem {
    pub(crate) fn label(self) -> String {
        match self {
            HomeItem::Manage(kind) => format!("Manage {}", kind.plural()),
            HomeItem::Reports => "Generate Reports".to_string(),
            HomeItem::PruneLinks => "Prune Dangling Links".to_string(),
            HomeItem::Help => "Instructions".to_string(),
        }
    }
}

#[derive(Default)]
pub(crate) struct HomeScreen {
    pub(crate) selected: usize,
}

impl HomeScreen {
    /// Home menu with the cursor on `item`.
    pub(crate) fn focused_on(item: HomeItem) -> Self {
        Self {
            selected: HOME_ITEMS.iter().position(|i| *i == item).unwrap_or(0),
        }
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        self.selected = move_index(self.selected, offset, HOME_ITEMS.len());
    }

    pub(crate) fn current(&self) -> HomeItem {
        HOME_ITEMS[self.selected.min(HOME_ITEMS.len() - 1)]
    }
}

/// Flat list of one entity kind.
pub(crate) struct EntityScreen {
    pub(crate) kind: EntityKind,
    pub(crate) entries: Vec<Entry>,
    pub(crate) selected: usize,
}

impl EntityScreen {
    pub(crate) fn new(kind: EntityKind, entries: Vec<Entry>) -> Self {
        Self {
            kind,
            entries,
            selected: 0,
        }
    }

    pub(crate) fn current(&self) -> Option<&Entry> {
        self.entries.get(self.selected)
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        self.selected = move_index(self.selected, offset, self.entries.len());
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn select_last(&mut self) {
        self.selected = self.entries.len().saturating_sub(1);
    }

    /// Swap in freshly loaded rows, keeping the cursor on `focus_key` when it
    /// is still present.
    pub(crate) fn set_entries(&mut self, entries: Vec<Entry>, focus_key: Option<&str>) {
        self.entries = entries;
        if let Some(idx) = focus_key.and_then(|key| self.entries.iter().position(|e| e.key == key))
        {
            self.selected = idx;
        } else if self.selected >= self.entries.len() {
            self.selected = self.entries.len().saturating_sub(1);
        }
    }
}

/// A single song with its three relationship panes.
pub(crate) struct SongDetailScreen {
    pub(crate) song: Song,
    pub(crate) artists: Vec<Entry>,
    pub(crate) albums: Vec<Entry>,
    pub(crate) categories: Vec<Entry>,
    pub(crate) pane: Relation,
    pub(crate) selected: usize,
}

/// Left-to-right order of the detail panes.
pub(crate) const DETAIL_PANES: [Relation; 3] = [Relation::Plays, Relation::IsOn, Relation::IsIn];

impl SongDetailScreen {
    pub(crate) fn load(catalog: &Catalog, song: Song) -> Result<Self, StoreError> {
        let mut screen = Self {
            song,
            artists: Vec::new(),
            albums: Vec::new(),
            categories: Vec::new(),
            pane: Relation::Plays,
            selected: 0,
        };
        screen.reload(catalog)?;
        Ok(screen)
    }

    pub(crate) fn reload(&mut self, catalog: &Catalog) -> Result<(), StoreError> {
        self.artists = load_related(catalog, Relation::Plays, self.song.id)?;
        self.albums = load_related(catalog, Relation::IsOn, self.song.id)?;
        self.categories = load_related(catalog, Relation::IsIn, self.song.id)?;
        let len = self.pane_entries(self.pane).len();
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
        Ok(())
    }

    pub(crate) fn pane_entries(&self, pane: Relation) -> &[Entry] {
        match pane {
            Relation::Plays => &self.artists,
            Relation::IsOn => &self.albums,
            Relation::IsIn => &self.categories,
        }
    }

    pub(crate) fn current(&self) -> Option<&Entry> {
        self.pane_entries(self.pane).get(self.selected)
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        let len = self.pane_entries(self.pane).len();
        self.selected = move_index(self.selected, offset, len);
    }

    /// Cycle focus between panes; `step` is +1 or -1.
    pub(crate) fn switch_pane(&mut self, step: isize) {
        let idx = DETAIL_PANES
            .iter()
            .position(|p| *p == self.pane)
            .unwrap_or(0) as isize;
        let len = DETAIL_PANES.len() as isize;
        self.pane = DETAIL_PANES[(idx + step).rem_euclid(len) as usize];
        self.selected = 0;
    }
}

/// The three report queries.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum ReportKind {
    SongsByArtist,
    ArtistsInYear,
    AlbumsInCategory,
}

pub(crate) const REPORT_KINDS: [ReportKind; 3] = [
    ReportKind::SongsByArtist,
    ReportKind::ArtistsInYear,
    ReportKind::AlbumsInCategory,
];

impl ReportKind {
    pub(crate) fn title(self) -> &'static str {
        match self {
            ReportKind::SongsByArtist => "All songs played by an artist",
            ReportKind::ArtistsInYear => "All artists with albums in a given year",
            ReportKind::AlbumsInCategory => "All albums with songs in a given category",
        }
    }

    pub(crate) fn prompt(self) -> &'static str {
        match self {
            ReportKind::SongsByArtist => "Artist",
            ReportKind::ArtistsInYear => "Year",
            ReportKind::AlbumsInCategory => "Category",
        }
    }

    pub(crate) fn numeric(self) -> bool {
        self == ReportKind::ArtistsInYear
    }

    fn empty_message(self) -> &'static str {
        match self {
            ReportKind::SongsByArtist => "No songs for the given artist.",
            ReportKind::ArtistsInYear => "No artists with albums in the given year.",
            ReportKind::AlbumsInCategory => "No albums with songs in that category.",
        }
    }
}

/// A report paired with its validated parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ReportRequest {
    SongsByArtist(String),
    ArtistsInYear(i64),
    AlbumsInCategory(String),
}

impl ReportRequest {
    pub(crate) fn kind(&self) -> ReportKind {
        match self {
            ReportRequest::SongsByArtist(_) => ReportKind::SongsByArtist,
            ReportRequest::ArtistsInYear(_) => ReportKind::ArtistsInYear,
            ReportRequest::AlbumsInCategory(_) => ReportKind::AlbumsInCategory,
        }
    }
}

#[derive(Default)]
pub(crate) struct ReportMenuScreen {
    pub(crate) selected: usize,
}

impl ReportMenuScreen {
    pub(crate) fn move_selection(&mut self, offset: isize) {
        self.selected = move_index(self.selected, offset, REPORT_KINDS.len());
    }

    pub(crate) fn current(&self) -> ReportKind {
        REPORT_KINDS[self.selected.min(REPORT_KINDS.len() - 1)]
    }
}

/// Result rows of one report run, already formatted for display.
pub(crate) struct ReportScreen {
    pub(crate) kind: ReportKind,
    pub(crate) heading: String,
    pub(crate) lines: Vec<String>,
    pub(crate) scroll: u16,
}

impl ReportScreen {
    pub(crate) fn run(catalog: &Catalog, request: &ReportRequest) -> Result<Self, StoreError> {
        let (heading, lines) = match request {
            ReportRequest::ArtistsInYear(year) => (
                format!("Artists with albums from {year}"),
                catalog.artists_with_albums_in_year(*year)?,
            ),
            ReportRequest::SongsByArtist(name) => (
                format!("Songs played by {name}"),
                catalog
                    .songs_by_artist(name)?
                    .into_iter()
                    .map(format_song_credit)
                    .collect(),
            ),
            ReportRequest::AlbumsInCategory(name) => (
                format!("Albums with {name} songs"),
                catalog
                    .albums_in_category(name)?
                    .into_iter()
                    .map(format_album_credit)
                    .collect(),
            ),
        };

        Ok(Self {
            kind: request.kind(),
            heading,
            lines,
            scroll: 0,
        })
    }

    pub(crate) fn body(&self) -> Vec<String> {
        if self.lines.is_empty() {
            vec![self.kind.empty_message().to_string()]
        } else {
            self.lines.clone()
        }
    }

    /// Move the first visible row. The offset is capped at `u16::MAX`, the
    /// widest scroll ratatui accepts.
    pub(crate) fn scroll_by(&mut self, offset: isize) {
        let rows = self.lines.len().min(usize::from(u16::MAX) + 1);
        let next = move_index(usize::from(self.scroll), offset, rows);
        self.scroll = u16::try_from(next).unwrap_or(u16::MAX);
    }
}

fn format_song_credit(credit: SongCredit) -> String {
    format!("{} by {}", credit.song_title, credit.artist_name)
}

fn format_album_credit(credit: AlbumCredit) -> String {
    format!("{} by {}", credit.album_title, credit.artist_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::SchemaSource;

    fn entry(id: i64, key: &str) -> Entry {
        Entry {
            id,
            key: key.to_string(),
            year: None,
            detail: None,
        }
    }

    #[test]
    fn set_entries_follows_the_focused_key() {
        let mut screen = EntityScreen::new(
            EntityKind::Artist,
            vec![entry(1, "ABBA"), entry(2, "Queen")],
        );
        screen.move_selection(1);
        assert_eq!(screen.current().map(|e| e.id), Some(2));

        screen.set_entries(
            vec![entry(3, "Blondie"), entry(1, "ABBA"), entry(2, "Queen")],
            Some("ABBA"),
        );
        assert_eq!(screen.selected, 1);

        screen.set_entries(vec![entry(3, "Blondie")], None);
        assert_eq!(screen.selected, 0);

        screen.set_entries(Vec::new(), None);
        assert!(screen.current().is_none());
    }

    #[test]
    fn song_entries_summarise_their_links() {
        let overview = SongOverview {
            song: Song {
                id: 4,
                title: "Beat It".into(),
            },
            artists: vec!["Michael Jackson".into()],
            albums: vec!["Thriller".into()],
            categories: vec!["Pop".into(), "Rock".into()],
        };
        assert_eq!(
            Entry::from(overview).display(),
            "Beat It  ·  by Michael Jackson on Thriller [Pop, Rock]"
        );
    }

    #[test]
    fn detail_panes_cycle_in_both_directions() {
        let catalog = Catalog::open_in_memory(&SchemaSource::Bundled).unwrap();
        let id = catalog.create_song("Beat It").unwrap();
        let mut screen = SongDetailScreen::load(
            &catalog,
            Song {
                id,
                title: "Beat It".into(),
            },
        )
        .unwrap();

        assert_eq!(screen.pane, Relation::Plays);
        screen.switch_pane(1);
        assert_eq!(screen.pane, Relation::IsOn);
        screen.switch_pane(-1);
        screen.switch_pane(-1);
        assert_eq!(screen.pane, Relation::IsIn);
    }

    #[test]
    fn year_report_is_built_from_the_year_request() {
        let catalog = Catalog::open_in_memory(&SchemaSource::Bundled).unwrap();
        let artist = catalog.create_artist("Michael Jackson").unwrap();
        let album = catalog.create_album("Thriller", 1982).unwrap();
        let song = catalog.create_song("Beat It").unwrap();
        catalog.link(Relation::Plays, song, artist).unwrap();
        catalog.link(Relation::IsOn, song, album).unwrap();

        let report = ReportScreen::run(&catalog, &ReportRequest::ArtistsInYear(1982)).unwrap();
        assert_eq!(report.kind, ReportKind::ArtistsInYear);
        assert_eq!(report.heading, "Artists with albums from 1982");
        assert_eq!(report.lines, vec!["Michael Jackson"]);
    }

    #[test]
    fn scrolling_stays_within_the_rows_and_u16() {
        let mut report = ReportScreen {
            kind: ReportKind::SongsByArtist,
            heading: String::new(),
            lines: vec![String::new(); 3],
            scroll: 0,
        };
        report.scroll_by(-1);
        assert_eq!(report.scroll, 0);
        report.scroll_by(10);
        assert_eq!(report.scroll, 2);

        report.lines = vec![String::new(); 70_000];
        report.scroll_by(isize::MAX / 2);
        assert_eq!(report.scroll, u16::MAX);
    }

    #[test]
    fn empty_report_explains_itself() {
        let catalog = Catalog::open_in_memory(&SchemaSource::Bundled).unwrap();
        let report =
            ReportScreen::run(&catalog, &ReportRequest::SongsByArtist("Unknown".into())).unwrap();

        assert_eq!(report.kind, ReportKind::SongsByArtist);
        assert!(report.lines.is_empty());
        assert_eq!(report.body(), vec!["No songs for the given artist."]);
    }
}

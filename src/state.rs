use serde::{Deserialize, Serialize};
use tui_dispatch::DataResource;
use tui_dispatch_debug::debug::{ron_string, DebugSection, DebugState};

use crate::config::Settings;
use crate::error::FetchError;
use crate::search;
use crate::sprite::SpriteData;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResourceRef {
    pub name: String,
    pub url: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: u32,
    pub name: String,
    pub display_name: String,
    pub sprite_url: Option<String>,
    pub types: Vec<ResourceRef>,
    pub abilities: Vec<ResourceRef>,
    pub moves: Vec<ResourceRef>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CatalogPage {
    pub number: u32,
    pub requested: u32,
    pub items: Vec<CatalogItem>,
}

impl CatalogPage {
    /// A short page means the collection ran out.
    pub fn is_short(&self) -> bool {
        (self.items.len() as u64) < u64::from(self.requested)
    }
}

/// A resolved name for an ability, move or type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Label {
    Localized(String),
    /// The resource had no name in the requested language; holds its API name.
    Fallback(String),
}

impl Label {
    pub fn text(&self) -> &str {
        match self {
            Label::Localized(text) | Label::Fallback(text) => text,
        }
    }

    pub fn is_localized(&self) -> bool {
        matches!(self, Label::Localized(_))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetailRecord {
    pub id: u32,
    pub name: String,
    pub display_name: String,
    pub sprite_url: Option<String>,
    pub height: u32,
    pub weight: u32,
    pub types: Vec<Label>,
    pub abilities: Vec<Label>,
    pub moves: Vec<Label>,
}

/// Accumulated pages of the list screen.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ListState {
    items: Vec<CatalogItem>,
    next_page: u32,
    exhausted: bool,
    loading: bool,
    last_error: Option<FetchError>,
}

impl Default for ListState {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            next_page: 1,
            exhausted: false,
            loading: false,
            last_error: None,
        }
    }
}

impl ListState {
    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    pub fn next_page(&self) -> u32 {
        self.next_page
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn last_error(&self) -> Option<&FetchError> {
        self.last_error.as_ref()
    }

    /// Claim the in-flight slot; returns the page to request.
    pub fn begin_load(&mut self) -> Option<u32> {
        if self.loading || self.exhausted {
            return None;
        }
        self.loading = true;
        Some(self.next_page)
    }

    /// Append a fetched page. Pages other than the cursor's are rejected so
    /// the same page can never be appended twice.
    pub fn commit_page(&mut self, page: CatalogPage) -> bool {
        if page.number != self.next_page || self.exhausted {
            return false;
        }
        self.loading = false;
        self.last_error = None;
        if page.is_short() {
            self.exhausted = true;
        }
        self.items.extend(page.items);
        self.next_page += 1;
        true
    }

    pub fn fail_load(&mut self, page: u32, error: FetchError) -> bool {
        if page != self.next_page {
            return false;
        }
        self.loading = false;
        self.last_error = Some(error);
        true
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchState {
    pub editing: bool,
    pub query: String,
    filtered: Vec<usize>,
}

impl SearchState {
    pub fn filtered(&self) -> &[usize] {
        &self.filtered
    }

    pub fn has_query(&self) -> bool {
        !search::SearchQuery::new(&self.query).is_empty()
    }

    /// Recompute the view from the current query.
    pub fn apply(&mut self, items: &[CatalogItem]) {
        self.filtered = search::filter_indices(items, &self.query);
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ListScreen {
    pub mount: u64,
    pub list: ListState,
    pub search: SearchState,
    pub selected: usize,
    pub scroll_top: usize,
}

impl ListScreen {
    pub fn new(mount: u64) -> Self {
        Self {
            mount,
            ..Self::default()
        }
    }

    pub fn selected_item(&self) -> Option<&CatalogItem> {
        self.search
            .filtered()
            .get(self.selected)
            .and_then(|idx| self.list.items().get(*idx))
    }

    pub fn visible_count(&self) -> usize {
        self.search.filtered().len()
    }

    pub fn set_selected(&mut self, index: usize, rows: usize) -> bool {
        let count = self.visible_count();
        let bounded = if count == 0 { 0 } else { index.min(count - 1) };
        let changed = bounded != self.selected;
        self.selected = bounded;
        self.keep_selection_visible(rows);
        changed
    }

    /// Positions in the filtered view that are on screen.
    pub fn window(&self, rows: usize) -> std::ops::Range<usize> {
        let count = self.visible_count();
        let start = self.scroll_top.min(count);
        start..start.saturating_add(rows).min(count)
    }

    pub fn keep_selection_visible(&mut self, rows: usize) {
        let rows = rows.max(1);
        if self.selected < self.scroll_top {
            self.scroll_top = self.selected;
        } else if self.selected >= self.scroll_top + rows {
            self.scroll_top = self.selected + 1 - rows;
        }
        let max_top = self.visible_count().saturating_sub(rows);
        self.scroll_top = self.scroll_top.min(max_top);
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DetailScreen {
    pub mount: u64,
    pub id: u32,
    pub record: DataResource<DetailRecord>,
    pub failure: Option<FetchError>,
    /// Stays `Empty` when the record has no sprite URL.
    pub sprite: DataResource<SpriteData>,
}

impl DetailScreen {
    pub fn new(mount: u64, id: u32) -> Self {
        Self {
            mount,
            id,
            record: DataResource::Loading,
            failure: None,
            sprite: DataResource::Empty,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Route {
    List,
    Detail { id: u32 },
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum Screen {
    List(ListScreen),
    Detail(DetailScreen),
}

impl Screen {
    pub fn route(&self) -> Route {
        match self {
            Screen::List(_) => Route::List,
            Screen::Detail(detail) => Route::Detail { id: detail.id },
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppState {
    pub terminal_size: (u16, u16),
    pub settings: Settings,
    pub screen: Screen,
    pub history: Vec<Route>,
    pub mounts: u64,
    pub message: Option<String>,
    pub tick: u64,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        Self {
            terminal_size: (80, 24),
            settings,
            screen: Screen::List(ListScreen::new(0)),
            history: Vec::new(),
            mounts: 0,
            message: None,
            tick: 0,
        }
    }

    pub fn route(&self) -> Route {
        self.screen.route()
    }

    pub fn list_screen(&self) -> Option<&ListScreen> {
        match &self.screen {
            Screen::List(list) => Some(list),
            Screen::Detail(_) => None,
        }
    }

    pub fn list_screen_mut(&mut self) -> Option<&mut ListScreen> {
        match &mut self.screen {
            Screen::List(list) => Some(list),
            Screen::Detail(_) => None,
        }
    }

    pub fn detail_screen(&self) -> Option<&DetailScreen> {
        match &self.screen {
            Screen::Detail(detail) => Some(detail),
            Screen::List(_) => None,
        }
    }

    pub fn detail_screen_mut(&mut self) -> Option<&mut DetailScreen> {
        match &mut self.screen {
            Screen::Detail(detail) => Some(detail),
            Screen::List(_) => None,
        }
    }

    /// Generation of whichever screen is mounted.
    pub fn mount(&self) -> u64 {
        match &self.screen {
            Screen::List(list) => list.mount,
            Screen::Detail(detail) => detail.mount,
        }
    }

    pub fn searching(&self) -> bool {
        self.list_screen()
            .map(|list| list.search.editing)
            .unwrap_or(false)
    }

    /// Rows available to the list body.
    pub fn list_rows(&self) -> usize {
        self.terminal_size.1.saturating_sub(8).max(1) as usize
    }
}

impl DebugState for AppState {
    fn debug_sections(&self) -> Vec<DebugSection> {
        let mut sections = vec![DebugSection::new("Route")
            .entry("route", ron_string(&self.route()))
            .entry("history", ron_string(&self.history))
            .entry("mounts", ron_string(&self.mounts))
            .entry("message", ron_string(&self.message))];
        match &self.screen {
            Screen::List(list) => sections.push(
                DebugSection::new("List")
                    .entry("items", ron_string(&list.list.items().len()))
                    .entry("next_page", ron_string(&list.list.next_page()))
                    .entry("loading", ron_string(&list.list.is_loading()))
                    .entry("exhausted", ron_string(&list.list.is_exhausted()))
                    .entry("query", ron_string(&list.search.query))
                    .entry("filtered", ron_string(&list.search.filtered().len()))
                    .entry("selected", ron_string(&list.selected))
                    .entry("scroll_top", ron_string(&list.scroll_top)),
            ),
            Screen::Detail(detail) => sections.push(
                DebugSection::new("Detail")
                    .entry("id", ron_string(&detail.id))
                    .entry("loading", ron_string(&detail.record.is_loading()))
                    .entry("failure", ron_string(&detail.failure))
                    .entry("sprite", sprite_summary(&detail.sprite)),
            ),
        }
        sections
    }
}

fn sprite_summary(sprite: &DataResource<SpriteData>) -> String {
    match sprite {
        DataResource::Empty => "none".to_string(),
        DataResource::Loading => "loading".to_string(),
        DataResource::Loaded(sprite) => format!("{}x{}", sprite.width(), sprite.height()),
        DataResource::Failed(error) => format!("failed: {error}"),
    }
}

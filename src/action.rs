use serde::{Deserialize, Serialize};

use crate::error::FetchError;
use crate::sprite::SpriteData;
use crate::state::{CatalogPage, DetailRecord};

/// Everything that can happen to the app.
///
/// Results of background work carry the `mount` generation of the screen
/// that asked for them; results for a screen that has since been left are
/// dropped by the reducer.
#[derive(tui_dispatch::Action, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[action(infer_categories)]
pub enum Action {
    Init,

    ListLoadMore,
    PageDidLoad { mount: u64, page: CatalogPage },
    PageDidError { mount: u64, page: u32, error: FetchError },

    SelectionMove(i16),
    SelectionPage(i16),
    SelectionJumpTop,
    SelectionJumpBottom,
    ListSelect(usize),

    SearchStart,
    SearchInput(char),
    SearchBackspace,
    SearchSubmit,
    SearchCancel,
    /// The debounce window for `query` elapsed.
    SearchDidSettle { mount: u64, query: String },

    DetailOpen,
    NavigateDetail(u32),
    NavigateBack,
    DetailDidLoad { mount: u64, record: DetailRecord },
    DetailDidError { mount: u64, id: u32, error: FetchError },
    SpriteDidLoad { mount: u64, id: u32, sprite: SpriteData },
    SpriteDidError { mount: u64, id: u32, error: FetchError },
    DetailButtonPress,

    UiTerminalResize(u16, u16),
    Tick,
    Quit,
}

use tui_dispatch::{DataResource, DispatchResult};

use crate::action::Action;
use crate::effect::Effect;
use crate::scroll::{ScrollTrigger, Viewport};
use crate::state::{AppState, DetailScreen, ListScreen, Route, Screen};

pub const BUTTON_MESSAGE: &str = "Button clicked!";

pub fn reducer(state: &mut AppState, action: Action) -> DispatchResult<Effect> {
    match action {
        Action::Init => {
            state.history.clear();
            state.message = None;
            DispatchResult::changed_with_many(mount_list(state))
        }

        // ===== Catalog pages =====
        Action::ListLoadMore => match request_page(state) {
            Some(effect) => DispatchResult::changed_with(effect),
            None => DispatchResult::unchanged(),
        },

        Action::PageDidLoad { mount, page } => {
            let rows = state.list_rows();
            let Some(list) = mounted_list(state, mount) else {
                return DispatchResult::unchanged();
            };
            if !list.list.commit_page(page) {
                return DispatchResult::unchanged();
            }
            // New items bypass the debounce.
            list.search.apply(list.list.items());
            list.keep_selection_visible(rows);
            state.message = None;
            DispatchResult::changed()
        }

        Action::PageDidError { mount, page, error } => {
            let Some(list) = mounted_list(state, mount) else {
                return DispatchResult::unchanged();
            };
            if !list.list.fail_load(page, error.clone()) {
                return DispatchResult::unchanged();
            }
            state.message = Some(format!("Page {page} failed: {error}"));
            DispatchResult::changed()
        }

        // ===== Selection =====
        Action::SelectionMove(delta) => {
            let Some(list) = state.list_screen() else {
                return DispatchResult::unchanged();
            };
            let index = list.selected.saturating_add_signed(isize::from(delta));
            select(state, index)
        }

        Action::SelectionPage(delta) => {
            let rows = state.list_rows() as isize;
            let Some(list) = state.list_screen() else {
                return DispatchResult::unchanged();
            };
            let index = list
                .selected
                .saturating_add_signed(isize::from(delta).saturating_mul(rows));
            select(state, index)
        }

        Action::SelectionJumpTop => select(state, 0),

        Action::SelectionJumpBottom => select(state, usize::MAX),

        Action::ListSelect(index) => select(state, index),

        // ===== Search =====
        Action::SearchStart => {
            let Some(list) = state.list_screen_mut() else {
                return DispatchResult::unchanged();
            };
            if list.search.editing {
                return DispatchResult::unchanged();
            }
            list.search.editing = true;
            DispatchResult::changed()
        }

        Action::SearchInput(ch) => {
            let (rows, delay_ms) = (state.list_rows(), state.settings.debounce_ms);
            let Some(list) = editing_list(state) else {
                return DispatchResult::unchanged();
            };
            list.search.query.push(ch);
            DispatchResult::changed_with(query_edited(list, rows, delay_ms))
        }

        Action::SearchBackspace => {
            let (rows, delay_ms) = (state.list_rows(), state.settings.debounce_ms);
            let Some(list) = editing_list(state) else {
                return DispatchResult::unchanged();
            };
            if list.search.query.pop().is_none() {
                return DispatchResult::unchanged();
            }
            DispatchResult::changed_with(query_edited(list, rows, delay_ms))
        }

        Action::SearchSubmit => {
            let Some(list) = editing_list(state) else {
                return DispatchResult::unchanged();
            };
            list.search.editing = false;
            DispatchResult::changed()
        }

        Action::SearchCancel => {
            let rows = state.list_rows();
            let Some(list) = state.list_screen_mut() else {
                return DispatchResult::unchanged();
            };
            if !list.search.editing && list.search.query.is_empty() {
                return DispatchResult::unchanged();
            }
            list.search.editing = false;
            list.search.query.clear();
            refilter(list, rows);
            DispatchResult::changed_with(Effect::CancelFilter)
        }

        Action::SearchDidSettle { mount, query } => {
            let rows = state.list_rows();
            let Some(list) = mounted_list(state, mount) else {
                return DispatchResult::unchanged();
            };
            if list.search.query != query {
                return DispatchResult::unchanged();
            }
            refilter(list, rows);
            DispatchResult::changed()
        }

        // ===== Navigation =====
        Action::DetailOpen => {
            let Some(id) = state
                .list_screen()
                .and_then(ListScreen::selected_item)
                .map(|item| item.id)
            else {
                return DispatchResult::unchanged();
            };
            open_detail(state, id)
        }

        Action::NavigateDetail(id) => open_detail(state, id),

        Action::NavigateBack => {
            let Some(route) = state.history.pop() else {
                return DispatchResult::unchanged();
            };
            let mut effects = vec![cancel_current(state)];
            state.message = None;
            match route {
                Route::List => effects.extend(mount_list(state)),
                Route::Detail { id } => effects.push(mount_detail(state, id)),
            }
            DispatchResult::changed_with_many(effects)
        }

        Action::DetailDidLoad { mount, record } => {
            let Some(detail) = mounted_detail(state, mount) else {
                return DispatchResult::unchanged();
            };
            if detail.id != record.id {
                return DispatchResult::unchanged();
            }
            let sprite_url = record.sprite_url.clone();
            detail.record = DataResource::Loaded(record);
            detail.failure = None;
            match sprite_url {
                Some(url) => {
                    detail.sprite = DataResource::Loading;
                    DispatchResult::changed_with(Effect::LoadSprite {
                        mount,
                        id: detail.id,
                        url,
                    })
                }
                None => DispatchResult::changed(),
            }
        }

        Action::DetailDidError { mount, id, error } => {
            let Some(detail) = mounted_detail(state, mount) else {
                return DispatchResult::unchanged();
            };
            if detail.id != id {
                return DispatchResult::unchanged();
            }
            detail.record = DataResource::Failed(error.to_string());
            detail.failure = Some(error);
            DispatchResult::changed()
        }

        Action::SpriteDidLoad { mount, id, sprite } => {
            let Some(detail) = mounted_detail(state, mount).filter(|detail| detail.id == id) else {
                return DispatchResult::unchanged();
            };
            detail.sprite = DataResource::Loaded(sprite);
            DispatchResult::changed()
        }

        Action::SpriteDidError { mount, id, error } => {
            let Some(detail) = mounted_detail(state, mount).filter(|detail| detail.id == id) else {
                return DispatchResult::unchanged();
            };
            detail.sprite = DataResource::Failed(error.to_string());
            DispatchResult::changed()
        }

        Action::DetailButtonPress => {
            if state.detail_screen().is_none() {
                return DispatchResult::unchanged();
            }
            state.message = Some(BUTTON_MESSAGE.to_string());
            DispatchResult::changed()
        }

        // ===== UI =====
        Action::UiTerminalResize(width, height) => {
            if state.terminal_size == (width, height) {
                return DispatchResult::unchanged();
            }
            state.terminal_size = (width, height);
            let rows = state.list_rows();
            if let Some(list) = state.list_screen_mut() {
                list.keep_selection_visible(rows);
            }
            DispatchResult::changed()
        }

        Action::Tick => {
            if !is_busy(state) {
                return DispatchResult::unchanged();
            }
            state.tick = state.tick.wrapping_add(1);
            DispatchResult::changed()
        }

        Action::Quit => DispatchResult::unchanged(),
    }
}

fn mounted_list(state: &mut AppState, mount: u64) -> Option<&mut ListScreen> {
    state.list_screen_mut().filter(|list| list.mount == mount)
}

fn mounted_detail(state: &mut AppState, mount: u64) -> Option<&mut DetailScreen> {
    state.detail_screen_mut().filter(|detail| detail.mount == mount)
}

fn editing_list(state: &mut AppState) -> Option<&mut ListScreen> {
    state.list_screen_mut().filter(|list| list.search.editing)
}

/// Replace the current screen with a fresh list and ask for its first page.
fn mount_list(state: &mut AppState) -> Vec<Effect> {
    state.mounts += 1;
    state.screen = Screen::List(ListScreen::new(state.mounts));
    request_page(state).into_iter().collect()
}

fn mount_detail(state: &mut AppState, id: u32) -> Effect {
    state.mounts += 1;
    state.screen = Screen::Detail(DetailScreen::new(state.mounts, id));
    Effect::LoadDetail {
        mount: state.mounts,
        id,
    }
}

fn open_detail(state: &mut AppState, id: u32) -> DispatchResult<Effect> {
    let cancel = cancel_current(state);
    let from = state.route();
    state.history.push(from);
    state.message = None;
    let load = mount_detail(state, id);
    DispatchResult::changed_with_many(vec![cancel, load])
}

fn cancel_current(state: &AppState) -> Effect {
    match state.screen {
        Screen::List(_) => Effect::CancelList,
        Screen::Detail(_) => Effect::CancelDetail,
    }
}

fn request_page(state: &mut AppState) -> Option<Effect> {
    let page_size = state.settings.page_size;
    let list = state.list_screen_mut()?;
    let page = list.list.begin_load()?;
    Some(Effect::LoadPage {
        mount: list.mount,
        page,
        page_size,
    })
}

/// Evaluate the scroll trigger against the current viewport.
fn scroll_check(state: &mut AppState) -> Option<Effect> {
    let trigger = ScrollTrigger::new(state.settings.scroll_threshold);
    let rows = state.list_rows();
    let list = state.list_screen()?;
    if !trigger.should_load(list, Viewport::of(list, rows)) {
        return None;
    }
    request_page(state)
}

fn select(state: &mut AppState, index: usize) -> DispatchResult<Effect> {
    let rows = state.list_rows();
    let Some(list) = state.list_screen_mut() else {
        return DispatchResult::unchanged();
    };
    let moved = list.set_selected(index, rows);
    match scroll_check(state) {
        Some(effect) => DispatchResult::changed_with(effect),
        None if moved => DispatchResult::changed(),
        None => DispatchResult::unchanged(),
    }
}

fn query_edited(list: &mut ListScreen, rows: usize, delay_ms: u64) -> Effect {
    if list.search.has_query() {
        Effect::ScheduleFilter {
            mount: list.mount,
            query: list.search.query.clone(),
            delay_ms,
        }
    } else {
        refilter(list, rows);
        Effect::CancelFilter
    }
}

fn refilter(list: &mut ListScreen, rows: usize) {
    list.search.apply(list.list.items());
    list.selected = 0;
    list.scroll_top = 0;
    list.keep_selection_visible(rows);
}

fn is_busy(state: &AppState) -> bool {
    match &state.screen {
        Screen::List(list) => list.list.is_loading(),
        Screen::Detail(detail) => detail.record.is_loading(),
    }
}

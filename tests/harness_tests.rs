//! Store-level flows: paging, debounced search and navigation.

mod common;

use common::{named_page, page};
use pokedex_ko::action::Action;
use pokedex_ko::effect::Effect;
use pokedex_ko::error::FetchError;
use pokedex_ko::reducer::reducer;
use pokedex_ko::sprite::SpriteData;
use pokedex_ko::state::{AppState, DetailRecord, Label, Route};
use tui_dispatch::testing::*;

fn list_len(state: &AppState) -> usize {
    state
        .list_screen()
        .map(|list| list.list.items().len())
        .unwrap_or_default()
}

fn next_page(state: &AppState) -> u32 {
    state
        .list_screen()
        .map(|list| list.list.next_page())
        .unwrap_or_default()
}

#[test]
fn init_loads_first_page() {
    let mut harness = EffectStoreTestHarness::new(AppState::default(), reducer);

    harness.dispatch_collect(Action::Init);
    let effects = harness.drain_effects();
    effects.effects_count(1);
    effects.effects_first_matches(|e| {
        matches!(
            e,
            Effect::LoadPage {
                page: 1,
                page_size: 20,
                ..
            }
        )
    });

    harness.complete_action(Action::PageDidLoad {
        mount: 1,
        page: page(1, 20, 20),
    });
    let (changed, total) = harness.process_emitted();
    assert_eq!((changed, total), (1, 1));

    harness.assert_state(|s| list_len(s) == 20);
    harness.assert_state(|s| next_page(s) == 2);
    harness.assert_state(|s| !s.list_screen().unwrap().list.is_exhausted());
    harness.assert_state(|s| !s.list_screen().unwrap().list.is_loading());
}

#[test]
fn failed_page_adds_nothing() {
    let mut harness = EffectStoreTestHarness::new(AppState::default(), reducer);
    harness.dispatch_collect(Action::Init);
    harness.drain_effects();

    // seven items resolved before the eighth failed; none of them arrive
    harness.complete_action(Action::PageDidError {
        mount: 1,
        page: 1,
        error: FetchError::Network {
            url: "https://api.test/pokemon-species/8".into(),
            message: "connection reset".into(),
        },
    });
    harness.process_emitted();

    harness.assert_state(|s| list_len(s) == 0);
    harness.assert_state(|s| next_page(s) == 1);
    harness.assert_state(|s| !s.list_screen().unwrap().list.is_loading());
    harness.assert_state(|s| s.message.is_some());
}

#[test]
fn scrolling_while_loading_requests_nothing() {
    let mut harness = EffectStoreTestHarness::new(AppState::default(), reducer);
    harness.dispatch_collect(Action::Init);
    harness.drain_effects();

    harness.dispatch_collect(Action::SelectionJumpBottom);
    harness.dispatch_collect(Action::SelectionMove(1));
    let effects = harness.drain_effects();
    effects.effects_none_match(|e| matches!(e, Effect::LoadPage { .. }));
}

#[test]
fn scrolling_near_bottom_requests_next_page() {
    let mut harness = EffectStoreTestHarness::new(AppState::default(), reducer);
    harness.dispatch_collect(Action::Init);
    harness.drain_effects();
    harness.complete_action(Action::PageDidLoad {
        mount: 1,
        page: page(1, 20, 20),
    });
    harness.process_emitted();

    // 80x24 leaves 16 list rows; the top of the list is not near the end
    harness.dispatch_collect(Action::SelectionMove(1));
    harness.drain_effects().effects_empty();

    harness.dispatch_collect(Action::SelectionJumpBottom);
    let effects = harness.drain_effects();
    effects.effects_count(1);
    effects.effects_first_matches(|e| matches!(e, Effect::LoadPage { page: 2, .. }));

    // a second trigger while page 2 is in flight is suppressed
    harness.dispatch_collect(Action::SelectionMove(-1));
    harness.dispatch_collect(Action::SelectionMove(1));
    harness
        .drain_effects()
        .effects_none_match(|e| matches!(e, Effect::LoadPage { .. }));
}

#[test]
fn short_page_stops_loading_for_good() {
    let mut harness = EffectStoreTestHarness::new(AppState::default(), reducer);
    harness.dispatch_collect(Action::Init);
    harness.drain_effects();
    harness.complete_action(Action::PageDidLoad {
        mount: 1,
        page: page(1, 20, 6),
    });
    harness.process_emitted();
    harness.assert_state(|s| s.list_screen().unwrap().list.is_exhausted());

    harness.dispatch_collect(Action::SelectionJumpBottom);
    harness.dispatch_collect(Action::ListLoadMore);
    harness
        .drain_effects()
        .effects_none_match(|e| matches!(e, Effect::LoadPage { .. }));
    harness.assert_state(|s| list_len(s) == 6);
}

#[test]
fn list_grows_by_page_count() {
    let mut harness = EffectStoreTestHarness::new(AppState::default(), reducer);
    harness.dispatch_collect(Action::Init);
    harness.complete_action(Action::PageDidLoad {
        mount: 1,
        page: page(1, 20, 20),
    });
    harness.process_emitted();
    harness.dispatch_collect(Action::ListLoadMore);
    harness.complete_action(Action::PageDidLoad {
        mount: 1,
        page: page(2, 20, 20),
    });
    // duplicate delivery of the same page is ignored
    harness.complete_action(Action::PageDidLoad {
        mount: 1,
        page: page(2, 20, 20),
    });
    let (changed, total) = harness.process_emitted();
    assert_eq!((changed, total), (1, 2));
    harness.assert_state(|s| list_len(s) == 40);
    harness.assert_state(|s| next_page(s) == 3);
}

#[test]
fn debounced_search_filters_by_jamo() {
    let mut harness = EffectStoreTestHarness::new(AppState::default(), reducer);
    harness.dispatch_collect(Action::Init);
    harness.complete_action(Action::PageDidLoad {
        mount: 1,
        page: named_page(1, 20, &["이상해씨", "파이리", "꼬부기", "피카츄", "라이츄"]),
    });
    harness.process_emitted();
    harness.drain_effects();

    harness.dispatch_all([
        Action::SearchStart,
        Action::SearchInput('피'),
        Action::SearchInput('카'),
    ]);
    let effects = harness.drain_effects();
    effects.effects_count(2);
    effects.effects_all_match(|e| matches!(e, Effect::ScheduleFilter { delay_ms: 300, .. }));

    harness.complete_action(Action::SearchDidSettle {
        mount: 1,
        query: "피카".into(),
    });
    harness.process_emitted();
    harness.assert_state(|s| s.list_screen().unwrap().search.filtered() == [3]);
    harness.assert_state(|s| s.list_screen().unwrap().selected_item().unwrap().id == 4);
}

#[test]
fn query_matching_nothing_is_empty_view() {
    let mut harness = EffectStoreTestHarness::new(AppState::default(), reducer);
    harness.dispatch_collect(Action::Init);
    harness.complete_action(Action::PageDidLoad {
        mount: 1,
        page: named_page(1, 20, &["이상해씨", "파이리"]),
    });
    harness.process_emitted();

    harness.dispatch_all([Action::SearchStart, Action::SearchInput('뮤')]);
    harness.complete_action(Action::SearchDidSettle {
        mount: 1,
        query: "뮤".into(),
    });
    harness.process_emitted();
    harness.assert_state(|s| s.list_screen().unwrap().visible_count() == 0);
    harness.assert_state(|s| s.list_screen().unwrap().selected_item().is_none());
    harness.assert_state(|s| s.message.is_none());
}

#[test]
fn new_page_refilters_without_waiting() {
    let mut harness = EffectStoreTestHarness::new(AppState::default(), reducer);
    harness.dispatch_collect(Action::Init);
    harness.complete_action(Action::PageDidLoad {
        mount: 1,
        page: named_page(1, 2, &["파이리", "꼬부기"]),
    });
    harness.process_emitted();
    harness.dispatch_all([Action::SearchStart, Action::SearchInput('츄')]);
    harness.complete_action(Action::SearchDidSettle {
        mount: 1,
        query: "츄".into(),
    });
    harness.process_emitted();
    harness.assert_state(|s| s.list_screen().unwrap().visible_count() == 0);

    harness.dispatch_collect(Action::ListLoadMore);
    harness.complete_action(Action::PageDidLoad {
        mount: 1,
        page: named_page(2, 2, &["피카츄", "라이츄"]),
    });
    harness.process_emitted();
    harness.assert_state(|s| s.list_screen().unwrap().search.filtered() == [2, 3]);
}

#[test]
fn detail_round_trip_remounts_list() {
    let mut harness = EffectStoreTestHarness::new(AppState::default(), reducer);
    harness.dispatch_collect(Action::Init);
    harness.complete_action(Action::PageDidLoad {
        mount: 1,
        page: page(1, 20, 20),
    });
    harness.process_emitted();
    harness.drain_effects();

    harness.dispatch_collect(Action::SelectionMove(2));
    harness.dispatch_collect(Action::DetailOpen);
    harness.assert_state(|s| s.route() == Route::Detail { id: 3 });
    let effects = harness.drain_effects();
    effects.effects_count(2);
    effects.effects_first_matches(|e| matches!(e, Effect::CancelList));

    // a page answer for the list we left is ignored
    harness.complete_action(Action::PageDidLoad {
        mount: 1,
        page: page(2, 20, 20),
    });
    let (changed, _) = harness.process_emitted();
    assert_eq!(changed, 0);

    harness.dispatch_collect(Action::NavigateBack);
    harness.assert_state(|s| s.route() == Route::List);
    harness.assert_state(|s| list_len(s) == 0);
    harness.assert_state(|s| s.list_screen().unwrap().list.is_loading());
    harness
        .drain_effects()
        .effects_first_matches(|e| matches!(e, Effect::CancelDetail));
}

#[test]
fn detail_failure_is_kept_for_display() {
    let mut harness = EffectStoreTestHarness::new(AppState::default(), reducer);
    harness.dispatch_collect(Action::NavigateDetail(151));
    harness.assert_state(|s| s.detail_screen().unwrap().record.is_loading());

    let mount = 1;
    harness.complete_action(Action::DetailDidError {
        mount,
        id: 151,
        error: FetchError::MissingLocalization {
            resource: "pokemon-species/151".into(),
            language: "ko".into(),
        },
    });
    harness.process_emitted();
    harness.assert_state(|s| s.detail_screen().unwrap().record.is_failed());
    harness.assert_state(|s| {
        s.detail_screen()
            .unwrap()
            .failure
            .as_ref()
            .is_some_and(FetchError::is_missing_localization)
    });
}

fn bulbasaur(id: u32) -> DetailRecord {
    DetailRecord {
        id,
        name: "bulbasaur".into(),
        display_name: "이상해씨".into(),
        sprite_url: Some("https://img.test/1.png".into()),
        height: 7,
        weight: 69,
        types: vec![Label::Localized("풀".into())],
        abilities: Vec::new(),
        moves: Vec::new(),
    }
}

#[test]
fn detail_loads_sprite_after_record() {
    let mut harness = EffectStoreTestHarness::new(AppState::default(), reducer);
    harness.dispatch_collect(Action::NavigateDetail(1));
    harness.drain_effects();

    // a record for another id never replaces the one being shown
    harness.complete_action(Action::DetailDidLoad {
        mount: 1,
        record: bulbasaur(2),
    });
    let (changed, _) = harness.process_emitted();
    assert_eq!(changed, 0);
    harness.assert_state(|s| s.detail_screen().unwrap().record.is_loading());

    harness.complete_action(Action::DetailDidLoad {
        mount: 1,
        record: bulbasaur(1),
    });
    harness.process_emitted();
    let effects = harness.drain_effects();
    effects.effects_count(1);
    effects.effects_first_matches(|e| matches!(e, Effect::LoadSprite { mount: 1, id: 1, .. }));
    harness.assert_state(|s| s.detail_screen().unwrap().sprite.is_loading());

    harness.complete_action(Action::SpriteDidLoad {
        mount: 1,
        id: 1,
        sprite: SpriteData::from_rgba(&image::RgbaImage::new(2, 2)),
    });
    harness.process_emitted();
    harness.assert_state(|s| s.detail_screen().unwrap().sprite.is_loaded());
}

#[test]
fn sprite_for_left_detail_is_dropped() {
    let mut harness = EffectStoreTestHarness::new(AppState::default(), reducer);
    harness.dispatch_collect(Action::Init);
    harness.dispatch_collect(Action::NavigateDetail(1));
    harness.complete_action(Action::DetailDidLoad {
        mount: 2,
        record: bulbasaur(1),
    });
    harness.process_emitted();
    harness.drain_effects();

    harness.dispatch_collect(Action::NavigateDetail(4));
    harness
        .drain_effects()
        .effects_first_matches(|e| matches!(e, Effect::CancelDetail));
    harness.complete_action(Action::SpriteDidLoad {
        mount: 2,
        id: 1,
        sprite: SpriteData::from_rgba(&image::RgbaImage::new(2, 2)),
    });
    let (changed, _) = harness.process_emitted();
    assert_eq!(changed, 0);
    harness.assert_state(|s| s.detail_screen().unwrap().sprite.is_empty());
}

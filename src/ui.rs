use crossterm::event::KeyCode;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{
        Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap,
    },
    Frame,
};
use tui_dispatch::{
    Component, EventContext, EventKind, EventRoutingState, HandlerResponse, RenderContext,
};
use tui_dispatch_components::style::BorderStyle;
use tui_dispatch_components::{
    BaseStyle, Padding, SelectList, SelectListBehavior, SelectListProps, SelectListStyle,
    SelectionStyle, StatusBar, StatusBarHint, StatusBarItem, StatusBarProps, StatusBarSection,
    StatusBarStyle,
};

use crate::action::Action;
use crate::sprite::SpriteData;
use crate::state::{AppState, DetailRecord, DetailScreen, Label, ListScreen, Screen};

const BG_BASE: Color = Color::Rgb(12, 18, 28);
const BG_PANEL: Color = Color::Rgb(20, 32, 46);
const BG_HIGHLIGHT: Color = Color::Rgb(28, 92, 110);
const TEXT_MAIN: Color = Color::Rgb(232, 242, 244);
const TEXT_DIM: Color = Color::Rgb(176, 195, 207);
const ACCENT_TEAL: Color = Color::Rgb(72, 204, 184);
const ACCENT_GOLD: Color = Color::Rgb(228, 176, 88);
const ACCENT_RED: Color = Color::Rgb(226, 92, 88);

const SPRITE_COLUMNS: u16 = 24;

pub const SEARCH_PLACEHOLDER: &str = "포켓몬 이름을 입력해주세요.";

#[derive(tui_dispatch::ComponentId, Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum PokedexComponentId {
    List,
    Search,
    Detail,
}

#[derive(tui_dispatch::BindingContext, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PokedexContext {
    List,
    Search,
    Detail,
}

impl EventRoutingState<PokedexComponentId, PokedexContext> for AppState {
    fn focused(&self) -> Option<PokedexComponentId> {
        match &self.screen {
            Screen::List(list) if list.search.editing => Some(PokedexComponentId::Search),
            Screen::List(_) => Some(PokedexComponentId::List),
            Screen::Detail(_) => Some(PokedexComponentId::Detail),
        }
    }

    fn modal(&self) -> Option<PokedexComponentId> {
        if self.searching() {
            Some(PokedexComponentId::Search)
        } else {
            None
        }
    }

    fn binding_context(&self, id: PokedexComponentId) -> PokedexContext {
        match id {
            PokedexComponentId::List => PokedexContext::List,
            PokedexComponentId::Search => PokedexContext::Search,
            PokedexComponentId::Detail => PokedexContext::Detail,
        }
    }

    fn default_context(&self) -> PokedexContext {
        PokedexContext::List
    }
}

pub struct PokedexUi {
    list: SelectList,
    status_bar: StatusBar,
}

impl Default for PokedexUi {
    fn default() -> Self {
        Self::new()
    }
}

impl PokedexUi {
    pub fn new() -> Self {
        Self {
            list: SelectList::new(),
            status_bar: StatusBar::new(),
        }
    }

    pub fn render(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        state: &AppState,
        _render_ctx: RenderContext,
        event_ctx: &mut EventContext<PokedexComponentId>,
    ) {
        for id in [
            PokedexComponentId::List,
            PokedexComponentId::Search,
            PokedexComponentId::Detail,
        ] {
            event_ctx.component_areas.remove(&id);
        }
        for (id, area) in self.draw(frame, area, state) {
            event_ctx.set_component_area(id, area);
        }
    }

    /// Draw the mounted screen; returns the areas that receive events.
    pub fn draw(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        state: &AppState,
    ) -> Vec<(PokedexComponentId, Rect)> {
        frame.render_widget(Block::default().style(Style::default().bg(BG_BASE)), area);
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(3),
                Constraint::Length(3),
            ])
            .split(area);

        let areas = match &state.screen {
            Screen::List(list) => {
                render_search_header(frame, layout[0], list);
                render_list(frame, layout[1], state, list, &mut self.list);
                let mut areas = vec![(PokedexComponentId::List, layout[1])];
                if list.search.editing {
                    areas.push((PokedexComponentId::Search, layout[0]));
                }
                areas
            }
            Screen::Detail(detail) => {
                render_detail_header(frame, layout[0], detail);
                render_detail(frame, layout[1], state, detail);
                vec![(PokedexComponentId::Detail, layout[1])]
            }
        };
        render_footer(frame, layout[2], state, &mut self.status_bar);
        areas
    }

    pub fn handle_list_event(
        &mut self,
        event: &EventKind,
        state: &AppState,
    ) -> HandlerResponse<Action> {
        handle_list_event(event, state, &mut self.list)
    }

    pub fn handle_search_event(
        &mut self,
        event: &EventKind,
        state: &AppState,
    ) -> HandlerResponse<Action> {
        handle_search_event(event, state)
    }

    pub fn handle_detail_event(
        &mut self,
        event: &EventKind,
        state: &AppState,
    ) -> HandlerResponse<Action> {
        handle_detail_event(event, state)
    }
}

/// Keys that work regardless of focus.
pub fn handle_global_event(event: &EventKind, state: &AppState) -> HandlerResponse<Action> {
    match event {
        EventKind::Resize(width, height) => {
            HandlerResponse::action(Action::UiTerminalResize(*width, *height)).with_render()
        }
        EventKind::Key(key) if !state.searching() => match key.code {
            KeyCode::Char('q') => HandlerResponse::action(Action::Quit),
            KeyCode::Char('/') if state.list_screen().is_some() => {
                HandlerResponse::action(Action::SearchStart)
            }
            _ => HandlerResponse::ignored(),
        },
        _ => HandlerResponse::ignored(),
    }
}

pub fn handle_list_event(
    event: &EventKind,
    state: &AppState,
    select_list: &mut SelectList,
) -> HandlerResponse<Action> {
    let Some(list) = state.list_screen() else {
        return HandlerResponse::ignored();
    };
    let actions = match event {
        EventKind::Key(key) => match key.code {
            KeyCode::Enter => vec![Action::DetailOpen],
            KeyCode::PageDown => vec![Action::SelectionPage(1)],
            KeyCode::PageUp => vec![Action::SelectionPage(-1)],
            KeyCode::Home | KeyCode::Char('g') => vec![Action::SelectionJumpTop],
            KeyCode::End | KeyCode::Char('G') => vec![Action::SelectionJumpBottom],
            KeyCode::Char('r') => vec![Action::ListLoadMore],
            KeyCode::Esc if !list.search.query.is_empty() => vec![Action::SearchCancel],
            _ => {
                let items = list_items(list);
                let props = SelectListProps {
                    items: &items,
                    count: items.len(),
                    selected: list.selected.min(items.len().saturating_sub(1)),
                    is_focused: true,
                    style: list_style(),
                    behavior: SelectListBehavior {
                        show_scrollbar: true,
                        wrap_navigation: false,
                    },
                    on_select: Action::ListSelect,
                    render_item: &|item| item.clone(),
                };
                let actions: Vec<_> = select_list.handle_event(event, props).into_iter().collect();
                return handler_response(actions);
            }
        },
        EventKind::Scroll { delta, .. } => vec![Action::SelectionMove((*delta * 3) as i16)],
        _ => vec![],
    };
    handler_response(actions)
}

pub fn handle_search_event(event: &EventKind, _state: &AppState) -> HandlerResponse<Action> {
    let actions = match event {
        EventKind::Key(key) => match key.code {
            KeyCode::Esc => vec![Action::SearchCancel],
            KeyCode::Enter => vec![Action::SearchSubmit],
            KeyCode::Backspace => vec![Action::SearchBackspace],
            KeyCode::Char(ch) => vec![Action::SearchInput(ch)],
            _ => vec![],
        },
        _ => vec![],
    };
    handler_response(actions)
}

pub fn handle_detail_event(event: &EventKind, _state: &AppState) -> HandlerResponse<Action> {
    let actions = match event {
        EventKind::Key(key) => match key.code {
            KeyCode::Backspace | KeyCode::Esc | KeyCode::Char('b') => vec![Action::NavigateBack],
            KeyCode::Char('o') => vec![Action::DetailButtonPress],
            _ => vec![],
        },
        _ => vec![],
    };
    handler_response(actions)
}

fn handler_response(actions: Vec<Action>) -> HandlerResponse<Action> {
    if actions.is_empty() {
        HandlerResponse::ignored()
    } else {
        HandlerResponse {
            actions,
            consumed: true,
            needs_render: false,
        }
    }
}

fn render_search_header(frame: &mut Frame, area: Rect, list: &ListScreen) {
    let query = if list.search.editing {
        Span::styled(
            format!("{}_", list.search.query),
            Style::default().fg(ACCENT_TEAL),
        )
    } else if list.search.query.is_empty() {
        Span::styled(SEARCH_PLACEHOLDER, Style::default().fg(TEXT_DIM))
    } else {
        Span::styled(list.search.query.clone(), Style::default().fg(ACCENT_TEAL))
    };
    let line = Line::from(vec![Span::raw("검색: "), query]);
    let block = Block::default()
        .borders(Borders::ALL)
        .title("POKEMON LIST")
        .style(Style::default().bg(BG_PANEL).fg(TEXT_MAIN))
        .border_style(border_style(list.search.editing));
    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn render_list(
    frame: &mut Frame,
    area: Rect,
    state: &AppState,
    list: &ListScreen,
    select_list: &mut SelectList,
) {
    let title = format!(
        "DEX {}/{}",
        list.visible_count(),
        list.list.items().len()
    );
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .style(Style::default().bg(BG_PANEL).fg(TEXT_MAIN))
        .border_style(border_style(!list.search.editing));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if list.visible_count() == 0 {
        let notice = if list.list.is_loading() {
            loading_text(state.tick)
        } else if list.search.has_query() {
            "일치하는 포켓몬이 없습니다.".to_string()
        } else {
            String::new()
        };
        let paragraph = Paragraph::new(notice)
            .alignment(Alignment::Center)
            .style(Style::default().fg(TEXT_DIM));
        frame.render_widget(paragraph, inner);
        return;
    }

    // Only the rows from `scroll_top` are handed to the SelectList, so what is
    // drawn is exactly the viewport the scroll trigger measures.
    let rows = usize::from(inner.height);
    let items = list_items(list);
    let window = list.window(rows);
    let visible = &items[window.clone()];
    let scrollable = items.len() > rows && inner.width > 1;
    let list_area = if scrollable {
        Rect {
            width: inner.width - 1,
            ..inner
        }
    } else {
        inner
    };
    let props = SelectListProps {
        items: visible,
        count: visible.len(),
        selected: list
            .selected
            .saturating_sub(window.start)
            .min(visible.len().saturating_sub(1)),
        is_focused: !list.search.editing,
        style: list_style(),
        behavior: SelectListBehavior {
            show_scrollbar: false,
            wrap_navigation: false,
        },
        on_select: Action::ListSelect,
        render_item: &|item| item.clone(),
    };
    select_list.render(frame, list_area, props);

    if scrollable {
        let bar_area = Rect {
            x: inner.x + inner.width - 1,
            width: 1,
            ..inner
        };
        let mut bar_state = ScrollbarState::new(items.len().saturating_sub(rows) + 1)
            .position(window.start)
            .viewport_content_length(rows);
        frame.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .style(Style::default().fg(TEXT_DIM)),
            bar_area,
            &mut bar_state,
        );
    }
}

fn list_items(list: &ListScreen) -> Vec<Line<'static>> {
    list.search
        .filtered()
        .iter()
        .filter_map(|idx| list.list.items().get(*idx))
        .map(|item| Line::from(format!("#{:03} {}", item.id, item.display_name)))
        .collect()
}

fn render_detail_header(frame: &mut Frame, area: Rect, detail: &DetailScreen) {
    let title = match detail.record.data() {
        Some(record) => format!("No.{} - {}", record.id, record.display_name),
        None => format!("No.{}", detail.id),
    };
    let line = Line::from(vec![
        Span::styled("[b] 돌아가기", Style::default().fg(TEXT_DIM)),
        Span::raw("  "),
        Span::styled(
            title,
            Style::default()
                .fg(ACCENT_TEAL)
                .add_modifier(Modifier::BOLD),
        ),
    ]);
    let block = Block::default()
        .borders(Borders::ALL)
        .title("POKEMON")
        .style(Style::default().bg(BG_PANEL).fg(TEXT_MAIN))
        .border_style(border_style(true));
    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn render_detail(frame: &mut Frame, area: Rect, state: &AppState, detail: &DetailScreen) {
    let block = Block::default()
        .borders(Borders::ALL)
        .style(Style::default().bg(BG_PANEL).fg(TEXT_MAIN))
        .border_style(Style::default().fg(TEXT_DIM));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(record) = detail.record.data() else {
        let text = if detail.record.is_failed() {
            let reason = detail
                .failure
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default();
            Text::from(vec![
                Line::styled("Pokemon not found", Style::default().fg(ACCENT_RED)),
                Line::styled(reason, Style::default().fg(TEXT_DIM)),
            ])
        } else {
            Text::from(loading_text(state.tick))
        };
        frame.render_widget(Paragraph::new(text).wrap(Wrap { trim: true }), inner);
        return;
    };

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SPRITE_COLUMNS), Constraint::Min(10)])
        .split(inner);
    render_sprite(frame, columns[0], detail);
    frame.render_widget(
        Paragraph::new(detail_text(record)).wrap(Wrap { trim: true }),
        columns[1],
    );
}

fn render_sprite(frame: &mut Frame, area: Rect, detail: &DetailScreen) {
    if let Some(sprite) = detail.sprite.data() {
        let (cols, rows) = sprite_fit(sprite, area.width, area.height);
        let sprite_area = Rect {
            x: area.x.saturating_add(area.width.saturating_sub(cols) / 2),
            y: area.y.saturating_add(area.height.saturating_sub(rows) / 2),
            width: cols,
            height: rows,
        };
        frame.render_widget(Paragraph::new(sprite.half_blocks(cols, rows)), sprite_area);
        return;
    }

    let content = if detail.sprite.is_loading() {
        "[loading sprite]"
    } else {
        "[no sprite]"
    };
    let paragraph = Paragraph::new(content)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: false })
        .style(Style::default().fg(TEXT_DIM));
    frame.render_widget(paragraph, area);
}

/// Largest cell box keeping the sprite's aspect; a cell is two pixels tall.
fn sprite_fit(sprite: &SpriteData, width: u16, height: u16) -> (u16, u16) {
    if sprite.width() == 0 || sprite.height() == 0 || width == 0 || height == 0 {
        return (0, 0);
    }
    let (w, h) = (f64::from(sprite.width()), f64::from(sprite.height()));
    let scale = (f64::from(width) / w).min(f64::from(height) * 2.0 / h);
    let cols = (w * scale + 1e-9).floor().clamp(1.0, f64::from(width)) as u16;
    let rows = (h * scale / 2.0 - 1e-9).ceil().clamp(1.0, f64::from(height)) as u16;
    (cols, rows)
}

fn detail_text(record: &DetailRecord) -> Text<'static> {
    let key = Style::default().fg(ACCENT_GOLD);
    Text::from(vec![
        Line::from(vec![
            Span::styled("키: ", key),
            Span::raw(format!("{:.1} m", f64::from(record.height) / 10.0)),
            Span::raw("  "),
            Span::styled("몸무게: ", key),
            Span::raw(format!("{:.1} kg", f64::from(record.weight) / 10.0)),
        ]),
        label_line("속성", &record.types),
        label_line("특성", &record.abilities),
        Line::raw(""),
        label_line("기술", &record.moves),
    ])
}

fn label_line(title: &str, labels: &[Label]) -> Line<'static> {
    let mut spans = vec![Span::styled(
        format!("{title}: "),
        Style::default().fg(ACCENT_GOLD),
    )];
    for (idx, label) in labels.iter().enumerate() {
        if idx > 0 {
            spans.push(Span::raw(", "));
        }
        let style = if label.is_localized() {
            Style::default().fg(TEXT_MAIN)
        } else {
            Style::default()
                .fg(TEXT_DIM)
                .add_modifier(Modifier::ITALIC)
        };
        spans.push(Span::styled(label.text().to_string(), style));
    }
    Line::from(spans)
}

fn render_footer(frame: &mut Frame, area: Rect, state: &AppState, status_bar: &mut StatusBar) {
    let status = status_text(state);
    let (left_hints, center_hints) = status_hints(state);
    let status_span = Span::styled(status.as_str(), Style::default().fg(ACCENT_GOLD));
    let status_items = [StatusBarItem::span(status_span)];

    let style = StatusBarStyle {
        base: BaseStyle {
            border: Some(BorderStyle {
                borders: Borders::ALL,
                style: Style::default().fg(TEXT_DIM),
                focused_style: Some(Style::default().fg(ACCENT_TEAL)),
            }),
            padding: Padding::xy(1, 0),
            bg: Some(BG_PANEL),
            fg: Some(TEXT_MAIN),
        },
        text: Style::default().fg(TEXT_DIM),
        hint_key: Style::default()
            .fg(ACCENT_TEAL)
            .add_modifier(Modifier::BOLD),
        hint_label: Style::default().fg(TEXT_DIM),
        separator: Style::default().fg(TEXT_DIM),
    };

    let props = StatusBarProps {
        left: StatusBarSection::hints(&left_hints).with_separator("  "),
        center: StatusBarSection::hints(&center_hints).with_separator("  "),
        right: StatusBarSection::items(&status_items).with_separator("  "),
        style,
        is_focused: false,
    };
    Component::<Action>::render(status_bar, frame, area, props);
}

/// Text for the right side of the footer.
pub fn status_text(state: &AppState) -> String {
    if let Some(message) = &state.message {
        return message.clone();
    }
    match &state.screen {
        Screen::List(list) if list.list.is_loading() => loading_text(state.tick),
        Screen::List(list) if list.list.is_exhausted() => {
            format!("{} loaded, end of list", list.list.items().len())
        }
        Screen::List(list) => format!("{} loaded", list.list.items().len()),
        Screen::Detail(detail) if detail.record.is_loading() => loading_text(state.tick),
        Screen::Detail(_) => String::new(),
    }
}

fn status_hints(state: &AppState) -> (Vec<StatusBarHint<'static>>, Vec<StatusBarHint<'static>>) {
    let center = vec![StatusBarHint::new("q", "Quit")];
    match &state.screen {
        Screen::List(list) if list.search.editing => (
            vec![
                StatusBarHint::new("Enter", "Keep"),
                StatusBarHint::new("Esc", "Clear"),
                StatusBarHint::new("Bksp", "Delete"),
            ],
            Vec::new(),
        ),
        Screen::List(_) => (
            vec![
                StatusBarHint::new("j/k", "Move"),
                StatusBarHint::new("Enter", "Open"),
                StatusBarHint::new("/", "Search"),
                StatusBarHint::new("r", "More"),
            ],
            center,
        ),
        Screen::Detail(_) => (
            vec![
                StatusBarHint::new("b", "Back"),
                StatusBarHint::new("o", "Ball"),
            ],
            center,
        ),
    }
}

fn loading_text(tick: u64) -> String {
    let dots = (tick % 4) as usize;
    format!("Loading{}", ".".repeat(dots))
}

fn border_style(focused: bool) -> Style {
    if focused {
        Style::default()
            .fg(ACCENT_TEAL)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(TEXT_DIM)
    }
}

fn list_style() -> SelectListStyle {
    SelectListStyle {
        base: BaseStyle {
            border: None,
            padding: Padding::xy(1, 0),
            bg: None,
            fg: Some(TEXT_MAIN),
        },
        selection: SelectionStyle {
            style: Some(
                Style::default()
                    .bg(BG_HIGHLIGHT)
                    .fg(TEXT_MAIN)
                    .add_modifier(Modifier::BOLD),
            ),
            marker: None,
            disabled: false,
        },
        ..SelectListStyle::default()
    }
}

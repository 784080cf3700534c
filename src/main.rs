//! Pokedex (ko) - PokeAPI catalog with Korean names

use std::cell::RefCell;
use std::io;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tui_dispatch::{
    EffectContext, EffectStoreLike, EffectStoreWithMiddleware, EventBus, Keybindings, TaskKey,
};
use tui_dispatch_debug::debug::DebugLayer;
use tui_dispatch_debug::{
    DebugCliArgs, DebugRunOutput, DebugSession, DebugSessionError, ReplayItem,
};

use pokedex_ko::action::Action;
use pokedex_ko::api::{CatalogApi, PokeApiClient};
use pokedex_ko::catalog::{load_detail, load_page, load_sprite, with_deadline};
use pokedex_ko::config::{Config, ConfigArgs};
use pokedex_ko::effect::Effect;
use pokedex_ko::logging;
use pokedex_ko::reducer::reducer;
use pokedex_ko::state::AppState;
use pokedex_ko::ui::{self, PokedexComponentId, PokedexContext, PokedexUi};

const PAGE_TASK: &str = "catalog_page";
const FILTER_TASK: &str = "search_filter";
const DETAIL_TASK: &str = "detail";
const SPRITE_TASK: &str = "detail_sprite";

#[derive(Parser, Debug)]
#[command(name = "pokedex-ko")]
#[command(about = "Browse PokeAPI with Korean names, infinite scroll and jamo search")]
struct Args {
    #[command(flatten)]
    config: ConfigArgs,

    #[command(flatten)]
    debug: DebugCliArgs,
}

/// What effect handlers need besides the effect itself.
#[derive(Clone)]
struct Services {
    api: Arc<dyn CatalogApi>,
    language: Arc<str>,
    timeout: Duration,
}

#[tokio::main]
async fn main() -> io::Result<()> {
    let args = Args::parse();
    let config = Config::from_args(args.config)
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err))?;
    logging::init(config.log_file.as_deref())?;
    tracing::info!(api_base = %config.api_base, language = %config.language, "starting");

    let client = PokeApiClient::new(config.api_base.clone(), config.timeout)
        .map_err(io::Error::other)?;
    let services = Services {
        api: Arc::new(client),
        language: Arc::from(config.language.as_str()),
        timeout: config.timeout,
    };

    let debug = DebugSession::new(args.debug);
    let settings = config.settings;
    let state = debug
        .load_state_or_else_async(move || async move {
            Ok::<AppState, io::Error>(AppState::new(settings))
        })
        .await
        .map_err(debug_error)?;
    let replay_actions = debug.load_replay_items().map_err(debug_error)?;
    let (middleware, recorder) = debug.middleware_with_recorder();
    let store = EffectStoreWithMiddleware::new(state, reducer, middleware);

    let use_alt_screen = debug.use_alt_screen();
    let mut stdout = io::stdout();
    if use_alt_screen {
        enable_raw_mode()?;
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &debug, store, replay_actions, services).await;

    if use_alt_screen {
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;
    }

    let run_output = result?;
    run_output.write_render_output()?;
    debug.save_actions(recorder.as_ref()).map_err(debug_error)?;
    tracing::info!("stopped");
    Ok(())
}

fn debug_error(error: DebugSessionError) -> io::Error {
    io::Error::other(format!("debug session error: {error}"))
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    debug: &DebugSession,
    store: impl EffectStoreLike<AppState, Action, Effect>,
    replay_actions: Vec<ReplayItem<Action>>,
    services: Services,
) -> io::Result<DebugRunOutput<AppState>> {
    let ui = Rc::new(RefCell::new(PokedexUi::new()));
    let mut bus: EventBus<AppState, Action, PokedexComponentId, PokedexContext> = EventBus::new();
    let keybindings: Keybindings<PokedexContext> = Keybindings::new();

    let ui_list = Rc::clone(&ui);
    bus.register(PokedexComponentId::List, move |event, state| {
        ui_list.borrow_mut().handle_list_event(&event.kind, state)
    });

    let ui_search = Rc::clone(&ui);
    bus.register(PokedexComponentId::Search, move |event, state| {
        ui_search
            .borrow_mut()
            .handle_search_event(&event.kind, state)
    });

    let ui_detail = Rc::clone(&ui);
    bus.register(PokedexComponentId::Detail, move |event, state| {
        ui_detail
            .borrow_mut()
            .handle_detail_event(&event.kind, state)
    });

    bus.register_global(|event, state| ui::handle_global_event(&event.kind, state));

    debug
        .run_effect_app_with_bus(
            terminal,
            store,
            DebugLayer::simple(),
            replay_actions,
            Some(Action::Init),
            Some(Action::Quit),
            |runtime| {
                if debug.render_once() {
                    return;
                }
                runtime
                    .subscriptions()
                    .interval("tick", Duration::from_millis(250), || Action::Tick);
            },
            &mut bus,
            &keybindings,
            |frame, area, state, render_ctx, event_ctx| {
                ui.borrow_mut()
                    .render(frame, area, state, render_ctx, event_ctx);
            },
            |action| matches!(action, Action::Quit),
            move |effect, ctx| handle_effect(effect, ctx, services.clone()),
        )
        .await
}

fn handle_effect(effect: Effect, ctx: &mut EffectContext<Action>, services: Services) {
    match effect {
        Effect::LoadPage {
            mount,
            page,
            page_size,
        } => {
            tracing::debug!(mount, page, page_size, "loading page");
            ctx.tasks().spawn(TaskKey::new(PAGE_TASK), async move {
                let operation = format!("page {page}");
                let result = with_deadline(
                    services.timeout,
                    operation,
                    load_page(services.api.as_ref(), &services.language, page, page_size),
                )
                .await;
                match result {
                    Ok(page) => Action::PageDidLoad { mount, page },
                    Err(error) => {
                        tracing::warn!(page, %error, "page load failed");
                        Action::PageDidError { mount, page, error }
                    }
                }
            });
        }
        Effect::ScheduleFilter {
            mount,
            query,
            delay_ms,
        } => {
            // The filter itself is pure; the task only marks the end of the quiet period.
            ctx.tasks().debounce(
                TaskKey::new(FILTER_TASK),
                Duration::from_millis(delay_ms),
                async move { Action::SearchDidSettle { mount, query } },
            );
        }
        Effect::CancelFilter => {
            ctx.tasks().cancel(&TaskKey::new(FILTER_TASK));
        }
        Effect::LoadDetail { mount, id } => {
            tracing::debug!(mount, id, "loading detail");
            ctx.tasks().spawn(TaskKey::new(DETAIL_TASK), async move {
                let result = with_deadline(
                    services.timeout,
                    format!("detail {id}"),
                    load_detail(services.api.as_ref(), &services.language, id),
                )
                .await;
                match result {
                    Ok(record) => Action::DetailDidLoad { mount, record },
                    Err(error) => {
                        tracing::warn!(id, %error, "detail load failed");
                        Action::DetailDidError { mount, id, error }
                    }
                }
            });
        }
        Effect::LoadSprite { mount, id, url } => {
            ctx.tasks().spawn(TaskKey::new(SPRITE_TASK), async move {
                let result = with_deadline(
                    services.timeout,
                    format!("sprite {id}"),
                    load_sprite(services.api.as_ref(), &url),
                )
                .await;
                match result {
                    Ok(sprite) => Action::SpriteDidLoad { mount, id, sprite },
                    Err(error) => {
                        tracing::warn!(id, %error, "sprite load failed");
                        Action::SpriteDidError { mount, id, error }
                    }
                }
            });
        }
        Effect::CancelList => {
            ctx.tasks().cancel(&TaskKey::new(PAGE_TASK));
            ctx.tasks().cancel(&TaskKey::new(FILTER_TASK));
        }
        Effect::CancelDetail => {
            ctx.tasks().cancel(&TaskKey::new(DETAIL_TASK));
            ctx.tasks().cancel(&TaskKey::new(SPRITE_TASK));
        }
    }
}

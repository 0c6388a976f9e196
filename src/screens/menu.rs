use crate::core::input::{InputEvent, VirtualAction};
use crate::core::space::Viewport;
use crate::screens::ScreenAction;
use crate::screens::components::ash_field;
use crate::screens::components::menu_visuals::{INTRO, OUTRO, Prop, Visuals};
use crate::screens::credits;
use crate::ui::actors::{Actor, TextAlign};
use crate::ui::color;
use crate::ui::font::Font;
use crate::ui::storyboard::Storyboard;
use log::{debug, info};

/* ------------------------------ layout ------------------------------- */
const GAME_TITLE: &str = "The Return of Damareen";
const TITLE_ZOOM: f32 = 2.4;
const TITLE_Y_OFF: f32 = -40.0;

const ITEMS_Y_OFF: f32 = 70.0;
const ITEM_SPACING: f32 = 46.0;
const ITEM_ZOOM: f32 = 1.4;
const ITEM_ZOOM_FOCUSED: f32 = 1.7;

const NOTICE_TEXT: &str = "Játék elindítása...";
const NOTICE_HINT: &str = "Enter / Esc";
const NOTICE_SIZE: [f32; 2] = [520.0, 130.0];

const ASH_Z: i16 = 0;
const TITLE_Z: i16 = 10;
const ITEMS_Z: i16 = 20;
const COVER_Z: i16 = 100;
const NOTICE_Z: i16 = 150;
const OUT_COVER_Z: i16 = 200;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum MenuItem {
    Play,
    Credits,
    Exit,
}

const ITEMS: [MenuItem; 3] = [MenuItem::Play, MenuItem::Credits, MenuItem::Exit];

#[inline(always)]
const fn item_label(item: MenuItem) -> &'static str {
    match item {
        MenuItem::Play => "Játék",
        MenuItem::Credits => "Stáblista",
        MenuItem::Exit => "Kilépés",
    }
}

enum Phase {
    /// Entrance animation. Also replayed after the credits, with input still off.
    Intro(Storyboard<Prop>),
    Idle,
    /// Modal stand-in for starting a game.
    Notice,
    Credits(credits::State),
    Outro(Storyboard<Prop>),
}

pub struct State {
    phase: Phase,
    selected_index: usize,
    visuals: Visuals,
    ash: ash_field::State,
    /// Used when the window reports a degenerate size.
    fallback: Viewport,
}

pub fn init(ash_seed: u64, fallback: Viewport, now: f64) -> State {
    let mut ash = ash_field::State::new(ash_seed);
    ash.start(now);
    info!("Menu intro.");
    State {
        phase: Phase::Intro(Storyboard::new(&INTRO)),
        selected_index: 0,
        visuals: Visuals::IDLE,
        ash,
        fallback,
    }
}

/// Drops everything the credits showed and brings the menu back through its intro.
fn teardown(state: &mut State, now: f64) {
    state.visuals.reset();
    state.ash.reset();
    if !state.ash.is_running() {
        state.ash.start(now);
    }
    info!("Menu intro (after credits).");
    state.phase = Phase::Intro(Storyboard::new(&INTRO));
}

fn begin_exit(state: &mut State) {
    info!("Menu outro; exiting.");
    debug!("Ash stopped with {} live specks.", state.ash.active_count());
    state.ash.stop();
    state.phase = Phase::Outro(Storyboard::new(&OUTRO));
}

fn activate(state: &mut State) {
    match ITEMS[state.selected_index] {
        MenuItem::Play => {
            info!("Play selected.");
            state.phase = Phase::Notice;
        }
        MenuItem::Credits => {
            state.phase = Phase::Credits(credits::init());
        }
        MenuItem::Exit => begin_exit(state),
    }
}

pub fn update(state: &mut State, now: f64, dt: f64, viewport: Viewport) -> ScreenAction {
    let viewport = viewport.or_fallback(state.fallback);
    state.ash.advance(now, viewport);

    match &mut state.phase {
        Phase::Intro(sb) => {
            if sb.step(&mut state.visuals, dt) {
                debug!("Menu intro done; input enabled.");
                state.phase = Phase::Idle;
            }
        }
        Phase::Credits(run) => {
            if credits::update(run, &mut state.visuals, dt, viewport) == credits::Status::Finished
            {
                debug!(
                    "Credits over (skipped: {}, scrolled: {}).",
                    run.skip_requested(),
                    run.reached_scroll()
                );
                teardown(state, now);
            }
        }
        Phase::Outro(sb) => {
            if sb.step(&mut state.visuals, dt) {
                return ScreenAction::Exit;
            }
        }
        Phase::Idle | Phase::Notice => {}
    }
    ScreenAction::None
}

pub fn handle_input(state: &mut State, ev: &InputEvent) -> ScreenAction {
    match &mut state.phase {
        Phase::Credits(run) => {
            credits::handle_input(run, ev);
            return ScreenAction::None;
        }
        Phase::Intro(_) | Phase::Outro(_) => return ScreenAction::None,
        Phase::Notice => {
            if ev.pressed && matches!(ev.action, VirtualAction::Start | VirtualAction::Back) {
                state.phase = Phase::Idle;
            }
            return ScreenAction::None;
        }
        Phase::Idle => {}
    }
    if !ev.pressed {
        return ScreenAction::None;
    }

    match ev.action {
        VirtualAction::Up => {
            state.selected_index = (state.selected_index + ITEMS.len() - 1) % ITEMS.len();
            debug!("Menu cursor -> {}", item_label(ITEMS[state.selected_index]));
        }
        VirtualAction::Down => {
            state.selected_index = (state.selected_index + 1) % ITEMS.len();
            debug!("Menu cursor -> {}", item_label(ITEMS[state.selected_index]));
        }
        VirtualAction::Start => activate(state),
        VirtualAction::Back => begin_exit(state),
        VirtualAction::FastForward => {}
    }
    ScreenAction::None
}

fn full_quad(viewport: Viewport, rgba: [f32; 4], alpha: f32, z: i16) -> Actor {
    Actor::quad(
        [0.0, 0.0],
        [viewport.width as f32, viewport.height as f32],
        color::with_alpha(rgba, alpha),
        z,
    )
}

fn title_actor(v: &Visuals, cx: f32, cy: f32) -> Option<Actor> {
    let fraction = v.title_visible_fraction();
    if fraction <= 0.0 {
        return None;
    }
    let zoom = TITLE_ZOOM * v.title_scale;
    let [w, h] = Font::Regular.measure(GAME_TITLE, zoom);
    let y = cy + TITLE_Y_OFF + v.title_y;
    let clip = [cx - w * 0.5, y - h, w * fraction, h * 2.0];
    Some(
        Actor::text(GAME_TITLE, [cx, y], Font::Regular, zoom, color::TITLE_RGBA, TITLE_Z)
            .aligned(TextAlign::Center, 0.5)
            .clipped(clip),
    )
}

fn item_actors(state: &State, cx: f32, cy: f32) -> Vec<Actor> {
    ITEMS
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let focused = i == state.selected_index;
            let (zoom, rgba) = if focused {
                (ITEM_ZOOM_FOCUSED, color::MENU_SELECTED_RGBA)
            } else {
                (ITEM_ZOOM, color::MENU_ITEM_RGBA)
            };
            let y = cy + ITEMS_Y_OFF + ITEM_SPACING * i as f32;
            Actor::text(item_label(*item), [cx, y], Font::Regular, zoom, rgba, 0)
                .aligned(TextAlign::Center, 0.5)
        })
        .collect()
}

fn notice_actor(cx: f32, cy: f32) -> Actor {
    let [w, h] = NOTICE_SIZE;
    Actor::frame(
        [cx - w * 0.5, cy - h * 0.5],
        1.0,
        vec![
            Actor::quad([0.0, 0.0], NOTICE_SIZE, color::NOTICE_PANEL_RGBA, 0),
            Actor::text(NOTICE_TEXT, [w * 0.5, 36.0], Font::Regular, 1.6, color::TITLE_RGBA, 1),
            Actor::text(NOTICE_HINT, [w - 14.0, h - 10.0], Font::Small, 1.0, color::MENU_ITEM_RGBA, 1)
                .aligned(TextAlign::Right, 1.0),
        ],
        NOTICE_Z,
    )
}

pub fn get_actors(state: &State, viewport: Viewport) -> Vec<Actor> {
    let viewport = viewport.or_fallback(state.fallback);
    let v = &state.visuals;
    let cx = viewport.center_x() as f32;
    let cy = viewport.center_y() as f32;
    let mut actors = Vec::with_capacity(ash_field::MAX_COUNT + 16);

    actors.push(Actor::frame(
        [0.0, 0.0],
        1.0,
        state.ash.build(viewport, v.ash_mask()),
        ASH_Z,
    ));
    actors.extend(title_actor(v, cx, cy));
    actors.push(Actor::frame(
        [v.menu_x, 0.0],
        v.menu_opacity,
        item_actors(state, cx, cy),
        ITEMS_Z,
    ));

    if v.cover > 0.0 {
        actors.push(full_quad(viewport, color::COVER_RGBA, v.cover, COVER_Z));
    }
    match &state.phase {
        Phase::Notice => actors.push(notice_actor(cx, cy)),
        Phase::Credits(run) => actors.extend(credits::get_actors(run, viewport)),
        Phase::Intro(_) | Phase::Idle | Phase::Outro(_) => {}
    }
    if v.out_cover > 0.0 {
        actors.push(full_quad(viewport, color::COVER_RGBA, v.out_cover, OUT_COVER_Z));
    }
    actors
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEW: Viewport = Viewport::new(1280.0, 720.0);
    const FRAME: f64 = 1.0 / 60.0;

    struct Clock {
        now: f64,
    }

    impl Clock {
        fn frame(&mut self, state: &mut State) -> ScreenAction {
            self.now += FRAME;
            update(state, self.now, FRAME, VIEW)
        }

        fn frames(&mut self, state: &mut State, n: usize) {
            for _ in 0..n {
                self.frame(state);
            }
        }
    }

    fn press(state: &mut State, action: VirtualAction) -> ScreenAction {
        let a = handle_input(state, &InputEvent::new(action, true));
        handle_input(state, &InputEvent::new(action, false));
        a
    }

    fn idle_menu() -> (State, Clock) {
        let mut s = init(7, VIEW, 0.0);
        let mut clock = Clock { now: 0.0 };
        while !matches!(s.phase, Phase::Idle) {
            clock.frame(&mut s);
            assert!(clock.now < 10.0, "intro never finished");
        }
        (s, clock)
    }

    #[test]
    fn intro_ignores_input_then_opens_the_menu() {
        let mut s = init(1, VIEW, 0.0);
        let mut clock = Clock { now: 0.0 };
        clock.frames(&mut s, 30);
        press(&mut s, VirtualAction::Down);
        assert_eq!(s.selected_index, 0);
        let (s, _) = idle_menu();
        assert_eq!(s.visuals.cover, 0.0);
        assert_eq!(s.visuals.menu_opacity, 1.0);
    }

    #[test]
    fn cursor_wraps_both_ways() {
        let (mut s, _) = idle_menu();
        press(&mut s, VirtualAction::Up);
        assert_eq!(ITEMS[s.selected_index], MenuItem::Exit);
        press(&mut s, VirtualAction::Down);
        assert_eq!(ITEMS[s.selected_index], MenuItem::Play);
        press(&mut s, VirtualAction::Down);
        assert_eq!(ITEMS[s.selected_index], MenuItem::Credits);
    }

    #[test]
    fn play_shows_a_dismissable_notice() {
        let (mut s, _) = idle_menu();
        press(&mut s, VirtualAction::Start);
        assert!(matches!(s.phase, Phase::Notice));
        let actors = get_actors(&s, VIEW);
        assert!(
            actors
                .iter()
                .any(|a| matches!(a, Actor::Frame { z: NOTICE_Z, .. }))
        );
        press(&mut s, VirtualAction::Down);
        assert_eq!(s.selected_index, 0);
        press(&mut s, VirtualAction::Back);
        assert!(matches!(s.phase, Phase::Idle));
    }

    #[test]
    fn skipped_credits_tear_down_and_replay_the_intro() {
        let (mut s, mut clock) = idle_menu();
        clock.frames(&mut s, 120);
        assert!(s.ash.active_count() > 0);

        press(&mut s, VirtualAction::Down);
        press(&mut s, VirtualAction::Start);
        assert!(matches!(s.phase, Phase::Credits(_)));

        // Menu keys go to the sequencer now.
        press(&mut s, VirtualAction::Up);
        assert_eq!(s.selected_index, 1);

        clock.frames(&mut s, 60);
        assert!(s.visuals.out_cover > 0.4);
        press(&mut s, VirtualAction::Back);
        let mut guard = 0;
        while matches!(s.phase, Phase::Credits(_)) {
            clock.frame(&mut s);
            guard += 1;
            assert!(guard < 600);
        }

        assert!(matches!(s.phase, Phase::Intro(_)));
        assert_eq!(s.visuals.out_cover, 0.0);
        assert!(s.ash.active_count() <= 1);
        assert!(s.ash.is_running());

        press(&mut s, VirtualAction::Down);
        assert_eq!(s.selected_index, 1, "input stays off during the replayed intro");
        while !matches!(s.phase, Phase::Idle) {
            clock.frame(&mut s);
        }
        press(&mut s, VirtualAction::Down);
        assert_eq!(s.selected_index, 2);
    }

    #[test]
    fn exit_freezes_the_ash_and_requests_shutdown_after_the_outro() {
        let (mut s, mut clock) = idle_menu();
        clock.frames(&mut s, 60);
        press(&mut s, VirtualAction::Back);
        assert!(matches!(s.phase, Phase::Outro(_)));
        assert!(!s.ash.is_running());
        let frozen = s.ash.particles().to_vec();

        let mut action = ScreenAction::None;
        for _ in 0..600 {
            action = clock.frame(&mut s);
            if action == ScreenAction::Exit {
                break;
            }
        }
        assert_eq!(action, ScreenAction::Exit);
        assert_eq!(s.ash.particles(), frozen.as_slice());
        assert_eq!(s.visuals.out_cover, 1.0);
    }

    #[test]
    fn degenerate_viewport_uses_the_fallback() {
        let (mut s, mut clock) = idle_menu();
        clock.now += FRAME;
        update(&mut s, clock.now, FRAME, Viewport::new(0.0, 0.0));
        let actors = get_actors(&s, Viewport::new(0.0, -5.0));
        assert!(actors.iter().all(|a| match a {
            Actor::Quad { size, .. } => size[0] > 0.0 && size[1] > 0.0,
            _ => true,
        }));
    }
}

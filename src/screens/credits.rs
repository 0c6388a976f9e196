use crate::core::input::{InputEvent, VirtualAction};
use crate::core::space::Viewport;
use crate::screens::components::menu_visuals::Visuals;
use crate::ui::actors::Actor;
use crate::ui::color;
use crate::ui::font::Font;
use crate::ui::storyboard::{Ease, Tween};
use log::{debug, info};

/* ------------------------------ pacing ------------------------------ */
const COVER_FADE: f64 = 2.0;
const COVER_TOTAL: f64 = 2.5;

/// One poll of a wait. Each poll spends one unit of budget, three while fast-forwarding.
const POLL_INTERVAL: f64 = 0.05;
const UNITS_PER_POLL: u32 = 1;
const FAST_UNITS_PER_POLL: u32 = 3;

const CARD_FADE: f64 = 1.0;
const CARD_FADE_FAST: f64 = 1.0 / 3.0;
const CARD_SHOW_WAIT: f64 = 1.0;
const CARD_HOLD_WAIT: f64 = 1.5;
const CARD_HIDE_WAIT: f64 = 1.0;

const SCROLL_SPEED: f64 = 120.0;
const SCROLL_SPEED_FAST: f64 = 600.0;
const SCROLL_FALLBACK_HEIGHT: f64 = 3000.0;
const SCROLL_MIN_HEIGHT: f64 = 100.0;

/// Longest step the sequencer takes per update; a stalled host resumes at most two polls late.
const MAX_STEP: f64 = 0.1;

const CREDITS_Z: i16 = 210;

/* ------------------------------ script ------------------------------ */

#[derive(Clone, Copy, Debug)]
pub struct ShortCredit {
    pub title: &'static str,
    pub name: &'static str,
}

const fn short(title: &'static str, name: &'static str) -> ShortCredit {
    ShortCredit { title, name }
}

pub const SHORT_CREDITS: [ShortCredit; 5] = [
    short("Rendező", "Bálint Vince"),
    short("Vezető Programozó", "Rezák Kevin"),
    short("Hangmérnök", "Bálint Vince"),
    short("Művészeti Vezető", "Rezák Kevin"),
    short("Producer", "Bálint Vince"),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CreditLineKind {
    Name,
    Role,
    /// Blank line between the two people.
    Gap,
    /// Blank run-out after the last role.
    Tail,
}

#[derive(Clone, Copy, Debug)]
struct CreditLine {
    kind: CreditLineKind,
    text: &'static str,
}

const fn name(text: &'static str) -> CreditLine {
    CreditLine {
        kind: CreditLineKind::Name,
        text,
    }
}

const fn role(text: &'static str) -> CreditLine {
    CreditLine {
        kind: CreditLineKind::Role,
        text,
    }
}

const fn blank(kind: CreditLineKind) -> CreditLine {
    CreditLine { kind, text: " " }
}

const LONG_CREDITS: &[CreditLine] = &[
    name("Bálint Vince"),
    role("Támadó Biztonsági Főigazgató (COSO)"),
    role("Vezető Etikus Hacker és Behatolásvizsgáló"),
    role("Visual Studio Enterprise Munkafolyamat-Architekt"),
    role("Full-Stack Hibakeresési Maestro"),
    role("Neurális Hálózati Sebezhetőség-Kutató"),
    role("Haladó Titkosítási Szabvány Szakértő"),
    role("Kiberfenyegetettségi Elemző és Stratéga"),
    role("Kritikus Infrastruktúra-védelmi Főtanácsadó"),
    role("Kvantum-rezisztens Algoritmus-tervező"),
    role("Digitális Kártevő-izolációs Specialista"),
    role("Vezeték Nélküli Adatátviteli Biztonsági Felügyelő"),
    role("Kormányzati Szintű Rendszer-auditőr"),
    blank(CreditLineKind::Gap),
    name("Rezák Kevin"),
    role("Digitális Törvényszéki Főarchitekt (CDFA)"),
    role("Senior Szoftver-törvényszéki Szakértő"),
    role("Adatstruktúra Optimalizálási Guru"),
    role("Futásidejű Biztonsági és Rendszermag-Auditor"),
    role("Kódminőségi Főfelügyelő (CQO)"),
    role("Alacsony Szintű Memória-integritás Analitikus"),
    role("Osztott Rendszerek Védelmi Stratégája"),
    role("Katasztrófaelhárítási Adatvisszaállítási Mérnök"),
    role("Bináris Kód-visszafejtési Főszakértő"),
    role("Vállalati Adatvagyon-védelmi Főbiztos"),
    role("Blokklánc-alapú Integritás-ellenőr"),
    role("Rendszerlogikai Ellentmondás-feloldó Specialist"),
    blank(CreditLineKind::Tail),
];

const CARD_TITLE_PX: f32 = 24.0;
const CARD_NAME_PX: f32 = 40.0;
const CARD_TITLE_GAP: f32 = 10.0;

#[inline(always)]
const fn line_px(kind: CreditLineKind) -> f32 {
    match kind {
        CreditLineKind::Role => 24.0,
        CreditLineKind::Name | CreditLineKind::Gap | CreditLineKind::Tail => 40.0,
    }
}

/// `(top, bottom)` margins around a line.
#[inline(always)]
const fn line_margins(kind: CreditLineKind) -> (f32, f32) {
    match kind {
        CreditLineKind::Name => (0.0, 20.0),
        CreditLineKind::Role => (0.0, 5.0),
        CreditLineKind::Gap => (50.0, 50.0),
        CreditLineKind::Tail => (200.0, 0.0),
    }
}

#[inline(always)]
const fn line_color(kind: CreditLineKind) -> [f32; 4] {
    match kind {
        CreditLineKind::Name => color::CREDIT_NAME_RGBA,
        CreditLineKind::Role => color::CREDIT_ROLE_RGBA,
        CreditLineKind::Gap | CreditLineKind::Tail => [0.0; 4],
    }
}

/// Bitmap zoom that renders `px` tall text with the regular face.
#[inline(always)]
fn zoom_for(px: f32) -> f32 {
    px / Font::Regular.line_height()
}

/// Top edge of every long-credits line relative to the panel top, plus the panel height.
fn layout_long() -> (Vec<f32>, f64) {
    let mut tops = Vec::with_capacity(LONG_CREDITS.len());
    let mut y = 0.0f32;
    for line in LONG_CREDITS {
        let (top, bottom) = line_margins(line.kind);
        y += top;
        tops.push(y);
        y += Font::Regular.measure(line.text, zoom_for(line_px(line.kind)))[1] + bottom;
    }
    (tops, f64::from(y))
}

/// Measured heights below the minimum are treated as a failed layout.
#[inline(always)]
fn scroll_height(measured: f64) -> f64 {
    if measured < SCROLL_MIN_HEIGHT {
        SCROLL_FALLBACK_HEIGHT
    } else {
        measured
    }
}

/* ------------------------------ waits ------------------------------ */

/// A budgeted wait checked once per poll. The run's skip flag is honored
/// when the wait begins and after every poll.
#[derive(Clone, Copy, Debug)]
struct PollWait {
    budget: u32,
    spent: u32,
    clock: f64,
    started: bool,
}

impl PollWait {
    fn new(seconds: f64) -> Self {
        Self {
            budget: (seconds / POLL_INTERVAL).round() as u32,
            spent: 0,
            clock: 0.0,
            started: false,
        }
    }

    /// Runs every poll due within `dt`. Returns `true` when the wait is over.
    fn step(&mut self, dt: f64, fast: bool, skip: bool) -> bool {
        if !self.started {
            self.started = true;
            if skip || self.spent >= self.budget {
                return true;
            }
        }
        self.clock += dt;
        while self.clock >= POLL_INTERVAL {
            self.clock -= POLL_INTERVAL;
            self.spent += if fast {
                FAST_UNITS_PER_POLL
            } else {
                UNITS_PER_POLL
            };
            if skip || self.spent >= self.budget {
                return true;
            }
        }
        false
    }
}

/* ------------------------------ state ------------------------------ */

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    Running,
    Finished,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CardStep {
    /// Fading in while the first wait runs.
    Show,
    Hold,
    /// Fading out while the last wait runs.
    Hide,
}

#[derive(Clone, Debug)]
enum Stage {
    Cover {
        fade: Tween,
        elapsed: f64,
    },
    Card {
        index: usize,
        step: CardStep,
        fade: Tween,
        wait: PollWait,
    },
    Scroll {
        y: f64,
    },
    Finished,
}

pub struct State {
    stage: Stage,
    /// Sticky for the rest of the run once set.
    skip: bool,
    /// Mirrors the fast-forward key.
    fast: bool,
    line_tops: Vec<f32>,
    height: f64,
    reached_scroll: bool,
}

pub fn init() -> State {
    let (line_tops, measured) = layout_long();
    info!("Credits started.");
    State {
        stage: Stage::Cover {
            fade: Tween::new(0.0, 1.0, COVER_FADE, Ease::Linear),
            elapsed: 0.0,
        },
        skip: false,
        fast: false,
        line_tops,
        height: scroll_height(measured),
        reached_scroll: false,
    }
}

impl State {
    #[inline(always)]
    pub const fn skip_requested(&self) -> bool {
        self.skip
    }

    #[inline(always)]
    pub const fn reached_scroll(&self) -> bool {
        self.reached_scroll
    }
}

#[inline(always)]
const fn fade_duration(fast: bool) -> f64 {
    if fast { CARD_FADE_FAST } else { CARD_FADE }
}

fn card_stage(index: usize, fast: bool) -> Stage {
    debug!("Credits card {index} in.");
    Stage::Card {
        index,
        step: CardStep::Show,
        fade: Tween::new(0.0, 1.0, fade_duration(fast), Ease::Linear),
        wait: PollWait::new(CARD_SHOW_WAIT),
    }
}

/// The stage that starts card `index`, or the scroll once every card has run,
/// or the end when skip is set.
fn next_stage(state: &mut State, index: usize, viewport: Viewport) -> Stage {
    if state.skip {
        return Stage::Finished;
    }
    if index < SHORT_CREDITS.len() {
        return card_stage(index, state.fast);
    }
    debug!("Credits scroll in ({:.0} px).", state.height);
    state.reached_scroll = true;
    Stage::Scroll { y: viewport.height }
}

enum Advance {
    Stay,
    Card(usize),
    Finish,
}

pub fn update(state: &mut State, visuals: &mut Visuals, dt: f64, viewport: Viewport) -> Status {
    let dt = dt.clamp(0.0, MAX_STEP);
    let (skip, fast) = (state.skip, state.fast);

    let advance = match &mut state.stage {
        Stage::Cover { fade, elapsed } => {
            fade.step(dt);
            *elapsed += dt;
            visuals.out_cover = fade.value();
            if *elapsed >= COVER_TOTAL {
                Advance::Card(0)
            } else {
                Advance::Stay
            }
        }
        Stage::Card {
            index,
            step,
            fade,
            wait,
        } => {
            fade.step(dt);
            if !wait.step(dt, fast, skip) {
                Advance::Stay
            } else {
                match *step {
                    CardStep::Show | CardStep::Hold if skip => Advance::Card(*index + 1),
                    CardStep::Show => {
                        *step = CardStep::Hold;
                        *wait = PollWait::new(CARD_HOLD_WAIT);
                        Advance::Stay
                    }
                    CardStep::Hold => {
                        *step = CardStep::Hide;
                        *fade = Tween::new(fade.value(), 0.0, fade_duration(fast), Ease::Linear);
                        *wait = PollWait::new(CARD_HIDE_WAIT);
                        Advance::Stay
                    }
                    CardStep::Hide => Advance::Card(*index + 1),
                }
            }
        }
        Stage::Scroll { y } => {
            if skip {
                Advance::Finish
            } else {
                let speed = if fast { SCROLL_SPEED_FAST } else { SCROLL_SPEED };
                *y -= speed * dt;
                if *y <= -state.height {
                    Advance::Finish
                } else {
                    Advance::Stay
                }
            }
        }
        Stage::Finished => return Status::Finished,
    };

    match advance {
        Advance::Stay => {}
        Advance::Card(index) => state.stage = next_stage(state, index, viewport),
        Advance::Finish => state.stage = Stage::Finished,
    }

    if matches!(state.stage, Stage::Finished) {
        if skip {
            info!("Credits skipped.");
        } else {
            info!("Credits finished.");
        }
        Status::Finished
    } else {
        Status::Running
    }
}

pub fn handle_input(state: &mut State, ev: &InputEvent) {
    match ev.action {
        VirtualAction::Back if ev.pressed && !state.skip => {
            debug!("Credits skip requested.");
            state.skip = true;
        }
        VirtualAction::FastForward => state.fast = ev.pressed,
        _ => {}
    }
}

pub fn get_actors(state: &State, viewport: Viewport) -> Vec<Actor> {
    let cx = viewport.center_x() as f32;
    match &state.stage {
        Stage::Card {
            step: CardStep::Hide,
            fade,
            ..
        } if fade.finished() => Vec::new(),
        Stage::Card { index, fade, .. } => {
            let card = SHORT_CREDITS[*index];
            let panel_h = CARD_TITLE_PX + CARD_TITLE_GAP + CARD_NAME_PX;
            let top = viewport.center_y() as f32 - panel_h * 0.5;
            vec![Actor::frame(
                [cx, top],
                fade.value(),
                vec![
                    Actor::text(
                        card.title,
                        [0.0, 0.0],
                        Font::Regular,
                        zoom_for(CARD_TITLE_PX),
                        color::CREDIT_ROLE_RGBA,
                        0,
                    ),
                    Actor::text(
                        card.name,
                        [0.0, CARD_TITLE_PX + CARD_TITLE_GAP],
                        Font::Regular,
                        zoom_for(CARD_NAME_PX),
                        color::CREDIT_NAME_RGBA,
                        0,
                    ),
                ],
                CREDITS_Z,
            )]
        }
        Stage::Scroll { y } => {
            let y = *y as f32;
            let screen_h = viewport.height as f32;
            let mut children = Vec::with_capacity(LONG_CREDITS.len());
            for (line, top) in LONG_CREDITS.iter().zip(&state.line_tops) {
                let px = line_px(line.kind);
                let screen_y = y + top;
                if screen_y < -px || screen_y > screen_h || line.text.trim().is_empty() {
                    continue;
                }
                children.push(Actor::text(
                    line.text,
                    [0.0, *top],
                    Font::Regular,
                    zoom_for(px),
                    line_color(line.kind),
                    0,
                ));
            }
            vec![Actor::frame([cx, y], 1.0, children, CREDITS_Z)]
        }
        Stage::Cover { .. } | Stage::Finished => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEW: Viewport = Viewport::new(1280.0, 720.0);
    const FRAME: f64 = 1.0 / 60.0;

    fn card(s: &State) -> Option<(usize, CardStep)> {
        match s.stage {
            Stage::Card { index, step, .. } => Some((index, step)),
            _ => None,
        }
    }

    fn panel_visible(s: &State) -> bool {
        matches!(s.stage, Stage::Card { .. } | Stage::Scroll { .. })
    }

    fn press(state: &mut State, action: VirtualAction, pressed: bool) {
        handle_input(state, &InputEvent::new(action, pressed));
    }

    /// Runs to completion, calling `each` before every update. Returns the simulated time.
    fn run(state: &mut State, dt: f64, mut each: impl FnMut(&mut State, f64)) -> f64 {
        let mut visuals = Visuals::IDLE;
        let mut t = 0.0;
        for _ in 0..1_000_000 {
            each(state, t);
            t += dt;
            if update(state, &mut visuals, dt, VIEW) == Status::Finished {
                return t;
            }
        }
        panic!("credits never finished");
    }

    #[test]
    fn long_layout_has_a_real_height() {
        let s = init();
        // Two names, 24 roles, the gap and the tail.
        let expected = 2.0 * 60.0 + 24.0 * 29.0 + 140.0 + 240.0;
        assert!((s.height - expected).abs() < 1e-3);
        assert_eq!(scroll_height(40.0), 3000.0);
    }

    #[test]
    fn poll_wait_spends_three_units_while_fast() {
        let mut w = PollWait::new(1.0);
        let mut polls = 0;
        while !w.step(POLL_INTERVAL, true, false) {
            polls += 1;
        }
        // 20 units at 3 per poll: the 7th poll finishes it.
        assert_eq!(polls + 1, 7);

        let mut w = PollWait::new(1.0);
        assert!(w.step(0.0, false, true), "skip is honored on entry");
    }

    #[test]
    fn cover_fades_over_two_seconds_then_settles() {
        let mut s = init();
        let mut v = Visuals::IDLE;
        for _ in 0..60 {
            update(&mut s, &mut v, FRAME, VIEW);
        }
        assert!((v.out_cover - 0.5).abs() < 0.02);
        for _ in 0..70 {
            update(&mut s, &mut v, FRAME, VIEW);
        }
        assert_eq!(v.out_cover, 1.0);
        assert!(card(&s).is_none());
        for _ in 0..25 {
            update(&mut s, &mut v, FRAME, VIEW);
        }
        assert_eq!(card(&s), Some((0, CardStep::Show)));
    }

    #[test]
    fn full_run_matches_the_script() {
        let mut s = init();
        let height = s.height;
        let t = run(&mut s, FRAME, |_, _| {});
        let nominal = COVER_TOTAL + 5.0 * 3.5 + (VIEW.height + height) / SCROLL_SPEED;
        assert!(s.reached_scroll());
        assert!(t >= nominal - 0.05, "{t} < {nominal}");
        assert!(t <= nominal + 0.5, "{t} > {nominal}");
    }

    #[test]
    fn fast_forward_shortens_the_run() {
        let mut normal = init();
        let slow = run(&mut normal, FRAME, |_, _| {});
        let mut hurried = init();
        let quick = run(&mut hurried, FRAME, |s, t| {
            if t == 0.0 {
                press(s, VirtualAction::FastForward, true);
            }
        });
        assert!(hurried.reached_scroll());
        assert!(quick < slow * 0.5, "{quick} vs {slow}");
    }

    #[test]
    fn releasing_fast_forward_restores_normal_pace() {
        let mut s = init();
        press(&mut s, VirtualAction::FastForward, true);
        press(&mut s, VirtualAction::FastForward, false);
        let t = run(&mut s, FRAME, |_, _| {});
        let mut plain = init();
        let reference = run(&mut plain, FRAME, |_, _| {});
        assert!((t - reference).abs() < 1e-9);
    }

    #[test]
    fn skip_during_a_card_never_reaches_the_scroll() {
        let mut s = init();
        let mut pressed = false;
        let t = run(&mut s, FRAME, |s, _| {
            if !pressed && card(&s).is_some_and(|(i, _)| i == 2) {
                press(s, VirtualAction::Back, true);
                pressed = true;
            }
        });
        assert!(pressed);
        assert!(s.skip_requested());
        assert!(!s.reached_scroll());
        assert!(t < COVER_TOTAL + 3.0 * 3.5);
    }

    #[test]
    fn skip_during_the_cover_shows_no_card() {
        let mut s = init();
        press(&mut s, VirtualAction::Back, true);
        let mut saw_card = false;
        let t = run(&mut s, FRAME, |s, _| saw_card |= card(&s).is_some());
        assert!(!saw_card);
        assert!(t >= COVER_TOTAL - 1e-9);
        assert!(t < COVER_TOTAL + 0.1);
    }

    #[test]
    fn skip_right_after_fade_in_removes_panel_within_one_poll() {
        let mut s = init();
        let mut v = Visuals::IDLE;
        while card(&s).is_none() {
            update(&mut s, &mut v, 0.01, VIEW);
        }
        update(&mut s, &mut v, 0.01, VIEW);
        assert_eq!(card(&s), Some((0, CardStep::Show)));

        press(&mut s, VirtualAction::Back, true);
        let mut waited = 0.0;
        while panel_visible(&s) {
            assert_ne!(card(&s).map(|c| c.1), Some(CardStep::Hold));
            update(&mut s, &mut v, 0.01, VIEW);
            waited += 0.01;
        }
        assert!(waited <= POLL_INTERVAL + 0.011, "{waited}");
        assert_eq!(update(&mut s, &mut v, 0.01, VIEW), Status::Finished);
    }

    #[test]
    fn faded_out_card_draws_nothing_while_the_last_wait_runs() {
        let mut s = init();
        let mut v = Visuals::IDLE;
        press(&mut s, VirtualAction::FastForward, true);
        while card(&s) != Some((0, CardStep::Hide)) {
            update(&mut s, &mut v, 0.01, VIEW);
        }
        assert!(!get_actors(&s, VIEW).is_empty());

        press(&mut s, VirtualAction::FastForward, false);
        for _ in 0..50 {
            update(&mut s, &mut v, 0.01, VIEW);
        }
        assert_eq!(card(&s), Some((0, CardStep::Hide)));
        assert!(get_actors(&s, VIEW).is_empty());
    }

    #[test]
    fn skip_during_scroll_ends_at_once() {
        let mut s = init();
        let mut v = Visuals::IDLE;
        while !s.reached_scroll() {
            update(&mut s, &mut v, MAX_STEP, VIEW);
        }
        assert!(!get_actors(&s, VIEW).is_empty());
        press(&mut s, VirtualAction::Back, true);
        assert_eq!(update(&mut s, &mut v, FRAME, VIEW), Status::Finished);
        assert!(get_actors(&s, VIEW).is_empty());
    }

    #[test]
    fn stalled_host_moves_the_scroll_one_clamped_step() {
        let mut s = init();
        let mut v = Visuals::IDLE;
        while !s.reached_scroll() {
            update(&mut s, &mut v, MAX_STEP, VIEW);
        }
        let Stage::Scroll { y: before } = s.stage else {
            panic!("not scrolling");
        };
        update(&mut s, &mut v, 30.0, VIEW);
        let Stage::Scroll { y: after } = s.stage else {
            panic!("not scrolling");
        };
        assert!((before - after - SCROLL_SPEED * MAX_STEP).abs() < 1e-9);
    }

    #[test]
    fn card_panel_fades_with_its_tween() {
        let mut s = init();
        let mut v = Visuals::IDLE;
        while card(&s).is_none() {
            update(&mut s, &mut v, FRAME, VIEW);
        }
        for _ in 0..30 {
            update(&mut s, &mut v, FRAME, VIEW);
        }
        let actors = get_actors(&s, VIEW);
        assert_eq!(actors.len(), 1);
        match &actors[0] {
            Actor::Frame { alpha, children, .. } => {
                assert!(*alpha > 0.4 && *alpha < 0.6, "{alpha}");
                assert_eq!(children.len(), 2);
            }
            other => panic!("unexpected actor {other:?}"),
        }
    }
}

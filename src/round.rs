//! Round state machine: arming, reveal, click resolution and statistics.
//!
//! All time is injected through `now` arguments, and every event handler
//! takes `&mut self`, so the machine has exactly one writer: whoever owns it.

use rand::rngs::StdRng;
use rand::Rng;
use std::time::{Duration, Instant};

use crate::config::{Config, Timing};
use crate::placement::{min_pairwise_distance, place_all, Geometry, Position};
use crate::stats::{format_ms, ReactionStats};
use crate::surface::PlayArea;
use crate::timer::OneShot;

pub const WRONG_TARGET_MESSAGE: &str = "Wrong box! You clicked a decoy. Try again.";
pub const SUCCESS_MESSAGE: &str = "Nice! Press Try again to continue.";
pub const WAITING_MESSAGE: &str = "Wait for it...";

/// Difficulty level; level `n` shows `n + 1` boxes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Difficulty(u8);

impl Difficulty {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 4;

    pub fn new(level: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&level).then_some(Self(level))
    }

    pub fn level(&self) -> u8 {
        self.0
    }

    pub fn box_count(&self) -> usize {
        self.0 as usize + 1
    }

    pub fn all() -> impl Iterator<Item = Difficulty> {
        (Self::MIN..=Self::MAX).map(Difficulty)
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Self(Self::MIN)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Phase {
    Idle,
    /// Countdown running, nothing on screen yet
    Armed,
    /// Boxes visible and the reaction clock is running
    Revealed,
}

/// One box of a revealed round. Immutable once generated.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetBox {
    pub id: String,
    pub top: f64,
    pub left: f64,
    pub is_correct: bool,
}

impl TargetBox {
    pub fn position(&self) -> Position {
        Position::new(self.top, self.left)
    }
}

/// Transient user-facing conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Notice {
    WrongTarget,
}

impl Notice {
    pub fn message(&self) -> &'static str {
        match self {
            Notice::WrongTarget => WRONG_TARGET_MESSAGE,
        }
    }
}

/// How a click resolved the round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// No boxes showing, or the id does not belong to the current round
    Ignored,
    Hit { reaction_ms: u64 },
    Miss,
}

/// What a tick changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickOutcome {
    pub revealed: bool,
    /// The play area could not be measured and the reveal was pushed back
    pub retried: bool,
    pub notice_cleared: bool,
}

impl TickOutcome {
    pub fn changed(&self) -> bool {
        self.revealed || self.notice_cleared
    }
}

/// Styling hook for a box. This is all the render surface learns about
/// which box is the right one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoxStyle {
    Target,
    Decoy,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoxView {
    pub id: String,
    pub top: f64,
    pub left: f64,
    pub style: BoxStyle,
}

/// Everything the presentation layer needs for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct RoundView {
    pub show_start: bool,
    pub show_boxes: bool,
    pub show_try_again: bool,
    pub show_success: bool,
    pub show_waiting: bool,
    pub boxes: Vec<BoxView>,
    pub difficulty: Difficulty,
    pub last: String,
    pub average: String,
    pub best: String,
    pub samples: usize,
    pub error: Option<&'static str>,
}

#[derive(Debug)]
pub struct RoundMachine {
    phase: Phase,
    boxes: Vec<TargetBox>,
    armed_at: Option<Instant>,
    revealed_at: Option<Instant>,
    difficulty: Difficulty,
    game_started: bool,
    stats: ReactionStats,
    notice: Option<Notice>,
    reveal_timer: OneShot,
    notice_timer: OneShot,
    geometry: Geometry,
    timing: Timing,
    rng: StdRng,
}

impl RoundMachine {
    pub fn new(config: &Config, rng: StdRng) -> Self {
        Self {
            phase: Phase::Idle,
            boxes: Vec::new(),
            armed_at: None,
            revealed_at: None,
            difficulty: config.difficulty(),
            game_started: false,
            stats: ReactionStats::new(),
            notice: None,
            reveal_timer: OneShot::new(),
            notice_timer: OneShot::new(),
            geometry: config.geometry,
            timing: config.timing,
            rng,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn boxes(&self) -> &[TargetBox] {
        &self.boxes
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn stats(&self) -> &ReactionStats {
        &self.stats
    }

    pub fn notice(&self) -> Option<Notice> {
        self.notice
    }

    pub fn game_started(&self) -> bool {
        self.game_started
    }

    pub fn armed_at(&self) -> Option<Instant> {
        self.armed_at
    }

    pub fn revealed_at(&self) -> Option<Instant> {
        self.revealed_at
    }

    pub fn reveal_pending(&self) -> bool {
        self.reveal_timer.is_pending()
    }

    /// Arm a new round from any state. A reveal still pending from an
    /// earlier start is cancelled before the new one is scheduled.
    pub fn start(&mut self, now: Instant) {
        if self.reveal_timer.cancel() {
            log::debug!("cancelled pending reveal before re-arming");
        }
        self.clear_notice();

        self.game_started = true;
        self.phase = Phase::Armed;
        self.boxes.clear();
        self.revealed_at = None;
        self.armed_at = Some(now);
        self.stats.clear_last();

        let delay = self.draw_delay();
        self.reveal_timer.schedule_in(now, delay);
        log::info!(
            "armed round at difficulty {}, reveal in {} ms",
            self.difficulty.level(),
            delay.as_millis()
        );
    }

    pub fn try_again(&mut self, now: Instant) {
        self.start(now);
    }

    /// Fire whatever timers are due. `surface` is `None` while the play area
    /// cannot be measured, in which case the reveal is retried shortly after.
    pub fn tick(&mut self, now: Instant, surface: Option<PlayArea>) -> TickOutcome {
        let mut outcome = TickOutcome::default();

        if self.notice_timer.fire(now) {
            self.notice = None;
            outcome.notice_cleared = true;
        }

        if self.reveal_timer.fire(now) {
            match surface {
                Some(area) => {
                    self.reveal(now, area);
                    outcome.revealed = true;
                }
                None => {
                    log::warn!(
                        "play area not measurable yet, retrying reveal in {} ms",
                        self.timing.retry_ms
                    );
                    self.reveal_timer
                        .schedule_in(now, Duration::from_millis(self.timing.retry_ms));
                    outcome.retried = true;
                }
            }
        }

        outcome
    }

    fn reveal(&mut self, now: Instant, area: PlayArea) {
        let count = self.difficulty.box_count();
        let correct_index = self.rng.gen_range(0..count);
        let positions = place_all(&mut self.rng, count, area, &self.geometry);

        self.boxes = positions
            .into_iter()
            .enumerate()
            .map(|(i, p)| TargetBox {
                id: format!("box-{i}"),
                top: p.top,
                left: p.left,
                is_correct: i == correct_index,
            })
            .collect();
        self.phase = Phase::Revealed;
        self.revealed_at = Some(now);

        let positions: Vec<Position> = self.boxes.iter().map(TargetBox::position).collect();
        log::debug!(
            "revealed {} boxes in {:.0}x{:.0} px, correct index {}, min spacing {:?}",
            count,
            area.width,
            area.height,
            correct_index,
            min_pairwise_distance(&positions)
        );
    }

    pub fn click(&mut self, box_id: &str, now: Instant) -> ClickOutcome {
        if self.phase != Phase::Revealed {
            log::debug!("click on {box_id} ignored in phase {}", self.phase);
            return ClickOutcome::Ignored;
        }
        let Some(revealed_at) = self.revealed_at else {
            return ClickOutcome::Ignored;
        };
        let Some(clicked) = self.boxes.iter().find(|b| b.id == box_id) else {
            log::debug!("click on unknown box {box_id} ignored");
            return ClickOutcome::Ignored;
        };

        if !clicked.is_correct {
            log::info!("wrong target {box_id} clicked");
            self.end_round();
            self.notice = Some(Notice::WrongTarget);
            self.notice_timer
                .schedule_in(now, Duration::from_millis(self.timing.notice_ms));
            return ClickOutcome::Miss;
        }

        let reaction_ms = now.saturating_duration_since(revealed_at).as_millis() as u64;
        self.stats.record(reaction_ms);
        self.clear_notice();
        self.end_round();
        log::info!(
            "hit in {} ms (best {:?}, {} samples)",
            reaction_ms,
            self.stats.best_ms(),
            self.stats.len()
        );

        ClickOutcome::Hit { reaction_ms }
    }

    /// Select a new level. Statistics from another level are not comparable,
    /// so everything is reset.
    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        log::info!("difficulty set to {}", difficulty.level());
        self.difficulty = difficulty;
        self.reset_stats();
    }

    pub fn reset_stats(&mut self) {
        self.reveal_timer.cancel();
        self.clear_notice();
        self.stats.clear();
        self.end_round();
        self.armed_at = None;
        self.game_started = false;
        log::info!("statistics reset");
    }

    /// Cancel every outstanding timer; called when the host goes away.
    pub fn shutdown(&mut self) {
        let reveal = self.reveal_timer.cancel();
        let notice = self.notice_timer.cancel();
        if reveal || notice {
            log::debug!("cancelled pending timers on shutdown");
        }
    }

    fn end_round(&mut self) {
        self.phase = Phase::Idle;
        self.boxes.clear();
        self.revealed_at = None;
    }

    fn clear_notice(&mut self) {
        self.notice = None;
        self.notice_timer.cancel();
    }

    fn draw_delay(&mut self) -> Duration {
        let Timing {
            min_delay_ms,
            max_delay_ms,
            ..
        } = self.timing;
        let ms = if max_delay_ms > min_delay_ms {
            self.rng.gen_range(min_delay_ms..max_delay_ms)
        } else {
            min_delay_ms
        };
        Duration::from_millis(ms)
    }

    pub fn view(&self) -> RoundView {
        let show_boxes = self.phase == Phase::Revealed;
        let error = self.notice.map(|n| n.message());

        RoundView {
            show_start: !self.game_started && !show_boxes,
            show_boxes,
            show_try_again: self.game_started,
            show_success: self.game_started
                && self.phase == Phase::Idle
                && self.stats.last_ms().is_some()
                && error.is_none(),
            show_waiting: self.phase == Phase::Armed,
            boxes: self
                .boxes
                .iter()
                .map(|b| BoxView {
                    id: b.id.clone(),
                    top: b.top,
                    left: b.left,
                    style: if b.is_correct {
                        BoxStyle::Target
                    } else {
                        BoxStyle::Decoy
                    },
                })
                .collect(),
            difficulty: self.difficulty,
            last: format_ms(self.stats.last_ms()),
            average: format_ms(self.stats.average_ms()),
            best: format_ms(self.stats.best_ms()),
            samples: self.stats.len(),
            error,
        }
    }
}

use std::cmp::Ordering;

use crate::{difficulty::Difficulty, mods::GameMods};

use super::pos::Pos;

/// Height of the playfield in osu!pixels.
pub(crate) const PLAYFIELD_HEIGHT: f32 = 384.0;

/// All hitobject related data required for difficulty and performance
/// calculation.
///
/// Positions are unmodded. Mirroring through HR and the stack offset are
/// applied through the `stacked_*` methods for a given [`Difficulty`].
#[derive(Clone, Debug, PartialEq)]
pub struct HitObject {
    pub pos: Pos,
    pub start_time: f64,
    pub stack_height: i32,
    pub kind: HitObjectKind,
}

impl HitObject {
    /// Create a circle.
    pub const fn circle(pos: Pos, start_time: f64) -> Self {
        Self {
            pos,
            start_time,
            stack_height: 0,
            kind: HitObjectKind::Circle,
        }
    }

    /// Create a slider whose head is at `pos`.
    pub fn slider(pos: Pos, slider: Slider) -> Self {
        Self {
            pos,
            start_time: slider.start_time,
            stack_height: 0,
            kind: HitObjectKind::Slider(slider),
        }
    }

    /// Create a spinner.
    pub const fn spinner(pos: Pos, start_time: f64, end_time: f64) -> Self {
        Self {
            pos,
            start_time,
            stack_height: 0,
            kind: HitObjectKind::Spinner { end_time },
        }
    }

    /// Specify the stack height as determined by the chart loader.
    #[must_use]
    pub const fn with_stack_height(mut self, stack_height: i32) -> Self {
        self.stack_height = stack_height;

        self
    }

    /// Whether the hitobject is a slider.
    pub const fn is_slider(&self) -> bool {
        matches!(&self.kind, HitObjectKind::Slider(_))
    }

    /// Whether the hitobject is a spinner.
    pub const fn is_spinner(&self) -> bool {
        matches!(&self.kind, HitObjectKind::Spinner { .. })
    }

    /// The end time of the object.
    pub fn end_time(&self) -> f64 {
        match &self.kind {
            HitObjectKind::Circle => self.start_time,
            HitObjectKind::Slider(slider) => slider.end_time(),
            HitObjectKind::Spinner { end_time } => *end_time,
        }
    }

    /// Combo awarded by this object.
    pub fn max_combo(&self) -> u32 {
        match &self.kind {
            HitObjectKind::Slider(slider) => slider.nested_objects.len() as u32 + 1,
            HitObjectKind::Circle | HitObjectKind::Spinner { .. } => 1,
        }
    }

    /// The offset applied to all positions of a stacked object.
    pub fn stack_offset(&self, diff: &Difficulty) -> Pos {
        let offset = (self.stack_height as f32) * -(diff.circle_radius() as f32 / 10.0);

        Pos::new(offset, offset)
    }

    /// The head position after HR mirroring and stacking.
    pub fn stacked_pos(&self, diff: &Difficulty) -> Pos {
        let mut pos = self.pos;

        if diff.get_mods().hr() {
            pos.y = PLAYFIELD_HEIGHT - pos.y;
        }

        pos + self.stack_offset(diff)
    }

    /// Position at the given chart time after HR mirroring and stacking.
    ///
    /// Only sliders move, all other objects stay at their head position.
    pub fn stacked_pos_at(&self, time: f64, diff: &Difficulty) -> Pos {
        match &self.kind {
            HitObjectKind::Slider(slider) => {
                self.stacked_pos(diff) + mod_offset(slider.position_at(time), diff)
            }
            HitObjectKind::Circle | HitObjectKind::Spinner { .. } => self.stacked_pos(diff),
        }
    }

    /// Position at the end of the object after HR mirroring and stacking.
    pub fn stacked_end_pos(&self, diff: &Difficulty) -> Pos {
        self.stacked_pos_at(self.end_time(), diff)
    }

    /// Absolute position of a nested slider object after HR mirroring and
    /// stacking.
    pub(crate) fn stacked_nested_pos(&self, nested: &NestedSliderObject, diff: &Difficulty) -> Pos {
        self.stacked_pos(diff) + mod_offset(nested.pos, diff)
    }

    /// Time between the head and the last nested object of a slider.
    pub(crate) fn lazy_travel_time(&self) -> f64 {
        match &self.kind {
            HitObjectKind::Slider(slider) => slider
                .nested_objects
                // Here we really want the last nested object which is not
                // necessarily the tail
                .last()
                .map_or(0.0, |nested| nested.start_time - self.start_time),
            HitObjectKind::Circle | HitObjectKind::Spinner { .. } => 0.0,
        }
    }
}

impl PartialOrd for HitObject {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.start_time.partial_cmp(&other.start_time)
    }
}

fn mod_offset(mut offset: Pos, diff: &Difficulty) -> Pos {
    if diff.get_mods().hr() {
        offset.y = -offset.y;
    }

    offset
}

/// Additional data for a [`HitObject`].
#[derive(Clone, Debug, PartialEq)]
pub enum HitObjectKind {
    Circle,
    Slider(Slider),
    Spinner { end_time: f64 },
}

/// A slider.
#[derive(Clone, Debug, PartialEq)]
pub struct Slider {
    pub path: SliderPath,
    pub start_time: f64,
    pub span_duration: f64,
    pub repeat_count: usize,
    /// Ticks, repeats, and the tail, sorted by time. The head is excluded.
    pub nested_objects: Vec<NestedSliderObject>,
}

impl Slider {
    /// Legacy sliders end this many ms before their actual end.
    pub const TAIL_LENIENCY: f64 = -36.0;

    const TICK_END_MARGIN: f64 = 10.0;

    /// Create a slider and generate its nested objects.
    ///
    /// Ticks are placed every `tick_interval` ms into each span. A
    /// non-positive or non-finite interval disables ticks.
    pub fn new(
        path: SliderPath,
        start_time: f64,
        span_duration: f64,
        repeat_count: usize,
        tick_interval: f64,
    ) -> Self {
        let mut this = Self {
            path,
            start_time,
            span_duration,
            repeat_count,
            nested_objects: Vec::new(),
        };

        this.nested_objects = this.generate_nested_objects(tick_interval);

        this
    }

    fn generate_nested_objects(&self, tick_interval: f64) -> Vec<NestedSliderObject> {
        let span_count = self.span_count();
        let mut tick_progresses = Vec::new();

        if tick_interval > 0.0 && tick_interval.is_finite() && self.span_duration > 0.0 {
            let mut tick_time = tick_interval;

            while tick_time < self.span_duration - Self::TICK_END_MARGIN {
                tick_progresses.push(tick_time / self.span_duration);
                tick_time += tick_interval;
            }
        }

        let mut nested_objects = Vec::with_capacity(span_count * (tick_progresses.len() + 1));

        for span in 0..span_count {
            let span_start = self.start_time + span as f64 * self.span_duration;
            let reversed = span % 2 == 1;

            let mut push_tick = |progress: f64| {
                let time_progress = if reversed { 1.0 - progress } else { progress };

                nested_objects.push(NestedSliderObject {
                    pos: self.path.position_at(progress),
                    start_time: span_start + time_progress * self.span_duration,
                    kind: NestedSliderObjectKind::Tick,
                });
            };

            if reversed {
                tick_progresses.iter().rev().copied().for_each(&mut push_tick);
            } else {
                tick_progresses.iter().copied().for_each(&mut push_tick);
            }

            if span + 1 < span_count {
                let progress = if reversed { 0.0 } else { 1.0 };

                nested_objects.push(NestedSliderObject {
                    pos: self.path.position_at(progress),
                    start_time: span_start + self.span_duration,
                    kind: NestedSliderObjectKind::Repeat,
                });
            }
        }

        let duration = self.end_time() - self.start_time;
        let tail_time =
            (self.start_time + duration / 2.0).max(self.end_time() + Self::TAIL_LENIENCY);

        nested_objects.push(NestedSliderObject {
            pos: self.position_at(tail_time),
            start_time: tail_time,
            kind: NestedSliderObjectKind::Tail,
        });

        // Stable sort so the tail stays behind ticks with equal times
        nested_objects.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));

        nested_objects
    }

    /// The amount of spans of the slider.
    pub const fn span_count(&self) -> usize {
        self.repeat_count + 1
    }

    /// The amount of repeats of the slider.
    pub const fn repeat_count(&self) -> usize {
        self.repeat_count
    }

    /// The end time of the slider.
    pub fn end_time(&self) -> f64 {
        self.start_time + self.span_count() as f64 * self.span_duration
    }

    /// The nested objects of the slider.
    pub fn nested_objects(&self) -> &[NestedSliderObject] {
        &self.nested_objects
    }

    /// The tail of the slider.
    pub fn tail(&self) -> Option<&NestedSliderObject> {
        self.nested_objects
            .iter()
            // The tail is not necessarily the last nested object, e.g. on very
            // short and fast buzz sliders
            .rfind(|nested| nested.is_tail())
    }

    /// Progress along the path in `[0, 1]` at the given time, taking the
    /// direction of the current span into account.
    pub fn progress_at(&self, time: f64) -> f64 {
        if self.span_duration <= 0.0 {
            return 0.0;
        }

        let span_count = self.span_count() as f64;
        let progress = ((time - self.start_time) / self.span_duration).clamp(0.0, span_count);

        let (span, span_progress) = if progress >= span_count {
            (span_count - 1.0, 1.0)
        } else {
            let span = progress.floor();

            (span, progress - span)
        };

        if span as usize % 2 == 1 {
            1.0 - span_progress
        } else {
            span_progress
        }
    }

    /// Position relative to the slider head at the given time.
    pub fn position_at(&self, time: f64) -> Pos {
        self.path.position_at(self.progress_at(time))
    }
}

/// The path of a slider as a polyline relative to the slider head.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SliderPath {
    points: Vec<Pos>,
    cumulative_lengths: Vec<f64>,
}

impl SliderPath {
    /// Create a path through the given points.
    ///
    /// Points are relative to the slider head. If the first point is not the
    /// origin, the origin is prepended.
    pub fn new(points: Vec<Pos>) -> Self {
        let mut points = points;

        if points.first() != Some(&Pos::default()) {
            points.insert(0, Pos::default());
        }

        let mut cumulative_lengths = Vec::with_capacity(points.len());
        let mut len = 0.0;
        cumulative_lengths.push(len);

        for window in points.windows(2) {
            len += f64::from(window[0].distance(window[1]));
            cumulative_lengths.push(len);
        }

        Self {
            points,
            cumulative_lengths,
        }
    }

    /// A straight path from the head to `end`.
    pub fn linear(end: Pos) -> Self {
        Self::new(vec![Pos::default(), end])
    }

    /// The points of the path.
    pub fn points(&self) -> &[Pos] {
        &self.points
    }

    /// The total length of the path.
    pub fn distance(&self) -> f64 {
        self.cumulative_lengths.last().copied().unwrap_or(0.0)
    }

    /// Position relative to the head after travelling `progress` of the
    /// path's length.
    pub fn position_at(&self, progress: f64) -> Pos {
        let d = progress.clamp(0.0, 1.0) * self.distance();
        let i = self.cumulative_lengths.partition_point(|&len| len < d);

        if i == 0 {
            return self.points.first().copied().unwrap_or_default();
        } else if i >= self.points.len() {
            return self.points.last().copied().unwrap_or_default();
        }

        let p0 = self.points[i - 1];
        let p1 = self.points[i];
        let d0 = self.cumulative_lengths[i - 1];
        let d1 = self.cumulative_lengths[i];

        if d1 - d0 <= f64::EPSILON {
            return p0;
        }

        let w = (d - d0) / (d1 - d0);

        p0 + (p1 - p0) * w as f32
    }
}

/// A tick, repeat, or tail of a [`Slider`].
#[derive(Clone, Debug, PartialEq)]
pub struct NestedSliderObject {
    /// Position relative to the slider head.
    pub pos: Pos,
    pub start_time: f64,
    pub kind: NestedSliderObjectKind,
}

impl NestedSliderObject {
    pub const fn is_repeat(&self) -> bool {
        matches!(self.kind, NestedSliderObjectKind::Repeat)
    }

    pub const fn is_tail(&self) -> bool {
        matches!(self.kind, NestedSliderObjectKind::Tail)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NestedSliderObjectKind {
    Repeat,
    Tail,
    Tick,
}

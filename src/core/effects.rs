//! Decorative effects: cursor follower, click ripples, background
//! particles, the title entrance and the typewriter tagline.
//!
//! None of these feed back into the rest of the engine.  Frame-driven
//! effects advance one step per call to `step`; the host calls it once per
//! elapsed frame.

use super::clock::Millis;

/// Effects only run on viewports wider than this.
pub const EFFECTS_MIN_WIDTH: f64 = 768.0;
pub const FOLLOWER_EASE: f64 = 0.15;
pub const RIPPLE_LIFETIME: Millis = 600;
pub const PARTICLE_COUNT: usize = 50;
pub const NAME_START: Millis = 1000;
pub const NAME_STAGGER: Millis = 100;
pub const TYPE_START: Millis = 2700;
pub const TYPE_SPEED: Millis = 30;

pub fn effects_enabled(viewport_width: f64) -> bool {
    viewport_width > EFFECTS_MIN_WIDTH
}

// ───────────────────────────────────────── cursor ────────────

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CursorFollower {
    pub pointer: (f64, f64),
    pub follower: (f64, f64),
}

impl CursorFollower {
    pub fn point(&mut self, x: f64, y: f64) {
        self.pointer = (x, y);
    }

    pub fn step(&mut self) {
        self.follower.0 += (self.pointer.0 - self.follower.0) * FOLLOWER_EASE;
        self.follower.1 += (self.pointer.1 - self.follower.1) * FOLLOWER_EASE;
    }
}

// ───────────────────────────────────────── ripples ───────────

/// Rectangle in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ripple {
    /// Square side, `max(w, h)` of the clicked element.
    pub size: f64,
    /// Top-left of the square relative to the element, centred on the click.
    pub left: f64,
    pub top: f64,
    pub born: Millis,
}

impl Ripple {
    pub fn new(element: Rect, click: (f64, f64), now: Millis) -> Self {
        let size = element.w.max(element.h);
        Self {
            size,
            left: click.0 - element.x - size / 2.0,
            top: click.1 - element.y - size / 2.0,
            born: now,
        }
    }

    pub fn expires_at(&self) -> Millis {
        self.born + RIPPLE_LIFETIME
    }
}

#[derive(Debug, Default)]
pub struct Ripples {
    live: Vec<(Rect, Ripple)>,
}

impl Ripples {
    pub fn spawn(&mut self, element: Rect, click: (f64, f64), now: Millis) -> Ripple {
        let ripple = Ripple::new(element, click, now);
        self.live.push((element, ripple));
        ripple
    }

    /// Drop ripples whose lifetime has ended.
    pub fn expire(&mut self, now: Millis) {
        self.live.retain(|(_, r)| now < r.expires_at());
    }

    pub fn live(&self) -> &[(Rect, Ripple)] {
        &self.live
    }
}

// ───────────────────────────────────────── particles ─────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
}

#[derive(Debug, Clone)]
pub struct ParticleField {
    particles: Vec<Particle>,
    width: f64,
    height: f64,
}

impl ParticleField {
    /// Deterministic layout: positions and velocities come from a
    /// low-discrepancy sequence rather than a random source.
    pub fn seeded(count: usize, width: f64, height: f64) -> Self {
        const PHI: f64 = 0.618_033_988_749_895;
        let unit = |k: f64| (k * PHI).fract();
        let particles = (0..count)
            .map(|i| {
                let i = i as f64 + 1.0;
                Particle {
                    x: unit(i) * width,
                    y: unit(i * 7.0) * height,
                    vx: (unit(i * 13.0) - 0.5) * 2.0,
                    vy: (unit(i * 29.0) - 0.5) * 2.0,
                }
            })
            .collect();
        Self {
            particles,
            width,
            height,
        }
    }

    /// New bounds; particles outside are pulled back in.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        for p in &mut self.particles {
            p.x = p.x.clamp(0.0, width);
            p.y = p.y.clamp(0.0, height);
        }
    }

    /// Move every particle one frame, bouncing off the edges.
    pub fn step(&mut self) {
        for p in &mut self.particles {
            p.x += p.vx;
            p.y += p.vy;
            if p.x <= 0.0 || p.x >= self.width {
                p.vx = -p.vx;
            }
            if p.y <= 0.0 || p.y >= self.height {
                p.vy = -p.vy;
            }
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn bounds(&self) -> (f64, f64) {
        (self.width, self.height)
    }
}

// ───────────────────────────────────────── title entrance ────

/// The page title split into words, each appearing on its own timer.
#[derive(Debug, Clone, Default)]
pub struct NameEntrance {
    parts: Vec<(String, bool)>,
}

impl NameEntrance {
    pub fn new(title: &str) -> Self {
        Self {
            parts: title.split_whitespace().map(|w| (w.to_string(), false)).collect(),
        }
    }

    /// Load-relative delay of every part: `NAME_START + index * NAME_STAGGER`.
    pub fn schedule(&self) -> impl Iterator<Item = (usize, Millis)> + '_ {
        (0..self.parts.len()).map(|i| (i, NAME_START + i as Millis * NAME_STAGGER))
    }

    /// Returns false for unknown or already shown parts.
    pub fn show(&mut self, index: usize) -> bool {
        match self.parts.get_mut(index) {
            Some((_, shown)) if !*shown => {
                *shown = true;
                true
            }
            _ => false,
        }
    }

    pub fn parts(&self) -> impl Iterator<Item = (&str, bool)> {
        self.parts.iter().map(|(word, shown)| (word.as_str(), *shown))
    }

    pub fn is_complete(&self) -> bool {
        self.parts.iter().all(|(_, shown)| *shown)
    }
}

// ───────────────────────────────────────── typewriter ────────

/// Types `text` one character per [`TYPE_SPEED`] ms once started.  The
/// first character appears the instant typing starts.
#[derive(Debug, Clone)]
pub struct Typewriter {
    text: String,
    started_at: Option<Millis>,
}

impl Typewriter {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            started_at: None,
        }
    }

    pub fn start(&mut self, now: Millis) {
        self.started_at.get_or_insert(now);
    }

    pub fn visible_chars(&self, now: Millis) -> usize {
        let total = self.text.chars().count();
        match self.started_at {
            Some(start) if now >= start => {
                let typed = (now - start) / TYPE_SPEED + 1;
                total.min(usize::try_from(typed).unwrap_or(usize::MAX))
            }
            _ => 0,
        }
    }

    pub fn shown(&self, now: Millis) -> &str {
        let n = self.visible_chars(now);
        match self.text.char_indices().nth(n) {
            Some((byte, _)) => &self.text[..byte],
            None => &self.text,
        }
    }

    pub fn is_done(&self, now: Millis) -> bool {
        self.started_at.is_some() && self.visible_chars(now) == self.text.chars().count()
    }
}

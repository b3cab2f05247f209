//! Menu-bar greeting: a message picked for the time of day, revealed one
//! character at a time and then erased again.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeBucket {
    EarlyMorning,
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl TimeBucket {
    /// Bucket for a local hour (`0..24`).
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            5..=7 => TimeBucket::EarlyMorning,
            8..=11 => TimeBucket::Morning,
            12..=16 => TimeBucket::Afternoon,
            17..=20 => TimeBucket::Evening,
            _ => TimeBucket::Night,
        }
    }

    pub fn messages(self) -> &'static [&'static str] {
        match self {
            TimeBucket::EarlyMorning => &[
                "Early start! Big wins ahead 🚀",
                "Dawn energy! Getting ahead of the game ⬆️",
                "Morning warrior! Beat the rush ⚡",
                "Rise and grind! Fresh possibilities ✨",
                "Early bird! Time to soar 🦅",
                "Dawn vibes! Day one energy 🔥",
            ],
            TimeBucket::Morning => &[
                "Good morning! Let's build something amazing 🛠️",
                "Morning flow! Fresh ideas incoming 💡",
                "AM energy! Time to create ⚡",
                "Morning momentum! Ready to ship? 🚢",
                "Rise and code! What's brewing? ☕",
                "Good AM! Execute mode: ON 🎯",
                "Morning magic! Let's make it happen ✨",
            ],
            TimeBucket::Afternoon => &[
                "Afternoon grind! Keep shipping 📦",
                "Midday momentum! Staying in the zone 🎯",
                "PM vibes! Making solid progress 📊",
                "Afternoon flow! Building something great 💪",
                "Midday hustle! In the zone ⚡",
                "PM power! Iterate and improve 🔄",
                "Afternoon focus! Almost there 🏗️",
            ],
            TimeBucket::Evening => &[
                "Evening push! Almost there ✨",
                "Sunset energy! Final sprint 🏁",
                "End-of-day flow! Solid work today 👏",
                "Evening grind! Wrapping up strong 💪",
                "Golden hour! End on a high note 📈",
                "Sunset vibes! One more push 🌅",
                "Evening magic! Strong finish ahead ⭐",
            ],
            TimeBucket::Night => &[
                "Late night? Ideas never sleep 💭",
                "Night shift! Deep work hours ⭐",
                "Midnight mode! When inspiration hits ⚡",
                "Night owl! Burning the midnight oil 🕯️",
                "After hours! This is when magic happens ✨",
                "Late vibes! Night shift activated 🌙",
                "Midnight hustle! Deep focus time 🎯",
            ],
        }
    }

    /// Uniform pick from this bucket's table.
    pub fn pick<R: Rng + ?Sized>(self, rng: &mut R) -> &'static str {
        self.messages().choose(rng).copied().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GreetingPhase {
    #[default]
    None,
    Dots,
    Typing,
    Backspacing,
}

/// Outcome of one typing tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypingStep {
    /// Another tick is needed.
    Continue,
    /// The full message has been shown; hold before erasing.
    Complete,
}

/// Reveal/erase state over the chosen message. The caller drives it with
/// ticks; this type never looks at a clock.
#[derive(Debug, Clone, Default)]
pub struct GreetingSequence {
    message: Vec<char>,
    phase: GreetingPhase,
    visible: usize,
    cursor: usize,
}

impl GreetingSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select a new message and reset to `None`.
    pub fn begin(&mut self, message: &str) {
        self.message = message.chars().collect();
        self.phase = GreetingPhase::None;
        self.visible = 0;
        self.cursor = 0;
    }

    pub fn phase(&self) -> GreetingPhase {
        self.phase
    }

    pub fn message(&self) -> String {
        self.message.iter().collect()
    }

    pub fn visible_text(&self) -> String {
        self.message[..self.visible].iter().collect()
    }

    pub fn visible_len(&self) -> usize {
        self.visible
    }

    pub fn show_dots(&mut self) {
        self.phase = GreetingPhase::Dots;
    }

    pub fn start_typing(&mut self) {
        self.phase = GreetingPhase::Typing;
        self.visible = 0;
        self.cursor = 0;
    }

    /// Each tick reveals the next prefix, starting from the empty one. Once
    /// the full message has been shown the following tick reports
    /// `Complete`.
    pub fn tick_typing(&mut self) -> TypingStep {
        if self.phase != GreetingPhase::Typing {
            return TypingStep::Complete;
        }
        if self.cursor <= self.message.len() {
            self.visible = self.cursor;
            self.cursor += 1;
            TypingStep::Continue
        } else {
            TypingStep::Complete
        }
    }

    pub fn start_backspacing(&mut self) {
        self.phase = GreetingPhase::Backspacing;
        self.cursor = self.message.len() + 1;
    }

    /// Mirror of `tick_typing`: shrinks the prefix down to empty, and on the
    /// tick after that returns the sequence to `None`. Returns true once
    /// finished.
    pub fn tick_backspacing(&mut self) -> bool {
        if self.phase != GreetingPhase::Backspacing {
            return true;
        }
        if self.cursor > 0 {
            self.cursor -= 1;
            self.visible = self.cursor;
            false
        } else {
            self.phase = GreetingPhase::None;
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn hours_map_to_buckets() {
        assert_eq!(TimeBucket::from_hour(4), TimeBucket::Night);
        assert_eq!(TimeBucket::from_hour(5), TimeBucket::EarlyMorning);
        assert_eq!(TimeBucket::from_hour(8), TimeBucket::Morning);
        assert_eq!(TimeBucket::from_hour(11), TimeBucket::Morning);
        assert_eq!(TimeBucket::from_hour(12), TimeBucket::Afternoon);
        assert_eq!(TimeBucket::from_hour(17), TimeBucket::Evening);
        assert_eq!(TimeBucket::from_hour(21), TimeBucket::Night);
        assert_eq!(TimeBucket::from_hour(0), TimeBucket::Night);
    }

    #[test]
    fn pick_stays_inside_the_bucket() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let message = TimeBucket::Evening.pick(&mut rng);
            assert!(TimeBucket::Evening.messages().contains(&message));
        }
    }

    #[test]
    fn typing_then_backspacing_walks_every_prefix() {
        let mut greeting = GreetingSequence::new();
        greeting.begin("héllo");
        greeting.show_dots();
        greeting.start_typing();

        let mut shown = Vec::new();
        while greeting.tick_typing() == TypingStep::Continue {
            shown.push(greeting.visible_text());
        }
        assert_eq!(shown, vec!["", "h", "hé", "hél", "héll", "héllo"]);

        greeting.start_backspacing();
        let mut erased = Vec::new();
        while !greeting.tick_backspacing() {
            erased.push(greeting.visible_text());
        }
        assert_eq!(erased, vec!["héllo", "héll", "hél", "hé", "h", ""]);
        assert_eq!(greeting.phase(), GreetingPhase::None);
    }

    #[test]
    fn ticks_outside_their_phase_are_inert() {
        let mut greeting = GreetingSequence::new();
        greeting.begin("hi");
        assert_eq!(greeting.tick_typing(), TypingStep::Complete);
        assert!(greeting.tick_backspacing());
        assert_eq!(greeting.visible_text(), "");
    }
}

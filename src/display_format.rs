use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Glyphs {
    /// 帥 仕 相 傌 俥 炮 兵 and their black counterparts.
    Chinese,
    /// Doubled notation letters, `KK` for the red general and `pp` for a black soldier.
    Letters,
}

/// How boards, pieces and game summaries are rendered as text.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct DisplayFormat {
    pub glyphs: Glyphs,
    /// ANSI colour for red pieces and the last move.
    pub colour: bool,
    /// A single status line instead of the whole board.
    pub concise: bool,
}

static DEFAULT_CHINESE: AtomicBool = AtomicBool::new(true);
static DEFAULT_COLOUR: AtomicBool = AtomicBool::new(true);

impl DisplayFormat {
    pub fn default(concise: bool) -> Self {
        let glyphs = if DEFAULT_CHINESE.load(Ordering::Relaxed) {
            Glyphs::Chinese
        } else {
            Glyphs::Letters
        };
        Self {
            glyphs,
            colour: DEFAULT_COLOUR.load(Ordering::Relaxed),
            concise,
        }
    }

    pub fn pretty() -> Self {
        Self::default(false)
    }

    /// Plain text with no escape codes, for logs and `to_string`.
    pub fn string() -> Self {
        Self {
            colour: false,
            ..Self::default(true)
        }
    }

    pub fn set_default_chinese(chinese: bool) {
        DEFAULT_CHINESE.store(chinese, Ordering::Relaxed);
    }

    pub fn set_default_colour(colour: bool) {
        DEFAULT_COLOUR.store(colour, Ordering::Relaxed);
    }
}

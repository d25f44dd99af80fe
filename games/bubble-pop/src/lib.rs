mod game;

pub use game::{BubblePop, EV_NEW_TARGET, EV_SCORE};

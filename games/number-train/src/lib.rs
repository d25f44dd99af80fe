mod game;

pub use game::{NumberTrain, Phase, EV_NEW_ROUND, EV_TILE_SEATED, EV_TRAIN_DEPARTED};

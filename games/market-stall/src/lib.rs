mod game;

pub use game::{
    MarketStall, Phase, CMD_NEXT_ROUND, EV_COIN_PAID, EV_ITEM_COLLECTED, EV_ITEM_WANTED,
    EV_PAYMENT_DUE, EV_ROUND_DONE,
};

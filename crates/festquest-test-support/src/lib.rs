//! Shared test mocks and utilities for the Festquest festival companion.

mod clock;
mod cutout;
mod photos;
mod repository;
mod rng;
mod sticker_log;

pub use clock::{FixedClock, ManualClock};
pub use cutout::CannedCutout;
pub use photos::{cutout_png, solid_jpeg, solid_png};
pub use repository::{
    FailingQuestRepository, InMemoryQuestRepository, RacingQuestRepository,
    SaveFailingQuestRepository,
};
pub use rng::{MockRng, SequenceRng};
pub use sticker_log::{FailingStickerLog, RecordingStickerLog};

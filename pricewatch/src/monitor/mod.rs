//! Price monitoring: per-item update rules and the bounded fan-out that
//! drives them for a whole catalog.

pub mod fanout;
pub mod processor;

pub use fanout::{CycleReport, FanOutExecutor, check_item};
pub use processor::{PriceUpdateProcessor, UpdateOutcome};

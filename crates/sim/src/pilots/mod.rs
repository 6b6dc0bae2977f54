pub mod cruiser;
pub mod nav;
pub mod racer;

pub use cruiser::CruiserPolicy;
pub use racer::RacerPolicy;

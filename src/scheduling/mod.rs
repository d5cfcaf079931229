//! The pure core of the booking engine: civil-time arithmetic, slot
//! projection, and the reservation lifecycle. Nothing here touches the
//! database; repositories feed these functions snapshots and persist their
//! results.

pub mod clock;
pub mod lifecycle;
pub mod slots;

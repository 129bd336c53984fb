//! One [`GridProvider`](crate::GridProvider) implementation per DGGS family.

mod geohash;
mod h3;
mod isea4t;
mod olc;
mod qtm;
mod rhealpix;
mod s2;
mod tile;

pub use geohash::GeohashProvider;
pub use h3::H3Provider;
pub use isea4t::Isea4tProvider;
pub use olc::OlcProvider;
pub use qtm::QtmProvider;
pub use rhealpix::RhealpixProvider;
pub use s2::S2Provider;
pub use tile::{QuadkeyProvider, TilecodeProvider};

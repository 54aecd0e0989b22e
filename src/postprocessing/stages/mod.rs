pub mod corrections;
pub mod dictionary;
pub mod manhwa;
pub mod noise;
pub mod normalize;
pub mod reconstruct;
pub mod transforms;
pub mod user;

// Streaming player: HTTP source, Symphonia decode, cpal output

mod adapt;
mod engine;
mod output;
mod player;

pub use player::StreamingPlayer;

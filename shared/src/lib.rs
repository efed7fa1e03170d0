//! Types shared by the arena relay server, the simulation core and the client.

pub mod config;
pub mod protocol;
pub mod vec3;

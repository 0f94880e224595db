//! Native backends.
//!
//! Only SDL2 is provided. Everything above this module talks to the traits in
//! `crate::native` and `crate::audio`, so another backend plugs in the same way.

pub mod sdl;

pub use sdl::{
    SdlAudioBackend, SdlAudioDevice, SdlDevices, SdlEvents, SdlGlSwap, SdlPlatform, SdlWindow,
    SharedPresentMode,
};

pub mod controller;
pub mod events;
pub mod media;
pub mod playback;
pub mod presentation;

pub use controller::SessionController;
pub use events::{MediaEvent, SessionEffect, SessionInput};
pub use media::MediaElement;
pub use playback::{PlaybackSession, SessionSnapshot};
pub use presentation::{ChannelSink, PresentationEvent, PresentationSink};

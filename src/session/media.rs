/// Commands the session may issue back to the media element to undo a
/// manipulation. Implementations forward to the real player.
pub trait MediaElement: Send + 'static {
    fn set_current_time(&mut self, position: f64);
    fn set_playback_rate(&mut self, rate: f64);
    fn pause(&mut self);
}

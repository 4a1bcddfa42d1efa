//! Mixer bookkeeping: 8 effect channels plus one music stream.

use karst_script::Mixer;

pub const NUM_CHANNELS: usize = 8;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelState {
    pub res: u16,
    pub volume: u8,
    pub looped: bool,
    pub active: bool,
}

#[derive(Debug)]
pub struct MixerState {
    channels: [ChannelState; NUM_CHANNELS],
    music: Option<u16>,
    music_volume: u8,
}

impl MixerState {
    pub fn new() -> Self {
        Self {
            channels: [ChannelState::default(); NUM_CHANNELS],
            music: None,
            music_volume: 255,
        }
    }

    pub fn channel(&self, ch: u8) -> Option<&ChannelState> {
        self.channels.get(ch as usize)
    }

    pub fn music(&self) -> Option<u16> {
        self.music
    }

    pub fn music_level(&self) -> u8 {
        self.music_volume
    }

    fn channel_mut(&mut self, ch: u8, what: &str) -> Option<&mut ChannelState> {
        if ch as usize >= NUM_CHANNELS {
            log::error!("{what}: invalid channel {ch}");
            return None;
        }
        Some(&mut self.channels[ch as usize])
    }
}

impl Default for MixerState {
    fn default() -> Self {
        Self::new()
    }
}

impl Mixer for MixerState {
    fn sfx_play(&mut self, res: u16, channel: u8, volume: u8) {
        if let Some(ch) = self.channel_mut(channel, "sfx_play") {
            *ch = ChannelState { res, volume, looped: false, active: true };
        }
    }

    fn sfx_stop(&mut self, channel: u8) {
        if let Some(ch) = self.channel_mut(channel, "sfx_stop") {
            ch.active = false;
        }
    }

    fn sfx_loop(&mut self, res: u16, channel: u8, volume: u8) {
        if let Some(ch) = self.channel_mut(channel, "sfx_loop") {
            *ch = ChannelState { res, volume, looped: true, active: true };
        }
    }

    fn music_play(&mut self, res: u16) {
        log::debug!("music {res}");
        self.music = Some(res);
    }

    fn music_stop(&mut self) {
        self.music = None;
    }

    fn music_volume(&mut self, volume: u8) {
        self.music_volume = volume;
    }

    /// Full stop: every effect channel and the music stream.
    fn flush(&mut self) {
        for ch in self.channels.iter_mut() {
            ch.active = false;
        }
        self.music = None;
    }

    fn sfx_playing(&self, channel: u8) -> bool {
        self.channel(channel).map(|ch| ch.active).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn channels_start_stop_and_report() {
        let mut mixer = MixerState::new();
        mixer.sfx_play(4, 1, 200);
        mixer.sfx_loop(5, 2, 100);
        assert!(mixer.sfx_playing(1));
        assert!(mixer.sfx_playing(2));
        assert!(!mixer.sfx_playing(0));
        assert!(mixer.channel(2).unwrap().looped);

        mixer.sfx_stop(1);
        assert!(!mixer.sfx_playing(1));
        // the stopped channel keeps its last resource for debugging
        assert_eq!(mixer.channel(1).unwrap().res, 4);
    }

    #[test]
    fn flush_silences_effects_and_music() {
        let mut mixer = MixerState::new();
        mixer.music_play(9);
        mixer.sfx_play(4, 0, 255);
        mixer.sfx_play(5, 7, 255);
        mixer.flush();
        assert!(!mixer.sfx_playing(0));
        assert!(!mixer.sfx_playing(7));
        assert_eq!(mixer.music(), None);
    }

    #[test]
    fn out_of_range_channels_are_ignored() {
        let mut mixer = MixerState::new();
        mixer.sfx_play(4, 200, 255);
        assert!(!mixer.sfx_playing(200));
    }

    #[test]
    fn music_volume_is_retained() {
        let mut mixer = MixerState::new();
        mixer.music_volume(80);
        assert_eq!(mixer.music_level(), 80);
    }
}

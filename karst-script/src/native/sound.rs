//! Natives 22–29: effect channels and music.

use anyhow::Result;

use crate::host::Host;
use crate::machine::Machine;

pub(crate) fn sfx_play<H: Host>(m: &mut Machine<H>, host: &mut H) -> Result<()> {
    let res = m.word_arg(4)? as u16;
    let channel = m.byte_arg(6)?;
    let volume = m.byte_arg(7)?;
    host.mixer().sfx_play(res, channel, volume);
    Ok(())
}

pub(crate) fn sfx_stop<H: Host>(m: &mut Machine<H>, host: &mut H) -> Result<()> {
    let channel = m.byte_arg(4)?;
    host.mixer().sfx_stop(channel);
    Ok(())
}

pub(crate) fn sfx_loop<H: Host>(m: &mut Machine<H>, host: &mut H) -> Result<()> {
    let res = m.word_arg(4)? as u16;
    let channel = m.byte_arg(6)?;
    let volume = m.byte_arg(7)?;
    host.mixer().sfx_loop(res, channel, volume);
    Ok(())
}

pub(crate) fn music_play<H: Host>(m: &mut Machine<H>, host: &mut H) -> Result<()> {
    let res = m.word_arg(4)? as u16;
    host.mixer().music_play(res);
    m.vars.music_playing = 1;
    Ok(())
}

pub(crate) fn music_stop<H: Host>(m: &mut Machine<H>, host: &mut H) -> Result<()> {
    host.mixer().music_stop();
    m.vars.music_playing = 0;
    Ok(())
}

pub(crate) fn music_volume<H: Host>(m: &mut Machine<H>, host: &mut H) -> Result<()> {
    let volume = m.byte_arg(4)?;
    host.mixer().music_volume(volume);
    Ok(())
}

/// Stop every channel and the music.
pub(crate) fn flush<H: Host>(m: &mut Machine<H>, host: &mut H) -> Result<()> {
    host.mixer().flush();
    m.vars.music_playing = 0;
    Ok(())
}

pub(crate) fn sfx_playing<H: Host>(m: &mut Machine<H>, host: &mut H) -> Result<()> {
    let channel = m.byte_arg(4)?;
    let playing = host.mixer().sfx_playing(channel);
    m.set_acc(playing as i16);
    Ok(())
}

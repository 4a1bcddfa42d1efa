//! Natives 16–21: palette loads, fades, direct writes and cycling.

use anyhow::Result;

use crate::host::Host;
use crate::machine::Machine;

pub(crate) fn load<H: Host>(m: &mut Machine<H>, host: &mut H) -> Result<()> {
    let res = m.word_arg(4)? as u16;
    host.palette().load(res);
    Ok(())
}

pub(crate) fn fade_in<H: Host>(m: &mut Machine<H>, host: &mut H) -> Result<()> {
    let ticks = m.word_arg(4)? as u16;
    host.palette().fade_in(ticks);
    Ok(())
}

pub(crate) fn fade_out<H: Host>(m: &mut Machine<H>, host: &mut H) -> Result<()> {
    let ticks = m.word_arg(4)? as u16;
    host.palette().fade_out(ticks);
    Ok(())
}

/// RGB triplets come from the local window.
pub(crate) fn set_block<H: Host>(m: &mut Machine<H>, host: &mut H) -> Result<()> {
    let first = m.byte_arg(4)?;
    let count = m.byte_arg(5)?;
    let off = m.word_arg(6)?;
    let rgb = m.local_slice(off as i32, count as usize * 3)?;
    host.palette().set_block(first, count, rgb);
    Ok(())
}

pub(crate) fn blend<H: Host>(m: &mut Machine<H>, host: &mut H) -> Result<()> {
    let level = m.byte_arg(4)?;
    host.palette().blend(level);
    Ok(())
}

pub(crate) fn cycle<H: Host>(m: &mut Machine<H>, host: &mut H) -> Result<()> {
    let first = m.byte_arg(4)?;
    let last = m.byte_arg(5)?;
    let ticks = m.word_arg(6)? as u16;
    host.palette().cycle(first, last, ticks);
    Ok(())
}

//! Natives 36–41: actor animation channels.

use anyhow::Result;

use crate::host::Host;
use crate::machine::Machine;

pub(crate) fn start<H: Host>(m: &mut Machine<H>, host: &mut H) -> Result<()> {
    let actor = m.byte_arg(4)?;
    let res = m.word_arg(5)? as u16;
    let loops = m.byte_arg(7)?;
    host.animator().start(actor, res, loops);
    Ok(())
}

pub(crate) fn stop<H: Host>(m: &mut Machine<H>, host: &mut H) -> Result<()> {
    let actor = m.byte_arg(4)?;
    host.animator().stop(actor);
    Ok(())
}

pub(crate) fn phase<H: Host>(m: &mut Machine<H>, host: &mut H) -> Result<()> {
    let actor = m.byte_arg(4)?;
    let phase = host.animator().phase(actor);
    m.set_acc(phase);
    Ok(())
}

pub(crate) fn running<H: Host>(m: &mut Machine<H>, host: &mut H) -> Result<()> {
    let actor = m.byte_arg(4)?;
    let running = host.animator().running(actor);
    m.set_acc(running as i16);
    Ok(())
}

pub(crate) fn face<H: Host>(m: &mut Machine<H>, host: &mut H) -> Result<()> {
    let actor = m.byte_arg(4)?;
    let dir = m.byte_arg(5)?;
    host.animator().face(actor, dir);
    Ok(())
}

pub(crate) fn place<H: Host>(m: &mut Machine<H>, host: &mut H) -> Result<()> {
    let actor = m.byte_arg(4)?;
    let x = m.word_arg(5)?;
    let y = m.word_arg(7)?;
    host.animator().place(actor, x, y);
    Ok(())
}

//! Natives 30–35: the segment map and actor walking.

use anyhow::Result;

use crate::host::Host;
use crate::machine::Machine;

pub(crate) fn map_load<H: Host>(m: &mut Machine<H>, host: &mut H) -> Result<()> {
    let res = m.word_arg(4)? as u16;
    host.walkmap().load(res);
    Ok(())
}

/// The pathfinder's verdict also lands in the `WalkResult` variable, which
/// is where scripts poll it from.
pub(crate) fn walk_to<H: Host>(m: &mut Machine<H>, host: &mut H) -> Result<()> {
    let actor = m.byte_arg(4)?;
    let x = m.word_arg(5)?;
    let y = m.word_arg(7)?;
    let result = host.walkmap().walk_to(actor, x, y);
    m.vars.walk_result = result;
    Ok(())
}

pub(crate) fn walk_stop<H: Host>(m: &mut Machine<H>, host: &mut H) -> Result<()> {
    let actor = m.byte_arg(4)?;
    host.walkmap().walk_stop(actor);
    Ok(())
}

pub(crate) fn point_walkable<H: Host>(m: &mut Machine<H>, host: &mut H) -> Result<()> {
    let x = m.word_arg(4)?;
    let y = m.word_arg(6)?;
    let walkable = host.walkmap().walkable(x, y);
    m.set_acc(walkable as i16);
    Ok(())
}

pub(crate) fn segment_at<H: Host>(m: &mut Machine<H>, host: &mut H) -> Result<()> {
    let x = m.word_arg(4)?;
    let y = m.word_arg(6)?;
    let segment = host.walkmap().segment_at(x, y);
    m.set_acc(segment);
    Ok(())
}

pub(crate) fn segment_enable<H: Host>(m: &mut Machine<H>, host: &mut H) -> Result<()> {
    let segment = m.byte_arg(4)?;
    let flag = m.byte_arg(5)?;
    host.walkmap().segment_enable(segment, flag != 0);
    Ok(())
}

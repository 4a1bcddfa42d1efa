//! Natives 1–15: backdrop, sprites, rects, clip, text and cursor.

use anyhow::Result;

use crate::host::Host;
use crate::machine::Machine;

pub(crate) fn backdrop_draw<H: Host>(m: &mut Machine<H>, host: &mut H) -> Result<()> {
    let res = m.word_arg(4)? as u16;
    host.screen().backdrop_draw(res);
    m.vars.backdrop_id = res as i16;
    Ok(())
}

pub(crate) fn sprite_draw<H: Host>(m: &mut Machine<H>, host: &mut H) -> Result<()> {
    let id = m.byte_arg(4)?;
    let res = m.word_arg(5)? as u16;
    let frame = m.byte_arg(7)?;
    let x = m.word_arg(8)?;
    let y = m.word_arg(10)?;
    host.screen().sprite_draw(id, res, frame, x, y);
    Ok(())
}

pub(crate) fn sprite_move<H: Host>(m: &mut Machine<H>, host: &mut H) -> Result<()> {
    let id = m.byte_arg(4)?;
    let x = m.word_arg(5)?;
    let y = m.word_arg(7)?;
    host.screen().sprite_move(id, x, y);
    Ok(())
}

pub(crate) fn sprite_z<H: Host>(m: &mut Machine<H>, host: &mut H) -> Result<()> {
    let id = m.byte_arg(4)?;
    let z = m.byte_arg(5)?;
    host.screen().sprite_z(id, z);
    Ok(())
}

pub(crate) fn sprite_hide<H: Host>(m: &mut Machine<H>, host: &mut H) -> Result<()> {
    let id = m.byte_arg(4)?;
    host.screen().sprite_hide(id);
    Ok(())
}

pub(crate) fn sprite_flip<H: Host>(m: &mut Machine<H>, host: &mut H) -> Result<()> {
    let id = m.byte_arg(4)?;
    let flags = m.byte_arg(5)?;
    host.screen().sprite_flip(id, flags);
    Ok(())
}

pub(crate) fn rect_fill<H: Host>(m: &mut Machine<H>, host: &mut H) -> Result<()> {
    let x = m.word_arg(4)?;
    let y = m.word_arg(6)?;
    let w = m.word_arg(8)?;
    let h = m.word_arg(10)?;
    let color = m.byte_arg(12)?;
    host.screen().rect_fill(x, y, w, h, color);
    Ok(())
}

pub(crate) fn rect_copy<H: Host>(m: &mut Machine<H>, host: &mut H) -> Result<()> {
    let sx = m.word_arg(4)?;
    let sy = m.word_arg(6)?;
    let w = m.word_arg(8)?;
    let h = m.word_arg(10)?;
    let dx = m.word_arg(12)?;
    let dy = m.word_arg(14)?;
    host.screen().rect_copy(sx, sy, w, h, dx, dy);
    Ok(())
}

pub(crate) fn clip_set<H: Host>(m: &mut Machine<H>, host: &mut H) -> Result<()> {
    let x = m.word_arg(4)?;
    let y = m.word_arg(6)?;
    let w = m.word_arg(8)?;
    let h = m.word_arg(10)?;
    host.screen().clip_set(x, y, w, h);
    Ok(())
}

pub(crate) fn clip_clear<H: Host>(_m: &mut Machine<H>, host: &mut H) -> Result<()> {
    host.screen().clip_clear();
    Ok(())
}

/// Text bytes come from the local window, zero-terminated.
pub(crate) fn text_draw<H: Host>(m: &mut Machine<H>, host: &mut H) -> Result<()> {
    let x = m.word_arg(4)?;
    let y = m.word_arg(6)?;
    let off = m.word_arg(8)?;
    let text = m.local_cstr(off as i32)?;
    host.screen().text_draw(x, y, text);
    Ok(())
}

pub(crate) fn cursor_show<H: Host>(m: &mut Machine<H>, host: &mut H) -> Result<()> {
    let flag = m.byte_arg(4)?;
    host.screen().cursor_show(flag != 0);
    m.vars.cursor_visible = flag;
    Ok(())
}

pub(crate) fn cursor_shape<H: Host>(m: &mut Machine<H>, host: &mut H) -> Result<()> {
    let res = m.word_arg(4)? as u16;
    let frame = m.byte_arg(6)?;
    host.screen().cursor_shape(res, frame);
    Ok(())
}

pub(crate) fn shake<H: Host>(m: &mut Machine<H>, host: &mut H) -> Result<()> {
    let amount = m.byte_arg(4)?;
    host.screen().shake(amount);
    Ok(())
}

pub(crate) fn scroll<H: Host>(m: &mut Machine<H>, host: &mut H) -> Result<()> {
    let dx = m.word_arg(4)?;
    let dy = m.word_arg(6)?;
    host.screen().scroll(dx, dy);
    Ok(())
}

//! Natives 0 and 42–59: frame service, game variables, slot loads, the
//! save bank, RNG, movie control and diagnostics.

use anyhow::{Context, Result};

use crate::host::Host;
use crate::machine::Machine;
use crate::savestate;
use crate::vars::GameVar;

/// Native 0. Immediate frame service; also tells the driver its yield
/// deadline was just satisfied.
pub(crate) fn update<H: Host>(m: &mut Machine<H>, host: &mut H) -> Result<()> {
    host.frame_step(&mut m.vars)?;
    m.note_frame_service();
    Ok(())
}

pub(crate) fn game_var_read<H: Host>(m: &mut Machine<H>, _host: &mut H) -> Result<()> {
    let var = m.byte_arg(4)?;
    let v = m.vars.read(var);
    m.set_acc(v);
    Ok(())
}

pub(crate) fn game_var_write<H: Host>(m: &mut Machine<H>, _host: &mut H) -> Result<()> {
    let var = m.byte_arg(4)?;
    let val = m.word_arg(5)?;
    if var == GameVar::RandomSeed as u8 {
        m.reseed(val as u16 as u64);
    }
    m.vars.write(var, val);
    Ok(())
}

/// Fetch a script resource into a slot. Reloading the slot that is
/// executing is allowed; the cursor is an offset, so it simply carries
/// over onto the new bytes.
pub(crate) fn script_load<H: Host>(m: &mut Machine<H>, host: &mut H) -> Result<()> {
    let slot = m.byte_arg(4)? as u16;
    let res = m.word_arg(5)? as u16;
    let bytes = host
        .script_bytes(res)
        .with_context(|| format!("loading script resource {res}"))?;
    m.slots_mut().load(slot, res, bytes)?;
    Ok(())
}

pub(crate) fn stack_save<H: Host>(m: &mut Machine<H>, _host: &mut H) -> Result<()> {
    m.save_aux_sp();
    Ok(())
}

pub(crate) fn stack_restore<H: Host>(m: &mut Machine<H>, _host: &mut H) -> Result<()> {
    m.restore_aux_sp();
    Ok(())
}

pub(crate) fn random<H: Host>(m: &mut Machine<H>, _host: &mut H) -> Result<()> {
    let limit = m.word_arg(4)?;
    let v = m.random(limit);
    m.set_acc(v);
    Ok(())
}

/// Arm `ScriptDelay`; scripts spin on it while the frame service counts
/// it back down.
pub(crate) fn pause<H: Host>(m: &mut Machine<H>, _host: &mut H) -> Result<()> {
    m.vars.script_delay = m.word_arg(4)?;
    Ok(())
}

pub(crate) fn input_flush<H: Host>(m: &mut Machine<H>, _host: &mut H) -> Result<()> {
    m.vars.mouse_button = 0;
    m.vars.key_code = 0;
    Ok(())
}

/// Snapshot through the host save bank. The recorded cursor is the offset
/// of the instruction after this call, so a restore resumes past it.
pub(crate) fn game_save<H: Host>(m: &mut Machine<H>, host: &mut H) -> Result<()> {
    let slot = m.byte_arg(4)?;
    let len = m.byte_arg(1)?;
    let resume = m.instr_offset().wrapping_add(2 + len as u16);
    let bytes = savestate::snapshot_at(m, resume);
    host.save_write(slot, &bytes)
        .with_context(|| format!("writing save slot {slot}"))?;
    log::info!("game state saved to slot {slot} ({} bytes)", bytes.len());
    Ok(())
}

/// Only latches the request. The driver applies the snapshot between
/// instructions; swapping the whole machine state out from under a
/// half-executed instruction is not survivable.
pub(crate) fn game_load<H: Host>(m: &mut Machine<H>, _host: &mut H) -> Result<()> {
    let slot = m.byte_arg(4)?;
    m.request_restore(slot);
    Ok(())
}

pub(crate) fn game_quit<H: Host>(m: &mut Machine<H>, _host: &mut H) -> Result<()> {
    log::info!("script requested quit");
    m.halt();
    Ok(())
}

pub(crate) fn movie_start<H: Host>(m: &mut Machine<H>, host: &mut H) -> Result<()> {
    let res = m.word_arg(4)? as u16;
    host.movie_start(res);
    m.vars.movie_flag = 1;
    Ok(())
}

pub(crate) fn movie_stop<H: Host>(m: &mut Machine<H>, host: &mut H) -> Result<()> {
    host.movie_stop();
    m.vars.movie_flag = 0;
    Ok(())
}

pub(crate) fn movie_playing<H: Host>(m: &mut Machine<H>, host: &mut H) -> Result<()> {
    m.set_acc(host.movie_active() as i16);
    Ok(())
}

pub(crate) fn hero_light<H: Host>(m: &mut Machine<H>, _host: &mut H) -> Result<()> {
    let flag = m.byte_arg(4)?;
    log::warn!("HeroLight({flag}) is not implemented");
    Ok(())
}

pub(crate) fn room_effect<H: Host>(m: &mut Machine<H>, _host: &mut H) -> Result<()> {
    let res = m.word_arg(4)?;
    log::warn!("RoomEffect({res}) is not implemented");
    Ok(())
}

pub(crate) fn debug_dump<H: Host>(m: &mut Machine<H>, _host: &mut H) -> Result<()> {
    let what = m.byte_arg(4)?;
    log::info!("dump[{what}] {}", m.debug_line());
    Ok(())
}

pub(crate) fn nop<H: Host>(_m: &mut Machine<H>, _host: &mut H) -> Result<()> {
    Ok(())
}

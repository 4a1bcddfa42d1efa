//! Execution tests over hand-assembled bytecode.
//!
//! Scripts are spelled out byte by byte with their offsets, because the
//! instruction layout (especially the branch shape) is exactly what is
//! under test. Dead branch paths carry poisoned operands that would jump
//! out of bounds, so taking the wrong path fails loudly instead of
//! converging by accident.

mod common;

use common::RecHost;
use karst_script::{Driver, Machine, Pending, Reg, RunFor, VmError, Window, STACK_TOP};
use pretty_assertions::assert_eq;

fn boot(script: Vec<u8>) -> Machine<RecHost> {
    let mut m = Machine::with_standard_natives();
    m.slots_mut().load(0, 1, script).unwrap();
    m.boot(0).unwrap();
    m
}

fn run(m: &mut Machine<RecHost>, host: &mut RecHost) -> RunFor {
    m.run_for(host, 1000).unwrap()
}

const QUIT: [u8; 4] = [0x00, 0x02, 0x34, 0x00]; // native 52 GameQuit

#[test]
fn immediates_move_through_the_register_file() {
    let mut script = vec![
        0x01, 0x07, 0x00, // 0: ldi.a 7
        0x11, // 3: put.x
        0x01, 0x03, 0x00, // 4: ldi.a 3
        0x0A, // 7: get.x
    ];
    script.extend(QUIT); // 8
    let mut host = RecHost::new();
    let mut m = boot(script);
    let out = run(&mut m, &mut host);
    assert!(out.halted);
    assert_eq!(out.steps, 5);
    assert_eq!(m.acc(), 7);
    assert_eq!(m.reg(Reg::X), 7);
}

#[test]
fn local_memory_direct_and_indexed() {
    let mut script = vec![
        0x01, 0xCD, 0xAB, // 0: ldi.a 0xABCD
        0x1A, 0x30, 0x00, // 3: st.w 0x30
        0x01, 0x11, 0x00, // 6: ldi.a 0x11
        0x03, 0x02, 0x00, // 9: ldi.x 2
        0x1D, 0x30, 0x00, // 12: st.b.x 0x30  (byte at 0x32)
        0x18, 0x30, 0x00, // 15: ld.w 0x30
        0x10, // 18: put.b
        0x17, 0x32, 0x00, // 19: ld.b 0x32
    ];
    script.extend(QUIT); // 22
    script.resize(0x40, 0);
    let mut host = RecHost::new();
    let mut m = boot(script);
    assert!(run(&mut m, &mut host).halted);
    // the word store survived the byte poke two bytes above it
    assert_eq!(m.reg(Reg::B), 0xABCDu16 as i16);
    assert_eq!(m.acc(), 0x11);
}

#[test]
fn in_place_arithmetic_wraps() {
    let mut script = vec![
        0x01, 0x00, 0x7D, // 0: ldi.a 32000
        0x1A, 0x20, 0x00, // 3: st.w 0x20
        0x01, 0xE8, 0x03, // 6: ldi.a 1000
        0x23, 0x00, 0x20, 0x00, // 9: alu.w add 0x20   (32000 + 1000 wraps)
        0x24, 0xFE, 0x20, 0x00, // 13: step.w -2 0x20
        0x18, 0x20, 0x00, // 17: ld.w 0x20
    ];
    script.extend(QUIT); // 20
    script.resize(0x30, 0);
    let mut host = RecHost::new();
    let mut m = boot(script);
    assert!(run(&mut m, &mut host).halted);
    assert_eq!(m.acc(), -32538);
}

#[test]
fn divide_by_zero_is_fatal() {
    let mut script = vec![
        0x01, 0x00, 0x00, // 0: ldi.a 0
        0x23, 0x03, 0x10, 0x00, // 3: alu.w div 0x10
    ];
    script.resize(0x20, 0);
    let mut host = RecHost::new();
    let mut m = boot(script);
    let err = m.run_for(&mut host, 10).unwrap_err();
    assert!(matches!(err, VmError::DivideByZero { .. }), "{err}");
}

#[test]
fn unknown_alu_sub_op_is_fatal() {
    let mut script = vec![
        0x23, 0x09, 0x10, 0x00, // 0: alu.w op=9 0x10
    ];
    script.resize(0x20, 0);
    let mut host = RecHost::new();
    let mut m = boot(script);
    let err = m.run_for(&mut host, 10).unwrap_err();
    assert!(matches!(err, VmError::BadAluOp { op: 9, .. }), "{err}");
}

#[test]
fn branch_taken_skips_the_literal_bytes() {
    let mut script = vec![
        0x02, 0x05, 0x00, // 0: ldi.b 5
        0x29, 0x00, 0x05, 0x00, // 3: cmp #5
        0x2B, // 7: br.eq  (taken)
        0xFF, 0x00, // 8: w1, poisoned
        0xFF, 0x00, // 10: w2, poisoned
        0x01, // 12: j = +1 -> 13
        0x01, 0x2A, 0x00, // 13: ldi.a 42
    ];
    script.extend(QUIT); // 16
    let mut host = RecHost::new();
    let mut m = boot(script);
    assert!(run(&mut m, &mut host).halted);
    assert_eq!(m.acc(), 42);
}

#[test]
fn branch_not_taken_walks_the_chained_word_offsets() {
    let mut script = vec![
        0x02, 0x05, 0x00, // 0: ldi.b 5
        0x29, 0x00, 0x06, 0x00, // 3: cmp #6
        0x2B, // 7: br.eq  (not taken: 5 != 6)
        0x06, 0x00, // 8: w1 = 6 -> lands at 16
        0x00, 0x00, // 10: dead
        0x7F, // 12: taken-path j, poisoned
        0x01, 0x01, 0x00, // 13: ldi.a 1 (skipped)
        0x04, 0x00, // 16: w2 = 4 -> lands at 22
        0x00, 0x00, 0x00, 0x00, // 18: dead
        0x02, // 22: j = +2 -> 24
        0x00, // 23: pad
        0x01, 0x07, 0x00, // 24: ldi.a 7
    ];
    script.extend(QUIT); // 27
    let mut host = RecHost::new();
    let mut m = boot(script);
    assert!(run(&mut m, &mut host).halted);
    assert_eq!(m.acc(), 7);
}

#[test]
fn ordered_branches_compare_bit_patterns_as_unsigned() {
    let mut script = vec![
        0x02, 0xFF, 0xFF, // 0: ldi.b -1 (0xFFFF)
        0x29, 0x00, 0x01, 0x00, // 3: cmp #1
        0x30, // 7: br.gt  (taken: 0xFFFF > 1 unsigned)
        0xFF, 0x00, // 8: poisoned
        0xFF, 0x00, // 10: poisoned
        0x01, // 12: j -> 13
        0x01, 0x09, 0x00, // 13: ldi.a 9
        0x2F, // 16: br.lt  (not taken: 0xFFFF < 1 is false unsigned)
        0x06, 0x00, // 17: w1 = 6 -> 25
        0x00, 0x00, // 19: dead
        0x7F, // 21: taken-path j, poisoned
        0x00, 0x00, 0x00, // 22: pad
        0x00, 0x00, // 25: w2 = 0 -> 27
        0x01, // 27: j -> 28
        0x01, 0x0B, 0x00, // 28: ldi.a 11
    ];
    script.extend(QUIT); // 31
    let mut host = RecHost::new();
    let mut m = boot(script);
    assert!(run(&mut m, &mut host).halted);
    assert_eq!(m.acc(), 11);
}

#[test]
fn bitwise_mode_masks_writes_back_and_lasts_one_branch() {
    let mut script = vec![
        0x02, 0x0F, 0x00, // 0: ldi.b 0x0F
        0x2A, 0x00, 0x03, 0x00, // 3: tst #3   (bitwise)
        0x2C, // 7: br.ne  (0x0F & 3 = 3, nonzero: taken; B <- 3)
        0xFF, 0x00, // 8: poisoned
        0xFF, 0x00, // 10: poisoned
        0x01, // 12: j -> 13
        0x2C, // 13: br.ne  (mode consumed: equality; B == cmp == 3: not taken)
        0x06, 0x00, // 14: w1 = 6 -> 22
        0x00, 0x00, // 16: dead
        0x7F, // 18: taken-path j, poisoned
        0x00, 0x00, 0x00, // 19: pad
        0x00, 0x00, // 22: w2 = 0 -> 24
        0x01, // 24: j -> 25
        0x01, 0x15, 0x00, // 25: ldi.a 21
    ];
    script.extend(QUIT); // 28
    let mut host = RecHost::new();
    let mut m = boot(script);
    assert!(run(&mut m, &mut host).halted);
    assert_eq!(m.acc(), 21);
    assert_eq!(m.reg(Reg::B), 3);
}

#[test]
fn bitwise_eq_tests_the_masked_value_against_zero() {
    let mut script = vec![
        0x02, 0x0C, 0x00, // 0: ldi.b 0x0C
        0x2A, 0x00, 0x03, 0x00, // 3: tst #3   (0x0C & 3 = 0)
        0x2B, // 7: br.eq  (taken)
        0xFF, 0x00, // 8: poisoned
        0xFF, 0x00, // 10: poisoned
        0x01, // 12: j -> 13
        0x01, 0x63, 0x00, // 13: ldi.a 99
    ];
    script.extend(QUIT); // 16
    let mut host = RecHost::new();
    let mut m = boot(script);
    assert!(run(&mut m, &mut host).halted);
    assert_eq!(m.acc(), 99);
    assert_eq!(m.reg(Reg::B), 0);
}

#[test]
fn comparison_target_set_from_the_accumulator() {
    let mut script = vec![
        0x01, 0x2A, 0x00, // 0: ldi.a 42
        0x29, 0x01, // 3: cmp a   (2-byte form)
        0x02, 0x2A, 0x00, // 5: ldi.b 42
        0x2B, // 8: br.eq  (taken)
        0xFF, 0x00, // 9: poisoned
        0xFF, 0x00, // 11: poisoned
        0x01, // 13: j -> 14
        0x01, 0x05, 0x00, // 14: ldi.a 5
    ];
    script.extend(QUIT); // 17
    let mut host = RecHost::new();
    let mut m = boot(script);
    assert!(run(&mut m, &mut host).halted);
    assert_eq!(m.acc(), 5);
}

#[test]
fn jump_offset_zero_spins_in_place() {
    let script = vec![0x31, 0x00]; // 0: jump +0
    let mut host = RecHost::new();
    let mut m = boot(script);
    let out = m.run_for(&mut host, 500).unwrap();
    assert!(!out.halted);
    assert_eq!(out.steps, 500);
    assert_eq!(m.cursor(), 0);
}

#[test]
fn near_call_and_return_round_trip() {
    let mut script = vec![
        0x33, 0x0A, 0x00, // 0: call.ns 10   (pushes ret=3, slot=0)
    ];
    script.extend(QUIT); // 3
    script.extend([0x00, 0x00, 0x00]); // 7: pad
    script.extend([
        0x01, 0x2C, 0x01, // 10: ldi.a 300
        0x36, // 13: ret -> 3
    ]);
    let mut host = RecHost::new();
    let mut m = boot(script);
    assert!(run(&mut m, &mut host).halted);
    assert_eq!(m.acc(), 300);
    assert_eq!(m.sp(), STACK_TOP);
}

#[test]
fn ret_args_releases_the_callers_arguments() {
    let mut script = vec![
        0x01, 0x01, 0x00, // 0: ldi.a 1
        0x25, // 3: push.a
        0x01, 0x02, 0x00, // 4: ldi.a 2
        0x25, // 7: push.a
        0x33, 0x14, 0x00, // 8: call.ns 20
    ];
    script.extend(QUIT); // 11
    script.extend([0x00; 5]); // 15: pad
    script.extend([
        0x01, 0x04, 0x00, // 20: ldi.a 4
        0x37, // 23: ret.a  (sp += 4 after the frame pops)
    ]);
    let mut host = RecHost::new();
    let mut m = boot(script);
    assert!(run(&mut m, &mut host).halted);
    assert_eq!(m.sp(), STACK_TOP);
}

#[test]
fn far_call_relocates_the_window_one_instruction_late() {
    let caller = vec![
        0x06, 0x01, 0x00, // 0: ldi.fs 1
        0x34, 0x00, 0x00, // 3: call.f 0
    ];
    let mut callee = vec![
        0x18, 0x00, 0x00, // 0: ld.w 0  (reads its own first bytes: 0x0018)
    ];
    callee.extend(QUIT); // 3
    callee.push(0); // pad to 8

    let mut host = RecHost::new();
    let mut m = Machine::with_standard_natives();
    m.slots_mut().load(0, 1, caller).unwrap();
    m.slots_mut().load(1, 2, callee).unwrap();
    m.boot(0).unwrap();

    m.step(&mut host).unwrap(); // ldi.fs
    m.step(&mut host).unwrap(); // call.f
    // the call itself still ran under the caller's window
    assert_eq!(m.window(), Window::Slot(0));
    assert!(m.pending().contains(Pending::FAR_WINDOW));
    assert_eq!(m.reg(Reg::Cs), 1);

    m.step(&mut host).unwrap(); // ld.w, now through slot 1
    assert_eq!(m.window(), Window::Slot(1));
    assert_eq!(m.pending(), Pending::NEAR_WINDOW); // far re-arms near
    assert_eq!(m.acc(), 0x0018);

    m.step(&mut host).unwrap(); // quit; near settles onto CS
    assert!(m.is_halted());
    assert_eq!(m.window(), Window::Slot(1));
    assert_eq!(m.pending(), Pending::empty());
}

#[test]
fn scripts_can_run_out_of_the_stack_region() {
    let script = vec![
        0x01, 0x34, 0x00, // 0: ldi.a 0x0034
        0x25, // 3: push.a   (bytes 34 00 at 0x1FE)
        0x01, 0x00, 0x02, // 4: ldi.a 0x0200
        0x25, // 7: push.a   (bytes 00 02 at 0x1FC)
        0x06, 0x07, 0x00, // 8: ldi.fs 7
        0x34, 0xFC, 0x01, // 11: call.f 0x01FC  (the pushed GameQuit image)
    ];
    let mut host = RecHost::new();
    let mut m = boot(script);
    assert!(run(&mut m, &mut host).halted);
    assert_eq!(m.window(), Window::Stack);
}

#[test]
fn native_operands_address_from_the_instruction_start() {
    fn script_with_frame(frame: u8) -> Vec<u8> {
        let mut s = vec![
            0x00, 0x0A, 0x02, 0x00, // 0: native SpriteDraw, len 10
            0x05, // 4: id
            0x07, 0x00, // 5: res
            frame, // 7: frame
            0x64, 0x00, // 8: x = 100
            0xC8, 0x00, // 10: y = 200
        ];
        s.extend(QUIT); // 12
        s
    }
    for frame in [2u8, 9u8] {
        let mut host = RecHost::new();
        let mut m = boot(script_with_frame(frame));
        assert!(run(&mut m, &mut host).halted);
        assert_eq!(
            host.calls,
            vec![format!("sprite 5 res=7 frame={frame} at 100,200")]
        );
    }
}

#[test]
fn unknown_game_variable_reads_zero_and_execution_continues() {
    let mut script = vec![
        0x01, 0x37, 0x00, // 0: ldi.a 55
        0x00, 0x03, 0x2A, 0x00, 0x63, // 3: GameVarRead var=99
    ];
    script.extend(QUIT); // 8
    let mut host = RecHost::new();
    let mut m = boot(script);
    assert!(run(&mut m, &mut host).halted);
    assert_eq!(m.acc(), 0);
}

#[test]
fn undefined_opcode_byte_is_fatal() {
    let script = vec![0x38];
    let mut host = RecHost::new();
    let mut m = boot(script);
    let err = m.run_for(&mut host, 10).unwrap_err();
    assert!(matches!(err, VmError::BadOpcode { opcode: 0x38, .. }), "{err}");
}

#[test]
fn native_index_past_the_table_is_fatal() {
    let script = vec![0x00, 0x02, 0x3C, 0x00]; // native 60, one past the end
    let mut host = RecHost::new();
    let mut m = boot(script);
    let err = m.run_for(&mut host, 10).unwrap_err();
    assert!(
        matches!(err, VmError::NativeOutOfRange { index: 60, len: 60 }),
        "{err}"
    );
}

#[test]
fn reloading_the_executing_slot_continues_at_the_same_offset() {
    let script = vec![
        0x00, 0x05, 0x2C, 0x00, // 0: native ScriptLoad, len 5
        0x00, // 4: slot 0 (ourselves)
        0x02, 0x00, // 5: resource 2
    ];
    let mut replacement = vec![0xAA; 7]; // never decoded; the cursor lands past it
    replacement.extend(QUIT); // 7
    replacement.push(0);

    let mut host = RecHost::with_script(2, replacement);
    let mut m = boot(script);
    assert!(run(&mut m, &mut host).halted);
    assert_eq!(m.slots().resource(0).unwrap(), 2);
    assert_eq!(m.slots().len(0).unwrap(), 12);
}

#[test]
fn driver_blanks_mouse_input_while_a_movie_plays() {
    fn script() -> Vec<u8> {
        let mut s = vec![
            0x00, 0x05, 0x2B, 0x00, // 0: GameVarWrite, len 5
            0x02, // 4: MouseButton
            0x01, 0x00, // 5: value 1
        ];
        s.extend(QUIT); // 7
        s
    }

    let mut host = RecHost::new();
    host.movie = true;
    let mut m = Machine::with_standard_natives();
    m.slots_mut().load(0, 1, script()).unwrap();
    Driver::new(16).run(&mut m, &mut host, 0).unwrap();
    assert_eq!(m.vars().mouse_button, 0);

    let mut host = RecHost::new();
    let mut m = Machine::with_standard_natives();
    m.slots_mut().load(0, 1, script()).unwrap();
    Driver::new(16).run(&mut m, &mut host, 0).unwrap();
    assert_eq!(m.vars().mouse_button, 1);
}

#[test]
fn pause_runs_down_through_the_timed_frame_service() {
    let mut script = vec![
        0x00, 0x04, 0x30, 0x00, 0x03, 0x00, // 0: Pause 3
        0x00, 0x03, 0x2A, 0x00, 0x0B, // 6: GameVarRead ScriptDelay
        0x10, // 11: put.b
        0x29, 0x00, 0x00, 0x00, // 12: cmp #0
        0x2C, // 16: br.ne  (taken while the delay is nonzero)
        0x04, 0x00, // 17: w1 = 4 -> 23
        0x00, 0x00, // 19: dead
        0xF1, // 21: j = -15 -> back to 6
        0x00, // 22: pad
        0x00, 0x00, // 23: w2 = 0 -> 25
        0x01, // 25: j -> 26
    ];
    script.extend(QUIT); // 26
    let mut host = RecHost::new();
    host.tick_cost_ms = 1; // the clock moves, so the deadline eventually fires
    let mut m = Machine::with_standard_natives();
    m.slots_mut().load(0, 1, script).unwrap();
    Driver::new(16).run(&mut m, &mut host, 0).unwrap();
    assert!(host.frame_steps >= 3, "frame_steps = {}", host.frame_steps);
    assert_eq!(m.vars().script_delay, 0);
    assert!(m.is_halted());
}

#[test]
fn update_native_is_the_frame_service() {
    let script = vec![
        0x00, 0x02, 0x00, 0x00, // 0: Update
        0x31, 0xFC, // 4: jump -4 -> 0
    ];
    let mut host = RecHost::new();
    host.quit_after_frames = Some(3);
    let mut m = Machine::with_standard_natives();
    m.slots_mut().load(0, 1, script).unwrap();
    Driver::new(16).run(&mut m, &mut host, 0).unwrap();
    // only Update drove frames; the frozen clock added none of its own
    assert_eq!(host.frame_steps, 3);
    assert_eq!(m.vars().game_ticks, 3);
}

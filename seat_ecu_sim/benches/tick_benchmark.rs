//! Simulation hot-path micro-benchmark.
//!
//! Measures the per-call cost of the pieces a socket read or write runs,
//! with the tick delay at zero so no sleeping is included:
//! - `Motor::tick` on a moving motor
//! - command frame decode
//! - a full read through `SimContext` (tick + status encode)

use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use seat_common::config::SimConfig;
use seat_common::protocol::{Direction, LearningState};
use seat_ecu_sim::command::{CommandFrame, MotorCommand};
use seat_ecu_sim::{Motor, MotorId, NullObserver, SimContext, TransportHandle};

fn bench_motor_tick(c: &mut Criterion) {
    c.bench_function("motor_tick_moving", |b| {
        let mut motor = Motor::new(MotorId::Position, Some(20), LearningState::Ok);
        b.iter(|| {
            if !motor.direction().is_moving() {
                motor.set_position(Some(20));
                motor.apply_command(Direction::Inc, 80, 0);
            }
            black_box(motor.tick(false))
        });
    });
}

fn bench_command_decode(c: &mut Criterion) {
    let cmd = MotorCommand::new(Direction::Inc, 100);
    let frame = CommandFrame::position_tilt(cmd, cmd).encode();
    c.bench_function("command_decode", |b| {
        b.iter(|| black_box(CommandFrame::decode(black_box(&frame))));
    });
}

fn bench_context_read(c: &mut Criterion) {
    let config = SimConfig {
        tick_delay_ms: 0,
        initial_position: Some(50),
        ..Default::default()
    };
    let mut ctx = SimContext::with_observer(config, Box::new(NullObserver));
    ctx.start(TransportHandle(0));

    c.bench_function("context_read", |b| {
        b.iter(|| black_box(ctx.read_frame()));
    });
}

criterion_group!(benches, bench_motor_tick, bench_command_decode, bench_context_read);
criterion_main!(benches);

//! Whole-board simulation tests

use sonar_sweep::system::config::{CAPTURE, SERVO};
use sonar_sweep::system::report::{frame_len, FRAME_PREFIX};
use sonar_sweep::system::sim::{SimBoard, SimTiming};
use sonar_sweep::{CaptureConfig, ConfigError, Dispatch};

fn drain(board: &mut SimBoard) -> Vec<u8> {
    let mut buf = [0u8; 256];
    let n = board.read_wire(&mut buf);
    buf[..n].to_vec()
}

/// Split wire bytes into frames, asserting each one is whole.
fn frames(bytes: &[u8]) -> Vec<u8> {
    let len = frame_len(FRAME_PREFIX);
    assert_eq!(bytes.len() % len, 0, "partial frame on the wire: {:?}", bytes);
    bytes
        .chunks(len)
        .map(|frame| {
            assert_eq!(&frame[..FRAME_PREFIX.len()], FRAME_PREFIX);
            assert_eq!(frame[len - 1], b'\r');
            frame[FRAME_PREFIX.len()]
        })
        .collect()
}

#[test]
fn test_nothing_before_first_sample() {
    let mut board: SimBoard = SimBoard::new();
    board.set_echo(Some(5));
    board.run_for_ms(999);
    assert!(drain(&mut board).is_empty());
    assert!(board.last_outcome().is_none());
}

#[test]
fn test_first_frame_on_the_wire() {
    let mut board: SimBoard = SimBoard::new();
    board.set_echo(Some(5));
    board.run_for_ms(1010);

    assert_eq!(drain(&mut board), b"SR04: 5\r".to_vec());
    assert_eq!(board.spurious_interrupts(), 0);
    assert_eq!(board.peripherals.uart.overruns(), 0);
    assert!(board.peripherals.transmitter.is_idle());
    assert!(!board.peripherals.uart.irq_enabled());
}

#[test]
fn test_one_frame_per_second() {
    let mut board: SimBoard = SimBoard::new();
    board.set_echo(Some(2));
    board.run_for_ms(3010);

    assert_eq!(frames(&drain(&mut board)), vec![b'2', b'2', b'2']);
    assert_eq!(board.peripherals.transmitter.frames_sent(), 3);
    assert_eq!(board.peripherals.ranging.overwrites(), 0);
}

#[test]
fn test_serial_preempts_sampling() {
    let mut board: SimBoard = SimBoard::new();
    board.run_for_ms(1000);
    // Sampling tick opened a preemption point for the first byte
    assert!(board.nvic.max_depth() >= 2);
}

#[test]
fn test_fast_sampling_overwrites_whole_frames_only() {
    let timing = SimTiming {
        sample_ms: 3,
        servo_ms: 50,
        trigger_ms: 1,
    };
    let mut board: SimBoard = SimBoard::with_config(timing, CAPTURE, SERVO).unwrap();
    board.set_echo(Some(4));
    // Frames start every 9 ms from t=3; the one armed at t=93 is on the wire by t=101
    board.run_for_ms(101);

    let digits = frames(&drain(&mut board));
    assert!(!digits.is_empty());
    assert!(digits.iter().all(|&d| d == b'4'));
    assert!(board.peripherals.ranging.overwrites() > 0);
    assert_eq!(board.spurious_interrupts(), 0);
    assert_eq!(board.peripherals.uart.overruns(), 0);
}

#[test]
fn test_overwrite_changes_digit_in_flight() {
    let timing = SimTiming {
        sample_ms: 3,
        servo_ms: 50,
        trigger_ms: 1,
    };
    let mut board: SimBoard = SimBoard::with_config(timing, CAPTURE, SERVO).unwrap();
    board.set_echo(Some(1));
    // Frame armed at t=3, prefix still going out at t=6
    board.run_for_ms(5);
    board.set_echo(Some(6));
    board.run_for_ms(1);
    assert_eq!(
        board.last_outcome().map(|o| o.dispatch),
        Some(Dispatch::Overwrote)
    );
    board.run_for_ms(6);

    assert_eq!(frames(&drain(&mut board)), vec![b'6']);
}

#[test]
fn test_missing_echo_reports_wraparound() {
    let mut board: SimBoard = SimBoard::new();
    board.set_echo(None);
    board.run_for_ms(1000);

    let outcome = board.last_outcome().unwrap();
    assert!(outcome.timed_out);
    assert_eq!(outcome.report.distance, CAPTURE.wrap_value());
    assert!(!outcome.digit.is_decimal());
    assert_eq!(board.peripherals.echo.latches(), 10);
}

#[test]
fn test_servo_sweeps_within_bounds() {
    let mut board: SimBoard = SimBoard::new();
    let mut reached_min = false;
    let mut reached_max = false;

    for _ in 0..5000 {
        board.step_ms();
        let servo = &board.peripherals.servo;
        assert!(SERVO.contains(servo.position()));
        assert_eq!(servo.pwm().compare(), servo.position());
        reached_min |= servo.position() == SERVO.min_bound;
        reached_max |= servo.position() == SERVO.max_bound;
    }

    assert!(reached_min && reached_max);
    assert_eq!(board.now_ms(), 5000);
    assert!(board.last_step().is_some());
}

#[test]
fn test_degenerate_config_is_refused() {
    let timing = SimTiming {
        servo_ms: 0,
        ..SimTiming::default()
    };
    let result: Result<SimBoard, _> = SimBoard::with_config(timing, CAPTURE, SERVO);
    assert_eq!(result.err(), Some(ConfigError::ZeroInterval));

    let capture = CaptureConfig {
        period: 0,
        ..CAPTURE
    };
    let result: Result<SimBoard, _> =
        SimBoard::with_config(SimTiming::default(), capture, SERVO);
    assert_eq!(result.err(), Some(ConfigError::PeriodTooShort));
}
